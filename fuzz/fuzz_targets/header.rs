#![no_main]

use gw_wire::header::{BASE_HEADER_SIZE, V1_HEADER_SIZE};
use gw_wire::{BaseHeader, StreamHeader};
use libfuzzer_sys::fuzz_target;

// Fuzz target: header parsing in two stages.
//
// Parses the base header and the v1 extension separately, the way the
// stream decoder reads them, and checks that:
// - the staged parse agrees with StreamHeader::read_from on the same bytes
// - an accepted header writes back to exactly the bytes it was read from
fuzz_target!(|data: &[u8]| {
    let whole = StreamHeader::read_from(data).map_err(|e| e.to_string());

    let staged = BaseHeader::read_from(data)
        .and_then(|base| StreamHeader::from_v1(base, &data[BASE_HEADER_SIZE..]))
        .map_err(|e| e.to_string());
    assert_eq!(whole, staged);

    if let Ok(header) = whole {
        let mut buf = [0u8; V1_HEADER_SIZE];
        header.write_to(&mut buf).unwrap();
        assert_eq!(&buf[..], &data[..V1_HEADER_SIZE]);
    }
});
