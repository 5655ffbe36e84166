#![no_main]

use gw_wire::header::V1_HEADER_SIZE;
use gw_wire::{Framing, StreamHeader};
use libfuzzer_sys::fuzz_target;

// Fuzz target: StreamHeader write->read roundtrip.
//
// Takes 1 byte of fuzz input as the packing choice, writes a header,
// reads it back, and asserts the two match.
fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let framing = if data[0] & 1 == 0 {
        Framing::Unpacked
    } else {
        Framing::Packed
    };
    let header = StreamHeader::new(framing);

    let mut buf = [0u8; V1_HEADER_SIZE];
    header.write_to(&mut buf).unwrap();

    let parsed = StreamHeader::read_from(&buf).unwrap();
    assert_eq!(parsed, header);
});
