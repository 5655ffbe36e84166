#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: full stream decoder entry point.
//
// Feeds arbitrary bytes through `StreamDecoder` one event at a time.
// Catches bugs in:
// - Header validation
// - Envelope classification (zero, unknown, and wide kinds)
// - Size fields larger than the remaining input
// - Registry checks on table and column ids
// - Packed-integer cell validation
// - Trailing data detection
// - Decoder fusing after the first error
fuzz_target!(|data: &[u8]| {
    let mut decoder = gw_decoder::StreamDecoder::new(data);
    let mut last_end = 0;
    loop {
        match decoder.next_event() {
            Ok(Some(event)) => {
                assert!(event.start_offset >= last_end);
                assert!(event.end_offset > event.start_offset);
                last_end = event.end_offset;
            }
            Ok(None) => break,
            Err(err) => {
                assert!(err.offset <= data.len() as u64);
                assert!(decoder.next_event().unwrap().is_none());
                break;
            }
        }
    }
});
