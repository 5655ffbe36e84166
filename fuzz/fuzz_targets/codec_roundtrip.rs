#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: packed-integer encode->decode roundtrip.
//
// Takes 8 bytes of fuzz input as a u64, encodes it (and its 32- and 16-bit
// truncations) with the shortest sequence, decodes, and asserts the value
// and length match.
fuzz_target!(|data: &[u8]| {
    use gw_wire::codec::{
        decode_u16, decode_u32, decode_u64, encode_u16, encode_u32, encode_u64, MAX_ENCODED_LEN,
    };

    if data.len() < 8 {
        return;
    }
    let value = u64::from_le_bytes(data[..8].try_into().unwrap());
    let mut buf = [0u8; MAX_ENCODED_LEN];

    let len = encode_u64(value, &mut buf);
    assert_eq!(decode_u64(&buf[..len]).unwrap(), (value, len));

    let narrow = value as u32;
    let len = encode_u32(narrow, &mut buf);
    assert_eq!(decode_u32(&buf[..len]).unwrap(), (narrow, len));

    let narrow = value as u16;
    let len = encode_u16(narrow, &mut buf);
    assert_eq!(decode_u16(&buf[..len]).unwrap(), (narrow, len));
});
