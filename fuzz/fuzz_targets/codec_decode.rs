#![no_main]

use libfuzzer_sys::fuzz_target;

// Fuzz target: packed-integer codec on raw bytes.
//
// Catches bugs in:
// - Leading bytes announcing more bytes than the window holds
// - Continuation bytes in leading position
// - The 12-byte extended form overflowing 64 bits
// - Range checks for 16- and 32-bit destinations
fuzz_target!(|data: &[u8]| {
    use gw_wire::codec::{check_int_packing, decode_u16, decode_u32, decode_u64};
    use gw_wire::IntWidth;

    if let Ok((_, len)) = decode_u16(data) {
        assert!(len > 0 && len <= data.len());
    }
    if let Ok((_, len)) = decode_u32(data) {
        assert!(len > 0 && len <= data.len());
    }
    if let Ok((_, len)) = decode_u64(data) {
        assert!(len > 0 && len <= data.len());
    }

    for width in [IntWidth::U16, IntWidth::U32, IntWidth::U64] {
        if let Ok(size) = check_int_packing(width, data) {
            assert_eq!(size % width.byte_size(), 0);
        }
    }
});
