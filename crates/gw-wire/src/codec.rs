//! UTF-8-like variable-length integer codec.
//!
//! Packed-integer cell payloads store each element as a self-terminating
//! byte sequence. The leading byte alone says how many bytes follow, so the
//! length is known before the destination width is considered; the width
//! only decides which values fit.
//!
//! ```text
//! ┌──────────────┬───────┬────────────┐
//! │ Leading byte │ Bytes │ Value bits │
//! ├──────────────┼───────┼────────────┤
//! │ 0xxxxxxx     │ 1     │ 7          │
//! │ 110xxxxx     │ 2     │ 11         │
//! │ 1110xxxx     │ 3     │ 16         │
//! │ 11110xxx     │ 4     │ 21         │
//! │ 111110xx     │ 5     │ 26         │
//! │ 1111110x     │ 6     │ 31         │
//! │ 11111110     │ 7     │ 36         │
//! │ 11111111     │ 12    │ 66         │
//! └──────────────┴───────┴────────────┘
//! ```
//!
//! Every following byte is a continuation byte `10xxxxxx` carrying six
//! value bits, most significant first.

/// Longest encoding of any value (the `0xFF` form).
pub const MAX_ENCODED_LEN: usize = 12;

/// Longest encoding a `u16` can need.
pub const MAX_U16_LEN: usize = 3;

/// Longest encoding a `u32` can need.
pub const MAX_U32_LEN: usize = 7;

const EXTENDED_LEAD: u8 = 0xFF;

/// Failure of a single decode.
///
/// The C writer library reports these as negative sentinel return values;
/// [`CodecError::code`] recovers them for diagnostics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The window ended before the encoding did.
    #[error("insufficient buffer")]
    InsufficientBuffer,

    /// A leading or continuation byte broke the encoding rules, or the
    /// value does not fit the destination width.
    #[error("invalid format")]
    InvalidFormat,

    /// Catch-all kept for parity with the writer library's error codes.
    #[error("unknown error")]
    Unknown,
}

impl CodecError {
    /// The writer library's sentinel value for this error.
    pub const fn code(self) -> i32 {
        match self {
            Self::InsufficientBuffer => -1,
            Self::InvalidFormat => -2,
            Self::Unknown => -3,
        }
    }
}

/// Total sequence length announced by a leading byte, or `None` when the
/// byte is a continuation byte.
fn sequence_len(lead: u8) -> Option<usize> {
    match lead.leading_ones() {
        0 => Some(1),
        1 => None,
        8 => Some(MAX_ENCODED_LEN),
        n => Some(n as usize),
    }
}

/// Value bits carried by the leading byte of a `len`-byte sequence.
fn lead_payload(lead: u8, len: usize) -> u64 {
    let mask = match len {
        1 => 0x7F,
        MAX_ENCODED_LEN => 0x00,
        #[allow(clippy::cast_possible_truncation)]
        n => 0xFF_u8.checked_shr(n as u32 + 1).unwrap_or(0),
    };
    u64::from(lead & mask)
}

fn decode_raw(window: &[u8]) -> Result<(u64, usize), CodecError> {
    let &lead = window.first().ok_or(CodecError::InsufficientBuffer)?;
    let len = sequence_len(lead).ok_or(CodecError::InvalidFormat)?;
    if window.len() < len {
        return Err(CodecError::InsufficientBuffer);
    }

    let mut value = lead_payload(lead, len);
    for &byte in &window[1..len] {
        if byte & 0xC0 != 0x80 {
            return Err(CodecError::InvalidFormat);
        }
        // 66-bit form: the top two bits must stay clear
        if value >> 58 != 0 {
            return Err(CodecError::InvalidFormat);
        }
        value = (value << 6) | u64::from(byte & 0x3F);
    }

    Ok((value, len))
}

/// Decode one integer into a 16-bit destination.
///
/// # Returns
///
/// `(value, bytes_consumed)`; `bytes_consumed` is always > 0.
///
/// # Errors
///
/// - [`CodecError::InsufficientBuffer`] if `window` is empty or shorter than
///   the length announced by its leading byte.
/// - [`CodecError::InvalidFormat`] for a continuation byte in leading
///   position, a malformed continuation byte, or a value above `u16::MAX`.
pub fn decode_u16(window: &[u8]) -> Result<(u16, usize), CodecError> {
    let (value, len) = decode_raw(window)?;
    let value = u16::try_from(value).map_err(|_| CodecError::InvalidFormat)?;
    Ok((value, len))
}

/// Decode one integer into a 32-bit destination.
///
/// # Errors
///
/// As [`decode_u16`], with `u32::MAX` as the range limit.
pub fn decode_u32(window: &[u8]) -> Result<(u32, usize), CodecError> {
    let (value, len) = decode_raw(window)?;
    let value = u32::try_from(value).map_err(|_| CodecError::InvalidFormat)?;
    Ok((value, len))
}

/// Decode one integer into a 64-bit destination.
///
/// # Errors
///
/// As [`decode_u16`]; only the 12-byte form can exceed the range.
pub fn decode_u64(window: &[u8]) -> Result<(u64, usize), CodecError> {
    decode_raw(window)
}

fn encoded_len(value: u64) -> usize {
    match 64 - value.leading_zeros() {
        0..=7 => 1,
        8..=11 => 2,
        12..=16 => 3,
        17..=21 => 4,
        22..=26 => 5,
        27..=31 => 6,
        32..=36 => 7,
        _ => MAX_ENCODED_LEN,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn encode_raw(value: u64, buf: &mut [u8]) -> usize {
    let len = encoded_len(value);
    if len == 1 {
        buf[0] = value as u8;
        return 1;
    }

    let tail = len - 1;
    for i in 0..tail {
        let shift = 6 * (tail - 1 - i);
        buf[1 + i] = 0x80 | ((value >> shift) & 0x3F) as u8;
    }

    buf[0] = if len == MAX_ENCODED_LEN {
        EXTENDED_LEAD
    } else {
        !(0xFF_u8 >> len) | (value >> (6 * tail)) as u8
    };
    len
}

/// Encode a `u16` using the shortest sequence.
///
/// # Returns
///
/// The number of bytes written (1–3).
///
/// # Panics
///
/// Panics if `buf` is shorter than the encoding. [`MAX_U16_LEN`] bytes
/// always suffice.
pub fn encode_u16(value: u16, buf: &mut [u8]) -> usize {
    encode_raw(u64::from(value), buf)
}

/// Encode a `u32` using the shortest sequence (1–7 bytes).
///
/// # Panics
///
/// Panics if `buf` is shorter than the encoding. [`MAX_U32_LEN`] bytes
/// always suffice.
pub fn encode_u32(value: u32, buf: &mut [u8]) -> usize {
    encode_raw(u64::from(value), buf)
}

/// Encode a `u64` using the shortest sequence (1–7 or 12 bytes).
///
/// # Panics
///
/// Panics if `buf` is shorter than the encoding. [`MAX_ENCODED_LEN`] bytes
/// always suffice.
pub fn encode_u64(value: u64, buf: &mut [u8]) -> usize {
    encode_raw(value, buf)
}

/// Destination width for a packed-integer column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntWidth {
    U16,
    U32,
    U64,
}

impl IntWidth {
    /// Map a column's element bit width to a codec width.
    ///
    /// Only 16, 32 and 64 are valid for packed-integer columns.
    pub fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            16 => Some(Self::U16),
            32 => Some(Self::U32),
            64 => Some(Self::U64),
            _ => None,
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            Self::U16 => 16,
            Self::U32 => 32,
            Self::U64 => 64,
        }
    }

    /// Size of one unpacked element in bytes.
    pub const fn byte_size(self) -> usize {
        match self {
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
        }
    }

    /// Decode one integer at this width, widened to `u64`.
    ///
    /// # Errors
    ///
    /// See [`decode_u16`].
    pub fn decode(self, window: &[u8]) -> Result<(u64, usize), CodecError> {
        match self {
            Self::U16 => decode_u16(window).map(|(v, n)| (u64::from(v), n)),
            Self::U32 => decode_u32(window).map(|(v, n)| (u64::from(v), n)),
            Self::U64 => decode_u64(window),
        }
    }
}

/// Walk a packed-integer payload end to end.
///
/// Decodes integers until the buffer is consumed exactly and returns the
/// unpacked size in bytes (element count × element byte size). An empty
/// buffer holds zero elements.
///
/// # Errors
///
/// The first [`CodecError`] hit. Stray bytes after the last complete
/// element surface as whatever the codec makes of them, usually
/// [`CodecError::InsufficientBuffer`].
pub fn check_int_packing(width: IntWidth, data: &[u8]) -> Result<usize, CodecError> {
    let mut cursor = 0;
    let mut unpacked_size = 0;

    while cursor < data.len() {
        let (_, consumed) = width.decode(&data[cursor..])?;
        cursor += consumed;
        unpacked_size += width.byte_size();
    }

    Ok(unpacked_size)
}
