/// Errors raised while validating the fixed stream header.
///
/// Everything after the header is validated by `gw-decoder`; this enum only
/// covers the bytes that decide how the rest of the stream is read.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Input ended before a complete header could be read.
    #[error("unexpected end of header at offset {offset}")]
    UnexpectedEof { offset: usize },

    /// The 8-byte signature did not read "NCBIgnld".
    #[error("bad header signature")]
    BadSignature { found: [u8; 8] },

    /// The byte-order marker is the good marker with its bytes swapped.
    ///
    /// Kept apart from [`WireError::BadByteOrder`] because it names a
    /// specific, fixable problem: the writer ran on a machine of the
    /// opposite endianness.
    #[error("reversed header byte order")]
    ReversedByteOrder,

    /// The byte-order marker is neither the good nor the reversed value.
    #[error("bad header byte order ({found:#010X})")]
    BadByteOrder { found: u32 },

    /// Version 0 is never valid.
    #[error("bad header version")]
    BadVersion,

    /// A version newer than this decoder understands.
    #[error("unknown header version {version}")]
    UnknownVersion { version: u32 },

    /// The v1 packing flag was neither 0 nor 1.
    #[error("bad packing spec ({value})")]
    BadPacking { value: u32 },
}
