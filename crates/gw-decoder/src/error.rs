use gw_wire::{CodecError, WireError};

/// Errors that can occur while decoding a general-writer stream.
///
/// Every variant is fatal to the stream that raised it. The driver wraps
/// these in a [`StreamError`] carrying the byte offset and event number.
///
/// ```text
///   DecodeError
///   ├── InvalidHeader(WireError)  ← signature, byte order, version, packing
///   ├── Truncated                 ← a fixed field or payload ended early
///   ├── Corrupt                   ← ids, names or sizes that break the rules
///   ├── UnrecognizedKind          ← kind byte outside the known codes
///   ├── FormatMismatch            ← event not valid under this framing
///   ├── Codec                     ← packed-integer payload failed to decode
///   ├── TrailingData              ← bytes after end-stream
///   ├── EofBeforeEnd              ← clean EOF where an event was expected
///   └── Io(std::io::Error)        ← from the underlying reader
/// ```
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The stream header failed validation.
    #[error(transparent)]
    InvalidHeader(WireError),

    /// A read came up short. `what` names the part being read.
    #[error("{what}")]
    Truncated { what: &'static str },

    /// A structurally invalid event: bad or out-of-order ids, empty
    /// names, ids that reference nothing.
    #[error("{reason}")]
    Corrupt { reason: &'static str },

    #[error("unrecognized event id {code}")]
    UnrecognizedKind { code: u8 },

    /// The event exists, but not in this form under this stream's
    /// framing (wide kinds in an unpacked stream, packed-integer columns
    /// with unsupported widths).
    #[error("{reason}")]
    FormatMismatch { reason: &'static str },

    /// A packed-integer cell payload failed to decode.
    #[error("{}", packed_int_message(.source))]
    Codec { source: CodecError },

    #[error("excess data after end-stream")]
    TrailingData,

    #[error("EOF before end-stream")]
    EofBeforeEnd,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn packed_int_message(err: &CodecError) -> &'static str {
    match err {
        CodecError::InsufficientBuffer => "truncated data in packed integer buffer",
        CodecError::InvalidFormat => "corrupt data in packed integer buffer",
        CodecError::Unknown => "unknown error in packed integer buffer",
    }
}

impl From<WireError> for DecodeError {
    fn from(err: WireError) -> Self {
        Self::InvalidHeader(err)
    }
}

/// Coarse classification of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidHeader,
    TruncatedRead,
    CorruptStructure,
    UnrecognizedKind,
    FormatMismatch,
    CodecFailure,
    TrailingData,
    EofBeforeEnd,
    Io,
}

impl DecodeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidHeader(_) => ErrorKind::InvalidHeader,
            Self::Truncated { .. } => ErrorKind::TruncatedRead,
            Self::Corrupt { .. } => ErrorKind::CorruptStructure,
            Self::UnrecognizedKind { .. } => ErrorKind::UnrecognizedKind,
            Self::FormatMismatch { .. } => ErrorKind::FormatMismatch,
            Self::Codec { .. } => ErrorKind::CodecFailure,
            Self::TrailingData => ErrorKind::TrailingData,
            Self::EofBeforeEnd => ErrorKind::EofBeforeEnd,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

/// A [`DecodeError`] with the position it was raised at.
///
/// `offset` is the number of stream bytes consumed when decoding stopped.
/// `event` is the 1-based number of the event being decoded, or 0 while
/// the header is still being read.
#[derive(Debug, thiserror::Error)]
#[error("offset {offset}: event {event}: {source}")]
pub struct StreamError {
    pub offset: u64,
    pub event: u64,
    #[source]
    pub source: DecodeError,
}

impl StreamError {
    pub fn kind(&self) -> ErrorKind {
        self.source.kind()
    }
}
