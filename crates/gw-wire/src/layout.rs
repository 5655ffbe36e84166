use crate::error::WireError;
use crate::event_kind::EventKind;

/// Stream-wide framing, fixed by the header's packing flag.
///
/// ```text
/// ┌───────────┬──────┬────────────────────────────┬───────────────┐
/// │ Framing   │ Flag │ Event prefix               │ Size fields   │
/// ├───────────┼──────┼────────────────────────────┼───────────────┤
/// │ Unpacked  │ 0    │ u32: kind << 24 | id       │ u32           │
/// │ Packed    │ 1    │ u8 kind, u8 id             │ u8 (u16 wide) │
/// └───────────┴──────┴────────────────────────────┴───────────────┘
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Framing {
    Unpacked,
    Packed,
}

impl Framing {
    /// Interpret the v1 header's packing field.
    ///
    /// # Errors
    ///
    /// [`WireError::BadPacking`] for any value other than 0 or 1.
    pub fn from_packing_flag(value: u32) -> Result<Self, WireError> {
        match value {
            0 => Ok(Self::Unpacked),
            1 => Ok(Self::Packed),
            _ => Err(WireError::BadPacking { value }),
        }
    }

    pub fn packing_flag(self) -> u32 {
        match self {
            Self::Unpacked => 0,
            Self::Packed => 1,
        }
    }

    /// Bytes in the event prefix that carries the kind and referenced id.
    pub fn prefix_len(self) -> usize {
        match self {
            Self::Unpacked => 4,
            Self::Packed => 2,
        }
    }

    /// Split a raw prefix into `(kind code, referenced id)`.
    ///
    /// `prefix` must hold exactly [`Framing::prefix_len`] bytes.
    pub fn split_prefix(self, prefix: &[u8]) -> (u8, u32) {
        match self {
            Self::Unpacked => {
                let mut word = [0u8; 4];
                word.copy_from_slice(&prefix[..4]);
                let word = u32::from_le_bytes(word);
                #[allow(clippy::cast_possible_truncation)]
                let kind = (word >> 24) as u8;
                (kind, word & 0x00FF_FFFF)
            }
            Self::Packed => (prefix[0], u32::from(prefix[1])),
        }
    }

    /// Inverse of [`Framing::split_prefix`]. Ids wider than the framing
    /// allows are truncated.
    #[allow(clippy::cast_possible_truncation)]
    pub fn join_prefix(self, kind: u8, id: u32) -> Vec<u8> {
        match self {
            Self::Unpacked => ((u32::from(kind) << 24) | (id & 0x00FF_FFFF))
                .to_le_bytes()
                .to_vec(),
            Self::Packed => vec![kind, id as u8],
        }
    }
}

impl std::fmt::Display for Framing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unpacked => f.write_str("unpacked"),
            Self::Packed => f.write_str("packed"),
        }
    }
}

/// How many physical bytes back a variable-length payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Padding {
    /// Exactly the logical length.
    None,
    /// Rounded up to a whole number of 4-byte words.
    Word,
}

impl Padding {
    pub fn padded_len(self, len: usize) -> usize {
        match self {
            Self::None => len,
            Self::Word => len.div_ceil(4) * 4,
        }
    }
}

/// Framing × width: the field layout of one event's fixed part.
///
/// Every fixed field after the prefix is read with [`Layout::field_width`]
/// bytes, except move-ahead's row count, which is always 8.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// u32 fields, unpadded strings.
    Unpacked,
    /// u8 fields, word-padded strings.
    Packed,
    /// u16 size fields, word-padded strings. Wide kinds only.
    PackedWide,
}

impl Layout {
    pub fn for_event(framing: Framing, kind: EventKind) -> Self {
        match framing {
            Framing::Unpacked => Self::Unpacked,
            Framing::Packed if kind.is_wide() => Self::PackedWide,
            Framing::Packed => Self::Packed,
        }
    }

    /// Byte width of size, id and count fields.
    pub fn field_width(self) -> usize {
        match self {
            Self::Unpacked => 4,
            Self::Packed => 1,
            Self::PackedWide => 2,
        }
    }

    /// Padding applied to string payloads.
    pub fn string_padding(self) -> Padding {
        match self {
            Self::Unpacked => Padding::None,
            Self::Packed | Self::PackedWide => Padding::Word,
        }
    }

    pub fn framing(self) -> Framing {
        match self {
            Self::Unpacked => Framing::Unpacked,
            Self::Packed | Self::PackedWide => Framing::Packed,
        }
    }

    /// Largest value a size field can hold.
    pub fn max_field_value(self) -> u64 {
        match self {
            Self::Unpacked => u64::from(u32::MAX),
            Self::Packed => u64::from(u8::MAX),
            Self::PackedWide => u64::from(u16::MAX),
        }
    }
}
