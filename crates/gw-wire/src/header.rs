use crate::error::WireError;
use crate::layout::Framing;

/// Signature: ASCII "NCBIgnld", compared as raw bytes.
pub const SIGNATURE: [u8; 8] = *b"NCBIgnld";

/// Byte-order marker as written by a writer with the reader's endianness.
pub const BYTE_ORDER_GOOD: u32 = 1;

/// The good marker seen through the opposite endianness.
pub const BYTE_ORDER_REVERSED: u32 = 0x0100_0000;

/// Newest header version this crate understands.
pub const CURRENT_VERSION: u32 = 1;

/// Bytes common to every header version.
pub const BASE_HEADER_SIZE: usize = 20;

/// Bytes the v1 header adds after the base (the packing flag).
pub const V1_EXTENSION_SIZE: usize = 4;

/// Total size of a v1 header.
pub const V1_HEADER_SIZE: usize = BASE_HEADER_SIZE + V1_EXTENSION_SIZE;

/// The version-independent part of the stream header.
///
/// ```text
/// ┌────────┬─────────┬──────────────────────────────────┐
/// │ Offset │ Size    │ Description                      │
/// ├────────┼─────────┼──────────────────────────────────┤
/// │ 0x00   │ 8 bytes │ Signature: "NCBIgnld"            │
/// │ 0x08   │ 4 bytes │ Byte order (1 = native)          │
/// │ 0x0C   │ 4 bytes │ Version                          │
/// │ 0x10   │ 4 bytes │ Header size (informational)      │
/// └────────┴─────────┴──────────────────────────────────┘
/// ```
///
/// All integers are little-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BaseHeader {
    pub version: u32,
    /// Size the writer claims for the whole header. Reported, never
    /// used to position the reader.
    pub header_size: u32,
}

fn le_u32(buf: &[u8], offset: usize) -> u32 {
    let mut word = [0u8; 4];
    word.copy_from_slice(&buf[offset..offset + 4]);
    u32::from_le_bytes(word)
}

impl BaseHeader {
    /// Parse and validate the first [`BASE_HEADER_SIZE`] bytes of `buf`.
    ///
    /// Checks run in a fixed order so each malformed header gets the most
    /// specific diagnosis: signature, then byte order, then version.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `buf` is too short.
    /// - [`WireError::BadSignature`] if the signature doesn't match.
    /// - [`WireError::ReversedByteOrder`] / [`WireError::BadByteOrder`] for
    ///   a wrong byte-order marker.
    /// - [`WireError::BadVersion`] for version 0.
    /// - [`WireError::UnknownVersion`] for versions newer than
    ///   [`CURRENT_VERSION`].
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        if buf.len() < BASE_HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        if buf[0..8] != SIGNATURE {
            let mut found = [0u8; 8];
            found.copy_from_slice(&buf[0..8]);
            return Err(WireError::BadSignature { found });
        }

        match le_u32(buf, 8) {
            BYTE_ORDER_GOOD => {}
            BYTE_ORDER_REVERSED => return Err(WireError::ReversedByteOrder),
            found => return Err(WireError::BadByteOrder { found }),
        }

        let version = le_u32(buf, 12);
        if version == 0 {
            return Err(WireError::BadVersion);
        }
        if version > CURRENT_VERSION {
            return Err(WireError::UnknownVersion { version });
        }

        Ok(Self {
            version,
            header_size: le_u32(buf, 16),
        })
    }

    /// Write the base header into `buf`.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`BASE_HEADER_SIZE`].
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < BASE_HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        buf[0..8].copy_from_slice(&SIGNATURE);
        buf[8..12].copy_from_slice(&BYTE_ORDER_GOOD.to_le_bytes());
        buf[12..16].copy_from_slice(&self.version.to_le_bytes());
        buf[16..20].copy_from_slice(&self.header_size.to_le_bytes());
        Ok(())
    }
}

/// A validated v1 stream header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamHeader {
    pub version: u32,
    pub header_size: u32,
    pub framing: Framing,
}

impl StreamHeader {
    /// A current-version header for the given framing.
    pub fn new(framing: Framing) -> Self {
        Self {
            version: CURRENT_VERSION,
            #[allow(clippy::cast_possible_truncation)]
            header_size: V1_HEADER_SIZE as u32,
            framing,
        }
    }

    /// Complete a v1 header from its validated base and the 4-byte
    /// extension that follows it.
    ///
    /// # Errors
    ///
    /// - [`WireError::UnexpectedEof`] if `extension` is too short.
    /// - [`WireError::BadPacking`] if the packing flag is not 0 or 1.
    pub fn from_v1(base: BaseHeader, extension: &[u8]) -> Result<Self, WireError> {
        if extension.len() < V1_EXTENSION_SIZE {
            return Err(WireError::UnexpectedEof {
                offset: BASE_HEADER_SIZE + extension.len(),
            });
        }

        let framing = Framing::from_packing_flag(le_u32(extension, 0))?;
        Ok(Self {
            version: base.version,
            header_size: base.header_size,
            framing,
        })
    }

    /// Parse a complete v1 header from a contiguous buffer.
    ///
    /// # Errors
    ///
    /// Anything [`BaseHeader::read_from`] or [`StreamHeader::from_v1`]
    /// reports.
    pub fn read_from(buf: &[u8]) -> Result<Self, WireError> {
        let base = BaseHeader::read_from(buf)?;
        Self::from_v1(base, &buf[BASE_HEADER_SIZE..])
    }

    /// Write the full v1 header into `buf`.
    ///
    /// # Errors
    ///
    /// [`WireError::UnexpectedEof`] if `buf` is shorter than
    /// [`V1_HEADER_SIZE`].
    pub fn write_to(&self, buf: &mut [u8]) -> Result<(), WireError> {
        if buf.len() < V1_HEADER_SIZE {
            return Err(WireError::UnexpectedEof { offset: buf.len() });
        }

        BaseHeader {
            version: self.version,
            header_size: self.header_size,
        }
        .write_to(buf)?;
        buf[20..24].copy_from_slice(&self.framing.packing_flag().to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(framing: Framing) -> [u8; V1_HEADER_SIZE] {
        let mut buf = [0u8; V1_HEADER_SIZE];
        StreamHeader::new(framing).write_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn roundtrip_both_framings() {
        for framing in [Framing::Unpacked, Framing::Packed] {
            let buf = header_bytes(framing);
            let parsed = StreamHeader::read_from(&buf).unwrap();
            assert_eq!(parsed, StreamHeader::new(framing));
            assert_eq!(parsed.header_size, 24);
        }
    }

    #[test]
    fn signature_is_ascii() {
        let buf = header_bytes(Framing::Unpacked);
        assert_eq!(&buf[0..8], b"NCBIgnld");
        assert_eq!(&buf[8..12], &[1, 0, 0, 0]);
    }

    #[test]
    fn reject_bad_signature() {
        let mut buf = header_bytes(Framing::Unpacked);
        buf[0..8].copy_from_slice(b"NCBIgnlX");
        assert!(matches!(
            StreamHeader::read_from(&buf),
            Err(WireError::BadSignature { found }) if &found == b"NCBIgnlX"
        ));
    }

    #[test]
    fn signature_checked_before_byte_order() {
        let mut buf = header_bytes(Framing::Unpacked);
        buf[0] = b'X';
        buf[8..12].copy_from_slice(&[9, 9, 9, 9]);
        assert!(matches!(
            BaseHeader::read_from(&buf),
            Err(WireError::BadSignature { .. })
        ));
    }

    #[test]
    fn reversed_byte_order_is_named() {
        let mut buf = header_bytes(Framing::Unpacked);
        buf[8..12].copy_from_slice(&[0, 0, 0, 1]);
        assert!(matches!(
            BaseHeader::read_from(&buf),
            Err(WireError::ReversedByteOrder)
        ));
    }

    #[test]
    fn other_byte_order_is_bad() {
        let mut buf = header_bytes(Framing::Unpacked);
        buf[8..12].copy_from_slice(&[2, 0, 0, 0]);
        assert!(matches!(
            BaseHeader::read_from(&buf),
            Err(WireError::BadByteOrder { found: 2 })
        ));
    }

    #[test]
    fn version_zero_is_bad() {
        let mut buf = header_bytes(Framing::Unpacked);
        buf[12..16].copy_from_slice(&0u32.to_le_bytes());
        assert!(matches!(
            BaseHeader::read_from(&buf),
            Err(WireError::BadVersion)
        ));
    }

    #[test]
    fn future_version_is_unknown() {
        let mut buf = header_bytes(Framing::Unpacked);
        buf[12..16].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            BaseHeader::read_from(&buf),
            Err(WireError::UnknownVersion { version: 2 })
        ));
    }

    #[test]
    fn header_size_is_not_validated() {
        let mut buf = header_bytes(Framing::Packed);
        buf[16..20].copy_from_slice(&999u32.to_le_bytes());
        let parsed = StreamHeader::read_from(&buf).unwrap();
        assert_eq!(parsed.header_size, 999);
        assert_eq!(parsed.framing, Framing::Packed);
    }

    #[test]
    fn reject_bad_packing() {
        let mut buf = header_bytes(Framing::Unpacked);
        buf[20..24].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            StreamHeader::read_from(&buf),
            Err(WireError::BadPacking { value: 2 })
        ));
    }

    #[test]
    fn reject_short_buffers() {
        let buf = header_bytes(Framing::Unpacked);
        assert!(matches!(
            BaseHeader::read_from(&buf[..19]),
            Err(WireError::UnexpectedEof { offset: 19 })
        ));
        assert!(matches!(
            StreamHeader::read_from(&buf[..22]),
            Err(WireError::UnexpectedEof { offset: 22 })
        ));
    }
}
