use std::io::{self, Read};

use gw_wire::Padding;

use crate::error::DecodeError;

/// Blocking byte reader that tracks how much of the stream it has consumed.
///
/// All fixed fields are little-endian. Short reads are reported as
/// [`DecodeError::Truncated`] with a caller-supplied description of what
/// was being read.
pub struct ByteReader<R> {
    inner: R,
    offset: u64,
}

impl<R: Read> ByteReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, offset: 0 }
    }

    /// Bytes consumed from the stream so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read until `buf` is full or the source hits EOF.
    ///
    /// Returns the number of bytes read; anything less than `buf.len()`
    /// means EOF was reached.
    ///
    /// # Errors
    ///
    /// Any I/O error other than [`io::ErrorKind::Interrupted`].
    pub fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => {
                    filled += n;
                    self.offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    /// Fill `buf` completely.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Truncated`] carrying `what` on a short read, or
    /// [`DecodeError::Io`].
    pub fn read_exact(&mut self, buf: &mut [u8], what: &'static str) -> Result<(), DecodeError> {
        if self.fill(buf)? < buf.len() {
            return Err(DecodeError::Truncated { what });
        }
        Ok(())
    }

    /// Read a little-endian unsigned field of `width` bytes (1, 2, 4 or 8).
    ///
    /// # Errors
    ///
    /// As [`ByteReader::read_exact`].
    pub fn read_uint(&mut self, width: usize, what: &'static str) -> Result<u64, DecodeError> {
        debug_assert!(matches!(width, 1 | 2 | 4 | 8), "unsupported field width {width}");
        let mut bytes = [0u8; 8];
        self.read_exact(&mut bytes[..width], what)?;
        Ok(u64::from_le_bytes(bytes))
    }

    pub fn read_u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte, what)?;
        Ok(byte[0])
    }

    pub fn read_u32(&mut self, what: &'static str) -> Result<u32, DecodeError> {
        let mut bytes = [0u8; 4];
        self.read_exact(&mut bytes, what)?;
        Ok(u32::from_le_bytes(bytes))
    }

    pub fn read_u64(&mut self, what: &'static str) -> Result<u64, DecodeError> {
        let mut bytes = [0u8; 8];
        self.read_exact(&mut bytes, what)?;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Read a variable-length payload of `len` logical bytes.
    ///
    /// With [`Padding::Word`] the physical run is rounded up to a whole
    /// number of 4-byte words; the padding is consumed and dropped.
    /// The buffer grows as bytes arrive, so a corrupt length costs at most
    /// what the source actually holds.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Truncated`] carrying `what` if the source ends
    /// before the padded run does.
    pub fn read_payload(
        &mut self,
        len: usize,
        padding: Padding,
        what: &'static str,
    ) -> Result<Vec<u8>, DecodeError> {
        let physical = padding.padded_len(len);
        let mut data = Vec::new();
        let read = self
            .inner
            .by_ref()
            .take(physical as u64)
            .read_to_end(&mut data)?;
        self.offset += read as u64;

        if data.len() < physical {
            return Err(DecodeError::Truncated { what });
        }
        data.truncate(len);
        Ok(data)
    }

    /// True if the source has no more bytes.
    ///
    /// Consumes at most one byte, so it is only meaningful once the caller
    /// expects the stream to be over. The probed byte is not counted: the
    /// offset stays where the stream should have ended.
    ///
    /// # Errors
    ///
    /// [`DecodeError::Io`] from the source.
    pub fn at_eof(&mut self) -> Result<bool, DecodeError> {
        let mut probe = [0u8; 1];
        let read = self.fill(&mut probe)?;
        self.offset -= read as u64;
        Ok(read == 0)
    }
}
