//! Fixture writer for general-writer streams.
//!
//! [`StreamBuilder`] lays out events byte for byte the way a writer would,
//! under either framing. It writes exactly what it is told, ids and sizes
//! included, so tests can produce malformed streams as easily as valid
//! ones. It is test tooling only; nothing here validates.

use std::collections::HashMap;

use gw_wire::codec::{MAX_ENCODED_LEN, encode_u16, encode_u32, encode_u64};
use gw_wire::event_kind::code;
use gw_wire::header::V1_HEADER_SIZE;
use gw_wire::{Framing, Padding, StreamHeader};

pub mod fixtures;

/// Chainable stream writer.
///
/// ```
/// use gw_tests::StreamBuilder;
///
/// let bytes = StreamBuilder::packed()
///     .open_stream()
///     .new_table(1, "SEQUENCE")
///     .end_stream()
///     .finish();
/// assert_eq!(&bytes[..8], b"NCBIgnld");
/// ```
#[derive(Clone, Debug)]
pub struct StreamBuilder {
    framing: Framing,
    buf: Vec<u8>,
    /// Element widths of declared columns, for deriving unpacked counts.
    column_bits: HashMap<u32, u32>,
    wide_next: bool,
}

/// A valid v1 header for `framing`.
pub fn header_bytes(framing: Framing) -> [u8; V1_HEADER_SIZE] {
    let mut buf = [0u8; V1_HEADER_SIZE];
    StreamHeader::new(framing)
        .write_to(&mut buf)
        .expect("buffer is exactly one header long");
    buf
}

impl StreamBuilder {
    /// An unpacked stream, header already written.
    pub fn unpacked() -> Self {
        Self::with_header(Framing::Unpacked)
    }

    /// A packed stream, header already written.
    pub fn packed() -> Self {
        Self::with_header(Framing::Packed)
    }

    pub fn with_header(framing: Framing) -> Self {
        Self::headerless(framing).raw(&header_bytes(framing))
    }

    /// Events laid out for `framing` with no header in front. Use
    /// [`StreamBuilder::raw`] to supply a hand-made one.
    pub fn headerless(framing: Framing) -> Self {
        Self {
            framing,
            buf: Vec::new(),
            column_bits: HashMap::new(),
            wide_next: false,
        }
    }

    pub fn framing(&self) -> Framing {
        self.framing
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.buf)
    }

    /// Append bytes verbatim.
    #[must_use]
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.buf.extend_from_slice(bytes);
        self
    }

    /// Append an event prefix for any kind byte, valid or not.
    #[must_use]
    pub fn prefix(mut self, kind: u8, id: u32) -> Self {
        let bytes = self.framing.join_prefix(kind, id);
        self.buf.extend_from_slice(&bytes);
        self
    }

    /// Use the wide ("2") kind for the next string or cell event even if
    /// its sizes fit a byte. Ignored under unpacked framing.
    #[must_use]
    pub fn wide(mut self) -> Self {
        self.wide_next = true;
        self
    }

    fn is_packed(&self) -> bool {
        self.framing == Framing::Packed
    }

    /// Pick narrow or wide kind for a packed event whose largest size
    /// field is `max_size`.
    fn kind_for(&mut self, narrow: u8, wide: u8, max_size: usize) -> u8 {
        let forced = std::mem::take(&mut self.wide_next);
        if self.is_packed() && (forced || max_size > usize::from(u8::MAX)) {
            wide
        } else {
            narrow
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn size_field(&mut self, kind: u8, value: usize) {
        if !self.is_packed() {
            self.buf.extend_from_slice(&(value as u32).to_le_bytes());
        } else if kind >= code::ERROR_MESSAGE_2 {
            self.buf.extend_from_slice(&(value as u16).to_le_bytes());
        } else {
            self.buf.push(value as u8);
        }
    }

    fn string_payload(&mut self, bytes: &[u8]) {
        let padding = if self.is_packed() {
            Padding::Word
        } else {
            Padding::None
        };
        self.buf.extend_from_slice(bytes);
        self.buf
            .resize(self.buf.len() + padding.padded_len(bytes.len()) - bytes.len(), 0);
    }

    fn one_string(mut self, narrow: u8, wide: u8, id: u32, text: &str) -> Self {
        let kind = self.kind_for(narrow, wide, text.len());
        self = self.prefix(kind, id);
        self.size_field(kind, text.len());
        self.string_payload(text.as_bytes());
        self
    }

    #[must_use]
    pub fn open_stream(self) -> Self {
        self.prefix(code::OPEN_STREAM, 0)
    }

    #[must_use]
    pub fn end_stream(self) -> Self {
        self.prefix(code::END_STREAM, 0)
    }

    #[must_use]
    pub fn new_table(self, table_id: u32, name: &str) -> Self {
        self.one_string(code::NEW_TABLE, code::NEW_TABLE_2, table_id, name)
    }

    #[must_use]
    pub fn remote_path(self, path: &str) -> Self {
        self.one_string(code::REMOTE_PATH, code::REMOTE_PATH_2, 0, path)
    }

    #[must_use]
    pub fn error_message(self, message: &str) -> Self {
        self.one_string(code::ERROR_MESSAGE, code::ERROR_MESSAGE_2, 0, message)
    }

    #[must_use]
    pub fn use_schema(mut self, schema_file: &str, schema_spec: &str) -> Self {
        let kind = self.kind_for(
            code::USE_SCHEMA,
            code::USE_SCHEMA_2,
            schema_file.len().max(schema_spec.len()),
        );
        self = self.prefix(kind, 0);
        self.size_field(kind, schema_file.len());
        self.size_field(kind, schema_spec.len());
        let joined = [schema_file.as_bytes(), schema_spec.as_bytes()].concat();
        self.string_payload(&joined);
        self
    }

    /// Declare a column. Under unpacked framing `elem_bits` must fit 24
    /// bits; under packed framing every field is a single byte.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn new_column(
        mut self,
        column_id: u32,
        table_id: u32,
        name: &str,
        elem_bits: u32,
        flag_bits: u8,
    ) -> Self {
        self.column_bits.insert(column_id, elem_bits);
        self = self.prefix(code::NEW_COLUMN, column_id);
        if self.is_packed() {
            self.buf.extend_from_slice(&[
                table_id as u8,
                elem_bits as u8,
                flag_bits,
                name.len() as u8,
            ]);
        } else {
            let bits_and_flags = (u32::from(flag_bits) << 24) | (elem_bits & 0x00FF_FFFF);
            self.buf.extend_from_slice(&table_id.to_le_bytes());
            self.buf.extend_from_slice(&bits_and_flags.to_le_bytes());
            self.buf.extend_from_slice(&(name.len() as u32).to_le_bytes());
        }
        self.string_payload(name.as_bytes());
        self
    }

    #[allow(clippy::cast_possible_truncation)]
    fn cell(mut self, narrow: u8, wide: u8, column_id: u32, elem_count: u64, data: &[u8]) -> Self {
        let kind = self.kind_for(narrow, wide, data.len());
        self = self.prefix(kind, column_id);
        if self.is_packed() {
            self.size_field(kind, data.len());
            self.buf.extend_from_slice(data);
        } else {
            self.buf.extend_from_slice(&(elem_count as u32).to_le_bytes());
            self.buf.extend_from_slice(data);
            let padded = Padding::Word.padded_len(data.len());
            self.buf.resize(self.buf.len() + padded - data.len(), 0);
        }
        self
    }

    fn derived_count(&self, column_id: u32, data: &[u8]) -> u64 {
        let bits = self.column_bits.get(&column_id).copied().unwrap_or(0);
        (data.len() as u64 * 8)
            .checked_div(u64::from(bits))
            .unwrap_or(0)
    }

    /// Cell data. Under unpacked framing the element count is derived
    /// from `data.len()` and the column's declared width, and the payload
    /// is padded to whole words.
    #[must_use]
    pub fn cell_data(self, column_id: u32, data: &[u8]) -> Self {
        let count = self.derived_count(column_id, data);
        self.cell(code::CELL_DATA, code::CELL_DATA_2, column_id, count, data)
    }

    /// Cell data with an explicit element count, for widths that don't
    /// divide a byte. The count is only written under unpacked framing.
    #[must_use]
    pub fn cell_data_elems(self, column_id: u32, elem_count: u64, data: &[u8]) -> Self {
        self.cell(code::CELL_DATA, code::CELL_DATA_2, column_id, elem_count, data)
    }

    #[must_use]
    pub fn cell_default(self, column_id: u32, data: &[u8]) -> Self {
        let count = self.derived_count(column_id, data);
        self.cell(
            code::CELL_DEFAULT,
            code::CELL_DEFAULT_2,
            column_id,
            count,
            data,
        )
    }

    #[must_use]
    pub fn next_row(self, table_id: u32) -> Self {
        self.prefix(code::NEXT_ROW, table_id)
    }

    #[must_use]
    pub fn move_ahead(self, table_id: u32, nrows: u64) -> Self {
        self.prefix(code::MOVE_AHEAD, table_id).raw(&nrows.to_le_bytes())
    }
}

/// Pack 16-bit values with the integer codec.
pub fn pack_u16s(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; MAX_ENCODED_LEN];
    for &value in values {
        let len = encode_u16(value, &mut buf);
        out.extend_from_slice(&buf[..len]);
    }
    out
}

/// Pack 32-bit values with the integer codec.
pub fn pack_u32s(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; MAX_ENCODED_LEN];
    for &value in values {
        let len = encode_u32(value, &mut buf);
        out.extend_from_slice(&buf[..len]);
    }
    out
}

/// Pack 64-bit values with the integer codec.
pub fn pack_u64s(values: &[u64]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut buf = [0u8; MAX_ENCODED_LEN];
    for &value in values {
        let len = encode_u64(value, &mut buf);
        out.extend_from_slice(&buf[..len]);
    }
    out
}
