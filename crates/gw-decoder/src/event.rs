use std::fmt;

use gw_wire::EventKind;

/// A string payload: the text decoded lossily, plus its size on the wire.
///
/// Invalid UTF-8 is replaced with U+FFFD, which can change the length, so
/// the wire size is kept alongside.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireText {
    text: String,
    wire_len: usize,
}

impl WireText {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        let wire_len = bytes.len();
        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
        };
        Self { text, wire_len }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Size of the payload on the wire, padding excluded.
    pub fn wire_len(&self) -> usize {
        self.wire_len
    }
}

impl fmt::Display for WireText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<&str> for WireText {
    fn from(text: &str) -> Self {
        text.to_owned().into()
    }
}

impl From<String> for WireText {
    fn from(text: String) -> Self {
        Self {
            wire_len: text.len(),
            text,
        }
    }
}

impl PartialEq<str> for WireText {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

impl PartialEq<&str> for WireText {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

/// A cell payload decoded through the integer codec.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackedCell {
    /// Size of the payload once every integer is widened to `elem_bits`.
    pub unpacked_size: u64,
}

/// A cell-default or cell-data event, resolved against the registry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellEvent {
    pub column_id: u32,
    pub table_id: u32,
    pub table_name: String,
    pub column_name: String,
    pub elem_bits: u32,
    pub elem_count: u64,
    /// Payload bytes exactly as they appeared on the wire.
    pub data: Vec<u8>,
    pub packed: Option<PackedCell>,
}

/// One decoded event.
///
/// Referenced ids have already been checked against the registry, and
/// names are carried by value so the event outlives the decoder's state.
/// String payloads are [`WireText`]: the stream format does not promise
/// UTF-8.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    OpenStream,
    NewTable {
        table_id: u32,
        name: WireText,
    },
    NewColumn {
        column_id: u32,
        table_id: u32,
        table_name: String,
        name: WireText,
        elem_bits: u32,
        flag_bits: u8,
    },
    CellDefault(CellEvent),
    CellData(CellEvent),
    NextRow {
        table_id: u32,
        table_name: String,
    },
    MoveAhead {
        table_id: u32,
        table_name: String,
        nrows: u64,
    },
    UseSchema {
        schema_file: WireText,
        schema_spec: WireText,
    },
    RemotePath {
        path: WireText,
    },
    ErrorMessage {
        message: WireText,
    },
    EndStream,
}

/// An [`Event`] with its position in the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedEvent {
    /// 1-based event number.
    pub number: u64,
    /// Kind as it appeared on the wire, wide marker included.
    pub kind: EventKind,
    pub start_offset: u64,
    pub end_offset: u64,
    pub event: Event,
}

impl DecodedEvent {
    pub fn is_end(&self) -> bool {
        matches!(self.event, Event::EndStream)
    }
}
