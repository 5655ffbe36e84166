use std::io::Read;

use gw_wire::header::{BASE_HEADER_SIZE, V1_EXTENSION_SIZE};
use gw_wire::{BaseHeader, Framing, StreamHeader};
use tracing::{debug, trace};

use crate::config::DisplayWindow;
use crate::envelope::read_envelope;
use crate::error::{DecodeError, StreamError};
use crate::event::DecodedEvent;
use crate::events::decode_event;
use crate::reader::ByteReader;
use crate::registry::Registry;

/// Receives the parts of a stream that fall inside the display window.
pub trait EventSink {
    /// Called once, before any event, if the window shows the header.
    fn header(&mut self, _header: &StreamHeader) {}

    /// Called for every admitted event, in stream order.
    fn event(&mut self, event: DecodedEvent);
}

impl EventSink for Vec<DecodedEvent> {
    fn event(&mut self, event: DecodedEvent) {
        self.push(event);
    }
}

/// Totals for a stream that decoded cleanly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamSummary {
    /// Events decoded, end-stream included.
    pub events: u64,
    pub tables: usize,
    pub columns: usize,
    /// Bytes consumed, header included.
    pub bytes: u64,
}

/// Internal state machine.
///
/// ```text
///   Start → Events → AfterEnd → Done
///     └───────┴─────────┴─────→ Failed
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum State {
    Start,
    Events(Framing),
    AfterEnd,
    Done,
    Failed,
}

/// Pull decoder for one general-writer stream.
///
/// Reads the header on first use, then yields one validated event per
/// call until end-stream. After end-stream the source must be exhausted;
/// any further byte is an error. Every error is final: once a call has
/// failed, the decoder yields nothing more.
///
/// Each decoder owns its registry and counters, so independent streams
/// never share state.
///
/// # Example
///
/// ```rust,no_run
/// use gw_decoder::StreamDecoder;
///
/// let file = std::fs::File::open("load.gw").unwrap();
/// let mut decoder = StreamDecoder::new(std::io::BufReader::new(file));
/// while let Some(event) = decoder.next_event().unwrap() {
///     println!("{}: {}", event.number, event.kind);
/// }
/// ```
pub struct StreamDecoder<R> {
    reader: ByteReader<R>,
    registry: Registry,
    window: DisplayWindow,
    state: State,
    header: Option<StreamHeader>,
    /// Number of the event being decoded. 0 until the header is accepted.
    event_number: u64,
}

impl<R: Read> StreamDecoder<R> {
    #[must_use]
    pub fn new(reader: R) -> Self {
        Self {
            reader: ByteReader::new(reader),
            registry: Registry::new(),
            window: DisplayWindow::default(),
            state: State::Start,
            header: None,
            event_number: 0,
        }
    }

    /// Replace the display window used by [`StreamDecoder::run`].
    #[must_use]
    pub fn with_window(mut self, window: DisplayWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> DisplayWindow {
        self.window
    }

    /// The header, once it has been read and accepted.
    pub fn header(&self) -> Option<&StreamHeader> {
        self.header.as_ref()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.reader.offset()
    }

    pub fn into_inner(self) -> R {
        self.reader.into_inner()
    }

    fn fail(&mut self, source: DecodeError) -> StreamError {
        self.state = State::Failed;
        StreamError {
            offset: self.reader.offset(),
            event: self.event_number,
            source,
        }
    }

    /// Read and validate the header if that has not happened yet.
    ///
    /// Returns `None` only when an earlier call already failed before a
    /// header was accepted.
    ///
    /// # Errors
    ///
    /// A [`StreamError`] at event 0 wrapping either
    /// [`DecodeError::Truncated`] or [`DecodeError::InvalidHeader`].
    pub fn read_header(&mut self) -> Result<Option<StreamHeader>, StreamError> {
        if self.state != State::Start {
            return Ok(self.header);
        }

        let header = match self.decode_header() {
            Ok(header) => header,
            Err(source) => return Err(self.fail(source)),
        };
        debug!(
            version = header.version,
            header_size = header.header_size,
            framing = %header.framing,
            "stream header accepted"
        );

        self.header = Some(header);
        self.state = State::Events(header.framing);
        self.event_number = 1;
        Ok(Some(header))
    }

    fn decode_header(&mut self) -> Result<StreamHeader, DecodeError> {
        let mut base = [0u8; BASE_HEADER_SIZE];
        self.reader.read_exact(&mut base, "failed to read header")?;
        let base = BaseHeader::read_from(&base)?;

        let mut extension = [0u8; V1_EXTENSION_SIZE];
        self.reader
            .read_exact(&mut extension, "failed to read v1 header")?;
        Ok(StreamHeader::from_v1(base, &extension)?)
    }

    /// Decode the next event.
    ///
    /// Returns `Ok(None)` once end-stream has been decoded and the source
    /// has been confirmed empty, and on every call after a failure.
    ///
    /// # Errors
    ///
    /// A [`StreamError`] carrying the offset and event number at which
    /// decoding stopped.
    pub fn next_event(&mut self) -> Result<Option<DecodedEvent>, StreamError> {
        if self.state == State::Start {
            self.read_header()?;
        }

        match self.state {
            State::Start | State::Done | State::Failed => Ok(None),
            State::Events(framing) => match self.decode_next(framing) {
                Ok(event) => Ok(Some(event)),
                Err(source) => Err(self.fail(source)),
            },
            State::AfterEnd => match self.reader.at_eof() {
                Ok(true) => {
                    self.state = State::Done;
                    Ok(None)
                }
                Ok(false) => Err(self.fail(DecodeError::TrailingData)),
                Err(source) => Err(self.fail(source)),
            },
        }
    }

    fn decode_next(&mut self, framing: Framing) -> Result<DecodedEvent, DecodeError> {
        let envelope = read_envelope(&mut self.reader, framing)?;
        let event = decode_event(&mut self.reader, &envelope, &mut self.registry)?;

        let decoded = DecodedEvent {
            number: self.event_number,
            kind: envelope.kind,
            start_offset: envelope.start_offset,
            end_offset: self.reader.offset(),
            event,
        };
        trace!(
            number = decoded.number,
            kind = %decoded.kind,
            offset = decoded.start_offset,
            "event decoded"
        );

        if decoded.is_end() {
            self.state = State::AfterEnd;
        } else {
            self.event_number += 1;
        }
        Ok(decoded)
    }

    /// Decode the rest of the stream, handing the header and every event
    /// inside the display window to `sink`.
    ///
    /// Events outside the window are still fully decoded and validated.
    ///
    /// # Errors
    ///
    /// The first [`StreamError`]; events before it have already been
    /// delivered.
    pub fn run(&mut self, sink: &mut impl EventSink) -> Result<StreamSummary, StreamError> {
        let fresh = self.state == State::Start;
        if let Some(header) = self.read_header()? {
            if fresh && self.window.shows_header() {
                sink.header(&header);
            }
        }

        let mut events = 0;
        while let Some(event) = self.next_event()? {
            events = event.number;
            if self.window.admits(event.number) {
                sink.event(event);
            }
        }

        let summary = StreamSummary {
            events,
            tables: self.registry.table_count(),
            columns: self.registry.column_count(),
            bytes: self.reader.offset(),
        };
        debug!(
            events = summary.events,
            tables = summary.tables,
            columns = summary.columns,
            bytes = summary.bytes,
            "stream complete"
        );
        Ok(summary)
    }
}

impl<R: Read> Iterator for StreamDecoder<R> {
    type Item = Result<DecodedEvent, StreamError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event().transpose()
    }
}

/// Decode a complete in-memory stream.
///
/// # Errors
///
/// The first [`StreamError`] encountered.
pub fn decode_slice(bytes: &[u8]) -> Result<Vec<DecodedEvent>, StreamError> {
    let mut events = Vec::new();
    StreamDecoder::new(bytes).run(&mut events)?;
    Ok(events)
}

#[cfg(test)]
mod tests {
    use gw_tests::StreamBuilder;

    use super::*;
    use crate::error::ErrorKind;
    use crate::event::Event;

    #[test]
    fn minimal_stream() {
        let bytes = StreamBuilder::unpacked().open_stream().end_stream().finish();
        let events = decode_slice(&bytes).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].number, 1);
        assert_eq!(events[0].event, Event::OpenStream);
        assert_eq!(events[0].start_offset, 24);
        assert!(events[1].is_end());
        assert_eq!(events[1].end_offset, bytes.len() as u64);
    }

    #[test]
    fn header_errors_are_event_zero() {
        let mut bytes = StreamBuilder::unpacked().end_stream().finish();
        bytes[0] = b'X';
        let err = decode_slice(&bytes).unwrap_err();
        assert_eq!(err.event, 0);
        assert_eq!(err.offset, 20);
        assert_eq!(err.kind(), ErrorKind::InvalidHeader);
        assert_eq!(err.to_string(), "offset 20: event 0: bad header signature");
    }

    #[test]
    fn short_header_is_truncated() {
        let bytes = StreamBuilder::unpacked().finish();
        let err = decode_slice(&bytes[..10]).unwrap_err();
        assert_eq!(err.to_string(), "offset 10: event 0: failed to read header");
        let err = decode_slice(&bytes[..22]).unwrap_err();
        assert_eq!(err.to_string(), "offset 22: event 0: failed to read v1 header");
    }

    #[test]
    fn missing_end_stream() {
        let bytes = StreamBuilder::unpacked().open_stream().finish();
        let err = decode_slice(&bytes).unwrap_err();
        assert!(matches!(err.source, DecodeError::EofBeforeEnd));
        assert_eq!(err.event, 2);
        assert_eq!(err.offset, 28);
    }

    #[test]
    fn trailing_byte_after_end_stream() {
        let bytes = StreamBuilder::packed()
            .open_stream()
            .end_stream()
            .raw(&[0])
            .finish();
        let err = decode_slice(&bytes).unwrap_err();
        assert!(matches!(err.source, DecodeError::TrailingData));
        assert_eq!(err.event, 2);
        // reported where the stream should have ended
        assert_eq!(err.offset, 28);
    }

    #[test]
    fn decoder_is_fused_after_error() {
        let bytes = StreamBuilder::unpacked().next_row(1).end_stream().finish();
        let mut decoder = StreamDecoder::new(&bytes[..]);
        assert!(decoder.next_event().is_err());
        assert!(decoder.next_event().unwrap().is_none());
        assert!(decoder.next().is_none());
    }

    #[test]
    fn iterator_yields_every_event() {
        let bytes = StreamBuilder::packed()
            .new_table(1, "T")
            .next_row(1)
            .end_stream()
            .finish();
        let kinds: Vec<_> = StreamDecoder::new(&bytes[..])
            .map(|event| event.unwrap().kind.name())
            .collect();
        assert_eq!(kinds, ["new-table", "next-row", "end-stream"]);
    }

    #[derive(Default)]
    struct Recorder {
        header: bool,
        numbers: Vec<u64>,
    }

    impl EventSink for Recorder {
        fn header(&mut self, _header: &StreamHeader) {
            self.header = true;
        }

        fn event(&mut self, event: DecodedEvent) {
            self.numbers.push(event.number);
        }
    }

    #[test]
    fn run_applies_display_window() {
        let bytes = StreamBuilder::unpacked()
            .new_table(1, "T")
            .next_row(1)
            .next_row(1)
            .next_row(1)
            .end_stream()
            .finish();
        let window = DisplayWindow {
            enabled: false,
            jump_to: 2,
            limit: 2,
        };
        let mut recorder = Recorder::default();
        let summary = StreamDecoder::new(&bytes[..])
            .with_window(window)
            .run(&mut recorder)
            .unwrap();

        assert!(!recorder.header);
        assert_eq!(recorder.numbers, vec![2, 3]);
        assert_eq!(summary.events, 5);
        assert_eq!(summary.tables, 1);
        assert_eq!(summary.bytes, bytes.len() as u64);
    }

    #[test]
    fn run_reports_header_by_default() {
        let bytes = StreamBuilder::unpacked().end_stream().finish();
        let mut recorder = Recorder::default();
        StreamDecoder::new(&bytes[..]).run(&mut recorder).unwrap();
        assert!(recorder.header);
        assert_eq!(recorder.numbers, vec![1]);
    }
}
