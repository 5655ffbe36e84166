#![warn(clippy::pedantic)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod event;
pub mod events;
pub mod reader;
pub mod registry;
pub mod stream;

pub use config::DisplayWindow;
pub use error::{DecodeError, ErrorKind, StreamError};
pub use event::{CellEvent, DecodedEvent, Event, PackedCell, WireText};
pub use registry::{ColumnEntry, Registry};
pub use stream::{EventSink, StreamDecoder, StreamSummary, decode_slice};
