#![warn(clippy::pedantic)]

pub mod codec;
pub mod error;
pub mod event_kind;
pub mod header;
pub mod layout;

pub use codec::{CodecError, IntWidth};
pub use error::WireError;
pub use event_kind::EventKind;
pub use header::{BaseHeader, StreamHeader};
pub use layout::{Framing, Layout, Padding};
