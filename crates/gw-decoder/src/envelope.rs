use std::io::Read;

use gw_wire::event_kind::code;
use gw_wire::{EventKind, Framing, Layout};

use crate::error::DecodeError;
use crate::reader::ByteReader;

/// The fixed prefix of one event: what it is and which id it references.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub kind: EventKind,
    /// Table, column or stream id carried in the prefix. Its meaning
    /// depends on `kind`; several kinds require it to be 0.
    pub id: u32,
    pub layout: Layout,
    /// Stream offset of the prefix's first byte.
    pub start_offset: u64,
}

/// Read and classify the next event prefix.
///
/// # Errors
///
/// - [`DecodeError::EofBeforeEnd`] if the stream ends cleanly where an
///   event should start.
/// - [`DecodeError::Truncated`] if it ends inside the prefix.
/// - [`DecodeError::Corrupt`] for kind 0, which is what zeroed or
///   misaligned data looks like.
/// - [`DecodeError::FormatMismatch`] for a wide kind in an unpacked stream.
/// - [`DecodeError::UnrecognizedKind`] for any other unknown kind.
pub fn read_envelope<R: Read>(
    reader: &mut ByteReader<R>,
    framing: Framing,
) -> Result<Envelope, DecodeError> {
    let start_offset = reader.offset();
    let mut raw = [0u8; 4];
    let prefix = &mut raw[..framing.prefix_len()];

    match reader.fill(prefix)? {
        0 => return Err(DecodeError::EofBeforeEnd),
        n if n < prefix.len() => {
            return Err(DecodeError::Truncated {
                what: "failed to read event",
            });
        }
        _ => {}
    }

    let (kind_code, id) = framing.split_prefix(prefix);
    if kind_code == code::BAD {
        return Err(DecodeError::Corrupt {
            reason: "illegal event id - possibly block of zeros",
        });
    }

    let kind = EventKind::from_code(kind_code)
        .ok_or(DecodeError::UnrecognizedKind { code: kind_code })?;
    if kind.is_wide() && framing == Framing::Unpacked {
        return Err(DecodeError::FormatMismatch {
            reason: "packed event id within non-packed stream",
        });
    }

    Ok(Envelope {
        kind,
        id,
        layout: Layout::for_event(framing, kind),
        start_offset,
    })
}
