//! Per-kind event decoders.
//!
//! Each decoder runs after [`read_envelope`](crate::envelope::read_envelope)
//! and follows the same three steps: read the kind's fixed fields, validate
//! them against the registry, then read the variable-length payload. The
//! order matters because payload lengths are among the fixed fields, and a
//! corrupt length should be rejected before anything is read with it.
//!
//! Field widths come from the envelope's [`Layout`]:
//!
//! ```text
//! ┌──────────────┬──────────┬────────┬────────────┐
//! │ Field        │ Unpacked │ Packed │ PackedWide │
//! ├──────────────┼──────────┼────────┼────────────┤
//! │ size / count │ u32      │ u8     │ u16        │
//! │ column table │ u32      │ u8     │ n/a        │
//! │ move-ahead   │ u64      │ u64    │ n/a        │
//! │ strings      │ exact    │ words  │ words      │
//! │ cell data    │ words    │ exact  │ exact      │
//! └──────────────┴──────────┴────────┴────────────┘
//! ```

use std::io::Read;

use gw_wire::codec::check_int_packing;
use gw_wire::{EventKind, IntWidth, Layout, Padding};

use crate::envelope::Envelope;
use crate::error::DecodeError;
use crate::event::{CellEvent, Event, PackedCell, WireText};
use crate::reader::ByteReader;
use crate::registry::{ColumnEntry, Registry};

/// Signature shared by every per-kind decoder.
pub type DecodeFn<R> =
    fn(&mut ByteReader<R>, &Envelope, &mut Registry) -> Result<Event, DecodeError>;

/// Select the decoder for a kind. Wide kinds share their narrow kind's
/// decoder; the envelope's layout supplies the field widths.
pub fn decoder_for<R: Read>(kind: EventKind) -> DecodeFn<R> {
    match kind {
        EventKind::OpenStream => open_stream,
        EventKind::NewTable | EventKind::NewTable2 => new_table,
        EventKind::NewColumn => new_column,
        EventKind::CellDefault
        | EventKind::CellDefault2
        | EventKind::CellData
        | EventKind::CellData2 => cell,
        EventKind::NextRow => next_row,
        EventKind::MoveAhead => move_ahead,
        EventKind::UseSchema | EventKind::UseSchema2 => use_schema,
        EventKind::RemotePath | EventKind::RemotePath2 => remote_path,
        EventKind::ErrorMessage | EventKind::ErrorMessage2 => error_message,
        EventKind::EndStream => end_stream,
    }
}

/// Decode the body of the event described by `envelope`.
///
/// # Errors
///
/// Any [`DecodeError`] the kind's decoder raises.
pub fn decode_event<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    registry: &mut Registry,
) -> Result<Event, DecodeError> {
    decoder_for::<R>(envelope.kind)(reader, envelope, registry)
}

fn corrupt(reason: &'static str) -> DecodeError {
    DecodeError::Corrupt { reason }
}

fn is_unpacked(envelope: &Envelope) -> bool {
    envelope.layout == Layout::Unpacked
}

fn payload_len(len: u64, what: &'static str) -> Result<usize, DecodeError> {
    usize::try_from(len).map_err(|_| DecodeError::Truncated { what })
}

fn read_size<R: Read>(
    reader: &mut ByteReader<R>,
    layout: Layout,
    what: &'static str,
) -> Result<u64, DecodeError> {
    reader.read_uint(layout.field_width(), what)
}

fn read_string<R: Read>(
    reader: &mut ByteReader<R>,
    layout: Layout,
    len: u64,
    what: &'static str,
) -> Result<WireText, DecodeError> {
    let bytes = reader.read_payload(payload_len(len, what)?, layout.string_padding(), what)?;
    Ok(WireText::from_bytes(bytes))
}

fn open_stream<R: Read>(
    _reader: &mut ByteReader<R>,
    envelope: &Envelope,
    _registry: &mut Registry,
) -> Result<Event, DecodeError> {
    if is_unpacked(envelope) && envelope.id != 0 {
        return Err(corrupt("non-zero id within open-stream event"));
    }
    Ok(Event::OpenStream)
}

fn end_stream<R: Read>(
    _reader: &mut ByteReader<R>,
    envelope: &Envelope,
    _registry: &mut Registry,
) -> Result<Event, DecodeError> {
    if is_unpacked(envelope) && envelope.id != 0 {
        return Err(corrupt("non-zero id within end-stream event"));
    }
    Ok(Event::EndStream)
}

fn new_table<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    registry: &mut Registry,
) -> Result<Event, DecodeError> {
    let size = read_size(reader, envelope.layout, "failed to read new-table event")?;
    registry.check_new_table(envelope.id, size)?;

    let name = read_string(reader, envelope.layout, size, "failed to read string data")?;
    let table_id = registry.add_table(name.as_str().to_owned());
    Ok(Event::NewTable { table_id, name })
}

fn new_column<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    registry: &mut Registry,
) -> Result<Event, DecodeError> {
    const WHAT: &str = "failed to read new-column event";

    #[allow(clippy::cast_possible_truncation)]
    let (table_id, elem_bits, flag_bits, name_size) = if is_unpacked(envelope) {
        let table_id = reader.read_u32(WHAT)?;
        let packed = reader.read_u32(WHAT)?;
        let name_size = reader.read_u32(WHAT)?;
        (table_id, packed & 0x00FF_FFFF, (packed >> 24) as u8, name_size)
    } else {
        let mut fields = [0u8; 4];
        reader.read_exact(&mut fields, WHAT)?;
        let [table_id, elem_bits, flag_bits, name_size] = fields;
        (
            u32::from(table_id),
            u32::from(elem_bits),
            flag_bits,
            u32::from(name_size),
        )
    };

    registry.check_new_column(
        envelope.id,
        table_id,
        u64::from(name_size),
        is_unpacked(envelope),
    )?;
    if !is_unpacked(envelope) && flag_bits & 0xFE != 0 {
        return Err(corrupt("uninitialized flag_bits"));
    }

    let name = read_string(
        reader,
        envelope.layout,
        u64::from(name_size),
        "failed to read column name",
    )?;
    let table_name = registry.table(table_id).unwrap_or_default().to_owned();
    let column_id = registry.add_column(ColumnEntry {
        table_id,
        name: name.as_str().to_owned(),
        elem_bits,
        flag_bits,
    });

    Ok(Event::NewColumn {
        column_id,
        table_id,
        table_name,
        name,
        elem_bits,
        flag_bits,
    })
}

fn cell<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    registry: &mut Registry,
) -> Result<Event, DecodeError> {
    const WHAT: &str = "failed to read cell event";
    const DATA: &str = "failed to read cell data";

    // unpacked: element count; packed: byte size
    let count_or_size = read_size(reader, envelope.layout, WHAT)?;
    let entry = registry.check_cell(envelope.id)?;
    let bits = u64::from(entry.elem_bits);

    let (data, elem_count, packed) = if is_unpacked(envelope) {
        // elements are bit-packed into whole 32-bit words
        let size = (bits * count_or_size).div_ceil(8);
        let data = reader.read_payload(payload_len(size, DATA)?, Padding::Word, DATA)?;
        (data, count_or_size, None)
    } else {
        let data =
            reader.read_payload(payload_len(count_or_size, DATA)?, Padding::None, DATA)?;
        if entry.is_packed_int() {
            let width = IntWidth::from_bits(entry.elem_bits).ok_or(
                DecodeError::FormatMismatch {
                    reason: "bad element size for packed integer",
                },
            )?;
            let unpacked_size = check_int_packing(width, &data)
                .map_err(|source| DecodeError::Codec { source })? as u64;
            let elem_count = (unpacked_size * 8).checked_div(bits).unwrap_or(0);
            (data, elem_count, Some(PackedCell { unpacked_size }))
        } else {
            let elem_count = (data.len() as u64 * 8).checked_div(bits).unwrap_or(0);
            (data, elem_count, None)
        }
    };

    let cell = CellEvent {
        column_id: envelope.id,
        table_id: entry.table_id,
        table_name: registry.table(entry.table_id).unwrap_or_default().to_owned(),
        column_name: entry.name.clone(),
        elem_bits: entry.elem_bits,
        elem_count,
        data,
        packed,
    };

    Ok(match envelope.kind.narrow() {
        EventKind::CellDefault => Event::CellDefault(cell),
        _ => Event::CellData(cell),
    })
}

fn next_row<R: Read>(
    _reader: &mut ByteReader<R>,
    envelope: &Envelope,
    registry: &mut Registry,
) -> Result<Event, DecodeError> {
    let table_name = registry.check_next_row(envelope.id)?.to_owned();
    Ok(Event::NextRow {
        table_id: envelope.id,
        table_name,
    })
}

fn move_ahead<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    registry: &mut Registry,
) -> Result<Event, DecodeError> {
    let nrows = reader.read_u64("failed to read move-ahead event")?;
    let table_name = registry.check_move_ahead(envelope.id)?.to_owned();
    Ok(Event::MoveAhead {
        table_id: envelope.id,
        table_name,
        nrows,
    })
}

fn use_schema<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    _registry: &mut Registry,
) -> Result<Event, DecodeError> {
    const WHAT: &str = "failed to read use-schema event";
    const DATA: &str = "failed to read dual string data";

    let size1 = read_size(reader, envelope.layout, WHAT)?;
    let size2 = read_size(reader, envelope.layout, WHAT)?;

    if is_unpacked(envelope) && envelope.id != 0 {
        return Err(corrupt("non-zero table id"));
    }
    if size1 == 0 {
        return Err(corrupt("empty schema file path"));
    }
    if size2 == 0 {
        return Err(corrupt("empty schema spec"));
    }

    // both strings share one padded run
    let len = payload_len(size1 + size2, DATA)?;
    let mut bytes = reader.read_payload(len, envelope.layout.string_padding(), DATA)?;
    let spec = bytes.split_off(payload_len(size1, DATA)?);

    Ok(Event::UseSchema {
        schema_file: WireText::from_bytes(bytes),
        schema_spec: WireText::from_bytes(spec),
    })
}

fn remote_path<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    _registry: &mut Registry,
) -> Result<Event, DecodeError> {
    let size = read_size(reader, envelope.layout, "failed to read remote-path event")?;

    if is_unpacked(envelope) && envelope.id != 0 {
        return Err(corrupt("non-zero table id"));
    }
    if size == 0 {
        return Err(corrupt("empty remote path"));
    }

    let path = read_string(reader, envelope.layout, size, "failed to read string data")?;
    Ok(Event::RemotePath { path })
}

fn error_message<R: Read>(
    reader: &mut ByteReader<R>,
    envelope: &Envelope,
    _registry: &mut Registry,
) -> Result<Event, DecodeError> {
    let size = read_size(reader, envelope.layout, "failed to read error-message event")?;

    if is_unpacked(envelope) && envelope.id != 0 {
        return Err(corrupt("bad error-message id ( should be 0 )"));
    }
    if size == 0 {
        return Err(corrupt("empty error message"));
    }

    let message = read_string(reader, envelope.layout, size, "failed to read string data")?;
    Ok(Event::ErrorMessage { message })
}

#[cfg(test)]
mod tests {
    use gw_wire::Framing;

    use super::*;

    fn envelope(kind: EventKind, id: u32, framing: Framing) -> Envelope {
        Envelope {
            kind,
            id,
            layout: Layout::for_event(framing, kind),
            start_offset: 0,
        }
    }

    fn decode(
        bytes: &[u8],
        envelope: &Envelope,
        registry: &mut Registry,
    ) -> Result<Event, DecodeError> {
        decode_event(&mut ByteReader::new(bytes), envelope, registry)
    }

    fn registry_with_column(elem_bits: u32, flag_bits: u8) -> Registry {
        let mut registry = Registry::new();
        registry.add_table("T".into());
        registry.add_column(ColumnEntry {
            table_id: 1,
            name: "C".into(),
            elem_bits,
            flag_bits,
        });
        registry
    }

    #[test]
    fn packed_new_table_consumes_padding() {
        let mut registry = Registry::new();
        let env = envelope(EventKind::NewTable, 1, Framing::Packed);
        let mut reader = ByteReader::new(&b"\x05HELLO\0\0\0"[..]);
        let event = decode_event(&mut reader, &env, &mut registry).unwrap();
        assert_eq!(
            event,
            Event::NewTable {
                table_id: 1,
                name: "HELLO".into()
            }
        );
        assert_eq!(reader.offset(), 9);
        assert_eq!(registry.table(1), Some("HELLO"));
    }

    #[test]
    fn unpacked_new_table_is_unpadded() {
        let mut registry = Registry::new();
        let env = envelope(EventKind::NewTable, 1, Framing::Unpacked);
        let mut reader = ByteReader::new(&b"\x03\0\0\0abc"[..]);
        decode_event(&mut reader, &env, &mut registry).unwrap();
        assert_eq!(reader.offset(), 7);
    }

    #[test]
    fn unpacked_column_splits_bits_and_flags() {
        let mut registry = Registry::new();
        registry.add_table("T".into());
        let env = envelope(EventKind::NewColumn, 1, Framing::Unpacked);
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&(0x0100_0020u32).to_le_bytes());
        bytes.extend_from_slice(&3u32.to_le_bytes());
        bytes.extend_from_slice(b"POS");
        let event = decode(&bytes, &env, &mut registry).unwrap();
        assert!(matches!(
            event,
            Event::NewColumn {
                elem_bits: 32,
                flag_bits: 1,
                ..
            }
        ));
    }

    #[test]
    fn packed_column_rejects_stray_flags() {
        let mut registry = Registry::new();
        registry.add_table("T".into());
        let env = envelope(EventKind::NewColumn, 1, Framing::Packed);
        let err = decode(&[1, 8, 0x02, 1, b'X', 0, 0, 0], &env, &mut registry).unwrap_err();
        assert_eq!(err.to_string(), "uninitialized flag_bits");
    }

    #[test]
    fn unpacked_cell_sizes_from_count() {
        let mut registry = registry_with_column(4, 0);
        let env = envelope(EventKind::CellData, 1, Framing::Unpacked);
        // 3 four-bit elements round up to 2 bytes, then to one word
        let event = decode(&[3, 0, 0, 0, 0xAB, 0xC0, 0, 0], &env, &mut registry).unwrap();
        let Event::CellData(cell) = event else {
            panic!("expected cell-data, got {event:?}");
        };
        assert_eq!(cell.elem_count, 3);
        assert_eq!(cell.data, vec![0xAB, 0xC0]);
        assert_eq!(cell.packed, None);
    }

    #[test]
    fn unpacked_cell_consumes_word_padding() {
        let mut registry = registry_with_column(8, 0);
        let env = envelope(EventKind::CellData, 1, Framing::Unpacked);
        let mut reader = ByteReader::new(&b"\x03\0\0\0ACG\0"[..]);
        let event = decode_event(&mut reader, &env, &mut registry).unwrap();
        let Event::CellData(cell) = event else {
            panic!("expected cell-data, got {event:?}");
        };
        assert_eq!(cell.data, b"ACG");
        assert_eq!(reader.offset(), 8);
    }

    #[test]
    fn unpacked_cell_missing_padding_is_truncated() {
        let mut registry = registry_with_column(8, 0);
        let env = envelope(EventKind::CellDefault, 1, Framing::Unpacked);
        let err = decode(b"\x03\0\0\0ACG", &env, &mut registry).unwrap_err();
        assert_eq!(err.to_string(), "failed to read cell data");
    }

    #[test]
    fn packed_cell_is_unpadded() {
        let mut registry = registry_with_column(8, 0);
        let env = envelope(EventKind::CellData, 1, Framing::Packed);
        let mut reader = ByteReader::new(&b"\x03ACG"[..]);
        decode_event(&mut reader, &env, &mut registry).unwrap();
        assert_eq!(reader.offset(), 4);
    }

    #[test]
    fn packed_int_cell_reports_unpacked_size() {
        let mut registry = registry_with_column(32, 1);
        let env = envelope(EventKind::CellDefault, 1, Framing::Packed);
        // 300 and 5 as packed integers
        let event = decode(&[3, 0xC4, 0xAC, 0x05], &env, &mut registry).unwrap();
        let Event::CellDefault(cell) = event else {
            panic!("expected cell-default, got {event:?}");
        };
        assert_eq!(cell.elem_count, 2);
        assert_eq!(cell.packed, Some(PackedCell { unpacked_size: 8 }));
        assert_eq!(cell.data.len(), 3);
    }

    #[test]
    fn packed_int_cell_with_byte_width_is_rejected() {
        let mut registry = registry_with_column(8, 1);
        let env = envelope(EventKind::CellData, 1, Framing::Packed);
        let err = decode(&[1, 0x05], &env, &mut registry).unwrap_err();
        assert_eq!(err.to_string(), "bad element size for packed integer");
    }

    #[test]
    fn wide_cell_uses_u16_size() {
        let mut registry = registry_with_column(8, 0);
        let env = envelope(EventKind::CellData2, 1, Framing::Packed);
        let mut bytes = vec![0x2C, 0x01];
        bytes.extend_from_slice(&[7u8; 300]);
        let Event::CellData(cell) = decode(&bytes, &env, &mut registry).unwrap() else {
            panic!("expected cell-data");
        };
        assert_eq!(cell.elem_count, 300);
    }

    #[test]
    fn use_schema_splits_one_run() {
        let mut registry = Registry::new();
        let env = envelope(EventKind::UseSchema, 0, Framing::Packed);
        let event = decode(b"\x03\x02abcde\0\0\0", &env, &mut registry).unwrap();
        assert_eq!(
            event,
            Event::UseSchema {
                schema_file: "abc".into(),
                schema_spec: "de".into()
            }
        );
    }

    #[test]
    fn id_must_be_zero_only_when_unpacked() {
        let mut registry = Registry::new();
        let env = envelope(EventKind::RemotePath, 4, Framing::Unpacked);
        let err = decode(b"\x01\0\0\0x", &env, &mut registry).unwrap_err();
        assert_eq!(err.to_string(), "non-zero table id");

        let env = envelope(EventKind::RemotePath, 4, Framing::Packed);
        assert!(decode(b"\x01x\0\0\0", &env, &mut registry).is_ok());
    }

    #[test]
    fn move_ahead_reads_before_checking() {
        let mut registry = Registry::new();
        let env = envelope(EventKind::MoveAhead, 1, Framing::Packed);
        let err = decode(&[0; 3], &env, &mut registry).unwrap_err();
        assert_eq!(err.to_string(), "failed to read move-ahead event");
        let err = decode(&[0; 8], &env, &mut registry).unwrap_err();
        assert_eq!(err.to_string(), "bad table id within move-ahead event");
    }
}
