//! Report sinks for `gw-dump`.
//!
//! Both reporters implement [`EventSink`], so the decoder drives them
//! directly. Sink callbacks cannot fail, so the first write error is
//! parked and handed back by `finish`; later writes are skipped.
//!
//! # Text format
//!
//! ```text
//! header: version 1
//!   hdr_size = 24
//!   packing = 0
//! 1: new-table
//!   table_name [ 5 ] = "Reads"
//! 2: new-column
//!   table_id = 1 ( "Reads" )
//!   column_name [ 3 ] = "LEN"
//! 3: cell-data
//!   stream_id = 1 ( Reads . LEN )
//!   elem_bits = 32
//!   elem_count = 3
//! 4: next-row
//!   table_id = 1 ( "Reads" )
//! END
//! ```
//!
//! # JSON format
//!
//! One object per line, tagged by `kind`:
//!
//! ```text
//! {"kind":"header","version":1,"header_size":24,"packing":"unpacked"}
//! {"number":1,"offset":24,"size":13,"wide":false,"kind":"new-table","table_id":1,"name":"Reads"}
//! ```
use std::io::{self, Write};

use gw_decoder::{CellEvent, DecodedEvent, Event, EventSink};
use gw_wire::{Framing, StreamHeader};
use serde::Serialize;

// ── Text ──────────────────────────────────────────────────────────────────────

/// Human-readable report, one block of lines per event.
pub struct TextReport<W> {
    out: W,
    framing: Framing,
    error: Option<io::Error>,
}

impl<W: Write> TextReport<W> {
    /// `framing` decides how cell sizes are described.
    pub fn new(out: W, framing: Framing) -> Self {
        Self {
            out,
            framing,
            error: None,
        }
    }

    /// Flush and return the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_header(&mut self, header: &StreamHeader) -> io::Result<()> {
        writeln!(self.out, "header: version {}", header.version)?;
        writeln!(self.out, "  hdr_size = {}", header.header_size)?;
        writeln!(self.out, "  packing = {}", header.framing.packing_flag())
    }

    fn write_event(&mut self, decoded: &DecodedEvent) -> io::Result<()> {
        let out = &mut self.out;
        let n = decoded.number;
        match &decoded.event {
            Event::OpenStream => writeln!(out, "{n}: open-stream"),
            Event::EndStream => writeln!(out, "END"),
            Event::NewTable { name, .. } => {
                writeln!(out, "{n}: new-table")?;
                writeln!(out, "  table_name [ {} ] = \"{name}\"", name.wire_len())
            }
            Event::NewColumn {
                table_id,
                table_name,
                name,
                ..
            } => {
                writeln!(out, "{n}: new-column")?;
                writeln!(out, "  table_id = {table_id} ( \"{table_name}\" )")?;
                writeln!(out, "  column_name [ {} ] = \"{name}\"", name.wire_len())
            }
            Event::CellDefault(cell) => write_cell(out, self.framing, n, "default", cell),
            Event::CellData(cell) => write_cell(out, self.framing, n, "data", cell),
            Event::NextRow {
                table_id,
                table_name,
            } => {
                writeln!(out, "{n}: next-row")?;
                writeln!(out, "  table_id = {table_id} ( \"{table_name}\" )")
            }
            Event::MoveAhead {
                table_id,
                table_name,
                nrows,
            } => {
                writeln!(out, "{n}: move-ahead")?;
                writeln!(out, "  table_id = {table_id} ( \"{table_name}\" )")?;
                writeln!(out, "  nrows = {nrows}")
            }
            Event::UseSchema {
                schema_file,
                schema_spec,
            } => {
                writeln!(out, "{n}: use-schema")?;
                writeln!(
                    out,
                    "  schema_file_name [ {} ] = \"{schema_file}\"",
                    schema_file.wire_len()
                )?;
                writeln!(
                    out,
                    "  schema_db_spec [ {} ] = \"{schema_spec}\"",
                    schema_spec.wire_len()
                )
            }
            Event::RemotePath { path } => {
                writeln!(out, "{n}: remote-path")?;
                writeln!(out, "  remote_db_name [ {} ] = \"{path}\"", path.wire_len())
            }
            Event::ErrorMessage { message } => {
                writeln!(out, "{n}: error-message")?;
                writeln!(out, "  msg [ {} ] = \"{message}\"", message.wire_len())
            }
        }
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

fn write_cell(
    out: &mut impl Write,
    framing: Framing,
    number: u64,
    which: &str,
    cell: &CellEvent,
) -> io::Result<()> {
    writeln!(out, "{number}: cell-{which}")?;
    writeln!(
        out,
        "  stream_id = {} ( {} . {} )",
        cell.column_id, cell.table_name, cell.column_name
    )?;
    writeln!(out, "  elem_bits = {}", cell.elem_bits)?;
    match (framing, cell.packed) {
        (Framing::Unpacked, _) => writeln!(out, "  elem_count = {}", cell.elem_count),
        (Framing::Packed, Some(packed)) => writeln!(
            out,
            "  elem_count = {} ( {} bytes, {} packed )",
            cell.elem_count,
            packed.unpacked_size,
            cell.data.len()
        ),
        (Framing::Packed, None) => writeln!(
            out,
            "  elem_count = {} ( {} bytes )",
            cell.elem_count,
            cell.data.len()
        ),
    }
}

impl<W: Write> EventSink for TextReport<W> {
    fn header(&mut self, header: &StreamHeader) {
        if self.error.is_none() {
            let result = self.write_header(header);
            self.record(result);
        }
    }

    fn event(&mut self, event: DecodedEvent) {
        if self.error.is_none() {
            let result = self.write_event(&event);
            self.record(result);
        }
    }
}

// ── JSON lines ────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HeaderLine {
    kind: &'static str,
    version: u32,
    header_size: u32,
    packing: String,
}

#[derive(Serialize)]
struct EventLine<'a> {
    number: u64,
    offset: u64,
    size: u64,
    wide: bool,
    #[serde(flatten)]
    body: Body<'a>,
}

#[derive(Serialize)]
struct CellBody<'a> {
    column_id: u32,
    table_id: u32,
    table_name: &'a str,
    column_name: &'a str,
    elem_bits: u32,
    elem_count: u64,
    bytes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    unpacked_bytes: Option<u64>,
}

impl<'a> From<&'a CellEvent> for CellBody<'a> {
    fn from(cell: &'a CellEvent) -> Self {
        Self {
            column_id: cell.column_id,
            table_id: cell.table_id,
            table_name: &cell.table_name,
            column_name: &cell.column_name,
            elem_bits: cell.elem_bits,
            elem_count: cell.elem_count,
            bytes: cell.data.len(),
            unpacked_bytes: cell.packed.map(|p| p.unpacked_size),
        }
    }
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum Body<'a> {
    OpenStream,
    NewTable {
        table_id: u32,
        name: &'a str,
    },
    NewColumn {
        column_id: u32,
        table_id: u32,
        table_name: &'a str,
        name: &'a str,
        elem_bits: u32,
        flag_bits: u8,
    },
    CellDefault(CellBody<'a>),
    CellData(CellBody<'a>),
    NextRow {
        table_id: u32,
        table_name: &'a str,
    },
    MoveAhead {
        table_id: u32,
        table_name: &'a str,
        nrows: u64,
    },
    UseSchema {
        schema_file: &'a str,
        schema_spec: &'a str,
    },
    RemotePath {
        path: &'a str,
    },
    ErrorMessage {
        message: &'a str,
    },
    EndStream,
}

impl<'a> From<&'a Event> for Body<'a> {
    fn from(event: &'a Event) -> Self {
        match event {
            Event::OpenStream => Self::OpenStream,
            Event::NewTable { table_id, name } => Self::NewTable {
                table_id: *table_id,
                name: name.as_str(),
            },
            Event::NewColumn {
                column_id,
                table_id,
                table_name,
                name,
                elem_bits,
                flag_bits,
            } => Self::NewColumn {
                column_id: *column_id,
                table_id: *table_id,
                table_name,
                name: name.as_str(),
                elem_bits: *elem_bits,
                flag_bits: *flag_bits,
            },
            Event::CellDefault(cell) => Self::CellDefault(cell.into()),
            Event::CellData(cell) => Self::CellData(cell.into()),
            Event::NextRow {
                table_id,
                table_name,
            } => Self::NextRow {
                table_id: *table_id,
                table_name,
            },
            Event::MoveAhead {
                table_id,
                table_name,
                nrows,
            } => Self::MoveAhead {
                table_id: *table_id,
                table_name,
                nrows: *nrows,
            },
            Event::UseSchema {
                schema_file,
                schema_spec,
            } => Self::UseSchema {
                schema_file: schema_file.as_str(),
                schema_spec: schema_spec.as_str(),
            },
            Event::RemotePath { path } => Self::RemotePath {
                path: path.as_str(),
            },
            Event::ErrorMessage { message } => Self::ErrorMessage {
                message: message.as_str(),
            },
            Event::EndStream => Self::EndStream,
        }
    }
}

/// JSON-lines report: one object per header or event.
pub struct JsonReport<W> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> JsonReport<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Flush and return the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.out.flush()?;
        Ok(self.out)
    }

    fn write_line(&mut self, value: &impl Serialize) {
        if self.error.is_some() {
            return;
        }
        let result = serde_json::to_writer(&mut self.out, value)
            .map_err(io::Error::from)
            .and_then(|()| self.out.write_all(b"\n"));
        if let Err(err) = result {
            self.error = Some(err);
        }
    }
}

impl<W: Write> EventSink for JsonReport<W> {
    fn header(&mut self, header: &StreamHeader) {
        self.write_line(&HeaderLine {
            kind: "header",
            version: header.version,
            header_size: header.header_size,
            packing: header.framing.to_string(),
        });
    }

    fn event(&mut self, event: DecodedEvent) {
        self.write_line(&EventLine {
            number: event.number,
            offset: event.start_offset,
            size: event.end_offset - event.start_offset,
            wide: event.kind.is_wide(),
            body: Body::from(&event.event),
        });
    }
}
