//! Conformance tests over the committed golden fixtures.
//!
//! Each fixture under `tests/golden/` is checked twice:
//!
//! 1. The committed bytes must equal what [`gw_tests::fixtures`] builds
//!    today. A mismatch means the writer side of the wire format moved.
//! 2. The decoded event listing must match its inline snapshot. A mismatch
//!    means the decoder's view of the format moved.
//!
//! Regenerate the fixtures with `cargo run --bin generate_golden -p gw-tests`
//! and review snapshot changes with `cargo insta review`.

use std::path::Path;

use gw_decoder::{DecodedEvent, Event, StreamDecoder};
use gw_tests::fixtures;
use insta::assert_snapshot;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn golden(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/golden")
        .join(name);
    std::fs::read(&path)
        .unwrap_or_else(|e| panic!("failed to read golden fixture {}: {e}", path.display()))
}

fn short(name: &str) -> String {
    if name.len() <= 24 {
        name.to_owned()
    } else {
        format!("{}..({} bytes)", &name[..3], name.len())
    }
}

fn describe(event: &Event) -> String {
    match event {
        Event::OpenStream | Event::EndStream => String::new(),
        Event::NewTable { table_id, name } => format!("table {table_id} {}", short(name.as_str())),
        Event::NewColumn {
            column_id,
            table_name,
            name,
            elem_bits,
            flag_bits,
            ..
        } => format!(
            "column {column_id} {} in {}, {elem_bits} bits, flags {flag_bits}",
            short(name.as_str()),
            short(table_name)
        ),
        Event::CellDefault(cell) | Event::CellData(cell) => {
            let mut line = format!(
                "cell {}.{}: {} x {} bits",
                short(&cell.table_name),
                short(&cell.column_name),
                cell.elem_count,
                cell.elem_bits
            );
            if let Some(packed) = cell.packed {
                line.push_str(&format!(", packed {} bytes unpacked", packed.unpacked_size));
            }
            line
        }
        Event::NextRow { table_name, .. } => format!("row {}", short(table_name)),
        Event::MoveAhead {
            table_name, nrows, ..
        } => format!("move {} by {nrows}", short(table_name)),
        Event::UseSchema {
            schema_file,
            schema_spec,
        } => format!("schema {schema_file} {schema_spec}"),
        Event::RemotePath { path } => format!("remote {path}"),
        Event::ErrorMessage { message } => format!("message {message}"),
    }
}

fn line(event: &DecodedEvent) -> String {
    let mut line = format!(
        "{}: {} {}..{}",
        event.number, event.kind, event.start_offset, event.end_offset
    );
    let detail = describe(&event.event);
    if !detail.is_empty() {
        line.push(' ');
        line.push_str(&detail);
    }
    line
}

/// One line per decoded event, then the error line if decoding stopped.
fn listing(bytes: &[u8]) -> String {
    let mut lines = Vec::new();
    for result in StreamDecoder::new(bytes) {
        match result {
            Ok(event) => lines.push(line(&event)),
            Err(err) => lines.push(format!("error: {err}")),
        }
    }
    lines.join("\n")
}

fn check(name: &str, expected: &[u8]) -> Vec<u8> {
    let bytes = golden(name);
    assert_eq!(bytes, expected, "{name} no longer matches its builder");
    bytes
}

// ── Valid streams ─────────────────────────────────────────────────────────────

#[test]
fn reads_unpacked() {
    let bytes = check("reads_unpacked.gw", &fixtures::reads_unpacked());
    assert_snapshot!(listing(&bytes), @r"
    1: new-table 24..37 table 1 Reads
    2: new-column 37..56 column 1 LEN in Reads, 32 bits, flags 0
    3: cell-data 56..76 cell Reads.LEN: 3 x 32 bits
    4: next-row 76..80 row Reads
    5: end-stream 80..84
    ");
}

#[test]
fn schema_packed() {
    let bytes = check("schema_packed.gw", &fixtures::schema_packed());
    assert_snapshot!(listing(&bytes), @r"
    1: open-stream 24..26
    2: remote-path 26..45 remote remote/SRR000001
    3: use-schema 45..101 schema align/align.vschema NCBI:align:db:alignment_sorted
    4: new-table 101..112 table 1 SEQUENCE
    5: new-table 112..135 table 2 PRIMARY_ALIGNMENT
    6: new-column 135..145 column 1 READ in SEQUENCE, 8 bits, flags 0
    7: new-column 145..159 column 2 REF_POS in PRIMARY_ALIGNMENT, 32 bits, flags 1
    8: cell-default 159..166 cell SEQUENCE.READ: 4 x 8 bits
    9: cell-data 166..179 cell SEQUENCE.READ: 10 x 8 bits
    10: cell-data 179..189 cell PRIMARY_ALIGNMENT.REF_POS: 3 x 32 bits, packed 12 bytes unpacked
    11: next-row 189..191 row SEQUENCE
    12: next-row 191..193 row PRIMARY_ALIGNMENT
    13: move-ahead 193..203 move PRIMARY_ALIGNMENT by 1000
    14: error-message 203..226 message reference not found
    15: end-stream 226..228
    ");
}

#[test]
fn wide_packed() {
    let bytes = check("wide_packed.gw", &fixtures::wide_packed());
    assert_snapshot!(listing(&bytes), @r"
    1: new-table-2 24..328 table 1 WWW..(300 bytes)
    2: new-column 328..338 column 1 BLOB in WWW..(300 bytes), 8 bits, flags 0
    3: cell-data-2 338..854 cell WWW..(300 bytes).BLOB: 512 x 8 bits
    4: end-stream 854..856
    ");
}

// ── Edge cases ────────────────────────────────────────────────────────────────

#[test]
fn trailing_data() {
    let bytes = check("edge_cases/trailing_data.gw", &fixtures::trailing_data());
    assert_snapshot!(listing(&bytes), @r"
    1: open-stream 24..28
    2: end-stream 28..32
    error: offset 32: event 2: excess data after end-stream
    ");
}

#[test]
fn zero_block() {
    let bytes = check("edge_cases/zero_block.gw", &fixtures::zero_block());
    assert_snapshot!(listing(&bytes), @r"
    1: open-stream 24..26
    error: offset 28: event 2: illegal event id - possibly block of zeros
    ");
}

#[test]
fn missing_end() {
    let bytes = check("edge_cases/missing_end.gw", &fixtures::missing_end());
    assert_snapshot!(listing(&bytes), @r"
    1: open-stream 24..28
    2: new-table 28..37 table 1 T
    error: offset 37: event 3: EOF before end-stream
    ");
}

#[test]
fn reversed_header() {
    let bytes = check("edge_cases/reversed_header.gw", &fixtures::reversed_header());
    assert_snapshot!(
        listing(&bytes),
        @"error: offset 20: event 0: reversed header byte order"
    );
}
