#![no_main]

use arbitrary::Arbitrary;
use gw_decoder::decode_slice;
use gw_tests::StreamBuilder;
use gw_wire::Framing;
use libfuzzer_sys::fuzz_target;

// Fuzz target: valid streams built from arbitrary operations.
//
// Every operation is clamped to ids the stream has already declared, so the
// result must always decode, with one event per operation plus end-stream.
#[derive(Debug, Arbitrary)]
enum FuzzOp {
    OpenStream,
    NewTable { name: String },
    NewColumn { table: u8, name: String, width_id: u8 },
    Cell { column: u8, default: bool, data: Vec<u8> },
    NextRow { table: u8 },
    MoveAhead { table: u8, nrows: u64 },
    UseSchema { file: String, spec: String },
    RemotePath { path: String },
    ErrorMessage { message: String },
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    packed: bool,
    ops: Vec<FuzzOp>,
}

fn non_empty(text: String) -> String {
    // 60 chars stay within a one-byte size field
    let mut text: String = text.chars().take(60).collect();
    if text.is_empty() {
        text.push('x');
    }
    text
}

fuzz_target!(|input: FuzzInput| {
    let framing = if input.packed {
        Framing::Packed
    } else {
        Framing::Unpacked
    };
    let mut builder = StreamBuilder::with_header(framing);
    let mut tables = 0u32;
    let mut columns = 0u32;
    let mut events = 0usize;

    // packed framing carries ids in one byte
    let max_ids = if input.packed { 200 } else { 10_000 };

    for op in input.ops {
        builder = match op {
            FuzzOp::OpenStream => builder.open_stream(),
            FuzzOp::NewTable { name } if tables < max_ids => {
                tables += 1;
                builder.new_table(tables, &non_empty(name))
            }
            FuzzOp::NewColumn {
                table,
                name,
                width_id,
            } if tables > 0 && columns < max_ids => {
                columns += 1;
                let table_id = u32::from(table) % tables + 1;
                let elem_bits = 8 << (width_id % 4);
                builder.new_column(columns, table_id, &non_empty(name), elem_bits, 0)
            }
            FuzzOp::Cell {
                column,
                default,
                data,
            } if columns > 0 => {
                let column_id = u32::from(column) % columns + 1;
                // whole 64-bit elements fit every declared width
                let len = data.len().min(4096) / 8 * 8;
                if default {
                    builder.cell_default(column_id, &data[..len])
                } else {
                    builder.cell_data(column_id, &data[..len])
                }
            }
            FuzzOp::NextRow { table } if tables > 0 => {
                builder.next_row(u32::from(table) % tables + 1)
            }
            FuzzOp::MoveAhead { table, nrows } if tables > 0 => {
                builder.move_ahead(u32::from(table) % tables + 1, nrows)
            }
            FuzzOp::UseSchema { file, spec } => {
                builder.use_schema(&non_empty(file), &non_empty(spec))
            }
            FuzzOp::RemotePath { path } => builder.remote_path(&non_empty(path)),
            FuzzOp::ErrorMessage { message } => builder.error_message(&non_empty(message)),
            _ => continue,
        };
        events += 1;
    }

    let bytes = builder.end_stream().finish();
    let decoded = decode_slice(&bytes).unwrap();
    assert_eq!(decoded.len(), events + 1);
});
