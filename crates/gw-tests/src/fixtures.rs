//! Streams committed under `tests/golden/`.
//!
//! The generator binary writes these; the golden tests compare the
//! committed files against them byte for byte.

use crate::{StreamBuilder, pack_u32s};

/// The reference scenario: one table, one 32-bit column, three values.
pub fn reads_unpacked() -> Vec<u8> {
    StreamBuilder::unpacked()
        .new_table(1, "Reads")
        .new_column(1, 1, "LEN", 32, 0)
        .cell_data(1, &[4, 0, 0, 0, 5, 0, 0, 0, 6, 0, 0, 0])
        .next_row(1)
        .end_stream()
        .finish()
}

/// Every narrow kind under packed framing, with a packed-integer column.
pub fn schema_packed() -> Vec<u8> {
    StreamBuilder::packed()
        .open_stream()
        .remote_path("remote/SRR000001")
        .use_schema("align/align.vschema", "NCBI:align:db:alignment_sorted")
        .new_table(1, "SEQUENCE")
        .new_table(2, "PRIMARY_ALIGNMENT")
        .new_column(1, 1, "READ", 8, 0)
        .new_column(2, 2, "REF_POS", 32, 1)
        .cell_default(1, b"ACGT")
        .cell_data(1, b"ACGTTGCANN")
        .cell_data(2, &pack_u32s(&[1, 300, 70_000]))
        .next_row(1)
        .next_row(2)
        .move_ahead(2, 1000)
        .error_message("reference not found")
        .end_stream()
        .finish()
}

/// Sizes past one byte force the wide kinds.
pub fn wide_packed() -> Vec<u8> {
    let blob: Vec<u8> = (0..512u32).map(|i| (i % 256) as u8).collect();
    StreamBuilder::packed()
        .new_table(1, &"W".repeat(300))
        .new_column(1, 1, "BLOB", 8, 0)
        .cell_data(1, &blob)
        .end_stream()
        .finish()
}

pub fn trailing_data() -> Vec<u8> {
    StreamBuilder::unpacked()
        .open_stream()
        .end_stream()
        .raw(b"junk")
        .finish()
}

pub fn zero_block() -> Vec<u8> {
    StreamBuilder::packed().open_stream().raw(&[0; 8]).finish()
}

pub fn missing_end() -> Vec<u8> {
    StreamBuilder::unpacked()
        .open_stream()
        .new_table(1, "T")
        .finish()
}

pub fn reversed_header() -> Vec<u8> {
    let mut bytes = StreamBuilder::unpacked().end_stream().finish();
    bytes[8..12].copy_from_slice(&[0, 0, 0, 1]);
    bytes
}

/// Every fixture with its path relative to `tests/golden/`.
pub fn all() -> Vec<(&'static str, Vec<u8>)> {
    vec![
        ("reads_unpacked.gw", reads_unpacked()),
        ("schema_packed.gw", schema_packed()),
        ("wide_packed.gw", wide_packed()),
        ("edge_cases/trailing_data.gw", trailing_data()),
        ("edge_cases/zero_block.gw", zero_block()),
        ("edge_cases/missing_end.gw", missing_end()),
        ("edge_cases/reversed_header.gw", reversed_header()),
    ]
}
