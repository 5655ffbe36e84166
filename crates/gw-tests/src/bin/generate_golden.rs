//! Golden fixture generator for the gw conformance suite.
//!
//! Writes every fixture under `tests/golden/`. Run it after a deliberate
//! wire-format change and commit the regenerated files; `tests/golden.rs`
//! checks both that the committed bytes still match what [`StreamBuilder`]
//! writes and that they decode to the expected events.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin generate_golden -p gw-tests
//! ```
//!
//! # Generated fixtures
//!
//! | File                          | Contents                                   |
//! |-------------------------------|--------------------------------------------|
//! | reads_unpacked.gw             | One table, one 32-bit column, one row      |
//! | schema_packed.gw              | Every narrow kind, packed-integer column   |
//! | wide_packed.gw                | Wide table name and wide cell              |
//! | edge_cases/trailing_data.gw   | Valid stream + 4 extra bytes               |
//! | edge_cases/zero_block.gw      | Zeroed block where an event should start   |
//! | edge_cases/missing_end.gw     | Stream cut off before end-stream           |
//! | edge_cases/reversed_header.gw | Header written with the wrong byte order   |

#![allow(clippy::pedantic)]

use std::path::Path;

use gw_tests::fixtures;

fn main() {
    let manifest_dir = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let golden_dir = manifest_dir.join("tests/golden");

    for (name, bytes) in fixtures::all() {
        write_file(&golden_dir.join(name), &bytes);
    }

    println!("All golden fixtures written to {}", golden_dir.display());
}

fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create_dir_all");
    }
    std::fs::write(path, data).expect("write_file");
    println!("  wrote {}", path.display());
}
