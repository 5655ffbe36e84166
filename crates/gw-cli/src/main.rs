//! `gw-dump`: decode, validate, and display general-writer event streams.
//!
//! # Usage
//!
//! ```text
//! gw-dump [OPTIONS] [FILES]...
//!
//! Arguments:
//!   [FILES]...          stream files; standard input when none are given
//!
//! Options:
//!   -v, --verbose...    display events (repeat to raise the log level)
//!   -j, --jump <N>      jump to event N before displaying (1-based)
//!   -N, --limit <COUNT> display COUNT events, then go quiet
//!       --format <FMT>  text (default) | json
//!   -h, --help          Print help
//!   -V, --version       Print version
//! ```
//!
//! Every stream is decoded and validated in full whether or not anything is
//! displayed. Each file is independent: a failure is reported and the next
//! file is still attempted.
//!
//! # Exit codes
//!
//! | Code | Meaning                                          |
//! |------|--------------------------------------------------|
//! | 0    | Every input decoded cleanly                      |
//! | 1    | At least one input failed to open or decode      |
//!
//! Failures are written to stderr as `ERROR: offset <o>: event <n>: <msg>`
//! so stdout carries only the report.
use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use gw_decoder::{DisplayWindow, StreamError};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod dump;
mod report;

use dump::{Format, Source};

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Analyze and display the contents of a stream produced by the
/// general-writer library.
#[derive(Parser)]
#[command(name = "gw-dump", version, about = "General-writer stream dumper")]
struct Cli {
    /// Stream files to decode. Reads standard input when omitted.
    files: Vec<PathBuf>,

    /// Increase verbosity. Once enables display; more raise the log level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Jump to this event before displaying. Event numbers are 1-based.
    #[arg(short, long, value_name = "N", default_value_t = 0)]
    jump: u64,

    /// Display this many events and then go quiet.
    #[arg(short = 'N', long, value_name = "COUNT", default_value_t = 0)]
    limit: u64,

    /// Report format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

impl Cli {
    fn window(&self) -> DisplayWindow {
        DisplayWindow {
            enabled: self.verbose > 0,
            jump_to: self.jump,
            limit: self.limit,
        }
    }

    fn sources(&self) -> Vec<Source> {
        if self.files.is_empty() {
            vec![Source::Stdin]
        } else {
            self.files.iter().cloned().map(Source::File).collect()
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let window = cli.window();
    let mut stdout = io::stdout().lock();
    let mut failed = 0usize;

    for source in cli.sources() {
        if let Err(e) = dump::dump_source(&source, window, cli.format, &mut stdout) {
            failed += 1;
            match e.downcast_ref::<StreamError>() {
                Some(stream) => eprintln!("ERROR: {stream}"),
                None => eprintln!("ERROR: {e:#}"),
            }
            debug!(source = %source.describe(), "input rejected");
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins; otherwise `-vv` means debug and `-vvv`
/// trace.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 | 1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("gw_dump={level},gw_decoder={level},gw_wire={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
