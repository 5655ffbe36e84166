//! Decode one input and write its report.

use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use gw_decoder::{DisplayWindow, EventSink, StreamDecoder, StreamError, StreamSummary};
use gw_wire::StreamHeader;
use tracing::{debug, info};

use crate::report::{JsonReport, TextReport};

/// Report format for `--format`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Indented `field = value` lines per event.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Where a stream comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl Source {
    pub fn describe(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_owned(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Decode `source` completely, reporting the events `window` admits to
/// `out`.
///
/// # Errors
///
/// - The file cannot be opened.
/// - The stream fails to decode; the error is the decoder's
///   [`StreamError`], so callers can downcast it.
/// - The report cannot be written.
pub fn dump_source(
    source: &Source,
    window: DisplayWindow,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    info!(source = %source.describe(), "decoding");
    match source {
        Source::Stdin => dump(io::stdin().lock(), window, format, out),
        Source::File(path) => dump(open(path)?, window, format, out),
    }
}

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open input file \"{}\"", path.display()))?;
    Ok(BufReader::new(file))
}

/// Decode one stream from `input`.
///
/// Events decoded before a failure are still reported, and the report is
/// flushed before the decode error is returned.
///
/// # Errors
///
/// As [`dump_source`], minus the open failure.
pub fn dump(
    input: impl Read,
    window: DisplayWindow,
    format: Format,
    out: &mut impl Write,
) -> Result<()> {
    let mut decoder = StreamDecoder::new(input).with_window(window);
    let header = decoder
        .read_header()?
        .ok_or_else(|| anyhow!("stream header unavailable"))?;

    let mut out = BufWriter::new(out);
    let decoded = match format {
        Format::Text => {
            let mut report = TextReport::new(&mut out, header.framing);
            let decoded = run(&mut decoder, &mut report, &header);
            report.finish().context("failed to write report")?;
            decoded
        }
        Format::Json => {
            let mut report = JsonReport::new(&mut out);
            let decoded = run(&mut decoder, &mut report, &header);
            report.finish().context("failed to write report")?;
            decoded
        }
    };
    out.flush().context("failed to write report")?;

    let summary = decoded?;
    debug!(
        events = summary.events,
        tables = summary.tables,
        columns = summary.columns,
        bytes = summary.bytes,
        "stream ok"
    );
    Ok(())
}

fn run<R: Read>(
    decoder: &mut StreamDecoder<R>,
    report: &mut impl EventSink,
    header: &StreamHeader,
) -> Result<StreamSummary, StreamError> {
    // the header was read eagerly, so `run` will not announce it
    if decoder.window().shows_header() {
        report.header(header);
    }
    decoder.run(report)
}
