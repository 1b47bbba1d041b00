use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Args;
use rfctl_lirc::RecordReader;
use tracing::info;

use super::{ignore_broken_pipe, open_input};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct DumpArgs {
    /// Stop after this many seconds (default: forever)
    #[arg(short = 't', long = "time", value_name = "SECONDS")]
    seconds: Option<f64>,

    /// Print each record as hex instead of raw bytes
    #[arg(long)]
    hex: bool,

    /// Keep raw bytes on stdout and print each record as hex on stderr
    #[arg(long, conflicts_with = "hex")]
    hex_stderr: bool,

    /// Receiver device, or `-` for stdin
    device: Option<PathBuf>,
}

pub fn run(args: DumpArgs, config: &Config) -> Result<()> {
    let device = args.device.unwrap_or_else(|| config.device.clone());
    let limit = args
        .seconds
        .filter(|s| *s > 0.0)
        .map(Duration::try_from_secs_f64)
        .transpose()
        .context("invalid dump time")?;
    info!(device = %device.display(), ?limit, "Dumping records");

    let format = if args.hex {
        Format::Hex
    } else if args.hex_stderr {
        Format::RawWithHex
    } else {
        Format::Raw
    };

    let input = open_input(&device)?;
    let mut out = io::stdout().lock();
    let mut err = io::stderr().lock();
    ignore_broken_pipe(dump(input, &mut out, &mut err, format, limit))
}

/// How records are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    /// Raw bytes to `out`.
    Raw,
    /// One hex word per line to `out`.
    Hex,
    /// Raw bytes to `out`, hex words to `err`.
    RawWithHex,
}

/// Copy whole records from `input` to `out` (and `err`) in `format`.
fn dump<R: Read, W: Write, E: Write>(
    input: R,
    out: &mut W,
    err: &mut E,
    format: Format,
    limit: Option<Duration>,
) -> Result<()> {
    let started = Instant::now();
    let mut reader = RecordReader::new(input);

    while let Some(bytes) = reader.read_raw().context("reading device")? {
        match format {
            Format::Raw => out.write_all(&bytes)?,
            Format::Hex => writeln!(out, "{}", hex_word(&bytes))?,
            Format::RawWithHex => {
                out.write_all(&bytes)?;
                writeln!(err, "{}", hex_word(&bytes))?;
            }
        }
        out.flush()?;

        if limit.is_some_and(|limit| started.elapsed() >= limit) {
            break;
        }
    }

    info!(records = reader.records_read(), "Dump finished");
    Ok(())
}

fn hex_word(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
