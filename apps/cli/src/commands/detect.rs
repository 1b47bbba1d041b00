use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use rfctl_detect::{KeyMatcher, MatcherConfig, WindowAlignment};
use rfctl_keys::{load_dir, load_file, KeySet};
use rfctl_lirc::RecordReader;
use tracing::{info, warn};

use super::{ignore_broken_pipe, next_record, open_input};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Key library directory
    #[arg(short = 'k', long = "keys", value_name = "KEYS_DIR")]
    keys_dir: Option<PathBuf>,

    /// Extra key file, e.g. one under test
    #[arg(short = 'f', long = "file", value_name = "KEY_FILE")]
    key_file: Option<PathBuf>,

    /// Relative tolerance around each stored duration
    #[arg(long)]
    tolerance: Option<f64>,

    /// Window end compared against the templates
    #[arg(long, value_enum)]
    align: Option<Align>,

    /// Receiver device, capture file, or `-` for stdin
    input: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Align {
    Oldest,
    Newest,
}

impl From<Align> for WindowAlignment {
    fn from(align: Align) -> Self {
        match align {
            Align::Oldest => WindowAlignment::Oldest,
            Align::Newest => WindowAlignment::Newest,
        }
    }
}

impl DetectArgs {
    fn matcher_config(&self, config: &Config) -> MatcherConfig {
        let mut matcher = config.matcher;
        if let Some(tolerance) = self.tolerance {
            matcher.tolerance = tolerance;
        }
        if let Some(align) = self.align {
            matcher.alignment = align.into();
        }
        matcher
    }
}

pub fn run(args: DetectArgs, config: &Config) -> Result<()> {
    let keys_dir = args.keys_dir.clone().unwrap_or_else(|| config.keys_dir.clone());
    let keys = load_keys(&keys_dir, args.key_file.as_deref());
    let mut matcher = KeyMatcher::new(Arc::new(keys), args.matcher_config(config))
        .with_context(|| format!("loading keys from {}", keys_dir.display()))?;

    let device = args.input.unwrap_or_else(|| config.device.clone());
    let input = open_input(&device)?;
    let mut out = io::stdout().lock();
    ignore_broken_pipe(detect(input, &mut out, &mut matcher).map(|_| ()))
}

/// The key library plus an optional extra file. Unparsable files are skipped.
fn load_keys(dir: &Path, extra: Option<&Path>) -> KeySet {
    let mut files = load_dir(dir).files;
    if let Some(path) = extra {
        match load_file(path) {
            Ok(file) => files.push(file),
            Err(e) => warn!(error = %e, "Skipping key file"),
        }
    }
    let keys: KeySet = files.into_iter().collect();
    info!(keys = keys.len(), max_len = keys.max_len(), "Key set ready");
    keys
}

/// Print the name of every recognized key. Returns the number of detections.
fn detect<R: Read, W: Write>(input: R, out: &mut W, matcher: &mut KeyMatcher) -> Result<usize> {
    let mut reader = RecordReader::new(input);
    let mut detections = 0;

    while let Some(record) = next_record(&mut reader)? {
        if let Some(name) = matcher.feed(record) {
            writeln!(out, "{name}")?;
            out.flush()?;
            detections += 1;
        }
    }

    info!(records = reader.records_read(), detections, "Input finished");
    Ok(detections)
}
