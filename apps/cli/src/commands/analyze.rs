use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use rfctl_analysis::{CaptureSession, FeedOutcome, SessionConfig, TimeoutPolicy};
use rfctl_keys::save_template;
use rfctl_lirc::{RecordReader, Timeline, TimelineStep};
use tracing::{debug, info};

use super::{ignore_broken_pipe, next_record, open_input};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Run length at which classification starts
    #[arg(short = 'l', long = "min-len", value_name = "LEN")]
    min_len: Option<usize>,

    /// Dump records with timeline stamps instead of analyzing
    #[arg(short = 'd', long)]
    dump: bool,

    /// As --dump, with the raw hex word appended
    #[arg(short = 'D', long = "dump-hex", conflicts_with = "binary")]
    dump_hex: bool,

    /// Write the selected records as raw binary
    #[arg(short = 'b', long, conflicts_with = "dump")]
    binary: bool,

    /// Skip records before this time, µs (e.g. 2_220_000)
    #[arg(short = 's', long, value_name = "START", value_parser = parse_micros)]
    start: Option<u64>,

    /// Stop at the record reaching this time, µs
    #[arg(short = 'e', long, value_name = "END", value_parser = parse_micros)]
    end: Option<u64>,

    /// Print the extracted key with this description at end of input
    #[arg(short = 'k', long = "key", value_name = "DESC")]
    description: Option<String>,

    /// Save the extracted key into this directory instead of printing it
    #[arg(long, value_name = "DIR", requires = "description")]
    save_dir: Option<PathBuf>,

    /// Keep collected sequences across receiver timeouts
    #[arg(long)]
    keep_on_timeout: bool,

    /// Capture file, or `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,
}

/// What to do with each selected record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Dump { hex: bool },
    Binary,
    Segment { print_candidates: bool },
}

impl AnalyzeArgs {
    fn mode(&self) -> Mode {
        if self.dump || self.dump_hex {
            Mode::Dump { hex: self.dump_hex }
        } else if self.binary {
            Mode::Binary
        } else {
            Mode::Segment {
                print_candidates: self.description.is_none(),
            }
        }
    }

    fn session_config(&self, config: &Config) -> SessionConfig {
        let mut session = config.session;
        if let Some(len) = self.min_len {
            session.min_sample_len = len;
        }
        if self.keep_on_timeout {
            session.timeout_policy = TimeoutPolicy::Ignore;
        }
        session
    }
}

pub fn run(args: AnalyzeArgs, config: &Config) -> Result<()> {
    let mode = args.mode();
    let mut session = CaptureSession::new(args.session_config(config));
    let timeline = Timeline::new(args.start, args.end);
    debug!(?mode, config = ?session.config(), "Analyzing");

    let input = open_input(&args.input)?;
    let mut out = io::stdout().lock();
    ignore_broken_pipe(analyze(input, &mut out, mode, timeline, &mut session))?;

    if !matches!(mode, Mode::Segment { .. }) {
        return Ok(());
    }
    let Some(description) = args.description.as_deref() else {
        return Ok(());
    };

    let template = session.extract(Some(description)).with_context(|| {
        format!(
            "extracting key from {} candidate sequences",
            session.candidate_count()
        )
    })?;
    match args.save_dir {
        Some(dir) => {
            let path = save_template(&dir, &template)?;
            info!(path = %path.display(), len = template.len(), "Key saved");
            writeln!(out, "{}", path.display())?;
        }
        None => write!(out, "{}", template.render())?,
    }
    Ok(())
}

/// Run every record of `input` inside the timeline window through `mode`.
fn analyze<R: Read, W: Write>(
    input: R,
    out: &mut W,
    mode: Mode,
    mut timeline: Timeline,
    session: &mut CaptureSession,
) -> Result<()> {
    let mut reader = RecordReader::new(input);

    while let Some(record) = next_record(&mut reader)? {
        let Some(sample) = record.sample() else {
            match mode {
                Mode::Dump { .. } => eprintln!("timeout {}", record.value()),
                Mode::Binary => {}
                Mode::Segment { .. } => {
                    session.feed(record);
                }
            }
            continue;
        };

        let step = timeline.advance(sample.duration);
        let at = match step {
            TimelineStep::Skip => continue,
            TimelineStep::Done => break,
            TimelineStep::Emit { at } | TimelineStep::Last { at } => at,
        };

        match mode {
            Mode::Dump { hex } => {
                write!(
                    out,
                    "{} {} {}",
                    grouped(at, 7),
                    sample.level.as_char(),
                    grouped(u64::from(sample.duration), 6)
                )?;
                if hex {
                    let word: String = record.to_bytes().iter().map(|b| format!("{b:02x}")).collect();
                    write!(out, " {word}")?;
                }
                writeln!(out)?;
            }
            Mode::Binary => out.write_all(&record.to_bytes())?,
            Mode::Segment { print_candidates } => {
                if let FeedOutcome::Candidate(candidate) = session.feed(record) {
                    if print_candidates {
                        writeln!(out, "{}", candidate.to_template(None).render_inline())?;
                    }
                }
            }
        }
        out.flush()?;

        if matches!(step, TimelineStep::Last { .. }) {
            break;
        }
    }

    info!(
        records = reader.records_read(),
        candidates = session.candidate_count(),
        "Input finished"
    );
    Ok(())
}

/// Zero-padded decimal with `_` thousands separators, at least `width` wide.
fn grouped(value: u64, width: usize) -> String {
    let mut digits = value.to_string();
    loop {
        let mut text = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                text.push('_');
            }
            text.push(c);
        }
        if text.len() >= width {
            return text;
        }
        digits.insert(0, '0');
    }
}

/// Microseconds, allowing `_` digit grouping.
fn parse_micros(value: &str) -> std::result::Result<u64, String> {
    value
        .replace('_', "")
        .parse()
        .map_err(|e| format!("invalid time `{value}`: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rfctl_lirc::Record;
    use std::io::Cursor;

    fn burst() -> Vec<Record> {
        let mut records = Vec::new();
        for i in 0..15 {
            records.push(Record::Pulse(500));
            if i < 14 {
                records.push(Record::Space(1500));
            }
        }
        records.push(Record::Space(25_000));
        records
    }

    fn bytes(records: &[Record]) -> Vec<u8> {
        records.iter().flat_map(|r| r.to_bytes()).collect()
    }

    fn run_mode(records: &[Record], mode: Mode, timeline: Timeline) -> (String, CaptureSession) {
        let mut session = CaptureSession::default();
        let mut out = Vec::new();
        analyze(Cursor::new(bytes(records)), &mut out, mode, timeline, &mut session).unwrap();
        (String::from_utf8_lossy(&out).into_owned(), session)
    }

    #[test]
    fn test_grouped() {
        assert_eq!(grouped(1500, 6), "01_500");
        assert_eq!(grouped(500, 6), "00_500");
        assert_eq!(grouped(0, 7), "000_000");
        assert_eq!(grouped(2_220_000, 7), "2_220_000");
        assert_eq!(grouped(1500, 8), "0_001_500");
    }

    #[test]
    fn test_parse_micros() {
        assert_eq!(parse_micros("2_220_000"), Ok(2_220_000));
        assert_eq!(parse_micros("15"), Ok(15));
        assert!(parse_micros("soon").is_err());
    }

    #[test]
    fn test_dump_with_window() {
        let records = [
            Record::Pulse(500),
            Record::Space(1500),
            Record::Timeout(20_000),
            Record::Pulse(500),
            Record::Space(1500),
            Record::Pulse(500),
        ];
        let (text, _) = run_mode(
            &records,
            Mode::Dump { hex: false },
            Timeline::new(Some(500), Some(2500)),
        );
        assert_eq!(
            text.lines().collect::<Vec<_>>(),
            vec!["000_000 0 01_500", "001_500 1 00_500", "002_000 0 01_500"]
        );
    }

    #[test]
    fn test_dump_hex_appends_word() {
        let (text, _) = run_mode(
            &[Record::Pulse(500)],
            Mode::Dump { hex: true },
            Timeline::unbounded(),
        );
        let word: String = Record::Pulse(500)
            .to_bytes()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        assert_eq!(text, format!("000_000 1 00_500 {word}\n"));
    }

    #[test]
    fn test_binary_passthrough_drops_timeouts() {
        let records = [Record::Pulse(500), Record::Timeout(20_000), Record::Space(1500)];
        let mut session = CaptureSession::default();
        let mut out = Vec::new();
        analyze(
            Cursor::new(bytes(&records)),
            &mut out,
            Mode::Binary,
            Timeline::unbounded(),
            &mut session,
        )
        .unwrap();
        assert_eq!(out, bytes(&[Record::Pulse(500), Record::Space(1500)]));
    }

    #[test]
    fn test_segment_prints_candidates() {
        let mut records = burst();
        records.extend(burst());

        let (text, session) = run_mode(
            &records,
            Mode::Segment {
                print_candidates: true,
            },
            Timeline::unbounded(),
        );

        assert_eq!(session.candidate_count(), 1);
        let line = text.lines().next().unwrap();
        assert!(line.starts_with("#@"));
        assert!(line.contains("#!delta=0.0%, 1 500, 0 1500"));
        assert_eq!(text.lines().count(), 1);
    }

    #[test]
    fn test_segment_quiet_when_extracting() {
        let mut records = burst();
        records.extend(burst());

        let (text, session) = run_mode(
            &records,
            Mode::Segment {
                print_candidates: false,
            },
            Timeline::unbounded(),
        );
        assert!(text.is_empty());
        assert_eq!(session.candidate_count(), 1);
    }
}
