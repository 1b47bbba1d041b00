use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use rfctl_keys::{load_dir, KeySummary};

use super::ignore_broken_pipe;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct KeysArgs {
    /// Key library directory
    #[arg(short = 'k', long = "keys", value_name = "KEYS_DIR")]
    keys_dir: Option<PathBuf>,

    /// Only keys whose name or description contains this text
    #[arg(long)]
    filter: Option<String>,

    /// Print JSON instead of a table
    #[arg(long)]
    json: bool,
}

pub fn run(args: KeysArgs, config: &Config) -> Result<()> {
    let dir = args.keys_dir.unwrap_or_else(|| config.keys_dir.clone());
    let summaries: Vec<KeySummary> = load_dir(&dir)
        .files
        .iter()
        .map(|file| file.summary())
        .filter(|summary| matches_filter(summary, args.filter.as_deref()))
        .collect();

    let mut out = io::stdout().lock();
    ignore_broken_pipe(write_summaries(&mut out, &summaries, args.json))
}

fn write_summaries<W: Write>(out: &mut W, summaries: &[KeySummary], json: bool) -> Result<()> {
    if json {
        serde_json::to_writer_pretty(&mut *out, summaries)?;
        writeln!(out)?;
    } else {
        for summary in summaries {
            writeln!(out, "{}", table_row(summary))?;
        }
    }
    Ok(())
}

/// Case-insensitive substring match on name or description.
fn matches_filter(summary: &KeySummary, filter: Option<&str>) -> bool {
    let Some(filter) = filter else {
        return true;
    };
    let needle = filter.to_lowercase();
    summary.name.to_lowercase().contains(&needle)
        || summary
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

fn table_row(summary: &KeySummary) -> String {
    let delta = summary
        .delta
        .map(|d| format!("{:.1}%", d * 100.0))
        .unwrap_or_else(|| "-".to_string());
    let created = summary
        .created_at
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "{:<32} {:>4} {:>6} {:<19} {}",
        summary.name,
        summary.len,
        delta,
        created,
        summary.description.as_deref().unwrap_or_default()
    )
}
