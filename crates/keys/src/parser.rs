//! Key file parser.
//!
//! Parsing is two-pass: the first data line decides which whitespace
//! separated field holds the level, then every data line is read with that
//! column. This lets key files carry extra columns, e.g. a dump with a
//! leading timeline stamp and a trailing hex word:
//!
//! ```text
//! 0_002_000 1 01_500 dc050001
//! ```

use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use rfctl_lirc::{Level, Sample};
use serde::Serialize;

use crate::error::{KeyError, KeyResult};
use crate::template::{DELTA_PREFIX, DESCRIPTION_PREFIX, TIMESTAMP_FORMAT, TIMESTAMP_PREFIX};

/// A parsed key file.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyFile {
    /// Key name, the file stem.
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub delta: Option<f64>,
    pub samples: Vec<Sample>,
}

/// Key metadata without the samples, for listings.
#[derive(Debug, Clone, Serialize)]
pub struct KeySummary {
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub delta: Option<f64>,
    pub len: usize,
}

impl KeyFile {
    pub fn summary(&self) -> KeySummary {
        KeySummary {
            name: self.name.clone(),
            created_at: self.created_at,
            description: self.description.clone(),
            delta: self.delta,
            len: self.samples.len(),
        }
    }
}

#[derive(Debug, Default)]
struct Header {
    created_at: Option<DateTime<Utc>>,
    description: Option<String>,
    delta: Option<f64>,
}

impl Header {
    /// Absorb one comment line (without its leading `#`).
    fn absorb(&mut self, comment: &str) {
        if let Some(ts) = comment.strip_prefix(TIMESTAMP_PREFIX) {
            self.created_at = NaiveDateTime::parse_from_str(ts.trim(), TIMESTAMP_FORMAT)
                .map(|dt| dt.and_utc())
                .ok();
        } else if let Some(desc) = comment.strip_prefix(DESCRIPTION_PREFIX) {
            self.description = Some(desc.trim_end_matches('\r').to_string());
        } else if let Some(delta) = comment.strip_prefix(DELTA_PREFIX) {
            self.delta = delta
                .trim()
                .trim_end_matches('%')
                .parse::<f64>()
                .ok()
                .map(|percent| percent / 100.0);
        }
    }
}

/// A data line split into fields, with its 1-based line number.
struct DataLine<'a> {
    line: usize,
    fields: Vec<&'a str>,
}

/// Parse key file content. `path` names the file in errors and gives the key name.
pub fn parse_key_content(content: &str, path: &Path) -> KeyResult<KeyFile> {
    let mut header = Header::default();
    let mut data = Vec::new();

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        // Comments keep their trailing spaces: they belong to the description.
        if let Some(comment) = raw.trim_start().strip_prefix('#') {
            header.absorb(comment);
            continue;
        }
        data.push(DataLine {
            line: idx + 1,
            fields: line.split_whitespace().collect(),
        });
    }

    // First pass: locate the level column.
    let first = data.first().ok_or_else(|| KeyError::Empty {
        path: path.to_path_buf(),
    })?;
    let level_column = locate_level_column(&first.fields).ok_or_else(|| KeyError::NoLevelColumn {
        path: path.to_path_buf(),
        line: first.line,
        content: first.fields.join(" "),
    })?;

    // Second pass: read every data line with it.
    let samples = data
        .iter()
        .map(|line| parse_data_line(line, level_column, path))
        .collect::<KeyResult<Vec<_>>>()?;

    Ok(KeyFile {
        name: key_name(path),
        created_at: header.created_at,
        description: header.description,
        delta: header.delta,
        samples,
    })
}

/// Index of the first `0`/`1` field that has a field after it.
fn locate_level_column(fields: &[&str]) -> Option<usize> {
    fields
        .iter()
        .enumerate()
        .find(|(i, field)| parse_level(field).is_some() && fields.len() > i + 1)
        .map(|(i, _)| i)
}

fn parse_level(field: &str) -> Option<Level> {
    match field {
        "1" => Some(Level::Pulse),
        "0" => Some(Level::Space),
        _ => None,
    }
}

fn parse_data_line(data: &DataLine<'_>, level_column: usize, path: &Path) -> KeyResult<Sample> {
    let level_field = data.fields.get(level_column).copied().unwrap_or_default();
    let level = parse_level(level_field).ok_or_else(|| KeyError::BadLevel {
        path: path.to_path_buf(),
        line: data.line,
        found: level_field.to_string(),
    })?;

    let duration_field = data.fields.get(level_column + 1).copied().unwrap_or_default();
    let duration = parse_duration(duration_field).ok_or_else(|| KeyError::BadDuration {
        path: path.to_path_buf(),
        line: data.line,
        found: duration_field.to_string(),
    })?;

    Ok(Sample::new(level, duration))
}

/// Durations may use `_` digit grouping, as in `01_500`.
fn parse_duration(field: &str) -> Option<u32> {
    if field.is_empty() || field.starts_with('_') || field.ends_with('_') {
        return None;
    }
    field.replace('_', "").parse().ok()
}

fn key_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
