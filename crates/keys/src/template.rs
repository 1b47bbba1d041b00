//! Canonical key template and its text rendering.

use chrono::{DateTime, Utc};
use rfctl_lirc::{Level, Sample};

/// Timestamp layout of the `#@` metadata line (ISO-8601, second precision).
pub(crate) const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub(crate) const TIMESTAMP_PREFIX: &str = "@";
pub(crate) const DESCRIPTION_PREFIX: &str = "!desc=";
pub(crate) const DELTA_PREFIX: &str = "!delta=";

/// A decoded key signature, ready to be written to a key file.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTemplate {
    pub created_at: DateTime<Utc>,
    pub description: Option<String>,
    /// Classifier quality metric: worst relative spread within a timing cluster.
    pub delta: f64,
    pub samples: Vec<Sample>,
}

impl KeyTemplate {
    /// Build a template from durations of a sequence that starts with a pulse.
    pub fn from_durations(durations: &[u32], delta: f64, description: Option<&str>) -> Self {
        Self {
            created_at: Utc::now(),
            description: description.map(single_line),
            delta,
            samples: durations
                .iter()
                .enumerate()
                .map(|(i, &d)| Sample::new(Level::alternating(i), d))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn durations(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.duration).collect()
    }

    /// Render the key file text. Every line ends with `\n`.
    pub fn render(&self) -> String {
        let mut out = self.render_lines().join("\n");
        out.push('\n');
        out
    }

    /// Render the key file on one line, fields joined by `", "`.
    ///
    /// Used when printing candidates as they are detected.
    pub fn render_inline(&self) -> String {
        self.render_lines().join(", ")
    }

    fn render_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.samples.len() + 3);
        lines.push(format!(
            "#{TIMESTAMP_PREFIX}{}",
            self.created_at.format(TIMESTAMP_FORMAT)
        ));
        if let Some(desc) = self.description.as_deref().filter(|d| !d.is_empty()) {
            lines.push(format!("#{DESCRIPTION_PREFIX}{}", single_line(desc)));
        }
        lines.push(format!("#{DELTA_PREFIX}{}", format_percent(self.delta)));
        lines.extend(
            self.samples
                .iter()
                .map(|s| format!("{} {}", s.level, s.duration)),
        );
        lines
    }
}

/// Line breaks become spaces so the description stays on its metadata line.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

/// `0.032` -> `"3.2%"`.
fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}
