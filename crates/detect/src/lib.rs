//! Live key recognition.
//!
//! A `KeyMatcher` keeps a sliding window of the most recent edges, sized to
//! the longest loaded template, and reports the first template that matches
//! the window within a relative tolerance band.

use std::collections::VecDeque;
use std::sync::Arc;

use rfctl_keys::KeySet;
use rfctl_lirc::{Record, Sample};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace};

/// Default relative tolerance around each stored duration.
pub const DEFAULT_TOLERANCE: f64 = 0.15;

#[derive(Debug, thiserror::Error)]
pub enum DetectError {
    #[error("no key templates loaded")]
    NoKeys,
}

pub type Result<T> = std::result::Result<T, DetectError>;

/// Which end of the window a template is compared against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAlignment {
    /// Compare from the oldest retained sample.
    #[default]
    Oldest,
    /// Compare the most recent `len(template)` samples.
    Newest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub tolerance: f64,
    pub alignment: WindowAlignment,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            alignment: WindowAlignment::default(),
        }
    }
}

/// Matches a live edge stream against a shared key set.
#[derive(Debug)]
pub struct KeyMatcher {
    keys: Arc<KeySet>,
    config: MatcherConfig,
    window: VecDeque<Sample>,
    capacity: usize,
}

impl KeyMatcher {
    pub fn new(keys: Arc<KeySet>, config: MatcherConfig) -> Result<Self> {
        if keys.is_empty() {
            return Err(DetectError::NoKeys);
        }
        let capacity = keys.max_len();
        debug!(
            keys = keys.len(),
            capacity,
            tolerance = config.tolerance,
            alignment = ?config.alignment,
            "Key matcher ready"
        );
        Ok(Self {
            keys,
            config,
            window: VecDeque::with_capacity(capacity + 1),
            capacity,
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn keys(&self) -> &KeySet {
        &self.keys
    }

    /// Samples currently held in the window.
    pub fn window_len(&self) -> usize {
        self.window.len()
    }

    /// Maximum window size (length of the longest template).
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn reset(&mut self) {
        self.window.clear();
    }

    /// Feed one decoded record. Timeouts are ignored.
    pub fn feed(&mut self, record: Record) -> Option<&str> {
        match record.sample() {
            Some(sample) => self.push(sample),
            None => {
                trace!(timeout_us = record.value(), "Timeout ignored by matcher");
                None
            }
        }
    }

    /// Push one edge. Returns the name of the first matching key; the window
    /// is cleared on a match.
    pub fn push(&mut self, sample: Sample) -> Option<&str> {
        self.window.push_back(sample);
        if self.window.len() > self.capacity {
            self.window.pop_front();
        }

        let MatcherConfig {
            tolerance,
            alignment,
        } = self.config;
        let window: &[Sample] = self.window.make_contiguous();
        let name = self.keys.iter().find_map(|(name, template)| {
            let aligned = align(window, template.len(), alignment)?;
            matches(aligned, template, tolerance).then_some(name)
        })?;

        self.window.clear();
        info!(key = name, "Key detected");
        Some(name)
    }
}

/// The slice of `window` a template of `len` samples is compared against.
fn align(window: &[Sample], len: usize, alignment: WindowAlignment) -> Option<&[Sample]> {
    if len == 0 || window.len() < len {
        return None;
    }
    match alignment {
        WindowAlignment::Oldest => Some(&window[..len]),
        WindowAlignment::Newest => Some(&window[window.len() - len..]),
    }
}

/// Every level equal, every duration inside `[t * (1 - tol), t * (1 + tol)]`.
fn matches(window: &[Sample], template: &[Sample], tolerance: f64) -> bool {
    window.iter().zip(template).all(|(s, t)| {
        let expected = f64::from(t.duration);
        let actual = f64::from(s.duration);
        s.level == t.level
            && actual >= expected * (1.0 - tolerance)
            && actual <= expected * (1.0 + tolerance)
    })
}
