//! Capture session: online segmentation of an edge stream.
//!
//! Edges are accumulated into a run that always starts with a pulse. Once
//! the run reaches the minimum length, every new space re-classifies it:
//! - while no prefix has been accepted, a rejection slides the run forward
//!   by one pulse/space pair;
//! - once accepted, the run keeps growing until a rejection marks the end of
//!   the sequence. The run minus the breaking pair becomes a candidate.
//!
//! The very first sequence of a session is usually truncated (captured
//! before the receiver settled) and is dropped.

use rfctl_keys::KeyTemplate;
use rfctl_lirc::{Level, Record, Sample};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::classifier::{classify, Classification, ClassifierConfig, RejectReason};
use crate::constants::DEFAULT_MIN_SAMPLE_LEN;
use crate::extractor;
use crate::Result;

/// What a receiver timeout does to the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutPolicy {
    /// Clear the whole session, including collected candidates.
    #[default]
    ResetSession,
    /// Keep the session untouched.
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Run length at which classification starts.
    pub min_sample_len: usize,
    pub timeout_policy: TimeoutPolicy,
    pub classifier: ClassifierConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            min_sample_len: DEFAULT_MIN_SAMPLE_LEN,
            timeout_policy: TimeoutPolicy::default(),
            classifier: ClassifierConfig::default(),
        }
    }
}

/// A completed bi-timed sequence found by the segmenter.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSequence {
    /// Quality metric of the sequence (lower is tighter).
    pub delta: f64,
    /// Edge durations, starting with a pulse.
    pub durations: Vec<u32>,
}

impl CandidateSequence {
    pub fn len(&self) -> usize {
        self.durations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.durations.is_empty()
    }

    /// The raw (unquantized) sequence as a key template.
    pub fn to_template(&self, description: Option<&str>) -> KeyTemplate {
        KeyTemplate::from_durations(&self.durations, self.delta, description)
    }
}

/// Result of feeding one record to a session.
#[derive(Debug, PartialEq)]
pub enum FeedOutcome<'a> {
    Nothing,
    /// A new candidate was appended to the session.
    Candidate(&'a CandidateSequence),
    /// A timeout cleared the session; `discarded` candidates were dropped.
    SessionReset { discarded: usize },
}

/// Segmentation state for one capture.
#[derive(Debug)]
pub struct CaptureSession {
    config: SessionConfig,
    edge_run: Vec<u32>,
    /// A prefix of the current run has been accepted.
    accepted: bool,
    /// Delta of the last accepted prefix.
    last_delta: f64,
    /// The next boundary is the first of the session.
    first_boundary: bool,
    candidates: Vec<CandidateSequence>,
    classify_calls: u64,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl CaptureSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            edge_run: Vec::new(),
            accepted: false,
            last_delta: 0.0,
            first_boundary: true,
            candidates: Vec::new(),
            classify_calls: 0,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn candidates(&self) -> &[CandidateSequence] {
        &self.candidates
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }

    /// Current length of the in-progress run.
    pub fn run_len(&self) -> usize {
        self.edge_run.len()
    }

    /// Number of times the classifier has been invoked.
    pub fn classify_calls(&self) -> u64 {
        self.classify_calls
    }

    /// Feed one decoded record, applying the timeout policy to timeouts.
    pub fn feed(&mut self, record: Record) -> FeedOutcome<'_> {
        match record.sample() {
            Some(sample) => match self.push(sample) {
                Some(candidate) => FeedOutcome::Candidate(candidate),
                None => FeedOutcome::Nothing,
            },
            None => self.on_timeout(record.value()),
        }
    }

    /// Push one edge. Returns the new candidate when a sequence completes.
    pub fn push(&mut self, sample: Sample) -> Option<&CandidateSequence> {
        match sample.level {
            Level::Pulse => {
                self.edge_run.push(sample.duration);
                return None;
            }
            Level::Space if self.edge_run.is_empty() => {
                trace!(duration = sample.duration, "Space without leading pulse dropped");
                return None;
            }
            Level::Space => self.edge_run.push(sample.duration),
        }

        if self.edge_run.len() < self.config.min_sample_len {
            return None;
        }

        self.classify_calls += 1;
        match classify(&self.edge_run, &self.config.classifier) {
            Classification::Accept { delta } => {
                self.accepted = true;
                self.last_delta = delta;
                None
            }
            Classification::Reject(reason) if self.accepted => self.close_run(reason),
            Classification::Reject(reason) => {
                trace!(?reason, len = self.edge_run.len(), "Sliding search window");
                let pair = self.edge_run.len().min(2);
                self.edge_run.drain(..pair);
                None
            }
        }
    }

    /// Finish the current run: it was valid up to the last pair.
    fn close_run(&mut self, reason: RejectReason) -> Option<&CandidateSequence> {
        let keep = self.edge_run.len().saturating_sub(2);
        self.edge_run.truncate(keep);
        let durations = std::mem::take(&mut self.edge_run);
        self.accepted = false;

        if self.first_boundary {
            self.first_boundary = false;
            debug!(len = durations.len(), ?reason, "Discarding leading sequence");
            return None;
        }

        debug!(
            len = durations.len(),
            delta = self.last_delta,
            ?reason,
            index = self.candidates.len(),
            "Candidate sequence found"
        );
        self.candidates.push(CandidateSequence {
            delta: self.last_delta,
            durations,
        });
        self.candidates.last()
    }

    fn on_timeout(&mut self, timeout_us: u32) -> FeedOutcome<'_> {
        match self.config.timeout_policy {
            TimeoutPolicy::Ignore => {
                trace!(timeout_us, "Receiver timeout ignored");
                FeedOutcome::Nothing
            }
            TimeoutPolicy::ResetSession => {
                let discarded = self.candidates.len();
                if discarded > 0 {
                    warn!(timeout_us, discarded, "Receiver timeout reset the session");
                } else {
                    debug!(timeout_us, "Receiver timeout reset the session");
                }
                self.clear();
                FeedOutcome::SessionReset { discarded }
            }
        }
    }

    /// Restart the session: drop the run, the flags and all candidates.
    pub fn clear(&mut self) {
        self.edge_run.clear();
        self.accepted = false;
        self.last_delta = 0.0;
        self.first_boundary = true;
        self.candidates.clear();
    }

    /// Extract a key template from the collected candidates.
    pub fn extract(&self, description: Option<&str>) -> Result<KeyTemplate> {
        extractor::extract(&self.candidates, description)
    }
}
