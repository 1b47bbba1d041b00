//! Bi-timed classifier.
//!
//! Decides whether a run of edge durations fits a two-level (short/long)
//! timing model, as produced by a binary pulse-width or pulse-distance code.

use serde::{Deserialize, Serialize};

use crate::constants::{LEVEL_JUMP, MAX_RANGE, PEAK_MARGIN, QUINTILES, TERTILES};
use crate::stats::quantiles;

/// Classifier thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum `max / min` duration ratio of a run.
    pub max_range: f64,
    /// Ratio between quintile cuts that counts as a new timing level.
    pub level_jump: f64,
    /// Allowed overshoot of min/max past the outer quintile cuts.
    pub peak_margin: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            max_range: MAX_RANGE,
            level_jump: LEVEL_JUMP,
            peak_margin: PEAK_MARGIN,
        }
    }
}

/// Why a run was rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RejectReason {
    /// Fewer than two durations, or a zero duration.
    Degenerate,
    /// Longest and shortest durations are too far apart.
    Range { ratio: f64 },
    /// Not exactly two timing levels.
    Levels { count: usize },
    /// A single extreme duration sticks out of the distribution.
    Peak,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Classification {
    /// The run is bi-timed; `delta` is its quality metric (lower is tighter).
    Accept { delta: f64 },
    Reject(RejectReason),
}

impl Classification {
    pub fn is_accept(&self) -> bool {
        matches!(self, Classification::Accept { .. })
    }

    pub fn delta(&self) -> Option<f64> {
        match self {
            Classification::Accept { delta } => Some(*delta),
            Classification::Reject(_) => None,
        }
    }
}

/// Classify a run of durations.
pub fn classify(durations: &[u32], config: &ClassifierConfig) -> Classification {
    use Classification::Reject;

    let (Some(&min), Some(&max)) = (durations.iter().min(), durations.iter().max()) else {
        return Reject(RejectReason::Degenerate);
    };
    if durations.len() < 2 || min == 0 {
        return Reject(RejectReason::Degenerate);
    }
    let (min, max) = (f64::from(min), f64::from(max));

    // Range gate
    let ratio = max / min;
    if ratio > config.max_range {
        return Reject(RejectReason::Range { ratio });
    }

    // Level-count gate: exactly one jump between quintile cuts
    let Some(cuts) = quantiles(durations.iter().map(|&d| f64::from(d)), QUINTILES) else {
        return Reject(RejectReason::Degenerate);
    };
    let mut level = cuts[0];
    let mut jumps = 0;
    for &cut in &cuts[1..] {
        if cut / level > config.level_jump {
            jumps += 1;
            if jumps > 1 {
                break;
            }
            level = cut;
        }
    }
    if jumps != 1 {
        return Reject(RejectReason::Levels { count: jumps + 1 });
    }

    // Peak gate
    let (first, last) = (cuts[0], cuts[cuts.len() - 1]);
    if min < first * (1.0 - config.peak_margin) || max > last * (1.0 + config.peak_margin) {
        return Reject(RejectReason::Peak);
    }

    match BiTimedClusters::split(durations) {
        Some(clusters) => Classification::Accept {
            delta: clusters.delta(),
        },
        None => Reject(RejectReason::Degenerate),
    }
}

/// Which of the two timing clusters a duration belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cluster {
    Short,
    Long,
}

/// A run split into short and long timing clusters.
///
/// Cluster centers are the tertile cuts of the run; each duration joins the
/// center it is relatively closest to (`|1 - d / center|`), ties going to
/// the long cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct BiTimedClusters {
    pub short_center: f64,
    pub long_center: f64,
    pub short: Vec<u32>,
    pub long: Vec<u32>,
    assignments: Vec<Cluster>,
}

impl BiTimedClusters {
    /// Returns `None` for empty input or any zero duration.
    pub fn split(durations: &[u32]) -> Option<Self> {
        if durations.contains(&0) {
            return None;
        }
        let cuts = quantiles(durations.iter().map(|&d| f64::from(d)), TERTILES)?;
        let (short_center, long_center) = (cuts[0], cuts[1]);

        let mut clusters = Self {
            short_center,
            long_center,
            short: Vec::new(),
            long: Vec::new(),
            assignments: Vec::with_capacity(durations.len()),
        };
        for &d in durations {
            let x = f64::from(d);
            if (1.0 - x / short_center).abs() < (1.0 - x / long_center).abs() {
                clusters.short.push(d);
                clusters.assignments.push(Cluster::Short);
            } else {
                clusters.long.push(d);
                clusters.assignments.push(Cluster::Long);
            }
        }
        Some(clusters)
    }

    pub fn center(&self, cluster: Cluster) -> f64 {
        match cluster {
            Cluster::Short => self.short_center,
            Cluster::Long => self.long_center,
        }
    }

    /// Cluster of each input duration, in input order.
    pub fn assignments(&self) -> &[Cluster] {
        &self.assignments
    }

    /// Worst relative spread (`(max - min) / center`) of the two clusters.
    pub fn delta(&self) -> f64 {
        let short = spread(&self.short) / self.short_center;
        let long = spread(&self.long) / self.long_center;
        short.max(long)
    }

    /// The input with every duration replaced by its cluster center,
    /// rounded to whole microseconds.
    ///
    /// Idempotent when both tertile cuts land on a level. In a run dominated
    /// by short durations the upper cut can fall between the levels, and the
    /// long center is then an interpolated value that moves on every pass.
    pub fn quantized(&self) -> Vec<u32> {
        self.assignments
            .iter()
            .map(|&c| self.center(c).round() as u32)
            .collect()
    }
}

/// Snap every duration to its cluster center. `None` for degenerate input.
pub fn quantize(durations: &[u32]) -> Option<Vec<u32>> {
    BiTimedClusters::split(durations).map(|c| c.quantized())
}

fn spread(values: &[u32]) -> f64 {
    match (values.iter().min(), values.iter().max()) {
        (Some(&min), Some(&max)) => f64::from(max - min),
        _ => 0.0,
    }
}
