/// Default minimum edge run length before classification starts.
pub const DEFAULT_MIN_SAMPLE_LEN: usize = 15;

/// Maximum ratio between the longest and shortest duration of a run.
pub const MAX_RANGE: f64 = 7.0;

/// Ratio between consecutive quintile cuts that marks a new timing level.
pub const LEVEL_JUMP: f64 = 1.07;

/// Allowed overshoot of the extreme durations past the outer quintile cuts.
pub const PEAK_MARGIN: f64 = 0.1;

/// Quantile counts used by the classifier and extractor.
pub const QUINTILES: usize = 5;
pub const TERTILES: usize = 3;
pub const QUARTILES: usize = 4;
