//! Bi-timed signal analysis.
//!
//! Turns a noisy stream of LIRC edge durations into canonical key templates:
//! - `stats`: quantile cut points (inclusive interpolation)
//! - `classifier`: decides whether a run fits a two-level timing model
//! - `session`: online segmentation of the edge stream into candidate sequences
//! - `extractor`: picks the best candidate and quantizes it into a `KeyTemplate`
//!
//! # Example
//!
//! ```ignore
//! use rfctl_analysis::{CaptureSession, SessionConfig};
//! use rfctl_lirc::RecordReader;
//!
//! let mut session = CaptureSession::new(SessionConfig::default());
//! for record in RecordReader::new(std::io::stdin().lock()) {
//!     session.feed(record?);
//! }
//! println!("{}", session.extract(Some("TV power"))?.render());
//! ```

pub mod classifier;
pub mod constants;
pub mod extractor;
pub mod session;
pub mod stats;

pub use classifier::{
    classify, quantize, BiTimedClusters, Classification, ClassifierConfig, Cluster, RejectReason,
};
pub use extractor::extract;
pub use session::{CandidateSequence, CaptureSession, FeedOutcome, SessionConfig, TimeoutPolicy};
pub use stats::quantiles;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("no candidate sequences to extract a key from")]
    NoCandidates,
    #[error("candidate of {len} edges cannot be split into two timing levels")]
    Degenerate { len: usize },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
