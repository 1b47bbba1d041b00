//! Key extraction: choose the most representative candidate of a session
//! and snap it to its two timing levels.

use rfctl_keys::KeyTemplate;
use tracing::debug;

use crate::classifier::quantize;
use crate::constants::QUARTILES;
use crate::session::CandidateSequence;
use crate::stats::quantiles;
use crate::{AnalysisError, Result};

/// Robust estimate of the full (untruncated) sequence length: the highest
/// quartile cut over all candidate lengths.
pub fn target_len(candidates: &[CandidateSequence]) -> Option<usize> {
    let cuts = quantiles(candidates.iter().map(|c| c.len() as f64), QUARTILES)?;
    let highest = cuts.into_iter().fold(f64::MIN, f64::max);
    Some(highest.floor() as usize)
}

/// Pick the candidate closest to (and not shorter than) the target length,
/// preferring the lowest delta, then the earliest.
pub fn select(candidates: &[CandidateSequence]) -> Result<&CandidateSequence> {
    let target = target_len(candidates).ok_or(AnalysisError::NoCandidates)?;

    let chosen = candidates
        .iter()
        .filter(|c| c.len() >= target)
        .min_by(|a, b| {
            (a.len() - target)
                .cmp(&(b.len() - target))
                .then(a.delta.total_cmp(&b.delta))
        })
        .ok_or(AnalysisError::NoCandidates)?;

    debug!(
        candidates = candidates.len(),
        target,
        len = chosen.len(),
        delta = chosen.delta,
        "Selected candidate"
    );
    Ok(chosen)
}

/// Extract a canonical key template from a session's candidates.
pub fn extract(candidates: &[CandidateSequence], description: Option<&str>) -> Result<KeyTemplate> {
    let chosen = select(candidates)?;
    let quantized = quantize(&chosen.durations).ok_or(AnalysisError::Degenerate {
        len: chosen.len(),
    })?;
    Ok(KeyTemplate::from_durations(&quantized, chosen.delta, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(len: usize, delta: f64) -> CandidateSequence {
        CandidateSequence {
            delta,
            durations: (0..len)
                .map(|i| if i % 2 == 0 { 500 } else { 1500 })
                .collect(),
        }
    }

    #[test]
    fn test_empty_candidates_fail() {
        assert!(matches!(extract(&[], None), Err(AnalysisError::NoCandidates)));
        assert_eq!(target_len(&[]), None);
    }

    #[test]
    fn test_target_len_is_highest_quartile() {
        let candidates = [candidate(20, 0.1), candidate(22, 0.1), candidate(22, 0.1)];
        assert_eq!(target_len(&candidates), Some(22));

        let candidates = [candidate(10, 0.1), candidate(20, 0.1)];
        // quartiles of [10, 20]: 12.5, 15, 17.5
        assert_eq!(target_len(&candidates), Some(17));
    }

    #[test]
    fn test_tie_on_length_broken_by_delta() {
        let candidates = [candidate(20, 0.01), candidate(22, 0.08), candidate(22, 0.03)];
        let chosen = select(&candidates).unwrap();
        assert_eq!(chosen.len(), 22);
        assert_eq!(chosen.delta, 0.03);
    }

    #[test]
    fn test_shorter_candidates_excluded() {
        // target 17: the 10-edge candidate is excluded despite its low delta
        let candidates = [candidate(10, 0.0), candidate(20, 0.2)];
        assert_eq!(select(&candidates).unwrap().len(), 20);
    }

    #[test]
    fn test_closest_length_wins_over_delta() {
        let candidates = [
            candidate(22, 0.09),
            candidate(22, 0.09),
            candidate(22, 0.09),
            candidate(26, 0.01),
        ];
        // target 23 (quartiles of [22, 22, 22, 26]: 22, 22, 23)
        let chosen = select(&candidates).unwrap();
        assert_eq!(chosen.len(), 26);

        let candidates = [candidate(22, 0.09), candidate(24, 0.01), candidate(22, 0.05)];
        // target 23: only the 24-edge candidate reaches it
        assert_eq!(select(&candidates).unwrap().delta, 0.01);
    }

    #[test]
    fn test_equal_candidates_pick_earliest() {
        let mut first = candidate(16, 0.05);
        first.durations[0] = 510;
        let candidates = [first.clone(), candidate(16, 0.05)];
        assert_eq!(select(&candidates).unwrap(), &first);
    }

    #[test]
    fn test_extract_quantizes() {
        let mut jittered = candidate(16, 0.04);
        jittered.durations[0] = 480;
        jittered.durations[2] = 520;
        jittered.durations[3] = 1450;
        jittered.durations[5] = 1550;

        let template = extract(&[jittered], Some("Fan")).unwrap();

        assert_eq!(template.len(), 16);
        assert_eq!(template.delta, 0.04);
        assert_eq!(template.description.as_deref(), Some("Fan"));
        assert!(template
            .durations()
            .iter()
            .enumerate()
            .all(|(i, d)| *d == if i % 2 == 0 { 500 } else { 1500 }));
    }

    #[test]
    fn test_degenerate_candidate() {
        let broken = CandidateSequence {
            delta: 0.0,
            durations: vec![500, 0, 500, 1500],
        };
        assert!(matches!(
            extract(&[broken], None),
            Err(AnalysisError::Degenerate { len: 4 })
        ));
    }
}
