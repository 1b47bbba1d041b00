//! End-to-end tests: raw record bytes -> segmentation -> key extraction.

use std::io::Cursor;
use std::path::Path;

use rfctl_analysis::{
    extractor, quantize, AnalysisError, CaptureSession, FeedOutcome, SessionConfig, TimeoutPolicy,
};
use rfctl_keys::parse_key_content;
use rfctl_lirc::{Record, RecordReader};

const SHORT_JITTER: [u32; 5] = [490, 500, 510, 505, 495];
const LONG_JITTER: [u32; 5] = [1480, 1500, 1520, 1510, 1490];

/// One button press: 15 pulses separated by 14 spaces, closed by a long gap.
fn burst(pulse: impl Fn(usize) -> u32, space: impl Fn(usize) -> u32) -> Vec<Record> {
    let mut records = Vec::new();
    for i in 0..15 {
        records.push(Record::Pulse(pulse(i)));
        if i < 14 {
            records.push(Record::Space(space(i)));
        }
    }
    records.push(Record::Space(25_000));
    records
}

fn clean_burst() -> Vec<Record> {
    burst(|_| 500, |_| 1500)
}

fn jittered_burst(offset: usize) -> Vec<Record> {
    burst(
        |i| SHORT_JITTER[(i + offset) % SHORT_JITTER.len()],
        |i| LONG_JITTER[(i + offset) % LONG_JITTER.len()],
    )
}

fn to_bytes(records: &[Record]) -> Vec<u8> {
    records.iter().flat_map(|r| r.to_bytes()).collect()
}

/// Decode a byte stream and feed it to a session, counting new candidates.
fn run(session: &mut CaptureSession, bytes: Vec<u8>) -> usize {
    let mut found = 0;
    for record in RecordReader::new(Cursor::new(bytes)) {
        if let FeedOutcome::Candidate(_) = session.feed(record.unwrap()) {
            found += 1;
        }
    }
    found
}

#[test]
fn test_clean_stream_yields_one_candidate() {
    let mut records = clean_burst();
    records.extend(clean_burst());

    let mut session = CaptureSession::default();
    let found = run(&mut session, to_bytes(&records));

    assert_eq!(found, 1);
    assert_eq!(session.candidate_count(), 1);

    let quantized = quantize(&session.candidates()[0].durations).unwrap();
    assert!(quantized.iter().all(|d| *d == 500 || *d == 1500));
    assert_eq!(quantized.iter().filter(|d| **d == 500).count(), 14);
}

#[test]
fn test_extract_render_parse_round_trip() {
    let mut records = Vec::new();
    for offset in 0..4 {
        records.extend(jittered_burst(offset));
    }

    let mut session = CaptureSession::default();
    run(&mut session, to_bytes(&records));
    assert_eq!(session.candidate_count(), 3);

    let chosen = extractor::select(session.candidates()).unwrap();
    let expected = quantize(&chosen.durations).unwrap();
    let template = session.extract(Some("Living room fan")).unwrap();
    assert_eq!(template.durations(), expected);

    let parsed = parse_key_content(&template.render(), Path::new("fan.key")).unwrap();
    assert_eq!(parsed.samples, template.samples);
    assert_eq!(
        parsed.samples.iter().map(|s| s.duration).collect::<Vec<_>>(),
        expected
    );
    assert_eq!(parsed.description.as_deref(), Some("Living room fan"));

    // Two timing levels, each within the jitter band.
    let mut levels = expected.clone();
    levels.sort_unstable();
    levels.dedup();
    assert_eq!(levels.len(), 2);
    assert!((490..=510).contains(&levels[0]));
    assert!((1480..=1520).contains(&levels[1]));
}

#[test]
fn test_timeout_before_extraction_loses_burst() {
    let mut records = clean_burst();
    records.extend(clean_burst());
    records.push(Record::Timeout(120_000));

    let mut session = CaptureSession::default();
    run(&mut session, to_bytes(&records));

    assert!(matches!(
        session.extract(None),
        Err(AnalysisError::NoCandidates)
    ));

    let mut session = CaptureSession::new(SessionConfig {
        timeout_policy: TimeoutPolicy::Ignore,
        ..Default::default()
    });
    run(&mut session, to_bytes(&records));

    let template = session.extract(None).unwrap();
    assert_eq!(template.len(), 28);
}
