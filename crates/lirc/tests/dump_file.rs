//! Integration tests reading binary dump files from disk.

use std::fs::File;
use std::io::Write;

use rfctl_lirc::{LircError, Record, RecordReader, Timeline, TimelineStep};
use tempfile::NamedTempFile;

fn write_dump(records: &[Record]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    for record in records {
        file.write_all(&record.to_bytes()).unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn test_read_dump_file() {
    let records = vec![
        Record::Pulse(9000),
        Record::Space(4500),
        Record::Pulse(560),
        Record::Space(1690),
        Record::Timeout(125_000),
    ];
    let dump = write_dump(&records);

    let reader = RecordReader::new(File::open(dump.path()).unwrap());
    let decoded: Result<Vec<Record>, LircError> = reader.collect();

    assert_eq!(decoded.unwrap(), records);
}

#[test]
fn test_timeline_over_dump_file() {
    let dump = write_dump(&[
        Record::Pulse(1000),
        Record::Timeout(50_000),
        Record::Space(1000),
        Record::Pulse(1000),
        Record::Space(1000),
        Record::Pulse(1000),
    ]);

    let mut timeline = Timeline::new(Some(1000), Some(2500));
    let mut emitted = Vec::new();
    for record in RecordReader::new(File::open(dump.path()).unwrap()) {
        let record = record.unwrap();
        let Some(sample) = record.sample() else {
            continue;
        };
        match timeline.advance(sample.duration) {
            TimelineStep::Emit { at } | TimelineStep::Last { at } => emitted.push((at, sample)),
            TimelineStep::Skip => {}
            TimelineStep::Done => break,
        }
    }

    let stamps: Vec<u64> = emitted.iter().map(|(at, _)| *at).collect();
    assert_eq!(stamps, vec![0, 1000, 2000]);
    assert!(emitted[0].1.level == rfctl_lirc::Level::Space);
}
