pub mod analyze;
pub mod detect;
pub mod dump;
pub mod keys;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use anyhow::{Context, Result};
use rfctl_lirc::{LircError, Record, RecordReader};
use tracing::{info, warn};

/// Open a device or capture file for reading; `-` reads stdin.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path.as_os_str() == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    info!(path = %path.display(), "Reading records");
    Ok(Box::new(file))
}

/// Next decodable record. Unknown modes are skipped, a truncated tail ends
/// the stream, I/O errors are returned.
pub fn next_record<R: Read>(reader: &mut RecordReader<R>) -> Result<Option<Record>> {
    loop {
        match reader.read_record() {
            Ok(record) => return Ok(record),
            Err(e @ LircError::UnknownMode { .. }) => {
                warn!(error = %e, record = reader.records_read(), "Skipping malformed record");
            }
            Err(e @ LircError::Truncated { .. }) => {
                warn!(error = %e, "Ignoring partial trailing record");
                return Ok(None);
            }
            Err(e) => return Err(e).context("reading records"),
        }
    }
}

/// A closed downstream pipe ends output normally.
pub fn ignore_broken_pipe(result: Result<()>) -> Result<()> {
    match result {
        Err(e)
            if e.downcast_ref::<io::Error>()
                .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe) =>
        {
            Ok(())
        }
        other => other,
    }
}
