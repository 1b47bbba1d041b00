//! Pull-based record reader.

use std::io::{ErrorKind, Read};

use crate::{LircError, Record, Result, RECORD_SIZE};

/// Reads 4-byte records from a device, file or pipe.
///
/// Each `next()` blocks on the underlying reader until a full record is
/// available. A clean end of stream ends the iteration; a partial trailing
/// record is reported as `LircError::Truncated`, after which the iteration
/// ends.
pub struct RecordReader<R> {
    inner: R,
    records_read: u64,
    finished: bool,
}

impl<R: Read> RecordReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            records_read: 0,
            finished: false,
        }
    }

    /// Number of records decoded so far (including malformed ones).
    pub fn records_read(&self) -> u64 {
        self.records_read
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    /// Read the raw bytes of the next record.
    ///
    /// Returns `Ok(None)` at a clean end of stream.
    pub fn read_raw(&mut self) -> Result<Option<[u8; RECORD_SIZE]>> {
        let mut buf = [0u8; RECORD_SIZE];
        let mut filled = 0;
        while filled < RECORD_SIZE {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(LircError::Io(e)),
            }
        }

        match filled {
            0 => Ok(None),
            RECORD_SIZE => {
                self.records_read += 1;
                Ok(Some(buf))
            }
            got => Err(LircError::Truncated { got }),
        }
    }

    /// Read and decode the next record.
    pub fn read_record(&mut self) -> Result<Option<Record>> {
        match self.read_raw()? {
            Some(bytes) => Record::from_bytes(bytes).map(Some),
            None => Ok(None),
        }
    }
}

impl<R: Read> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                if !matches!(e, LircError::UnknownMode { .. }) {
                    self.finished = true;
                }
                tracing::debug!(error = %e, records = self.records_read, "Record stream error");
                Some(Err(e))
            }
        }
    }
}
