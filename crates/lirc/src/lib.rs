//! LIRC mode2 record codec.
//!
//! A receiver device emits one 4-byte word per signal edge. The top byte
//! carries the mode (space, pulse or timeout), the low 24 bits carry the
//! duration in microseconds.
//!
//! This crate provides:
//! - `Level` / `Sample`: the edge model shared by the analysis and detection crates
//! - `Record`: one decoded hardware word
//! - `RecordReader`: a pull-based reader over any `std::io::Read`
//! - `Timeline`: start/end time window filtering over a record stream

mod reader;
mod record;
mod timeline;

pub use reader::RecordReader;
pub use record::{Level, Record, Sample};
pub use timeline::{Timeline, TimelineStep};

/// Mask selecting the duration bits of a raw word.
pub const VALUE_MASK: u32 = 0x00FF_FFFF;

/// Mask selecting the mode byte of a raw word.
pub const MODE_MASK: u32 = 0xFF00_0000;

pub const MODE_SPACE: u32 = 0x0000_0000;
pub const MODE_PULSE: u32 = 0x0100_0000;
pub const MODE_TIMEOUT: u32 = 0x0300_0000;

/// Size of one record on the wire.
pub const RECORD_SIZE: usize = 4;

#[derive(Debug, thiserror::Error)]
pub enum LircError {
    #[error("unknown record mode 0x{mode:02x} in word 0x{word:08x}")]
    UnknownMode { mode: u8, word: u32 },
    #[error("stream ended inside a record ({got} of {RECORD_SIZE} bytes)")]
    Truncated { got: usize },
    #[error("read error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, LircError>;
