//! Edge samples and raw record decoding.

use std::fmt;

use crate::{LircError, Result, MODE_MASK, MODE_PULSE, MODE_SPACE, MODE_TIMEOUT, VALUE_MASK};

/// Signal level of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Low level.
    Space,
    /// High level.
    Pulse,
}

impl Level {
    pub fn is_pulse(self) -> bool {
        matches!(self, Level::Pulse)
    }

    /// Level for the `index`-th edge of a sequence that starts with a pulse.
    pub fn alternating(index: usize) -> Self {
        if index % 2 == 0 {
            Level::Pulse
        } else {
            Level::Space
        }
    }

    /// Character used for this level in key files and dumps.
    pub fn as_char(self) -> char {
        match self {
            Level::Pulse => '1',
            Level::Space => '0',
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::Pulse
        } else {
            Level::Space
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One signal edge: a level held for `duration` microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Sample {
    pub level: Level,
    pub duration: u32,
}

impl Sample {
    pub fn new(level: Level, duration: u32) -> Self {
        Self { level, duration }
    }

    pub fn pulse(duration: u32) -> Self {
        Self::new(Level::Pulse, duration)
    }

    pub fn space(duration: u32) -> Self {
        Self::new(Level::Space, duration)
    }
}

/// One decoded hardware word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    Space(u32),
    Pulse(u32),
    /// Receiver timeout; carries the timeout length in microseconds.
    Timeout(u32),
}

impl Record {
    /// Decode a raw 32-bit word.
    pub fn decode(word: u32) -> Result<Self> {
        let value = word & VALUE_MASK;
        match word & MODE_MASK {
            MODE_SPACE => Ok(Record::Space(value)),
            MODE_PULSE => Ok(Record::Pulse(value)),
            MODE_TIMEOUT => Ok(Record::Timeout(value)),
            other => Err(LircError::UnknownMode {
                mode: (other >> 24) as u8,
                word,
            }),
        }
    }

    /// Decode a record from its native-endian wire bytes.
    pub fn from_bytes(bytes: [u8; 4]) -> Result<Self> {
        Self::decode(u32::from_ne_bytes(bytes))
    }

    /// Encode back to a raw word. Durations are truncated to 24 bits.
    pub fn encode(self) -> u32 {
        match self {
            Record::Space(d) => MODE_SPACE | (d & VALUE_MASK),
            Record::Pulse(d) => MODE_PULSE | (d & VALUE_MASK),
            Record::Timeout(d) => MODE_TIMEOUT | (d & VALUE_MASK),
        }
    }

    pub fn to_bytes(self) -> [u8; 4] {
        self.encode().to_ne_bytes()
    }

    /// The duration (or timeout length) carried by the record.
    pub fn value(self) -> u32 {
        match self {
            Record::Space(d) | Record::Pulse(d) | Record::Timeout(d) => d,
        }
    }

    /// The edge sample, or `None` for a timeout marker.
    pub fn sample(self) -> Option<Sample> {
        match self {
            Record::Space(d) => Some(Sample::space(d)),
            Record::Pulse(d) => Some(Sample::pulse(d)),
            Record::Timeout(_) => None,
        }
    }

    pub fn is_timeout(self) -> bool {
        matches!(self, Record::Timeout(_))
    }
}

impl From<Sample> for Record {
    fn from(sample: Sample) -> Self {
        match sample.level {
            Level::Pulse => Record::Pulse(sample.duration),
            Level::Space => Record::Space(sample.duration),
        }
    }
}
