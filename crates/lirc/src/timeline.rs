//! Time window filtering over a record stream.
//!
//! The timeline position is the sum of all pulse and space durations seen so
//! far. Timeout markers do not advance it.

/// Outcome of placing one edge on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineStep {
    /// Before the window start; the edge is dropped.
    Skip,
    /// Inside the window; `at` is relative to the window start.
    Emit { at: u64 },
    /// The edge reaching the window end. Nothing follows it.
    Last { at: u64 },
    /// The window has already been closed.
    Done,
}

impl TimelineStep {
    /// Relative timestamp of an emitted edge.
    pub fn at(self) -> Option<u64> {
        match self {
            TimelineStep::Emit { at } | TimelineStep::Last { at } => Some(at),
            TimelineStep::Skip | TimelineStep::Done => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Timeline {
    start_us: Option<u64>,
    end_us: Option<u64>,
    position_us: u64,
    closed: bool,
}

impl Timeline {
    pub fn new(start_us: Option<u64>, end_us: Option<u64>) -> Self {
        Self {
            start_us,
            end_us,
            position_us: 0,
            closed: false,
        }
    }

    /// A timeline without a window: every edge is emitted.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Absolute position in microseconds since the first edge.
    pub fn position_us(&self) -> u64 {
        self.position_us
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Place an edge of `duration` microseconds on the timeline.
    pub fn advance(&mut self, duration: u32) -> TimelineStep {
        if self.closed {
            return TimelineStep::Done;
        }

        let start = self.start_us.unwrap_or(0);
        if self.position_us < start {
            self.position_us += u64::from(duration);
            return TimelineStep::Skip;
        }

        let at = self.position_us - start;
        let reached_end = self.end_us.is_some_and(|end| self.position_us >= end);
        self.position_us += u64::from(duration);

        if reached_end {
            self.closed = true;
            TimelineStep::Last { at }
        } else {
            TimelineStep::Emit { at }
        }
    }
}
