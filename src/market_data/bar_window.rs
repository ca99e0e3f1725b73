use std::collections::VecDeque;

use chrono::NaiveDate;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One period's aggregated OHLCV bar.
///
/// Bars are immutable once created.  `date` is informational: chronology is
/// defined by append order, the date only lets the window flag out-of-order
/// arrivals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// Build an undated bar.
    pub fn new(open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date: None,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Attach a calendar date to the bar.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }
}

/// Default number of bars retained by a [`BarWindow`].
pub const DEFAULT_WINDOW_CAPACITY: usize = 100;

// ---------------------------------------------------------------------------
// BarWindow -- thread-safe bounded FIFO of bars
// ---------------------------------------------------------------------------

/// Thread-safe bounded buffer holding the most recent bars, oldest first.
///
/// Appends and snapshots are serialised through a single `RwLock`, so a
/// snapshot never observes a half-admitted bar (or half-admitted batch).
pub struct BarWindow {
    bars: RwLock<VecDeque<Bar>>,
    capacity: usize,
}

impl Default for BarWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

impl BarWindow {
    /// Create a window retaining at most `capacity` bars (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bars: RwLock::new(VecDeque::with_capacity(capacity + 1)),
            capacity,
        }
    }

    /// Append a bar to the tail, evicting the oldest bar on overflow.
    pub fn append(&self, bar: Bar) {
        let mut ring = self.bars.write();
        Self::admit(&mut ring, bar, self.capacity);
    }

    /// Append a batch of bars under a single lock acquisition.
    pub fn extend<I>(&self, bars: I)
    where
        I: IntoIterator<Item = Bar>,
    {
        let mut ring = self.bars.write();
        for bar in bars {
            Self::admit(&mut ring, bar, self.capacity);
        }
    }

    fn admit(ring: &mut VecDeque<Bar>, bar: Bar, capacity: usize) {
        if let (Some(prev), Some(next)) = (ring.back().and_then(|b| b.date), bar.date) {
            if next < prev {
                warn!(previous = %prev, incoming = %next, "bar appended out of chronological order");
            }
        }
        ring.push_back(bar);
        while ring.len() > capacity {
            ring.pop_front();
        }
    }

    /// Return an owned copy of the current window, oldest first.
    pub fn snapshot(&self) -> Vec<Bar> {
        self.bars.read().iter().cloned().collect()
    }

    /// The most recently appended bar, if any.
    pub fn last(&self) -> Option<Bar> {
        self.bars.read().back().cloned()
    }

    pub fn len(&self) -> usize {
        self.bars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
