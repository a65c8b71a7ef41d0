//! Canonical in-memory representation of a daily bar (OHLCV).
//!
//! This struct is the standard output of every [`DataProvider`](crate::providers::DataProvider)
//! implementation, regardless of where the data came from (CSV export, broker feed, tests).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::DateRange;

/// A single trading interval for one instrument.
///
/// Prices are kept as `f64` exactly as the source delivered them. Nothing here
/// enforces finiteness or ordering; the scoring engine validates a whole
/// series before it derives anything from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Calendar date of the session.
    pub date: NaiveDate,

    /// Opening price.
    pub open: f64,

    /// Highest price during the session.
    pub high: f64,

    /// Lowest price during the session.
    pub low: f64,

    /// Closing price.
    pub close: f64,

    /// Shares traded during the session.
    pub volume: u64,
}

impl Bar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }
}

/// A complete, date-ascending set of bars for a single symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    /// The symbol this data represents (e.g., "AAPL").
    pub symbol: String,
    /// The bars, oldest first.
    pub bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Self {
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// The most recent bar, if any.
    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// A copy of the series restricted to its first `n` bars.
    ///
    /// Used to evaluate the series "as of" an earlier date. `n` larger than the
    /// series length returns the whole series.
    pub fn truncated(&self, n: usize) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self.bars[..n.min(self.bars.len())].to_vec(),
        }
    }

    /// A copy keeping only the bars dated inside `range`, order unchanged.
    pub fn within(&self, range: &DateRange) -> Self {
        Self {
            symbol: self.symbol.clone(),
            bars: self
                .bars
                .iter()
                .filter(|bar| range.contains(bar.date))
                .cloned()
                .collect(),
        }
    }
}
