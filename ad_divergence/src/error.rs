use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Which price column of a bar failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceField {
    High,
    Low,
    Close,
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PriceField::High => "high",
            PriceField::Low => "low",
            PriceField::Close => "close",
        };
        f.write_str(name)
    }
}

/// The input series is malformed. Fatal for that instrument only; callers skip it
/// and move on, there is nothing to retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataQualityError {
    /// No bars at all.
    #[error("series is empty")]
    EmptySeries,

    /// A price needed by the indicators is missing, non-finite or not positive.
    #[error("bar {index}: {field} is missing or invalid ({value})")]
    InvalidPrice {
        index: usize,
        field: PriceField,
        value: f64,
    },

    /// `high` is below `low`.
    #[error("bar {index}: high {high} is below low {low}")]
    InvertedRange { index: usize, high: f64, low: f64 },

    /// A date does not strictly follow its predecessor (out of order or duplicated).
    #[error("bar {index}: date {date} does not follow {previous}")]
    UnorderedDates {
        index: usize,
        previous: NaiveDate,
        date: NaiveDate,
    },
}

/// The unified error type for the scoring engine.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// The series failed validation.
    #[error("data quality: {0}")]
    DataQuality(#[from] DataQualityError),

    /// A precomputed indicator column does not line up with the bars.
    #[error("column {column} has {actual} values, expected {expected}")]
    ColumnLength {
        column: &'static str,
        expected: usize,
        actual: usize,
    },
}
