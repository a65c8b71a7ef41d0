//! Inclusive calendar window used to request part of a symbol's history.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// `start..=end`, either side open when `None`.
///
/// The default range is unbounded and selects the full history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Everything up to and including `end`: the history visible on an evaluation date.
    pub fn until(end: NaiveDate) -> Self {
        Self {
            start: None,
            end: Some(end),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// `start` falls after `end`, so nothing can match.
    pub fn is_inverted(&self) -> bool {
        matches!((self.start, self.end), (Some(s), Some(e)) if s > e)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| s <= date) && self.end.is_none_or(|e| date <= e)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.start {
            Some(s) => write!(f, "{s}..=")?,
            None => f.write_str("..=")?,
        }
        match self.end {
            Some(e) => write!(f, "{e}"),
            None => f.write_str("latest"),
        }
    }
}
