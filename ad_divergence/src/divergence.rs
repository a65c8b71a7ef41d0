//! Bullish A/D divergence: price prints a lower swing low while the
//! Accumulation/Distribution line prints a higher one, confirmed by RSI
//! crossing up through a threshold on the price pivot.
//!
//! Pivots are found with a bar-count neighbourhood, but indicator pivots are
//! paired with the price pivot by calendar-day distance. The two can land on
//! different bar offsets when the series has gaps, so the distinction is kept.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use crate::config::DivergenceConfig;
use crate::extrema::{Pivot, swing_lows};
use crate::indicators::IndicatorFrame;

/// The four pivots behind a positive detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DivergencePivots {
    /// Earlier price low.
    pub p1: Pivot,
    /// Later, lower price low. RSI confirmation is checked at its index.
    pub p2: Pivot,
    /// Earlier A/D low near `p2`.
    pub a1: Pivot,
    /// Later, higher A/D low near `p2`.
    pub a2: Pivot,
}

/// The gate a candidate failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Fewer bars than a single full pivot neighbourhood.
    InsufficientHistory,
    TooFewPricePivots,
    /// The latest price low is not strictly below the previous one.
    NoLowerLow,
    /// Fewer than two A/D pivots within `max_dist_days` of the latest price low.
    TooFewIndicatorPivots,
    /// The A/D lows near the price low are not strictly rising.
    NoHigherLow,
    /// Geometry holds but RSI did not cross the threshold upward at the price low.
    NotConfirmed,
    /// A pivot index does not address a bar of the supplied dates.
    PivotOutsideSeries,
}

/// Outcome of divergence detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DivergenceResult {
    Detected(DivergencePivots),
    Rejected { reason: Rejection },
}

impl DivergenceResult {
    pub fn detected(&self) -> bool {
        matches!(self, DivergenceResult::Detected(_))
    }

    pub fn pivots(&self) -> Option<&DivergencePivots> {
        match self {
            DivergenceResult::Detected(pivots) => Some(pivots),
            DivergenceResult::Rejected { .. } => None,
        }
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            DivergenceResult::Detected(_) => None,
            DivergenceResult::Rejected { reason } => Some(*reason),
        }
    }

    fn rejected(reason: Rejection) -> Self {
        DivergenceResult::Rejected { reason }
    }
}

/// Pair the latest two price pivots with nearby indicator pivots.
///
/// Both pivot slices must be in chronological order and index into `dates`;
/// an index past the end of `dates` is rejected as
/// [`Rejection::PivotOutsideSeries`]. A positive result here is only
/// geometric; [`detect_bullish_divergence`] adds the RSI confirmation.
pub fn match_divergence(
    price: &[Pivot],
    indicator: &[Pivot],
    dates: &[NaiveDate],
    max_dist_days: i64,
) -> DivergenceResult {
    let [.., p1, p2] = price else {
        return DivergenceResult::rejected(Rejection::TooFewPricePivots);
    };

    // strict: an equal low is a flat repeat, not a lower low
    if !(p2.value < p1.value) {
        return DivergenceResult::rejected(Rejection::NoLowerLow);
    }

    let (Some(_), Some(&anchor)) = (dates.get(p1.index), dates.get(p2.index)) else {
        return DivergenceResult::rejected(Rejection::PivotOutsideSeries);
    };
    let mut near: Vec<&Pivot> = Vec::new();
    for a in indicator {
        let Some(&date) = dates.get(a.index) else {
            return DivergenceResult::rejected(Rejection::PivotOutsideSeries);
        };
        if (date - anchor).num_days().abs() <= max_dist_days {
            near.push(a);
        }
    }

    let [.., a1, a2] = near.as_slice() else {
        return DivergenceResult::rejected(Rejection::TooFewIndicatorPivots);
    };

    if !(a2.value > a1.value) {
        return DivergenceResult::rejected(Rejection::NoHigherLow);
    }

    DivergenceResult::Detected(DivergencePivots {
        p1: *p1,
        p2: *p2,
        a1: **a1,
        a2: **a2,
    })
}

/// RSI was strictly below `threshold` on the bar before `idx` and strictly
/// above it on `idx`.
///
/// Fails when `idx` is 0 (no prior bar) or either RSI value is undefined.
pub fn confirm_momentum(rsi: &[Option<f64>], idx: usize, threshold: f64) -> bool {
    let Some(prev_idx) = idx.checked_sub(1) else {
        return false;
    };
    let prev = rsi.get(prev_idx).copied().flatten();
    let current = rsi.get(idx).copied().flatten();
    match (prev, current) {
        (Some(prev), Some(current)) => prev < threshold && current > threshold,
        _ => false,
    }
}

/// Run extrema detection, matching and confirmation over a frame.
pub fn detect_bullish_divergence(
    frame: &IndicatorFrame<'_>,
    cfg: &DivergenceConfig,
) -> DivergenceResult {
    if frame.len() < cfg.min_bars() {
        debug!(bars = frame.len(), needed = cfg.min_bars(), "too few bars for pivots");
        return DivergenceResult::rejected(Rejection::InsufficientHistory);
    }

    let lows = frame.lows();
    let price: Vec<Pivot> = swing_lows(&lows, cfg.order).collect();
    let indicator: Vec<Pivot> = swing_lows(frame.ad(), cfg.order).collect();
    let dates = frame.dates();

    let result = match match_divergence(&price, &indicator, &dates, cfg.max_dist_days) {
        DivergenceResult::Detected(pivots)
            if confirm_momentum(frame.rsi(), pivots.p2.index, cfg.rsi_threshold) =>
        {
            DivergenceResult::Detected(pivots)
        }
        DivergenceResult::Detected(_) => DivergenceResult::rejected(Rejection::NotConfirmed),
        rejected => rejected,
    };

    debug!(
        price_pivots = price.len(),
        indicator_pivots = indicator.len(),
        detected = result.detected(),
        rejection = ?result.rejection(),
        "divergence scan"
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(index: usize, value: f64) -> Pivot {
        Pivot { index, value }
    }

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        (0..n as u64).map(|d| start + chrono::Days::new(d)).collect()
    }

    #[test]
    fn equal_price_lows_are_not_a_lower_low() {
        let price = [p(10, 5.0), p(20, 5.0)];
        let indicator = [p(16, 100.0), p(20, 150.0)];
        let result = match_divergence(&price, &indicator, &dates(30), 6);
        assert!(!result.detected());
        assert_eq!(result.rejection(), Some(Rejection::NoLowerLow));
    }

    #[test]
    fn equal_indicator_lows_are_not_a_higher_low() {
        let price = [p(10, 5.0), p(20, 4.0)];
        let indicator = [p(16, 100.0), p(20, 100.0)];
        let result = match_divergence(&price, &indicator, &dates(30), 6);
        assert_eq!(result.rejection(), Some(Rejection::NoHigherLow));
    }

    #[test]
    fn lower_low_with_higher_indicator_low_matches() {
        let price = [p(3, 6.0), p(10, 5.0), p(20, 4.0)];
        let indicator = [p(2, 50.0), p(15, 100.0), p(22, 150.0)];
        let result = match_divergence(&price, &indicator, &dates(30), 6);
        let pivots = result.pivots().unwrap();
        assert_eq!(pivots.p1, p(10, 5.0));
        assert_eq!(pivots.p2, p(20, 4.0));
        assert_eq!(pivots.a1, p(15, 100.0));
        assert_eq!(pivots.a2, p(22, 150.0));
    }

    #[test]
    fn only_the_two_latest_price_pivots_count() {
        // an older, even higher low does not rescue a flat latest pair
        let price = [p(2, 9.0), p(10, 5.0), p(20, 5.0)];
        let indicator = [p(16, 100.0), p(20, 150.0)];
        let result = match_divergence(&price, &indicator, &dates(30), 6);
        assert_eq!(result.rejection(), Some(Rejection::NoLowerLow));
    }

    #[test]
    fn indicator_pivots_outside_window_are_ignored() {
        let price = [p(10, 5.0), p(20, 4.0)];
        // 13 is 7 days before 20
        let indicator = [p(13, 100.0), p(20, 150.0)];
        let result = match_divergence(&price, &indicator, &dates(30), 6);
        assert_eq!(result.rejection(), Some(Rejection::TooFewIndicatorPivots));
    }

    #[test]
    fn window_is_calendar_days_not_bars() {
        // bars 0 and 1 are adjacent in the series but 10 days apart on the calendar
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let gapped = vec![
            start,
            start + chrono::Days::new(10),
            start + chrono::Days::new(11),
            start + chrono::Days::new(12),
        ];
        let price = [p(0, 5.0), p(3, 4.0)];
        let indicator = [p(0, 100.0), p(1, 120.0), p(2, 150.0)];
        let result = match_divergence(&price, &indicator, &gapped, 6);
        let pivots = result.pivots().unwrap();
        assert_eq!(pivots.a1.index, 1);
        assert_eq!(pivots.a2.index, 2);
    }

    #[test]
    fn single_price_pivot_is_too_few() {
        let result = match_divergence(&[p(5, 1.0)], &[], &dates(10), 6);
        assert_eq!(result.rejection(), Some(Rejection::TooFewPricePivots));
    }

    #[test]
    fn pivot_past_the_dates_is_rejected_not_a_panic() {
        let price = [p(10, 5.0), p(20, 4.0)];
        let indicator = [p(16, 100.0), p(20, 150.0)];
        // price pivot beyond the supplied dates
        let result = match_divergence(&price, &indicator, &dates(15), 6);
        assert_eq!(result.rejection(), Some(Rejection::PivotOutsideSeries));
        // indicator pivot beyond the supplied dates
        let indicator = [p(16, 100.0), p(40, 150.0)];
        let result = match_divergence(&price, &indicator, &dates(30), 6);
        assert_eq!(result.rejection(), Some(Rejection::PivotOutsideSeries));
    }

    #[test]
    fn confirmation_needs_strict_upward_cross() {
        let rsi = [None, Some(35.0), Some(45.0), Some(40.0), Some(41.0)];
        assert!(confirm_momentum(&rsi, 2, 40.0));
        // from exactly 40 is not from below
        assert!(!confirm_momentum(&rsi, 4, 40.0));
        // downward
        assert!(!confirm_momentum(&rsi, 3, 40.0));
    }

    #[test]
    fn confirmation_fails_without_prior_bar_or_value() {
        let rsi = [Some(30.0), Some(50.0)];
        assert!(!confirm_momentum(&rsi, 0, 40.0));
        assert!(!confirm_momentum(&[None, Some(50.0)], 1, 40.0));
        assert!(!confirm_momentum(&rsi, 7, 40.0));
    }

    #[test]
    fn result_serializes_with_status_tag() {
        let result = DivergenceResult::rejected(Rejection::NotConfirmed);
        let json = serde_json::to_value(result).unwrap();
        assert_eq!(json["status"], "rejected");
        assert_eq!(json["reason"], "not_confirmed");
    }
}
