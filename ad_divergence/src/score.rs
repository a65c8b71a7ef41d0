//! Composite score: four boolean gates evaluated at the latest bar.

use chrono::NaiveDate;
use market_data::models::BarSeries;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::{MomentumBand, ScoringConfig};
use crate::divergence::{DivergenceResult, detect_bullish_divergence};
use crate::error::{DataQualityError, ScoreError};
use crate::indicators::{IndicatorFrame, build_indicators};

pub const DIVERGENCE_POINTS: u8 = 40;
/// `close > ema_fast > ema_slow`.
pub const TREND_STACK_POINTS: u8 = 30;
/// `ema_fast > ema_slow`, awarded independently of the trend stack.
pub const EMA_ORDER_POINTS: u8 = 10;
pub const NEUTRAL_RSI_POINTS: u8 = 20;

/// Every value [`ScoreBreakdown::total`] can produce, ascending.
///
/// The 16 gate combinations collapse to these 11 sums.
pub const ALL_POSSIBLE_SCORES: [u8; 11] = [0, 10, 20, 30, 40, 50, 60, 70, 80, 90, 100];

/// Which gates passed.
///
/// `trend_stack` implies `ema_order`, so the two together are worth 40. They are
/// kept as separate fields so a report shows each check on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ScoreBreakdown {
    pub divergence: bool,
    pub trend_stack: bool,
    pub ema_order: bool,
    pub neutral_rsi: bool,
}

impl ScoreBreakdown {
    pub fn total(&self) -> u8 {
        [
            (self.divergence, DIVERGENCE_POINTS),
            (self.trend_stack, TREND_STACK_POINTS),
            (self.ema_order, EMA_ORDER_POINTS),
            (self.neutral_rsi, NEUTRAL_RSI_POINTS),
        ]
        .iter()
        .filter(|(passed, _)| *passed)
        .map(|(_, points)| points)
        .sum()
    }
}

/// Score of one instrument on its latest bar, with the detail behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    pub symbol: String,
    /// Date of the latest bar.
    pub as_of: NaiveDate,
    pub score: u8,
    pub breakdown: ScoreBreakdown,
    pub divergence: DivergenceResult,
}

/// Evaluate the trend and momentum gates at the last bar of `frame`.
///
/// A gate whose inputs are undefined (empty frame, RSI still warming up) simply
/// does not pass.
pub fn score_frame(
    frame: &IndicatorFrame<'_>,
    divergence: bool,
    band: &MomentumBand,
) -> ScoreBreakdown {
    let Some(last) = frame.len().checked_sub(1) else {
        return ScoreBreakdown {
            divergence,
            ..ScoreBreakdown::default()
        };
    };

    let close = frame.bars()[last].close;
    let fast = frame.ema_fast()[last];
    let slow = frame.ema_slow()[last];

    ScoreBreakdown {
        divergence,
        trend_stack: close > fast && fast > slow,
        ema_order: fast > slow,
        neutral_rsi: frame.rsi()[last].is_some_and(|rsi| band.contains(rsi)),
    }
}

/// Score a frame end to end: divergence detection, then the remaining gates.
pub fn score_indicators(
    frame: &IndicatorFrame<'_>,
    cfg: &ScoringConfig,
) -> (ScoreBreakdown, DivergenceResult) {
    let divergence = detect_bullish_divergence(frame, &cfg.divergence);
    let breakdown = score_frame(frame, divergence.detected(), &cfg.momentum_band);
    (breakdown, divergence)
}

/// Score one series.
///
/// Pure: nothing is retained between calls, and identical input gives an
/// identical report. Too little history lowers the score but is never an error.
///
/// Errors:
/// - [`ScoreError::DataQuality`] when the series fails validation.
#[instrument(skip_all, fields(symbol = %series.symbol, bars = series.len()))]
pub fn score_series(series: &BarSeries, cfg: &ScoringConfig) -> Result<ScoreReport, ScoreError> {
    let frame = build_indicators(series, &cfg.indicators)?;
    let as_of = frame
        .bars()
        .last()
        .map(|bar| bar.date)
        .ok_or(DataQualityError::EmptySeries)?;

    let (breakdown, divergence) = score_indicators(&frame, cfg);
    let score = breakdown.total();
    debug!(score, ?breakdown, "scored");

    Ok(ScoreReport {
        symbol: series.symbol.clone(),
        as_of,
        score,
        breakdown,
        divergence,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use market_data::models::Bar;

    use super::*;

    fn frame_with<'a>(
        bars: &'a [Bar],
        fast: f64,
        slow: f64,
        rsi: Option<f64>,
    ) -> IndicatorFrame<'a> {
        let n = bars.len();
        IndicatorFrame::from_columns(
            bars,
            vec![fast; n],
            vec![slow; n],
            vec![rsi; n],
            vec![0.0; n],
        )
        .unwrap()
    }

    fn bars(close: f64, n: usize) -> Vec<Bar> {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        (0..n as u64)
            .map(|i| {
                Bar::new(
                    start + chrono::Days::new(i),
                    close,
                    close + 1.0,
                    close - 1.0,
                    close,
                    100,
                )
            })
            .collect()
    }

    #[test]
    fn subset_sums_collapse_to_eleven() {
        let sums: BTreeSet<u8> = (0u8..16)
            .map(|mask| {
                ScoreBreakdown {
                    divergence: mask & 1 != 0,
                    trend_stack: mask & 2 != 0,
                    ema_order: mask & 4 != 0,
                    neutral_rsi: mask & 8 != 0,
                }
                .total()
            })
            .collect();
        assert_eq!(sums.into_iter().collect::<Vec<_>>(), ALL_POSSIBLE_SCORES);
    }

    #[test]
    fn trend_stack_also_earns_ema_order() {
        let bars = bars(12.0, 3);
        let frame = frame_with(&bars, 11.0, 10.0, Some(50.0));
        let breakdown = score_frame(&frame, false, &MomentumBand::default());
        assert!(breakdown.trend_stack);
        assert!(breakdown.ema_order);
        assert_eq!(breakdown.total(), 60);
    }

    #[test]
    fn close_below_fast_keeps_only_ema_order() {
        let bars = bars(10.5, 3);
        let frame = frame_with(&bars, 11.0, 10.0, Some(80.0));
        let breakdown = score_frame(&frame, false, &MomentumBand::default());
        assert_eq!(
            breakdown,
            ScoreBreakdown {
                ema_order: true,
                ..ScoreBreakdown::default()
            }
        );
        assert_eq!(breakdown.total(), 10);
    }

    #[test]
    fn undefined_rsi_earns_nothing() {
        let bars = bars(12.0, 3);
        let frame = frame_with(&bars, 10.0, 11.0, None);
        assert_eq!(score_frame(&frame, true, &MomentumBand::default()).total(), 40);
    }

    #[test]
    fn band_edge_is_not_neutral() {
        let bars = bars(12.0, 3);
        let frame = frame_with(&bars, 10.0, 11.0, Some(70.0));
        assert!(!score_frame(&frame, false, &MomentumBand::default()).neutral_rsi);
    }

    #[test]
    fn short_series_scores_without_divergence() {
        let series = BarSeries::new("SHORT", bars(12.0, 4));
        let report = score_series(&series, &ScoringConfig::default()).unwrap();
        assert!(!report.breakdown.divergence);
        assert_eq!(
            report.divergence.rejection(),
            Some(crate::divergence::Rejection::InsufficientHistory)
        );
        assert_eq!(report.as_of, series.bars[3].date);
        assert_eq!(report.score, report.breakdown.total());
    }

    #[test]
    fn invalid_series_is_an_error() {
        let mut series = BarSeries::new("BAD", bars(12.0, 4));
        series.bars[1].low = f64::NAN;
        assert!(matches!(
            score_series(&series, &ScoringConfig::default()),
            Err(ScoreError::DataQuality(DataQualityError::InvalidPrice { index: 1, .. }))
        ));
    }
}
