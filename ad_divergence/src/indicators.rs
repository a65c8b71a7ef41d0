//! Indicator builder: EMA(fast), EMA(slow), RSI and the Accumulation/Distribution line.
//!
//! All columns are aligned bar-for-bar with the input series. The builder
//! validates the whole series before deriving anything, so a bad bar is reported
//! at its own index instead of being skipped (skipping would shift every later
//! pivot onto the wrong date).

use chrono::NaiveDate;
use market_data::models::{Bar, BarSeries};

use crate::config::IndicatorConfig;
use crate::error::{DataQualityError, PriceField, ScoreError};

/// A series extended with its derived indicator columns.
///
/// Borrows the bars; the engine never mutates them.
#[derive(Debug, Clone)]
pub struct IndicatorFrame<'a> {
    bars: &'a [Bar],
    ema_fast: Vec<f64>,
    ema_slow: Vec<f64>,
    rsi: Vec<Option<f64>>,
    ad: Vec<f64>,
}

impl<'a> IndicatorFrame<'a> {
    /// Assemble a frame from precomputed columns.
    ///
    /// The bars are taken as-is (no validation); every column must have exactly
    /// one value per bar.
    pub fn from_columns(
        bars: &'a [Bar],
        ema_fast: Vec<f64>,
        ema_slow: Vec<f64>,
        rsi: Vec<Option<f64>>,
        ad: Vec<f64>,
    ) -> Result<Self, ScoreError> {
        let expected = bars.len();
        for (column, actual) in [
            ("ema_fast", ema_fast.len()),
            ("ema_slow", ema_slow.len()),
            ("rsi", rsi.len()),
            ("ad", ad.len()),
        ] {
            if actual != expected {
                return Err(ScoreError::ColumnLength {
                    column,
                    expected,
                    actual,
                });
            }
        }
        Ok(Self {
            bars,
            ema_fast,
            ema_slow,
            rsi,
            ad,
        })
    }

    pub fn bars(&self) -> &'a [Bar] {
        self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn ema_fast(&self) -> &[f64] {
        &self.ema_fast
    }

    pub fn ema_slow(&self) -> &[f64] {
        &self.ema_slow
    }

    /// RSI per bar; `None` during the warm-up window.
    pub fn rsi(&self) -> &[Option<f64>] {
        &self.rsi
    }

    pub fn ad(&self) -> &[f64] {
        &self.ad
    }

    /// The `low` column.
    pub fn lows(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.low).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }
}

/// Validate `series` and derive all indicator columns.
///
/// Errors:
/// - [`DataQualityError`] for an empty series, an invalid price, an inverted
///   high/low range, or dates that are not strictly increasing.
pub fn build_indicators<'a>(
    series: &'a BarSeries,
    cfg: &IndicatorConfig,
) -> Result<IndicatorFrame<'a>, ScoreError> {
    validate_series(&series.bars)?;

    let closes: Vec<f64> = series.bars.iter().map(|b| b.close).collect();
    Ok(IndicatorFrame {
        bars: &series.bars,
        ema_fast: ema(&closes, cfg.fast_span),
        ema_slow: ema(&closes, cfg.slow_span),
        rsi: rsi(&closes, cfg.rsi_period),
        ad: accumulation_distribution(&series.bars),
    })
}

/// Check the invariants every indicator relies on.
pub fn validate_series(bars: &[Bar]) -> Result<(), DataQualityError> {
    if bars.is_empty() {
        return Err(DataQualityError::EmptySeries);
    }

    for (index, bar) in bars.iter().enumerate() {
        for (field, value) in [
            (PriceField::High, bar.high),
            (PriceField::Low, bar.low),
            (PriceField::Close, bar.close),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(DataQualityError::InvalidPrice {
                    index,
                    field,
                    value,
                });
            }
        }
        if bar.high < bar.low {
            return Err(DataQualityError::InvertedRange {
                index,
                high: bar.high,
                low: bar.low,
            });
        }
        if index > 0 {
            let previous = bars[index - 1].date;
            if bar.date <= previous {
                return Err(DataQualityError::UnorderedDates {
                    index,
                    previous,
                    date: bar.date,
                });
            }
        }
    }
    Ok(())
}

/// Exponential moving average with `alpha = 2 / (span + 1)`.
///
/// Seeded with the first value and defined from the first bar on; there is no
/// simple-average warm-up.
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => alpha * value + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}

/// Relative Strength Index over simple rolling means of the last `period`
/// close-to-close gains and losses.
///
/// The first `period` bars have no complete window and are `None`. Each window
/// is summed afresh so that an all-gain or all-loss window hits the exact
/// 100 / 0 cases below instead of a rounding residue.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; closes.len()];
    if period == 0 || closes.len() <= period {
        return out;
    }

    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    for end in period..=deltas.len() {
        let window = &deltas[end - period..end];
        let gains: f64 = window.iter().map(|d| d.max(0.0)).sum();
        let losses: f64 = window.iter().map(|d| (-d).max(0.0)).sum();
        // deltas[k] is the move into bar k + 1
        out[end] = Some(rsi_from_averages(
            gains / period as f64,
            losses / period as f64,
        ));
    }
    out
}

/// `100 - 100 / (1 + avg_gain / avg_loss)` with explicit values where the ratio
/// is undefined: no gains in the window gives 0 (a flat window included), gains
/// with no losses give 100.
pub fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain == 0.0 {
        0.0
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

/// Money-flow volume of a single bar. A zero-range bar contributes exactly 0.
pub fn money_flow_volume(bar: &Bar) -> f64 {
    let range = bar.high - bar.low;
    if range == 0.0 {
        return 0.0;
    }
    let multiplier = ((bar.close - bar.low) - (bar.high - bar.close)) / range;
    multiplier * bar.volume as f64
}

/// Running cumulative sum of [`money_flow_volume`].
pub fn accumulation_distribution(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .scan(0.0, |total, bar| {
            *total += money_flow_volume(bar);
            Some(*total)
        })
        .collect()
}
