#![allow(dead_code)]

use chrono::{Days, NaiveDate};
use market_data::models::{Bar, BarSeries};

pub const SCENARIO_BARS: usize = 120;

pub fn day(offset: usize) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Days::new(offset as u64)
}

/// One bar per calendar day, `high = low + 2` and `close = low + 1`.
pub fn series_from_lows(symbol: &str, lows: &[f64]) -> BarSeries {
    let bars = lows
        .iter()
        .enumerate()
        .map(|(i, &low)| Bar::new(day(i), low + 1.0, low + 2.0, low, low + 1.0, 1_000))
        .collect();
    BarSeries::new(symbol, bars)
}

/// Lows with exactly two swing lows: 10.0 at bar 30 and 9.0 at bar 60.
///
/// Strictly falling to 30, rising to 45, falling to 60, then rising to the end.
pub fn scenario_lows() -> Vec<f64> {
    (0..SCENARIO_BARS)
        .map(|i| {
            let x = i as f64;
            match i {
                0..=30 => 15.0 - x / 6.0,
                31..=45 => 10.0 + (x - 30.0) / 6.0,
                46..=60 => 12.5 - 3.5 * (x - 45.0) / 15.0,
                _ => 9.0 + (x - 60.0) * 0.1,
            }
        })
        .collect()
}

/// A/D rising steadily except for a dip to 100 at bar 54 and a higher dip to
/// 150 at bar 60. Both sit within 6 days of bar 60.
pub fn scenario_ad() -> Vec<f64> {
    let mut ad: Vec<f64> = (0..SCENARIO_BARS).map(|i| 1_000.0 + 10.0 * i as f64).collect();
    ad[49..=54].copy_from_slice(&[300.0, 260.0, 220.0, 180.0, 140.0, 100.0]);
    ad[55..=60].copy_from_slice(&[200.0, 250.0, 300.0, 250.0, 200.0, 150.0]);
    ad
}

/// RSI parked at 50 after a 14-bar warm-up, crossing 40 upward into bar 60.
pub fn scenario_rsi() -> Vec<Option<f64>> {
    let mut rsi = vec![Some(50.0); SCENARIO_BARS];
    rsi[..14].fill(None);
    rsi[59] = Some(35.0);
    rsi[60] = Some(45.0);
    rsi
}

/// Closes rising by 1 each day from 10, with a 2-point range.
pub fn rising_series(symbol: &str, n: usize) -> BarSeries {
    let lows: Vec<f64> = (0..n).map(|i| 9.0 + i as f64).collect();
    series_from_lows(symbol, &lows)
}

pub const SCENARIO_VOLUME: u64 = 2_000;

/// Raw bars that reproduce the scenario through the real indicator builder.
///
/// Lows are [`scenario_lows`]. Each `high` is solved so the bar's money-flow
/// volume steps the A/D line to the next [`scenario_ad`] value. Closes sit one
/// point above the low, except bar 60, which jumps to `low[59] + 4` so RSI
/// crosses 40 upward there after a falling stretch.
pub fn scenario_bars(symbol: &str) -> BarSeries {
    let lows = scenario_lows();
    let ad = scenario_ad();
    let volume = SCENARIO_VOLUME as f64;

    let bars = (0..SCENARIO_BARS)
        .map(|i| {
            let low = lows[i];
            let close = if i == 60 { lows[59] + 4.0 } else { low + 1.0 };
            let prev_ad = if i == 0 { 0.0 } else { ad[i - 1] };
            // multiplier m = ((c - l) - (h - c)) / (h - l), solved for h
            let m = (ad[i] - prev_ad) / volume;
            let high = (2.0 * close - low + m * low) / (1.0 + m);
            Bar::new(day(i), close, high, low, close, SCENARIO_VOLUME)
        })
        .collect();
    BarSeries::new(symbol, bars)
}
