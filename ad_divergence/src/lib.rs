//! Divergence-based signal scoring.
//!
//! Takes an OHLCV [`BarSeries`](market_data::models::BarSeries) through a
//! strictly forward pipeline and folds the result into a score on [0, 100]:
//!
//! 1. [`indicators`]: EMA(fast), EMA(slow), RSI and the A/D line
//! 2. [`extrema`]: swing lows of price and of A/D
//! 3. [`divergence`]: lower price low against a higher A/D low, confirmed by
//!    an upward RSI cross
//! 4. [`score`]: divergence, trend and momentum gates at the latest bar
//!
//! [`rank`] scores a batch of candidates and orders them.

pub mod config;
pub mod divergence;
pub mod error;
pub mod extrema;
pub mod indicators;
pub mod rank;
pub mod score;

pub use config::{ScoringConfig, load_config_path, load_config_str};
pub use divergence::{DivergenceResult, Rejection, detect_bullish_divergence};
pub use error::{DataQualityError, ScoreError};
pub use indicators::{IndicatorFrame, build_indicators};
pub use rank::{Ranking, Skipped, rank_candidates};
pub use score::{ScoreBreakdown, ScoreReport, score_series};
