//! Scoring configuration: defaults, TOML loading, and validation.
//!
//! Every knob of the engine lives here with the default the scoring weights were
//! tuned against:
//!
//! ```toml
//! min_score = 0
//!
//! [indicators]
//! fast_span = 50
//! slow_span = 200
//! rsi_period = 14
//!
//! [divergence]
//! order = 5
//! max_dist_days = 6
//! rsi_threshold = 40.0
//!
//! [momentum_band]
//! low = 30.0
//! high = 70.0
//! ```
//!
//! Any table or key may be omitted. Unknown keys are rejected so that a typo
//! does not silently fall back to a default.
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]

use std::path::Path;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

/// Top-level configuration for one scoring run.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    /// Indicator spans and periods.
    pub indicators: IndicatorConfig,
    /// Pivot detection and divergence matching.
    pub divergence: DivergenceConfig,
    /// Neutral RSI band for the momentum contribution.
    pub momentum_band: MomentumBand,
    /// Reports scoring below this are dropped from a ranking.
    pub min_score: u8,
}

/// Parameters of the indicator builder.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndicatorConfig {
    /// Span of the fast EMA.
    pub fast_span: usize,
    /// Span of the slow EMA.
    pub slow_span: usize,
    /// Window of the RSI rolling means.
    pub rsi_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_span: 50,
            slow_span: 200,
            rsi_period: 14,
        }
    }
}

/// Parameters of the extrema detector, divergence matcher and momentum confirmer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DivergenceConfig {
    /// Neighbourhood radius, in bars, of a swing low.
    pub order: usize,
    /// Maximum calendar-day distance between an indicator pivot and the latest price pivot.
    pub max_dist_days: i64,
    /// RSI level that must be crossed upward at the price pivot.
    pub rsi_threshold: f64,
}

impl Default for DivergenceConfig {
    fn default() -> Self {
        Self {
            order: 5,
            max_dist_days: 6,
            rsi_threshold: 40.0,
        }
    }
}

impl DivergenceConfig {
    /// Fewest bars on which a swing low can be detected at all.
    pub fn min_bars(&self) -> usize {
        2 * self.order + 1
    }
}

/// Open interval `(low, high)` of RSI values considered neutral momentum.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct MomentumBand {
    pub low: f64,
    pub high: f64,
}

impl Default for MomentumBand {
    fn default() -> Self {
        Self {
            low: 30.0,
            high: 70.0,
        }
    }
}

impl MomentumBand {
    /// Strictly inside the band; the bounds themselves are not neutral.
    pub fn contains(&self, rsi: f64) -> bool {
        self.low < rsi && rsi < self.high
    }
}

impl ScoringConfig {
    /// Check cross-field constraints that serde cannot express.
    ///
    /// Errors:
    /// - Zero EMA span, RSI period or pivot order
    /// - Negative `max_dist_days`
    /// - RSI threshold or band bounds outside [0, 100], or `low >= high`
    /// - `min_score` above 100
    pub fn validate(&self) -> anyhow::Result<()> {
        let ind = &self.indicators;
        if ind.fast_span == 0 || ind.slow_span == 0 {
            bail!("EMA spans must be at least 1");
        }
        if ind.rsi_period == 0 {
            bail!("rsi_period must be at least 1");
        }

        let div = &self.divergence;
        if div.order == 0 {
            bail!("divergence.order must be at least 1");
        }
        if div.max_dist_days < 0 {
            bail!("divergence.max_dist_days cannot be negative");
        }
        if !(0.0..=100.0).contains(&div.rsi_threshold) {
            bail!(
                "divergence.rsi_threshold {} is outside [0, 100]",
                div.rsi_threshold
            );
        }

        let band = &self.momentum_band;
        if !(0.0..=100.0).contains(&band.low) || !(0.0..=100.0).contains(&band.high) {
            bail!("momentum_band bounds must lie in [0, 100]");
        }
        if band.low >= band.high {
            bail!(
                "momentum_band.low ({}) must be below momentum_band.high ({})",
                band.low,
                band.high
            );
        }

        if self.min_score > 100 {
            bail!("min_score {} is above the maximum score of 100", self.min_score);
        }
        Ok(())
    }
}

/// Parse and validate a configuration from a TOML string.
pub fn load_config_str(toml_str: &str) -> anyhow::Result<ScoringConfig> {
    let cfg: ScoringConfig =
        toml::from_str(toml_str).context("failed to parse scoring config TOML")?;
    cfg.validate().context("invalid scoring config")?;
    Ok(cfg)
}

/// Read a configuration TOML file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<Path>) -> anyhow::Result<ScoringConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
