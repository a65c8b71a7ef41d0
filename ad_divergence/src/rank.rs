//! Batch scoring of scanner candidates.

use std::cmp::Reverse;

use market_data::models::BarSeries;
use serde::Serialize;
use tracing::{info, warn};

use crate::config::ScoringConfig;
use crate::score::{ScoreReport, score_series};

/// A candidate that could not be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Skipped {
    pub symbol: String,
    pub reason: String,
}

/// Outcome of scoring a batch of candidates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Ranking {
    /// Reports at or above `min_score`, best first, ties broken by symbol.
    pub ranked: Vec<ScoreReport>,
    pub skipped: Vec<Skipped>,
    /// Candidates that scored but fell under `min_score`.
    pub below_threshold: usize,
}

impl Ranking {
    /// Record a candidate that failed before reaching the scorer, e.g. on fetch.
    pub fn skip(&mut self, symbol: impl Into<String>, reason: impl ToString) {
        let symbol = symbol.into();
        let reason = reason.to_string();
        warn!(%symbol, %reason, "skipping candidate");
        self.skipped.push(Skipped { symbol, reason });
    }
}

/// Score every series and rank the results.
///
/// A series that fails validation is recorded in [`Ranking::skipped`] and the
/// batch carries on.
pub fn rank_candidates<'a, I>(candidates: I, cfg: &ScoringConfig) -> Ranking
where
    I: IntoIterator<Item = &'a BarSeries>,
{
    let mut ranking = Ranking::default();
    for series in candidates {
        match score_series(series, cfg) {
            Ok(report) if report.score >= cfg.min_score => ranking.ranked.push(report),
            Ok(_) => ranking.below_threshold += 1,
            Err(err) => ranking.skip(series.symbol.as_str(), err),
        }
    }

    ranking
        .ranked
        .sort_by(|a, b| (Reverse(a.score), &a.symbol).cmp(&(Reverse(b.score), &b.symbol)));

    info!(
        ranked = ranking.ranked.len(),
        skipped = ranking.skipped.len(),
        below_threshold = ranking.below_threshold,
        "ranking complete"
    );
    ranking
}
