//! In-memory source for series that are already loaded.

use async_trait::async_trait;
use indexmap::IndexMap;
use snafu::OptionExt;

use crate::models::{Bar, BarSeries, DateRange};
use crate::providers::{DataProvider, NotFoundSnafu, ProviderError};

/// Serves pre-loaded series keyed by upper-cased symbol, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    series: IndexMap<String, Vec<Bar>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the bars for `series.symbol`.
    pub fn insert(&mut self, series: BarSeries) {
        self.series
            .insert(series.symbol.trim().to_uppercase(), series.bars);
    }

    /// Symbols currently held, in insertion order.
    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }
}

impl FromIterator<BarSeries> for InMemoryProvider {
    fn from_iter<I: IntoIterator<Item = BarSeries>>(iter: I) -> Self {
        let mut provider = Self::new();
        for series in iter {
            provider.insert(series);
        }
        provider
    }
}

#[async_trait]
impl DataProvider for InMemoryProvider {
    async fn fetch_range(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<BarSeries, ProviderError> {
        let key = symbol.trim().to_uppercase();
        let bars = self.series.get(&key).context(NotFoundSnafu { symbol })?;
        let bars = bars
            .iter()
            .filter(|bar| range.contains(bar.date))
            .cloned()
            .collect();
        Ok(BarSeries::new(key, bars))
    }
}
