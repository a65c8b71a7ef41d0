//! CSV file source: one `<SYMBOL>.csv` per instrument.
//!
//! Expected header (case-insensitive, any column order): `date,open,high,low,close,volume`.
//! Extra columns such as `adj close` are ignored. Dates are `YYYY-MM-DD`; a longer
//! timestamp (`2024-01-02 00:00:00-05:00`) is accepted and truncated to its date.
//!
//! Empty price cells are loaded as `NaN` rather than rejected here, so the
//! scoring engine can report them as a data-quality failure at the right bar.
//!
//! The whole file is parsed before the date window is applied, so a malformed
//! row is reported even when it lies outside the requested range.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use tracing::debug;

use crate::models::{Bar, BarSeries, DateRange};
use crate::providers::{CsvSnafu, DataProvider, IoSnafu, NotFoundSnafu, ParseSnafu, ProviderError};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Reads daily bars from `<root>/<SYMBOL>.csv`.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    root: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<f64>,
}

impl CsvProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a symbol. Symbols are upper-cased to match exchange tickers.
    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.root.join(format!("{}.csv", symbol.trim().to_uppercase()))
    }
}

#[async_trait]
impl DataProvider for CsvProvider {
    async fn fetch_range(
        &self,
        symbol: &str,
        range: DateRange,
    ) -> Result<BarSeries, ProviderError> {
        let path = self.path_for(symbol);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return NotFoundSnafu {
                    symbol: symbol.to_string(),
                }
                .fail();
            }
            Err(e) => return Err(e).context(IoSnafu { path }),
        };

        let mut bars = parse_bars(&bytes, &path)?;
        let total = bars.len();
        bars.retain(|bar| range.contains(bar.date));
        debug!(
            symbol,
            bars = bars.len(),
            total,
            %range,
            path = %path.display(),
            "loaded csv series"
        );
        Ok(BarSeries::new(symbol.trim().to_uppercase(), bars))
    }
}

/// Parse CSV bytes into bars, in file order.
pub fn parse_bars(bytes: &[u8], path: &Path) -> Result<Vec<Bar>, ProviderError> {
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_reader(bytes);

    // Normalize header names so "Date,Open,High,..." exports deserialize too.
    let headers = reader.headers().context(CsvSnafu { path })?;
    let lowered: StringRecord = headers.iter().map(|h| h.to_lowercase()).collect();

    let mut bars = Vec::new();
    let mut record = StringRecord::new();
    // blank lines are skipped by the reader, so take the line from the record itself
    while reader.read_record(&mut record).context(CsvSnafu { path })? {
        let line = record.position().map_or(0, |pos| pos.line());
        let row: CsvRow = record
            .deserialize(Some(&lowered))
            .context(CsvSnafu { path })?;
        bars.push(row_to_bar(row, path, line)?);
    }
    Ok(bars)
}

fn row_to_bar(row: CsvRow, path: &Path, line: u64) -> Result<Bar, ProviderError> {
    let date = parse_date(&row.date).with_context(|| ParseSnafu {
        path,
        line,
        message: format!("invalid date {:?}", row.date),
    })?;

    let volume = match row.volume {
        None => 0,
        Some(v) if v.is_finite() && v >= 0.0 => v.round() as u64,
        Some(v) => {
            return ParseSnafu {
                path,
                line,
                message: format!("invalid volume {v}"),
            }
            .fail();
        }
    };

    Ok(Bar {
        date,
        open: row.open.unwrap_or(f64::NAN),
        high: row.high.unwrap_or(f64::NAN),
        low: row.low.unwrap_or(f64::NAN),
        close: row.close.unwrap_or(f64::NAN),
        volume,
    })
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw.get(..10)?, DATE_FORMAT).ok())
}
