//! Provider abstraction for market data sources.
//!
//! This module defines the [`DataProvider`] trait, the single input contract of
//! the scoring engine: given a symbol and a [`DateRange`], hand back its daily
//! [`BarSeries`] restricted to that window. Only daily bars are served.
//!
//! Each concrete source implements [`DataProvider`]:
//! - [`CsvProvider`] reads one `<SYMBOL>.csv` export per instrument from a directory.
//! - [`InMemoryProvider`] serves series that are already loaded (tests, embedding callers).
//!
//! The trait is designed for async usage and supports dynamic dispatch (`dyn DataProvider`)
//! for runtime selection of providers through [`build_provider`].
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use market_data::models::{BarSeries, DateRange};
//! use market_data::providers::{DataProvider, ProviderError};
//!
//! struct MyProvider;
//!
//! #[async_trait]
//! impl DataProvider for MyProvider {
//!     async fn fetch_range(
//!         &self,
//!         symbol: &str,
//!         range: DateRange,
//!     ) -> Result<BarSeries, ProviderError> {
//!         Ok(BarSeries::new(symbol, vec![]).within(&range))
//!     }
//! }
//! ```

pub mod csv_file;
pub mod memory;

use std::path::PathBuf;

use async_trait::async_trait;
use snafu::{Backtrace, Snafu, ensure};

use crate::models::{BarSeries, DateRange};

pub use self::csv_file::CsvProvider;
pub use self::memory::InMemoryProvider;

/// Trait for fetching the daily bar history of one instrument.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Fetches the bars of `symbol` dated inside `range` (inclusive on both ends).
    ///
    /// # Returns
    ///
    /// * `Ok(BarSeries)` - The bars in the order the source stores them. A window
    ///   with no bars in it gives an empty series, not an error.
    /// * `Err(ProviderError)` - If the symbol is unknown or the source is unreadable.
    async fn fetch_range(&self, symbol: &str, range: DateRange)
    -> Result<BarSeries, ProviderError>;

    /// Fetches the full available history for `symbol`.
    async fn fetch_series(&self, symbol: &str) -> Result<BarSeries, ProviderError> {
        self.fetch_range(symbol, DateRange::default()).await
    }
}

/// Errors that can occur within a `DataProvider` implementation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderError {
    /// The source has no data for the requested symbol.
    #[snafu(display("No data for symbol {symbol}"))]
    NotFound { symbol: String, backtrace: Backtrace },

    /// The underlying file could not be read.
    #[snafu(display("Failed to read {}: {source}", path.display()))]
    Io {
        path: PathBuf,
        source: std::io::Error,
        backtrace: Backtrace,
    },

    /// The file is not well-formed CSV or a row does not match the expected columns.
    #[snafu(display("Malformed CSV in {}: {source}", path.display()))]
    Csv {
        path: PathBuf,
        source: csv::Error,
        backtrace: Backtrace,
    },

    /// A field was present but could not be interpreted.
    #[snafu(display("{}:{line}: {message}", path.display()))]
    Parse {
        path: PathBuf,
        line: u64,
        message: String,
        backtrace: Backtrace,
    },
}

/// Errors that can occur during the creation of a provider instance.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProviderInitError {
    /// The configured data directory does not exist or is not a directory.
    #[snafu(display("Data directory not found: {}", path.display()))]
    MissingDataDir { path: PathBuf, backtrace: Backtrace },
}

/// Which source to build at runtime.
#[derive(Debug, Clone)]
pub enum ProviderKind {
    /// One CSV file per symbol under `root`.
    Csv { root: PathBuf },
    /// Pre-loaded series.
    InMemory { series: Vec<BarSeries> },
}

/// Build and return a boxed data provider corresponding to the supplied kind.
pub fn build_provider(
    kind: ProviderKind,
) -> Result<Box<dyn DataProvider + Send + Sync>, ProviderInitError> {
    match kind {
        ProviderKind::Csv { root } => {
            ensure!(root.is_dir(), MissingDataDirSnafu { path: root });
            Ok(Box::new(CsvProvider::new(root)))
        }
        ProviderKind::InMemory { series } => {
            Ok(Box::new(series.into_iter().collect::<InMemoryProvider>()))
        }
    }
}
