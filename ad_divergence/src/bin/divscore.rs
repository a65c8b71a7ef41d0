use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use ad_divergence::config::{ScoringConfig, load_config_path};
use ad_divergence::rank::{Ranking, rank_candidates};
use ad_divergence::score::ScoreReport;
use anyhow::{Context, Result, ensure};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use market_data::models::{BarSeries, DateRange};
use market_data::providers::{DataProvider, ProviderKind, build_provider};
use shared_utils::env::get_env_path;
use tokio::task::JoinSet;
use tracing::info;
use tracing_subscriber::EnvFilter;

const CONFIG_ENV: &str = "DIVSCORE_CONFIG";

#[derive(Parser)]
#[command(version, about = "Rank instruments by A/D divergence score")]
struct Cli {
    /// Directory holding one <SYMBOL>.csv file per instrument
    #[arg(long, value_name = "DIR")]
    data_dir: PathBuf,

    /// Scoring config TOML (falls back to $DIVSCORE_CONFIG, then defaults)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Ignore bars before this date
    #[arg(long, value_name = "YYYY-MM-DD")]
    start: Option<NaiveDate>,

    /// Score as of this date: later bars are ignored
    #[arg(long, alias = "end", value_name = "YYYY-MM-DD")]
    as_of: Option<NaiveDate>,

    /// Drop candidates scoring below this (overrides the config value)
    #[arg(long)]
    min_score: Option<u8>,

    /// Log filter, e.g. "debug" or "ad_divergence=trace" (defaults to $RUST_LOG, then "info")
    #[arg(long)]
    log_level: Option<String>,

    #[arg(required = true)]
    symbols: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    // stdout is reserved for the ranking
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> Result<ScoringConfig> {
    let path = cli.config.clone().or_else(|| get_env_path(CONFIG_ENV));
    let mut cfg = match path {
        Some(path) => {
            info!(path = %path.display(), "loading scoring config");
            load_config_path(&path)?
        }
        None => ScoringConfig::default(),
    };
    if let Some(min_score) = cli.min_score {
        cfg.min_score = min_score;
        cfg.validate().context("invalid --min-score")?;
    }
    Ok(cfg)
}

fn resolve_range(cli: &Cli) -> Result<DateRange> {
    let range = DateRange::new(cli.start, cli.as_of);
    ensure!(!range.is_inverted(), "--start must not be after --as-of");
    Ok(range)
}

/// Fetch every symbol concurrently. Results keep the command-line order.
async fn fetch_all(
    provider: Arc<dyn DataProvider + Send + Sync>,
    symbols: &[String],
    range: DateRange,
) -> Result<(Vec<BarSeries>, Ranking)> {
    let mut set = JoinSet::new();
    for (position, symbol) in symbols.iter().cloned().enumerate() {
        let provider = Arc::clone(&provider);
        set.spawn(async move {
            let fetched = provider.fetch_range(&symbol, range).await;
            (position, symbol, fetched)
        });
    }

    let mut results = Vec::with_capacity(symbols.len());
    while let Some(joined) = set.join_next().await {
        results.push(joined.context("fetch task panicked")?);
    }
    results.sort_by_key(|(position, _, _)| *position);

    let mut series = Vec::with_capacity(results.len());
    let mut failed = Ranking::default();
    for (_, symbol, fetched) in results {
        match fetched {
            Ok(s) => series.push(s),
            Err(err) => failed.skip(symbol, err),
        }
    }
    Ok((series, failed))
}

fn write_table(out: &mut impl Write, ranking: &Ranking) -> io::Result<()> {
    writeln!(
        out,
        "{:<8} {:>5}  {:<10}  {:>3} {:>5} {:>3} {:>3}",
        "SYMBOL", "SCORE", "AS_OF", "DIV", "TREND", "EMA", "RSI"
    )?;
    for report in &ranking.ranked {
        write_row(out, report)?;
    }
    for skipped in &ranking.skipped {
        writeln!(out, "{:<8} {:>5}  {}", skipped.symbol, "-", skipped.reason)?;
    }
    Ok(())
}

fn write_row(out: &mut impl Write, report: &ScoreReport) -> io::Result<()> {
    let mark = |passed: bool| if passed { "x" } else { "." };
    let b = &report.breakdown;
    writeln!(
        out,
        "{:<8} {:>5}  {:<10}  {:>3} {:>5} {:>3} {:>3}",
        report.symbol,
        report.score,
        report.as_of,
        mark(b.divergence),
        mark(b.trend_stack),
        mark(b.ema_order),
        mark(b.neutral_rsi),
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let cfg = resolve_config(&cli)?;
    let range = resolve_range(&cli)?;
    if !range.is_unbounded() {
        info!(%range, "restricting history");
    }
    let provider: Arc<dyn DataProvider + Send + Sync> = build_provider(ProviderKind::Csv {
        root: cli.data_dir.clone(),
    })
    .context("cannot open data directory")?
    .into();

    let (series, fetch_failures) = fetch_all(provider, &cli.symbols, range).await?;
    let mut ranking = rank_candidates(&series, &cfg);
    ranking.skipped.extend(fetch_failures.skipped);

    let mut stdout = io::stdout().lock();
    match cli.format {
        OutputFormat::Table => write_table(&mut stdout, &ranking)?,
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut stdout, &ranking)?;
            writeln!(stdout)?;
        }
    }
    stdout.flush()?;

    // summary goes to stderr so stdout stays machine-readable
    eprintln!(
        "SUMMARY: {} scored, {} skipped",
        ranking.ranked.len() + ranking.below_threshold,
        ranking.skipped.len()
    );
    Ok(())
}
