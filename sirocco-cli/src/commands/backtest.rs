//! Backtest command implementation.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use clap::Parser;
use rust_decimal::Decimal;
use tracing::info;

use sirocco_backtest::{
    BacktestJob, BacktestResult, BacktestRunner, BacktestSettings, CancelToken, ReplayFeed,
};
use sirocco_core::data::Bar;
use sirocco_core::types::{SymbolId, Timeframe};
use sirocco_strategy::{InMemoryConfigProvider, StrategyDefinition, StrategyRegistry};

/// Arguments for the backtest command.
#[derive(Debug, Parser)]
pub struct BacktestArgs {
    /// Strategy definition file (JSON `StrategyDefinition`)
    #[arg(short, long)]
    definition: PathBuf,

    /// Bar file (JSON array of `Bar` records)
    #[arg(short, long)]
    bars: PathBuf,

    /// Start date (YYYY-MM-DD); defaults to the earliest loaded bar
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD, inclusive); defaults to the latest loaded bar
    #[arg(long)]
    end: Option<String>,

    /// Initial account balance
    #[arg(long, default_value = "10000")]
    capital: Decimal,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table")]
    output: String,
}

/// Runs a backtest with the given arguments.
///
/// # Errors
///
/// Returns an error if the input files cannot be read or decoded.
pub async fn run(args: &BacktestArgs) -> Result<()> {
    let definition: StrategyDefinition = read_json(&args.definition)
        .with_context(|| format!("failed to load definition {}", args.definition.display()))?;
    let bars: Vec<Bar> = read_json(&args.bars)
        .with_context(|| format!("failed to load bars {}", args.bars.display()))?;
    if bars.is_empty() {
        bail!("bar file {} contains no bars", args.bars.display());
    }
    if definition.symbols.is_empty() {
        bail!("definition '{}' lists no symbols", definition.name);
    }

    info!(
        strategy = %definition.name,
        version = definition.version,
        bars = bars.len(),
        "backtest inputs loaded"
    );

    let first = bars.iter().map(|b| b.timestamp).min().context("no bars")?;
    let last = bars.iter().map(|b| b.timestamp).max().context("no bars")?;
    let start_date = match &args.start {
        Some(date) => parse_date(date)?,
        None => first.to_datetime(),
    };
    let end_date = match &args.end {
        Some(date) => parse_date(date)?,
        None => last.to_datetime(),
    };

    let job = BacktestJob {
        job_id: uuid::Uuid::new_v4().to_string(),
        strategy_name: definition.name.clone(),
        strategy_version: Some(definition.version),
        symbols: definition.symbols.clone(),
        start_date,
        end_date,
        parameters: serde_json::Map::new(),
        requested_at: Utc::now(),
    };

    let catalog = build_catalog(bars)?;
    let settings = BacktestSettings {
        initial_balance: args.capital,
        ..BacktestSettings::default()
    };
    let runner = BacktestRunner::new(
        Arc::new(catalog),
        Arc::new(InMemoryConfigProvider::new(vec![definition])),
        StrategyRegistry::with_builtins(),
        settings,
    );

    let result = runner.run(&job, &CancelToken::new()).await;
    print_result(&result, &args.output)?;

    if result.success {
        Ok(())
    } else {
        bail!(
            "backtest unsuccessful: {}",
            result.error.unwrap_or_else(|| "unknown error".to_string())
        )
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn parse_date(date: &str) -> Result<DateTime<Utc>> {
    let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .context("invalid date format, use YYYY-MM-DD")?;
    let datetime = parsed
        .and_hms_opt(0, 0, 0)
        .context("failed to build datetime")?;
    Ok(datetime.and_utc())
}

/// Groups a flat bar list into per-(symbol, timeframe) series and loads
/// them into a replay feed acting as the candle catalog.
fn build_catalog(bars: Vec<Bar>) -> Result<ReplayFeed> {
    let mut series: HashMap<(SymbolId, Timeframe), Vec<Bar>> = HashMap::new();
    for bar in bars {
        series.entry((bar.symbol_id, bar.timeframe)).or_default().push(bar);
    }

    let mut catalog = ReplayFeed::new();
    for ((symbol_id, timeframe), mut group) in series {
        group.sort_by_key(|b| b.timestamp);
        catalog
            .load_series(symbol_id, timeframe, group)
            .with_context(|| format!("bad bar series for {symbol_id} {timeframe}"))?;
    }
    Ok(catalog)
}

fn print_result(result: &BacktestResult, format: &str) -> Result<()> {
    match format {
        "json" => println!("{}", serde_json::to_string_pretty(result)?),
        _ => {
            println!("Backtest {}", result.job_id);
            println!("----------------------------------------");
            println!("Success:          {}", result.success);
            if let Some(error) = &result.error {
                println!("Error:            {error}");
            }
            println!("Initial balance:  {}", result.initial_balance);
            println!("Final balance:    {}", result.final_balance);
            println!("Total trades:     {}", result.total_trades);
            println!("Winning trades:   {}", result.winning_trades);
            println!("Losing trades:    {}", result.losing_trades);
            println!("Win rate:         {}", result.win_rate);
            println!("Profit factor:    {}", result.profit_factor);
            println!("Max drawdown:     {}%", result.max_drawdown_percent);
            println!("Completed at:     {}", result.completed_at);
        }
    }
    Ok(())
}
