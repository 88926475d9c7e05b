//! BreakLab CLI — demo data, backtest runs, sweeps, and reports.
//!
//! Commands:
//! - `demo`   — synthesize a seeded 5-minute CSV series
//! - `run`    — execute a backtest from a CSV feed, export JSON artifacts
//! - `sweep`  — grid-search lookback / stop multiple / reward-to-risk
//! - `report` — re-print the analytics summary from an exported trades.json

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use breaklab_core::TradeLedger;
use breaklab_runner::{
    load_bars_csv, run_single_backtest, save_artifacts, synthetic_bars, write_bars_csv,
    AnalyticsReport, ParamGrid, ParamSweep, RunConfig,
};

#[derive(Parser)]
#[command(name = "breaklab", about = "BreakLab — multi-timeframe breakout backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Synthesize a seeded 5-minute demo series as CSV.
    Demo {
        /// Output CSV path.
        #[arg(long, default_value = "data/demo_m5.csv")]
        out: PathBuf,

        /// Number of 5-minute bars (2880 = 10 days).
        #[arg(long, default_value_t = 2880)]
        bars: usize,

        /// RNG seed.
        #[arg(long, default_value_t = 7)]
        seed: u64,
    },
    /// Execute a backtest over a CSV feed and export artifacts.
    Run {
        /// Base-resolution CSV (datetime,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML run config; defaults apply when omitted.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output directory for per-run artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Grid-search the strategy's main parameters over one CSV feed.
    Sweep {
        /// Base-resolution CSV (datetime,open,high,low,close,volume).
        #[arg(long)]
        data: PathBuf,

        /// Path to a TOML run config used as the grid's base.
        #[arg(long)]
        config: Option<PathBuf>,

        /// How many of the best results to print.
        #[arg(long, default_value_t = 5)]
        top: usize,

        /// Run the grid sequentially instead of across threads.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
    /// Print the analytics summary for an exported trades.json.
    Report {
        /// Path to a trades.json artifact (one JSON array of trades).
        #[arg(long)]
        trades: PathBuf,

        /// Initial capital the run started from.
        #[arg(long, default_value_t = 10_000.0)]
        initial_capital: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo { out, bars, seed } => run_demo(out, bars, seed),
        Commands::Run {
            data,
            config,
            output_dir,
        } => run_backtest_cmd(data, config, output_dir),
        Commands::Sweep {
            data,
            config,
            top,
            sequential,
        } => run_sweep_cmd(data, config, top, sequential),
        Commands::Report {
            trades,
            initial_capital,
        } => run_report(trades, initial_capital),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<RunConfig> {
    match path {
        Some(path) => RunConfig::from_toml_file(&path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(RunConfig::default()),
    }
}

fn run_demo(out: PathBuf, bars: usize, seed: u64) -> Result<()> {
    if bars == 0 {
        bail!("--bars must be at least 1");
    }
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let series = synthetic_bars(bars, seed);
    write_bars_csv(&out, &series)?;
    println!("wrote {} bars -> {}", series.len(), out.display());
    Ok(())
}

fn run_backtest_cmd(data: PathBuf, config: Option<PathBuf>, output_dir: PathBuf) -> Result<()> {
    let config = load_config(config)?;
    let bars = load_bars_csv(&data).with_context(|| format!("loading {}", data.display()))?;
    if bars.is_empty() {
        bail!("{} contains no bars", data.display());
    }

    let result = run_single_backtest(&config, &bars)?;
    let paths = save_artifacts(&output_dir, &result)?;

    println!("run {} ({} bars)", result.run_id, result.bars_processed);
    print_summary(&result.analytics);
    println!("\nartifacts -> {}", paths.dir.display());
    Ok(())
}

fn run_sweep_cmd(
    data: PathBuf,
    config: Option<PathBuf>,
    top: usize,
    sequential: bool,
) -> Result<()> {
    let base = load_config(config)?;
    let bars = load_bars_csv(&data).with_context(|| format!("loading {}", data.display()))?;
    if bars.is_empty() {
        bail!("{} contains no bars", data.display());
    }

    let grid = ParamGrid::breakout_default();
    let results = ParamSweep::new()
        .with_parallelism(!sequential)
        .sweep(&bars, &grid, &base)?;

    println!(
        "{} configurations over {} bars\n",
        results.len(),
        bars.len()
    );
    println!(
        "{:<10} {:>8} {:>6} {:>4} {:>8} {:>10} {:>8}",
        "run", "lookback", "stop", "rr", "trades", "net pnl", "max dd%"
    );
    for result in results.sorted_by_net_pnl().into_iter().take(top) {
        let summary = &result.analytics.summary;
        println!(
            "{:<10} {:>8} {:>6.1} {:>4.1} {:>8} {:>10.2} {:>8.2}",
            &result.run_id[..10.min(result.run_id.len())],
            result.config.risk.lookback,
            result.config.risk.atr_mult_stop,
            result.config.risk.reward_to_risk,
            summary.total_trades,
            summary.net_pnl,
            summary.max_drawdown * 100.0,
        );
    }
    Ok(())
}

fn run_report(trades: PathBuf, initial_capital: f64) -> Result<()> {
    if !(initial_capital.is_finite() && initial_capital > 0.0) {
        bail!("--initial-capital must be positive");
    }
    let text = std::fs::read_to_string(&trades)
        .with_context(|| format!("reading {}", trades.display()))?;
    let ledger: TradeLedger =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", trades.display()))?;

    let analytics = AnalyticsReport::compute(ledger.trades(), initial_capital);
    print_summary(&analytics);
    Ok(())
}

fn print_summary(analytics: &AnalyticsReport) {
    let summary = &analytics.summary;
    let profit_factor = match summary.profit_factor {
        Some(pf) => format!("{:.2}", pf),
        None => "inf".to_string(),
    };

    println!("\n=== summary ===");
    println!("{:<20}: {}", "Total trades", summary.total_trades);
    println!("{:<20}: {:.2}", "Winrate (%)", summary.win_rate * 100.0);
    println!("{:<20}: {:.2}", "Net PnL", summary.net_pnl);
    println!("{:<20}: {}", "Profit factor", profit_factor);
    println!("{:<20}: {:.2}", "Expectancy", summary.expectancy);
    println!("{:<20}: {:.2}", "Max drawdown (%)", summary.max_drawdown * 100.0);
    println!("{:<20}: {:.2}", "Final equity", summary.final_equity);

    if !analytics.pnl_by_year.is_empty() {
        println!("\n=== net pnl by year ===");
        for (year, pnl) in &analytics.pnl_by_year {
            println!("{:<10}: {:.2}", year, pnl);
        }
    }
    if !analytics.pnl_by_month.is_empty() {
        println!("\n=== net pnl by month ===");
        for (month, pnl) in &analytics.pnl_by_month {
            println!("{:<10}: {:.2}", month, pnl);
        }
    }
    if !analytics.pnl_by_side.is_empty() {
        println!("\n=== net pnl by side ===");
        for (side, pnl) in &analytics.pnl_by_side {
            println!("{:<10}: {:.2}", side, pnl);
        }
    }
}
