//! Betlog CLI - Evaluate recorded exchange orders from a market log

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use betlog::backtesting::pipeline::{DEFAULT_MARKET_ID, DEFAULT_WINNER};
use betlog::backtesting::{analyze_by_runner, EvaluationConfig, HypothesisTally, MarketEvaluator};
use betlog::data::{load_market_log, LoadOptions, LoadStats, SnapshotStore};
use betlog::SelectionId;

/// Default log file (relative to working directory)
const DEFAULT_LOG_FILE: &str = "assessment_log.json";

#[derive(Parser)]
#[command(name = "betlog")]
#[command(author, version, about = "Retrospective evaluation of exchange orders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to the line-delimited JSON market log
    #[arg(long, env = "BETLOG_FILE", default_value = DEFAULT_LOG_FILE)]
    log_file: PathBuf,

    /// Market to evaluate
    #[arg(long, env = "BETLOG_MARKET_ID", default_value = DEFAULT_MARKET_ID)]
    market: String,

    /// Winning runner (selection id) used for settlement
    #[arg(long, env = "BETLOG_WINNER_ID", default_value_t = DEFAULT_WINNER)]
    winner: SelectionId,

    /// Skip malformed log lines instead of aborting
    #[arg(long)]
    lenient: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full evaluation of the market
    Evaluate {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List reconstructed orders
    Orders {
        /// Only show orders for this runner
        #[arg(short, long)]
        runner: Option<SelectionId>,
    },

    /// List markets found in the log
    Markets,
}

fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    let cli = Cli::parse();

    let options = LoadOptions {
        strict: !cli.lenient,
    };
    let config = EvaluationConfig {
        market_id: cli.market.clone(),
        winner: cli.winner,
    };

    match cli.command {
        Some(Commands::Evaluate { json }) => {
            let store = load_with_spinner(&cli.log_file, &options, !json)?;
            run_evaluate(&store, config, json)?;
        }
        Some(Commands::Orders { runner }) => {
            let store = load_with_spinner(&cli.log_file, &options, true)?;
            list_orders(&store, config, runner)?;
        }
        Some(Commands::Markets) => {
            let store = load_with_spinner(&cli.log_file, &options, true)?;
            list_markets(&store, &config.market_id);
        }
        None => {
            println!("{}", "Betlog CLI v0.1.0".cyan().bold());
            println!("Use --help for usage information.");
        }
    }

    Ok(())
}

fn load_with_spinner(path: &Path, options: &LoadOptions, verbose: bool) -> Result<SnapshotStore> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Loading {}...", path.display()));

    let (store, stats) = load_market_log(path, options)
        .with_context(|| format!("Failed to load market log from {:?}", path))?;

    pb.finish_and_clear();

    if verbose {
        print_load_stats(&stats);
    }

    Ok(store)
}

fn print_load_stats(stats: &LoadStats) {
    println!(
        "{} {} lines: {} descriptions, {} open snapshots, {} ignored",
        "Loaded".green(),
        stats.lines,
        stats.descriptions,
        stats.snapshots,
        stats.ignored
    );
    if stats.skipped > 0 {
        println!(
            "{}",
            format!("Skipped {} malformed lines", stats.skipped).yellow()
        );
    }
}

fn run_evaluate(store: &SnapshotStore, config: EvaluationConfig, json: bool) -> Result<()> {
    let evaluator = MarketEvaluator::new(config);
    let report = evaluator
        .run(store)
        .with_context(|| format!("Evaluation of market {} failed", evaluator.config.market_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    evaluator.print_summary(&report);

    println!("\n{}", "Limits by Runner:".yellow().bold());
    println!("{:>12} {:>10} {:>10}", "Runner", "Min back", "Max lay");
    println!("{}", "-".repeat(34));
    for (selection_id, limits) in &report.limits {
        println!(
            "{:>12} {:>10} {:>10}",
            selection_id,
            format_price(limits.min_back),
            format_price(limits.max_lay)
        );
    }

    println!();
    print_verdict("Forecast", &report.forecast);
    print_verdict("Last traded", &report.last_traded);

    let profit = report.settlement.profit;
    let profit_str = format!("£{:.2}", profit);
    println!(
        "\n{} {}",
        "Profit:".bold(),
        if profit >= 0.0 {
            profit_str.green()
        } else {
            profit_str.red()
        }
    );

    Ok(())
}

fn print_verdict(label: &str, tally: &HypothesisTally) {
    let rate = format!("{:.1}%", tally.hold_rate() * 100.0);
    let rate = if tally.hold_rate() >= 0.5 {
        rate.green()
    } else {
        rate.red()
    };
    println!(
        "{:<12} holds on {} of {} tested orders",
        label,
        rate,
        tally.tested()
    );
}

fn list_orders(
    store: &SnapshotStore,
    config: EvaluationConfig,
    runner: Option<SelectionId>,
) -> Result<()> {
    let evaluator = MarketEvaluator::new(config);
    let orders = evaluator
        .extract(store)
        .with_context(|| format!("Order extraction for {} failed", evaluator.config.market_id))?;

    println!(
        "{:>12} {:>14} {:>5} {:>8} {:>8} {:>10}",
        "Runner", "Bet", "Side", "Price", "Index", "Last traded"
    );
    println!("{}", "-".repeat(64));

    for event in orders
        .events()
        .filter(|e| runner.map_or(true, |r| e.selection_id == r))
    {
        println!(
            "{:>12} {:>14} {:>5} {:>8.2} {:>8} {:>10}",
            event.selection_id,
            event.order.bet_id,
            event.side(),
            event.price(),
            event.sequence_index,
            format_price(event.baseline_last_price())
        );
    }

    println!("\n{}", "Orders by Runner:".yellow().bold());
    println!(
        "{:>12} {:>6} {:>6} {:>6} {:>10} {:>12}",
        "Runner", "Orders", "Back", "Lay", "Avg price", "Index range"
    );
    println!("{}", "-".repeat(58));
    for breakdown in analyze_by_runner(&orders)
        .iter()
        .filter(|b| runner.map_or(true, |r| b.selection_id == r))
    {
        println!(
            "{:>12} {:>6} {:>6} {:>6} {:>10.2} {:>12}",
            breakdown.selection_id,
            breakdown.orders,
            breakdown.backs,
            breakdown.lays,
            breakdown.avg_price,
            format!("{}-{}", breakdown.first_index, breakdown.last_index)
        );
    }

    println!();
    println!("Total: {} orders", orders.count());

    Ok(())
}

fn list_markets(store: &SnapshotStore, selected: &str) {
    if store.is_empty() {
        println!("{}", "No markets found in log.".yellow());
        return;
    }

    println!("{:<16} {:>10} {:>12}", "Market", "Snapshots", "Forecasts");
    println!("{}", "-".repeat(40));

    for market_id in store.market_ids() {
        let Some(market) = store.market(market_id) else {
            continue;
        };
        let line = format!(
            "{:<16} {:>10} {:>12}",
            market_id,
            market.snapshots.len(),
            market.forecast.len()
        );
        if market_id == selected {
            println!("{}", line.cyan().bold());
        } else {
            println!("{}", line);
        }
    }

    println!();
    println!(
        "Total: {} markets, {} snapshots",
        store.len(),
        store.total_snapshots()
    );
}

fn format_price(price: Option<f64>) -> String {
    price
        .map(|p| format!("{:.2}", p))
        .unwrap_or_else(|| "-".to_string())
}
