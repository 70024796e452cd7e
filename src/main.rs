//! riskctl: strategy risk classification and synthetic risk metrics.
//!
//! Generates archetype-appropriate risk metrics for backtest summaries,
//! classifies performance records into risk tiers, and keeps a strategy
//! store whose tiers always follow their latest performance.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use strategy_risk::backtest::{BacktestRequest, BacktestRunner, BacktestSummary};
use strategy_risk::db::{Database, StrategyStore};
use strategy_risk::metrics::{
    CalculatorConfig, GeneratorConfig, PerformanceCalculator, RiskLevelClassifier,
    RiskMetricsGenerator, RngSource, FACTORS, LOW_CEILING, MEDIUM_CEILING, NO_DATA_SCORE,
};
use strategy_risk::models::{PerformanceMetrics, RiskLevel, StrategyArchetype, StrategyRecord};

/// Strategy risk engine CLI.
#[derive(Parser)]
#[command(name = "riskctl")]
#[command(about = "Classify strategy risk and generate synthetic risk metrics", long_about = None)]
struct Cli {
    /// Database URL
    #[arg(short, long, env = "DATABASE_URL", default_value = "sqlite:./strategy_risk.db?mode=rwc")]
    database: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Annualized risk-free rate used in Sharpe ratios
    #[arg(long, env = "RISK_FREE_RATE", default_value = "0.045")]
    risk_free_rate: f64,

    /// Seed for reproducible metric generation
    #[arg(long, env = "RISK_SEED")]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

/// JSON input given inline or from a file.
#[derive(clap::Args)]
struct JsonInput {
    /// Inline JSON
    #[arg(long, conflicts_with = "file")]
    json: Option<String>,

    /// Path to a JSON file
    #[arg(long)]
    file: Option<PathBuf>,
}

impl JsonInput {
    fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        let raw = match (&self.json, &self.file) {
            (Some(json), _) => json.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?,
            (None, None) => anyhow::bail!("Provide --json or --file"),
        };
        serde_json::from_str(&raw).context("Failed to parse JSON input")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate synthetic risk metrics for a backtest summary
    Generate {
        /// Strategy type tag (e.g. covered_calls)
        #[arg(short, long)]
        archetype: String,

        /// Total return as a fraction (0.085 = 8.5%)
        #[arg(long, allow_hyphen_values = true)]
        total_return: f64,

        /// Max drawdown as a fraction; sign is ignored
        #[arg(long, allow_hyphen_values = true)]
        max_drawdown: f64,

        /// Win rate (0.0 to 1.0)
        #[arg(long, default_value = "0.5")]
        win_rate: f64,

        /// Print JSON instead of a table
        #[arg(long)]
        json_output: bool,
    },

    /// Classify a performance record into a risk tier
    Classify {
        #[command(flatten)]
        input: JsonInput,
    },

    /// Show the per-factor score breakdown for a performance record
    Assess {
        #[command(flatten)]
        input: JsonInput,

        /// Print JSON instead of a table
        #[arg(long)]
        json_output: bool,
    },

    /// Calculate realized metrics from a return series
    Calculate {
        #[command(flatten)]
        input: JsonInput,
    },

    /// Create a strategy
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Strategy type tag
        #[arg(short, long)]
        archetype: String,

        /// Catalog risk level used until performance data exists
        #[arg(short, long, default_value = "medium")]
        risk_level: String,
    },

    /// List all strategies
    List,

    /// Show a strategy with its performance history
    Show {
        /// Strategy id
        id: String,
    },

    /// Update a strategy's performance record
    Update {
        /// Strategy id
        id: String,

        #[command(flatten)]
        input: JsonInput,

        /// Replace the whole record instead of merging fields into it
        #[arg(long)]
        replace: bool,
    },

    /// Fold a backtest summary into a strategy
    Backtest {
        /// Strategy id
        id: String,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start: NaiveDate,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        end: NaiveDate,

        /// Initial capital
        #[arg(short, long, default_value = "10000")]
        capital: Decimal,

        /// Total return as a fraction
        #[arg(long, allow_hyphen_values = true)]
        total_return: f64,

        /// Win rate (0.0 to 1.0)
        #[arg(long)]
        win_rate: f64,

        /// Max drawdown as a fraction
        #[arg(long, allow_hyphen_values = true)]
        max_drawdown: f64,

        /// Number of trades
        #[arg(long, default_value = "0")]
        trades: u32,

        /// Average holding period in days
        #[arg(long, default_value = "0")]
        avg_duration: f64,

        /// Gross profit / gross loss
        #[arg(long, default_value = "0")]
        profit_factor: f64,
    },

    /// Show the classification thresholds
    Thresholds,

    /// Show current configuration
    Config,
}

/// Input for `calculate`.
#[derive(Deserialize)]
struct ReturnSeries {
    period_returns: Vec<f64>,
    #[serde(default)]
    benchmark_returns: Option<Vec<f64>>,
    #[serde(default)]
    trade_pnls: Vec<Decimal>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let generator_config = GeneratorConfig {
        risk_free_rate: cli.risk_free_rate,
        ..Default::default()
    };
    let calculator_config = CalculatorConfig {
        risk_free_rate: cli.risk_free_rate,
        ..Default::default()
    };
    let generator = RiskMetricsGenerator::new(generator_config.clone());

    match cli.command {
        Commands::Generate {
            archetype,
            total_return,
            max_drawdown,
            win_rate,
            json_output,
        } => {
            let archetype = StrategyArchetype::from(archetype);
            let mut source = RngSource::from_seed_option(cli.seed);
            let generated = generator.generate_with(
                &mut source,
                &archetype,
                total_return,
                max_drawdown,
                win_rate,
            );

            let mut metrics = PerformanceMetrics {
                total_return: Some(total_return),
                win_rate: Some(win_rate),
                max_drawdown: Some(max_drawdown),
                ..Default::default()
            };
            generated.apply_to(&mut metrics);

            if json_output {
                println!("{}", serde_json::to_string_pretty(&metrics)?);
            } else {
                println!("\n=== {} ({}) ===", archetype, archetype.family().as_str());
                print_metrics(&metrics);
                println!("\nRisk Level:     {}", RiskLevelClassifier::classify(&metrics));
            }
        }

        Commands::Classify { input } => {
            let metrics: PerformanceMetrics = input.parse()?;
            let level = RiskLevelClassifier::classify(&metrics);
            println!("{}", level);
        }

        Commands::Assess { input, json_output } => {
            let metrics: PerformanceMetrics = input.parse()?;
            let assessment = RiskLevelClassifier::assess(&metrics);
            if json_output {
                println!("{}", serde_json::to_string_pretty(&assessment)?);
            } else {
                println!("{}", assessment);
            }
        }

        Commands::Calculate { input } => {
            let series: ReturnSeries = input.parse()?;
            let metrics = PerformanceCalculator::calculate(
                &series.period_returns,
                series.benchmark_returns.as_deref(),
                &series.trade_pnls,
                &calculator_config,
            );
            println!("{}", serde_json::to_string_pretty(&metrics)?);
            info!(level = %RiskLevelClassifier::classify(&metrics), "Realized metrics calculated");
        }

        Commands::Create {
            name,
            archetype,
            risk_level,
        } => {
            let db = Database::new(&cli.database).await?;
            let catalog_level: RiskLevel = risk_level.parse()?;
            let record =
                StrategyRecord::new(name, StrategyArchetype::from(archetype), catalog_level);

            if !record.archetype.is_recognized() {
                info!(
                    archetype = %record.archetype,
                    "Unrecognized strategy type, using default risk ranges"
                );
            }

            db.save_strategy(&record).await?;
            println!("Created strategy {} ({})", record.name, record.id);
        }

        Commands::List => {
            let db = Database::new(&cli.database).await?;
            let strategies = db.list_strategies().await?;

            if strategies.is_empty() {
                println!("No strategies yet. Use 'riskctl create' to add one.");
                return Ok(());
            }

            println!(
                "\n{:<36} {:<20} {:<24} {:<8} {:>8}",
                "ID", "NAME", "TYPE", "RISK", "RETURN"
            );
            println!("{}", "-".repeat(100));

            for s in strategies {
                let ret = s
                    .performance()
                    .and_then(|p| p.total_return)
                    .map(|r| format!("{:.1}%", r * 100.0))
                    .unwrap_or_else(|| "-".to_string());

                println!(
                    "{:<36} {:<20} {:<24} {:<8} {:>8}",
                    s.id,
                    truncate(&s.name, 18),
                    truncate(s.archetype.as_str(), 22),
                    s.risk_level(),
                    ret
                );
            }
        }

        Commands::Show { id } => {
            let db = Database::new(&cli.database).await?;
            let record = db
                .load_strategy(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Strategy not found: {}", id))?;

            println!("\n=== Strategy: {} ===", record.name);
            println!("ID:         {}", record.id);
            println!("Type:       {} ({})", record.archetype, record.archetype.family().as_str());
            println!("Risk Level: {}", record.risk_level());
            println!("            {}", record.risk_level().description());
            println!("Created:    {}", record.created_at().format("%Y-%m-%d %H:%M"));
            println!("Updated:    {}", record.updated_at().format("%Y-%m-%d %H:%M"));

            if let Some(p) = record.performance() {
                println!("\n--- Performance ---");
                print_metrics(p);
            }

            let history = db.performance_history(&record.id).await?;
            if !history.is_empty() {
                println!("\n--- History ({}) ---", history.len());
                for entry in history {
                    println!(
                        "  {}  {:<8} return {}",
                        entry.recorded_at.format("%Y-%m-%d %H:%M"),
                        entry.risk_level,
                        entry
                            .performance
                            .total_return
                            .map(|r| format!("{:.2}%", r * 100.0))
                            .unwrap_or_else(|| "-".to_string())
                    );
                }
            }
        }

        Commands::Update { id, input, replace } => {
            let db = Database::new(&cli.database).await?;
            let metrics: PerformanceMetrics = input.parse()?;

            let transition = if replace {
                db.update_performance(&id, metrics).await?
            } else {
                db.edit_performance(&id, &metrics).await?
            };

            let transition =
                transition.ok_or_else(|| anyhow::anyhow!("Strategy not found: {}", id))?;
            if transition.changed() {
                println!("Risk level: {} -> {}", transition.previous, transition.current);
            } else {
                println!("Risk level: {} (unchanged)", transition.current);
            }
        }

        Commands::Backtest {
            id,
            start,
            end,
            capital,
            total_return,
            win_rate,
            max_drawdown,
            trades,
            avg_duration,
            profit_factor,
        } => {
            let db = Database::new(&cli.database).await?;
            let mut record = db
                .load_strategy(&id)
                .await?
                .ok_or_else(|| anyhow::anyhow!("Strategy not found: {}", id))?;

            let request = BacktestRequest::new(
                start,
                end,
                capital,
                BacktestSummary {
                    total_return,
                    win_rate,
                    max_drawdown,
                    total_trades: trades,
                    avg_trade_duration: avg_duration,
                    profit_factor,
                },
            );

            let mut runner = BacktestRunner::new(generator, RngSource::from_seed_option(cli.seed));
            let report = runner.run(&mut record, &request)?;
            db.save_strategy(&record).await?;

            println!("{}", report);
        }

        Commands::Thresholds => {
            println!("\n=== Risk Classification ===\n");
            for scale in FACTORS.iter() {
                let bands: Vec<String> = scale.bands.iter().map(|b| b.to_string()).collect();
                println!(
                    "  {:<20}{} {}; otherwise {:+}",
                    scale.factor.as_str(),
                    if scale.magnitude { " |x|" } else { "" },
                    bands.join("; "),
                    scale.otherwise
                );
            }

            println!("\nAverage score:");
            println!("  < {:<4} low     {}", LOW_CEILING, RiskLevel::Low.description());
            println!("  < {:<4} medium  {}", MEDIUM_CEILING, RiskLevel::Medium.description());
            println!("  >= {:<3} high    {}", MEDIUM_CEILING, RiskLevel::High.description());
            println!("\nNo data: {} (medium)", NO_DATA_SCORE);
        }

        Commands::Config => {
            println!("\n=== Generator Configuration ===\n");
            println!("  Risk-Free Rate:       {:.2}%", generator_config.risk_free_rate * 100.0);
            println!("  VaR Z-Score:          {}", generator_config.var_z_score);
            println!("  Trading Days / Year:  {}", generator_config.trading_days_per_year);

            println!("\n=== Calculator Configuration ===\n");
            println!("  Periods / Year:       {}", calculator_config.periods_per_year);
            println!("  Risk-Free Rate:       {:.2}%", calculator_config.risk_free_rate * 100.0);
            println!("  VaR Confidence:       {:.0}%", calculator_config.var_confidence * 100.0);

            println!("\n=== Runtime ===\n");
            println!("  Database:             {}", cli.database);
            println!(
                "  Seed:                 {}",
                cli.seed.map(|s| s.to_string()).unwrap_or_else(|| "entropy".to_string())
            );
        }
    }

    Ok(())
}

fn print_metrics(p: &PerformanceMetrics) {
    let row = |label: &str, value: Option<f64>, pct: bool| match value {
        Some(v) if pct => println!("{:<16}{:.2}%", label, v * 100.0),
        Some(v) => println!("{:<16}{:.2}", label, v),
        None => {}
    };

    row("Total Return:", p.total_return, true);
    row("Win Rate:", p.win_rate, true);
    row("Max Drawdown:", p.max_drawdown, true);
    if let Some(trades) = p.total_trades {
        println!("{:<16}{}", "Total Trades:", trades);
    }
    row("Avg Duration:", p.avg_trade_duration, false);
    row("Volatility:", p.volatility, true);
    row("Std Dev:", p.standard_deviation, true);
    row("Sharpe Ratio:", p.sharpe_ratio, false);
    row("Beta:", p.beta, false);
    row("Alpha:", p.alpha, true);
    row("VaR (95%):", p.value_at_risk, true);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
