mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::calculators::{BaselineArgs, CategorizeArgs, CostsArgs, RoiArgs, UpliftArgs};
use commands::performance::{EvaluateArgs, PerformanceArgs};
use commands::scenarios::{ScenariosArgs, SensitivityArgs};

/// Trade promotion performance analysis
#[derive(Parser)]
#[command(
    name = "tpm",
    version,
    about = "Trade promotion performance analysis",
    long_about = "A CLI for measuring trade promotion performance with decimal precision. \
                  Supports baseline estimation, uplift, trade-spend aggregation, ROI, \
                  categorisation, the full performance pipeline, what-if scenarios and \
                  sensitivity analysis."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Engine configuration file (JSON or YAML)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log pipeline stages to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate the pre-promotion baseline
    Baseline(BaselineArgs),
    /// Compare promoted actuals against a baseline
    Uplift(UpliftArgs),
    /// Aggregate trade-spend into a cost breakdown
    Costs(CostsArgs),
    /// Calculate promotion ROI and profitability
    Roi(RoiArgs),
    /// Band an ROI and/or lift figure
    Categorize(CategorizeArgs),
    /// Run the full baseline/uplift/cost/ROI pipeline
    Performance(PerformanceArgs),
    /// Evaluate a promotion against a stored sales dataset
    Evaluate(EvaluateArgs),
    /// Compare what-if promotion scenarios
    Scenarios(ScenariosArgs),
    /// Sweep scenario parameters over a 1- or 2-way grid
    Sensitivity(SensitivityArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match input::file::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Baseline(args) => commands::calculators::run_baseline(args, &config),
        Commands::Uplift(args) => commands::calculators::run_uplift(args),
        Commands::Costs(args) => commands::calculators::run_costs(args),
        Commands::Roi(args) => commands::calculators::run_roi(args),
        Commands::Categorize(args) => commands::calculators::run_categorize(args),
        Commands::Performance(args) => commands::performance::run_performance(args, &config),
        Commands::Evaluate(args) => commands::performance::run_evaluate(args, &config),
        Commands::Scenarios(args) => commands::scenarios::run_scenarios(args, &config),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args, &config),
        Commands::Version => {
            println!("tpm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
