mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use commands::credit::{AssessArgs, StatementArgs};
use commands::portfolio::AnalyzeArgs;

/// Credit risk scoring from financial statement ratios
#[derive(Parser)]
#[command(
    name = "crisk",
    version,
    about = "Credit risk scoring from financial statement ratios",
    long_about = "A CLI for assessing company credit risk with decimal precision. \
                  Computes financial ratios and the Altman Z-Score, blends them into \
                  a 0-100 composite score, and ranks a portfolio from safest to riskiest."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate liquidity, leverage, profitability and Altman ratios
    Ratios(StatementArgs),
    /// Calculate the Altman Z-Score and distress zone
    Zscore(AssessArgs),
    /// Full risk profile and composite score for one company
    Score(AssessArgs),
    /// Score and rank a portfolio of companies
    Analyze(AnalyzeArgs),
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

fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Ratios(args) => commands::credit::run_ratios(args),
        Commands::Zscore(args) => commands::credit::run_zscore(args),
        Commands::Score(args) => commands::credit::run_score(args),
        Commands::Analyze(args) => commands::portfolio::run_analyze(args),
        Commands::Version => {
            println!("crisk {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
