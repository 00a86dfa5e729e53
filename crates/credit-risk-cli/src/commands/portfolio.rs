use clap::Args;
use serde_json::Value;

use credit_risk_core::credit::statement::FinancialStatement;
use credit_risk_core::source;

use super::credit::load_config;
use crate::input;

/// Arguments for portfolio ranking
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON array of statements
    #[arg(long)]
    pub input: Option<String>,

    /// Path to YAML or JSON analysis config
    #[arg(long)]
    pub config: Option<String>,

    /// Number of safest and riskiest companies to report
    #[arg(long)]
    pub top: Option<usize>,

    /// Restrict the run to these tickers (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub tickers: Vec<String>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(top) = args.top {
        config.top_n = top;
    }
    if !args.tickers.is_empty() {
        config.tickers = args.tickers;
    }

    let statements: Vec<FinancialStatement> = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(statements) = input::stdin::read_stdin()? {
        statements
    } else {
        return Err("--input file is required for portfolio analysis".into());
    };

    tracing::debug!(companies = statements.len(), "statements loaded");
    let result = source::analyze_portfolio(statements, &config)?;
    Ok(serde_json::to_value(result)?)
}
