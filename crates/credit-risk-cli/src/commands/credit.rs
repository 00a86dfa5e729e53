use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use std::time::Instant;

use credit_risk_core::credit::altman;
use credit_risk_core::credit::profile;
use credit_risk_core::credit::ratios;
use credit_risk_core::credit::statement::FinancialStatement;
use credit_risk_core::{with_metadata, AnalysisConfig};

use crate::input;

/// One company's statement, from a file, stdin or individual flags
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct StatementArgs {
    /// Path to JSON statement file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Ticker symbol
    #[arg(long, default_value = "UNKNOWN")]
    pub ticker: String,

    /// Total assets
    #[arg(long)]
    pub total_assets: Option<Decimal>,

    /// Current assets
    #[arg(long)]
    pub current_assets: Option<Decimal>,

    /// Current liabilities
    #[arg(long)]
    pub current_liabilities: Option<Decimal>,

    /// Total liabilities
    #[arg(long)]
    pub total_liabilities: Option<Decimal>,

    /// Total debt
    #[arg(long)]
    pub total_debt: Option<Decimal>,

    /// Total shareholders' equity
    #[arg(long)]
    pub total_equity: Option<Decimal>,

    /// Retained earnings
    #[arg(long)]
    pub retained_earnings: Option<Decimal>,

    /// Revenue
    #[arg(long, alias = "sales")]
    pub revenue: Option<Decimal>,

    /// EBIT
    #[arg(long)]
    pub ebit: Option<Decimal>,

    /// Net income
    #[arg(long)]
    pub net_income: Option<Decimal>,

    /// Interest expense
    #[arg(long)]
    pub interest_expense: Option<Decimal>,

    /// Market capitalisation
    #[arg(long)]
    pub market_cap: Option<Decimal>,

    /// Inventory
    #[arg(long)]
    pub inventory: Option<Decimal>,
}

/// Arguments for commands that also take an analysis config
#[derive(Args)]
pub struct AssessArgs {
    #[command(flatten)]
    pub statement: StatementArgs,

    /// Path to YAML or JSON analysis config
    #[arg(long)]
    pub config: Option<String>,
}

impl StatementArgs {
    fn load(self) -> Result<FinancialStatement, Box<dyn std::error::Error>> {
        if let Some(ref path) = self.input {
            return input::file::read_json(path);
        }
        if let Some(statement) = input::stdin::read_stdin()? {
            return Ok(statement);
        }

        let statement = FinancialStatement {
            ticker: self.ticker,
            period_end: None,
            total_assets: self.total_assets,
            current_assets: self.current_assets,
            current_liabilities: self.current_liabilities,
            total_liabilities: self.total_liabilities,
            total_debt: self.total_debt,
            total_equity: self.total_equity,
            retained_earnings: self.retained_earnings,
            revenue: self.revenue,
            ebit: self.ebit,
            net_income: self.net_income,
            interest_expense: self.interest_expense,
            market_cap: self.market_cap,
            inventory: self.inventory,
        };
        if statement.is_empty() {
            return Err("no statement given (use --input, stdin, or line item flags)".into());
        }
        Ok(statement)
    }
}

pub fn run_ratios(args: StatementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let start = Instant::now();
    let statement = args.load()?;
    let set = ratios::calculate_ratios(&statement);

    let warnings: Vec<String> = set
        .undefined()
        .iter()
        .map(|(name, reason)| format!("{name} undefined: {reason}"))
        .collect();
    let missing: Vec<&str> = statement
        .missing_fields()
        .iter()
        .map(|item| item.as_str())
        .collect();

    let output = with_metadata(
        "Financial ratios from a single statement",
        &serde_json::json!({ "missing_fields": missing }),
        warnings,
        start.elapsed().as_micros() as u64,
        serde_json::json!({ "ticker": statement.ticker, "ratios": set }),
    );
    Ok(serde_json::to_value(output)?)
}

pub fn run_zscore(args: AssessArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let statement = args.statement.load()?;
    let result = altman::calculate_altman_zscore(&statement, &config.zscore)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_score(args: AssessArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let config = load_config(args.config.as_deref())?;
    let statement = args.statement.load()?;
    let result = profile::analyze_company(&statement, &config)?;
    Ok(serde_json::to_value(result)?)
}

pub fn load_config(path: Option<&str>) -> Result<AnalysisConfig, Box<dyn std::error::Error>> {
    let config: AnalysisConfig = match path {
        Some(path) => {
            tracing::debug!(path, "loading analysis config");
            input::file::read_config(path)?
        }
        None => AnalysisConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
