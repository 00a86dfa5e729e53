//! Statement sources and the end-to-end portfolio run.
//!
//! Fetching from a market-data provider happens outside this crate; a
//! source only has to hand back a statement per ticker, or nothing when the
//! fetch failed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Instant;

use crate::config::ensure_unique_tickers;
use crate::credit::profile::{assess_company, RiskProfile};
use crate::credit::statement::FinancialStatement;
use crate::portfolio::ranking::{rank_profiles, Portfolio};
use crate::portfolio::summary::{summarize, PortfolioSummary};
use crate::{types::*, AnalysisConfig, CreditRiskError, CreditRiskResult};

pub trait StatementSource {
    /// Latest statement for `ticker`, or `None` if it could not be obtained.
    fn fetch(&self, ticker: &str) -> Option<FinancialStatement>;
}

/// Statements held in memory, keyed by ticker.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    statements: HashMap<String, FinancialStatement>,
}

impl InMemorySource {
    /// One statement per ticker; a second statement for the same ticker is
    /// rejected instead of replacing the first.
    pub fn new(statements: Vec<FinancialStatement>) -> CreditRiskResult<Self> {
        ensure_unique_tickers(statements.iter().map(|s| s.ticker.as_str()), "ticker")?;
        Ok(Self {
            statements: statements
                .into_iter()
                .map(|s| (s.ticker.clone(), s))
                .collect(),
        })
    }

    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.statements.keys().cloned().collect();
        tickers.sort();
        tickers
    }
}

impl StatementSource for InMemorySource {
    fn fetch(&self, ticker: &str) -> Option<FinancialStatement> {
        self.statements.get(ticker).cloned()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioAnalysis {
    pub portfolio: Portfolio,
    pub summary: PortfolioSummary,
    pub safest: Vec<RiskProfile>,
    pub riskiest: Vec<RiskProfile>,
}

/// Assess every configured ticker. A ticker the source cannot supply is
/// assessed as an empty statement and ends up unscored and flagged.
pub fn analyze_tickers(
    source: &dyn StatementSource,
    tickers: &[String],
    config: &AnalysisConfig,
) -> CreditRiskResult<Portfolio> {
    config.validate()?;
    ensure_unique_tickers(tickers.iter().map(String::as_str), "tickers")?;

    let profiles: Vec<RiskProfile> = tickers
        .iter()
        .map(|ticker| {
            let statement = source.fetch(ticker).unwrap_or_else(|| {
                tracing::warn!(%ticker, "no statement available");
                FinancialStatement::empty(ticker.as_str())
            });
            assess_company(&statement, config)
        })
        .collect();

    let portfolio = rank_profiles(profiles);
    tracing::info!(
        ranked = portfolio.len(),
        unscored = portfolio.unscored.len(),
        "portfolio ranked"
    );
    Ok(portfolio)
}

/// Full run over a set of statements: ranking, summary and the configured
/// top/bottom selections. The ticker universe comes from the config when
/// it names one, otherwise from the statements themselves.
pub fn analyze_portfolio(
    statements: Vec<FinancialStatement>,
    config: &AnalysisConfig,
) -> CreditRiskResult<ComputationOutput<PortfolioAnalysis>> {
    let start = Instant::now();

    if statements.iter().any(|s| s.ticker.trim().is_empty()) {
        return Err(CreditRiskError::InvalidInput {
            field: "ticker".into(),
            reason: "Every statement needs a ticker.".into(),
        });
    }

    let source = InMemorySource::new(statements)?;
    let tickers = if config.tickers.is_empty() {
        source.tickers()
    } else {
        config.tickers.clone()
    };
    if tickers.is_empty() {
        return Err(CreditRiskError::InsufficientData(
            "No companies to analyze.".into(),
        ));
    }

    let portfolio = analyze_tickers(&source, &tickers, config)?;
    let summary = summarize(&portfolio);
    let safest = portfolio.safest(config.top_n).to_vec();
    let riskiest: Vec<RiskProfile> = portfolio
        .riskiest(config.top_n)
        .into_iter()
        .cloned()
        .collect();

    let warnings: Vec<String> = portfolio
        .flagged()
        .map(|p| format!("{}: flagged for insufficient data.", p.ticker))
        .collect();

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "tickers": tickers,
        "top_n": config.top_n,
        "ordering": "composite score descending, ticker ascending on ties",
        "unscored": "companies with no scorable component are listed separately",
    });

    Ok(with_metadata(
        "Credit risk portfolio ranking (Altman Z-Score and financial ratios)",
        &assumptions,
        warnings,
        elapsed,
        PortfolioAnalysis {
            portfolio,
            summary,
            safest,
            riskiest,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credit::statement::LineItem;
    use rust_decimal_macros::dec;

    fn statement(ticker: &str, ebit: rust_decimal::Decimal) -> FinancialStatement {
        FinancialStatement::empty(ticker)
            .with(LineItem::TotalAssets, dec!(1_000))
            .with(LineItem::CurrentAssets, dec!(400))
            .with(LineItem::CurrentLiabilities, dec!(200))
            .with(LineItem::TotalLiabilities, dec!(500))
            .with(LineItem::TotalDebt, dec!(300))
            .with(LineItem::TotalEquity, dec!(500))
            .with(LineItem::RetainedEarnings, dec!(100))
            .with(LineItem::Revenue, dec!(900))
            .with(LineItem::Ebit, ebit)
            .with(LineItem::NetIncome, ebit / dec!(2))
            .with(LineItem::InterestExpense, dec!(20))
            .with(LineItem::MarketCap, dec!(800))
    }

    #[test]
    fn test_missing_ticker_becomes_unscored() {
        let source = InMemorySource::new(vec![statement("AAA", dec!(100))]).unwrap();
        let tickers = vec!["AAA".to_string(), "MISSING".to_string()];
        let portfolio = analyze_tickers(&source, &tickers, &AnalysisConfig::default()).unwrap();
        assert_eq!(portfolio.len(), 1);
        assert_eq!(portfolio.unscored.len(), 1);
        assert_eq!(portfolio.unscored[0].ticker, "MISSING");
        assert!(portfolio.unscored[0].flagged);
    }

    #[test]
    fn test_analyze_portfolio_selections() {
        let statements = vec![
            statement("LOW", dec!(10)),
            statement("MID", dec!(60)),
            statement("TOP", dec!(150)),
            statement("HI", dec!(100)),
        ];
        let out = analyze_portfolio(statements, &AnalysisConfig::default()).unwrap();
        let analysis = &out.result;

        let safest: Vec<&str> = analysis.safest.iter().map(|p| p.ticker.as_str()).collect();
        assert_eq!(safest, vec!["TOP", "HI", "MID"]);
        let riskiest: Vec<&str> = analysis.riskiest.iter().map(|p| p.ticker.as_str()).collect();
        assert_eq!(riskiest, vec!["LOW", "MID", "HI"]);
        assert_eq!(analysis.summary.companies, 4);
    }

    #[test]
    fn test_config_tickers_restrict_universe() {
        let statements = vec![statement("AAA", dec!(100)), statement("BBB", dec!(50))];
        let config = AnalysisConfig::with_tickers(["BBB"]);
        let out = analyze_portfolio(statements, &config).unwrap();
        assert_eq!(out.result.portfolio.total(), 1);
        assert_eq!(out.result.portfolio.ranked[0].ticker, "BBB");
    }

    #[test]
    fn test_duplicate_statement_rejected() {
        let mut earlier = statement("AAA", dec!(80));
        earlier.period_end = chrono::NaiveDate::from_ymd_opt(2023, 12, 31);
        let statements = vec![earlier, statement("AAA", dec!(100))];
        match analyze_portfolio(statements, &AnalysisConfig::default()).unwrap_err() {
            CreditRiskError::InvalidInput { field, reason } => {
                assert_eq!(field, "ticker");
                assert!(reason.contains("AAA"));
            }
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_repeated_ticker_not_ranked_twice() {
        let source = InMemorySource::new(vec![statement("AAA", dec!(100))]).unwrap();
        let tickers = vec!["AAA".to_string(), "AAA".to_string()];
        let err = analyze_tickers(&source, &tickers, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, CreditRiskError::InvalidInput { .. }));

        let config = AnalysisConfig::with_tickers(["AAA", "AAA"]);
        let err = analyze_portfolio(vec![statement("AAA", dec!(100))], &config).unwrap_err();
        assert!(matches!(err, CreditRiskError::InvalidInput { .. }));
    }

    #[test]
    fn test_empty_input_rejected() {
        let err = analyze_portfolio(Vec::new(), &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, CreditRiskError::InsufficientData(_)));
    }
}
