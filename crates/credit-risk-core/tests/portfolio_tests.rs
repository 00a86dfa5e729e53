use credit_risk_core::credit::profile::assess_company;
use credit_risk_core::credit::statement::{FinancialStatement, LineItem};
use credit_risk_core::portfolio::ranking::rank_profiles;
use credit_risk_core::portfolio::summary::summarize;
use credit_risk_core::source::{analyze_portfolio, analyze_tickers, InMemorySource};
use credit_risk_core::{AnalysisConfig, CreditRiskError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Portfolio ranking over real pipeline output.
// Five companies that differ in profitability and leverage.
// ===========================================================================

fn company(ticker: &str, ebit: Decimal, debt: Decimal) -> FinancialStatement {
    FinancialStatement::empty(ticker)
        .with(LineItem::TotalAssets, dec!(10_000))
        .with(LineItem::CurrentAssets, dec!(3_000))
        .with(LineItem::CurrentLiabilities, dec!(2_000))
        .with(LineItem::TotalLiabilities, dec!(5_000))
        .with(LineItem::TotalDebt, debt)
        .with(LineItem::TotalEquity, dec!(5_000))
        .with(LineItem::RetainedEarnings, dec!(2_000))
        .with(LineItem::Revenue, dec!(12_000))
        .with(LineItem::Ebit, ebit)
        .with(LineItem::NetIncome, ebit * dec!(0.7))
        .with(LineItem::InterestExpense, dec!(100))
        .with(LineItem::MarketCap, dec!(9_000))
        .with(LineItem::Inventory, dec!(500))
}

fn five_companies() -> Vec<FinancialStatement> {
    vec![
        company("AAPL", dec!(1_500), dec!(1_000)),
        company("BAC", dec!(300), dec!(15_000)),
        company("MSFT", dec!(1_800), dec!(500)),
        company("TSLA", dec!(600), dec!(4_000)),
        company("WMT", dec!(900), dec!(2_500)),
    ]
}

#[test]
fn test_ranking_is_total_order() {
    let config = AnalysisConfig::default();
    let profiles = five_companies()
        .iter()
        .map(|s| assess_company(s, &config))
        .collect();
    let portfolio = rank_profiles(profiles);

    assert_eq!(portfolio.len(), 5);
    for pair in portfolio.ranked.windows(2) {
        let (a, b) = (pair[0].score().unwrap(), pair[1].score().unwrap());
        assert!(a > b || (a == b && pair[0].ticker < pair[1].ticker));
    }
}

#[test]
fn test_top_three_safest() {
    let config = AnalysisConfig::default();
    let profiles = five_companies()
        .iter()
        .map(|s| assess_company(s, &config))
        .collect();
    let portfolio = rank_profiles(profiles);

    let top = portfolio.safest(3);
    assert_eq!(top.len(), 3);
    let tickers: Vec<&str> = top.iter().map(|p| p.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["MSFT", "AAPL", "WMT"]);
    assert!(top[0].score() >= top[1].score());
    assert!(top[1].score() >= top[2].score());
}

#[test]
fn test_riskiest_two() {
    let out = analyze_portfolio(
        five_companies(),
        &AnalysisConfig {
            top_n: 2,
            ..AnalysisConfig::default()
        },
    )
    .unwrap();
    let tickers: Vec<&str> = out
        .result
        .riskiest
        .iter()
        .map(|p| p.ticker.as_str())
        .collect();
    assert_eq!(tickers, vec!["BAC", "TSLA"]);
    assert_eq!(out.result.safest.len(), 2);
}

#[test]
fn test_scores_clamped() {
    let out = analyze_portfolio(five_companies(), &AnalysisConfig::default()).unwrap();
    for p in out.result.portfolio.iter() {
        let s = p.score().unwrap();
        assert!(s >= Decimal::ZERO && s <= dec!(100), "{}: {}", p.ticker, s);
    }
}

#[test]
fn test_failed_fetch_is_flagged_not_ranked() {
    let source = InMemorySource::new(five_companies()).unwrap();
    let tickers: Vec<String> = ["AAPL", "GOOGL", "MSFT"]
        .iter()
        .map(|t| t.to_string())
        .collect();
    let portfolio = analyze_tickers(&source, &tickers, &AnalysisConfig::default()).unwrap();

    assert_eq!(portfolio.len(), 2);
    assert_eq!(portfolio.unscored.len(), 1);
    assert_eq!(portfolio.unscored[0].ticker, "GOOGL");

    let summary = summarize(&portfolio);
    assert_eq!(summary.companies, 3);
    assert_eq!(summary.scored, 2);
    assert_eq!(summary.flagged, 1);
}

#[test]
fn test_summary_over_five() {
    let out = analyze_portfolio(five_companies(), &AnalysisConfig::default()).unwrap();
    let summary = &out.result.summary;
    assert_eq!(summary.companies, 5);
    assert_eq!(summary.scored, 5);
    assert!(summary.average_zscore.is_some());
    assert!(summary.median_score.is_some());
    let zones: usize = summary.zone_counts.values().sum();
    assert_eq!(zones, 5);
    let categories: usize = summary.category_counts.values().sum();
    assert_eq!(categories, 5);
}

#[test]
fn test_analysis_output_json_shape() {
    let out = analyze_portfolio(five_companies(), &AnalysisConfig::default()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert_eq!(json["result"]["safest"].as_array().unwrap().len(), 3);
    assert_eq!(json["result"]["portfolio"]["ranked"][0]["ticker"], "MSFT");
    assert!(json["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_huge_market_caps_do_not_break_summary() {
    let big = |ticker: &str| {
        company(ticker, dec!(1_500), dec!(1_000))
            .with(LineItem::MarketCap, Decimal::from_i128_with_scale(7 * 10i128.pow(28), 0))
            .with(LineItem::TotalLiabilities, dec!(1))
    };
    let out = analyze_portfolio(vec![big("AAA"), big("BBB")], &AnalysisConfig::default()).unwrap();
    let summary = &out.result.summary;
    assert_eq!(out.result.portfolio.len(), 2);
    assert_eq!(summary.scored, 2);
    assert_eq!(summary.average_zscore, None);
    assert!(summary.median_score.is_some());
}

#[test]
fn test_duplicate_statements_rejected() {
    let mut statements = five_companies();
    statements.push(company("AAPL", dec!(200), dec!(9_000)));
    let err = analyze_portfolio(statements, &AnalysisConfig::default()).unwrap_err();
    assert!(matches!(err, CreditRiskError::InvalidInput { ref field, .. } if field == "ticker"));
}
