use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use credit_risk_core::credit::statement::FinancialStatement;
use credit_risk_core::credit::{altman, profile, ratios};
use credit_risk_core::{source, AnalysisConfig};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[derive(Deserialize)]
struct CompanyInput {
    statement: FinancialStatement,
    #[serde(default)]
    config: AnalysisConfig,
}

#[derive(Deserialize)]
struct PortfolioInput {
    statements: Vec<FinancialStatement>,
    #[serde(default)]
    config: AnalysisConfig,
}

// ---------------------------------------------------------------------------
// Single company
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_ratios(statement_json: String) -> NapiResult<String> {
    let statement: FinancialStatement =
        serde_json::from_str(&statement_json).map_err(to_napi_error)?;
    let output = ratios::calculate_ratios(&statement);
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn altman_zscore(input_json: String) -> NapiResult<String> {
    let input: CompanyInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    input.config.validate().map_err(to_napi_error)?;
    let output = altman::calculate_altman_zscore(&input.statement, &input.config.zscore)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn score_company(input_json: String) -> NapiResult<String> {
    let input: CompanyInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        profile::analyze_company(&input.statement, &input.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_portfolio(input_json: String) -> NapiResult<String> {
    let input: PortfolioInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        source::analyze_portfolio(input.statements, &input.config).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
