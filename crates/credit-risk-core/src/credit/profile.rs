use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::altman::{calculate_zscore, ZScoreResult, ZScoreZone};
use super::ratios::{calculate_ratios, RatioSet};
use super::scoring::{calculate_composite_score, classify_risk, CompositeScore, RiskCategory};
use super::statement::FinancialStatement;
use crate::{types::*, AnalysisConfig, CreditRiskResult};

/// The full assessment of one company for one period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    pub ratios: RatioSet,
    pub zscore: Option<ZScoreResult>,
    pub composite: Option<CompositeScore>,
    pub risk_category: Option<RiskCategory>,
    /// Set when the score rests on too little data to be trusted.
    pub flagged: bool,
    pub warnings: Vec<String>,
}

impl RiskProfile {
    pub fn score(&self) -> Option<Score> {
        self.composite.as_ref().map(|c| c.score)
    }

    pub fn zone(&self) -> Option<ZScoreZone> {
        self.zscore.as_ref().map(|z| z.zone)
    }

    pub fn coverage(&self) -> Option<Rate> {
        self.composite.as_ref().map(|c| c.coverage)
    }
}

/// Run the ratio -> Z-Score -> composite -> category pipeline for one
/// company. Missing data degrades the profile; it never fails it.
pub fn assess_company(statement: &FinancialStatement, config: &AnalysisConfig) -> RiskProfile {
    let mut warnings = Vec::new();

    let ratios = calculate_ratios(statement);
    let undefined = ratios.undefined();
    for (name, reason) in &undefined {
        warnings.push(format!("{name} undefined: {reason}."));
    }

    let zscore = match calculate_zscore(&ratios, &config.zscore) {
        Ok(z) => {
            tracing::debug!(
                ticker = %statement.ticker,
                score = %z.score,
                zone = %z.zone,
                "z-score computed"
            );
            Some(z)
        }
        Err(e) => {
            warnings.push(format!("Z-Score undefined: {e}."));
            None
        }
    };

    let composite = calculate_composite_score(&ratios, zscore.as_ref(), &config.scoring);
    let risk_category = composite
        .as_ref()
        .map(|c| classify_risk(c.score, &config.scoring));

    let mut flagged = false;
    match &composite {
        None => {
            flagged = true;
            warnings.push("No scoring component has data; company is not ranked.".into());
        }
        Some(c) if c.coverage < config.scoring.min_coverage => {
            flagged = true;
            warnings.push(format!(
                "Score rests on {} of the scoring weight (minimum {}).",
                c.coverage.round_dp(4),
                config.scoring.min_coverage
            ));
        }
        Some(_) => {}
    }
    if undefined.len() > config.max_undefined_ratios {
        flagged = true;
        warnings.push(format!(
            "{} ratios undefined (maximum {}).",
            undefined.len(),
            config.max_undefined_ratios
        ));
    }

    if flagged {
        tracing::warn!(
            ticker = %statement.ticker,
            undefined = undefined.len(),
            "company flagged for insufficient data"
        );
    }

    RiskProfile {
        ticker: statement.ticker.clone(),
        period_end: statement.period_end,
        ratios,
        zscore,
        composite,
        risk_category,
        flagged,
        warnings,
    }
}

/// Assess one company and wrap the profile in the standard output envelope.
pub fn analyze_company(
    statement: &FinancialStatement,
    config: &AnalysisConfig,
) -> CreditRiskResult<ComputationOutput<RiskProfile>> {
    let start = Instant::now();
    config.validate()?;

    let profile = assess_company(statement, config);
    let warnings = profile.warnings.clone();

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "zscore": &config.zscore,
        "scoring": &config.scoring,
        "max_undefined_ratios": config.max_undefined_ratios,
        "missing_data": "undefined inputs are excluded and weights renormalized",
    });

    Ok(with_metadata(
        "Credit risk profile (financial ratios, Altman Z-Score, composite score)",
        &assumptions,
        warnings,
        elapsed,
        profile,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
