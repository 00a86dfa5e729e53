use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::ratios::{calculate_ratios, RatioName, RatioSet};
use super::statement::FinancialStatement;
use crate::{types::*, CreditRiskError, CreditRiskResult};

// ---------------------------------------------------------------------------
// Input / Output types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ZScoreZone {
    Safe,
    Grey,
    Distress,
}

impl std::fmt::Display for ZScoreZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "Safe"),
            Self::Grey => write!(f, "Grey"),
            Self::Distress => write!(f, "Distress"),
        }
    }
}

/// Zone thresholds and the optional cap on the market-equity term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZScoreConfig {
    /// Scores strictly above this are Safe.
    pub safe_above: Decimal,
    /// Scores strictly below this are Distress.
    pub distress_below: Decimal,
    /// Upper bound applied to market equity / total liabilities before
    /// weighting. `None` keeps the textbook formula.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub market_equity_cap: Option<Decimal>,
}

impl Default for ZScoreConfig {
    fn default() -> Self {
        Self {
            safe_above: Z_SAFE,
            distress_below: Z_DISTRESS,
            market_equity_cap: None,
        }
    }
}

impl ZScoreConfig {
    pub fn validate(&self) -> CreditRiskResult<()> {
        if self.distress_below > self.safe_above {
            return Err(CreditRiskError::InvalidInput {
                field: "zscore.distress_below".into(),
                reason: "Distress threshold cannot exceed the safe threshold.".into(),
            });
        }
        if let Some(cap) = self.market_equity_cap {
            if cap <= Decimal::ZERO {
                return Err(CreditRiskError::InvalidInput {
                    field: "zscore.market_equity_cap".into(),
                    reason: "Cap must be positive.".into(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreResult {
    pub score: Decimal,
    pub zone: ZScoreZone,
    pub components: Vec<ZScoreComponent>,
    /// (distress_upper_bound, safe_lower_bound)
    pub zone_thresholds: (Decimal, Decimal),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreComponent {
    pub name: String,
    pub ratio: Decimal,
    pub coefficient: Decimal,
    pub weighted_value: Decimal,
}

// ---------------------------------------------------------------------------
// Coefficients
// ---------------------------------------------------------------------------

// Original Z-Score (public manufacturing)
const Z_COEFF_X1: Decimal = dec!(1.2);
const Z_COEFF_X2: Decimal = dec!(1.4);
const Z_COEFF_X3: Decimal = dec!(3.3);
const Z_COEFF_X4: Decimal = dec!(0.6);
const Z_COEFF_X5: Decimal = dec!(1.0);

// Zone thresholds
const Z_SAFE: Decimal = dec!(2.99);
const Z_DISTRESS: Decimal = dec!(1.81);

const COMPONENTS: [(&str, RatioName, Decimal); 5] = [
    (
        "X1: Working Capital / Total Assets",
        RatioName::WorkingCapitalToAssets,
        Z_COEFF_X1,
    ),
    (
        "X2: Retained Earnings / Total Assets",
        RatioName::RetainedEarningsToAssets,
        Z_COEFF_X2,
    ),
    ("X3: EBIT / Total Assets", RatioName::EbitToAssets, Z_COEFF_X3),
    (
        "X4: Market Cap / Total Liabilities",
        RatioName::MarketEquityToLiabilities,
        Z_COEFF_X4,
    ),
    ("X5: Revenue / Total Assets", RatioName::SalesToAssets, Z_COEFF_X5),
];

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute the original Altman Z-Score from a ratio set.
///
/// `Z = 1.2*X1 + 1.4*X2 + 3.3*X3 + 0.6*X4 + 1.0*X5`
///
/// Fails if any of the five sub-ratios is undefined; no default is ever
/// substituted for a missing component.
pub fn calculate_zscore(ratios: &RatioSet, config: &ZScoreConfig) -> CreditRiskResult<ZScoreResult> {
    let mut components = Vec::with_capacity(COMPONENTS.len());
    let mut score = Decimal::ZERO;

    for (label, name, coefficient) in COMPONENTS {
        let mut ratio = ratios.require(name)?;
        if name == RatioName::MarketEquityToLiabilities {
            if let Some(cap) = config.market_equity_cap {
                ratio = ratio.min(cap);
            }
        }
        let component = build_component(label, ratio, coefficient)?;
        score = score
            .checked_add(component.weighted_value)
            .ok_or_else(|| overflow("Z-Score sum"))?;
        components.push(component);
    }

    Ok(ZScoreResult {
        score,
        zone: classify_zone(score, config),
        components,
        zone_thresholds: (config.distress_below, config.safe_above),
    })
}

/// Compute ratios for a statement and then its Z-Score, wrapped in the
/// standard output envelope.
pub fn calculate_altman_zscore(
    statement: &FinancialStatement,
    config: &ZScoreConfig,
) -> CreditRiskResult<ComputationOutput<ZScoreResult>> {
    let start = Instant::now();
    config.validate()?;

    let ratios = calculate_ratios(statement);
    let result = calculate_zscore(&ratios, config)?;

    let mut warnings = Vec::new();
    if let (Some(cap), Some(x4)) = (
        config.market_equity_cap,
        ratios.value(RatioName::MarketEquityToLiabilities),
    ) {
        if x4 > cap {
            warnings.push(format!(
                "Market equity / total liabilities {x4} capped at {cap}."
            ));
        }
    }

    let elapsed = start.elapsed().as_micros() as u64;
    let assumptions = serde_json::json!({
        "methodology": "Altman Z-Score bankruptcy prediction",
        "original_z": "Z = 1.2*X1 + 1.4*X2 + 3.3*X3 + 0.6*X4 + 1.0*X5",
        "zones": format!(
            "Safe > {}, Grey {}..={}, Distress < {}",
            config.safe_above, config.distress_below, config.safe_above, config.distress_below
        ),
        "market_equity_cap": config.market_equity_cap,
    });

    Ok(with_metadata(
        "Altman Z-Score (original public-company model)",
        &assumptions,
        warnings,
        elapsed,
        result,
    ))
}

/// Safe above the safe threshold, Distress below the distress threshold,
/// Grey in between with both bounds inclusive.
pub fn classify_zone(score: Decimal, config: &ZScoreConfig) -> ZScoreZone {
    if score > config.safe_above {
        ZScoreZone::Safe
    } else if score < config.distress_below {
        ZScoreZone::Distress
    } else {
        ZScoreZone::Grey
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn build_component(
    name: &str,
    ratio: Decimal,
    coefficient: Decimal,
) -> CreditRiskResult<ZScoreComponent> {
    let weighted_value = coefficient
        .checked_mul(ratio)
        .ok_or_else(|| overflow(name))?;
    Ok(ZScoreComponent {
        name: name.to_string(),
        ratio,
        coefficient,
        weighted_value,
    })
}

fn overflow(context: &str) -> CreditRiskError {
    CreditRiskError::UndefinedRatio {
        ratio: "z_score".into(),
        reason: format!("arithmetic overflow in {context}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
