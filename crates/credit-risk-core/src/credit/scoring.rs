//! Composite credit risk score.
//!
//! Each component (the Z-Score or a single ratio) is scaled onto [0, 1]
//! against a fixed reference range, weighted, and summed onto a 0-100 scale
//! (higher is safer). Components whose input is undefined drop out and the
//! remaining weights are renormalized, so missing data is never read as
//! either worst or best case.
//!
//! Default components:
//! - **Z-Score** (40) -- 0 maps to 0, 4.0 or above maps to 1.
//! - **Interest coverage** (25) -- 0x maps to 0, 12.5x or above maps to 1.
//! - **Debt / equity** (20) -- 4.0x or above maps to 0, 0x maps to 1;
//!   negative D/E (negative equity) maps to 0.
//! - **Return on assets** (15) -- 0% maps to 0, 15% or above maps to 1.
//!
//! Classification:
//! - >= 70: Low risk
//! - >= 40: Moderate risk
//! - < 40: High risk

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::altman::ZScoreResult;
use super::ratios::{RatioName, RatioSet};
use crate::{types::*, CreditRiskError, CreditRiskResult};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMetric {
    ZScore,
    Ratio(RatioName),
}

/// Values at or beyond `worst` normalize to 0, at or beyond `best` to 1.
/// `best` may be below `worst` for ratios where lower is safer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRange {
    pub worst: Decimal,
    pub best: Decimal,
}

impl ReferenceRange {
    pub const fn new(worst: Decimal, best: Decimal) -> Self {
        Self { worst, best }
    }

    pub fn normalize(&self, value: Decimal) -> Decimal {
        if self.worst == self.best {
            return if value >= self.best {
                Decimal::ONE
            } else {
                Decimal::ZERO
            };
        }
        let (lo, hi) = if self.worst < self.best {
            (self.worst, self.best)
        } else {
            (self.best, self.worst)
        };
        let bounded = clamp_decimal(value, lo, hi);
        let normalized = match self.best.checked_sub(self.worst) {
            Some(span) => (bounded - self.worst) / span,
            // Span wider than Decimal::MAX: scale everything down first.
            None => {
                let quarter = |d: Decimal| d / dec!(4);
                (quarter(bounded) - quarter(self.worst))
                    / (quarter(self.best) - quarter(self.worst))
            }
        };
        clamp_decimal(normalized, Decimal::ZERO, Decimal::ONE)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringComponent {
    pub name: String,
    pub metric: ScoreMetric,
    pub weight: Decimal,
    pub range: ReferenceRange,
    /// Negative inputs normalize to 0 regardless of the range.
    #[serde(default)]
    pub negative_is_worst: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub components: Vec<ScoringComponent>,
    /// Scores at or above this are Low risk.
    pub low_risk_min: Score,
    /// Scores at or above this (and below `low_risk_min`) are Moderate risk.
    pub moderate_risk_min: Score,
    /// Share of total weight that must be backed by data before a score is
    /// trusted; below it the company is flagged.
    pub min_coverage: Rate,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            components: default_components(),
            low_risk_min: LOW_RISK_MIN,
            moderate_risk_min: MODERATE_RISK_MIN,
            min_coverage: DEFAULT_MIN_COVERAGE,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> CreditRiskResult<()> {
        if self.components.is_empty() {
            return Err(CreditRiskError::InvalidInput {
                field: "scoring.components".into(),
                reason: "At least one scoring component is required.".into(),
            });
        }
        for c in &self.components {
            if c.weight <= Decimal::ZERO || c.weight > MAX_WEIGHT {
                return Err(CreditRiskError::InvalidInput {
                    field: format!("scoring.components.{}.weight", c.name),
                    reason: format!("Weights must be positive and at most {MAX_WEIGHT}."),
                });
            }
            if c.range.worst.abs() > MAX_RANGE_BOUND || c.range.best.abs() > MAX_RANGE_BOUND {
                return Err(CreditRiskError::InvalidInput {
                    field: format!("scoring.components.{}.range", c.name),
                    reason: format!("Reference range bounds must lie within +/-{MAX_RANGE_BOUND}."),
                });
            }
            if c.range.worst == c.range.best {
                return Err(CreditRiskError::InvalidInput {
                    field: format!("scoring.components.{}.range", c.name),
                    reason: "Reference range cannot be empty.".into(),
                });
            }
        }
        if self.moderate_risk_min > self.low_risk_min {
            return Err(CreditRiskError::InvalidInput {
                field: "scoring.moderate_risk_min".into(),
                reason: "Moderate threshold cannot exceed the low-risk threshold.".into(),
            });
        }
        if self.moderate_risk_min < Decimal::ZERO || self.low_risk_min > MAX_SCORE {
            return Err(CreditRiskError::InvalidInput {
                field: "scoring.low_risk_min".into(),
                reason: "Thresholds must lie within [0, 100].".into(),
            });
        }
        if self.min_coverage < Decimal::ZERO || self.min_coverage > Decimal::ONE {
            return Err(CreditRiskError::InvalidInput {
                field: "scoring.min_coverage".into(),
                reason: "Must be in [0, 1].".into(),
            });
        }
        Ok(())
    }

    /// `None` if the weights overflow when summed.
    pub fn total_weight(&self) -> Option<Decimal> {
        checked_sum(self.components.iter().map(|c| c.weight))
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskCategory {
    Low,
    Moderate,
    High,
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low Risk"),
            Self::Moderate => write!(f, "Moderate Risk"),
            Self::High => write!(f, "High Risk"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentScore {
    pub name: String,
    pub weight: Decimal,
    /// Input value; `None` when the component was excluded.
    pub value: Option<Decimal>,
    /// Value scaled onto [0, 1].
    pub normalized: Option<Decimal>,
    /// Points contributed to the final 0-100 score after renormalization.
    pub points: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeScore {
    pub score: Score,
    /// Available weight / total weight.
    pub coverage: Rate,
    pub components: Vec<ComponentScore>,
}

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const MAX_SCORE: Decimal = dec!(100);
const LOW_RISK_MIN: Decimal = dec!(70);
const MODERATE_RISK_MIN: Decimal = dec!(40);
const DEFAULT_MIN_COVERAGE: Decimal = dec!(0.5);
const MAX_WEIGHT: Decimal = dec!(1_000_000);
const MAX_RANGE_BOUND: Decimal = dec!(1_000_000_000_000);

fn default_components() -> Vec<ScoringComponent> {
    vec![
        ScoringComponent {
            name: "altman_z".into(),
            metric: ScoreMetric::ZScore,
            weight: dec!(40),
            range: ReferenceRange::new(Decimal::ZERO, dec!(4.0)),
            negative_is_worst: false,
        },
        ScoringComponent {
            name: "interest_coverage".into(),
            metric: ScoreMetric::Ratio(RatioName::InterestCoverage),
            weight: dec!(25),
            range: ReferenceRange::new(Decimal::ZERO, dec!(12.5)),
            negative_is_worst: false,
        },
        ScoringComponent {
            name: "debt_to_equity".into(),
            metric: ScoreMetric::Ratio(RatioName::DebtToEquity),
            weight: dec!(20),
            range: ReferenceRange::new(dec!(4.0), Decimal::ZERO),
            negative_is_worst: true,
        },
        ScoringComponent {
            name: "return_on_assets".into(),
            metric: ScoreMetric::Ratio(RatioName::ReturnOnAssets),
            weight: dec!(15),
            range: ReferenceRange::new(Decimal::ZERO, dec!(0.15)),
            negative_is_worst: false,
        },
    ]
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Combine ratios and the Z-Score into a 0-100 composite.
///
/// Returns `None` when not a single component has a defined input, or when
/// an unvalidated config carries weights too large to sum.
pub fn calculate_composite_score(
    ratios: &RatioSet,
    zscore: Option<&ZScoreResult>,
    config: &ScoringConfig,
) -> Option<CompositeScore> {
    let Some(total_weight) = config.total_weight() else {
        tracing::warn!("scoring weights overflow, no composite score");
        return None;
    };

    let normalized: Vec<(&ScoringComponent, Option<Decimal>, Option<Decimal>)> = config
        .components
        .iter()
        .map(|c| {
            let value = match c.metric {
                ScoreMetric::ZScore => zscore.map(|z| z.score),
                ScoreMetric::Ratio(name) => ratios.value(name),
            };
            let norm = value.map(|v| normalize_component(c, v));
            (c, value, norm)
        })
        .collect();

    let available_weight = checked_sum(
        normalized
            .iter()
            .filter(|(_, _, n)| n.is_some())
            .map(|(c, _, _)| c.weight),
    )?;

    if available_weight <= Decimal::ZERO {
        return None;
    }

    let components: Vec<ComponentScore> = normalized
        .into_iter()
        .map(|(c, value, norm)| ComponentScore {
            name: c.name.clone(),
            weight: c.weight,
            value,
            normalized: norm,
            points: norm.map(|n| c.weight * n / available_weight * MAX_SCORE),
        })
        .collect();

    let raw: Decimal = components.iter().filter_map(|c| c.points).sum();
    let score = clamp_decimal(raw, Decimal::ZERO, MAX_SCORE);

    let coverage = if total_weight.is_zero() {
        Decimal::ZERO
    } else {
        available_weight / total_weight
    };

    Some(CompositeScore {
        score,
        coverage,
        components,
    })
}

/// Map a composite score onto a risk category.
pub fn classify_risk(score: Score, config: &ScoringConfig) -> RiskCategory {
    if score >= config.low_risk_min {
        RiskCategory::Low
    } else if score >= config.moderate_risk_min {
        RiskCategory::Moderate
    } else {
        RiskCategory::High
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn checked_sum(values: impl Iterator<Item = Decimal>) -> Option<Decimal> {
    values.fold(Some(Decimal::ZERO), |acc, v| acc?.checked_add(v))
}

fn normalize_component(component: &ScoringComponent, value: Decimal) -> Decimal {
    if component.negative_is_worst && value < Decimal::ZERO {
        return Decimal::ZERO;
    }
    component.range.normalize(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
