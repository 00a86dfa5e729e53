use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::credit::altman::ZScoreConfig;
use crate::credit::scoring::ScoringConfig;
use crate::{CreditRiskError, CreditRiskResult};

const DEFAULT_TOP_N: usize = 3;
const DEFAULT_MAX_UNDEFINED_RATIOS: usize = 6;

/// Everything a run needs, passed explicitly into each operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Ticker universe to fetch from a statement source.
    pub tickers: Vec<String>,
    /// How many companies to report as safest / riskiest.
    pub top_n: usize,
    /// A profile with more undefined ratios than this is flagged.
    pub max_undefined_ratios: usize,
    pub zscore: ZScoreConfig,
    pub scoring: ScoringConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            tickers: Vec::new(),
            top_n: DEFAULT_TOP_N,
            max_undefined_ratios: DEFAULT_MAX_UNDEFINED_RATIOS,
            zscore: ZScoreConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn with_tickers<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tickers: tickers.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CreditRiskResult<()> {
        if let Some(t) = self.tickers.iter().find(|t| t.trim().is_empty()) {
            return Err(CreditRiskError::InvalidInput {
                field: "tickers".into(),
                reason: format!("Blank ticker '{t}' in ticker list."),
            });
        }
        ensure_unique_tickers(self.tickers.iter().map(String::as_str), "tickers")?;
        self.zscore.validate()?;
        self.scoring.validate()
    }
}

/// Reject a ticker that appears more than once.
pub(crate) fn ensure_unique_tickers<'a>(
    tickers: impl IntoIterator<Item = &'a str>,
    field: &str,
) -> CreditRiskResult<()> {
    let mut seen = BTreeSet::new();
    for ticker in tickers {
        if !seen.insert(ticker) {
            return Err(CreditRiskError::InvalidInput {
                field: field.into(),
                reason: format!("Duplicate ticker '{ticker}'."),
            });
        }
    }
    Ok(())
}
