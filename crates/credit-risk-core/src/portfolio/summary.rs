use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ranking::Portfolio;
use crate::credit::altman::ZScoreZone;
use crate::credit::scoring::RiskCategory;
use crate::types::*;

/// Portfolio-level statistics over every profile, ranked or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub companies: usize,
    pub scored: usize,
    pub flagged: usize,
    /// Mean Z-Score over profiles that have one; `None` if the sum overflows.
    pub average_zscore: Option<Decimal>,
    /// Median composite score over ranked profiles.
    pub median_score: Option<Score>,
    pub zone_counts: BTreeMap<ZScoreZone, usize>,
    pub category_counts: BTreeMap<RiskCategory, usize>,
}

pub fn summarize(portfolio: &Portfolio) -> PortfolioSummary {
    let all: Vec<_> = portfolio
        .ranked
        .iter()
        .chain(portfolio.unscored.iter())
        .collect();

    let zscores: Vec<Decimal> = all
        .iter()
        .filter_map(|p| p.zscore.as_ref().map(|z| z.score))
        .collect();
    let average_zscore = mean(&zscores);

    let mut scores: Vec<Score> = portfolio.ranked.iter().filter_map(|p| p.score()).collect();
    scores.sort();
    let median_score = median(&scores);

    let mut zone_counts = BTreeMap::new();
    for zone in all.iter().filter_map(|p| p.zone()) {
        *zone_counts.entry(zone).or_insert(0) += 1;
    }

    let mut category_counts = BTreeMap::new();
    for category in all.iter().filter_map(|p| p.risk_category) {
        *category_counts.entry(category).or_insert(0) += 1;
    }

    PortfolioSummary {
        companies: all.len(),
        scored: portfolio.ranked.len(),
        flagged: portfolio.flagged().count(),
        average_zscore,
        median_score,
        zone_counts,
        category_counts,
    }
}

/// `None` for an empty slice or when the sum overflows.
fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    let total = values
        .iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(*v))?;
    total.checked_div(Decimal::from(values.len()))
}

/// Median of already-sorted values.
fn median(sorted: &[Decimal]) -> Option<Decimal> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        let (a, b) = (sorted[n / 2 - 1], sorted[n / 2]);
        match a.checked_add(b) {
            Some(sum) => Some(sum / Decimal::TWO),
            None => (a / Decimal::TWO).checked_add(b / Decimal::TWO),
        }
    }
}
