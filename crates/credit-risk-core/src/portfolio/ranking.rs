use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::credit::profile::RiskProfile;

/// Profiles ordered by descending composite score, ties broken by ticker.
///
/// Profiles without any score are kept apart in `unscored` rather than
/// being ranked with a default value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub ranked: Vec<RiskProfile>,
    pub unscored: Vec<RiskProfile>,
}

impl Portfolio {
    /// The `n` highest-scoring profiles, safest first.
    pub fn safest(&self, n: usize) -> &[RiskProfile] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// The `n` lowest-scoring profiles, riskiest first. Equal scores are
    /// ordered by ticker ascending.
    pub fn riskiest(&self, n: usize) -> Vec<&RiskProfile> {
        let mut bottom: Vec<&RiskProfile> = self.ranked.iter().collect();
        bottom.sort_by(|a, b| compare_ascending(a, b));
        bottom.truncate(n);
        bottom
    }

    /// Number of ranked profiles.
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Ranked and unscored profiles together.
    pub fn total(&self) -> usize {
        self.ranked.len() + self.unscored.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RiskProfile> {
        self.ranked.iter()
    }

    /// Every flagged profile, ranked ones first.
    pub fn flagged(&self) -> impl Iterator<Item = &RiskProfile> {
        self.ranked
            .iter()
            .chain(self.unscored.iter())
            .filter(|p| p.flagged)
    }
}

/// Sort profiles into a portfolio.
pub fn rank_profiles(profiles: Vec<RiskProfile>) -> Portfolio {
    let (mut ranked, mut unscored): (Vec<_>, Vec<_>) =
        profiles.into_iter().partition(|p| p.score().is_some());

    ranked.sort_by(compare_descending);
    unscored.sort_by(|a, b| a.ticker.cmp(&b.ticker));

    Portfolio { ranked, unscored }
}

fn compare_descending(a: &RiskProfile, b: &RiskProfile) -> Ordering {
    b.score()
        .cmp(&a.score())
        .then_with(|| a.ticker.cmp(&b.ticker))
}

fn compare_ascending(a: &RiskProfile, b: &RiskProfile) -> Ordering {
    a.score()
        .cmp(&b.score())
        .then_with(|| a.ticker.cmp(&b.ticker))
}
