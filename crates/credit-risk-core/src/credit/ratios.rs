use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::statement::{FinancialStatement, LineItem};
use crate::{CreditRiskError, CreditRiskResult};

// ---------------------------------------------------------------------------
// Ratio names
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioCategory {
    Liquidity,
    Leverage,
    Profitability,
    Efficiency,
    Solvency,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioName {
    CurrentRatio,
    QuickRatio,
    /// Altman A
    WorkingCapitalToAssets,
    /// Altman B
    RetainedEarningsToAssets,
    /// Altman C
    EbitToAssets,
    /// Altman D
    MarketEquityToLiabilities,
    /// Altman E, also the asset turnover ratio
    SalesToAssets,
    DebtToEquity,
    DebtToAssets,
    InterestCoverage,
    ReturnOnAssets,
    ReturnOnEquity,
    NetProfitMargin,
}

impl RatioName {
    pub const ALL: [RatioName; 13] = [
        Self::CurrentRatio,
        Self::QuickRatio,
        Self::WorkingCapitalToAssets,
        Self::RetainedEarningsToAssets,
        Self::EbitToAssets,
        Self::MarketEquityToLiabilities,
        Self::SalesToAssets,
        Self::DebtToEquity,
        Self::DebtToAssets,
        Self::InterestCoverage,
        Self::ReturnOnAssets,
        Self::ReturnOnEquity,
        Self::NetProfitMargin,
    ];

    /// The five Altman sub-ratios in coefficient order (A..E).
    pub const ALTMAN: [RatioName; 5] = [
        Self::WorkingCapitalToAssets,
        Self::RetainedEarningsToAssets,
        Self::EbitToAssets,
        Self::MarketEquityToLiabilities,
        Self::SalesToAssets,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CurrentRatio => "current_ratio",
            Self::QuickRatio => "quick_ratio",
            Self::WorkingCapitalToAssets => "working_capital_to_assets",
            Self::RetainedEarningsToAssets => "retained_earnings_to_assets",
            Self::EbitToAssets => "ebit_to_assets",
            Self::MarketEquityToLiabilities => "market_equity_to_liabilities",
            Self::SalesToAssets => "sales_to_assets",
            Self::DebtToEquity => "debt_to_equity",
            Self::DebtToAssets => "debt_to_assets",
            Self::InterestCoverage => "interest_coverage",
            Self::ReturnOnAssets => "return_on_assets",
            Self::ReturnOnEquity => "return_on_equity",
            Self::NetProfitMargin => "net_profit_margin",
        }
    }

    pub fn category(&self) -> RatioCategory {
        match self {
            Self::CurrentRatio | Self::QuickRatio => RatioCategory::Liquidity,
            Self::DebtToEquity | Self::DebtToAssets | Self::InterestCoverage => {
                RatioCategory::Leverage
            }
            Self::ReturnOnAssets | Self::ReturnOnEquity | Self::NetProfitMargin => {
                RatioCategory::Profitability
            }
            Self::SalesToAssets => RatioCategory::Efficiency,
            Self::WorkingCapitalToAssets
            | Self::RetainedEarningsToAssets
            | Self::EbitToAssets
            | Self::MarketEquityToLiabilities => RatioCategory::Solvency,
        }
    }
}

impl std::fmt::Display for RatioName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Ratio values
// ---------------------------------------------------------------------------

/// Why a ratio could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "field", rename_all = "snake_case")]
pub enum UndefinedReason {
    MissingField(LineItem),
    ZeroDenominator(LineItem),
    NonPositiveDenominator(LineItem),
    Overflow,
    NotComputed,
}

impl std::fmt::Display for UndefinedReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(item) => write!(f, "{item} is missing"),
            Self::ZeroDenominator(item) => write!(f, "{item} is zero"),
            Self::NonPositiveDenominator(item) => write!(f, "{item} is not positive"),
            Self::Overflow => write!(f, "arithmetic overflow"),
            Self::NotComputed => write!(f, "not computed"),
        }
    }
}

/// A computed ratio or an explicit undefined marker. Decimal arithmetic has
/// no NaN or infinity, so a defined value is always finite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatioValue {
    Defined(Decimal),
    Undefined(UndefinedReason),
}

impl RatioValue {
    pub fn value(&self) -> Option<Decimal> {
        match self {
            Self::Defined(v) => Some(*v),
            Self::Undefined(_) => None,
        }
    }

    pub fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }
}

impl From<Result<Decimal, UndefinedReason>> for RatioValue {
    fn from(r: Result<Decimal, UndefinedReason>) -> Self {
        match r {
            Ok(v) => Self::Defined(v),
            Err(reason) => Self::Undefined(reason),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RatioSet {
    values: BTreeMap<RatioName, RatioValue>,
}

impl RatioSet {
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (RatioName, RatioValue)>,
    {
        Self {
            values: entries.into_iter().collect(),
        }
    }

    /// Build a set from defined values only; anything not listed is absent.
    pub fn from_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (RatioName, Decimal)>,
    {
        Self::from_entries(values.into_iter().map(|(n, v)| (n, RatioValue::Defined(v))))
    }

    pub fn get(&self, name: RatioName) -> RatioValue {
        self.values
            .get(&name)
            .copied()
            .unwrap_or(RatioValue::Undefined(UndefinedReason::NotComputed))
    }

    pub fn value(&self, name: RatioName) -> Option<Decimal> {
        self.get(name).value()
    }

    /// Required lookup: maps an undefined ratio into the error taxonomy.
    pub fn require(&self, name: RatioName) -> CreditRiskResult<Decimal> {
        match self.get(name) {
            RatioValue::Defined(v) => Ok(v),
            RatioValue::Undefined(UndefinedReason::MissingField(item)) => {
                Err(CreditRiskError::MissingField {
                    field: item.as_str().to_string(),
                })
            }
            RatioValue::Undefined(reason) => Err(CreditRiskError::UndefinedRatio {
                ratio: name.as_str().to_string(),
                reason: reason.to_string(),
            }),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (RatioName, RatioValue)> + '_ {
        self.values.iter().map(|(n, v)| (*n, *v))
    }

    pub fn defined_count(&self) -> usize {
        self.values.values().filter(|v| v.is_defined()).count()
    }

    pub fn undefined(&self) -> Vec<(RatioName, UndefinedReason)> {
        self.values
            .iter()
            .filter_map(|(n, v)| match v {
                RatioValue::Undefined(reason) => Some((*n, *reason)),
                RatioValue::Defined(_) => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Compute every ratio in [`RatioName::ALL`] from one statement.
///
/// A missing line item or a denominator that is zero (or non-positive for
/// balance-sheet totals) leaves the ratio undefined rather than failing.
pub fn calculate_ratios(statement: &FinancialStatement) -> RatioSet {
    let values = RatioName::ALL
        .iter()
        .map(|name| {
            let value = RatioValue::from(compute_ratio(statement, *name));
            if let RatioValue::Undefined(reason) = value {
                tracing::debug!(
                    ticker = %statement.ticker,
                    ratio = %name,
                    %reason,
                    "ratio undefined"
                );
            }
            (*name, value)
        })
        .collect();
    RatioSet { values }
}

/// Compute a single ratio.
pub fn compute_ratio(
    s: &FinancialStatement,
    name: RatioName,
) -> Result<Decimal, UndefinedReason> {
    use Denominator::{NonZero, Positive};
    use LineItem::*;

    match name {
        RatioName::CurrentRatio => {
            divide(field(s, CurrentAssets)?, s, CurrentLiabilities, Positive)
        }
        RatioName::QuickRatio => {
            let quick_assets = subtract(field(s, CurrentAssets)?, field(s, Inventory)?)?;
            divide(quick_assets, s, CurrentLiabilities, Positive)
        }
        RatioName::WorkingCapitalToAssets => {
            let working_capital =
                subtract(field(s, CurrentAssets)?, field(s, CurrentLiabilities)?)?;
            divide(working_capital, s, TotalAssets, Positive)
        }
        RatioName::RetainedEarningsToAssets => {
            divide(field(s, RetainedEarnings)?, s, TotalAssets, Positive)
        }
        RatioName::EbitToAssets => divide(field(s, Ebit)?, s, TotalAssets, Positive),
        RatioName::MarketEquityToLiabilities => {
            divide(field(s, MarketCap)?, s, TotalLiabilities, Positive)
        }
        RatioName::SalesToAssets => divide(field(s, Revenue)?, s, TotalAssets, Positive),
        // Negative equity yields a negative ratio; the scorer treats it as worst case.
        RatioName::DebtToEquity => divide(field(s, TotalDebt)?, s, TotalEquity, NonZero),
        RatioName::DebtToAssets => divide(field(s, TotalDebt)?, s, TotalAssets, Positive),
        RatioName::InterestCoverage => {
            let ebit = field(s, Ebit)?;
            // Providers report interest expense with either sign.
            let interest = field(s, InterestExpense)?.abs();
            check_denominator(interest, InterestExpense, NonZero)?;
            ebit.checked_div(interest).ok_or(UndefinedReason::Overflow)
        }
        RatioName::ReturnOnAssets => divide(field(s, NetIncome)?, s, TotalAssets, Positive),
        RatioName::ReturnOnEquity => divide(field(s, NetIncome)?, s, TotalEquity, Positive),
        RatioName::NetProfitMargin => divide(field(s, NetIncome)?, s, Revenue, Positive),
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum Denominator {
    NonZero,
    Positive,
}

fn field(s: &FinancialStatement, item: LineItem) -> Result<Decimal, UndefinedReason> {
    s.field(item).ok_or(UndefinedReason::MissingField(item))
}

fn subtract(a: Decimal, b: Decimal) -> Result<Decimal, UndefinedReason> {
    a.checked_sub(b).ok_or(UndefinedReason::Overflow)
}

fn check_denominator(
    value: Decimal,
    item: LineItem,
    rule: Denominator,
) -> Result<(), UndefinedReason> {
    if value.is_zero() {
        return Err(UndefinedReason::ZeroDenominator(item));
    }
    if matches!(rule, Denominator::Positive) && value.is_sign_negative() {
        return Err(UndefinedReason::NonPositiveDenominator(item));
    }
    Ok(())
}

fn divide(
    numerator: Decimal,
    s: &FinancialStatement,
    item: LineItem,
    rule: Denominator,
) -> Result<Decimal, UndefinedReason> {
    let denominator = field(s, item)?;
    check_denominator(denominator, item, rule)?;
    numerator
        .checked_div(denominator)
        .ok_or(UndefinedReason::Overflow)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn full_statement() -> FinancialStatement {
        FinancialStatement {
            ticker: "ACME".into(),
            period_end: None,
            total_assets: Some(dec!(1_000_000)),
            current_assets: Some(dec!(400_000)),
            current_liabilities: Some(dec!(200_000)),
            total_liabilities: Some(dec!(500_000)),
            total_debt: Some(dec!(300_000)),
            total_equity: Some(dec!(500_000)),
            retained_earnings: Some(dec!(250_000)),
            revenue: Some(dec!(1_200_000)),
            ebit: Some(dec!(150_000)),
            net_income: Some(dec!(100_000)),
            interest_expense: Some(dec!(-30_000)),
            market_cap: Some(dec!(1_500_000)),
            inventory: Some(dec!(100_000)),
        }
    }

    #[test]
    fn test_current_ratio_example() {
        let statement = FinancialStatement::empty("X")
            .with(LineItem::CurrentAssets, dec!(200))
            .with(LineItem::CurrentLiabilities, dec!(100));
        let ratios = calculate_ratios(&statement);
        assert_eq!(ratios.value(RatioName::CurrentRatio), Some(dec!(2.0)));
    }

    #[test]
    fn test_all_ratios_defined_for_full_statement() {
        let ratios = calculate_ratios(&full_statement());
        assert_eq!(ratios.len(), RatioName::ALL.len());
        assert_eq!(ratios.defined_count(), RatioName::ALL.len());
        assert!(ratios.undefined().is_empty());
    }

    #[test]
    fn test_ratio_formulas() {
        let r = calculate_ratios(&full_statement());
        assert_eq!(r.value(RatioName::CurrentRatio), Some(dec!(2)));
        // (400k - 100k) / 200k
        assert_eq!(r.value(RatioName::QuickRatio), Some(dec!(1.5)));
        // (400k - 200k) / 1M
        assert_eq!(r.value(RatioName::WorkingCapitalToAssets), Some(dec!(0.2)));
        assert_eq!(r.value(RatioName::RetainedEarningsToAssets), Some(dec!(0.25)));
        assert_eq!(r.value(RatioName::EbitToAssets), Some(dec!(0.15)));
        assert_eq!(r.value(RatioName::MarketEquityToLiabilities), Some(dec!(3)));
        assert_eq!(r.value(RatioName::SalesToAssets), Some(dec!(1.2)));
        assert_eq!(r.value(RatioName::DebtToEquity), Some(dec!(0.6)));
        assert_eq!(r.value(RatioName::DebtToAssets), Some(dec!(0.3)));
        // Interest expense reported negative; coverage uses its magnitude.
        assert_eq!(r.value(RatioName::InterestCoverage), Some(dec!(5)));
        assert_eq!(r.value(RatioName::ReturnOnAssets), Some(dec!(0.1)));
        assert_eq!(r.value(RatioName::ReturnOnEquity), Some(dec!(0.2)));
        let expected_margin = dec!(100_000) / dec!(1_200_000);
        assert_eq!(r.value(RatioName::NetProfitMargin), Some(expected_margin));
    }

    #[test]
    fn test_missing_total_debt_leaves_leverage_undefined() {
        let mut statement = full_statement();
        statement.total_debt = None;
        let r = calculate_ratios(&statement);
        assert_eq!(
            r.get(RatioName::DebtToEquity),
            RatioValue::Undefined(UndefinedReason::MissingField(LineItem::TotalDebt))
        );
        assert_eq!(
            r.get(RatioName::DebtToAssets),
            RatioValue::Undefined(UndefinedReason::MissingField(LineItem::TotalDebt))
        );
        // Everything else unaffected.
        assert_eq!(r.defined_count(), RatioName::ALL.len() - 2);
    }

    #[test]
    fn test_zero_denominator_is_undefined_not_zero() {
        let mut statement = full_statement();
        statement.current_liabilities = Some(Decimal::ZERO);
        let r = calculate_ratios(&statement);
        assert_eq!(
            r.get(RatioName::CurrentRatio),
            RatioValue::Undefined(UndefinedReason::ZeroDenominator(
                LineItem::CurrentLiabilities
            ))
        );
        assert_eq!(r.value(RatioName::CurrentRatio), None);
    }

    #[test]
    fn test_zero_interest_expense_undefined() {
        let mut statement = full_statement();
        statement.interest_expense = Some(Decimal::ZERO);
        let r = calculate_ratios(&statement);
        assert_eq!(
            r.get(RatioName::InterestCoverage),
            RatioValue::Undefined(UndefinedReason::ZeroDenominator(LineItem::InterestExpense))
        );
    }

    #[test]
    fn test_negative_total_assets_undefined() {
        let mut statement = full_statement();
        statement.total_assets = Some(dec!(-10));
        let r = calculate_ratios(&statement);
        for name in RatioName::ALTMAN {
            if name == RatioName::MarketEquityToLiabilities {
                continue;
            }
            assert_eq!(
                r.get(name),
                RatioValue::Undefined(UndefinedReason::NonPositiveDenominator(
                    LineItem::TotalAssets
                )),
                "{name} should be undefined"
            );
        }
    }

    #[test]
    fn test_negative_equity_keeps_debt_to_equity() {
        let mut statement = full_statement();
        statement.total_equity = Some(dec!(-100_000));
        let r = calculate_ratios(&statement);
        assert_eq!(r.value(RatioName::DebtToEquity), Some(dec!(-3)));
        // ROE on negative equity is meaningless.
        assert_eq!(
            r.get(RatioName::ReturnOnEquity),
            RatioValue::Undefined(UndefinedReason::NonPositiveDenominator(LineItem::TotalEquity))
        );
    }

    #[test]
    fn test_quick_ratio_needs_inventory() {
        let mut statement = full_statement();
        statement.inventory = None;
        let r = calculate_ratios(&statement);
        assert_eq!(
            r.get(RatioName::QuickRatio),
            RatioValue::Undefined(UndefinedReason::MissingField(LineItem::Inventory))
        );
    }

    #[test]
    fn test_overflow_is_undefined() {
        let statement = FinancialStatement::empty("BIG")
            .with(LineItem::CurrentAssets, Decimal::MAX)
            .with(LineItem::CurrentLiabilities, dec!(0.0000001));
        let r = calculate_ratios(&statement);
        assert_eq!(
            r.get(RatioName::CurrentRatio),
            RatioValue::Undefined(UndefinedReason::Overflow)
        );
    }

    #[test]
    fn test_empty_statement_all_undefined() {
        let r = calculate_ratios(&FinancialStatement::empty("NONE"));
        assert_eq!(r.defined_count(), 0);
        assert_eq!(r.undefined().len(), RatioName::ALL.len());
    }

    #[test]
    fn test_require_maps_error_taxonomy() {
        let mut statement = full_statement();
        statement.total_debt = None;
        statement.current_liabilities = Some(Decimal::ZERO);
        let r = calculate_ratios(&statement);

        match r.require(RatioName::DebtToEquity).unwrap_err() {
            CreditRiskError::MissingField { field } => assert_eq!(field, "total_debt"),
            other => panic!("Expected MissingField, got {other:?}"),
        }
        match r.require(RatioName::CurrentRatio).unwrap_err() {
            CreditRiskError::UndefinedRatio { ratio, .. } => assert_eq!(ratio, "current_ratio"),
            other => panic!("Expected UndefinedRatio, got {other:?}"),
        }
        assert_eq!(r.require(RatioName::SalesToAssets).unwrap(), dec!(1.2));
    }

    #[test]
    fn test_absent_ratio_reads_as_not_computed() {
        let r = RatioSet::from_values([(RatioName::CurrentRatio, dec!(1))]);
        assert_eq!(
            r.get(RatioName::DebtToEquity),
            RatioValue::Undefined(UndefinedReason::NotComputed)
        );
    }

    #[test]
    fn test_ratio_set_serializes_undefined_marker() {
        let mut statement = full_statement();
        statement.total_debt = None;
        let r = calculate_ratios(&statement);
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(
            json["debt_to_equity"],
            serde_json::json!({"reason": "missing_field", "field": "total_debt"})
        );
        let back: RatioSet = serde_json::from_value(json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn test_ratio_categories() {
        assert_eq!(RatioName::CurrentRatio.category(), RatioCategory::Liquidity);
        assert_eq!(RatioName::DebtToEquity.category(), RatioCategory::Leverage);
        assert_eq!(RatioName::ReturnOnAssets.category(), RatioCategory::Profitability);
        assert_eq!(RatioName::SalesToAssets.category(), RatioCategory::Efficiency);
    }
}
