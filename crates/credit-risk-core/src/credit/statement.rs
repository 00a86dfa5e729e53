//! Financial statement line items for one company and one period.
//!
//! Every line item is optional. `None` means the data source did not supply
//! the field; it is never read back as zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::{types::*, CreditRiskError, CreditRiskResult};

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineItem {
    TotalAssets,
    CurrentAssets,
    CurrentLiabilities,
    TotalLiabilities,
    TotalDebt,
    TotalEquity,
    RetainedEarnings,
    Revenue,
    Ebit,
    NetIncome,
    InterestExpense,
    MarketCap,
    Inventory,
}

impl LineItem {
    pub const ALL: [LineItem; 13] = [
        Self::TotalAssets,
        Self::CurrentAssets,
        Self::CurrentLiabilities,
        Self::TotalLiabilities,
        Self::TotalDebt,
        Self::TotalEquity,
        Self::RetainedEarnings,
        Self::Revenue,
        Self::Ebit,
        Self::NetIncome,
        Self::InterestExpense,
        Self::MarketCap,
        Self::Inventory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalAssets => "total_assets",
            Self::CurrentAssets => "current_assets",
            Self::CurrentLiabilities => "current_liabilities",
            Self::TotalLiabilities => "total_liabilities",
            Self::TotalDebt => "total_debt",
            Self::TotalEquity => "total_equity",
            Self::RetainedEarnings => "retained_earnings",
            Self::Revenue => "revenue",
            Self::Ebit => "ebit",
            Self::NetIncome => "net_income",
            Self::InterestExpense => "interest_expense",
            Self::MarketCap => "market_cap",
            Self::Inventory => "inventory",
        }
    }

    pub fn parse(name: &str) -> Option<LineItem> {
        Self::ALL.iter().copied().find(|item| item.as_str() == name)
    }
}

impl std::fmt::Display for LineItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Statement
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialStatement {
    pub ticker: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    pub total_assets: Option<Money>,
    pub current_assets: Option<Money>,
    pub current_liabilities: Option<Money>,
    pub total_liabilities: Option<Money>,
    pub total_debt: Option<Money>,
    pub total_equity: Option<Money>,
    pub retained_earnings: Option<Money>,
    pub revenue: Option<Money>,
    pub ebit: Option<Money>,
    pub net_income: Option<Money>,
    pub interest_expense: Option<Money>,
    pub market_cap: Option<Money>,
    pub inventory: Option<Money>,
}

impl FinancialStatement {
    /// A statement with every line item missing. This is what a failed
    /// fetch looks like to the rest of the pipeline.
    pub fn empty(ticker: impl Into<String>) -> Self {
        Self {
            ticker: ticker.into(),
            ..Self::default()
        }
    }

    /// Build a statement from named line items. Unknown names are rejected;
    /// a `None` value records the field as explicitly missing.
    pub fn from_line_items<'a, I>(ticker: impl Into<String>, items: I) -> CreditRiskResult<Self>
    where
        I: IntoIterator<Item = (&'a str, Option<Money>)>,
    {
        let mut statement = Self::empty(ticker);
        for (name, value) in items {
            let item = LineItem::parse(name).ok_or_else(|| CreditRiskError::InvalidInput {
                field: name.to_string(),
                reason: "Unknown statement line item.".into(),
            })?;
            *statement.slot_mut(item) = value;
        }
        Ok(statement)
    }

    pub fn field(&self, item: LineItem) -> Option<Money> {
        match item {
            LineItem::TotalAssets => self.total_assets,
            LineItem::CurrentAssets => self.current_assets,
            LineItem::CurrentLiabilities => self.current_liabilities,
            LineItem::TotalLiabilities => self.total_liabilities,
            LineItem::TotalDebt => self.total_debt,
            LineItem::TotalEquity => self.total_equity,
            LineItem::RetainedEarnings => self.retained_earnings,
            LineItem::Revenue => self.revenue,
            LineItem::Ebit => self.ebit,
            LineItem::NetIncome => self.net_income,
            LineItem::InterestExpense => self.interest_expense,
            LineItem::MarketCap => self.market_cap,
            LineItem::Inventory => self.inventory,
        }
    }

    /// Required lookup: a missing line item is a `MissingField` error.
    pub fn get(&self, item: LineItem) -> CreditRiskResult<Money> {
        self.field(item).ok_or_else(|| CreditRiskError::MissingField {
            field: item.as_str().to_string(),
        })
    }

    pub fn with(mut self, item: LineItem, value: Money) -> Self {
        *self.slot_mut(item) = Some(value);
        self
    }

    pub fn without(mut self, item: LineItem) -> Self {
        *self.slot_mut(item) = None;
        self
    }

    pub fn missing_fields(&self) -> Vec<LineItem> {
        LineItem::ALL
            .iter()
            .copied()
            .filter(|item| self.field(*item).is_none())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        LineItem::ALL.iter().all(|item| self.field(*item).is_none())
    }

    /// Named view of the present line items, in declaration order.
    pub fn line_items(&self) -> BTreeMap<LineItem, Money> {
        LineItem::ALL
            .iter()
            .filter_map(|item| self.field(*item).map(|v| (*item, v)))
            .collect()
    }

    fn slot_mut(&mut self, item: LineItem) -> &mut Option<Money> {
        match item {
            LineItem::TotalAssets => &mut self.total_assets,
            LineItem::CurrentAssets => &mut self.current_assets,
            LineItem::CurrentLiabilities => &mut self.current_liabilities,
            LineItem::TotalLiabilities => &mut self.total_liabilities,
            LineItem::TotalDebt => &mut self.total_debt,
            LineItem::TotalEquity => &mut self.total_equity,
            LineItem::RetainedEarnings => &mut self.retained_earnings,
            LineItem::Revenue => &mut self.revenue,
            LineItem::Ebit => &mut self.ebit,
            LineItem::NetIncome => &mut self.net_income,
            LineItem::InterestExpense => &mut self.interest_expense,
            LineItem::MarketCap => &mut self.market_cap,
            LineItem::Inventory => &mut self.inventory,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_field_is_none_not_zero() {
        let statement = FinancialStatement::empty("ACME").with(LineItem::TotalAssets, dec!(100));
        assert_eq!(statement.field(LineItem::TotalAssets), Some(dec!(100)));
        assert_eq!(statement.field(LineItem::TotalDebt), None);
    }

    #[test]
    fn test_get_missing_field_error() {
        let statement = FinancialStatement::empty("ACME");
        match statement.get(LineItem::TotalDebt).unwrap_err() {
            CreditRiskError::MissingField { field } => assert_eq!(field, "total_debt"),
            other => panic!("Expected MissingField, got {other:?}"),
        }
    }

    #[test]
    fn test_from_line_items() {
        let statement = FinancialStatement::from_line_items(
            "ACME",
            [
                ("current_assets", Some(dec!(200))),
                ("current_liabilities", Some(dec!(100))),
                ("total_debt", None),
            ],
        )
        .unwrap();
        assert_eq!(statement.ticker, "ACME");
        assert_eq!(statement.current_assets, Some(dec!(200)));
        assert_eq!(statement.current_liabilities, Some(dec!(100)));
        assert_eq!(statement.total_debt, None);
    }

    #[test]
    fn test_from_line_items_unknown_name() {
        let err = FinancialStatement::from_line_items("ACME", [("goodwill", Some(dec!(1)))])
            .unwrap_err();
        match err {
            CreditRiskError::InvalidInput { field, .. } => assert_eq!(field, "goodwill"),
            other => panic!("Expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_line_item_names_round_trip() {
        for item in LineItem::ALL {
            assert_eq!(LineItem::parse(item.as_str()), Some(item));
        }
    }

    #[test]
    fn test_deserialize_with_nulls_and_absent_fields() {
        let json = serde_json::json!({
            "ticker": "ACME",
            "period_end": "2024-12-31",
            "total_assets": 1000,
            "total_debt": null
        });
        let statement: FinancialStatement = serde_json::from_value(json).unwrap();
        assert_eq!(statement.total_assets, Some(dec!(1000)));
        assert_eq!(statement.total_debt, None);
        assert_eq!(statement.revenue, None);
        assert_eq!(
            statement.period_end,
            NaiveDate::from_ymd_opt(2024, 12, 31)
        );
    }

    #[test]
    fn test_empty_statement() {
        let statement = FinancialStatement::empty("GONE");
        assert!(statement.is_empty());
        assert_eq!(statement.missing_fields().len(), LineItem::ALL.len());
        assert!(statement.line_items().is_empty());
    }
}
