pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Ratios shown next to each ranked company.
const RANKING_RATIOS: [&str; 5] = [
    "debt_to_equity",
    "interest_coverage",
    "return_on_assets",
    "working_capital_to_assets",
    "sales_to_assets",
];

/// Columns for one row of a ranked portfolio.
pub const RANKING_COLUMNS: [&str; 12] = [
    "rank",
    "ticker",
    "score",
    "risk_category",
    "zone",
    "z_score",
    "debt_to_equity",
    "interest_coverage",
    "return_on_assets",
    "working_capital_to_assets",
    "sales_to_assets",
    "flagged",
];

/// Flatten a serialized risk profile into `RANKING_COLUMNS` order.
pub fn ranking_row(rank: Option<usize>, profile: &Value) -> Vec<String> {
    let mut row = vec![
        rank.map(|r| r.to_string()).unwrap_or_else(|| "-".into()),
        scalar(&profile["ticker"]),
        scalar(&profile["composite"]["score"]),
        scalar(&profile["risk_category"]),
        scalar(&profile["zscore"]["zone"]),
        scalar(&profile["zscore"]["score"]),
    ];
    row.extend(
        RANKING_RATIOS
            .iter()
            .map(|name| ratio_cell(&profile["ratios"][*name])),
    );
    row.push(scalar(&profile["flagged"]));
    row
}

/// Render a leaf value; nulls become empty cells.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// A ratio is either a decimal string or an undefined marker object.
pub fn ratio_cell(value: &Value) -> String {
    match value {
        Value::Object(marker) => {
            let reason = marker.get("reason").map(scalar).unwrap_or_default();
            match marker.get("field") {
                Some(field) => format!("n/a ({}: {})", reason, scalar(field)),
                None => format!("n/a ({})", reason),
            }
        }
        other => scalar(other),
    }
}
