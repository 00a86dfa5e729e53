use serde_json::Value;
use std::io;

use super::{ranking_row, ratio_cell, scalar, RANKING_COLUMNS};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value.get("result").unwrap_or(value);
    if let Some(portfolio) = result.get("portfolio") {
        // One row per company, ranked first then unscored
        let _ = wtr.write_record(RANKING_COLUMNS);
        if let Some(Value::Array(ranked)) = portfolio.get("ranked") {
            for (i, profile) in ranked.iter().enumerate() {
                let _ = wtr.write_record(ranking_row(Some(i + 1), profile));
            }
        }
        if let Some(Value::Array(unscored)) = portfolio.get("unscored") {
            for profile in unscored {
                let _ = wtr.write_record(ranking_row(None, profile));
            }
        }
    } else if let Some(Value::Object(ratios)) = result.get("ratios") {
        let _ = wtr.write_record(["ratio", "value"]);
        for (name, val) in ratios {
            let _ = wtr.write_record([name.as_str(), &ratio_cell(val)]);
        }
    } else if let Value::Object(map) = result {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &scalar(val)]);
        }
    } else {
        let _ = wtr.write_record([scalar(result)]);
    }

    let _ = wtr.flush();
}
