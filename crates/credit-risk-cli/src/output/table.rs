use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{ranking_row, ratio_cell, scalar, RANKING_COLUMNS};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    let Value::Object(envelope) = value else {
        println!("{}", value);
        return;
    };
    let Some(result) = envelope.get("result") else {
        print_fields(envelope.iter());
        return;
    };

    if result.get("portfolio").is_some() {
        print_portfolio(result);
    } else if result.get("composite").is_some() {
        print_profile(result);
    } else if result.get("zone").is_some() {
        print_zscore(result);
    } else if let Some(Value::Object(ratios)) = result.get("ratios") {
        print_ratios(ratios);
    } else if let Value::Object(map) = result {
        print_fields(map.iter());
    }

    print_footer(envelope);
}

fn print_portfolio(result: &Value) {
    let mut builder = Builder::default();
    builder.push_record(RANKING_COLUMNS);
    if let Some(Value::Array(ranked)) = result["portfolio"].get("ranked") {
        for (i, profile) in ranked.iter().enumerate() {
            builder.push_record(ranking_row(Some(i + 1), profile));
        }
    }
    if let Some(Value::Array(unscored)) = result["portfolio"].get("unscored") {
        for profile in unscored {
            builder.push_record(ranking_row(None, profile));
        }
    }
    println!("{}", Table::from(builder));

    if let Some(Value::Object(summary)) = result.get("summary") {
        println!("\n{}", "Summary".bold());
        print_fields(summary.iter());
    }
}

fn print_profile(result: &Value) {
    let zscore = &result["zscore"];
    let composite = &result["composite"];
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    builder.push_record(["ticker".to_string(), scalar(&result["ticker"])]);
    builder.push_record(["score".to_string(), scalar(&composite["score"])]);
    builder.push_record(["risk_category".to_string(), scalar(&result["risk_category"])]);
    builder.push_record(["z_score".to_string(), scalar(&zscore["score"])]);
    builder.push_record(["zone".to_string(), scalar(&zscore["zone"])]);
    builder.push_record(["coverage".to_string(), scalar(&composite["coverage"])]);
    builder.push_record(["flagged".to_string(), scalar(&result["flagged"])]);
    println!("{}", Table::from(builder));

    if let Some(Value::Array(components)) = composite.get("components") {
        println!("\n{}", "Score breakdown".bold());
        let mut builder = Builder::default();
        builder.push_record(["component", "weight", "value", "normalized", "points"]);
        for c in components {
            builder.push_record([
                scalar(&c["name"]),
                scalar(&c["weight"]),
                scalar(&c["value"]),
                scalar(&c["normalized"]),
                scalar(&c["points"]),
            ]);
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Object(ratios)) = result.get("ratios") {
        println!("\n{}", "Ratios".bold());
        print_ratios(ratios);
    }

    if let Some(Value::Array(warnings)) = result.get("warnings") {
        print_warnings(warnings);
    }
}

fn print_zscore(result: &Value) {
    let mut builder = Builder::default();
    builder.push_record(["component", "ratio", "coefficient", "weighted"]);
    if let Some(Value::Array(components)) = result.get("components") {
        for c in components {
            builder.push_record([
                scalar(&c["name"]),
                scalar(&c["ratio"]),
                scalar(&c["coefficient"]),
                scalar(&c["weighted_value"]),
            ]);
        }
    }
    builder.push_record([
        "Z".to_string(),
        String::new(),
        String::new(),
        scalar(&result["score"]),
    ]);
    println!("{}", Table::from(builder));
    println!("Zone: {}", zone_label(&result["zone"]));
}

fn print_ratios(ratios: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Ratio", "Value"]);
    for (name, value) in ratios {
        builder.push_record([name.clone(), ratio_cell(value)]);
    }
    println!("{}", Table::from(builder));
}

fn print_fields<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in fields {
        builder.push_record([key.clone(), scalar(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_footer(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        print_warnings(warnings);
    }
    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_warnings(warnings: &[Value]) {
    if warnings.is_empty() {
        return;
    }
    println!("\n{}", "Warnings:".yellow());
    for w in warnings {
        if let Value::String(s) = w {
            println!("  - {}", s);
        }
    }
}

fn zone_label(zone: &Value) -> String {
    let label = scalar(zone);
    match label.as_str() {
        "Safe" => label.green().to_string(),
        "Grey" => label.yellow().to_string(),
        "Distress" => label.red().to_string(),
        _ => label,
    }
}
