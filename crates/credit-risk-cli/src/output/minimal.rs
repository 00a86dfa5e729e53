use serde_json::Value;

use super::scalar;

/// Print just the key answer from the output.
///
/// Portfolios print the safest tickers one per line, a profile prints its
/// score and category, a Z-Score prints its value and zone.
pub fn print_minimal(value: &Value) {
    let result = value.get("result").unwrap_or(value);

    if let Some(Value::Array(safest)) = result.get("safest") {
        for profile in safest {
            println!(
                "{} {}",
                scalar(&profile["ticker"]),
                scalar(&profile["composite"]["score"])
            );
        }
        return;
    }

    if result.get("composite").is_some() {
        let score = &result["composite"]["score"];
        if score.is_null() {
            println!("unscored");
        } else {
            println!("{} {}", scalar(score), scalar(&result["risk_category"]));
        }
        return;
    }

    if let Some(zone) = result.get("zone") {
        println!("{} {}", scalar(&result["score"]), scalar(zone));
        return;
    }

    if let Some(Value::Object(ratios)) = result.get("ratios") {
        let defined = ratios.values().filter(|v| v.is_string()).count();
        println!("{}/{} ratios defined", defined, ratios.len());
        return;
    }

    println!("{}", scalar(result));
}
