use serde_json::Value;

/// Key answer fields, in priority order.
const PRIORITY_KEYS: [&str; 4] = [
    "totalProfit",
    "priceChangePercent",
    "impliedMarketValueSaleDate",
    "valid",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minimal_prefers_total_profit() {
        let value = json!({
            "result": { "numberOfShares": 35, "totalProfit": 546.88 },
            "warnings": []
        });
        assert_eq!(minimal_line(&value), "546.88");
    }

    #[test]
    fn test_minimal_price_change() {
        let value = json!({ "marketValuePurchaseDate": "50", "priceChangePercent": "20.00" });
        assert_eq!(minimal_line(&value), "20.00");

        let value = json!({ "changePercent": "20", "impliedMarketValueSaleDate": "60.00" });
        assert_eq!(minimal_line(&value), "60.00");
    }

    #[test]
    fn test_minimal_falls_back_to_first_field() {
        let value = json!({ "other": 1 });
        assert_eq!(minimal_line(&value), "other: 1");
    }
}
