use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as a table using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                println!("{}", field_table(map));
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => println!("{}", field_table(res_map)),
        _ => println!("{}", field_table(envelope)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn field_table(map: &Map<String, Value>) -> Table {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &highlight(key, val)]);
    }
    Table::from(builder)
}

/// Format a field and paint negative monetary values red.
fn highlight(key: &str, value: &Value) -> String {
    let text = format_field(key, value);
    match value.as_f64() {
        Some(n) if n < 0.0 && field_kind(key) == FieldKind::Money => text.red().to_string(),
        _ => text,
    }
}

#[derive(Debug, PartialEq, Eq)]
enum FieldKind {
    Money,
    Percent,
    Count,
}

fn field_kind(key: &str) -> FieldKind {
    if key.starts_with("numberOf") {
        FieldKind::Count
    } else if key.to_ascii_lowercase().contains("percent") {
        FieldKind::Percent
    } else {
        FieldKind::Money
    }
}

fn format_field(key: &str, value: &Value) -> String {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse::<f64>().ok(),
        _ => None,
    };
    match (number, field_kind(key)) {
        (Some(n), FieldKind::Money) => format_currency(n),
        (Some(n), FieldKind::Percent) => format!("{:.2}%", n),
        _ => format_value(value),
    }
}

/// `$1,234.56`, with the sign ahead of the symbol for negatives.
fn format_currency(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, cents)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
