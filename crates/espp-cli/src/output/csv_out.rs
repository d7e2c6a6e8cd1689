use serde_json::Value;
use std::io::{self, Write};

/// Write output as two-column `field,value` CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(stdout.lock(), value) {
        eprintln!("CSV write error: {}", e);
    }
}

/// The `result` object when present, otherwise the top-level object.
/// Envelope warnings follow as `warning` rows.
fn write_csv<W: Write>(writer: W, value: &Value) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);

    match value {
        Value::Object(map) => {
            let fields = match map.get("result") {
                Some(Value::Object(result)) => result,
                _ => map,
            };
            wtr.write_record(["field", "value"])?;
            for (key, val) in fields {
                wtr.write_record([key.as_str(), &format_csv_value(val)])?;
            }
            if let Some(Value::Array(warnings)) = map.get("warnings") {
                for w in warnings.iter().filter_map(Value::as_str) {
                    wtr.write_record(["warning", w])?;
                }
            }
        }
        _ => wtr.write_record([&format_csv_value(value)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        write_csv(&mut buf, value).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_envelope_result_and_warnings() {
        let value = json!({
            "result": { "numberOfShares": 35, "totalTax": 65.63 },
            "warnings": ["12.50 of the contribution stays uninvested."],
            "methodology": "ignored"
        });
        let out = render(&value);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "field,value");
        assert!(lines.contains(&"numberOfShares,35"));
        assert!(lines.contains(&"totalTax,65.63"));
        assert_eq!(lines.last(), Some(&"warning,12.50 of the contribution stays uninvested."));
        assert!(!out.contains("methodology"));
    }

    #[test]
    fn test_flat_object() {
        let out = render(&json!({ "valid": true }));
        assert_eq!(out, "field,value\nvalid,true\n");
    }
}
