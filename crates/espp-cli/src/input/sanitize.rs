use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a number typed the way people write money and rates.
///
/// Currency symbols, thousands separators, percent signs and whitespace are
/// stripped before parsing, so `$1,000.50`, `15%` and `-2.5 %` all parse.
pub fn parse_decimal(raw: &str) -> Result<Decimal, String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return Err(format!("'{}' is not a number", raw));
    }
    Decimal::from_str(&cleaned).map_err(|e| format!("'{}' is not a number: {}", raw, e))
}
