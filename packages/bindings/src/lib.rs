use napi::Result as NapiResult;
use napi_derive::napi;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;

use espp_core::espp::{self, EsppInput};
use espp_core::EsppError;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_input(input_json: &str) -> NapiResult<EsppInput> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

fn parse_decimal(field: &str, raw: &str) -> NapiResult<Decimal> {
    Decimal::from_str(raw.trim())
        .map_err(|e| to_napi_error(format!("Invalid input: {field} — {e}")))
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

/// Bare output record, as the form renders it.
#[napi]
pub fn calculate_espp(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = espp::calculate_espp(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Output record wrapped with methodology, warnings and metadata.
#[napi]
pub fn analyze_espp(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = espp::analyze_espp(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct FieldError {
    field: String,
    reason: String,
}

#[derive(Serialize)]
struct ValidationReport {
    valid: bool,
    errors: Vec<FieldError>,
}

#[napi]
pub fn validate_espp(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let errors: Vec<FieldError> = espp::collect_validation_errors(&input)
        .into_iter()
        .map(|e| match e {
            EsppError::InvalidInput { field, reason } => FieldError { field, reason },
            other => FieldError {
                field: String::new(),
                reason: other.to_string(),
            },
        })
        .collect();
    let report = ValidationReport {
        valid: errors.is_empty(),
        errors,
    };
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Price helpers (decimal strings in, decimal string out)
// ---------------------------------------------------------------------------

#[napi]
pub fn sale_price_from_change(
    market_value_purchase_date: String,
    change_percent: String,
) -> NapiResult<String> {
    let purchase = parse_decimal("marketValuePurchaseDate", &market_value_purchase_date)?;
    let change = parse_decimal("changePercent", &change_percent)?;
    let sale = espp::sale_price_from_change(purchase, change).map_err(to_napi_error)?;
    Ok(sale.normalize().to_string())
}

#[napi]
pub fn price_change_percent(
    market_value_purchase_date: String,
    market_value_sale_date: String,
) -> NapiResult<String> {
    let purchase = parse_decimal("marketValuePurchaseDate", &market_value_purchase_date)?;
    let sale = parse_decimal("marketValueSaleDate", &market_value_sale_date)?;
    let change = espp::price_change_percent(purchase, sale).map_err(to_napi_error)?;
    Ok(change.normalize().to_string())
}
