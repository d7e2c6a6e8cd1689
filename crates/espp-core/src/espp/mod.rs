//! Employee Stock Purchase Plan lots sold in a disqualifying disposition.

pub mod calculator;
pub mod price;

pub use calculator::{
    analyze_espp, calculate_espp, collect_validation_errors, validate_espp_input, EsppInput,
    EsppOutput,
};
pub use price::{price_change_percent, sale_price_from_change};
