use clap::Args;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::{json, Value};

use espp_core::espp::{self, EsppInput};

use crate::input;
use crate::input::sanitize::parse_decimal;

/// Transaction parameters shared by `calculate` and `validate`
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct EsppArgs {
    /// Market value per share on the purchase date (e.g. 4.60 or $4.60)
    #[arg(long, value_parser = parse_decimal)]
    pub market_value_purchase_date: Option<Decimal>,

    /// Employer discount in percent, below 100
    #[arg(long, value_parser = parse_decimal, default_value = "15")]
    pub discount_percent: Decimal,

    /// Total contribution used for the purchase
    #[arg(long, value_parser = parse_decimal, default_value = "1000")]
    pub purchase_amount: Decimal,

    /// Market value per share on the sale date
    #[arg(long, value_parser = parse_decimal)]
    pub market_value_sale_date: Option<Decimal>,

    /// Percent move from the purchase-date value, used when no sale value is given
    #[arg(long, value_parser = parse_decimal, default_value = "0")]
    pub stock_change_pct: Decimal,

    /// Ordinary income tax rate in percent
    #[arg(long, value_parser = parse_decimal, default_value = "40")]
    pub tax_rate_percent: Decimal,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for the ESPP calculation
#[derive(Args)]
pub struct CalculateArgs {
    #[command(flatten)]
    pub espp: EsppArgs,
}

/// Arguments for input validation
#[derive(Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub espp: EsppArgs,
}

/// Arguments for the percent move between two prices
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct PriceChangeArgs {
    /// Market value per share on the purchase date
    #[arg(long, value_parser = parse_decimal)]
    pub from: Decimal,

    /// Market value per share on the sale date
    #[arg(long, value_parser = parse_decimal)]
    pub to: Decimal,
}

/// Arguments for the sale price implied by a percent move
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SalePriceArgs {
    /// Market value per share on the purchase date
    #[arg(long, value_parser = parse_decimal)]
    pub from: Decimal,

    /// Percent move from the purchase-date value
    #[arg(long, value_parser = parse_decimal)]
    pub change_pct: Decimal,
}

/// Resolve the input record: `--input` file, then piped stdin, then flags.
fn resolve_input(args: &EsppArgs) -> Result<EsppInput, Box<dyn std::error::Error>> {
    if let Some(ref path) = args.input {
        return input::file::read_json(path);
    }
    if let Some(piped) = input::stdin::read_stdin()? {
        return Ok(piped);
    }
    input_from_flags(args)
}

fn input_from_flags(args: &EsppArgs) -> Result<EsppInput, Box<dyn std::error::Error>> {
    let market_value_purchase_date = args
        .market_value_purchase_date
        .ok_or("--market-value-purchase-date is required (or provide --input)")?;

    // A non-positive purchase value has no implied sale price; pass it through
    // so validation reports it alongside every other failing field.
    let market_value_sale_date = match args.market_value_sale_date {
        Some(value) => value,
        None if market_value_purchase_date <= Decimal::ZERO => market_value_purchase_date,
        None => espp::sale_price_from_change(market_value_purchase_date, args.stock_change_pct)?,
    };

    Ok(EsppInput {
        market_value_purchase_date,
        discount_percent: args.discount_percent,
        purchase_amount: args.purchase_amount,
        market_value_sale_date,
        tax_rate_percent: args.tax_rate_percent,
    })
}

pub fn run_calculate(args: CalculateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let espp_input = resolve_input(&args.espp)?;
    let result = espp::analyze_espp(&espp_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_validate(args: ValidateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let espp_input = resolve_input(&args.espp)?;
    validation_report(&espp_input)
}

fn validation_report(espp_input: &EsppInput) -> Result<Value, Box<dyn std::error::Error>> {
    let errors = espp::collect_validation_errors(espp_input);
    if errors.is_empty() {
        return Ok(json!({ "valid": true }));
    }

    let lines: Vec<String> = errors.iter().map(|e| format!("  - {}", e)).collect();
    Err(format!(
        "{} validation error(s):\n{}",
        errors.len(),
        lines.join("\n")
    )
    .into())
}

fn to_cents(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn run_price_change(args: PriceChangeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let change = espp::price_change_percent(args.from, args.to)?;
    Ok(json!({
        "marketValuePurchaseDate": args.from.to_string(),
        "marketValueSaleDate": args.to.to_string(),
        "priceChangePercent": format!("{:.2}", to_cents(change)),
    }))
}

pub fn run_sale_price(args: SalePriceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sale = espp::sale_price_from_change(args.from, args.change_pct)?;
    Ok(json!({
        "marketValuePurchaseDate": args.from.to_string(),
        "changePercent": args.change_pct.to_string(),
        "impliedMarketValueSaleDate": format!("{:.2}", to_cents(sale)),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn flags() -> EsppArgs {
        EsppArgs {
            market_value_purchase_date: Some(dec!(50)),
            discount_percent: dec!(15),
            purchase_amount: dec!(1000),
            market_value_sale_date: None,
            stock_change_pct: dec!(0),
            tax_rate_percent: dec!(40),
            input: None,
        }
    }

    #[test]
    fn test_flags_default_sale_value_to_purchase_value() {
        let input = input_from_flags(&flags()).unwrap();
        assert_eq!(input.market_value_sale_date, dec!(50));
        assert_eq!(input.discount_percent, dec!(15));
        assert_eq!(input.tax_rate_percent, dec!(40));
    }

    #[test]
    fn test_flags_apply_stock_change() {
        let args = EsppArgs {
            stock_change_pct: dec!(-10),
            ..flags()
        };
        let input = input_from_flags(&args).unwrap();
        assert_eq!(input.market_value_sale_date, dec!(45));
    }

    #[test]
    fn test_explicit_sale_value_wins_over_change() {
        let args = EsppArgs {
            market_value_sale_date: Some(dec!(70)),
            stock_change_pct: dec!(-10),
            ..flags()
        };
        let input = input_from_flags(&args).unwrap();
        assert_eq!(input.market_value_sale_date, dec!(70));
    }

    #[test]
    fn test_missing_purchase_value_is_reported() {
        let args = EsppArgs {
            market_value_purchase_date: None,
            ..flags()
        };
        let err = input_from_flags(&args).unwrap_err();
        assert!(err.to_string().contains("--market-value-purchase-date"));
    }

    #[test]
    fn test_validation_report_lists_every_failure() {
        let input = EsppInput {
            market_value_purchase_date: dec!(50),
            discount_percent: dec!(100),
            purchase_amount: dec!(1000),
            market_value_sale_date: dec!(50),
            tax_rate_percent: dec!(150),
        };
        let err = validation_report(&input).unwrap_err().to_string();
        assert!(err.starts_with("2 validation error(s)"));
        assert!(err.contains("discountPercent"));
        assert!(err.contains("taxRatePercent"));
    }

    #[test]
    fn test_validate_flags_with_non_positive_purchase_value_reports_all_fields() {
        let args = EsppArgs {
            market_value_purchase_date: Some(dec!(0)),
            discount_percent: dec!(100),
            tax_rate_percent: dec!(150),
            ..flags()
        };
        let input = input_from_flags(&args).unwrap();
        assert_eq!(input.market_value_sale_date, dec!(0));

        let err = validation_report(&input).unwrap_err().to_string();
        assert!(err.starts_with("4 validation error(s)"), "got {err}");
        for field in [
            "marketValuePurchaseDate",
            "marketValueSaleDate",
            "discountPercent",
            "taxRatePercent",
        ] {
            assert!(err.contains(field), "missing {field} in {err}");
        }
    }

    #[test]
    fn test_validation_report_valid() {
        let input = input_from_flags(&flags()).unwrap();
        assert_eq!(validation_report(&input).unwrap(), json!({ "valid": true }));
    }

    #[test]
    fn test_price_change_command() {
        let value = run_price_change(PriceChangeArgs {
            from: dec!(4.6),
            to: dec!(5.06),
        })
        .unwrap();
        assert_eq!(value["priceChangePercent"], "10.00");
    }

    #[test]
    fn test_sale_price_command() {
        let value = run_sale_price(SalePriceArgs {
            from: dec!(50),
            change_pct: dec!(20),
        })
        .unwrap();
        assert_eq!(value["impliedMarketValueSaleDate"], "60.00");
    }

    #[test]
    fn test_command_output_rounds_midpoint_away_from_zero() {
        // 0.5 * 1.01 = 0.505
        let value = run_sale_price(SalePriceArgs {
            from: dec!(0.5),
            change_pct: dec!(1),
        })
        .unwrap();
        assert_eq!(value["impliedMarketValueSaleDate"], "0.51");

        // (8.0004 - 8) / 8 * 100 = 0.005
        let value = run_price_change(PriceChangeArgs {
            from: dec!(8),
            to: dec!(8.0004),
        })
        .unwrap();
        assert_eq!(value["priceChangePercent"], "0.01");
    }
}
