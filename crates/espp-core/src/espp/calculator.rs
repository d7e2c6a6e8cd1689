use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::EsppError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::EsppResult;

const HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One ESPP lot sold in a disqualifying disposition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsppInput {
    /// Fair market value per share on the purchase date
    #[serde(with = "rust_decimal::serde::float")]
    pub market_value_purchase_date: Money,
    /// Employer discount, 0 <= discount < 100
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_percent: Percent,
    /// Total payroll contribution for the offering period
    #[serde(with = "rust_decimal::serde::float")]
    pub purchase_amount: Money,
    /// Fair market value per share on the sale date
    #[serde(with = "rust_decimal::serde::float")]
    pub market_value_sale_date: Money,
    /// Flat ordinary-income rate applied to the discount, 0 <= rate <= 100
    #[serde(with = "rust_decimal::serde::float")]
    pub tax_rate_percent: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EsppOutput {
    #[serde(with = "rust_decimal::serde::float")]
    pub purchase_price_per_share: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub discount_per_share: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub capital_gain_per_share: Money,
    pub number_of_shares: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_purchase_price: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_discount: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_capital_gain: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_taxable_as_income: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_tax: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_profit: Money,
    #[serde(with = "rust_decimal::serde::float")]
    pub percentage_gain_loss_on_investment: Percent,
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn require_positive(value: Decimal, field: &str) -> Option<EsppError> {
    if value <= Decimal::ZERO {
        Some(EsppError::invalid(field, "market value must be positive"))
    } else {
        None
    }
}

/// Field checks in reporting order.
fn field_checks(input: &EsppInput) -> [Option<EsppError>; 5] {
    let discount_ok =
        input.discount_percent >= Decimal::ZERO && input.discount_percent < HUNDRED;
    let tax_ok = input.tax_rate_percent >= Decimal::ZERO && input.tax_rate_percent <= HUNDRED;

    [
        require_positive(input.market_value_purchase_date, "marketValuePurchaseDate"),
        require_positive(input.market_value_sale_date, "marketValueSaleDate"),
        (input.purchase_amount <= Decimal::ZERO)
            .then(|| EsppError::invalid("purchaseAmount", "purchase amount must be positive")),
        (!discount_ok).then(|| {
            EsppError::invalid(
                "discountPercent",
                "discount percent must be between 0 and 100, exclusive of 100",
            )
        }),
        (!tax_ok).then(|| {
            EsppError::invalid("taxRatePercent", "tax rate percent must be between 0 and 100")
        }),
    ]
}

/// Validate an input record, reporting the first failing field.
///
/// Fields are checked in the order: purchase-date market value, sale-date
/// market value, purchase amount, discount, tax rate.
pub fn validate_espp_input(input: &EsppInput) -> EsppResult<()> {
    match field_checks(input).into_iter().flatten().next() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// Check every field and return all failures, empty when the input is valid.
pub fn collect_validation_errors(input: &EsppInput) -> Vec<EsppError> {
    field_checks(input).into_iter().flatten().collect()
}

// ---------------------------------------------------------------------------
// Calculation
// ---------------------------------------------------------------------------

fn overflow(context: &str) -> EsppError {
    EsppError::Overflow {
        context: context.into(),
    }
}

fn mul(a: Decimal, b: Decimal, context: &str) -> EsppResult<Decimal> {
    a.checked_mul(b).ok_or_else(|| overflow(context))
}

fn div(a: Decimal, b: Decimal, context: &str) -> EsppResult<Decimal> {
    a.checked_div(b).ok_or_else(|| overflow(context))
}

fn sub(a: Decimal, b: Decimal, context: &str) -> EsppResult<Decimal> {
    a.checked_sub(b).ok_or_else(|| overflow(context))
}

/// Round to cents, midpoint away from zero. Negative zero collapses to zero.
fn to_cents(value: Decimal) -> Decimal {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Unrounded (discount, purchase price) per share.
fn per_share_prices(input: &EsppInput) -> EsppResult<(Decimal, Decimal)> {
    let discount_per_share = div(
        mul(input.market_value_purchase_date, input.discount_percent, "discount per share")?,
        HUNDRED,
        "discount per share",
    )?;
    let purchase_price_per_share = input.market_value_purchase_date - discount_per_share;
    if purchase_price_per_share <= Decimal::ZERO {
        return Err(EsppError::FinancialImpossibility(format!(
            "purchase price per share {purchase_price_per_share} is not positive"
        )));
    }
    Ok((discount_per_share, purchase_price_per_share))
}

/// Compute the outcome of a disqualifying disposition of one ESPP lot.
///
/// All intermediate figures are carried at full decimal precision; every
/// monetary and percentage output is rounded to 2 decimal places only when
/// the output record is assembled. The discount is taxed as ordinary income
/// whatever the sale price, so `total_profit` can be negative even when the
/// capital gain is zero.
pub fn calculate_espp(input: &EsppInput) -> EsppResult<EsppOutput> {
    validate_espp_input(input)?;

    let (discount_per_share, purchase_price_per_share) = per_share_prices(input)?;

    // Whole shares only; the remainder of the contribution is refunded.
    let share_quotient = div(input.purchase_amount, purchase_price_per_share, "share count")?;
    let number_of_shares = share_quotient
        .floor()
        .to_u64()
        .ok_or_else(|| overflow("share count"))?;
    let shares = Decimal::from(number_of_shares);

    let total_purchase_price = mul(shares, purchase_price_per_share, "total purchase price")?;
    let total_discount = mul(shares, discount_per_share, "total discount")?;
    let capital_gain_per_share = input.market_value_sale_date - purchase_price_per_share;
    let total_capital_gain = mul(shares, capital_gain_per_share, "total capital gain")?;
    let amount_taxable_as_income = total_discount;
    let total_tax = div(
        mul(amount_taxable_as_income, input.tax_rate_percent, "total tax")?,
        HUNDRED,
        "total tax",
    )?;
    let total_profit = sub(total_capital_gain, total_tax, "total profit")?;

    let percentage_gain_loss_on_investment = if total_purchase_price.is_zero() {
        Decimal::ZERO
    } else {
        mul(
            div(total_profit, total_purchase_price, "percentage return")?,
            HUNDRED,
            "percentage return",
        )?
    };

    if total_tax < Decimal::ZERO || total_discount < Decimal::ZERO {
        return Err(EsppError::FinancialImpossibility(
            "discount income and tax must not be negative".into(),
        ));
    }

    let total_discount = to_cents(total_discount);
    Ok(EsppOutput {
        purchase_price_per_share: to_cents(purchase_price_per_share),
        discount_per_share: to_cents(discount_per_share),
        capital_gain_per_share: to_cents(capital_gain_per_share),
        number_of_shares,
        total_purchase_price: to_cents(total_purchase_price),
        total_discount,
        total_capital_gain: to_cents(total_capital_gain),
        amount_taxable_as_income: total_discount,
        total_tax: to_cents(total_tax),
        total_profit: to_cents(total_profit),
        percentage_gain_loss_on_investment: to_cents(percentage_gain_loss_on_investment),
    })
}

/// Run [`calculate_espp`] and wrap the result in the standard computation
/// envelope, with warnings for outcomes a seller usually wants flagged.
pub fn analyze_espp(input: &EsppInput) -> EsppResult<ComputationOutput<EsppOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let output = calculate_espp(input)?;

    if output.number_of_shares == 0 {
        warnings.push(format!(
            "Contribution of {} is below the purchase price of one share ({}); \
             no shares were purchased.",
            input.purchase_amount, output.purchase_price_per_share
        ));
    } else {
        let uninvested = input.purchase_amount - output.total_purchase_price;
        if uninvested > Decimal::ZERO {
            warnings.push(format!(
                "{} of the contribution buys less than one whole share and stays uninvested.",
                uninvested
            ));
        }
    }

    let (_, purchase_price_per_share) = per_share_prices(input)?;
    if input.market_value_sale_date < purchase_price_per_share {
        warnings.push(format!(
            "Sale price {} is below the purchase price {}: the sale realises a capital loss.",
            input.market_value_sale_date, purchase_price_per_share
        ));
    }

    if output.total_profit < Decimal::ZERO {
        warnings.push(format!(
            "Tax of {} on the discount exceeds the capital gain; the disposition loses {}.",
            output.total_tax,
            output.total_profit.abs()
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "ESPP disqualifying disposition: discount taxed as ordinary income, \
         whole shares purchased at the discounted price, figures rounded to cents",
        input,
        warnings,
        elapsed,
        output,
    ))
}
