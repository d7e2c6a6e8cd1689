use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::EsppError;
use crate::types::{Money, Percent};
use crate::EsppResult;

fn require_positive_purchase_value(value: Money) -> EsppResult<()> {
    if value <= Decimal::ZERO {
        return Err(EsppError::invalid(
            "marketValuePurchaseDate",
            "market value must be positive",
        ));
    }
    Ok(())
}

/// Sale-date market value implied by a percentage move from the purchase-date value.
///
/// A change of -100% or below would leave a non-positive price and is rejected.
pub fn sale_price_from_change(
    market_value_purchase_date: Money,
    change_percent: Percent,
) -> EsppResult<Money> {
    require_positive_purchase_value(market_value_purchase_date)?;
    if change_percent <= dec!(-100) {
        return Err(EsppError::invalid(
            "changePercent",
            "price change must be greater than -100",
        ));
    }

    let factor = Decimal::ONE + change_percent / dec!(100);
    market_value_purchase_date
        .checked_mul(factor)
        .ok_or_else(|| EsppError::Overflow {
            context: "sale price from change".into(),
        })
}

/// Percentage move from the purchase-date value to the sale-date value.
pub fn price_change_percent(
    market_value_purchase_date: Money,
    market_value_sale_date: Money,
) -> EsppResult<Percent> {
    require_positive_purchase_value(market_value_purchase_date)?;

    market_value_sale_date
        .checked_sub(market_value_purchase_date)
        .and_then(|delta| delta.checked_div(market_value_purchase_date))
        .and_then(|ratio| ratio.checked_mul(dec!(100)))
        .ok_or_else(|| EsppError::Overflow {
            context: "price change percent".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sale_price_from_positive_change() {
        assert_eq!(sale_price_from_change(dec!(50), dec!(20)).unwrap(), dec!(60));
    }

    #[test]
    fn test_sale_price_from_zero_change_is_unchanged() {
        assert_eq!(sale_price_from_change(dec!(4.6), dec!(0)).unwrap(), dec!(4.6));
    }

    #[test]
    fn test_sale_price_from_negative_change() {
        assert_eq!(sale_price_from_change(dec!(50), dec!(-10)).unwrap(), dec!(45));
    }

    #[test]
    fn test_sale_price_rejects_total_loss() {
        let err = sale_price_from_change(dec!(50), dec!(-100)).unwrap_err();
        assert!(matches!(err, EsppError::InvalidInput { ref field, .. } if field == "changePercent"));
    }

    #[test]
    fn test_price_change_percent() {
        assert_eq!(price_change_percent(dec!(50), dec!(60)).unwrap(), dec!(20));
        assert_eq!(price_change_percent(dec!(50), dec!(45)).unwrap(), dec!(-10));
    }

    #[test]
    fn test_price_change_rejects_zero_purchase_value() {
        assert!(price_change_percent(dec!(0), dec!(10)).is_err());
        assert!(sale_price_from_change(dec!(-1), dec!(5)).is_err());
    }

    #[test]
    fn test_price_change_overflow_is_an_error() {
        let err = price_change_percent(dec!(1), dec!(1e27)).unwrap_err();
        assert!(matches!(err, EsppError::Overflow { .. }), "got {err:?}");

        let err = price_change_percent(dec!(1), -Decimal::MAX).unwrap_err();
        assert!(matches!(err, EsppError::Overflow { .. }), "got {err:?}");
    }

    #[test]
    fn test_change_round_trip() {
        let sale = sale_price_from_change(dec!(42.5), dec!(12.5)).unwrap();
        assert_eq!(price_change_percent(dec!(42.5), sale).unwrap(), dec!(12.5));
    }
}
