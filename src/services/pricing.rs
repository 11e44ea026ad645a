//! Line-item money arithmetic.
//!
//! Form inputs are text; blank or unparsable input counts as zero. Products
//! are taken in decimal arithmetic and rounded to two places, midpoint away
//! from zero.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

pub const MONEY_SCALE: u32 = 2;

/// Parses a numeric form field; blank or invalid text is zero.
pub fn parse_amount(raw: &str) -> Decimal {
    try_parse_amount(raw).ok().flatten().unwrap_or(Decimal::ZERO)
}

/// Strict variant used on submit: `Ok(None)` for blank, `Err` for garbage.
pub fn try_parse_amount(raw: &str) -> Result<Option<Decimal>, String> {
    let trimmed = raw.trim().replace(',', "");
    if trimmed.is_empty() {
        return Ok(None);
    }
    Decimal::from_str(&trimmed)
        .or_else(|_| Decimal::from_scientific(&trimmed))
        .map(Some)
        .map_err(|_| format!("'{}' is not a number", raw.trim()))
}

/// Converts an API number to a decimal via its shortest decimal rendering.
pub fn to_decimal(value: f64) -> Decimal {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_str(&value.to_string())
        .ok()
        .or_else(|| Decimal::from_f64(value))
        .unwrap_or(Decimal::ZERO)
}

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

pub fn to_money(value: f64) -> Decimal {
    round_money(to_decimal(value))
}

pub fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}

/// weight × price per kg, rounded to paise.
pub fn line_total(weight: Decimal, price_per_kg: Decimal) -> Decimal {
    weight
        .checked_mul(price_per_kg)
        .map(round_money)
        .unwrap_or(Decimal::ZERO)
}

pub fn line_total_from_inputs(weight: &str, price_per_kg: &str) -> Decimal {
    line_total(parse_amount(weight), parse_amount(price_per_kg))
}

pub fn line_total_from_numbers(weight: f64, price_per_kg: f64) -> Decimal {
    line_total(to_decimal(weight), to_decimal(price_per_kg))
}

/// `"500.00"`
pub fn format_amount(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

/// `"₹500.00"`, with the sign ahead of the symbol for negatives.
pub fn format_currency(symbol: &str, value: Decimal) -> String {
    let rounded = round_money(value);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}{}", symbol, format_amount(rounded.abs()))
    } else {
        format!("{}{}", symbol, format_amount(rounded.abs()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case("10", "50", "500.00")]
    #[case("", "50", "0.00")]
    #[case("10", "", "0.00")]
    #[case("abc", "50", "0.00")]
    #[case("2.5", "3.3", "8.25")]
    #[case("0.1", "0.2", "0.02")]
    #[case("1.005", "1", "1.01")]
    #[case("1,250", "2", "2500.00")]
    fn line_totals_from_form_text(#[case] weight: &str, #[case] rate: &str, #[case] expected: &str) {
        assert_eq!(format_amount(line_total_from_inputs(weight, rate)), expected);
    }

    #[test]
    fn currency_formatting() {
        assert_eq!(format_currency("₹", dec!(500)), "₹500.00");
        assert_eq!(format_currency("₹", dec!(-12.345)), "-₹12.35");
        assert_eq!(format_currency("Rs. ", dec!(0)), "Rs. 0.00");
    }

    #[test]
    fn api_numbers_convert_without_binary_noise() {
        assert_eq!(to_decimal(0.1), dec!(0.1));
        assert_eq!(line_total_from_numbers(0.1, 3.0), dec!(0.30));
        assert_eq!(to_decimal(f64::NAN), Decimal::ZERO);
    }

    #[test]
    fn strict_parse_reports_garbage() {
        assert_eq!(try_parse_amount("  "), Ok(None));
        assert_eq!(try_parse_amount("12.5"), Ok(Some(dec!(12.5))));
        assert!(try_parse_amount("12kg").is_err());
    }
}
