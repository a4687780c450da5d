//! Formatting and input parsing helpers
//!
//! Amounts are shown with Brazilian conventions (`R$ 1.234,56`) and
//! accepted in either `1234.56` or `1.234,56` form.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::error::CalcError;

/// Currency symbol options for formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencySymbol {
    /// Include "R$ " prefix (Brazilian Real)
    BRL,
    /// No currency symbol
    None,
}

/// Format a Decimal with Brazilian separators, rounded to `dp` places.
///
/// # Examples
/// ```
/// use cdi_calc::utils::{format_decimal_br, CurrencySymbol};
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_decimal_br(dec!(1234.5), 2, CurrencySymbol::BRL), "R$ 1.234,50");
/// assert_eq!(format_decimal_br(dec!(0.00043739), 6, CurrencySymbol::None), "0,000437");
/// ```
pub fn format_decimal_br(value: Decimal, dp: u32, symbol: CurrencySymbol) -> String {
    let rounded = value.round_dp(dp);
    let is_negative = rounded < Decimal::ZERO;
    let formatted = format!("{:.*}", dp as usize, rounded.abs());
    let (integer_part, decimal_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted, None),
    };

    // Thousands separators (.) on the integer part
    let digits: Vec<char> = integer_part.chars().collect();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    let sign = if is_negative { "-" } else { "" };
    let prefix = match symbol {
        CurrencySymbol::BRL => "R$ ",
        CurrencySymbol::None => "",
    };

    match decimal_part {
        Some(frac) => format!("{}{}{},{}", prefix, sign, grouped, frac),
        None => format!("{}{}{}", prefix, sign, grouped),
    }
}

/// Format as Brazilian Real with symbol: "R$ 1.234,56"
///
/// # Examples
/// ```
/// use cdi_calc::utils::format_currency;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_currency(dec!(1002.0016)), "R$ 1.002,00");
/// assert_eq!(format_currency(dec!(-500)), "R$ -500,00");
/// ```
pub fn format_currency(value: Decimal) -> String {
    format_decimal_br(value, 2, CurrencySymbol::BRL)
}

/// Format a fraction as a percentage: 0.042 -> "4,20%" with `dp = 2`.
///
/// Fails when the fraction is too large to be expressed in percent.
pub fn format_percent_dp(fraction: Decimal, dp: u32) -> Result<String, CalcError> {
    let percent = fraction.checked_mul(Decimal::ONE_HUNDRED).ok_or_else(|| {
        CalcError::InvalidInput(format!("{} is too large to show as a percentage", fraction))
    })?;
    Ok(format!("{}%", format_decimal_br(percent, dp, CurrencySymbol::None)))
}

/// Format a fraction as a percentage with 2 decimals
pub fn format_percent(fraction: Decimal) -> Result<String, CalcError> {
    format_percent_dp(fraction, 2)
}

/// Parse a monetary amount.
///
/// A comma marks the Brazilian form (`1.234,56`); otherwise the dot is the
/// decimal separator (`1234.56`). An optional `R$` prefix is ignored.
pub fn parse_amount(input: &str) -> Result<Decimal, CalcError> {
    let trimmed = input.trim();
    let trimmed = trimmed.strip_prefix("R$").unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return Err(CalcError::InvalidInput("empty amount".to_string()));
    }

    let cleaned = if trimmed.contains(',') {
        trimmed.replace('.', "").replace(',', ".")
    } else {
        trimmed.to_string()
    };

    Decimal::from_str(&cleaned)
        .map_err(|err| CalcError::InvalidInput(format!("invalid amount '{}': {}", input, err)))
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_iso_date(input: &str) -> Result<NaiveDate, CalcError> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d").map_err(|err| {
        CalcError::InvalidInput(format!(
            "invalid date '{}' (expected YYYY-MM-DD): {}",
            input, err
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_format_currency_basic() {
        assert_eq!(format_currency(dec!(1234.56)), "R$ 1.234,56");
        assert_eq!(format_currency(dec!(0.99)), "R$ 0,99");
        assert_eq!(format_currency(dec!(1000000)), "R$ 1.000.000,00");
        assert_eq!(format_currency(dec!(123)), "R$ 123,00");
    }

    #[test]
    fn test_format_currency_rounds() {
        assert_eq!(format_currency(dec!(1002.0016006)), "R$ 1.002,00");
        assert_eq!(format_currency(dec!(901.80144)), "R$ 901,80");
        assert_eq!(format_currency(dec!(1.239)), "R$ 1,24");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(dec!(-1234.56)), "R$ -1.234,56");
        assert_eq!(format_currency(dec!(-0.001)), "R$ 0,00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(dec!(0.42)).unwrap(), "42,00%");
        assert_eq!(format_percent(dec!(0.042)).unwrap(), "4,20%");
        assert_eq!(format_percent(dec!(-0.0123)).unwrap(), "-1,23%");
        assert_eq!(format_percent(Decimal::ZERO).unwrap(), "0,00%");
        assert_eq!(format_percent_dp(dec!(0.00043739), 6).unwrap(), "0,043739%");
    }

    #[test]
    fn test_format_percent_overflow() {
        // 4.2e28 fits as a fraction but not once scaled to percent
        let huge = dec!(42000000000000000000000000000);
        assert_eq!(format_percent(huge).unwrap_err().kind(), "invalid_input");
        assert_eq!(format_percent(Decimal::MIN).unwrap_err().kind(), "invalid_input");
    }

    #[test]
    fn test_format_without_decimals() {
        assert_eq!(format_decimal_br(dec!(1234567), 0, CurrencySymbol::None), "1.234.567");
    }

    #[test]
    fn test_parse_amount_forms() {
        assert_eq!(parse_amount("1234.56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("1.234,56").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("R$ 1.000,00").unwrap(), dec!(1000));
        assert_eq!(parse_amount(" 100 ").unwrap(), dec!(100));
        assert_eq!(parse_amount("-5,5").unwrap(), dec!(-5.5));
    }

    #[test]
    fn test_parse_amount_errors() {
        assert_eq!(parse_amount("").unwrap_err().kind(), "invalid_input");
        assert_eq!(parse_amount("R$").unwrap_err().kind(), "invalid_input");
        assert_eq!(parse_amount("abc").unwrap_err().kind(), "invalid_input");
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap()
        );
        assert!(parse_iso_date("05/01/2024").is_err());
        assert!(parse_iso_date("2024-02-30").is_err());
    }
}
