//! Price parsing and display helpers.
//!
//! The backend transmits prices as numeric strings (`"150.00"`). Parsing is
//! lenient: an unparseable string is treated as zero, never an error.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a numeric-as-string price, defaulting to zero on failure.
pub fn parse_price(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or(Decimal::ZERO)
}

/// Format a price for display: `¥ 150.00`.
pub fn format_price(price: Decimal) -> String {
    format!("¥ {:.2}", price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_plain() {
        assert_eq!(parse_price("150.00"), Decimal::from_str("150.00").unwrap());
        assert_eq!(parse_price(" 0.5 "), Decimal::from_str("0.5").unwrap());
    }

    #[test]
    fn test_parse_price_garbage_is_zero() {
        assert_eq!(parse_price(""), Decimal::ZERO);
        assert_eq!(parse_price("n/a"), Decimal::ZERO);
        assert_eq!(parse_price("12,5"), Decimal::ZERO);
    }

    #[test]
    fn test_format_price_two_places() {
        assert_eq!(format_price(Decimal::from_str("110").unwrap()), "¥ 110.00");
        assert_eq!(format_price(Decimal::from_str("99.5").unwrap()), "¥ 99.50");
    }
}
