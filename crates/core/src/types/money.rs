//! Money display helpers.
//!
//! All prices in the shop are Algerian dinars stored as [`Decimal`]. There is
//! no multi-currency support; what lives here is the single display format
//! used by both binaries ("1 250 DA").

use rust_decimal::Decimal;

/// Currency suffix used across the shop.
pub const CURRENCY: &str = "DA";

/// Format an amount for display, grouping thousands with spaces.
///
/// Trailing fractional zeros are dropped; the dinar has no commonly used
/// subunit on price tags.
#[must_use]
pub fn format_da(amount: Decimal) -> String {
    let normalized = amount.normalize();
    let raw = normalized.to_string();
    let (integer, fraction) = raw.split_once('.').map_or((raw.as_str(), None), |(i, f)| (i, Some(f)));

    let (sign, digits) = integer
        .strip_prefix('-')
        .map_or(("", integer), |rest| ("-", rest));

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f} {CURRENCY}"),
        None => format!("{sign}{grouped} {CURRENCY}"),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_format_groups_thousands() {
        assert_eq!(format_da(Decimal::from(1250)), "1 250 DA");
        assert_eq!(format_da(Decimal::from(999)), "999 DA");
        assert_eq!(format_da(Decimal::from(1_234_567)), "1 234 567 DA");
    }

    #[test]
    fn test_format_drops_trailing_zeros() {
        assert_eq!(format_da(Decimal::new(350_000, 2)), "3 500 DA");
    }

    #[test]
    fn test_format_keeps_meaningful_fraction() {
        assert_eq!(format_da(Decimal::new(12_345, 1)), "1 234.5 DA");
    }

    #[test]
    fn test_format_zero_and_negative() {
        assert_eq!(format_da(Decimal::ZERO), "0 DA");
        assert_eq!(format_da(Decimal::from(-1500)), "-1 500 DA");
    }
}
