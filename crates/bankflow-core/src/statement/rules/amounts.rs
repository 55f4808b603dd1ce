//! Amount parsing for statement cells.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::patterns::AMOUNT_NOISE;

/// Parse an amount cell such as "1,00,000.50" or " 5 000 ".
///
/// Thousands separators and whitespace are stripped. Returns `None` for
/// blank or non-numeric cells.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let cleaned = AMOUNT_NOISE.replace_all(s, "");
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned).ok()
}
