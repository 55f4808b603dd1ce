//! Common regex patterns for statement cell parsing.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // ISO dates, as written by spreadsheet date cells: 2024-04-01
    pub static ref DATE_YMD: Regex = Regex::new(
        r"^\s*(\d{4})[./\-](\d{1,2})[./\-](\d{1,2})\b"
    ).unwrap();

    // Day-first numeric dates: 01/04/2024, 1-4-24, 01.04.2024
    pub static ref DATE_DMY: Regex = Regex::new(
        r"^\s*(\d{1,2})[./\-](\d{1,2})[./\-](\d{4}|\d{2})\b"
    ).unwrap();

    // Day-first dates with a month name: 01-Apr-2024, 1 April 24
    pub static ref DATE_DAY_MONTH_NAME: Regex = Regex::new(
        r"(?i)^\s*(\d{1,2})[\s./\-]*([a-z]{3,9})[\s./,\-]*(\d{4}|\d{2})\b"
    ).unwrap();

    // Thousands separators and whitespace inside amount cells
    pub static ref AMOUNT_NOISE: Regex = Regex::new(
        r"[,\s\u{00a0}]"
    ).unwrap();
}
