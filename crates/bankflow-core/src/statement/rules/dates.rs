//! Day-first date parsing for statement cells.

use chrono::NaiveDate;

use super::patterns::{DATE_DAY_MONTH_NAME, DATE_DMY, DATE_YMD};
use crate::models::transaction::FieldOutcome;

/// Parse a statement date, reading ambiguous numeric dates day-first.
pub fn parse_day_first(text: &str) -> Option<NaiveDate> {
    if let Some(caps) = DATE_YMD.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let day: u32 = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DMY.captures(text) {
        let day: u32 = caps[1].parse().ok()?;
        let month: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DATE_DAY_MONTH_NAME.captures(text) {
        let day: u32 = caps[1].parse().ok()?;
        let month = month_name_to_number(&caps[2])?;
        let year = parse_year(&caps[3])?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    None
}

/// Parse a date cell, substituting `fallback` when it is missing or malformed.
pub fn parse_date_or(cell: Option<&str>, fallback: NaiveDate) -> FieldOutcome<NaiveDate> {
    match cell.and_then(parse_day_first) {
        Some(date) => FieldOutcome::Parsed(date),
        None => FieldOutcome::Defaulted(fallback),
    }
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() <= 2 {
        // Two-digit year: 00-50 -> 2000s, 51-99 -> 1900s
        if year <= 50 {
            Some(2000 + year)
        } else {
            Some(1900 + year)
        }
    } else {
        Some(year)
    }
}

fn month_name_to_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    let month = match name.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}
