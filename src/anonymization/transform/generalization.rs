//! Generalization transformer
//!
//! Numbers fall into buckets of width `10^level`. Integers render `lo-hi`
//! with an inclusive upper bound (`27` at level 1 becomes `20-29`); decimals
//! render half-open (`29.5` becomes `[20,30)`). Dates become a quarter, a
//! year or a decade for levels 1, 2 and 3.

use super::{CellInput, Transformer};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Range and period bucketing
pub struct Generalization;

impl Transformer for Generalization {
    fn apply(&self, input: &CellInput<'_>) -> Result<String, String> {
        generalize(input.value, input.options.level())
    }
}

/// Generalizes a numeric or date value
pub fn generalize(value: &str, level: u8) -> Result<String, String> {
    if !(1..=3).contains(&level) {
        return Err(format!("generalization level {level} is outside 1..=3"));
    }
    let trimmed = value.trim();
    let width = 10_i64.pow(u32::from(level));
    if let Ok(integer) = trimmed.parse::<i64>() {
        return integer_bucket(integer, width);
    }
    if let Ok(number) = trimmed.parse::<f64>() {
        if number.is_finite() {
            return decimal_bucket(number, width);
        }
    }
    if let Some(date) = parse_date(trimmed) {
        return Ok(date_bucket(date, level));
    }
    Err("value is neither a number nor a recognised date".to_string())
}

const OUT_OF_RANGE: &str = "value out of range for generalization";

fn integer_bucket(value: i64, width: i64) -> Result<String, String> {
    let lo = value.div_euclid(width) * width;
    let hi = lo.checked_add(width - 1).ok_or(OUT_OF_RANGE)?;
    Ok(format!("{lo}-{hi}"))
}

fn decimal_bucket(value: f64, width: i64) -> Result<String, String> {
    let quotient = (value / width as f64).floor();
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive.
    if quotient < i64::MIN as f64 || quotient >= i64::MAX as f64 {
        return Err(OUT_OF_RANGE.to_string());
    }
    let lo = (quotient as i64).checked_mul(width).ok_or(OUT_OF_RANGE)?;
    let hi = lo.checked_add(width).ok_or(OUT_OF_RANGE)?;
    Ok(format!("[{lo},{hi})"))
}

fn date_bucket(date: NaiveDate, level: u8) -> String {
    match level {
        1 => format!("{}-Q{}", date.year(), date.month0() / 3 + 1),
        2 => date.year().to_string(),
        _ => format!("{}s", date.year().div_euclid(10) * 10),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(value, "%m/%d/%Y").ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("27", 1, "20-29")]
    #[test_case("34", 1, "30-39")]
    #[test_case("30", 1, "30-39")]
    #[test_case("27", 2, "0-99")]
    #[test_case("1234", 3, "1000-1999")]
    #[test_case("-3", 1, "-10--1")]
    #[test_case("9007199254740993", 1, "9007199254740990-9007199254740999")]
    fn test_integer_buckets(value: &str, level: u8, expected: &str) {
        assert_eq!(generalize(value, level).unwrap(), expected);
    }

    #[test_case("29.5", 1, "[20,30)")]
    #[test_case("27.9", 2, "[0,100)")]
    #[test_case("-0.5", 1, "[-10,0)")]
    #[test_case("1e3", 3, "[1000,2000)")]
    fn test_decimal_buckets(value: &str, level: u8, expected: &str) {
        assert_eq!(generalize(value, level).unwrap(), expected);
    }

    #[test_case("1e20", 1 ; "large positive")]
    #[test_case("-1e20", 1 ; "large negative")]
    #[test_case("9.3e18", 1 ; "just past i64")]
    #[test_case("9223372036854775807", 1 ; "i64 max")]
    #[test_case("99999999999999999999", 3 ; "integer beyond i64")]
    fn test_out_of_range_is_rejected(value: &str, level: u8) {
        assert_eq!(
            generalize(value, level).unwrap_err(),
            "value out of range for generalization"
        );
    }

    #[test_case("2024-02-15", 1, "2024-Q1")]
    #[test_case("2024-11-30", 1, "2024-Q4")]
    #[test_case("2024-02-15", 2, "2024")]
    #[test_case("1987-06-01", 3, "1980s")]
    #[test_case("2024-07-04T10:30:00Z", 1, "2024-Q3")]
    #[test_case("2024-07-04T10:30:00", 2, "2024")]
    #[test_case("07/04/2024", 1, "2024-Q3")]
    fn test_date_buckets(value: &str, level: u8, expected: &str) {
        assert_eq!(generalize(value, level).unwrap(), expected);
    }

    #[test]
    fn test_text_is_rejected() {
        assert!(generalize("Jane Doe", 1).is_err());
        assert!(generalize("NaN", 1).is_err());
    }

    #[test]
    fn test_level_out_of_range() {
        assert!(generalize("27", 0).is_err());
        assert!(generalize("27", 4).is_err());
    }
}
