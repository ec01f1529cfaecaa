// Utility helpers for parsing and basic arithmetic.
//
// This module centralizes the "dirty" CSV number/date handling so the
// aggregators can assume clean, typed values.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Parse a quantity written in Brazilian notation (`1.234,56`).
///
/// - Trims whitespace.
/// - Removes `.` thousands separators, then turns the `,` decimal mark into `.`.
/// - Rejects values that contain alphabetic characters.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_decimal_br(s: Option<&str>) -> Option<f64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if s.chars().any(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    let s = s.replace('.', "").replace(',', ".");
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

const DATE_FORMATS: [&str; 2] = ["%d/%m/%Y", "%Y-%m-%d"];
const DATETIME_FORMATS: [&str; 3] = ["%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M", "%Y-%m-%d %H:%M:%S"];

/// Parse a movement date, day first. A trailing time of day is accepted and
/// discarded.
pub fn parse_date_dayfirst(s: Option<&str>) -> Option<NaiveDate> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
}

/// Zero-guarded division: `0` whenever the denominator is zero.
pub fn ratio(total: f64, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

pub fn average(v: &[f64]) -> f64 {
    // Arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    ratio(v.iter().copied().sum(), v.len())
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimal places with thousands separators (e.g. `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

/// `tabled` display hook for quantities.
pub fn display_qty(v: &f64) -> String {
    format_number(*v, 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_br() {
        assert_eq!(parse_decimal_br(Some("1.234,56")), Some(1234.56));
        assert_eq!(parse_decimal_br(Some(" 10 ")), Some(10.0));
        assert_eq!(parse_decimal_br(Some("-5,5")), Some(-5.5));
        assert_eq!(parse_decimal_br(Some("")), None);
        assert_eq!(parse_decimal_br(Some("abc")), None);
        assert_eq!(parse_decimal_br(None), None);
    }

    #[test]
    fn test_parse_date_dayfirst() {
        let d = NaiveDate::from_ymd_opt(2023, 3, 4).unwrap();
        assert_eq!(parse_date_dayfirst(Some("04/03/2023")), Some(d));
        assert_eq!(parse_date_dayfirst(Some("04/03/2023 10:15")), Some(d));
        assert_eq!(parse_date_dayfirst(Some("04/03/2023 10:15:30")), Some(d));
        assert_eq!(parse_date_dayfirst(Some("2023-03-04")), Some(d));
        assert_eq!(parse_date_dayfirst(Some("31/02/2023")), None);
        assert_eq!(parse_date_dayfirst(Some("  ")), None);
    }

    #[test]
    fn test_ratio_zero_guard() {
        assert_eq!(ratio(30.0, 2), 15.0);
        assert_eq!(ratio(30.0, 0), 0.0);
        assert_eq!(average(&[]), 0.0);
        assert_eq!(average(&[10.0, 30.0]), 20.0);
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-42.0, 1), "-42.0");
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_int(9855), "9,855");
    }
}
