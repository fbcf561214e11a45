//! Strict ISO-8601 subset parser.
//!
//! Only the patterns listed below are accepted, so that an independent backend
//! implementation can agree with this one on every input.

use crate::error::DateParseError;
use crate::types::{DateZone, ExprDate};
use chrono::{FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

const ZONE: &str = r"(Z|[+-][0-9]{2}(?::?[0-9]{2})?)?";

lazy_static::lazy_static! {
    static ref YEAR_ONLY: Regex = Regex::new(r"^([0-9]{4})$").unwrap();
    static ref DATE_ONLY: Regex = Regex::new(r"^([0-9]{4})-([0-9]{2})-([0-9]{2})$").unwrap();
    static ref DATE_MINUTES: Regex = Regex::new(&format!(
        r"^([0-9]{{4}})-([0-9]{{2}})-([0-9]{{2}})[T ]([0-9]{{2}}):([0-9]{{2}}){}$", ZONE
    )).unwrap();
    static ref DATE_SECONDS: Regex = Regex::new(&format!(
        r"^([0-9]{{4}})-([0-9]{{2}})-([0-9]{{2}})[T ]([0-9]{{2}}):([0-9]{{2}}):([0-9]{{2}}){}$", ZONE
    )).unwrap();
    static ref DATE_FRACTION: Regex = Regex::new(&format!(
        r"^([0-9]{{4}})-([0-9]{{2}})-([0-9]{{2}})[T ]([0-9]{{2}}):([0-9]{{2}}):([0-9]{{2}})\.([0-9]+){}$", ZONE
    )).unwrap();
}

#[derive(Default)]
struct Parts<'a> {
    year: &'a str,
    month: Option<&'a str>,
    day: Option<&'a str>,
    hour: Option<&'a str>,
    minute: Option<&'a str>,
    second: Option<&'a str>,
    fraction: Option<&'a str>,
    zone: Option<&'a str>,
}

fn group<'h>(caps: &regex::Captures<'h>, i: usize) -> Option<&'h str> {
    caps.get(i).map(|m| m.as_str())
}

fn match_parts(upper: &str) -> Option<Parts<'_>> {
    if let Some(caps) = YEAR_ONLY.captures(upper) {
        return Some(Parts { year: group(&caps, 1)?, ..Parts::default() });
    }
    if let Some(caps) = DATE_ONLY.captures(upper) {
        return Some(Parts {
            year: group(&caps, 1)?,
            month: group(&caps, 2),
            day: group(&caps, 3),
            ..Parts::default()
        });
    }
    if let Some(caps) = DATE_MINUTES.captures(upper) {
        return Some(Parts {
            year: group(&caps, 1)?,
            month: group(&caps, 2),
            day: group(&caps, 3),
            hour: group(&caps, 4),
            minute: group(&caps, 5),
            zone: group(&caps, 6),
            ..Parts::default()
        });
    }
    if let Some(caps) = DATE_SECONDS.captures(upper) {
        return Some(Parts {
            year: group(&caps, 1)?,
            month: group(&caps, 2),
            day: group(&caps, 3),
            hour: group(&caps, 4),
            minute: group(&caps, 5),
            second: group(&caps, 6),
            zone: group(&caps, 7),
            ..Parts::default()
        });
    }
    if let Some(caps) = DATE_FRACTION.captures(upper) {
        return Some(Parts {
            year: group(&caps, 1)?,
            month: group(&caps, 2),
            day: group(&caps, 3),
            hour: group(&caps, 4),
            minute: group(&caps, 5),
            second: group(&caps, 6),
            fraction: group(&caps, 7),
            zone: group(&caps, 8),
        });
    }
    None
}

fn num(part: Option<&str>, default: u32) -> u32 {
    part.and_then(|p| p.parse::<u32>().ok()).unwrap_or(default)
}

/// Milliseconds from the fractional digits: the first three digits, right-padded
/// with zeros. Longer fractions are truncated rather than rounded, so `.9999999`
/// stays at 999 instead of rolling over into the next second.
fn fraction_millis(fraction: &str) -> u32 {
    let mut digits: String = fraction.chars().take(3).collect();
    while digits.len() < 3 {
        digits.push('0');
    }
    digits.parse::<u32>().unwrap_or(0)
}

fn parse_zone(zone: Option<&str>, raw: &str) -> Result<DateZone, DateParseError> {
    let zone = match zone {
        None => return Ok(DateZone::Local),
        Some("Z") => return Ok(DateZone::Utc),
        Some(z) => z,
    };

    let negative = zone.starts_with('-');
    let digits: String = zone[1..].chars().filter(|c| *c != ':').collect();
    let hours = digits[..2].parse::<i32>().unwrap_or(0);
    let minutes = if digits.len() >= 4 { digits[2..4].parse::<i32>().unwrap_or(0) } else { 0 };

    if hours >= 24 {
        return Err(DateParseError::InvalidOffset(raw.to_string()));
    }
    if minutes >= 60 {
        return Err(DateParseError::InvalidDate(raw.to_string()));
    }

    let seconds = (hours * 3600 + minutes * 60) * if negative { -1 } else { 1 };
    let offset = FixedOffset::east_opt(seconds).ok_or_else(|| DateParseError::InvalidOffset(raw.to_string()))?;
    Ok(DateZone::Offset(zone.to_string(), offset))
}

/// Parses a date string against the accepted patterns.
///
/// Returns `Ok(None)` for blank input that matches no pattern.
pub fn parse_strict_date(raw: &str) -> Result<Option<ExprDate>, DateParseError> {
    let upper = raw.to_uppercase();

    let parts = match match_parts(&upper) {
        Some(parts) => parts,
        None if raw.trim().is_empty() => return Ok(None),
        None => return Err(DateParseError::UnknownFormat(raw.to_string())),
    };

    let zone = parse_zone(parts.zone, raw)?;
    let invalid = || DateParseError::InvalidDate(raw.to_string());

    let year = parts.year.parse::<i32>().map_err(|_| invalid())?;
    let date = NaiveDate::from_ymd_opt(year, num(parts.month, 1), num(parts.day, 1)).ok_or_else(invalid)?;
    let millis = parts.fraction.map(fraction_millis).unwrap_or(0);
    let time = NaiveTime::from_hms_milli_opt(
        num(parts.hour, 0),
        num(parts.minute, 0),
        num(parts.second, 0),
        millis,
    )
    .ok_or_else(invalid)?;

    Ok(Some(ExprDate::new(NaiveDateTime::new(date, time), zone, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn parse(raw: &str) -> ExprDate {
        parse_strict_date(raw).unwrap().unwrap()
    }

    #[test]
    fn test_year_only() {
        let d = parse("2023");
        assert_eq!((d.naive.year(), d.naive.month(), d.naive.day()), (2023, 1, 1));
        assert_eq!(d.zone, DateZone::Local);
    }

    #[test]
    fn test_fraction_padding() {
        assert_eq!(fraction_millis("5"), 500);
        assert_eq!(fraction_millis("05"), 50);
        assert_eq!(fraction_millis("123"), 123);
        assert_eq!(fraction_millis("9999999"), 999);
    }

    #[test]
    fn test_lowercase_zone_matches() {
        let d = parse("2021-06-01t10:00z");
        assert_eq!(d.zone, DateZone::Utc);
        assert_eq!(d.naive.hour(), 10);
        assert_eq!(d.raw, "2021-06-01t10:00z");
    }

    #[test]
    fn test_offset_forms() {
        for raw in ["2021-06-01T10:00:00+0200", "2021-06-01T10:00:00+02:00", "2021-06-01T10:00:00+02"] {
            let d = parse(raw);
            assert_eq!(d.to_utc().unwrap().hour(), 8, "{}", raw);
        }
    }

    #[test]
    fn test_blank_is_none() {
        assert_eq!(parse_strict_date(""), Ok(None));
        assert_eq!(parse_strict_date("   "), Ok(None));
    }
}
