use chrono::{Datelike, Timelike};
use formexpr::{parse_strict_date, DateParseError, DateZone, ExprDate};
use rstest::rstest;

fn parse(raw: &str) -> ExprDate {
    parse_strict_date(raw)
        .unwrap_or_else(|e| panic!("{} failed: {}", raw, e))
        .unwrap_or_else(|| panic!("{} parsed as blank", raw))
}

#[test]
fn keeps_milliseconds() {
    let d = parse("2021-12-31T23:59:59.999Z");
    assert_eq!(d.naive.nanosecond() / 1_000_000, 999);
    assert_eq!(d.naive.second(), 59);
    assert_eq!(d.zone, DateZone::Utc);
    assert_eq!(d.to_iso_string(), "2021-12-31T23:59:59.999Z");
}

#[rstest]
#[case("2021-12-31T23:59:59.9999999Z", 999)]
#[case("2021-12-31T23:59:59.5", 500)]
#[case("2021-12-31T23:59:59.05", 50)]
#[case("2021-12-31T23:59:59.1234", 123)]
fn fraction_is_truncated_never_rolled_over(#[case] raw: &str, #[case] millis: u32) {
    let d = parse(raw);
    assert_eq!(d.naive.nanosecond() / 1_000_000, millis);
    assert_eq!((d.naive.year(), d.naive.second()), (2021, 59));
}

#[rstest]
#[case("2023", (2023, 1, 1, 0, 0))]
#[case("2023-05-07", (2023, 5, 7, 0, 0))]
#[case("2023-05-07T09:30", (2023, 5, 7, 9, 30))]
#[case("2023-05-07 09:30", (2023, 5, 7, 9, 30))]
#[case("2023-05-07T09:30:15+01:00", (2023, 5, 7, 9, 30))]
#[case("2023-05-07t09:30z", (2023, 5, 7, 9, 30))]
fn accepted_patterns(#[case] raw: &str, #[case] expected: (i32, u32, u32, u32, u32)) {
    let d = parse(raw);
    let n = d.naive;
    assert_eq!((n.year(), n.month(), n.day(), n.hour(), n.minute()), expected);
    assert_eq!(d.raw, raw);
}

#[test]
fn zones_are_tagged() {
    assert_eq!(parse("2023-05-07T09:30").zone, DateZone::Local);
    assert_eq!(parse("2023-05-07T09:30Z").zone, DateZone::Utc);
    assert_eq!(parse("2023-05-07T09:30-0530").zone.label(), "-0530");
    assert_eq!(
        parse("2023-05-07T09:30-05:30").to_utc().unwrap().to_rfc3339(),
        "2023-05-07T15:00:00+00:00"
    );
}

#[rstest]
#[case("2023-05-07T09:30+24:00")]
#[case("2023-05-07T09:30:00+2500")]
#[case("2023-05-07T09:30:00.123-99")]
fn offset_of_a_day_or_more_is_rejected(#[case] raw: &str) {
    assert_eq!(parse_strict_date(raw), Err(DateParseError::InvalidOffset(raw.to_string())));
}

#[rstest]
#[case("2023-02-30")]
#[case("2023-13-01")]
#[case("2023-05-32T10:00")]
#[case("2023-05-07T25:00")]
#[case("2023-05-07T10:60")]
#[case("2023-05-07T10:00:00+01:60")]
fn recognized_but_invalid(#[case] raw: &str) {
    let err = parse_strict_date(raw).unwrap_err();
    assert_eq!(err, DateParseError::InvalidDate(raw.to_string()));
    assert!(err.to_string().ends_with("Format was recognized, but the date/time is invalid"));
}

#[rstest]
#[case("07.05.2023")]
#[case("2023-5-7")]
#[case("20230507")]
#[case("2023-05-07T09")]
#[case("2023-05-07T09:30:00.")]
#[case(" 2023")]
#[case("yesterday")]
fn unknown_formats(#[case] raw: &str) {
    let err = parse_strict_date(raw).unwrap_err();
    assert_eq!(err.to_string(), format!("Unable to parse date \"{}\": Unknown format", raw));
}

#[test]
fn blank_input_is_not_a_date() {
    assert_eq!(parse_strict_date(""), Ok(None));
    assert_eq!(parse_strict_date(" \t "), Ok(None));
}
