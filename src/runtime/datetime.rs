use crate::error::ExprError;
use crate::runtime::evaluator::EvalContext;
use crate::runtime::function_dispatch::{Args, ExprFunction};
use crate::types::{ExprDate, Value};
use chrono::{Datelike, NaiveDateTime, Timelike};

struct Locale {
    months: [&'static str; 12],
    months_short: [&'static str; 12],
    weekdays: [&'static str; 7],
    weekdays_short: [&'static str; 7],
    am_pm: [&'static str; 2],
    default_format: &'static str,
}

const EN: Locale = Locale {
    months: [
        "January", "February", "March", "April", "May", "June",
        "July", "August", "September", "October", "November", "December",
    ],
    months_short: ["Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec"],
    weekdays: ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"],
    weekdays_short: ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
    am_pm: ["AM", "PM"],
    default_format: "MM/dd/yyyy",
};

const NB: Locale = Locale {
    months: [
        "januar", "februar", "mars", "april", "mai", "juni",
        "juli", "august", "september", "oktober", "november", "desember",
    ],
    months_short: ["jan.", "feb.", "mar.", "apr.", "mai", "jun.", "jul.", "aug.", "sep.", "okt.", "nov.", "des."],
    weekdays: ["mandag", "tirsdag", "onsdag", "torsdag", "fredag", "lørdag", "søndag"],
    weekdays_short: ["man.", "tir.", "ons.", "tor.", "fre.", "lør.", "søn."],
    am_pm: ["a.m.", "p.m."],
    default_format: "dd.MM.yyyy",
};

fn locale_for(language: &str) -> &'static Locale {
    match language {
        "en" => &EN,
        _ => &NB,
    }
}

fn pad(n: impl Into<i64>, width: usize) -> String {
    let n = n.into();
    if n < 0 {
        format!("-{:0width$}", -n, width = width)
    } else {
        format!("{:0width$}", n, width = width)
    }
}

// Renders one run of a pattern letter; `None` for tokens outside the supported set.
fn render_token(letter: char, count: usize, dt: &NaiveDateTime, locale: &Locale) -> Option<String> {
    let month = dt.month0() as usize;
    let weekday = dt.weekday().num_days_from_monday() as usize;
    let hour12 = match dt.hour() % 12 {
        0 => 12,
        h => h,
    };

    let out = match (letter, count) {
        ('y', 1) => dt.year().to_string(),
        ('y', 2) => pad(dt.year().rem_euclid(100), 2),
        ('y', n @ 3..=4) => pad(dt.year(), n),
        ('M', n @ 1..=2) => pad(dt.month(), n),
        ('M', 3) => locale.months_short[month].to_string(),
        ('M', 4) => locale.months[month].to_string(),
        ('M', 5) => locale.months[month].chars().take(1).collect::<String>().to_uppercase(),
        ('d', n @ 1..=2) => pad(dt.day(), n),
        ('E', 1..=3) => locale.weekdays_short[weekday].to_string(),
        ('E', 4) => locale.weekdays[weekday].to_string(),
        ('E', 5) => locale.weekdays[weekday].chars().take(1).collect::<String>().to_uppercase(),
        ('H', n @ 1..=2) => pad(dt.hour(), n),
        ('h', n @ 1..=2) => pad(hour12, n),
        ('m', n @ 1..=2) => pad(dt.minute(), n),
        ('s', n @ 1..=2) => pad(dt.second(), n),
        ('S', n @ 1..=3) => pad(dt.nanosecond() / 1_000_000, 3)[..n].to_string(),
        ('a', 1) => locale.am_pm[usize::from(dt.hour() >= 12)].to_string(),
        _ => return None,
    };
    Some(out)
}

/// Formats a date with a Unicode-style pattern (`dd.MM.yyyy HH:mm`).
/// Text between single quotes is copied verbatim; `''` is a literal quote.
pub fn format_date(date: &ExprDate, format: &str, language: &str) -> Option<String> {
    let locale = locale_for(language);
    let dt = date.naive;
    let chars: Vec<char> = format.chars().collect();
    let mut out = String::with_capacity(format.len() + 8);
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '\'' {
            if chars.get(i + 1) == Some(&'\'') {
                out.push('\'');
                i += 2;
                continue;
            }
            let mut j = i + 1;
            while j < chars.len() {
                if chars[j] == '\'' {
                    if chars.get(j + 1) == Some(&'\'') {
                        out.push('\'');
                        j += 2;
                        continue;
                    }
                    break;
                }
                out.push(chars[j]);
                j += 1;
            }
            i = j + 1;
        } else if c.is_ascii_alphabetic() {
            let mut j = i;
            while j < chars.len() && chars[j] == c {
                j += 1;
            }
            out.push_str(&render_token(c, j - i, &dt, locale)?);
            i = j;
        } else {
            out.push(c);
            i += 1;
        }
    }

    Some(out)
}

pub fn exec_datetime(func: ExprFunction, ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    match func {
        ExprFunction::FormatDate => {
            let date = match args.get(0).as_date() {
                Some(d) => d,
                None => return Ok(Value::Null),
            };
            let language = ctx.data_sources.current_language();
            let format = args.str(1).unwrap_or(locale_for(&language).default_format);
            format_date(date, format, &language)
                .map(Value::String)
                .ok_or_else(|| ctx.runtime_error(format!("Unsupported date format token in '{}'", format)))
        }
        _ => Err(ctx.runtime_error(format!("Unknown datetime function: {}", func.name()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::date_parser::parse_strict_date;

    fn date(raw: &str) -> ExprDate {
        parse_strict_date(raw).unwrap().unwrap()
    }

    #[test]
    fn test_numeric_tokens() {
        let d = date("2023-05-07T09:05:03.789Z");
        assert_eq!(format_date(&d, "dd.MM.yyyy", "nb").unwrap(), "07.05.2023");
        assert_eq!(format_date(&d, "d/M/yy H:m:s", "nb").unwrap(), "7/5/23 9:5:3");
        assert_eq!(format_date(&d, "HH:mm:ss.SSS", "nb").unwrap(), "09:05:03.789");
        assert_eq!(format_date(&d, "hh a", "en").unwrap(), "09 AM");
    }

    #[test]
    fn test_names_follow_language() {
        let d = date("2023-05-15T13:00");
        assert_eq!(format_date(&d, "EEEE d. MMMM", "nb").unwrap(), "mandag 15. mai");
        assert_eq!(format_date(&d, "EEE, MMM d", "en").unwrap(), "Mon, May 15");
        assert_eq!(format_date(&d, "h a", "nb").unwrap(), "1 p.m.");
    }

    #[test]
    fn test_quoted_literals() {
        let d = date("2023-05-15");
        assert_eq!(format_date(&d, "'Year' yyyy, 'o''clock'", "en").unwrap(), "Year 2023, o'clock");
        assert_eq!(format_date(&d, "''yyyy", "en").unwrap(), "'2023");
    }

    #[test]
    fn test_unsupported_token() {
        let d = date("2023-05-15");
        assert_eq!(format_date(&d, "yyyy Q", "en"), None);
        assert_eq!(format_date(&d, "yyyyy", "en"), None);
    }
}
