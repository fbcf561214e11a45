use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use serde_json::Map;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::runtime::utils::format_js_number;

/// The value types an expression function can declare for its arguments and result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprVal {
    Boolean,
    String,
    Number,
    Date,
    Any,
}

impl ExprVal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExprVal::Boolean => "boolean",
            ExprVal::String => "string",
            ExprVal::Number => "number",
            ExprVal::Date => "date",
            ExprVal::Any => "any",
        }
    }
}

impl Display for ExprVal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExprVal {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" => Ok(ExprVal::Boolean),
            "string" => Ok(ExprVal::String),
            "number" => Ok(ExprVal::Number),
            "date" => Ok(ExprVal::Date),
            "any" => Ok(ExprVal::Any),
            other => Err(format!("Unknown value type '{}'", other)),
        }
    }
}

/// Timezone indicator carried by a parsed date.
#[derive(Debug, Clone, PartialEq)]
pub enum DateZone {
    /// Trailing `Z`
    Utc,
    /// Explicit offset, kept as written (upper-cased) next to the parsed offset
    Offset(String, FixedOffset),
    /// No zone given; the wall clock is interpreted by the host
    Local,
}

impl DateZone {
    pub fn label(&self) -> &str {
        match self {
            DateZone::Utc => "utc",
            DateZone::Offset(raw, _) => raw,
            DateZone::Local => "local",
        }
    }
}

/// A date produced by the strict date parser.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprDate {
    pub naive: NaiveDateTime,
    pub zone: DateZone,
    pub raw: String,
}

impl ExprDate {
    pub fn new(naive: NaiveDateTime, zone: DateZone, raw: impl Into<String>) -> Self {
        Self { naive, zone, raw: raw.into() }
    }

    /// The absolute instant, when the zone is known.
    pub fn to_utc(&self) -> Option<DateTime<Utc>> {
        match &self.zone {
            DateZone::Utc => Some(self.naive.and_utc()),
            DateZone::Offset(_, offset) => offset
                .from_local_datetime(&self.naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc)),
            DateZone::Local => None,
        }
    }

    /// ISO-8601 rendering with millisecond precision and the original zone.
    pub fn to_iso_string(&self) -> String {
        let base = self.naive.format("%Y-%m-%dT%H:%M:%S%.3f").to_string();
        match &self.zone {
            DateZone::Utc => format!("{}Z", base),
            DateZone::Offset(_, offset) => format!("{}{}", base, offset),
            DateZone::Local => base,
        }
    }
}

/// An evaluated expression value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Date(ExprDate),
    Array(Vec<Value>),
    Object(Map<String, serde_json::Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<&ExprDate> {
        match self {
            Value::Date(d) => Some(d),
            _ => None,
        }
    }

    /// Infers the expression type from the native representation.
    /// Precedence matters: number, then string, then boolean, everything else is `Any`.
    pub fn infer_type(&self) -> ExprVal {
        match self {
            Value::Number(_) => ExprVal::Number,
            Value::String(_) => ExprVal::String,
            Value::Boolean(_) => ExprVal::Boolean,
            _ => ExprVal::Any,
        }
    }

    /// Name of the native type, as reported in casting errors.
    pub fn native_type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Null | Value::Date(_) | Value::Array(_) | Value::Object(_) => "object",
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 9.007_199_254_740_992e15 {
                    serde_json::Value::Number(serde_json::Number::from(*n as i64))
                } else {
                    serde_json::Number::from_f64(*n)
                        .map(serde_json::Value::Number)
                        .unwrap_or(serde_json::Value::Null)
                }
            }
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => serde_json::Value::String(d.to_iso_string()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => serde_json::Value::Object(map.clone()),
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => f.write_str(&format_js_number(*n)),
            Value::String(s) => f.write_str(s),
            Value::Date(d) => f.write_str(&d.to_iso_string()),
            other => write!(f, "{}", other.to_json()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(map) => Value::Object(map),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn infer_type_follows_native_representation() {
        assert_eq!(Value::Number(1.0).infer_type(), ExprVal::Number);
        assert_eq!(Value::from("1").infer_type(), ExprVal::String);
        assert_eq!(Value::Boolean(true).infer_type(), ExprVal::Boolean);
        assert_eq!(Value::Null.infer_type(), ExprVal::Any);
        assert_eq!(Value::from(json!([1, 2])).infer_type(), ExprVal::Any);
    }

    #[test]
    fn json_conversion_keeps_integers_integral() {
        assert_eq!(Value::from(json!(18)).to_json(), json!(18));
        assert_eq!(Value::Number(3.5).to_json(), json!(3.5));
        assert_eq!(Value::from(json!({"a": [1, "b"]})).to_json(), json!({"a": [1, "b"]}));
    }

    #[test]
    fn expr_val_round_trips_through_names() {
        for ty in [ExprVal::Boolean, ExprVal::String, ExprVal::Number, ExprVal::Date, ExprVal::Any] {
            assert_eq!(ty.as_str().parse::<ExprVal>(), Ok(ty));
        }
        assert!("money".parse::<ExprVal>().is_err());
    }
}
