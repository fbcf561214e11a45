use crate::error::{ErrorKind, ExprError};
use crate::runtime::date_parser::parse_strict_date;
use crate::runtime::evaluator::EvalContext;
use crate::runtime::utils::format_js_number;
use crate::types::{ExprVal, Value};
use regex::Regex;
use std::collections::HashMap;

/// Whether a cast converts a function argument or a function/expression result.
/// Only changes which error reports a rejected source type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastRole {
    Argument,
    Result,
}

type CastFn = fn(Value, &EvalContext<'_>) -> Result<Value, ExprError>;

/// One entry of the casting table.
pub struct CastRule {
    pub nullable: bool,
    pub accepts: &'static [ExprVal],
    pub cast: CastFn,
}

const ALL_PRIMITIVES: &[ExprVal] = &[ExprVal::Boolean, ExprVal::String, ExprVal::Number, ExprVal::Any];
const DATE_SOURCES: &[ExprVal] = &[ExprVal::String, ExprVal::Number, ExprVal::Date, ExprVal::Any];

lazy_static::lazy_static! {
    static ref INTEGER: Regex = Regex::new(r"^-?[0-9]+$").unwrap();
    static ref DECIMAL: Regex = Regex::new(r"^-?[0-9]+\.[0-9]+$").unwrap();

    static ref CASTING_TABLE: HashMap<ExprVal, CastRule> = {
        let mut table = HashMap::new();
        table.insert(ExprVal::Boolean, CastRule { nullable: true, accepts: ALL_PRIMITIVES, cast: cast_boolean });
        table.insert(ExprVal::String, CastRule { nullable: true, accepts: ALL_PRIMITIVES, cast: cast_string });
        table.insert(ExprVal::Number, CastRule { nullable: true, accepts: ALL_PRIMITIVES, cast: cast_number });
        table.insert(ExprVal::Any, CastRule { nullable: true, accepts: ALL_PRIMITIVES, cast: cast_any });
        table.insert(ExprVal::Date, CastRule { nullable: true, accepts: DATE_SOURCES, cast: cast_date });
        table
    };
}

/// Strict numeric parsing shared by the boolean and number rules.
pub fn as_number(s: &str) -> Option<f64> {
    if INTEGER.is_match(s) || DECIMAL.is_match(s) {
        s.parse::<f64>().ok()
    } else {
        None
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => serde_json::Value::String(s.clone()).to_string(),
        Value::Number(n) => format_js_number(*n),
        other => other.to_json().to_string(),
    }
}

fn unexpected(ctx: &EvalContext<'_>, expected: &'static str, value: &Value) -> ExprError {
    ctx.error(ErrorKind::UnexpectedType { expected, actual: describe(value) })
}

fn cast_any(value: Value, _ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    Ok(value)
}

fn cast_boolean(value: Value, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    let num = match &value {
        Value::Boolean(b) => return Ok(Value::Boolean(*b)),
        Value::String(s) if s == "true" => return Ok(Value::Boolean(true)),
        Value::String(s) if s == "false" => return Ok(Value::Boolean(false)),
        Value::String(s) => as_number(s),
        Value::Number(n) => Some(*n),
        _ => None,
    };
    match num {
        Some(n) if n == 1.0 => Ok(Value::Boolean(true)),
        Some(n) if n == 0.0 => Ok(Value::Boolean(false)),
        _ => Err(unexpected(ctx, "boolean", &value)),
    }
}

fn cast_string(value: Value, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    match value {
        // JSON-style stringification: non-finite numbers become the text "null"
        Value::Number(n) if !n.is_finite() => Ok(Value::String("null".to_string())),
        Value::Number(n) => Ok(Value::String(format_js_number(n))),
        Value::Boolean(b) => Ok(Value::String(b.to_string())),
        Value::String(s) => {
            // Reserved words are lowercased so comparisons are case-insensitive
            match s.to_lowercase().as_str() {
                "null" => Ok(Value::Null),
                "false" => Ok(Value::String("false".to_string())),
                "true" => Ok(Value::String("true".to_string())),
                _ => Ok(Value::String(s)),
            }
        }
        Value::Date(d) => Ok(Value::String(d.raw)),
        other => Err(unexpected(ctx, "string", &other)),
    }
}

fn cast_number(value: Value, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    match &value {
        Value::Number(n) => Ok(Value::Number(*n)),
        Value::String(s) => as_number(s).map(Value::Number).ok_or_else(|| unexpected(ctx, "number", &value)),
        _ => Err(unexpected(ctx, "number", &value)),
    }
}

fn cast_date(value: Value, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
    let raw = match value {
        Value::Date(d) => return Ok(Value::Date(d)),
        // A bare number may be a year
        Value::Number(n) => format_js_number(n),
        Value::String(s) if s.is_empty() => return Ok(Value::Null),
        Value::String(s) => s,
        other => return Err(unexpected(ctx, "date", &other)),
    };
    match parse_strict_date(&raw) {
        Ok(Some(date)) => Ok(Value::Date(date)),
        // Blank input means no date
        Ok(None) => Ok(Value::Null),
        Err(e) => Err(ctx.runtime_error(e.to_string())),
    }
}

/// Casts `value` to `target` through the casting table.
///
/// `target` is `None` when no type is declared for a position, which is reported
/// as an unknown target type.
pub fn cast_value(value: Value, target: Option<ExprVal>, ctx: &EvalContext<'_>, role: CastRole) -> Result<Value, ExprError> {
    let target = target.ok_or_else(|| ctx.error(ErrorKind::UnknownTargetType("undefined".to_string())))?;
    let rule = CASTING_TABLE
        .get(&target)
        .ok_or_else(|| ctx.error(ErrorKind::UnknownTargetType(target.to_string())))?;

    let null_like = matches!(&value, Value::Null) || matches!(&value, Value::String(s) if s == "null");
    if rule.nullable && null_like {
        return Ok(Value::Null);
    }

    let source = value.infer_type();
    if !rule.accepts.contains(&source) {
        let mut supported: Vec<&str> = rule.accepts.iter().map(ExprVal::as_str).collect();
        if rule.nullable {
            supported.push("null");
        }
        let actual = value.native_type_name().to_string();
        let supported = supported.join(", ");
        let kind = match role {
            CastRole::Argument => ErrorKind::UnknownArgType { actual, supported },
            CastRole::Result => ErrorKind::UnknownSourceType { actual, supported },
        };
        return Err(ctx.error(kind));
    }

    (rule.cast)(value, ctx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_number_pattern() {
        assert_eq!(as_number("42"), Some(42.0));
        assert_eq!(as_number("-3.14"), Some(-3.14));
        assert_eq!(as_number("1e3"), None);
        assert_eq!(as_number(" 1"), None);
        assert_eq!(as_number("1."), None);
        assert_eq!(as_number(".5"), None);
        assert_eq!(as_number("+1"), None);
        assert_eq!(as_number("١٢"), None);
    }

    #[test]
    fn every_type_has_a_rule() {
        for ty in [ExprVal::Boolean, ExprVal::String, ExprVal::Number, ExprVal::Date, ExprVal::Any] {
            assert!(CASTING_TABLE.contains_key(&ty));
            assert!(CASTING_TABLE[&ty].nullable);
        }
    }
}
