use crate::error::ExprError;
use crate::runtime::evaluator::EvalContext;
use crate::runtime::function_dispatch::{Args, ExprFunction};
use crate::types::Value;

fn both<'v>(args: &Args<'v>) -> Option<(&'v str, &'v str)> {
    Some((args.str(0)?, args.str(1)?))
}

pub fn exec_string(func: ExprFunction, ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    match func {
        ExprFunction::Concat => {
            let joined: String = args.iter().filter_map(Value::as_str).collect();
            Ok(Value::String(joined))
        }
        ExprFunction::Contains => Ok(Value::Boolean(both(args).map(|(s, sub)| s.contains(sub)).unwrap_or(false))),
        // A null on either side "does not contain"
        ExprFunction::NotContains => Ok(Value::Boolean(both(args).map(|(s, sub)| !s.contains(sub)).unwrap_or(true))),
        ExprFunction::StartsWith => Ok(Value::Boolean(both(args).map(|(s, p)| s.starts_with(p)).unwrap_or(false))),
        ExprFunction::EndsWith => Ok(Value::Boolean(both(args).map(|(s, p)| s.ends_with(p)).unwrap_or(false))),
        ExprFunction::StringLength => {
            // Length in UTF-16 code units
            let len = args.str(0).map(|s| s.encode_utf16().count()).unwrap_or(0);
            Ok(Value::Number(len as f64))
        }
        ExprFunction::CommaContains => {
            let found = both(args)
                .map(|(list, needle)| list.split(',').map(str::trim).any(|part| part == needle))
                .unwrap_or(false);
            Ok(Value::Boolean(found))
        }
        ExprFunction::LowerCase => Ok(args.str(0).map(|s| Value::String(s.to_lowercase())).unwrap_or(Value::Null)),
        ExprFunction::UpperCase => Ok(args.str(0).map(|s| Value::String(s.to_uppercase())).unwrap_or(Value::Null)),
        _ => Err(ctx.runtime_error(format!("Unknown string function: {}", func.name()))),
    }
}
