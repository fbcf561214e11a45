use crate::error::ExprError;
use crate::runtime::evaluator::EvalContext;
use crate::runtime::function_dispatch::{Args, ExprFunction};
use crate::types::Value;

fn compare(args: &Args<'_>, op: fn(f64, f64) -> bool) -> Value {
    match (args.num(0), args.num(1)) {
        (Some(a), Some(b)) => Value::Boolean(op(a, b)),
        // Comparisons against null are always false
        _ => Value::Boolean(false),
    }
}

pub fn exec_logical(func: ExprFunction, ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    match func {
        ExprFunction::Equals => Ok(Value::Boolean(args.get(0) == args.get(1))),
        ExprFunction::NotEquals => Ok(Value::Boolean(args.get(0) != args.get(1))),
        ExprFunction::Not => Ok(Value::Boolean(!args.bool(0).unwrap_or(false))),
        ExprFunction::GreaterThan => Ok(compare(args, |a, b| a > b)),
        ExprFunction::GreaterThanEq => Ok(compare(args, |a, b| a >= b)),
        ExprFunction::LessThan => Ok(compare(args, |a, b| a < b)),
        ExprFunction::LessThanEq => Ok(compare(args, |a, b| a <= b)),
        ExprFunction::And => Ok(Value::Boolean(args.iter().all(|a| a.as_bool().unwrap_or(false)))),
        ExprFunction::Or => Ok(Value::Boolean(args.iter().any(|a| a.as_bool().unwrap_or(false)))),
        ExprFunction::If => {
            // ["if", condition, then, "else", otherwise]
            if args.bool(0) == Some(true) {
                Ok(args.get(1).clone())
            } else {
                Ok(args.get(3).clone())
            }
        }
        _ => Err(ctx.runtime_error(format!("Unknown logical function: {}", func.name()))),
    }
}
