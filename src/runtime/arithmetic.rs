use crate::error::ExprError;
use crate::runtime::evaluator::EvalContext;
use crate::runtime::function_dispatch::{Args, ExprFunction};
use crate::runtime::utils::to_fixed;
use crate::types::Value;

const MAX_DECIMALS: f64 = 100.0;

pub fn exec_arithmetic(func: ExprFunction, ctx: &EvalContext<'_>, args: &Args<'_>) -> Result<Value, ExprError> {
    match func {
        ExprFunction::Round => {
            let number = args.num(0).unwrap_or(0.0);
            let decimals = args.num(1).unwrap_or(0.0);
            let decimals = if decimals.is_nan() { 0.0 } else { decimals.trunc() };
            if !(0.0..=MAX_DECIMALS).contains(&decimals) {
                return Err(ctx.runtime_error(format!(
                    "Number of decimal points must be between 0 and 100, got {}",
                    decimals
                )));
            }
            Ok(Value::String(to_fixed(number, decimals as usize)))
        }
        _ => Err(ctx.runtime_error(format!("Unknown arithmetic function: {}", func.name()))),
    }
}
