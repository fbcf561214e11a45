//! Evaluation of JSON-encoded form expressions such as
//! `["equals", ["dataModel", "person.age"], 18]`.

pub mod error;
pub mod error_formatter;
pub mod options;
pub mod runtime;
pub mod sources;
pub mod traits;
pub mod types;

pub use error::{DataSourceError, DateParseError, ErrorKind, ExprError, ExprPath};
pub use error_formatter::ErrorFormatter;
pub use options::{ErrorTracer, EvalOptions, TracingTracer, ValueArguments, DEFAULT_MAX_DEPTH};
pub use runtime::{has_function, is_expression, parse_strict_date, ExprFunction};
pub use sources::{ComponentEntry, StaticDataSources};
pub use traits::{AuthAction, DataSources, InstanceField, NoDataSources};
pub use types::{DateZone, ExprDate, ExprVal, Value};

use runtime::{cast_value, CastRole, EvalContext, Evaluator};
use serde_json::Value as JsonValue;

/// Evaluate an expression, or pass a literal through.
///
/// With a default value configured, a failure is reported to the error tracer
/// and the default is returned instead. Without one the error is returned.
pub fn evaluate(
    expr: &JsonValue,
    data_sources: &dyn DataSources,
    options: &EvalOptions<'_>,
) -> Result<Value, ExprError> {
    match evaluate_strict(expr, data_sources, options) {
        Ok(value) => Ok(value),
        Err(err) => match &options.default_value {
            Some(default) => {
                let tracer = options.tracer.unwrap_or(&TracingTracer);
                tracer.trace(&err, options.error_intro_text.as_deref(), default);
                Ok(default.clone())
            }
            None => Err(err),
        },
    }
}

fn evaluate_strict(
    expr: &JsonValue,
    data_sources: &dyn DataSources,
    options: &EvalOptions<'_>,
) -> Result<Value, ExprError> {
    let ctx = EvalContext::new(expr, data_sources, options);
    let mut result = if is_expression(expr) {
        Evaluator::eval(expr, &ctx)?
    } else {
        Value::from(expr)
    };

    // The default is handed back as configured, without the final cast
    if result.is_null() {
        if let Some(default) = &options.default_value {
            return Ok(default.clone());
        }
    }

    if options.return_type != ExprVal::Any && result.infer_type() != options.return_type {
        result = cast_value(result, Some(options.return_type), &ctx, CastRole::Result)?;
    }
    Ok(result)
}

/// Evaluate with no data sources and default options.
pub fn evaluate_simple(expr: &JsonValue) -> Result<Value, ExprError> {
    evaluate(expr, &NoDataSources, &EvalOptions::default())
}

/// Cast a standalone value with the same rules expressions use for results.
pub fn cast(value: Value, target: ExprVal) -> Result<Value, ExprError> {
    let expr = JsonValue::Null;
    let options = EvalOptions::default();
    let ctx = EvalContext::new(&expr, &NoDataSources, &options);
    cast_value(value, Some(target), &ctx, CastRole::Result)
}
