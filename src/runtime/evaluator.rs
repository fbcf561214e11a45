use crate::error::{ErrorKind, ExprError, ExprPath};
use crate::options::{EvalOptions, ValueArguments};
use crate::runtime::function_dispatch::ExprFunction;
use crate::runtime::type_casting::{cast_value, CastRole};
use crate::traits::DataSources;
use crate::types::Value;
use serde_json::Value as JsonValue;

/// Per-call evaluation state.
///
/// Holds the root expression and the path of the sub-expression being evaluated;
/// the path only serves error attribution.
pub struct EvalContext<'a> {
    pub expr: &'a JsonValue,
    pub path: ExprPath,
    pub data_sources: &'a dyn DataSources,
    pub options: &'a EvalOptions<'a>,
}

impl<'a> EvalContext<'a> {
    pub fn new(expr: &'a JsonValue, data_sources: &'a dyn DataSources, options: &'a EvalOptions<'a>) -> Self {
        Self {
            expr,
            path: ExprPath::root(),
            data_sources,
            options,
        }
    }

    /// Context for the argument at `position` (1-based, the function name is 0).
    pub fn child(&self, position: usize) -> EvalContext<'a> {
        EvalContext {
            expr: self.expr,
            path: self.path.child(position),
            data_sources: self.data_sources,
            options: self.options,
        }
    }

    pub fn error(&self, kind: ErrorKind) -> ExprError {
        ExprError::new(kind, self.expr, &self.path)
    }

    pub fn runtime_error<M: Into<String>>(&self, message: M) -> ExprError {
        ExprError::runtime(self.expr, &self.path, message)
    }

    pub fn positional_arguments(&self) -> Option<&'a [Value]> {
        self.options.positional_arguments
    }

    pub fn value_arguments(&self) -> Option<&'a ValueArguments> {
        self.options.value_arguments
    }
}

/// Returns true for a non-empty array whose first element names a registered function.
pub fn is_expression(value: &JsonValue) -> bool {
    match value {
        JsonValue::Array(items) => matches!(items.first(), Some(JsonValue::String(name)) if ExprFunction::from_name(name).is_some()),
        _ => false,
    }
}

/// Recursive evaluator for function-call expressions
pub struct Evaluator;

impl Evaluator {
    /// Evaluate `node`, which must satisfy [`is_expression`], in `ctx`.
    pub fn eval(node: &JsonValue, ctx: &EvalContext<'_>) -> Result<Value, ExprError> {
        if ctx.path.depth() >= ctx.options.max_depth {
            return Err(ctx.error(ErrorKind::TooDeep(ctx.options.max_depth)));
        }

        let (name, raw_args) = match node.as_array().and_then(|items| items.split_first()) {
            Some((JsonValue::String(name), rest)) => (name.as_str(), rest),
            _ => return Err(ctx.runtime_error(format!("Expected an expression, got {}", node))),
        };
        let function = ExprFunction::from_name(name)
            .ok_or_else(|| ctx.runtime_error(format!("Function \"{}\" not implemented", name)))?;
        let definition = function.definition();

        let mut args = Vec::with_capacity(raw_args.len());
        for (idx, raw) in raw_args.iter().enumerate() {
            let arg_ctx = ctx.child(idx + 1);
            let value = if is_expression(raw) {
                Self::eval(raw, &arg_ctx)?
            } else {
                Value::from(raw)
            };
            args.push(cast_value(value, definition.arg_type_at(idx), &arg_ctx, CastRole::Argument)?);
        }

        if let Some(before) = ctx.options.on_before_function_call {
            before(&ctx.path, name, &args);
        }
        tracing::trace!(target: "formexpr", function = name, path = %ctx.path, "calling expression function");

        let raw_result = function.call(ctx, &args)?;
        let result = cast_value(raw_result, Some(definition.returns), ctx, CastRole::Result)?;

        if let Some(after) = ctx.options.on_after_function_call {
            after(&ctx.path, name, &args, &result);
        }

        Ok(result)
    }
}
