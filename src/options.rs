use crate::error::{ExprError, ExprPath};
use crate::error_formatter::ErrorFormatter;
use crate::types::{ExprVal, Value};
use std::collections::HashMap;

/// Default bound on expression nesting.
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Called right before a function implementation runs, with the cast arguments.
pub type BeforeFunctionCall<'a> = &'a dyn Fn(&ExprPath, &str, &[Value]);

/// Called right after a function implementation runs, with the cast result.
pub type AfterFunctionCall<'a> = &'a dyn Fn(&ExprPath, &str, &[Value], &Value);

/// Named values available to the `value` function.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueArguments {
    pub data: HashMap<String, Value>,
    pub default_key: Option<String>,
}

impl ValueArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_default_key(mut self, key: impl Into<String>) -> Self {
        self.default_key = Some(key.into());
        self
    }
}

/// Receives errors that were recovered by substituting the default value.
pub trait ErrorTracer {
    fn trace(&self, error: &ExprError, intro: Option<&str>, default_value: &Value);
}

/// Default tracer: one `warn` event per recovered failure.
pub struct TracingTracer;

impl ErrorTracer for TracingTracer {
    fn trace(&self, error: &ExprError, intro: Option<&str>, default_value: &Value) {
        let rendered = ErrorFormatter::new(&error.expr, &error.path, error.message())
            .with_intro(intro)
            .format();
        tracing::warn!(
            target: "formexpr",
            expression = %error.expr,
            path = %error.path,
            default_value = %default_value,
            "{}",
            rendered
        );
    }
}

/// Per-call evaluation options.
#[derive(Clone)]
pub struct EvalOptions<'a> {
    /// Value returned when the result is null or evaluation fails.
    /// When unset, failures are returned to the caller.
    pub default_value: Option<Value>,
    pub return_type: ExprVal,
    pub error_intro_text: Option<String>,
    pub on_before_function_call: Option<BeforeFunctionCall<'a>>,
    pub on_after_function_call: Option<AfterFunctionCall<'a>>,
    pub positional_arguments: Option<&'a [Value]>,
    pub value_arguments: Option<&'a ValueArguments>,
    pub tracer: Option<&'a dyn ErrorTracer>,
    pub max_depth: usize,
}

impl<'a> Default for EvalOptions<'a> {
    fn default() -> Self {
        Self {
            default_value: None,
            return_type: ExprVal::Any,
            error_intro_text: None,
            on_before_function_call: None,
            on_after_function_call: None,
            positional_arguments: None,
            value_arguments: None,
            tracer: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl<'a> EvalOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for a call site that expects `return_type` and falls back to `default_value`.
    pub fn typed(return_type: ExprVal, default_value: impl Into<Value>) -> Self {
        Self {
            return_type,
            default_value: Some(default_value.into()),
            ..Self::default()
        }
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_return_type(mut self, return_type: ExprVal) -> Self {
        self.return_type = return_type;
        self
    }

    pub fn with_error_intro(mut self, text: impl Into<String>) -> Self {
        self.error_intro_text = Some(text.into());
        self
    }

    pub fn on_before_function_call(mut self, callback: BeforeFunctionCall<'a>) -> Self {
        self.on_before_function_call = Some(callback);
        self
    }

    pub fn on_after_function_call(mut self, callback: AfterFunctionCall<'a>) -> Self {
        self.on_after_function_call = Some(callback);
        self
    }

    pub fn with_positional_arguments(mut self, args: &'a [Value]) -> Self {
        self.positional_arguments = Some(args);
        self
    }

    pub fn with_value_arguments(mut self, args: &'a ValueArguments) -> Self {
        self.value_arguments = Some(args);
        self
    }

    pub fn with_tracer(mut self, tracer: &'a dyn ErrorTracer) -> Self {
        self.tracer = Some(tracer);
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
