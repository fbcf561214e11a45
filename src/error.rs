use std::fmt::{Display, Formatter};

use crate::error_formatter::ErrorFormatter;

/// Position of a sub-expression inside the root expression.
///
/// Each entry is the 1-based argument index (the function name sits at 0).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExprPath(Vec<usize>);

impl ExprPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn child(&self, position: usize) -> Self {
        let mut positions = self.0.clone();
        positions.push(position);
        Self(positions)
    }

    pub fn positions(&self) -> &[usize] {
        &self.0
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<usize>> for ExprPath {
    fn from(positions: Vec<usize>) -> Self {
        Self(positions)
    }
}

impl Display for ExprPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for position in &self.0 {
            write!(f, "[{}]", position)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    #[error("Cannot cast to unknown type '{0}'")]
    UnknownTargetType(String),

    #[error("Received unsupported type '{actual}', expected {supported}")]
    UnknownSourceType { actual: String, supported: String },

    #[error("Expected argument to be {supported}, got {actual}")]
    UnknownArgType { actual: String, supported: String },

    #[error("Expected {expected}, got value {actual}")]
    UnexpectedType { expected: &'static str, actual: String },

    #[error("{0}")]
    Runtime(String),

    #[error("Expression too deeply nested (limit is {0} levels)")]
    TooDeep(usize),
}

/// A failure raised anywhere in an expression tree.
///
/// Carries the root expression and the path to the failing sub-expression so the
/// error can be attributed when it is traced or returned.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprError {
    pub kind: ErrorKind,
    pub expr: serde_json::Value,
    pub path: ExprPath,
}

impl ExprError {
    pub fn new(kind: ErrorKind, expr: &serde_json::Value, path: &ExprPath) -> Self {
        Self { kind, expr: expr.clone(), path: path.clone() }
    }

    pub fn runtime<M: Into<String>>(expr: &serde_json::Value, path: &ExprPath, message: M) -> Self {
        Self::new(ErrorKind::Runtime(message.into()), expr, path)
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self.kind, ErrorKind::Runtime(_))
    }

    pub fn message(&self) -> String {
        self.kind.to_string()
    }

    /// Multi-line rendering with the failing sub-expression underlined.
    pub fn render(&self) -> String {
        ErrorFormatter::new(&self.expr, &self.path, self.message()).format()
    }
}

impl Display for ExprError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Evaluated expression {} failed at {}: {}", self.expr, self.path, self.kind)
    }
}

impl std::error::Error for ExprError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

/// Failures reported by a data source lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DataSourceError {
    #[error("{0}")]
    NotFound(String),

    #[error("No {0} available")]
    Unavailable(&'static str),

    #[error("{0}")]
    Other(String),
}

/// Failures of the strict date parser, before they are attributed to an expression.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DateParseError {
    #[error("Unable to parse date \"{0}\": Unknown format")]
    UnknownFormat(String),

    #[error("Unable to parse date \"{0}\": Format was recognized, but the date/time is invalid")]
    InvalidDate(String),

    #[error("Unable to parse date \"{0}\": Invalid timezone offset")]
    InvalidOffset(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_display() {
        assert_eq!(ExprPath::root().to_string(), "(root)");
        assert_eq!(ExprPath::root().child(2).child(1).to_string(), "[2][1]");
    }

    #[test]
    fn display_mentions_expression_path_and_cause() {
        let expr = json!(["not", "maybe"]);
        let err = ExprError::new(
            ErrorKind::UnexpectedType { expected: "boolean", actual: "\"maybe\"".into() },
            &expr,
            &ExprPath::root().child(1),
        );
        let text = err.to_string();
        assert!(text.contains("[\"not\",\"maybe\"]"));
        assert!(text.contains("[1]"));
        assert!(text.contains("Expected boolean, got value \"maybe\""));
    }
}
