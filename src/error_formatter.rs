//! Error rendering with the failing sub-expression highlighted
//!
//! The root expression is printed as compact JSON and the sub-expression at the
//! error path is underlined with `^^^`, so a trace shows which argument of which
//! call failed without having to count brackets.

use crate::error::ExprPath;
use serde_json::Value as JsonValue;

/// Format an expression error with the failing position marked
pub struct ErrorFormatter<'a> {
    expr: &'a JsonValue,
    path: &'a ExprPath,
    error_message: String,
    /// Optional prefix line, e.g. which component property was being evaluated
    intro: Option<String>,
}

impl<'a> ErrorFormatter<'a> {
    pub fn new(expr: &'a JsonValue, path: &'a ExprPath, error_message: impl Into<String>) -> Self {
        Self {
            expr,
            path,
            error_message: error_message.into(),
            intro: None,
        }
    }

    pub fn with_intro(mut self, intro: Option<&str>) -> Self {
        self.intro = intro.map(str::to_string);
        self
    }

    pub fn format(&self) -> String {
        let mut rendered = String::new();
        let mut span = None;
        write_node(&mut rendered, self.expr, Some(self.path.positions()), &mut span);

        let mut output = String::with_capacity(rendered.len() * 2 + 120);
        if let Some(intro) = &self.intro {
            output.push_str(intro);
            output.push('\n');
        }
        output.push_str(&format!("Expression failed to evaluate: {}\n", self.error_message));
        output.push_str(&format!("  at {}\n\n", self.path));
        output.push_str(&format!("  {}\n", rendered));

        if let Some((start, end)) = span {
            let column = rendered[..start].chars().count();
            let length = rendered[start..end].chars().count();
            output.push_str(&format!("  {}{}\n", " ".repeat(column), "^".repeat(length.max(1))));
        }

        output
    }
}

// Writes `node` as compact JSON, recording the byte span of the node at `target`.
fn write_node(out: &mut String, node: &JsonValue, target: Option<&[usize]>, span: &mut Option<(usize, usize)>) {
    match (node, target) {
        (_, Some([])) => {
            let start = out.len();
            out.push_str(&node.to_string());
            *span = Some((start, out.len()));
        }
        (JsonValue::Array(items), Some([position, rest @ ..])) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                let next = if i == *position { Some(rest) } else { None };
                write_node(out, item, next, span);
            }
            out.push(']');
        }
        _ => out.push_str(&node.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_highlights_nested_argument() {
        let expr = json!(["equals", ["dataModel", "a.b"], 18]);
        let path = ExprPath::from(vec![1]);
        let output = ErrorFormatter::new(&expr, &path, "Data model with type x not found").format();

        assert!(output.contains("Expression failed to evaluate: Data model with type x not found"));
        assert!(output.contains("at [1]"));
        assert!(output.contains("[\"equals\",[\"dataModel\",\"a.b\"],18]"));
        let caret_line = output.lines().last().unwrap();
        assert_eq!(caret_line.trim_start(), "^".repeat("[\"dataModel\",\"a.b\"]".len()));
        assert_eq!(caret_line.find('^'), Some(2 + "[\"equals\",".len()));
    }

    #[test]
    fn test_root_path_underlines_everything() {
        let expr = json!(["not", 1]);
        let path = ExprPath::root();
        let output = ErrorFormatter::new(&expr, &path, "boom").with_intro(Some("Hidden expression")).format();
        assert!(output.starts_with("Hidden expression\n"));
        assert!(output.contains(&"^".repeat("[\"not\",1]".len())));
    }

    #[test]
    fn test_out_of_range_path_has_no_marker() {
        let expr = json!(["not", 1]);
        let path = ExprPath::from(vec![5]);
        let output = ErrorFormatter::new(&expr, &path, "boom").format();
        assert!(!output.contains('^'));
    }
}
