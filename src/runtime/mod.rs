pub mod arithmetic;
pub mod date_parser;
pub mod datetime;
pub mod evaluator;
pub mod function_dispatch;
pub mod logical;
pub mod lookup;
pub mod string;
pub mod type_casting;
pub mod utils;

// Re-export the main public functions
pub use date_parser::parse_strict_date;
pub use evaluator::{is_expression, EvalContext, Evaluator};
pub use function_dispatch::{function_count, has_function, ExprFunction, FunctionDef};
pub use type_casting::{cast_value, CastRole};
pub use utils::{format_js_number, to_fixed};
