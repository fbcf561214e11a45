use crate::error::ExprError;
use crate::runtime::evaluator::EvalContext;
use crate::types::{ExprVal, Value};
use std::collections::HashMap;
use super::{arithmetic, datetime, logical, lookup, string};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgVariant {
    Required,
    Optional,
    /// Trailing argument type repeated for every further position
    Rest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArgSpec {
    pub ty: ExprVal,
    pub variant: ArgVariant,
}

const fn required(ty: ExprVal) -> ArgSpec {
    ArgSpec { ty, variant: ArgVariant::Required }
}

const fn optional(ty: ExprVal) -> ArgSpec {
    ArgSpec { ty, variant: ArgVariant::Optional }
}

const fn rest(ty: ExprVal) -> ArgSpec {
    ArgSpec { ty, variant: ArgVariant::Rest }
}

/// Declared signature of an expression function.
#[derive(Debug, PartialEq, Eq)]
pub struct FunctionDef {
    pub args: &'static [ArgSpec],
    pub returns: ExprVal,
}

impl FunctionDef {
    /// Expected type at a 0-based argument index, if any.
    pub fn arg_type_at(&self, index: usize) -> Option<ExprVal> {
        if let Some(spec) = self.args.get(index) {
            return Some(spec.ty);
        }
        match self.args.last() {
            Some(spec) if spec.variant == ArgVariant::Rest => Some(spec.ty),
            _ => None,
        }
    }

    pub fn min_args(&self) -> usize {
        self.args.iter().filter(|a| a.variant == ArgVariant::Required).count()
    }

    /// `None` when the last argument repeats.
    pub fn max_args(&self) -> Option<usize> {
        match self.args.last() {
            Some(spec) if spec.variant == ArgVariant::Rest => None,
            _ => Some(self.args.len()),
        }
    }
}

use ExprVal::{Any, Boolean, Date, Number, String as Str};

const NUMBER_TO_ANY: FunctionDef = FunctionDef { args: &[required(Number)], returns: Any };
const STRING_TO_ANY: FunctionDef = FunctionDef { args: &[required(Str)], returns: Any };
const STRING_TO_STRING: FunctionDef = FunctionDef { args: &[required(Str)], returns: Str };
const STRING_TO_BOOLEAN: FunctionDef = FunctionDef { args: &[required(Str)], returns: Boolean };
const TWO_STRINGS_TO_BOOLEAN: FunctionDef = FunctionDef { args: &[required(Str), required(Str)], returns: Boolean };
const TWO_STRINGS_TO_STRING: FunctionDef = FunctionDef { args: &[required(Str), required(Str)], returns: Str };
const TWO_NUMBERS_TO_BOOLEAN: FunctionDef = FunctionDef { args: &[required(Number), required(Number)], returns: Boolean };
const BOOLEANS_TO_BOOLEAN: FunctionDef = FunctionDef { args: &[required(Boolean), rest(Boolean)], returns: Boolean };

const VALUE: FunctionDef = FunctionDef { args: &[optional(Str)], returns: Any };
const NOT: FunctionDef = FunctionDef { args: &[required(Boolean)], returns: Boolean };
const CONCAT: FunctionDef = FunctionDef { args: &[rest(Str)], returns: Str };
const IF: FunctionDef = FunctionDef {
    args: &[required(Boolean), required(Any), optional(Str), optional(Any)],
    returns: Any,
};
const DATA_MODEL: FunctionDef = FunctionDef { args: &[required(Str), optional(Str)], returns: Any };
const FORMAT_DATE: FunctionDef = FunctionDef { args: &[required(Date), optional(Str)], returns: Str };
const ROUND: FunctionDef = FunctionDef { args: &[required(Number), optional(Number)], returns: Str };
const LANGUAGE: FunctionDef = FunctionDef { args: &[], returns: Str };
const STRING_LENGTH: FunctionDef = FunctionDef { args: &[required(Str)], returns: Number };
const SELECT_AND_MAP: FunctionDef = FunctionDef {
    args: &[required(Str), required(Str), optional(Str), optional(Str), optional(Boolean)],
    returns: Str,
};

/// Every function the expression language knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExprFunction {
    Argv,
    Value,
    Equals,
    NotEquals,
    Not,
    GreaterThan,
    GreaterThanEq,
    LessThan,
    LessThanEq,
    Concat,
    And,
    Or,
    If,
    InstanceContext,
    FrontendSettings,
    AuthContext,
    Component,
    DataModel,
    HasRole,
    ExternalApi,
    DisplayValue,
    FormatDate,
    Round,
    Text,
    LinkToComponent,
    LinkToPage,
    Language,
    Contains,
    NotContains,
    EndsWith,
    StartsWith,
    StringLength,
    CommaContains,
    LowerCase,
    UpperCase,
    SelectAndMap,
}

impl ExprFunction {
    pub const ALL: &'static [ExprFunction] = &[
        ExprFunction::Argv,
        ExprFunction::Value,
        ExprFunction::Equals,
        ExprFunction::NotEquals,
        ExprFunction::Not,
        ExprFunction::GreaterThan,
        ExprFunction::GreaterThanEq,
        ExprFunction::LessThan,
        ExprFunction::LessThanEq,
        ExprFunction::Concat,
        ExprFunction::And,
        ExprFunction::Or,
        ExprFunction::If,
        ExprFunction::InstanceContext,
        ExprFunction::FrontendSettings,
        ExprFunction::AuthContext,
        ExprFunction::Component,
        ExprFunction::DataModel,
        ExprFunction::HasRole,
        ExprFunction::ExternalApi,
        ExprFunction::DisplayValue,
        ExprFunction::FormatDate,
        ExprFunction::Round,
        ExprFunction::Text,
        ExprFunction::LinkToComponent,
        ExprFunction::LinkToPage,
        ExprFunction::Language,
        ExprFunction::Contains,
        ExprFunction::NotContains,
        ExprFunction::EndsWith,
        ExprFunction::StartsWith,
        ExprFunction::StringLength,
        ExprFunction::CommaContains,
        ExprFunction::LowerCase,
        ExprFunction::UpperCase,
        ExprFunction::SelectAndMap,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ExprFunction::Argv => "argv",
            ExprFunction::Value => "value",
            ExprFunction::Equals => "equals",
            ExprFunction::NotEquals => "notEquals",
            ExprFunction::Not => "not",
            ExprFunction::GreaterThan => "greaterThan",
            ExprFunction::GreaterThanEq => "greaterThanEq",
            ExprFunction::LessThan => "lessThan",
            ExprFunction::LessThanEq => "lessThanEq",
            ExprFunction::Concat => "concat",
            ExprFunction::And => "and",
            ExprFunction::Or => "or",
            ExprFunction::If => "if",
            ExprFunction::InstanceContext => "instanceContext",
            ExprFunction::FrontendSettings => "frontendSettings",
            ExprFunction::AuthContext => "authContext",
            ExprFunction::Component => "component",
            ExprFunction::DataModel => "dataModel",
            ExprFunction::HasRole => "hasRole",
            ExprFunction::ExternalApi => "externalApi",
            ExprFunction::DisplayValue => "displayValue",
            ExprFunction::FormatDate => "formatDate",
            ExprFunction::Round => "round",
            ExprFunction::Text => "text",
            ExprFunction::LinkToComponent => "linkToComponent",
            ExprFunction::LinkToPage => "linkToPage",
            ExprFunction::Language => "language",
            ExprFunction::Contains => "contains",
            ExprFunction::NotContains => "notContains",
            ExprFunction::EndsWith => "endsWith",
            ExprFunction::StartsWith => "startsWith",
            ExprFunction::StringLength => "stringLength",
            ExprFunction::CommaContains => "commaContains",
            ExprFunction::LowerCase => "lowerCase",
            ExprFunction::UpperCase => "upperCase",
            ExprFunction::SelectAndMap => "_experimentalSelectAndMap",
        }
    }

    /// Looks a function up by its exact (case-sensitive) name.
    pub fn from_name(name: &str) -> Option<ExprFunction> {
        FUNCTIONS_BY_NAME.get(name).copied()
    }

    pub fn definition(&self) -> &'static FunctionDef {
        match self {
            ExprFunction::Argv => &NUMBER_TO_ANY,
            ExprFunction::Value => &VALUE,
            ExprFunction::Equals | ExprFunction::NotEquals => &TWO_STRINGS_TO_BOOLEAN,
            ExprFunction::Not => &NOT,
            ExprFunction::GreaterThan
            | ExprFunction::GreaterThanEq
            | ExprFunction::LessThan
            | ExprFunction::LessThanEq => &TWO_NUMBERS_TO_BOOLEAN,
            ExprFunction::Concat => &CONCAT,
            ExprFunction::And | ExprFunction::Or => &BOOLEANS_TO_BOOLEAN,
            ExprFunction::If => &IF,
            ExprFunction::InstanceContext => &STRING_TO_STRING,
            ExprFunction::FrontendSettings => &STRING_TO_ANY,
            ExprFunction::AuthContext => &STRING_TO_BOOLEAN,
            ExprFunction::Component => &STRING_TO_ANY,
            ExprFunction::DataModel => &DATA_MODEL,
            ExprFunction::HasRole => &STRING_TO_BOOLEAN,
            ExprFunction::ExternalApi => &TWO_STRINGS_TO_STRING,
            ExprFunction::DisplayValue => &STRING_TO_STRING,
            ExprFunction::FormatDate => &FORMAT_DATE,
            ExprFunction::Round => &ROUND,
            ExprFunction::Text => &STRING_TO_STRING,
            ExprFunction::LinkToComponent | ExprFunction::LinkToPage => &TWO_STRINGS_TO_STRING,
            ExprFunction::Language => &LANGUAGE,
            ExprFunction::Contains
            | ExprFunction::NotContains
            | ExprFunction::EndsWith
            | ExprFunction::StartsWith
            | ExprFunction::CommaContains => &TWO_STRINGS_TO_BOOLEAN,
            ExprFunction::StringLength => &STRING_LENGTH,
            ExprFunction::LowerCase | ExprFunction::UpperCase => &STRING_TO_STRING,
            ExprFunction::SelectAndMap => &SELECT_AND_MAP,
        }
    }

    /// Runs the implementation with already-cast arguments.
    pub fn call(&self, ctx: &EvalContext<'_>, args: &[Value]) -> Result<Value, ExprError> {
        let args = Args(args);
        match self {
            ExprFunction::Equals
            | ExprFunction::NotEquals
            | ExprFunction::Not
            | ExprFunction::GreaterThan
            | ExprFunction::GreaterThanEq
            | ExprFunction::LessThan
            | ExprFunction::LessThanEq
            | ExprFunction::And
            | ExprFunction::Or
            | ExprFunction::If => logical::exec_logical(*self, ctx, &args),

            ExprFunction::Concat
            | ExprFunction::Contains
            | ExprFunction::NotContains
            | ExprFunction::EndsWith
            | ExprFunction::StartsWith
            | ExprFunction::StringLength
            | ExprFunction::CommaContains
            | ExprFunction::LowerCase
            | ExprFunction::UpperCase => string::exec_string(*self, ctx, &args),

            ExprFunction::Round => arithmetic::exec_arithmetic(*self, ctx, &args),

            ExprFunction::FormatDate => datetime::exec_datetime(*self, ctx, &args),

            ExprFunction::Argv
            | ExprFunction::Value
            | ExprFunction::InstanceContext
            | ExprFunction::FrontendSettings
            | ExprFunction::AuthContext
            | ExprFunction::Component
            | ExprFunction::DataModel
            | ExprFunction::HasRole
            | ExprFunction::ExternalApi
            | ExprFunction::DisplayValue
            | ExprFunction::Text
            | ExprFunction::LinkToComponent
            | ExprFunction::LinkToPage
            | ExprFunction::Language
            | ExprFunction::SelectAndMap => lookup::exec_lookup(*self, ctx, &args),
        }
    }
}

lazy_static::lazy_static! {
    static ref FUNCTIONS_BY_NAME: HashMap<&'static str, ExprFunction> =
        ExprFunction::ALL.iter().map(|f| (f.name(), *f)).collect();
}

/// Check if a function name is registered
pub fn has_function(name: &str) -> bool {
    FUNCTIONS_BY_NAME.contains_key(name)
}

/// Get count of registered functions
pub fn function_count() -> usize {
    FUNCTIONS_BY_NAME.len()
}

/// Positional access to cast arguments; missing positions read as null.
pub struct Args<'v>(pub &'v [Value]);

impl<'v> Args<'v> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> &'v Value {
        const NULL: &Value = &Value::Null;
        self.0.get(i).unwrap_or(NULL)
    }

    pub fn is_given(&self, i: usize) -> bool {
        i < self.0.len()
    }

    pub fn str(&self, i: usize) -> Option<&'v str> {
        self.get(i).as_str()
    }

    pub fn num(&self, i: usize) -> Option<f64> {
        self.get(i).as_number()
    }

    pub fn bool(&self, i: usize) -> Option<bool> {
        self.get(i).as_bool()
    }

    pub fn iter(&self) -> std::slice::Iter<'v, Value> {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(ExprFunction::from_name("equals"), Some(ExprFunction::Equals));
        assert_eq!(ExprFunction::from_name("_experimentalSelectAndMap"), Some(ExprFunction::SelectAndMap));
        assert_eq!(ExprFunction::from_name("Equals"), None);
        assert!(!has_function("notAFunction"));
    }

    #[test]
    fn test_every_function_is_registered_once() {
        assert_eq!(function_count(), ExprFunction::ALL.len());
        for f in ExprFunction::ALL {
            assert_eq!(ExprFunction::from_name(f.name()), Some(*f));
        }
    }

    #[test]
    fn test_rest_argument_repeats() {
        let and = ExprFunction::And.definition();
        assert_eq!(and.arg_type_at(0), Some(ExprVal::Boolean));
        assert_eq!(and.arg_type_at(7), Some(ExprVal::Boolean));
        assert_eq!(and.max_args(), None);
        assert_eq!(and.min_args(), 1);

        let concat = ExprFunction::Concat.definition();
        assert_eq!(concat.arg_type_at(3), Some(ExprVal::String));
        assert_eq!(concat.min_args(), 0);
    }

    #[test]
    fn test_positions_past_fixed_signature_have_no_type() {
        let equals = ExprFunction::Equals.definition();
        assert_eq!(equals.arg_type_at(1), Some(ExprVal::String));
        assert_eq!(equals.arg_type_at(2), None);
        assert_eq!(equals.max_args(), Some(2));
        assert_eq!(ExprFunction::Language.definition().arg_type_at(0), None);
    }

    #[test]
    fn test_args_accessors() {
        let values = vec![Value::from("a"), Value::Number(2.0)];
        let args = Args(&values);
        assert_eq!(args.str(0), Some("a"));
        assert_eq!(args.num(1), Some(2.0));
        assert!(args.get(5).is_null());
        assert!(!args.is_given(2));
    }
}
