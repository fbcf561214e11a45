use formexpr::{
    evaluate, evaluate_simple, is_expression, ComponentEntry, ErrorKind, EvalOptions, ExprPath, ExprVal,
    NoDataSources, StaticDataSources, Value,
};
use serde_json::json;
use std::cell::RefCell;

fn age_model(age: serde_json::Value) -> StaticDataSources {
    StaticDataSources::new().with_data_model("model", json!({ "age": age }))
}

#[test]
fn literals_pass_through() {
    for literal in [json!(5), json!("text"), json!(true), json!(null), json!({ "a": [1, 2] }), json!([1, 2])] {
        assert_eq!(evaluate_simple(&literal).unwrap(), Value::from(&literal), "{}", literal);
    }
}

#[test]
fn unknown_function_is_a_literal_array() {
    let expr = json!(["notAFunction", 1, 2]);
    assert!(!is_expression(&expr));
    assert_eq!(evaluate_simple(&expr).unwrap(), Value::from(&expr));
}

#[test]
fn literal_is_cast_to_a_differing_return_type() {
    let options = EvalOptions::new().with_return_type(ExprVal::Number);
    assert_eq!(evaluate(&json!("42"), &NoDataSources, &options).unwrap(), Value::Number(42.0));

    let options = EvalOptions::new().with_return_type(ExprVal::String);
    assert_eq!(evaluate(&json!(5), &NoDataSources, &options).unwrap(), Value::from("5"));
}

#[test]
fn data_model_string_compares_equal_to_number() {
    let sources = age_model(json!("18"));
    let expr = json!(["equals", ["dataModel", "#/properties/age"], 18]);
    assert_eq!(evaluate(&expr, &sources, &EvalOptions::default()).unwrap(), Value::Boolean(true));

    let options = EvalOptions::new().with_return_type(ExprVal::Boolean);
    assert_eq!(evaluate(&expr, &sources, &options).unwrap(), Value::Boolean(true));
}

#[test]
fn component_string_is_compared_numerically() {
    let sources = StaticDataSources::new()
        .with_data_model("model", json!({ "score": "3" }))
        .with_component("score", ComponentEntry { binding: Some("score".into()), ..Default::default() });
    let expr = json!(["greaterThan", ["component", "score"], 5]);
    assert_eq!(evaluate(&expr, &sources, &EvalOptions::default()).unwrap(), Value::Boolean(false));
}

#[test]
fn nested_expressions_evaluate_depth_first() {
    let sources = age_model(json!(20));
    let expr = json!([
        "if",
        ["and", ["greaterThanEq", ["dataModel", "age"], 18], ["not", false]],
        ["concat", "adult (", ["dataModel", "age"], ")"],
        "else",
        "minor"
    ]);
    assert_eq!(evaluate(&expr, &sources, &EvalOptions::default()).unwrap(), Value::from("adult (20)"));
}

#[test]
fn null_result_takes_the_default() {
    let expr = json!(["dataModel", "missing"]);
    let sources = age_model(json!(1));
    let options = EvalOptions::new().with_default("fallback");
    assert_eq!(evaluate(&expr, &sources, &options).unwrap(), Value::from("fallback"));
    assert_eq!(evaluate(&expr, &sources, &EvalOptions::default()).unwrap(), Value::Null);
}

#[test]
fn default_is_returned_as_configured() {
    let options = EvalOptions::typed(ExprVal::Boolean, "true");
    assert_eq!(evaluate(&json!(null), &NoDataSources, &options).unwrap(), Value::from("true"));

    let options = EvalOptions::typed(ExprVal::Number, "n/a");
    let expr = json!(["dataModel", "missing"]);
    let sources = age_model(json!(1));
    assert_eq!(evaluate(&expr, &sources, &options).unwrap(), Value::from("n/a"));
}

#[test]
fn errors_carry_the_failing_path() {
    let expr = json!(["concat", "a", ["not", "maybe"]]);
    let err = evaluate_simple(&expr).unwrap_err();
    assert_eq!(err.path, ExprPath::from(vec![2, 1]));
    assert_eq!(err.expr, expr);
    assert_eq!(err.message(), "Expected boolean, got value \"maybe\"");
    assert_eq!(
        err.to_string(),
        "Evaluated expression [\"concat\",\"a\",[\"not\",\"maybe\"]] failed at [2][1]: Expected boolean, got value \"maybe\""
    );
}

#[test]
fn extra_arguments_have_no_target_type() {
    let err = evaluate_simple(&json!(["not", true, false])).unwrap_err();
    assert_eq!(err.kind, ErrorKind::UnknownTargetType("undefined".to_string()));
    assert_eq!(err.path, ExprPath::from(vec![2]));
}

#[test]
fn rest_arguments_accept_any_count() {
    let expr = json!(["or", false, false, false, "true"]);
    assert_eq!(evaluate_simple(&expr).unwrap(), Value::Boolean(true));
    let expr = json!(["concat", "a", 1, true, null, "b"]);
    assert_eq!(evaluate_simple(&expr).unwrap(), Value::from("a1trueb"));
}

#[test]
fn unsupported_argument_type_is_reported() {
    let err = evaluate_simple(&json!(["formatDate", true])).unwrap_err();
    match err.kind {
        ErrorKind::UnknownArgType { actual, supported } => {
            assert_eq!(actual, "boolean");
            assert_eq!(supported, "string, number, date, any, null");
        }
        other => panic!("unexpected error {:?}", other),
    }
}

#[test]
fn callbacks_fire_around_each_call() {
    let events = RefCell::new(Vec::new());
    let before = |path: &ExprPath, name: &str, args: &[Value]| {
        events.borrow_mut().push(format!("before {} {} {}", name, path, args.len()));
    };
    let after = |path: &ExprPath, name: &str, _args: &[Value], result: &Value| {
        events.borrow_mut().push(format!("after {} {} {}", name, path, result));
    };
    let options = EvalOptions::new().on_before_function_call(&before).on_after_function_call(&after);

    let expr = json!(["not", ["equals", "a", "b"]]);
    assert_eq!(evaluate(&expr, &NoDataSources, &options).unwrap(), Value::Boolean(true));
    assert_eq!(
        events.into_inner(),
        vec![
            "before equals [1] 2",
            "after equals [1] false",
            "before not (root) 1",
            "after not (root) true",
        ]
    );
}

#[test]
fn callbacks_do_not_fire_for_literals() {
    let calls = RefCell::new(0);
    let before = |_: &ExprPath, _: &str, _: &[Value]| *calls.borrow_mut() += 1;
    let options = EvalOptions::new().on_before_function_call(&before);
    evaluate(&json!(["a", "b"]), &NoDataSources, &options).unwrap();
    assert_eq!(calls.into_inner(), 0);
}

#[test]
fn depth_limit_is_enforced() {
    let mut expr = json!(true);
    for _ in 0..300 {
        expr = json!(["not", expr]);
    }
    let err = evaluate_simple(&expr).unwrap_err();
    assert_eq!(err.kind, ErrorKind::TooDeep(formexpr::DEFAULT_MAX_DEPTH));

    let options = EvalOptions::new().with_max_depth(400);
    assert_eq!(evaluate(&expr, &NoDataSources, &options).unwrap(), Value::Boolean(true));
}

#[test]
fn date_results_pass_through_string_return_type() {
    let sources = age_model(json!(1));
    let expr = json!(["formatDate", "2023-05-07T09:05:00Z", "yyyy"]);
    let options = EvalOptions::new().with_return_type(ExprVal::String);
    assert_eq!(evaluate(&expr, &sources, &options).unwrap(), Value::from("2023"));
}
