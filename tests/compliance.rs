use gjson_path::{evaluate, from_json_text, Error, EvaluationError, Value};
use serde_json::json;

fn v(j: serde_json::Value) -> Value {
    j.into()
}

#[test]
fn nested_field_and_scalar_lookup() {
    let data = v(json!({"name": {"first":"Tom","last":"Anderson"}, "age":37}));
    assert_eq!(evaluate(&data, "name.first").unwrap(), v(json!("Tom")));
    assert_eq!(evaluate(&data, "age").unwrap(), v(json!(37)));
    assert!(matches!(
        evaluate(&data, "name.invalid").unwrap_err(),
        Error::Evaluation(EvaluationError::NotFound { .. })
    ));
}

#[test]
fn friends_projection_and_query() {
    let data = v(json!({"friends":[{"age":44},{"age":68},{"age":47}]}));
    assert_eq!(evaluate(&data, "friends.#.age").unwrap(), v(json!([44, 68, 47])));
    assert_eq!(evaluate(&data, "friends.#(age>45)#.age").unwrap(), v(json!([68, 47])));
    assert_eq!(evaluate(&data, "friends.#(age>45).age").unwrap(), v(json!(68)));
    assert_eq!(evaluate(&data, "friends.#").unwrap(), v(json!(3)));
}

#[test]
fn lines_prefix_over_one_wrapped_element() {
    let element = v(json!({"age": 61}));
    assert_eq!(evaluate(&element, "..#(age>40).age").unwrap(), v(json!(61)));

    let below_threshold = v(json!({"age": 34}));
    assert!(evaluate(&below_threshold, "..#(age>40).age").is_err());
}

#[test]
fn evaluation_error_and_parse_error_both_pinpoint_the_failure() {
    let data = v(json!({"name":{"last":"x"}}));
    let err = evaluate(&data, "name.last.invalid").unwrap_err();
    assert!(matches!(err, Error::Evaluation(EvaluationError::TypeMismatch { .. })));

    let err = evaluate(&data, "name..last").unwrap_err();
    match err {
        Error::Parse(parse_err) => {
            assert_eq!(parse_err.column, 5);
            assert_eq!(parse_err.message, "empty query part");
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn escaped_literal_dot_in_field_and_wildcard() {
    let data = v(json!({"weird.key": 1}));
    assert_eq!(evaluate(&data, "weird\\.key").unwrap(), v(json!(1)));
    assert_eq!(evaluate(&data, "we*d\\.key").unwrap(), v(json!(1)));
}

#[test]
fn projection_pipe_law() {
    let data = v(json!({"friends":[{"age":44},{"age":68}]}));
    assert_eq!(evaluate(&data, "friends.#").unwrap(), evaluate(&data, "friends|#").unwrap());
    assert!(evaluate(&data, "friends.#|age").is_err());
}

#[test]
fn mapping_order_is_preserved_through_json_round_trip() {
    let original = br#"{"b":2,"a":1,"c":3}"#;
    let value = from_json_text(original).unwrap();
    if let Value::Mapping(m) = &value {
        assert_eq!(m.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    } else {
        panic!("expected a mapping");
    }
}

#[test]
fn query_skips_elements_that_mismatch_rather_than_erroring() {
    let data = v(json!({"items":[{"age":40},{"name":"no age field"},{"age":50}]}));
    assert_eq!(evaluate(&data, "items.#(age>30)#.age").unwrap(), v(json!([40, 50])));
}
