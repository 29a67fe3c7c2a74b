//! Applies a parsed path to a [`Value`], part by part.

mod query;

use crate::error::EvaluationError;
use crate::modifiers::ModifierRegistry;
use crate::parser::{compile_wildcard, Part, PathPart};
use crate::value::Value;

/// Walk `value` through `parts`, threading projection mode as a
/// per-evaluation boolean carried across `.` and cleared by `|`, a terminal
/// `#`, or a modifier application.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip_all))]
pub fn evaluate_parts(
    value: &Value,
    parts: &[Part],
    registry: &ModifierRegistry,
) -> Result<Value, EvaluationError> {
    let mut current = value.clone();
    let mut projecting = false;

    for (i, part) in parts.iter().enumerate() {
        let last = i == parts.len() - 1;
        current = step(current, part, last, &mut projecting, registry)?;
    }

    Ok(current)
}

fn step(
    current: Value,
    part: &Part,
    last: bool,
    projecting: &mut bool,
    registry: &ModifierRegistry,
) -> Result<Value, EvaluationError> {
    let column = part.column;
    match &part.kind {
        PathPart::Field(name) => apply_projectable(
            current,
            projecting,
            column,
            format!("Field({name})"),
            |v| apply_field(v, name),
        ),
        PathPart::Index(i) => apply_projectable(
            current,
            projecting,
            column,
            format!("Index({i})"),
            |v| apply_index(v, *i),
        ),
        PathPart::Wildcard { source } => {
            let re = compile_wildcard(source);
            apply_projectable(
                current,
                projecting,
                column,
                format!("Wildcard({source})"),
                |v| apply_wildcard(v, &re),
            )
        }
        PathPart::ArrayAll => match &current {
            Value::Sequence(items) => {
                if last {
                    Ok(Value::Number(items.len().into()))
                } else {
                    *projecting = true;
                    Ok(current)
                }
            }
            other => Err(EvaluationError::TypeMismatch {
                part: "ArrayAll".to_string(),
                found: other.type_name(),
                column,
            }),
        },
        PathPart::Query { spec, project_all } => {
            let items = match &current {
                Value::Sequence(items) => items,
                other => {
                    return Err(EvaluationError::TypeMismatch {
                        part: "Query".to_string(),
                        found: other.type_name(),
                        column,
                    })
                }
            };
            let matched: Vec<Value> = items
                .iter()
                .filter(|e| query::matches(e, spec, registry))
                .cloned()
                .collect();
            if *project_all {
                *projecting = true;
                Ok(Value::Sequence(matched))
            } else {
                *projecting = false;
                matched.into_iter().next().ok_or(EvaluationError::NotFound {
                    part: "Query".to_string(),
                    column,
                })
            }
        }
        PathPart::Modifier { name, options } => {
            let result = registry.invoke(name, &current, options.as_ref())?;
            *projecting = false;
            Ok(result)
        }
        PathPart::PipeBoundary => {
            *projecting = false;
            Ok(current)
        }
        PathPart::LinesPrefix => {
            *projecting = true;
            Ok(Value::Sequence(vec![current]))
        }
    }
}

/// Shared plumbing for Field/Index/Wildcard: when projection mode is active
/// and `current` is a sequence, map `apply` over each element and keep only
/// the ones it applies to; otherwise apply it once, directly, and raise on
/// failure.
fn apply_projectable(
    current: Value,
    projecting: &mut bool,
    column: usize,
    part_label: String,
    apply: impl Fn(&Value) -> Option<Value>,
) -> Result<Value, EvaluationError> {
    if *projecting {
        if let Value::Sequence(items) = &current {
            let mapped: Vec<Value> = items.iter().filter_map(&apply).collect();
            return Ok(Value::Sequence(mapped));
        }
    }
    match &current {
        Value::Sequence(_) => Err(EvaluationError::TypeMismatch {
            part: part_label,
            found: "sequence",
            column,
        }),
        Value::Mapping(_) => apply(&current).ok_or(EvaluationError::NotFound {
            part: part_label,
            column,
        }),
        other => Err(EvaluationError::TypeMismatch {
            part: part_label,
            found: other.type_name(),
            column,
        }),
    }
}

fn apply_field(v: &Value, name: &str) -> Option<Value> {
    match v {
        Value::Mapping(m) => m.get(name).cloned(),
        _ => None,
    }
}

fn apply_index(v: &Value, i: u64) -> Option<Value> {
    match v {
        Value::Sequence(s) => usize::try_from(i).ok().and_then(|i| s.get(i)).cloned(),
        Value::Mapping(m) => m.get(&i.to_string()).cloned(),
        _ => None,
    }
}

fn apply_wildcard(v: &Value, re: &regex::Regex) -> Option<Value> {
    match v {
        Value::Mapping(m) => m.iter().find(|(k, _)| re.is_match(k)).map(|(_, v)| v.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::ModifierRegistry;
    use crate::parser::parse_path;
    use serde_json::json;

    fn eval(value: &Value, path: &str) -> Result<Value, EvaluationError> {
        let registry = ModifierRegistry::new();
        let parts = parse_path(path).unwrap();
        evaluate_parts(value, &parts, &registry)
    }

    fn v(j: serde_json::Value) -> Value {
        j.into()
    }

    #[test]
    fn nested_field_and_scalar_lookup() {
        let data = v(json!({"name": {"first":"Tom","last":"Anderson"}, "age":37}));
        assert_eq!(eval(&data, "name.first").unwrap(), v(json!("Tom")));
        assert_eq!(eval(&data, "age").unwrap(), v(json!(37)));
        assert!(matches!(
            eval(&data, "name.invalid").unwrap_err(),
            EvaluationError::NotFound { .. }
        ));
    }

    #[test]
    fn friends_projection_and_query() {
        let data = v(json!({"friends":[{"age":44},{"age":68},{"age":47}]}));
        assert_eq!(eval(&data, "friends.#.age").unwrap(), v(json!([44, 68, 47])));
        assert_eq!(
            eval(&data, "friends.#(age>45)#.age").unwrap(),
            v(json!([68, 47]))
        );
        assert_eq!(eval(&data, "friends.#(age>45).age").unwrap(), v(json!(68)));
        assert_eq!(eval(&data, "friends.#").unwrap(), v(json!(3)));
    }

    #[test]
    fn projection_pipe_law() {
        let data = v(json!({"friends":[{"age":44},{"age":68}]}));
        assert_eq!(eval(&data, "friends.#").unwrap(), eval(&data, "friends|#").unwrap());
        // a.#|b forces b onto the length, which is a number, not a mapping/sequence
        assert!(eval(&data, "friends.#|age").is_err());
    }

    #[test]
    fn escape_preserves_literal_key() {
        let data = v(json!({"weird.key": 1}));
        assert_eq!(eval(&data, "weird\\.key").unwrap(), v(json!(1)));
        assert_eq!(eval(&data, "we*d\\.key").unwrap(), v(json!(1)));
    }
}
