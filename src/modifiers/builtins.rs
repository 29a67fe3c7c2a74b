use std::collections::HashMap;

use serde_json::Number;

use crate::error::EvaluationError;
use crate::value::{Map, Value};

use super::ModifierFn;

/// Names reserved for built-ins — a user registration with one of these
/// names is rejected.
pub const NAMES: &[&str] = &[
    "reverse", "sort", "keys", "values", "flatten", "this", "valid", "ugly", "pretty", "ascii",
    "top_n", "sum_n",
];

pub fn seed(map: &mut HashMap<String, ModifierFn>) {
    map.insert("reverse".to_string(), std::sync::Arc::new(reverse));
    map.insert("sort".to_string(), std::sync::Arc::new(sort));
    map.insert("keys".to_string(), std::sync::Arc::new(keys));
    map.insert("values".to_string(), std::sync::Arc::new(values));
    map.insert("flatten".to_string(), std::sync::Arc::new(flatten));
    map.insert("this".to_string(), std::sync::Arc::new(this));
    map.insert("valid".to_string(), std::sync::Arc::new(valid));
    // @ugly/@pretty/@ascii affect only the final serialization, so at
    // evaluation time they are identity — the render mode they select is
    // read back out of the parsed path by `crate::serialize::render_mode_of`.
    map.insert("ugly".to_string(), std::sync::Arc::new(this));
    map.insert("pretty".to_string(), std::sync::Arc::new(this));
    map.insert("ascii".to_string(), std::sync::Arc::new(this));
    map.insert("top_n".to_string(), std::sync::Arc::new(top_n));
    map.insert("sum_n".to_string(), std::sync::Arc::new(sum_n));
}

fn this(v: &Value, _options: Option<&Value>) -> Result<Value, EvaluationError> {
    Ok(v.clone())
}

fn reverse(v: &Value, _options: Option<&Value>) -> Result<Value, EvaluationError> {
    match v {
        Value::Sequence(items) => {
            let mut items = items.clone();
            items.reverse();
            Ok(Value::Sequence(items))
        }
        Value::Mapping(m) => Ok(Value::Mapping(m.reversed())),
        other => Ok(other.clone()),
    }
}

/// Stable type-then-value ordering: null < bool < number < string <
/// sequence < mapping, natural order within a type.
fn sort_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Sequence(_) => 4,
        Value::Mapping(_) => 5,
    }
}

fn sort(v: &Value, _options: Option<&Value>) -> Result<Value, EvaluationError> {
    match v {
        Value::Sequence(items) => {
            let mut items = items.clone();
            items.sort_by(|a, b| {
                sort_rank(a).cmp(&sort_rank(b)).then_with(|| match (a, b) {
                    (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
                    (Value::Number(x), Value::Number(y)) => x
                        .as_f64()
                        .unwrap_or(0.0)
                        .partial_cmp(&y.as_f64().unwrap_or(0.0))
                        .unwrap_or(std::cmp::Ordering::Equal),
                    (Value::String(x), Value::String(y)) => x.cmp(y),
                    _ => std::cmp::Ordering::Equal,
                })
            });
            Ok(Value::Sequence(items))
        }
        other => Ok(other.clone()),
    }
}

fn keys(v: &Value, _options: Option<&Value>) -> Result<Value, EvaluationError> {
    match v {
        Value::Mapping(m) => Ok(Value::Sequence(m.keys().map(|k| Value::String(k.to_string())).collect())),
        other => Err(EvaluationError::TypeMismatch {
            part: "@keys".to_string(),
            found: other.type_name(),
            column: 0,
        }),
    }
}

fn values(v: &Value, _options: Option<&Value>) -> Result<Value, EvaluationError> {
    match v {
        Value::Mapping(m) => Ok(Value::Sequence(m.values().cloned().collect())),
        other => Err(EvaluationError::TypeMismatch {
            part: "@values".to_string(),
            found: other.type_name(),
            column: 0,
        }),
    }
}

fn flatten(v: &Value, options: Option<&Value>) -> Result<Value, EvaluationError> {
    let deep = options
        .and_then(|o| o.as_mapping())
        .and_then(|m| m.get("deep"))
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match v {
        Value::Sequence(items) => {
            let mut out = Vec::new();
            for item in items {
                match item {
                    Value::Sequence(inner) if deep => {
                        let flattened = flatten(item, options)?;
                        if let Value::Sequence(inner_flat) = flattened {
                            out.extend(inner_flat);
                        } else {
                            out.extend(inner.clone());
                        }
                    }
                    Value::Sequence(inner) => out.extend(inner.clone()),
                    other => out.push(other.clone()),
                }
            }
            Ok(Value::Sequence(out))
        }
        other => Ok(other.clone()),
    }
}

fn valid(v: &Value, _options: Option<&Value>) -> Result<Value, EvaluationError> {
    check_valid(v)?;
    Ok(v.clone())
}

/// `Value` has no variant outside the JSON data model (no dates, bytes,
/// etc.), so this always succeeds — the traversal exists so a future
/// variant addition has an obvious place to add a rejection, and so the
/// contract ("never fails on a valid decoded value") is exercised by a
/// real walk rather than trivially true by inspection.
fn check_valid(v: &Value) -> Result<(), EvaluationError> {
    match v {
        Value::Sequence(items) => items.iter().try_for_each(check_valid),
        Value::Mapping(m) => m.values().try_for_each(check_valid),
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => Ok(()),
    }
}

fn key_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => crate::serialize::to_json_text(other, crate::serialize::RenderMode::Ugly),
    }
}

fn top_n(v: &Value, options: Option<&Value>) -> Result<Value, EvaluationError> {
    let items = match v {
        Value::Sequence(items) => items,
        other => {
            return Err(EvaluationError::TypeMismatch {
                part: "@top_n".to_string(),
                found: other.type_name(),
                column: 0,
            })
        }
    };

    let n = options
        .and_then(|o| o.as_mapping())
        .and_then(|m| m.get("n"))
        .and_then(|v| v.as_number())
        .and_then(|n| n.as_u64());

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, u64> = HashMap::new();
    for item in items {
        let key = key_of(item);
        if !counts.contains_key(&key) {
            order.push(key.clone());
        }
        *counts.entry(key).or_insert(0) += 1;
    }

    let mut ranked: Vec<(String, u64)> = order.into_iter().map(|k| (k.clone(), counts[&k])).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    if let Some(n) = n {
        ranked.truncate(n as usize);
    }

    let map: Map = ranked
        .into_iter()
        .map(|(k, c)| (k, Value::Number(Number::from(c))))
        .collect();
    Ok(Value::Mapping(map))
}

fn sum_n(v: &Value, options: Option<&Value>) -> Result<Value, EvaluationError> {
    let items = match v {
        Value::Sequence(items) => items,
        other => {
            return Err(EvaluationError::TypeMismatch {
                part: "@sum_n".to_string(),
                found: other.type_name(),
                column: 0,
            })
        }
    };

    let options = options.and_then(|o| o.as_mapping()).ok_or_else(|| {
        EvaluationError::InvalidModifierOptions {
            name: "sum_n".to_string(),
            reason: "options object is required".to_string(),
        }
    })?;

    let group_key = options
        .get("group")
        .and_then(Value::as_str)
        .ok_or_else(|| EvaluationError::InvalidModifierOptions {
            name: "sum_n".to_string(),
            reason: "`group` is required".to_string(),
        })?;
    let sum_key = options
        .get("sum")
        .and_then(Value::as_str)
        .ok_or_else(|| EvaluationError::InvalidModifierOptions {
            name: "sum_n".to_string(),
            reason: "`sum` is required".to_string(),
        })?;
    let n = options.get("n").and_then(Value::as_number).and_then(|n| n.as_u64());

    let mut order: Vec<String> = Vec::new();
    let mut sums: HashMap<String, f64> = HashMap::new();
    for item in items {
        let Value::Mapping(m) = item else { continue };
        let (Some(group_val), Some(sum_val)) = (m.get(group_key), m.get(sum_key)) else {
            continue;
        };
        let Some(amount) = sum_val.as_number().and_then(|n| n.as_f64()) else {
            continue;
        };
        let key = key_of(group_val);
        if !sums.contains_key(&key) {
            order.push(key.clone());
        }
        *sums.entry(key).or_insert(0.0) += amount;
    }

    let mut ranked: Vec<(String, f64)> = order.into_iter().map(|k| (k.clone(), sums[&k])).collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    if let Some(n) = n {
        ranked.truncate(n as usize);
    }

    let map: Map = ranked
        .into_iter()
        .map(|(k, s)| {
            let value = Number::from_f64(s).map(Value::Number).unwrap_or(Value::Null);
            (k, value)
        })
        .collect();
    Ok(Value::Mapping(map))
}
