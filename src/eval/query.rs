use regex::Regex;

use crate::modifiers::ModifierRegistry;
use crate::parser::{compile_wildcard, parse_path, QueryOperator, QuerySpec, QueryValue};
use crate::value::Value;

use super::evaluate_parts;

/// Evaluate `element`'s `key_path` (or `element` itself, if empty) and test
/// it against the query's operator/value. Any failure to resolve the probe
/// (missing field, type mismatch) makes the element simply not match —
/// predicate queries never raise for per-element mismatches (spec
/// "query totality").
pub fn matches(element: &Value, spec: &QuerySpec, registry: &ModifierRegistry) -> bool {
    let probe = if spec.key_path.is_empty() {
        Some(element.clone())
    } else {
        resolve_probe(element, &spec.key_path, registry)
    };

    match (&spec.operator, &spec.value) {
        (QueryOperator::Truthy, QueryValue::Truthy(tag)) => match tag.as_str() {
            "true" => probe.map(|p| p.is_truthy()).unwrap_or(false),
            "false" => probe.map(|p| !p.is_truthy()).unwrap_or(false),
            "null" => probe.map(|p| p.is_null()).unwrap_or(false),
            "*" => probe.is_some(),
            _ => false,
        },
        (QueryOperator::Like, QueryValue::Pattern(pat)) => match probe.as_ref().and_then(Value::as_str) {
            Some(s) => compile_wildcard(pat).is_match(s),
            None => false,
        },
        (QueryOperator::NotLike, QueryValue::Pattern(pat)) => match probe.as_ref().and_then(Value::as_str) {
            Some(s) => !compile_wildcard(pat).is_match(s),
            None => false,
        },
        (QueryOperator::RegexMatch, QueryValue::Pattern(pat)) => match probe.as_ref().and_then(Value::as_str) {
            Some(s) => Regex::new(pat).map(|re| re.is_match(s)).unwrap_or(false),
            None => false,
        },
        (op, QueryValue::Json(literal)) => match probe {
            Some(p) => compare(op, &p, literal),
            None => matches!(op, QueryOperator::Ne),
        },
        _ => false,
    }
}

fn resolve_probe(element: &Value, key_path: &str, registry: &ModifierRegistry) -> Option<Value> {
    let parts = parse_path(key_path).ok()?;
    evaluate_parts(element, &parts, registry).ok()
}

fn compare(op: &QueryOperator, left: &Value, right: &Value) -> bool {
    use QueryOperator::*;
    match op {
        Eq => left == right,
        Ne => left != right,
        Lt | Le | Gt | Ge => match (left, right) {
            (Value::Number(a), Value::Number(b)) => {
                let (a, b) = (a.as_f64(), b.as_f64());
                match (a, b) {
                    (Some(a), Some(b)) => match op {
                        Lt => a < b,
                        Le => a <= b,
                        Gt => a > b,
                        Ge => a >= b,
                        _ => unreachable!(),
                    },
                    _ => false,
                }
            }
            (Value::String(a), Value::String(b)) => match op {
                Lt => a < b,
                Le => a <= b,
                Gt => a > b,
                Ge => a >= b,
                _ => unreachable!(),
            },
            _ => false,
        },
        _ => false,
    }
}
