use crate::error::ParseError;
use crate::value::Value;

use super::part::{QueryOperator, QuerySpec, QueryValue};

const TRUTHY_TAGS: [&str; 4] = ["true", "false", "null", "*"];

/// Parse the content of a `#(...)` query, e.g. `age>45` or `last=="Murphy"`.
///
/// `base_column` is the column at which `content` starts within the whole
/// path string, so any error raised here reports the right absolute column.
pub fn parse_query_content(content: &str, base_column: usize) -> Result<QuerySpec, ParseError> {
    if content.is_empty() {
        return Err(ParseError::new("empty query part", base_column));
    }

    let (split_at, op, op_len) = find_operator(content)
        .ok_or_else(|| ParseError::new("missing comparison operator in query", base_column))?;

    let key_path = content[..split_at].trim().to_string();
    let value_src = content[split_at + op_len..].trim();

    let value = match op {
        QueryOperator::Truthy => {
            let tag = value_src.trim();
            let tag = if TRUTHY_TAGS.contains(&tag) {
                tag.to_string()
            } else if tag.is_empty() {
                "true".to_string()
            } else {
                return Err(ParseError::new(
                    format!("invalid truthy tag `{tag}`"),
                    base_column + split_at + op_len,
                ));
            };
            QueryValue::Truthy(tag)
        }
        QueryOperator::Like | QueryOperator::NotLike | QueryOperator::RegexMatch => {
            QueryValue::Pattern(parse_literal_text(value_src))
        }
        _ => QueryValue::Json(parse_json_literal(value_src)),
    };

    Ok(QuerySpec {
        key_path,
        operator: op,
        value,
    })
}

/// Find the first (leftmost, outside of quoted strings) occurrence of a
/// query operator, checked longest-match-first so that e.g. `==` isn't
/// mistaken for two `=` tokens (not itself a valid operator, but keeps
/// `!=`/`<=`/`>=` from being cut short).
fn find_operator(content: &str) -> Option<(usize, QueryOperator, usize)> {
    const OPERATORS: &[(&str, QueryOperator)] = &[
        ("==", QueryOperator::Eq),
        ("!=", QueryOperator::Ne),
        ("<=", QueryOperator::Le),
        (">=", QueryOperator::Ge),
        ("!%", QueryOperator::NotLike),
        ("=~", QueryOperator::RegexMatch),
        ("<", QueryOperator::Lt),
        (">", QueryOperator::Gt),
        ("%", QueryOperator::Like),
        ("~", QueryOperator::Truthy),
    ];

    let mut in_string = false;
    let bytes = content.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if c == '"' {
            let mut backslashes = 0;
            let mut j = i;
            while j > 0 && bytes[j - 1] == b'\\' {
                backslashes += 1;
                j -= 1;
            }
            if backslashes % 2 == 0 {
                in_string = !in_string;
            }
        }
        if !in_string {
            for (tag, op) in OPERATORS {
                if content[i..].starts_with(tag) {
                    return Some((i, *op, tag.len()));
                }
            }
        }
        i += 1;
    }
    None
}

/// Parse a value that is either a quoted string literal or a bare token,
/// used for `%`/`!%`/`=~` right-hand sides.
fn parse_literal_text(src: &str) -> String {
    if src.len() >= 2 && (src.starts_with('"') || src.starts_with('\'')) {
        let quote = src.chars().next().unwrap();
        if src.ends_with(quote) {
            return unescape_simple(&src[1..src.len() - 1]);
        }
    }
    src.to_string()
}

fn unescape_simple(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a comparison right-hand side as a JSON literal (number, bool,
/// null, quoted string), falling back to treating the bare token as a
/// string when it isn't valid JSON — GJSON query values are commonly
/// written unquoted, e.g. `#(last==Murphy)`.
fn parse_json_literal(src: &str) -> Value {
    if src.is_empty() {
        return Value::String(String::new());
    }
    match serde_json::from_str::<serde_json::Value>(src) {
        Ok(v) => v.into(),
        Err(_) => Value::String(parse_literal_text(src)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparison_operator_and_number() {
        let spec = parse_query_content("age>45", 0).unwrap();
        assert_eq!(spec.key_path, "age");
        assert_eq!(spec.operator, QueryOperator::Gt);
        assert!(matches!(spec.value, QueryValue::Json(Value::Number(_))));
    }

    #[test]
    fn equality_with_quoted_string() {
        let spec = parse_query_content(r#"last=="Murphy""#, 0).unwrap();
        assert_eq!(spec.operator, QueryOperator::Eq);
        match spec.value {
            QueryValue::Json(Value::String(s)) => assert_eq!(s, "Murphy"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn bare_unquoted_string_value() {
        let spec = parse_query_content("last==Murphy", 0).unwrap();
        match spec.value {
            QueryValue::Json(Value::String(s)) => assert_eq!(s, "Murphy"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn truthy_bare_key() {
        let spec = parse_query_content("~", 0).unwrap();
        assert_eq!(spec.key_path, "");
        assert_eq!(spec.operator, QueryOperator::Truthy);
        assert_eq!(spec.value, QueryValue::Truthy("true".to_string()));
    }

    #[test]
    fn like_pattern() {
        let spec = parse_query_content(r#"name%"tom*""#, 0).unwrap();
        assert_eq!(spec.operator, QueryOperator::Like);
        assert_eq!(spec.value, QueryValue::Pattern("tom*".to_string()));
    }

    #[test]
    fn empty_content_is_error() {
        let err = parse_query_content("", 3).unwrap_err();
        assert_eq!(err.column, 3);
    }
}
