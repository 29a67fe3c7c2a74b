//! Lexer for the GJSON path language.
//!
//! Unlike the `nom`-combinator grammars a JSONPath parser can lean on, GJSON
//! paths are context-sensitive at the character level — matching parens in
//! `#(...)` must respect string quoting, a modifier's JSON options span ends
//! at the first *unescaped* top-level separator, and escapes inside field
//! names must be decoded as we go. That's naturally a hand-rolled scan over
//! byte offsets rather than a combinator pipeline, so that's what this module
//! is: one pass, left to right, producing [`Part`]s with their column.

mod part;
pub mod query;

pub use part::{compile_wildcard, Part, PathPart, QueryOperator, QuerySpec, QueryValue};

use crate::error::ParseError;

/// Tokenize a path string into an ordered list of [`Part`]s.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip_all, fields(path)))]
pub fn parse_path(path: &str) -> Result<Vec<Part>, ParseError> {
    let mut parts = Vec::new();
    let mut pos = 0usize;

    if path.starts_with("..") {
        parts.push(Part::new(PathPart::LinesPrefix, 0));
        pos = 2;
    }

    let mut need_separator = false;
    while pos < path.len() {
        if need_separator {
            match path[pos..].chars().next().unwrap() {
                '.' => {
                    pos += 1;
                }
                '|' => {
                    parts.push(Part::new(PathPart::PipeBoundary, col(path, pos)));
                    pos += 1;
                }
                other => {
                    return Err(ParseError::new(
                        format!("unexpected character '{other}'"),
                        col(path, pos),
                    ))
                }
            }
            if pos >= path.len() {
                return Err(ParseError::new("empty query part", col(path, pos)));
            }
        }
        let (part, new_pos) = parse_one_part(path, pos)?;
        parts.push(part);
        pos = new_pos;
        need_separator = true;
    }

    Ok(parts)
}

/// Convert a byte offset into `path` to a 0-based code-point column.
fn col(path: &str, byte_pos: usize) -> usize {
    path[..byte_pos].chars().count()
}

fn parse_one_part(path: &str, pos: usize) -> Result<(Part, usize), ParseError> {
    let c = path[pos..].chars().next().unwrap();
    match c {
        '#' => parse_array_part(path, pos),
        '@' => parse_modifier_part(path, pos),
        _ => parse_field_part(path, pos),
    }
}

fn parse_array_part(path: &str, pos: usize) -> Result<(Part, usize), ParseError> {
    let after_hash = pos + 1;
    if path[after_hash..].starts_with('(') {
        let content_start = after_hash + 1;
        let (content, content_end) = scan_balanced_parens(path, content_start)?;
        let mut new_pos = content_end + 1; // past the closing ')'
        let project_all = path[new_pos..].starts_with('#');
        if project_all {
            new_pos += 1;
        }
        let spec = query::parse_query_content(content, col(path, content_start))?;
        Ok((
            Part::new(
                PathPart::Query {
                    spec,
                    project_all,
                },
                col(path, pos),
            ),
            new_pos,
        ))
    } else {
        Ok((Part::new(PathPart::ArrayAll, col(path, pos)), after_hash))
    }
}

/// Scan from `start` (just past the opening `(`) for the matching `)`,
/// respecting JSON string quoting, and rejecting a nested `#(`.
///
/// Returns the content slice and the byte offset of the closing `)`.
fn scan_balanced_parens(path: &str, start: usize) -> Result<(&str, usize), ParseError> {
    let bytes = path.as_bytes();
    let mut depth = 1i32;
    let mut i = start;
    let mut in_string = false;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if in_string {
            if c == '\\' {
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            '"' => in_string = true,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Ok((&path[start..i], i));
                }
            }
            '#' if path[i..].starts_with("#(") => {
                return Err(ParseError::new(
                    "nested queries are not supported",
                    col(path, i),
                ))
            }
            _ => {}
        }
        i += 1;
    }
    Err(ParseError::new("unbalanced query parentheses", col(path, start)))
}

fn parse_modifier_part(path: &str, pos: usize) -> Result<(Part, usize), ParseError> {
    const GRAMMAR_CHARS: &[char] = &['.', '|', '#', '@', '*', '?', '\\', '(', ')', ':'];
    let name_start = pos + 1;
    let mut i = name_start;
    for c in path[name_start..].chars() {
        if GRAMMAR_CHARS.contains(&c) {
            break;
        }
        i += c.len_utf8();
    }
    if i == name_start {
        return Err(ParseError::new("empty modifier name", col(path, name_start)));
    }
    let name = path[name_start..i].to_string();

    if path[i..].starts_with(':') {
        let options_start = i + 1;
        let options_end = scan_top_level_json_span(path, options_start);
        let options_text = path[options_start..options_end].trim();
        let decoded: serde_json::Value = serde_json::from_str(options_text).map_err(|e| {
            ParseError::new(
                format!("invalid JSON in modifier options: {e}"),
                col(path, options_start),
            )
        })?;
        if !decoded.is_object() {
            return Err(ParseError::new(
                "modifier options must be a JSON object",
                col(path, options_start),
            ));
        }
        Ok((
            Part::new(
                PathPart::Modifier {
                    name,
                    options: Some(decoded.into()),
                },
                col(path, pos),
            ),
            options_end,
        ))
    } else {
        Ok((
            Part::new(PathPart::Modifier { name, options: None }, col(path, pos)),
            i,
        ))
    }
}

/// Scan forward from the start of a modifier's JSON options until hitting
/// an unescaped `.` or `|` at bracket depth 0, or end of input.
fn scan_top_level_json_span(path: &str, start: usize) -> usize {
    let bytes = path.as_bytes();
    let mut depth = 0i32;
    let mut i = start;
    let mut in_string = false;
    while i < bytes.len() {
        let c = bytes[i] as char;
        if in_string {
            if c == '\\' {
                i += 2;
                continue;
            }
            if c == '"' {
                in_string = false;
            }
            i += 1;
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth -= 1,
            '.' | '|' if depth <= 0 => return i,
            _ => {}
        }
        i += 1;
    }
    path.len()
}

/// Parse a plain field/wildcard/index segment, up to the next unescaped
/// `.` or `|` or end of input.
fn parse_field_part(path: &str, pos: usize) -> Result<(Part, usize), ParseError> {
    let bytes = path.as_bytes();
    let mut i = pos;
    let mut decoded = String::new();
    let mut raw_is_plain_digits = true;
    let mut is_wildcard = false;
    let mut wildcard_source = String::new();

    while i < bytes.len() {
        let c = path[i..].chars().next().unwrap();
        match c {
            '.' | '|' => break,
            '\\' => {
                raw_is_plain_digits = false;
                i += 1;
                if i >= bytes.len() {
                    return Err(ParseError::new("dangling escape", col(path, i)));
                }
                let escaped = path[i..].chars().next().unwrap();
                decoded.push(escaped);
                wildcard_source.push('\\');
                wildcard_source.push(escaped);
                i += escaped.len_utf8();
            }
            '*' | '?' => {
                is_wildcard = true;
                raw_is_plain_digits = false;
                decoded.push(c);
                wildcard_source.push(c);
                i += c.len_utf8();
            }
            other => {
                if !other.is_ascii_digit() {
                    raw_is_plain_digits = false;
                }
                decoded.push(other);
                wildcard_source.push(other);
                i += other.len_utf8();
            }
        }
    }

    if decoded.is_empty() {
        return Err(ParseError::new("empty query part", col(path, pos)));
    }

    let kind = if is_wildcard {
        PathPart::Wildcard {
            source: wildcard_source,
        }
    } else if raw_is_plain_digits {
        match decoded.parse::<u64>() {
            Ok(n) => PathPart::Index(n),
            Err(_) => PathPart::Field(decoded),
        }
    } else {
        PathPart::Field(decoded)
    };

    Ok((Part::new(kind, col(path, pos)), i))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(path: &str) -> Vec<PathPart> {
        parse_path(path).unwrap().into_iter().map(|p| p.kind).collect()
    }

    #[test]
    fn simple_dotted_fields() {
        assert_eq!(
            parts("name.first"),
            vec![
                PathPart::Field("name".into()),
                PathPart::Field("first".into())
            ]
        );
    }

    #[test]
    fn array_index_and_all() {
        assert_eq!(
            parts("friends.0.age"),
            vec![
                PathPart::Field("friends".into()),
                PathPart::Index(0),
                PathPart::Field("age".into()),
            ]
        );
        assert_eq!(
            parts("friends.#"),
            vec![PathPart::Field("friends".into()), PathPart::ArrayAll]
        );
    }

    #[test]
    fn wildcard_field() {
        let ps = parts("we*d\\.key");
        assert!(matches!(&ps[0], PathPart::Wildcard { source } if source == "we*d\\.key"));
    }

    #[test]
    fn escape_preserves_literal_dot() {
        assert_eq!(parts("weird\\.key"), vec![PathPart::Field("weird.key".into())]);
    }

    #[test]
    fn pipe_boundary() {
        assert_eq!(
            parts("a|b"),
            vec![
                PathPart::Field("a".into()),
                PathPart::PipeBoundary,
                PathPart::Field("b".into())
            ]
        );
    }

    #[test]
    fn lines_prefix_only_at_start() {
        assert_eq!(
            parts("..#(age>40).age")[0],
            PathPart::LinesPrefix
        );
    }

    #[test]
    fn empty_segment_is_error() {
        let err = parse_path("name..last").unwrap_err();
        assert_eq!(err.column, 5);
        assert_eq!(err.message, "empty query part");
    }

    #[test]
    fn query_first_match() {
        let ps = parts("friends.#(age>45).age");
        assert!(matches!(&ps[1], PathPart::Query { project_all: false, .. }));
    }

    #[test]
    fn query_all_matches() {
        let ps = parts("friends.#(age>45)#.age");
        assert!(matches!(&ps[1], PathPart::Query { project_all: true, .. }));
    }

    #[test]
    fn modifier_with_options() {
        let ps = parts(r#"@top_n:{"n":1}"#);
        match &ps[0] {
            PathPart::Modifier { name, options } => {
                assert_eq!(name, "top_n");
                assert!(options.is_some());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn modifier_without_options() {
        assert_eq!(
            parts("@reverse"),
            vec![PathPart::Modifier {
                name: "reverse".into(),
                options: None
            }]
        );
    }

    #[test]
    fn nested_query_rejected() {
        let err = parse_path("a.#(b.#(c>1))").unwrap_err();
        assert_eq!(err.message, "nested queries are not supported");
    }

    #[test]
    fn non_object_modifier_options_rejected() {
        let err = parse_path("@top_n:5").unwrap_err();
        assert!(err.message.contains("must be a JSON object"));
    }
}
