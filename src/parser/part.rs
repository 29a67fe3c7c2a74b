use regex::Regex;

use crate::value::Value;

/// One lexical unit of a path, together with the byte offset it starts at.
///
/// The offset doubles as the 0-based column used in [`crate::error::ParseError`]
/// diagnostics. Columns are counted in code points, not bytes, so a caret
/// still lands under the right character when a field name contains
/// multi-byte UTF-8 — `column` is only byte-for-byte identical to a
/// code-point count for the ASCII grammar characters this parser scans.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub kind: PathPart,
    pub column: usize,
}

impl Part {
    pub fn new(kind: PathPart, column: usize) -> Self {
        Self { kind, column }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathPart {
    /// A literal object key, escape-decoded.
    Field(String),
    /// An unsigned integer segment. Evaluated as a sequence index against a
    /// `Sequence`, or as an object-key lookup (of the digit string) against
    /// a `Mapping` — see the evaluator's stepwise table.
    Index(u64),
    /// A field-name glob; `source` is the original, not-yet-compiled text.
    Wildcard { source: String },
    /// The bare `#`.
    ArrayAll,
    /// `#(...)` (first match) or `#(...)#` (all matches).
    Query { spec: QuerySpec, project_all: bool },
    /// `@name` with optional `:{...}` options.
    Modifier { name: String, options: Option<Value> },
    /// A `|` separator.
    PipeBoundary,
    /// The leading `..`, only valid at position 0.
    LinesPrefix,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub key_path: String,
    pub operator: QueryOperator,
    pub value: QueryValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    RegexMatch,
    Truthy,
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Json(Value),
    Pattern(String),
    Truthy(String),
}

/// Compile a GJSON wildcard pattern (`*` and `?`, with `\`-escapes reverting
/// them to literals) into an anchored [`Regex`].
///
/// Non-wildcard characters, and escaped `*`/`?`, are regex-escaped; bare `*`
/// becomes `.*` and bare `?` becomes `.`.
pub fn compile_wildcard(pattern: &str) -> Regex {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    out.push_str(&regex::escape(&next.to_string()));
                } else {
                    out.push_str(&regex::escape("\\"));
                }
            }
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    // Patterns are produced by our own parser from validated source text, so
    // a compile failure here would indicate a bug in `compile_wildcard`
    // itself, not bad user input.
    Regex::new(&out).expect("wildcard pattern always compiles to a valid regex")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_star_and_question() {
        let re = compile_wildcard("we*d?key");
        assert!(re.is_match("weird1key"));
        assert!(!re.is_match("weird12key"));
    }

    #[test]
    fn wildcard_escaped_literal() {
        let re = compile_wildcard(r"we*d\.key");
        assert!(re.is_match("weird.key"));
    }

    #[test]
    fn wildcard_escaped_star_is_literal() {
        let re = compile_wildcard(r"a\*b");
        assert!(re.is_match("a*b"));
        assert!(!re.is_match("aXb"));
    }
}
