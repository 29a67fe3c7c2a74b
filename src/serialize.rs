//! Rendering a [`Value`] back to JSON text under the `@ugly`/`@pretty`/
//! `@ascii` modifiers.
//!
//! `@ugly`, `@pretty`, and `@ascii` are identity transforms during
//! evaluation (see `modifiers::builtins`); the render mode they select is
//! read back out of a parsed path's trailing modifier by [`render_mode_of`]
//! and applied only at the very end, when the result is turned into text.

use crate::parser::{Part, PathPart};
use crate::value::Value;

/// How a [`Value`] should be rendered to text.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderMode {
    /// Compact, same as `Ugly` — `serde_json`'s default.
    Default,
    /// No insignificant whitespace.
    Ugly,
    /// Indented. `width` is accepted in modifier options for compatibility
    /// with upstream GJSON's `@pretty` option set, but not honored.
    Pretty {
        indent: usize,
        prefix: String,
        sortkeys: bool,
    },
    /// Escape all non-ASCII characters as `\uXXXX`.
    Ascii,
}

impl Default for RenderMode {
    fn default() -> Self {
        RenderMode::Default
    }
}

/// Inspect a parsed path's trailing modifier (if any) and resolve the
/// [`RenderMode`] it selects. A path with no rendering modifier, or one
/// whose last modifier isn't `@ugly`/`@pretty`/`@ascii`, renders as
/// [`RenderMode::Default`].
pub fn render_mode_of(parts: &[Part]) -> RenderMode {
    let Some(last) = parts.iter().rev().find(|p| {
        matches!(p.kind, PathPart::Modifier { .. })
    }) else {
        return RenderMode::Default;
    };
    let PathPart::Modifier { name, options } = &last.kind else {
        unreachable!()
    };
    match name.as_str() {
        "ugly" => RenderMode::Ugly,
        "ascii" => RenderMode::Ascii,
        "pretty" => {
            let opts = options.as_ref().and_then(Value::as_mapping);
            RenderMode::Pretty {
                indent: opts
                    .and_then(|m| m.get("indent"))
                    .and_then(|v| v.as_number())
                    .and_then(|n| n.as_u64())
                    .unwrap_or(2) as usize,
                prefix: opts
                    .and_then(|m| m.get("prefix"))
                    .and_then(Value::as_str)
                    .unwrap_or("")
                    .to_string(),
                sortkeys: opts
                    .and_then(|m| m.get("sortkeys"))
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
            }
        }
        _ => RenderMode::Default,
    }
}

/// Render `value` as JSON text under `mode`.
pub fn to_json_text(value: &Value, mode: RenderMode) -> String {
    match mode {
        RenderMode::Default | RenderMode::Ugly => write_ugly(value),
        RenderMode::Pretty {
            indent,
            prefix,
            sortkeys,
        } => {
            let mut out = String::new();
            write_pretty(value, &mut out, &prefix, indent, 0, sortkeys);
            out
        }
        RenderMode::Ascii => escape_non_ascii(&write_ugly(value)),
    }
}

fn write_ugly(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn write_pretty(
    value: &Value,
    out: &mut String,
    line_prefix: &str,
    indent: usize,
    depth: usize,
    sortkeys: bool,
) {
    let pad = |depth: usize| format!("{line_prefix}{}", " ".repeat(indent * depth));
    match value {
        Value::Sequence(items) if items.is_empty() => out.push_str("[]"),
        Value::Sequence(items) => {
            out.push_str("[\n");
            for (i, item) in items.iter().enumerate() {
                out.push_str(&pad(depth + 1));
                write_pretty(item, out, line_prefix, indent, depth + 1, sortkeys);
                if i + 1 < items.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&pad(depth));
            out.push(']');
        }
        Value::Mapping(m) if m.is_empty() => out.push_str("{}"),
        Value::Mapping(m) => {
            out.push_str("{\n");
            let mut entries: Vec<(&str, &Value)> = m.iter().collect();
            if sortkeys {
                entries.sort_by(|a, b| a.0.cmp(b.0));
            }
            for (i, (k, v)) in entries.iter().enumerate() {
                out.push_str(&pad(depth + 1));
                out.push_str(&serde_json::to_string(k).unwrap_or_default());
                out.push_str(": ");
                write_pretty(v, out, line_prefix, indent, depth + 1, sortkeys);
                if i + 1 < entries.len() {
                    out.push(',');
                }
                out.push('\n');
            }
            out.push_str(&pad(depth));
            out.push('}');
        }
        scalar => out.push_str(&write_ugly(scalar)),
    }
}

fn escape_non_ascii(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{unit:04x}"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn v(j: serde_json::Value) -> Value {
        j.into()
    }

    #[test]
    fn ugly_is_compact() {
        let value = v(json!({"a":1,"b":[1,2]}));
        assert_eq!(to_json_text(&value, RenderMode::Ugly), r#"{"a":1,"b":[1,2]}"#);
    }

    #[test]
    fn pretty_indents_and_preserves_order() {
        let value = v(json!({"b":1,"a":2}));
        let text = to_json_text(
            &value,
            RenderMode::Pretty {
                indent: 2,
                prefix: String::new(),
                sortkeys: false,
            },
        );
        assert_eq!(text, "{\n  \"b\": 1,\n  \"a\": 2\n}");
    }

    #[test]
    fn pretty_sortkeys() {
        let value = v(json!({"b":1,"a":2}));
        let text = to_json_text(
            &value,
            RenderMode::Pretty {
                indent: 2,
                prefix: String::new(),
                sortkeys: true,
            },
        );
        assert_eq!(text, "{\n  \"a\": 2,\n  \"b\": 1\n}");
    }

    #[test]
    fn ascii_escapes_non_ascii() {
        let value = v(json!("café"));
        assert_eq!(to_json_text(&value, RenderMode::Ascii), "\"caf\\u00e9\"");
    }

    #[test]
    fn render_mode_of_reads_trailing_modifier() {
        let parts = crate::parser::parse_path("a.b.@pretty:{\"indent\":2}").unwrap();
        assert!(matches!(render_mode_of(&parts), RenderMode::Pretty { indent: 2, .. }));
    }
}
