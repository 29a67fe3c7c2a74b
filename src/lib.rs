//! A query engine for JSON-like values implementing the GJSON path language:
//! dotted/piped field access, array indexing and wildcards, `#(...)`
//! predicate queries, and `@name` modifiers.
//!
//! ```
//! use gjson_path::{evaluate, Value};
//!
//! let data: Value = gjson_path::from_json_text(br#"{"name":{"first":"Tom"}}"#)
//!     .unwrap();
//! assert_eq!(evaluate(&data, "name.first").unwrap(), Value::String("Tom".into()));
//! ```

mod error;
mod eval;
mod modifiers;
mod parser;
mod serialize;
mod value;

pub use error::{Error, EvaluationError, ParseError, ParseErrorRendered, RegistrationError};
pub use modifiers::ModifierRegistry;
pub use parser::{Part, PathPart, QueryOperator, QuerySpec, QueryValue};
pub use serialize::RenderMode;
pub use value::{Map, Value};

/// Parse `path` and evaluate it against `value` using the process-wide
/// default modifier registry.
#[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip(value)))]
pub fn evaluate(value: &Value, path: &str) -> Result<Value, Error> {
    evaluate_with(value, path, ModifierRegistry::global(), &EvalOptions::default())
}

/// Parse `path` and evaluate it against `value` using a caller-supplied
/// modifier registry and options.
///
/// When `options.default_on_error` is set, any error is swallowed and that
/// default is returned instead. This only ever masks parse/evaluation
/// failures from this call, never a [`RegistrationError`] from a prior,
/// separate `registry.register()` call — a bad registration is a programmer
/// error, not a query-time condition a caller should be able to paper over.
pub fn evaluate_with(
    value: &Value,
    path: &str,
    registry: &ModifierRegistry,
    options: &EvalOptions,
) -> Result<Value, Error> {
    let result = parser::parse_path(path)
        .map_err(Error::from)
        .and_then(|parts| eval::evaluate_parts(value, &parts, registry).map_err(Error::from));

    match (result, &options.default_on_error) {
        (Ok(v), _) => Ok(v),
        (Err(_), Some(default)) => Ok(default.clone()),
        (Err(e), None) => Err(e),
    }
}

/// Parse `bytes` as JSON text into a [`Value`] (via `serde_json`).
pub fn from_json_text(bytes: &[u8]) -> Result<Value, serde_json::Error> {
    let decoded: serde_json::Value = serde_json::from_slice(bytes)?;
    Ok(decoded.into())
}

/// Render `value` as JSON text under the given [`RenderMode`].
pub fn to_json_text(value: &Value, render: RenderMode) -> String {
    serialize::to_json_text(value, render)
}

/// Evaluation convenience knobs.
///
/// The only documented one is a default value substituted for any error —
/// parse, evaluation, or modifier invocation alike — so a caller can treat
/// a query as "best effort" without its own try/catch plumbing.
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    pub default_on_error: Option<Value>,
}

impl EvalOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default(default: Value) -> Self {
        Self {
            default_on_error: Some(default),
        }
    }
}
