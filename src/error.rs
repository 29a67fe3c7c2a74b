use std::fmt;

/// A fault raised while tokenizing a path string.
///
/// Carries the 0-based, code-point column of the offending character so
/// that [`ParseError::render`] can draw a caret under it.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{message} (column {column})")]
pub struct ParseError {
    pub message: String,
    pub column: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, column: usize) -> Self {
        Self {
            message: message.into(),
            column,
        }
    }

    /// Render the standard three-line diagnostic:
    /// ```text
    /// <message>
    /// Query: <full path>
    /// ------^
    /// ```
    pub fn render(&self, path: &str) -> String {
        let prefix_width = "Query: ".chars().count() + self.column;
        let mut caret_line = "-".repeat(prefix_width);
        caret_line.push('^');
        format!("{}\nQuery: {}\n{}", self.message, path, caret_line)
    }
}

/// A fault raised while evaluating an already-parsed path against a value.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum EvaluationError {
    #[error("no value found for part {part} at column {column}")]
    NotFound { part: String, column: usize },

    #[error("cannot apply {part} to a {found} at column {column}")]
    TypeMismatch {
        part: String,
        found: &'static str,
        column: usize,
    },

    #[error("invalid options for modifier @{name}: {reason}")]
    InvalidModifierOptions { name: String, reason: String },

    #[error("unknown modifier @{0}")]
    UnknownModifier(String),

    #[error("value is not representable as JSON: {reason}")]
    InvalidValueForValid { reason: String },
}

/// A registration-time fault when adding a modifier to a
/// [`crate::modifiers::ModifierRegistry`].
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("modifier name `{0}` collides with a built-in modifier")]
    BuiltinCollision(String),

    #[error("modifier name `{0}` contains a reserved grammar character")]
    InvalidName(String),
}

/// The top-level error type returned by the crate's evaluation entry points.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Parse(#[from] ParseError),
    #[error("{0}")]
    Evaluation(#[from] EvaluationError),
}

/// Wraps a [`ParseError`] together with the path it came from so it can be
/// displayed as the full caret diagnostic via `{}`.
pub struct ParseErrorRendered<'a>(pub &'a ParseError, pub &'a str);

impl fmt::Display for ParseErrorRendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.render(self.1))
    }
}
