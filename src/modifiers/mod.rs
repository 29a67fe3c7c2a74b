//! The modifier registry: a name → transform map consulted by `@name` path
//! parts, seeded with the built-in modifiers.

mod builtins;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use once_cell::sync::Lazy;

use crate::error::{EvaluationError, RegistrationError};
use crate::value::Value;

/// `. | # @ * ? \ ( ) :` — the characters a modifier name may never contain,
/// since they all carry meaning elsewhere in the path grammar.
const GRAMMAR_CHARS: &[char] = &['.', '|', '#', '@', '*', '?', '\\', '(', ')', ':'];

pub type ModifierFn = Arc<dyn Fn(&Value, Option<&Value>) -> Result<Value, EvaluationError> + Send + Sync>;

/// A name → modifier-function map.
///
/// Registration is an atomic mutation (a single mutex covers both
/// registration and lookup); evaluation only ever reads.
#[derive(Clone)]
pub struct ModifierRegistry {
    inner: Arc<Mutex<HashMap<String, ModifierFn>>>,
}

impl ModifierRegistry {
    /// A fresh, independent registry seeded with the built-ins — suitable
    /// for an engine that wants its own modifier namespace.
    pub fn new() -> Self {
        let mut map = HashMap::new();
        builtins::seed(&mut map);
        Self {
            inner: Arc::new(Mutex::new(map)),
        }
    }

    /// The process-wide shared registry, for callers happy to register
    /// modifiers once and reuse them across every `evaluate` call.
    pub fn global() -> &'static ModifierRegistry {
        static GLOBAL: Lazy<ModifierRegistry> = Lazy::new(ModifierRegistry::new);
        &GLOBAL
    }

    /// Register a user-supplied modifier.
    ///
    /// Rejected if `name` collides with a built-in, or contains any
    /// grammar character.
    pub fn register(
        &self,
        name: impl Into<String>,
        f: impl Fn(&Value, Option<&Value>) -> Result<Value, EvaluationError> + Send + Sync + 'static,
    ) -> Result<(), RegistrationError> {
        let name = name.into();
        if name.chars().any(|c| GRAMMAR_CHARS.contains(&c)) || name.is_empty() {
            return Err(RegistrationError::InvalidName(name));
        }
        if builtins::NAMES.contains(&name.as_str()) {
            return Err(RegistrationError::BuiltinCollision(name));
        }
        let mut guard = self.inner.lock().expect("modifier registry mutex poisoned");
        guard.insert(name, Arc::new(f));
        Ok(())
    }

    #[cfg_attr(feature = "trace", tracing::instrument(level = "trace", skip(self, current)))]
    pub fn invoke(
        &self,
        name: &str,
        current: &Value,
        options: Option<&Value>,
    ) -> Result<Value, EvaluationError> {
        let guard = self.inner.lock().expect("modifier registry mutex poisoned");
        let f = guard
            .get(name)
            .cloned()
            .ok_or_else(|| EvaluationError::UnknownModifier(name.to_string()))?;
        drop(guard);
        f(current, options)
    }
}

impl Default for ModifierRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builtin_collision_rejected() {
        let reg = ModifierRegistry::new();
        let err = reg.register("sort", |v, _| Ok(v.clone())).unwrap_err();
        assert_eq!(err, RegistrationError::BuiltinCollision("sort".to_string()));
    }

    #[test]
    fn grammar_char_in_name_rejected() {
        let reg = ModifierRegistry::new();
        let err = reg.register("my.mod", |v, _| Ok(v.clone())).unwrap_err();
        assert_eq!(err, RegistrationError::InvalidName("my.mod".to_string()));
    }

    #[test]
    fn custom_modifier_round_trip() {
        let reg = ModifierRegistry::new();
        reg.register("double", |v, _| match v {
            Value::Number(n) => Ok(Value::Number(
                serde_json::Number::from_f64(n.as_f64().unwrap_or(0.0) * 2.0).unwrap(),
            )),
            other => Ok(other.clone()),
        })
        .unwrap();
        let result = reg.invoke("double", &Value::from(json!(21)), None).unwrap();
        assert_eq!(result, Value::from(json!(42.0)));
    }

    #[test]
    fn unknown_modifier_errors() {
        let reg = ModifierRegistry::new();
        let err = reg.invoke("nope", &Value::Null, None).unwrap_err();
        assert!(matches!(err, EvaluationError::UnknownModifier(n) if n == "nope"));
    }
}
