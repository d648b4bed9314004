use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Locale and behavioural flags sent with every remote call.
///
/// Contexts are immutable values; [`CallContext::overlay`] returns a merged
/// copy instead of mutating a shared mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallContext(Map<String, Value>);

impl CallContext {
    /// Empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the usual import context: a language plus the `noupdate` flag.
    #[must_use]
    pub fn with_defaults(lang: impl Into<String>, noupdate: bool) -> Self {
        Self::new()
            .with_entry("lang", Value::String(lang.into()))
            .with_entry("noupdate", Value::Bool(noupdate))
    }

    /// Returns a copy with one key set.
    #[must_use]
    pub fn with_entry(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Returns a new context where every key of `other` wins over `self`.
    #[must_use]
    pub fn overlay(&self, other: &Self) -> Self {
        let mut merged = self.0.clone();
        for (key, value) in &other.0 {
            merged.insert(key.clone(), value.clone());
        }

        Self(merged)
    }

    /// Returns the value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the context as a JSON object.
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for CallContext {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}
