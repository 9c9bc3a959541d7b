use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current user-supplied values for a template's fields, keyed by field name.
///
/// Keys need not cover every field; an absent key means "use the field default".
/// Every mutation returns a new copy so callers can keep earlier snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(Map<String, Value>);

impl FormData {
    /// Creates empty form data.
    #[must_use]
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Returns the stored value for one field.
    #[must_use]
    pub fn get(&self, field_name: &str) -> Option<&Value> {
        self.0.get(field_name)
    }

    /// Returns whether a value is stored for one field.
    #[must_use]
    pub fn contains(&self, field_name: &str) -> bool {
        self.0.contains_key(field_name)
    }

    /// Returns a copy with one field value replaced.
    #[must_use]
    pub fn with_value(&self, field_name: impl Into<String>, value: Value) -> Self {
        let mut next = self.0.clone();
        next.insert(field_name.into(), value);
        Self(next)
    }

    /// Returns a copy with one field value removed.
    #[must_use]
    pub fn without_value(&self, field_name: &str) -> Self {
        let mut next = self.0.clone();
        next.remove(field_name);
        Self(next)
    }

    /// Returns the number of stored values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no values are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates stored values in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for FormData {
    fn from(value: Map<String, Value>) -> Self {
        Self(value)
    }
}

impl FromIterator<(String, Value)> for FormData {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Returns whether a value counts as "not filled in".
///
/// Missing, `null`, whitespace-only strings and empty lists are blank. `false`
/// and `0` are real answers.
#[must_use]
pub fn is_blank_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        Some(_) => false,
    }
}
