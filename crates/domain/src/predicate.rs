use std::cmp::Ordering;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tagkit_core::{AppResult, FieldError, NonEmptyString};

use crate::form_data::{FormData, is_blank_value};

/// Author-supplied predicate over the current form state.
#[derive(Clone)]
pub struct FormPredicate(Arc<dyn Fn(&FormData) -> bool + Send + Sync>);

impl FormPredicate {
    /// Wraps a closure as a form predicate.
    pub fn new(predicate: impl Fn(&FormData) -> bool + Send + Sync + 'static) -> Self {
        Self(Arc::new(predicate))
    }

    /// Evaluates the predicate.
    #[must_use]
    pub fn evaluate(&self, form_data: &FormData) -> bool {
        (self.0)(form_data)
    }
}

impl Debug for FormPredicate {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("FormPredicate(..)")
    }
}

impl PartialEq for FormPredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

// Closures have no data form; they serialize as an opaque marker.
impl Serialize for FormPredicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("<predicate>")
    }
}

/// Supported operators for declarative field conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    /// Equality comparison.
    Eq,
    /// Inequality comparison.
    Neq,
    /// Greater-than comparison.
    Gt,
    /// Greater-than-or-equal comparison.
    Gte,
    /// Less-than comparison.
    Lt,
    /// Less-than-or-equal comparison.
    Lte,
    /// Case-insensitive contains comparison, or list membership.
    Contains,
    /// Field has no value.
    Empty,
    /// Field has a value.
    NotEmpty,
}

/// Declarative condition over one form value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCondition {
    field: NonEmptyString,
    operator: ConditionOperator,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    value: Value,
}

impl FieldCondition {
    /// Creates a validated field condition.
    pub fn new(
        field: impl Into<String>,
        operator: ConditionOperator,
        value: Value,
    ) -> AppResult<Self> {
        Ok(Self {
            field: NonEmptyString::new(field)?,
            operator,
            value,
        })
    }

    /// Returns the inspected field name.
    #[must_use]
    pub fn field(&self) -> &NonEmptyString {
        &self.field
    }

    /// Returns the condition operator.
    #[must_use]
    pub fn operator(&self) -> ConditionOperator {
        self.operator
    }

    /// Returns the comparison value.
    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Evaluates the condition against form data.
    #[must_use]
    pub fn matches(&self, form_data: &FormData) -> bool {
        let stored = form_data.get(self.field.as_str());
        let value = stored.unwrap_or(&Value::Null);

        match self.operator {
            ConditionOperator::Eq => value == &self.value,
            ConditionOperator::Neq => value != &self.value,
            ConditionOperator::Gt => compare_values(value, &self.value).is_some_and(Ordering::is_gt),
            ConditionOperator::Gte => {
                compare_values(value, &self.value).is_some_and(Ordering::is_ge)
            }
            ConditionOperator::Lt => compare_values(value, &self.value).is_some_and(Ordering::is_lt),
            ConditionOperator::Lte => {
                compare_values(value, &self.value).is_some_and(Ordering::is_le)
            }
            ConditionOperator::Contains => match value {
                Value::Array(items) => items.contains(&self.value),
                _ => {
                    let left = value.as_str().unwrap_or_default().to_lowercase();
                    let right = self.value.as_str().unwrap_or_default().to_lowercase();
                    left.contains(right.as_str())
                }
            },
            ConditionOperator::Empty => is_blank_value(stored),
            ConditionOperator::NotEmpty => !is_blank_value(stored),
        }
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(left_number), Some(right_number)) = (value_as_f64(left), value_as_f64(right)) {
        return left_number.partial_cmp(&right_number);
    }

    if let (Some(left_text), Some(right_text)) = (left.as_str(), right.as_str()) {
        return Some(left_text.cmp(right_text));
    }

    None
}

fn value_as_f64(value: &Value) -> Option<f64> {
    if let Some(number) = value.as_f64() {
        return Some(number);
    }

    value.as_str().and_then(|raw| raw.trim().parse::<f64>().ok())
}

/// A predicate slot on a field: `required`, `condition`, `visible` or `disabled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Flag {
    /// Fixed answer.
    Constant(bool),
    /// Declarative condition.
    When(FieldCondition),
    /// All listed conditions must hold.
    WhenAll(Vec<FieldCondition>),
    /// Arbitrary closure over the form state.
    #[serde(skip_deserializing)]
    Predicate(FormPredicate),
}

impl Flag {
    /// Wraps a closure as a flag.
    pub fn predicate(predicate: impl Fn(&FormData) -> bool + Send + Sync + 'static) -> Self {
        Self::Predicate(FormPredicate::new(predicate))
    }

    /// Resolves the flag for the given form state.
    #[must_use]
    pub fn evaluate(&self, form_data: &FormData) -> bool {
        match self {
            Self::Constant(value) => *value,
            Self::When(condition) => condition.matches(form_data),
            Self::WhenAll(conditions) => conditions
                .iter()
                .all(|condition| condition.matches(form_data)),
            Self::Predicate(predicate) => predicate.evaluate(form_data),
        }
    }

    /// Returns field names read by declarative conditions.
    #[must_use]
    pub fn referenced_fields(&self) -> Vec<&str> {
        match self {
            Self::When(condition) => vec![condition.field().as_str()],
            Self::WhenAll(conditions) => conditions
                .iter()
                .map(|condition| condition.field().as_str())
                .collect(),
            Self::Constant(_) | Self::Predicate(_) => Vec::new(),
        }
    }
}

impl From<bool> for Flag {
    fn from(value: bool) -> Self {
        Self::Constant(value)
    }
}

/// Extra state handed to a custom save-button predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormContext {
    /// Form data differs from the last persisted snapshot.
    pub is_dirty: bool,
    /// A save request is already in flight.
    pub is_submitting: bool,
}

type SaveButtonFn = dyn Fn(&FormData, &[FieldError], &FormContext) -> bool + Send + Sync;

/// Custom rule deciding whether the save button is disabled.
#[derive(Clone)]
pub struct SaveButtonPredicate(Arc<SaveButtonFn>);

impl SaveButtonPredicate {
    /// Wraps a closure as a save-button predicate.
    pub fn new(
        predicate: impl Fn(&FormData, &[FieldError], &FormContext) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(predicate))
    }

    /// Returns `true` when the save button must be disabled.
    #[must_use]
    pub fn evaluate(
        &self,
        form_data: &FormData,
        errors: &[FieldError],
        context: &FormContext,
    ) -> bool {
        (self.0)(form_data, errors, context)
    }
}

impl Debug for SaveButtonPredicate {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str("SaveButtonPredicate(..)")
    }
}

impl PartialEq for SaveButtonPredicate {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
