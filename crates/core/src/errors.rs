use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Construction errors raised while materializing a template definition.
///
/// These are fatal: a definition that fails with any of them is never offered
/// to storefront operators.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DefinitionError {
    /// A key every template must carry is absent or blank.
    #[error("template is missing required key '{key}'")]
    MissingRequiredKey {
        /// Missing key name.
        key: String,
    },

    /// Two fields share one name.
    #[error("duplicate field name '{name}'")]
    DuplicateFieldName {
        /// Duplicated field name.
        name: String,
    },

    /// The script references a placeholder that no field declares.
    #[error("script placeholder '{{{{{name}}}}}' does not reference a declared field")]
    InvalidPlaceholder {
        /// Placeholder name as written in the script.
        name: String,
    },

    /// A render-time placeholder lookup found no matching field.
    #[error("unknown field reference '{name}' in script")]
    UnknownFieldReference {
        /// Placeholder name as written in the script.
        name: String,
    },

    /// A declarative condition reads a field the template does not declare.
    #[error("field '{field}' has a condition on undeclared field '{name}'")]
    UnknownConditionField {
        /// Field carrying the condition.
        field: String,
        /// Undeclared field name the condition reads.
        name: String,
    },

    /// A validation pattern could not be compiled.
    #[error("field '{field}' has an invalid pattern: {reason}")]
    InvalidPattern {
        /// Field owning the pattern.
        field: String,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A field mapping key does not name a declared field.
    #[error("field mapping key '{name}' does not reference a declared field")]
    InvalidFieldMapping {
        /// Mapping key.
        name: String,
    },

    /// Two fields would be persisted under the same external name.
    #[error("external field name '{name}' is used by more than one field")]
    DuplicateExternalName {
        /// Colliding external name.
        name: String,
    },

    /// A select field declares one option value twice.
    #[error("field '{field}' declares option value '{value}' more than once")]
    DuplicateOptionValue {
        /// Field owning the options.
        field: String,
        /// Duplicated option value.
        value: String,
    },

    /// A field default does not match the field type.
    #[error("field '{field}' default does not match type '{expected}'")]
    InvalidDefault {
        /// Field owning the default.
        field: String,
        /// Expected field type.
        expected: String,
    },

    /// Layout settings are out of range.
    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    /// Any other structural problem with the definition.
    #[error("invalid template definition: {0}")]
    Malformed(String),
}

/// Per-field interaction errors reported while a form is being filled in.
///
/// These are recoverable and local to one field.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FieldError {
    /// A required field has no value.
    #[error("field '{field}' is required")]
    Required {
        /// Field name.
        field: String,
    },

    /// A value does not match the field pattern.
    #[error("{message}")]
    PatternMismatch {
        /// Field name.
        field: String,
        /// Author-supplied message.
        message: String,
    },

    /// A numeric value is outside the allowed range.
    #[error("{message}")]
    Range {
        /// Field name.
        field: String,
        /// Inclusive lower bound.
        min: Option<f64>,
        /// Inclusive upper bound.
        max: Option<f64>,
        /// Author-supplied or generated message.
        message: String,
    },

    /// A chip index does not exist.
    #[error("index {index} is out of range for field '{field}' with {len} items")]
    IndexOutOfRange {
        /// Field name.
        field: String,
        /// Requested index.
        index: usize,
        /// Current chip count.
        len: usize,
    },

    /// A value cannot be read as the field type.
    #[error("field '{field}' expects a {expected} value")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Expected field type.
        expected: String,
    },

    /// A select value is not among the declared options.
    #[error("'{value}' is not an allowed option for field '{field}'")]
    InvalidOption {
        /// Field name.
        field: String,
        /// Rejected value.
        value: String,
    },
}

impl FieldError {
    /// Returns the name of the field this error belongs to.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::Required { field }
            | Self::PatternMismatch { field, .. }
            | Self::Range { field, .. }
            | Self::IndexOutOfRange { field, .. }
            | Self::TypeMismatch { field, .. }
            | Self::InvalidOption { field, .. } => field.as_str(),
        }
    }
}
