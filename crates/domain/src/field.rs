use std::collections::HashSet;
use std::fmt::{Debug, Formatter};

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tagkit_core::{DefinitionError, NonEmptyString};

use crate::events::{ChipEvents, FieldEvents};
use crate::predicate::Flag;

/// Supported form field types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Single-line text.
    #[default]
    Text,
    /// Multi-line text, often opaque code.
    Textarea,
    /// Numeric input.
    Number,
    /// Checkbox toggle.
    Checkbox,
    /// Boolean toggle.
    Boolean,
    /// Single choice from options.
    Select,
    /// Multiple choices from options.
    Multiselect,
    /// Chip list of validated strings.
    Array,
    /// Display-only note without a value.
    Note,
}

impl FieldType {
    /// Returns a stable storage value for the field type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Multiselect => "multiselect",
            Self::Array => "array",
            Self::Note => "note",
        }
    }

    /// Returns whether values of this type are boolean toggles.
    #[must_use]
    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Checkbox | Self::Boolean)
    }

    /// Returns whether values of this type are string lists.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Self::Multiselect | Self::Array)
    }

    /// Returns whether the field offers a fixed option list.
    #[must_use]
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Multiselect)
    }

    /// Returns whether a stored value has the JSON shape of this type.
    #[must_use]
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Text | Self::Textarea | Self::Select | Self::Note => value.is_string(),
            Self::Number => value.is_number(),
            Self::Checkbox | Self::Boolean => value.is_boolean(),
            Self::Multiselect | Self::Array => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
        }
    }
}

/// Compiled validation pattern.
///
/// Accepts plain regular expressions and slash-delimited literals such as
/// `/^\d+$/i`; the literal flags `i`, `m` and `s` are honoured. The `\d`, `\w`
/// and `\s` classes and their negations match ASCII only, so `^\d+$` rejects
/// non-Latin digits.
#[derive(Clone)]
pub struct FieldPattern {
    source: String,
    regex: Regex,
}

impl FieldPattern {
    /// Compiles a pattern source.
    pub fn new(source: impl Into<String>) -> Result<Self, regex::Error> {
        let source = source.into();
        let (body, flags) = split_pattern_literal(source.as_str());
        let regex = RegexBuilder::new(&ascii_perl_classes(body))
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()?;

        Ok(Self { source, regex })
    }

    /// Returns the pattern as authored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.source.as_str()
    }

    /// Returns whether the text matches the pattern.
    #[must_use]
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn split_pattern_literal(source: &str) -> (&str, &str) {
    if let Some(rest) = source.strip_prefix('/')
        && let Some(end) = rest.rfind('/')
        && rest[end + 1..].chars().all(|flag| "gimsuy".contains(flag))
    {
        return (&rest[..end], &rest[end + 1..]);
    }

    (source, "")
}

fn ascii_perl_classes(body: &str) -> String {
    let mut rewritten = String::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    let mut in_class = false;
    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some(class @ ('d' | 'D' | 'w' | 'W' | 's' | 'S')) => {
                    let name = match class.to_ascii_lowercase() {
                        'd' => "digit",
                        'w' => "word",
                        _ => "space",
                    };
                    let negation = if class.is_ascii_uppercase() { "^" } else { "" };
                    if in_class {
                        rewritten.push_str(&format!("[:{negation}{name}:]"));
                    } else {
                        rewritten.push_str(&format!("[[:{negation}{name}:]]"));
                    }
                }
                Some(escaped) => {
                    rewritten.push('\\');
                    rewritten.push(escaped);
                }
                None => rewritten.push('\\'),
            },
            '[' if !in_class => {
                in_class = true;
                rewritten.push(ch);
                if chars.next_if_eq(&'^').is_some() {
                    rewritten.push('^');
                }
                if chars.next_if_eq(&']').is_some() {
                    rewritten.push(']');
                }
            }
            ']' if in_class => {
                in_class = false;
                rewritten.push(ch);
            }
            _ => rewritten.push(ch),
        }
    }

    rewritten
}

impl Debug for FieldPattern {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_tuple("FieldPattern")
            .field(&self.source)
            .finish()
    }
}

impl PartialEq for FieldPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Serialize for FieldPattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.source.as_str())
    }
}

/// Validation settings as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldValidationInput {
    /// Pattern source, plain or slash-delimited.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Inclusive numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Inclusive numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Message shown when validation fails.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Compiled validation settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pattern: Option<FieldPattern>,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl FieldValidation {
    /// Compiles authored validation settings for one field.
    pub fn compile(
        field_name: &str,
        input: FieldValidationInput,
    ) -> Result<Self, DefinitionError> {
        let pattern = input
            .pattern
            .map(FieldPattern::new)
            .transpose()
            .map_err(|error| DefinitionError::InvalidPattern {
                field: field_name.to_owned(),
                reason: error.to_string(),
            })?;

        if let (Some(min), Some(max)) = (input.min, input.max)
            && min > max
        {
            return Err(DefinitionError::Malformed(format!(
                "field '{field_name}' declares min {min} greater than max {max}"
            )));
        }

        Ok(Self {
            pattern,
            min: input.min,
            max: input.max,
            message: input.message,
        })
    }

    /// Returns the compiled pattern.
    #[must_use]
    pub fn pattern(&self) -> Option<&FieldPattern> {
        self.pattern.as_ref()
    }

    /// Returns the inclusive lower bound.
    #[must_use]
    pub fn min(&self) -> Option<f64> {
        self.min
    }

    /// Returns the inclusive upper bound.
    #[must_use]
    pub fn max(&self) -> Option<f64> {
        self.max
    }

    /// Returns the author-supplied message.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl From<FieldValidation> for FieldValidationInput {
    fn from(value: FieldValidation) -> Self {
        Self {
            pattern: value.pattern.map(|pattern| pattern.source),
            min: value.min,
            max: value.max,
            message: value.message,
        }
    }
}

/// One select option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOption {
    /// Display label.
    pub label: String,
    /// Stored value.
    pub value: String,
}

impl FieldOption {
    /// Creates an option.
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// Chip input settings for array fields, as authored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InputConfigInput {
    /// Type of the single-item input.
    #[serde(rename = "type", default)]
    pub input_type: FieldType,
    /// Input placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Add-button caption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_text: Option<String>,
    /// Input size hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_size: Option<String>,
    /// Button size hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub button_size: Option<String>,
    /// Per-chip validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidationInput>,
    /// Chip add/remove hooks.
    #[serde(skip)]
    pub events: ChipEvents,
}

/// Compiled chip input settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputConfig {
    #[serde(rename = "type")]
    input_type: FieldType,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    button_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    button_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<FieldValidation>,
    #[serde(skip)]
    events: ChipEvents,
}

impl InputConfig {
    fn compile(field_name: &str, input: InputConfigInput) -> Result<Self, DefinitionError> {
        Ok(Self {
            input_type: input.input_type,
            placeholder: input.placeholder,
            button_text: input.button_text,
            input_size: input.input_size,
            button_size: input.button_size,
            validation: input
                .validation
                .map(|validation| FieldValidation::compile(field_name, validation))
                .transpose()?,
            events: input.events,
        })
    }

    /// Returns the single-item input type.
    #[must_use]
    pub fn input_type(&self) -> FieldType {
        self.input_type
    }

    /// Returns the input placeholder text.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns the add-button caption.
    #[must_use]
    pub fn button_text(&self) -> Option<&str> {
        self.button_text.as_deref()
    }

    /// Returns per-chip validation.
    #[must_use]
    pub fn validation(&self) -> Option<&FieldValidation> {
        self.validation.as_ref()
    }

    /// Returns chip hooks.
    #[must_use]
    pub fn events(&self) -> &ChipEvents {
        &self.events
    }
}

impl From<InputConfig> for InputConfigInput {
    fn from(value: InputConfig) -> Self {
        Self {
            input_type: value.input_type,
            placeholder: value.placeholder,
            button_text: value.button_text,
            input_size: value.input_size,
            button_size: value.button_size,
            validation: value.validation.map(FieldValidationInput::from),
            events: value.events,
        }
    }
}

/// Field definition as authored, before patterns are compiled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinitionInput {
    /// Field name, unique within a template.
    pub name: String,
    /// Field type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label.
    #[serde(default)]
    pub label: String,
    /// Input placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Helper text shown under the input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Required flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Flag>,
    /// Seed value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Value validation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidationInput>,
    /// Select options.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<FieldOption>,
    /// Visibility condition; takes precedence over `visible`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Flag>,
    /// Visibility flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible: Option<Flag>,
    /// Disabled flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Flag>,
    /// Chip input settings for array fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_config: Option<InputConfigInput>,
    /// Scalar input hooks.
    #[serde(skip)]
    pub events: FieldEvents,
}

impl FieldDefinitionInput {
    /// Creates an input with only a name and a type.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            ..Self::default()
        }
    }
}

/// Validated form field definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldDefinition {
    name: NonEmptyString,
    #[serde(rename = "type")]
    field_type: FieldType,
    label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    required: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    validation: Option<FieldValidation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<FieldOption>,
    #[serde(skip_serializing_if = "Option::is_none")]
    condition: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    visible: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    disabled: Option<Flag>,
    #[serde(skip_serializing_if = "Option::is_none")]
    input_config: Option<InputConfig>,
    #[serde(skip)]
    events: FieldEvents,
}

impl FieldDefinition {
    /// Creates a validated field definition, compiling every pattern.
    pub fn new(input: FieldDefinitionInput) -> Result<Self, DefinitionError> {
        let FieldDefinitionInput {
            name,
            field_type,
            label,
            placeholder,
            description,
            required,
            default,
            validation,
            options,
            condition,
            visible,
            disabled,
            input_config,
            events,
        } = input;

        let name = NonEmptyString::new(name).map_err(|_| {
            DefinitionError::Malformed("field names must not be empty".to_owned())
        })?;
        let field_name = name.as_str();

        if !options.is_empty() && !field_type.has_options() {
            return Err(DefinitionError::Malformed(format!(
                "field '{field_name}' declares options but has type '{}'",
                field_type.as_str()
            )));
        }

        let mut seen_values = HashSet::new();
        for option in &options {
            if !seen_values.insert(option.value.as_str()) {
                return Err(DefinitionError::DuplicateOptionValue {
                    field: field_name.to_owned(),
                    value: option.value.clone(),
                });
            }
        }

        if input_config.is_some() && field_type != FieldType::Array {
            return Err(DefinitionError::Malformed(format!(
                "field '{field_name}' declares input_config but is not an array field"
            )));
        }

        if let Some(default_value) = &default {
            let matches_options = match (field_type, default_value) {
                (FieldType::Select, Value::String(text)) => seen_values.contains(text.as_str()),
                (FieldType::Multiselect, Value::Array(items)) => items.iter().all(|item| {
                    item.as_str()
                        .is_some_and(|text| seen_values.contains(text))
                }),
                _ => true,
            };

            if !field_type.accepts(default_value) || !matches_options {
                return Err(DefinitionError::InvalidDefault {
                    field: field_name.to_owned(),
                    expected: field_type.as_str().to_owned(),
                });
            }
        }

        let validation = validation
            .map(|validation| FieldValidation::compile(field_name, validation))
            .transpose()?;
        let input_config = input_config
            .map(|config| InputConfig::compile(field_name, config))
            .transpose()?;

        Ok(Self {
            name,
            field_type,
            label,
            placeholder,
            description,
            required,
            default,
            validation,
            options,
            condition,
            visible,
            disabled,
            input_config,
            events,
        })
    }

    /// Returns the field name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the field type.
    #[must_use]
    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    /// Returns the display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    /// Returns the input placeholder text.
    #[must_use]
    pub fn placeholder(&self) -> Option<&str> {
        self.placeholder.as_deref()
    }

    /// Returns helper text.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the required flag.
    #[must_use]
    pub fn required(&self) -> Option<&Flag> {
        self.required.as_ref()
    }

    /// Returns the seed value.
    #[must_use]
    pub fn default_value(&self) -> Option<&Value> {
        self.default.as_ref()
    }

    /// Returns value validation.
    #[must_use]
    pub fn validation(&self) -> Option<&FieldValidation> {
        self.validation.as_ref()
    }

    /// Returns select options.
    #[must_use]
    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }

    /// Returns the visibility condition.
    #[must_use]
    pub fn condition(&self) -> Option<&Flag> {
        self.condition.as_ref()
    }

    /// Returns the visibility flag.
    #[must_use]
    pub fn visible(&self) -> Option<&Flag> {
        self.visible.as_ref()
    }

    /// Returns the disabled flag.
    #[must_use]
    pub fn disabled(&self) -> Option<&Flag> {
        self.disabled.as_ref()
    }

    /// Returns chip input settings.
    #[must_use]
    pub fn input_config(&self) -> Option<&InputConfig> {
        self.input_config.as_ref()
    }

    /// Returns scalar hooks.
    #[must_use]
    pub fn events(&self) -> &FieldEvents {
        &self.events
    }
}

impl From<FieldDefinition> for FieldDefinitionInput {
    fn from(value: FieldDefinition) -> Self {
        Self {
            name: value.name.into(),
            field_type: value.field_type,
            label: value.label,
            placeholder: value.placeholder,
            description: value.description,
            required: value.required,
            default: value.default,
            validation: value.validation.map(FieldValidationInput::from),
            options: value.options,
            condition: value.condition,
            visible: value.visible,
            disabled: value.disabled,
            input_config: value.input_config.map(InputConfigInput::from),
            events: value.events,
        }
    }
}
