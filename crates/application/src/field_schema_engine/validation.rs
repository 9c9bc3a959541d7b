use tagkit_domain::{FieldValidation, is_blank_value};

use super::*;

impl FieldSchemaEngine {
    /// Validates one field value.
    ///
    /// Hidden fields always pass. A blank value only fails when the field is
    /// required; patterns and ranges apply to non-blank values. Other fields are
    /// never inspected beyond evaluating this field's own predicates.
    pub fn validate(
        field: &FieldDefinition,
        value: Option<&Value>,
        form_data: &FormData,
    ) -> ValidationResult {
        if !Self::is_visible(field, form_data) || field.field_type() == FieldType::Note {
            return Ok(());
        }

        let value = match value {
            Some(Value::Null) | None => field.default_value(),
            Some(value) => Some(value),
        };

        let Some(value) = value.filter(|value| !is_blank_value(Some(*value))) else {
            if Self::is_required(field, form_data) {
                return Err(FieldError::Required {
                    field: field.name().as_str().to_owned(),
                });
            }
            return Ok(());
        };

        match field.field_type() {
            FieldType::Text | FieldType::Textarea => {
                let text = Self::scalar_text(field, value)?;
                Self::check_pattern(field, field.validation(), text.as_str())
            }
            FieldType::Select => {
                let text = Self::scalar_text(field, value)?;
                Self::check_pattern(field, field.validation(), text.as_str())?;
                Self::check_option(field, text.as_str())
            }
            FieldType::Number => Self::validate_number(field, value),
            FieldType::Checkbox | FieldType::Boolean => Self::bool_value(value)
                .map(|_| ())
                .ok_or_else(|| Self::expects(field, field.field_type())),
            FieldType::Multiselect => {
                for item in Self::string_items(field, value)? {
                    Self::check_option(field, item)?;
                }
                Ok(())
            }
            FieldType::Array => {
                for item in Self::string_items(field, value)? {
                    Self::validate_chip(field, item)?;
                }
                Ok(())
            }
            FieldType::Note => Ok(()),
        }
    }

    /// Returns every field error for the current form data, in display order.
    #[must_use]
    pub fn errors(template: &TemplateDefinition, form_data: &FormData) -> Vec<FieldError> {
        template
            .fields()
            .iter()
            .filter_map(|field| {
                Self::validate(field, form_data.get(field.name().as_str()), form_data).err()
            })
            .collect()
    }

    /// Returns whether every visible field validates.
    #[must_use]
    pub fn is_form_valid(template: &TemplateDefinition, form_data: &FormData) -> bool {
        template.fields().iter().all(|field| {
            Self::validate(field, form_data.get(field.name().as_str()), form_data).is_ok()
        })
    }

    /// Validates one chip against the array field's input settings.
    pub(super) fn validate_chip(field: &FieldDefinition, chip: &str) -> ValidationResult {
        let validation = field
            .input_config()
            .and_then(|config| config.validation());
        Self::check_pattern(field, validation, chip)
    }

    fn check_pattern(
        field: &FieldDefinition,
        validation: Option<&FieldValidation>,
        text: &str,
    ) -> ValidationResult {
        let Some(validation) = validation else {
            return Ok(());
        };
        let Some(pattern) = validation.pattern() else {
            return Ok(());
        };

        if pattern.is_match(text) {
            return Ok(());
        }

        Err(FieldError::PatternMismatch {
            field: field.name().as_str().to_owned(),
            message: validation
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| format!("{} has an invalid format", Self::display_name(field))),
        })
    }

    fn check_option(field: &FieldDefinition, value: &str) -> ValidationResult {
        if field.options().is_empty()
            || field.options().iter().any(|option| option.value == value)
        {
            return Ok(());
        }

        Err(FieldError::InvalidOption {
            field: field.name().as_str().to_owned(),
            value: value.to_owned(),
        })
    }

    fn validate_number(field: &FieldDefinition, value: &Value) -> ValidationResult {
        let number =
            Self::number_value(value).ok_or_else(|| Self::expects(field, FieldType::Number))?;
        let Some(validation) = field.validation() else {
            return Ok(());
        };

        if validation.pattern().is_some() {
            let text = Self::scalar_text(field, value)?;
            Self::check_pattern(field, Some(validation), text.as_str())?;
        }

        let below = validation.min().is_some_and(|min| number < min);
        let above = validation.max().is_some_and(|max| number > max);
        if !below && !above {
            return Ok(());
        }

        let message = validation.message().map(str::to_owned).unwrap_or_else(|| {
            match (validation.min(), validation.max()) {
                (Some(min), Some(max)) => format!("value must be between {min} and {max}"),
                (Some(min), None) => format!("value must be at least {min}"),
                (None, Some(max)) => format!("value must be at most {max}"),
                (None, None) => "value is out of range".to_owned(),
            }
        });

        Err(FieldError::Range {
            field: field.name().as_str().to_owned(),
            min: validation.min(),
            max: validation.max(),
            message,
        })
    }

    fn scalar_text(field: &FieldDefinition, value: &Value) -> Result<String, FieldError> {
        match value {
            Value::String(text) => Ok(text.clone()),
            Value::Number(number) => Ok(number.to_string()),
            Value::Bool(flag) => Ok(flag.to_string()),
            _ => Err(Self::expects(field, field.field_type())),
        }
    }

    fn string_items<'a>(
        field: &FieldDefinition,
        value: &'a Value,
    ) -> Result<Vec<&'a str>, FieldError> {
        let Some(items) = value.as_array() else {
            return Err(Self::expects(field, field.field_type()));
        };

        items
            .iter()
            .map(|item| {
                item.as_str()
                    .ok_or_else(|| Self::expects(field, field.field_type()))
            })
            .collect()
    }

    fn display_name(field: &FieldDefinition) -> &str {
        if field.label().trim().is_empty() {
            field.name().as_str()
        } else {
            field.label()
        }
    }
}
