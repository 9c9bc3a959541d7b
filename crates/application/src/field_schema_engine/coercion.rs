use serde_json::Number;

use super::*;

impl FieldSchemaEngine {
    /// Converts user-entered input into the field's stored value shape.
    ///
    /// Numbers are parsed from text, `"true"`/`"false"` become booleans and
    /// comma-separated text becomes a string list. Blank input becomes `null`
    /// for scalars and an empty list for list fields.
    pub fn coerce(field: &FieldDefinition, raw: &Value) -> Result<Value, FieldError> {
        let field_type = field.field_type();
        match field_type {
            FieldType::Text | FieldType::Textarea | FieldType::Select | FieldType::Note => {
                match raw {
                    Value::Null | Value::String(_) => Ok(raw.clone()),
                    Value::Number(number) => Ok(Value::String(number.to_string())),
                    Value::Bool(flag) => Ok(Value::String(flag.to_string())),
                    _ => Err(Self::expects(field, field_type)),
                }
            }
            FieldType::Number => match raw {
                Value::Null | Value::Number(_) => Ok(raw.clone()),
                Value::String(text) if text.trim().is_empty() => Ok(Value::Null),
                Value::String(text) => Self::parse_number(text)
                    .map(Value::Number)
                    .ok_or_else(|| Self::expects(field, field_type)),
                _ => Err(Self::expects(field, field_type)),
            },
            FieldType::Checkbox | FieldType::Boolean => match raw {
                Value::Null => Ok(Value::Null),
                _ => Self::bool_value(raw)
                    .map(Value::Bool)
                    .ok_or_else(|| Self::expects(field, field_type)),
            },
            FieldType::Multiselect | FieldType::Array => match raw {
                Value::Null => Ok(Value::Array(Vec::new())),
                Value::String(text) => Ok(Value::Array(
                    text.split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(|item| Value::String(item.to_owned()))
                        .collect(),
                )),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(_) => Ok(item.clone()),
                        Value::Number(number) => Ok(Value::String(number.to_string())),
                        _ => Err(Self::expects(field, field_type)),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                _ => Err(Self::expects(field, field_type)),
            },
        }
    }

    /// Coerces and stores one field value, notifying `input` then `change` hooks.
    pub fn set_field_value(
        field: &FieldDefinition,
        raw: &Value,
        form_data: &FormData,
    ) -> Result<FormData, FieldError> {
        let value = Self::coerce(field, raw)?;
        let field_name = field.name().as_str().to_owned();

        Self::emit(
            field,
            &FieldEvent::Input {
                field: field_name.clone(),
                value: value.clone(),
            },
        );
        Self::emit(
            field,
            &FieldEvent::Change {
                field: field_name.clone(),
                value: value.clone(),
            },
        );

        Ok(form_data.with_value(field_name, value))
    }

    /// Drops the stored value so the field falls back to its default.
    #[must_use]
    pub fn reset_field(field: &FieldDefinition, form_data: &FormData) -> FormData {
        form_data.without_value(field.name().as_str())
    }

    pub(crate) fn number_value(value: &Value) -> Option<f64> {
        match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            _ => None,
        }
    }

    pub(crate) fn bool_value(value: &Value) -> Option<bool> {
        match value {
            Value::Bool(flag) => Some(*flag),
            Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    fn parse_number(text: &str) -> Option<Number> {
        let trimmed = text.trim();
        if let Ok(integer) = trimmed.parse::<i64>() {
            return Some(Number::from(integer));
        }

        trimmed
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
    }
}
