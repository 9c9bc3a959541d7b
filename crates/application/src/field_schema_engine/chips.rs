use super::*;

impl FieldSchemaEngine {
    /// Appends one chip to an array field.
    ///
    /// The chip is validated and stored exactly as given; only a whitespace-only
    /// chip is rejected as `Required`. A chip failing `input_config.validation`
    /// leaves the list unchanged. The `click` hook is notified before the
    /// new list is committed and cannot veto it.
    pub fn add_array_item(
        field: &FieldDefinition,
        value: &str,
        form_data: &FormData,
    ) -> Result<FormData, FieldError> {
        let mut items = Self::current_chips(field, form_data)?;
        if value.trim().is_empty() {
            return Err(FieldError::Required {
                field: field.name().as_str().to_owned(),
            });
        }

        Self::validate_chip(field, value)?;

        if let Some(hook) = field
            .input_config()
            .and_then(|config| config.events().click.as_ref())
        {
            debug!(field = field.name().as_str(), "notifying chip click hook");
            hook.notify(&FieldEvent::Click {
                field: field.name().as_str().to_owned(),
                value: Value::String(value.to_owned()),
            });
        }

        items.push(Value::String(value.to_owned()));
        debug!(
            field = field.name().as_str(),
            chip_count = items.len(),
            "chip added"
        );

        Ok(form_data.with_value(field.name().as_str(), Value::Array(items)))
    }

    /// Removes the chip at `index` from an array field.
    ///
    /// The `remove` hook is notified before the chip is dropped.
    pub fn remove_array_item(
        field: &FieldDefinition,
        index: usize,
        form_data: &FormData,
    ) -> Result<FormData, FieldError> {
        let mut items = Self::current_chips(field, form_data)?;

        if index >= items.len() {
            return Err(FieldError::IndexOutOfRange {
                field: field.name().as_str().to_owned(),
                index,
                len: items.len(),
            });
        }

        if let Some(hook) = field
            .input_config()
            .and_then(|config| config.events().remove.as_ref())
        {
            debug!(
                field = field.name().as_str(),
                index, "notifying chip remove hook"
            );
            hook.notify(&FieldEvent::Remove {
                field: field.name().as_str().to_owned(),
                index,
                value: items[index].clone(),
            });
        }

        items.remove(index);
        debug!(
            field = field.name().as_str(),
            chip_count = items.len(),
            "chip removed"
        );

        Ok(form_data.with_value(field.name().as_str(), Value::Array(items)))
    }

    fn current_chips(field: &FieldDefinition, form_data: &FormData) -> Result<Vec<Value>, FieldError> {
        if field.field_type() != FieldType::Array {
            return Err(Self::expects(field, FieldType::Array));
        }

        match Self::resolve(field, form_data) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(items.clone()),
            Some(_) => Err(Self::expects(field, FieldType::Array)),
        }
    }
}
