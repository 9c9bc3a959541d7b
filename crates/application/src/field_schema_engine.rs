use serde::Serialize;
use serde_json::Value;
use tagkit_core::FieldError;
use tagkit_domain::{
    FieldDefinition, FieldEvent, FieldType, FormContext, FormData, TemplateDefinition,
};
use tracing::debug;

mod chips;
mod coercion;
mod state;
mod validation;

#[cfg(test)]
mod tests;

/// Outcome of validating one field value.
pub type ValidationResult = Result<(), FieldError>;

/// Evaluates field schemas against form state.
///
/// Every operation is a pure function of the template and the form data it is
/// handed; nothing is cached between calls. Mutating operations return a new
/// [`FormData`] and leave the input untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldSchemaEngine;

/// Effective state of one field for the current form data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldState {
    /// Field name.
    pub name: String,
    /// Whether the field is shown.
    pub visible: bool,
    /// Whether a value is required.
    pub required: bool,
    /// Whether the input is disabled.
    pub disabled: bool,
    /// Validation error, if any.
    pub error: Option<FieldError>,
}

/// Whole-form evaluation snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormEvaluation {
    /// Per-field state in display order.
    pub fields: Vec<FieldState>,
    /// Every visible field validates.
    pub is_valid: bool,
    /// Save button state after applying any custom rule.
    pub save_button_disabled: bool,
}

impl FormEvaluation {
    /// Returns every field error in display order.
    #[must_use]
    pub fn errors(&self) -> Vec<&FieldError> {
        self.fields
            .iter()
            .filter_map(|field| field.error.as_ref())
            .collect()
    }
}

impl FieldSchemaEngine {
    /// Returns the stored value, or the field default when nothing usable is stored.
    #[must_use]
    pub fn resolve<'a>(field: &'a FieldDefinition, form_data: &'a FormData) -> Option<&'a Value> {
        match form_data.get(field.name().as_str()) {
            Some(Value::Null) | None => field.default_value(),
            Some(value) => Some(value),
        }
    }

    /// Evaluates every field of a template.
    #[must_use]
    pub fn evaluate(
        template: &TemplateDefinition,
        form_data: &FormData,
        context: &FormContext,
    ) -> FormEvaluation {
        let fields: Vec<FieldState> = template
            .fields()
            .iter()
            .map(|field| FieldState {
                name: field.name().as_str().to_owned(),
                visible: Self::is_visible(field, form_data),
                required: Self::is_required(field, form_data),
                disabled: Self::is_disabled(field, form_data),
                error: Self::validate(field, form_data.get(field.name().as_str()), form_data)
                    .err(),
            })
            .collect();

        let errors: Vec<FieldError> = fields
            .iter()
            .filter_map(|field| field.error.clone())
            .collect();
        let is_valid = errors.is_empty();
        let save_button_disabled = match template.save_button_disabled() {
            Some(predicate) => predicate.evaluate(form_data, &errors, context),
            None => !is_valid,
        };

        FormEvaluation {
            fields,
            is_valid,
            save_button_disabled,
        }
    }

    /// Delivers an event to the field's hook, if one is registered.
    ///
    /// Hooks observe; they never change form data.
    pub fn emit(field: &FieldDefinition, event: &FieldEvent) {
        let Some(hook) = field.events().hook_for(event) else {
            return;
        };

        debug!(
            field = field.name().as_str(),
            event = event.as_str(),
            "dispatching field hook"
        );
        hook.notify(event);
    }

    fn expects(field: &FieldDefinition, field_type: FieldType) -> FieldError {
        FieldError::TypeMismatch {
            field: field.name().as_str().to_owned(),
            expected: field_type.as_str().to_owned(),
        }
    }
}
