use super::*;

impl FieldSchemaEngine {
    /// Resolves visibility: `condition`, then `visible`, then shown.
    #[must_use]
    pub fn is_visible(field: &FieldDefinition, form_data: &FormData) -> bool {
        field
            .condition()
            .or_else(|| field.visible())
            .is_none_or(|flag| flag.evaluate(form_data))
    }

    /// Resolves the required flag; absent means optional.
    #[must_use]
    pub fn is_required(field: &FieldDefinition, form_data: &FormData) -> bool {
        field
            .required()
            .is_some_and(|flag| flag.evaluate(form_data))
    }

    /// Resolves the disabled flag; absent means enabled.
    #[must_use]
    pub fn is_disabled(field: &FieldDefinition, form_data: &FormData) -> bool {
        field
            .disabled()
            .is_some_and(|flag| flag.evaluate(form_data))
    }
}
