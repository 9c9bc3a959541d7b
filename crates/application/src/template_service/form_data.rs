use super::*;

impl TemplateService {
    /// Loads saved form data for a storefront, translated back to field names.
    ///
    /// Field defaults fill in every value that was never saved.
    pub async fn load_form_data(
        &self,
        storefront_id: StorefrontId,
        path: &str,
    ) -> AppResult<FormData> {
        let template = self.find_template(path).await?;
        let initial = template.initial_form_data();

        let Some(record) = self
            .form_data_repository
            .find_form_data(storefront_id, path)
            .await?
        else {
            return Ok(initial);
        };

        let translator = FieldMappingTranslator::for_template(&template);
        let stored = translator.from_external(&record.values);

        Ok(stored
            .iter()
            .fold(initial, |form_data, (name, value)| {
                form_data.with_value(name.clone(), value.clone())
            }))
    }

    /// Validates and saves form data for a storefront.
    ///
    /// Invalid forms are rejected without touching the stored record.
    pub async fn save_form_data(
        &self,
        storefront_id: StorefrontId,
        path: &str,
        form_data: &FormData,
    ) -> AppResult<StoredFormData> {
        let template = self.find_template(path).await?;
        let errors = FieldSchemaEngine::errors(&template, form_data);
        if !errors.is_empty() {
            return Err(AppError::Validation(format!(
                "form data for template '{path}' is invalid: {}",
                Self::describe_errors(&errors)
            )));
        }

        let translator = FieldMappingTranslator::for_template(&template);
        let record = StoredFormData {
            storefront_id,
            template_path: template.path().as_str().to_owned(),
            template_version: template.template_version().clone(),
            values: translator.to_external(form_data),
            saved_at: Utc::now(),
        };

        self.form_data_repository
            .save_form_data(record.clone())
            .await?;
        info!(
            storefront_id = %storefront_id,
            path,
            value_count = record.values.len(),
            "saved template form data"
        );

        Ok(record)
    }
}
