use super::*;

impl TemplateService {
    /// Renders a template for the given values.
    ///
    /// The form must be valid; a script is never produced from invalid input.
    pub async fn render_tag(&self, path: &str, form_data: &FormData) -> AppResult<RenderedTag> {
        let template = self.find_template(path).await?;
        let errors = FieldSchemaEngine::errors(&template, form_data);
        if !errors.is_empty() {
            return Err(AppError::Validation(format!(
                "cannot render template '{path}': {}",
                Self::describe_errors(&errors)
            )));
        }

        self.renderer.render_tag(&template, form_data)
    }

    /// Renders a template from the storefront's saved form data.
    pub async fn render_stored_tag(
        &self,
        storefront_id: StorefrontId,
        path: &str,
    ) -> AppResult<RenderedTag> {
        let form_data = self.load_form_data(storefront_id, path).await?;
        self.render_tag(path, &form_data).await
    }
}
