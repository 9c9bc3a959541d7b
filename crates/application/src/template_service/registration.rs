use super::*;

impl TemplateService {
    /// Materializes a partial definition over the storefront defaults and registers it.
    pub async fn register_template(
        &self,
        input: TemplateDefinitionInput,
    ) -> AppResult<TemplateDefinition> {
        let path_hint = input.path.clone().unwrap_or_default();
        let template = TemplateDefinition::materialize(input, TemplateDefaults::storefront())
            .map_err(|error| {
                warn!(path = path_hint.as_str(), %error, "rejected template definition");
                AppError::from(error)
            })?;

        self.register_definition(template).await
    }

    /// Registers an already materialized template.
    ///
    /// Paths are unique across template ids. Versions of one template id only
    /// move forward; re-registering the current version is accepted only when
    /// its fields and script are unchanged. Closure predicates and hooks are
    /// not compared, so a same-version re-registration that only swaps
    /// closures keeps the stored definition.
    pub async fn register_definition(
        &self,
        template: TemplateDefinition,
    ) -> AppResult<TemplateDefinition> {
        if let Some(existing) = self.catalog.find_template(template.path().as_str()).await?
            && existing.template_id() != template.template_id()
        {
            return Err(AppError::Conflict(format!(
                "path '{}' is already used by template '{}'",
                template.path().as_str(),
                existing.template_id().as_str()
            )));
        }

        if let Some(latest) = self
            .catalog
            .find_latest_by_template_id(template.template_id().as_str())
            .await?
        {
            if template.template_version() < latest.template_version() {
                return Err(AppError::Conflict(format!(
                    "template '{}' version {} is older than registered version {}",
                    template.template_id().as_str(),
                    template.template_version(),
                    latest.template_version()
                )));
            }

            if template.template_version() == latest.template_version() {
                if Self::fingerprint(&template)? != Self::fingerprint(&latest)? {
                    return Err(AppError::Conflict(format!(
                        "template '{}' version {} is already registered with different content",
                        template.template_id().as_str(),
                        template.template_version()
                    )));
                }

                if latest.path() == template.path() {
                    return Ok(latest);
                }
            }
        }

        self.catalog.save_template(template.clone()).await?;
        info!(
            path = template.path().as_str(),
            template_id = template.template_id().as_str(),
            version = %template.template_version(),
            field_count = template.fields().len(),
            "registered template"
        );

        Ok(template)
    }
}
