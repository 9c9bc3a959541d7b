use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tagkit_core::{AppError, AppResult, FieldError, StorefrontId};
use tagkit_domain::{
    FormContext, FormData, TemplateDefaults, TemplateDefinition, TemplateDefinitionInput,
};
use tracing::{info, warn};

use crate::field_mapping::FieldMappingTranslator;
use crate::placeholder_renderer::{PlaceholderRenderer, RenderedTag};
use crate::template_ports::{FormDataRepository, StoredFormData, TemplateCatalogRepository};
use crate::{FieldSchemaEngine, FormEvaluation};

mod form_data;
mod registration;
mod rendering;


/// Application service for the template catalog, saved form data and rendering.
#[derive(Clone)]
pub struct TemplateService {
    catalog: Arc<dyn TemplateCatalogRepository>,
    form_data_repository: Arc<dyn FormDataRepository>,
    renderer: PlaceholderRenderer,
}

impl TemplateService {
    /// Creates a new template service from repository implementations.
    #[must_use]
    pub fn new(
        catalog: Arc<dyn TemplateCatalogRepository>,
        form_data_repository: Arc<dyn FormDataRepository>,
    ) -> Self {
        Self {
            catalog,
            form_data_repository,
            renderer: PlaceholderRenderer::default(),
        }
    }

    /// Replaces the renderer, e.g. to change the script size limit.
    #[must_use]
    pub fn with_renderer(mut self, renderer: PlaceholderRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    /// Looks up a template by path.
    pub async fn find_template(&self, path: &str) -> AppResult<TemplateDefinition> {
        self.catalog
            .find_template(path)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("template '{path}' does not exist")))
    }

    /// Lists registered templates ordered by path.
    pub async fn list_templates(&self) -> AppResult<Vec<TemplateDefinition>> {
        self.catalog.list_templates().await
    }

    /// Evaluates the template's form against the given values.
    pub async fn evaluate_form(
        &self,
        path: &str,
        form_data: &FormData,
        context: &FormContext,
    ) -> AppResult<FormEvaluation> {
        let template = self.find_template(path).await?;
        Ok(FieldSchemaEngine::evaluate(&template, form_data, context))
    }

    /// SHA-256 over the serialized fields and script.
    ///
    /// Closure predicates and event hooks serialize as markers or not at all,
    /// so two definitions that differ only in closures share a fingerprint.
    fn fingerprint(template: &TemplateDefinition) -> AppResult<String> {
        let encoded = serde_json::to_vec(&(template.fields(), template.script())).map_err(
            |error| AppError::Internal(format!("failed to encode template content: {error}")),
        )?;
        let digest = Sha256::digest(encoded);
        Ok(digest.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    fn describe_errors(errors: &[FieldError]) -> String {
        errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}
