use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tagkit_core::{AppResult, StorefrontId};
use tagkit_domain::{TemplateDefinition, TemplateVersion};

/// Form values saved for one storefront and template, keyed by external names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFormData {
    /// Owning storefront.
    pub storefront_id: StorefrontId,
    /// Template path the values belong to.
    pub template_path: String,
    /// Template version the values were validated against.
    pub template_version: TemplateVersion,
    /// Values keyed by external field name.
    pub values: Map<String, Value>,
    /// Save timestamp.
    pub saved_at: DateTime<Utc>,
}

/// Repository port for the template catalog.
#[async_trait]
pub trait TemplateCatalogRepository: Send + Sync {
    /// Saves a template, replacing any template stored under the same path.
    async fn save_template(&self, template: TemplateDefinition) -> AppResult<()>;

    /// Looks up a template by path.
    async fn find_template(&self, path: &str) -> AppResult<Option<TemplateDefinition>>;

    /// Returns the highest registered version for a template id.
    async fn find_latest_by_template_id(
        &self,
        template_id: &str,
    ) -> AppResult<Option<TemplateDefinition>>;

    /// Lists templates ordered by path.
    async fn list_templates(&self) -> AppResult<Vec<TemplateDefinition>>;
}

/// Repository port for saved form data.
#[async_trait]
pub trait FormDataRepository: Send + Sync {
    /// Saves form data, replacing the previous record for the same storefront and template.
    async fn save_form_data(&self, record: StoredFormData) -> AppResult<()>;

    /// Looks up saved form data.
    async fn find_form_data(
        &self,
        storefront_id: StorefrontId,
        template_path: &str,
    ) -> AppResult<Option<StoredFormData>>;
}
