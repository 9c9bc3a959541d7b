use std::collections::BTreeMap;

use async_trait::async_trait;
use tagkit_application::TemplateCatalogRepository;
use tagkit_core::AppResult;
use tagkit_domain::TemplateDefinition;
use tokio::sync::RwLock;

/// In-memory template catalog keyed by template path.
#[derive(Debug, Default)]
pub struct InMemoryTemplateCatalog {
    templates: RwLock<BTreeMap<String, TemplateDefinition>>,
}

impl InMemoryTemplateCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(BTreeMap::new()),
        }
    }
}

#[async_trait]
impl TemplateCatalogRepository for InMemoryTemplateCatalog {
    async fn save_template(&self, template: TemplateDefinition) -> AppResult<()> {
        self.templates
            .write()
            .await
            .insert(template.path().as_str().to_owned(), template);
        Ok(())
    }

    async fn find_template(&self, path: &str) -> AppResult<Option<TemplateDefinition>> {
        Ok(self.templates.read().await.get(path).cloned())
    }

    async fn find_latest_by_template_id(
        &self,
        template_id: &str,
    ) -> AppResult<Option<TemplateDefinition>> {
        let templates = self.templates.read().await;

        Ok(templates
            .values()
            .filter(|template| template.template_id().as_str() == template_id)
            .max_by(|left, right| left.template_version().cmp(right.template_version()))
            .cloned())
    }

    async fn list_templates(&self) -> AppResult<Vec<TemplateDefinition>> {
        Ok(self.templates.read().await.values().cloned().collect())
    }
}
