use std::collections::HashMap;

use async_trait::async_trait;
use tagkit_application::{FormDataRepository, StoredFormData};
use tagkit_core::{AppResult, StorefrontId};
use tokio::sync::RwLock;

/// In-memory form data store keyed by storefront and template path.
#[derive(Debug, Default)]
pub struct InMemoryFormDataRepository {
    records: RwLock<HashMap<(StorefrontId, String), StoredFormData>>,
}

impl InMemoryFormDataRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl FormDataRepository for InMemoryFormDataRepository {
    async fn save_form_data(&self, record: StoredFormData) -> AppResult<()> {
        let key = (record.storefront_id, record.template_path.clone());
        self.records.write().await.insert(key, record);
        Ok(())
    }

    async fn find_form_data(
        &self,
        storefront_id: StorefrontId,
        template_path: &str,
    ) -> AppResult<Option<StoredFormData>> {
        Ok(self
            .records
            .read()
            .await
            .get(&(storefront_id, template_path.to_owned()))
            .cloned())
    }
}
