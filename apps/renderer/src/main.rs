//! Renders one storefront tag from the template catalog.

#![forbid(unsafe_code)]

mod renderer_config;

use std::path::Path;
use std::sync::Arc;

use tagkit_application::{PlaceholderRenderer, TemplateService};
use tagkit_core::{AppError, AppResult};
use tagkit_domain::{FormData, TemplateDefaults, TemplateDefinition};
use tagkit_infrastructure::{
    InMemoryFormDataRepository, InMemoryTemplateCatalog, builtin_templates,
    load_template_directory,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::renderer_config::RendererConfig;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = RendererConfig::load()?;
    let service = TemplateService::new(
        Arc::new(InMemoryTemplateCatalog::new()),
        Arc::new(InMemoryFormDataRepository::new()),
    )
    .with_renderer(PlaceholderRenderer::new(config.max_script_bytes));

    let templates = load_catalog(&config).await?;
    let template_count = templates.len();
    for template in templates {
        service.register_definition(template).await?;
    }
    info!(
        template_count,
        template_path = %config.template_path,
        storefront_id = %config.storefront_id,
        "tagkit-renderer catalog ready"
    );

    let form_data = match &config.form_data_file {
        Some(file) => read_form_data(file).await?,
        None => {
            service
                .load_form_data(config.storefront_id, config.template_path.as_str())
                .await?
        }
    };

    service
        .save_form_data(
            config.storefront_id,
            config.template_path.as_str(),
            &form_data,
        )
        .await?;
    let tag = service
        .render_stored_tag(config.storefront_id, config.template_path.as_str())
        .await?;

    let output = serde_json::to_string_pretty(&tag)
        .map_err(|error| AppError::Internal(format!("failed to encode rendered tag: {error}")))?;
    println!("{output}");

    Ok(())
}

async fn load_catalog(config: &RendererConfig) -> AppResult<Vec<TemplateDefinition>> {
    let defaults = TemplateDefaults::storefront();
    match &config.catalog_dir {
        Some(directory) => load_template_directory(directory, defaults).await,
        None => builtin_templates(defaults),
    }
}

async fn read_form_data(file: &Path) -> AppResult<FormData> {
    let json = tokio::fs::read_to_string(file).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to read form data file '{}': {error}",
            file.display()
        ))
    })?;

    serde_json::from_str(&json).map_err(|error| {
        AppError::Validation(format!(
            "form data file '{}' must hold a JSON object: {error}",
            file.display()
        ))
    })
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
