use std::path::{Path, PathBuf};

use tagkit_core::{AppError, AppResult};
use tagkit_domain::{TemplateDefaults, TemplateDefinition, TemplateDefinitionInput};
use tracing::{debug, warn};

/// Parses and materializes one JSON template definition.
///
/// `source` names the definition in error messages.
pub fn parse_template_json(
    source: &str,
    json: &str,
    defaults: &TemplateDefaults,
) -> AppResult<TemplateDefinition> {
    let input: TemplateDefinitionInput = serde_json::from_str(json).map_err(|error| {
        AppError::Validation(format!("template '{source}' is not valid JSON: {error}"))
    })?;

    TemplateDefinition::materialize(input, defaults).map_err(|error| {
        warn!(source, %error, "rejected template definition");
        AppError::from(error)
    })
}

/// Loads every `*.json` template definition in a directory, ordered by file name.
///
/// Any unreadable or invalid file fails the whole load.
pub async fn load_template_directory(
    directory: &Path,
    defaults: &TemplateDefaults,
) -> AppResult<Vec<TemplateDefinition>> {
    let mut entries = tokio::fs::read_dir(directory).await.map_err(|error| {
        AppError::Internal(format!(
            "failed to read template directory '{}': {error}",
            directory.display()
        ))
    })?;

    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|error| {
        AppError::Internal(format!(
            "failed to list template directory '{}': {error}",
            directory.display()
        ))
    })? {
        let path = entry.path();
        if path.extension().is_some_and(|extension| extension == "json") {
            files.push(path);
        }
    }
    files.sort();

    let mut templates = Vec::with_capacity(files.len());
    for file in files {
        let json = tokio::fs::read_to_string(&file).await.map_err(|error| {
            AppError::Internal(format!(
                "failed to read template file '{}': {error}",
                file.display()
            ))
        })?;
        let template = parse_template_json(&file.display().to_string(), &json, defaults)?;
        debug!(
            file = %file.display(),
            path = template.path().as_str(),
            "loaded template definition"
        );
        templates.push(template);
    }

    Ok(templates)
}
