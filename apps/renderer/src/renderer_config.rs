use std::env;
use std::path::PathBuf;

use tagkit_application::DEFAULT_MAX_SCRIPT_BYTES;
use tagkit_core::{AppError, AppResult, StorefrontId};
use uuid::Uuid;

/// Runtime settings for one render invocation.
#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub template_path: String,
    pub catalog_dir: Option<PathBuf>,
    pub form_data_file: Option<PathBuf>,
    pub storefront_id: StorefrontId,
    pub max_script_bytes: usize,
}

impl RendererConfig {
    pub fn load() -> AppResult<Self> {
        let template_path = required_env("TAGKIT_TEMPLATE_PATH")?.trim().to_owned();
        if template_path.is_empty() {
            return Err(AppError::Validation(
                "TAGKIT_TEMPLATE_PATH must not be empty".to_owned(),
            ));
        }

        let storefront_id = match optional_env("TAGKIT_STOREFRONT_ID") {
            Some(value) => Uuid::parse_str(value.as_str())
                .map(StorefrontId::from_uuid)
                .map_err(|error| {
                    AppError::Validation(format!(
                        "invalid TAGKIT_STOREFRONT_ID value '{value}': {error}"
                    ))
                })?,
            None => StorefrontId::new(),
        };

        let max_script_bytes = parse_env_usize("TAGKIT_MAX_SCRIPT_BYTES", DEFAULT_MAX_SCRIPT_BYTES)?;
        if max_script_bytes == 0 {
            return Err(AppError::Validation(
                "TAGKIT_MAX_SCRIPT_BYTES must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            template_path,
            catalog_dir: optional_env("TAGKIT_CATALOG_DIR").map(PathBuf::from),
            form_data_file: optional_env("TAGKIT_FORM_DATA_FILE").map(PathBuf::from),
            storefront_id,
            max_script_bytes,
        })
    }
}

fn required_env(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_usize(name: &str, default: usize) -> AppResult<usize> {
    match env::var(name) {
        Ok(value) => value.trim().parse::<usize>().map_err(|error| {
            AppError::Validation(format!("invalid {name} value '{value}': {error}"))
        }),
        Err(_) => Ok(default),
    }
}
