//! Application services and ports.

#![forbid(unsafe_code)]

mod field_mapping;
mod field_schema_engine;
mod placeholder_renderer;
mod template_ports;
mod template_service;

pub use field_mapping::FieldMappingTranslator;
pub use field_schema_engine::{FieldSchemaEngine, FieldState, FormEvaluation, ValidationResult};
pub use placeholder_renderer::{DEFAULT_MAX_SCRIPT_BYTES, PlaceholderRenderer, RenderedTag};
pub use template_ports::{FormDataRepository, StoredFormData, TemplateCatalogRepository};
pub use template_service::TemplateService;
