//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod builtin_catalog;
mod in_memory_form_data_repository;
mod in_memory_template_catalog;
mod json_template_loader;

pub use builtin_catalog::builtin_templates;
pub use in_memory_form_data_repository::InMemoryFormDataRepository;
pub use in_memory_template_catalog::InMemoryTemplateCatalog;
pub use json_template_loader::{load_template_directory, parse_template_json};
