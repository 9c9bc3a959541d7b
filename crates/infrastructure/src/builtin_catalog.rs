use tagkit_core::AppResult;
use tagkit_domain::{TemplateDefaults, TemplateDefinition};

use crate::json_template_loader::parse_template_json;

const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "google-analytics.json",
        include_str!("../catalog/google-analytics.json"),
    ),
    ("hotjar.json", include_str!("../catalog/hotjar.json")),
    ("segment.json", include_str!("../catalog/segment.json")),
];

/// Materializes the catalog entries bundled with this crate.
pub fn builtin_templates(defaults: &TemplateDefaults) -> AppResult<Vec<TemplateDefinition>> {
    BUILTIN_TEMPLATES
        .iter()
        .map(|(source, json)| parse_template_json(source, json, defaults))
        .collect()
}
