use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tagkit_domain::{FormData, TemplateDefinition};
use tracing::warn;

/// Translates form data keys between field names and their external names.
///
/// Fields without a mapping keep their own name on both sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMappingTranslator {
    template_path: String,
    to_external: BTreeMap<String, String>,
    to_internal: BTreeMap<String, String>,
}

impl FieldMappingTranslator {
    /// Builds a translator for one template.
    #[must_use]
    pub fn for_template(template: &TemplateDefinition) -> Self {
        let to_external: BTreeMap<String, String> = template
            .fields()
            .iter()
            .map(|field| {
                let name = field.name().as_str().to_owned();
                let external = template
                    .field_mappings()
                    .get(&name)
                    .cloned()
                    .unwrap_or_else(|| name.clone());
                (name, external)
            })
            .collect();
        let to_internal = to_external
            .iter()
            .map(|(internal, external)| (external.clone(), internal.clone()))
            .collect();

        Self {
            template_path: template.path().as_str().to_owned(),
            to_external,
            to_internal,
        }
    }

    /// Renames field keys to their external names for persistence.
    ///
    /// Keys that are not declared fields are not persisted.
    #[must_use]
    pub fn to_external(&self, form_data: &FormData) -> Map<String, Value> {
        form_data
            .iter()
            .filter_map(|(name, value)| match self.to_external.get(name) {
                Some(external) => Some((external.clone(), value.clone())),
                None => {
                    warn!(
                        template = self.template_path.as_str(),
                        key = name.as_str(),
                        "dropping undeclared form data key before persistence"
                    );
                    None
                }
            })
            .collect()
    }

    /// Renames persisted keys back to field names.
    #[must_use]
    pub fn from_external(&self, values: &Map<String, Value>) -> FormData {
        values
            .iter()
            .filter_map(|(external, value)| match self.to_internal.get(external) {
                Some(internal) => Some((internal.clone(), value.clone())),
                None => {
                    warn!(
                        template = self.template_path.as_str(),
                        key = external.as_str(),
                        "dropping unknown persisted form data key"
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::{Map, json};
    use tagkit_domain::{
        FieldDefinitionInput, FieldType, FormData, TemplateDefaults, TemplateDefinition,
        TemplateDefinitionInput, TemplateVersion,
    };

    use super::FieldMappingTranslator;

    fn mapped_template() -> TemplateDefinition {
        let input = TemplateDefinitionInput {
            name: Some("Pixel".to_owned()),
            path: Some("pixel".to_owned()),
            description: Some("Pixel".to_owned()),
            template_id: Some("pixel".to_owned()),
            template_version: Some(TemplateVersion::parse("2").unwrap_or_else(|_| unreachable!())),
            field_mappings: Some(BTreeMap::from([(
                "pixel_id".to_owned(),
                "pixelId".to_owned(),
            )])),
            fields: Some(vec![
                FieldDefinitionInput::new("pixel_id", FieldType::Text),
                FieldDefinitionInput::new("debug", FieldType::Checkbox),
            ]),
            script: Some("px('{{pixel_id}}', {{debug}})".to_owned()),
            ..TemplateDefinitionInput::default()
        };
        TemplateDefinition::materialize(input, TemplateDefaults::storefront())
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn renames_mapped_keys_on_the_way_out() {
        let translator = FieldMappingTranslator::for_template(&mapped_template());
        let form_data = FormData::new()
            .with_value("pixel_id", json!("123"))
            .with_value("debug", json!(true))
            .with_value("stray", json!(1));

        let external = translator.to_external(&form_data);

        assert_eq!(external.get("pixelId"), Some(&json!("123")));
        assert_eq!(external.get("debug"), Some(&json!(true)));
        assert!(!external.contains_key("pixel_id"));
        assert!(!external.contains_key("stray"));
    }

    #[test]
    fn reverses_mapping_on_load() {
        let translator = FieldMappingTranslator::for_template(&mapped_template());
        let mut stored = Map::new();
        stored.insert("pixelId".to_owned(), json!("123"));
        stored.insert("legacy".to_owned(), json!("x"));

        let form_data = translator.from_external(&stored);

        assert_eq!(form_data.get("pixel_id"), Some(&json!("123")));
        assert_eq!(form_data.len(), 1);
    }
}
