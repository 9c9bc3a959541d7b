use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tagkit_core::{AppError, AppResult, DefinitionError};
use tagkit_domain::{
    FieldDefinition, FieldType, FormData, TagPosition, TagSubType, TagType, TemplateDefinition,
    placeholders,
};
use tracing::debug;

use crate::FieldSchemaEngine;

/// Default upper bound for rendered script size in bytes.
pub const DEFAULT_MAX_SCRIPT_BYTES: usize = 64 * 1024;

/// Substitutes form values into a template script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaceholderRenderer {
    max_script_bytes: usize,
}

/// Rendered script plus the placement metadata the injector needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedTag {
    /// Final script text.
    pub script: String,
    /// Tag kind.
    #[serde(rename = "type")]
    pub tag_type: TagType,
    /// Delivery mode.
    pub sub_type: TagSubType,
    /// Document position.
    pub position: TagPosition,
    /// Attributes for the injected element.
    pub attributes: BTreeMap<String, String>,
    /// Page-type matchers.
    pub pages: Vec<String>,
}

impl Default for PlaceholderRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SCRIPT_BYTES)
    }
}

impl PlaceholderRenderer {
    /// Creates a renderer with the given output size limit.
    #[must_use]
    pub fn new(max_script_bytes: usize) -> Self {
        Self { max_script_bytes }
    }

    /// Renders the template script for the given form data.
    ///
    /// Substitution is a single pass over the original script, so values that
    /// themselves contain `{{...}}` are emitted verbatim.
    pub fn render(&self, template: &TemplateDefinition, form_data: &FormData) -> AppResult<String> {
        let script = template.script();
        let mut rendered = String::with_capacity(script.len());
        let mut cursor = 0;

        for span in placeholders(script) {
            let field = template.field(span.name).ok_or_else(|| {
                DefinitionError::UnknownFieldReference {
                    name: span.name.to_owned(),
                }
            })?;

            rendered.push_str(&script[cursor..span.start]);
            rendered.push_str(&Self::render_value(field, form_data));
            cursor = span.end;
        }
        rendered.push_str(&script[cursor..]);

        self.check_output(template, &rendered)?;
        debug!(
            template = template.path().as_str(),
            bytes = rendered.len(),
            "rendered template script"
        );

        Ok(rendered)
    }

    /// Renders the script and attaches the template's placement metadata.
    pub fn render_tag(
        &self,
        template: &TemplateDefinition,
        form_data: &FormData,
    ) -> AppResult<RenderedTag> {
        Ok(RenderedTag {
            script: self.render(template, form_data)?,
            tag_type: template.tag_type(),
            sub_type: template.sub_type(),
            position: template.position(),
            attributes: template.attributes().clone(),
            pages: template.pages().to_vec(),
        })
    }

    fn render_value(field: &FieldDefinition, form_data: &FormData) -> String {
        let value = FieldSchemaEngine::resolve(field, form_data);

        match field.field_type() {
            FieldType::Checkbox | FieldType::Boolean => value
                .and_then(FieldSchemaEngine::bool_value)
                .unwrap_or(false)
                .to_string(),
            FieldType::Number => match value {
                Some(Value::Number(number)) => number.to_string(),
                Some(raw @ Value::String(text))
                    if FieldSchemaEngine::number_value(raw).is_some() =>
                {
                    text.trim().to_owned()
                }
                _ => String::new(),
            },
            FieldType::Multiselect | FieldType::Array => match value {
                Some(Value::Array(items)) => items
                    .iter()
                    .filter_map(Self::quoted_item)
                    .collect::<Vec<_>>()
                    .join(","),
                Some(Value::String(text)) if !text.trim().is_empty() => {
                    Value::String(text.clone()).to_string()
                }
                _ => String::new(),
            },
            FieldType::Text | FieldType::Textarea | FieldType::Select | FieldType::Note => {
                match value {
                    Some(Value::String(text)) => text.clone(),
                    Some(Value::Number(number)) => number.to_string(),
                    Some(Value::Bool(flag)) => flag.to_string(),
                    _ => String::new(),
                }
            }
        }
    }

    fn quoted_item(item: &Value) -> Option<String> {
        match item {
            Value::String(_) => Some(item.to_string()),
            Value::Number(number) => Some(Value::String(number.to_string()).to_string()),
            Value::Bool(flag) => Some(Value::String(flag.to_string()).to_string()),
            _ => None,
        }
    }

    fn check_output(&self, template: &TemplateDefinition, rendered: &str) -> AppResult<()> {
        if rendered.contains('\0') {
            return Err(AppError::Validation(format!(
                "rendered script for template '{}' contains a NUL character",
                template.path().as_str()
            )));
        }

        if rendered.len() > self.max_script_bytes {
            return Err(AppError::Validation(format!(
                "rendered script for template '{}' is {} bytes, limit is {}",
                template.path().as_str(),
                rendered.len(),
                self.max_script_bytes
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use serde_json::json;
    use tagkit_core::AppError;
    use tagkit_domain::{
        FieldDefinitionInput, FieldType, FieldValidationInput, Flag, FormData, TagPosition,
        TemplateDefaults, TemplateDefinition, TemplateDefinitionInput, TemplateVersion,
    };

    use super::PlaceholderRenderer;

    fn template(fields: Vec<FieldDefinitionInput>, script: &str) -> TemplateDefinition {
        let input = TemplateDefinitionInput {
            name: Some("Render Test".to_owned()),
            path: Some("render-test".to_owned()),
            description: Some(String::new()),
            template_id: Some("render".to_owned()),
            template_version: Some(TemplateVersion::parse("1").unwrap_or_else(|_| unreachable!())),
            position: Some(TagPosition::BodyBottom),
            fields: Some(fields),
            script: Some(script.to_owned()),
            ..TemplateDefinitionInput::default()
        };
        TemplateDefinition::materialize(input, TemplateDefaults::storefront())
            .unwrap_or_else(|_| unreachable!())
    }

    fn render(template: &TemplateDefinition, form_data: &FormData) -> String {
        PlaceholderRenderer::default()
            .render(template, form_data)
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn renders_numeric_id_example() {
        let mut id = FieldDefinitionInput::new("id", FieldType::Text);
        id.required = Some(Flag::Constant(true));
        id.validation = Some(FieldValidationInput {
            pattern: Some(r"^\d+$".to_owned()),
            ..FieldValidationInput::default()
        });
        let template = template(vec![id], "id={{id}}");

        assert_eq!(
            render(&template, &FormData::new().with_value("id", json!("42"))),
            "id=42"
        );
    }

    #[test]
    fn booleans_and_numbers_render_as_bare_tokens() {
        let template = template(
            vec![
                FieldDefinitionInput::new("debug", FieldType::Checkbox),
                FieldDefinitionInput::new("ratio", FieldType::Number),
            ],
            "init({debug: {{debug}}, ratio: {{ ratio }}});",
        );

        let form_data = FormData::new()
            .with_value("debug", json!(true))
            .with_value("ratio", json!(0.5));
        assert_eq!(render(&template, &form_data), "init({debug: true, ratio: 0.5});");
        let form_data = FormData::new()
            .with_value("debug", json!(false))
            .with_value("ratio", json!(3));
        assert_eq!(render(&template, &form_data), "init({debug: false, ratio: 3});");
        assert_eq!(
            render(&template, &FormData::new()),
            "init({debug: false, ratio: });"
        );
    }

    #[test]
    fn arrays_render_as_quoted_list_items() {
        let template = template(
            vec![FieldDefinitionInput::new("ids", FieldType::Array)],
            "var ids = [{{ids}}];",
        );

        assert_eq!(
            render(&template, &FormData::new().with_value("ids", json!(["a", "b"]))),
            r#"var ids = ["a","b"];"#
        );
        assert_eq!(
            render(&template, &FormData::new().with_value("ids", json!([]))),
            "var ids = [];"
        );
        assert_eq!(render(&template, &FormData::new()), "var ids = [];");
        assert_eq!(
            render(
                &template,
                &FormData::new().with_value("ids", json!([r#"say "hi""#]))
            ),
            r#"var ids = ["say \"hi\""];"#
        );
    }

    #[test]
    fn missing_values_fall_back_to_defaults() {
        let mut region = FieldDefinitionInput::new("region", FieldType::Text);
        region.default = Some(json!("eu"));
        let template = template(
            vec![region, FieldDefinitionInput::new("key", FieldType::Text)],
            "{{region}}:{{key}}",
        );

        assert_eq!(render(&template, &FormData::new()), "eu:");
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let template = template(
            vec![
                FieldDefinitionInput::new("first", FieldType::Text),
                FieldDefinitionInput::new("second", FieldType::Text),
            ],
            "{{first}}|{{second}}",
        );
        let form_data = FormData::new()
            .with_value("first", json!("{{second}}"))
            .with_value("second", json!("x"));

        assert_eq!(render(&template, &form_data), "{{second}}|x");
    }

    #[test]
    fn oversized_output_is_rejected() {
        let template = template(
            vec![FieldDefinitionInput::new("code", FieldType::Textarea)],
            "{{code}}",
        );
        let form_data = FormData::new().with_value("code", json!("x".repeat(32)));

        let result = PlaceholderRenderer::new(16).render(&template, &form_data);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn nul_characters_are_rejected() {
        let template = template(
            vec![FieldDefinitionInput::new("code", FieldType::Textarea)],
            "{{code}}",
        );
        let form_data = FormData::new().with_value("code", json!("a\u{0}b"));

        let result = PlaceholderRenderer::default().render(&template, &form_data);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn render_tag_carries_placement() {
        let template = template(Vec::new(), "console.log(1);");

        let tag = PlaceholderRenderer::default()
            .render_tag(&template, &FormData::new())
            .unwrap_or_else(|_| unreachable!());

        assert_eq!(tag.script, "console.log(1);");
        assert_eq!(tag.position, TagPosition::BodyBottom);
        assert_eq!(tag.attributes.get("async").map(String::as_str), Some("true"));
    }

    proptest! {
        #[test]
        fn array_items_splice_into_valid_json(items in proptest::collection::vec("[a-zA-Z0-9 \"\\\\]{0,8}", 0..6)) {
            let template = template(
                vec![FieldDefinitionInput::new("f", FieldType::Array)],
                "[{{f}}]",
            );
            let form_data = FormData::new().with_value("f", json!(items.clone()));

            let rendered = render(&template, &form_data);
            let parsed: Vec<String> = serde_json::from_str(&rendered)
                .unwrap_or_else(|_| unreachable!());
            prop_assert_eq!(parsed, items);
        }

        #[test]
        fn text_without_markers_renders_verbatim(value in "[^{}\u{0}]{0,40}") {
            let template = template(
                vec![FieldDefinitionInput::new("v", FieldType::Text)],
                "<{{v}}>",
            );
            let form_data = FormData::new().with_value("v", json!(value.clone()));

            prop_assert_eq!(render(&template, &form_data), format!("<{value}>"));
        }
    }
}
