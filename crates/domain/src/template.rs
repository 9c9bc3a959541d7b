use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use tagkit_core::{AppError, AppResult, DefinitionError, NonEmptyString};

use crate::field::{FieldDefinition, FieldDefinitionInput};
use crate::form_data::FormData;
use crate::placeholder::placeholders;
use crate::placement::{HelpLink, TagPosition, TagSubType, TagType, TemplateLayout};
use crate::predicate::{Flag, SaveButtonPredicate};
use crate::template_defaults::TemplateDefaults;

/// Dotted numeric template version such as `1`, `1.2` or `2.0.3`.
///
/// Trailing zero components are insignificant: `1.0` equals `1.0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TemplateVersion {
    raw: String,
    components: Vec<u64>,
}

impl TemplateVersion {
    /// Parses a dotted numeric version.
    pub fn parse(value: impl Into<String>) -> AppResult<Self> {
        let raw: String = value.into();
        let raw = raw.trim().to_owned();
        if raw.is_empty() {
            return Err(AppError::Validation(
                "template version must not be empty".to_owned(),
            ));
        }

        let mut components = raw
            .split('.')
            .map(|part| {
                part.parse::<u64>().map_err(|_| {
                    AppError::Validation(format!("invalid template version '{raw}'"))
                })
            })
            .collect::<AppResult<Vec<_>>>()?;

        while components.len() > 1 && components.last() == Some(&0) {
            components.pop();
        }

        Ok(Self { raw, components })
    }

    /// Returns the version as authored.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.raw.as_str()
    }
}

impl PartialEq for TemplateVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for TemplateVersion {}

impl Hash for TemplateVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.components.hash(state);
    }
}

impl PartialOrd for TemplateVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TemplateVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.components.cmp(&other.components)
    }
}

impl TryFrom<String> for TemplateVersion {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TemplateVersion> for String {
    fn from(value: TemplateVersion) -> Self {
        value.raw
    }
}

impl Display for TemplateVersion {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.raw.as_str())
    }
}

/// Partial template definition as written by a catalog author.
///
/// Every key is optional at the type level; [`TemplateDefinition::materialize`]
/// enforces the required ones and fills the rest from [`TemplateDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateDefinitionInput {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Unique catalog slug.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Stable identifier shared by every version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Version of this definition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_version: Option<TemplateVersion>,
    /// Tag kind.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tag_type: Option<TagType>,
    /// Delivery mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<TagSubType>,
    /// Document position.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<TagPosition>,
    /// Page-type matchers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<String>>,
    /// Attributes copied onto the injected tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<BTreeMap<String, String>>,
    /// Supported rendering engines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compatible_engines: Option<BTreeSet<String>>,
    /// Logo image.
    #[serde(default, alias = "img", skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Markdown-lite note shown above the form.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// Vendor documentation link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help_link: Option<HelpLink>,
    /// Internal to external field names used when persisting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_mappings: Option<BTreeMap<String, String>>,
    /// Form grid; replaces the default layout as a whole.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<TemplateLayout>,
    /// Ordered field schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<FieldDefinitionInput>>,
    /// Script body with placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script: Option<String>,
    /// Custom save-button rule.
    #[serde(skip)]
    pub save_button_disabled: Option<SaveButtonPredicate>,
}

/// Complete, validated template definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDefinition {
    name: NonEmptyString,
    path: NonEmptyString,
    description: String,
    template_id: NonEmptyString,
    template_version: TemplateVersion,
    #[serde(rename = "type")]
    tag_type: TagType,
    sub_type: TagSubType,
    position: TagPosition,
    pages: Vec<String>,
    attributes: BTreeMap<String, String>,
    compatible_engines: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    help_link: Option<HelpLink>,
    field_mappings: BTreeMap<String, String>,
    layout: TemplateLayout,
    fields: Vec<FieldDefinition>,
    script: String,
    #[serde(skip)]
    save_button_disabled: Option<SaveButtonPredicate>,
}

impl TemplateDefinition {
    /// Merges a partial definition over `defaults` and checks every invariant.
    ///
    /// The merge is shallow: a present `layout` replaces the default layout
    /// object entirely instead of filling in its missing keys.
    pub fn materialize(
        input: TemplateDefinitionInput,
        defaults: &TemplateDefaults,
    ) -> Result<Self, DefinitionError> {
        let TemplateDefinitionInput {
            name,
            path,
            description,
            template_id,
            template_version,
            tag_type,
            sub_type,
            position,
            pages,
            attributes,
            compatible_engines,
            image,
            note,
            help_link,
            field_mappings,
            layout,
            fields,
            script,
            save_button_disabled,
        } = input;

        let name = required_text(name, "name")?;
        let path = required_text(path, "path")?;
        let description = description.ok_or_else(|| missing_key("description"))?;
        let template_id = required_text(template_id, "template_id")?;
        let template_version = template_version.ok_or_else(|| missing_key("template_version"))?;
        let field_inputs = fields.ok_or_else(|| missing_key("fields"))?;
        let script = script.ok_or_else(|| missing_key("script"))?;

        if !path
            .as_str()
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_'))
        {
            return Err(DefinitionError::Malformed(format!(
                "path '{}' must only contain letters, digits, '-' or '_'",
                path.as_str()
            )));
        }

        let mut fields = Vec::with_capacity(field_inputs.len());
        let mut seen_names = HashSet::new();
        for field_input in field_inputs {
            let field = FieldDefinition::new(field_input)?;
            if !seen_names.insert(field.name().as_str().to_owned()) {
                return Err(DefinitionError::DuplicateFieldName {
                    name: field.name().as_str().to_owned(),
                });
            }
            fields.push(field);
        }

        for field in &fields {
            let flags = [
                field.condition(),
                field.visible(),
                field.required(),
                field.disabled(),
            ];
            if let Some(unknown) = flags
                .into_iter()
                .flatten()
                .flat_map(Flag::referenced_fields)
                .find(|name| !seen_names.contains(*name))
            {
                return Err(DefinitionError::UnknownConditionField {
                    field: field.name().as_str().to_owned(),
                    name: unknown.to_owned(),
                });
            }
        }

        let field_mappings = field_mappings.unwrap_or_else(|| defaults.field_mappings.clone());
        if let Some(unknown) = field_mappings
            .keys()
            .find(|key| !seen_names.contains(key.as_str()))
        {
            return Err(DefinitionError::InvalidFieldMapping {
                name: unknown.clone(),
            });
        }

        let mut external_names = HashSet::new();
        for field in &fields {
            let name = field.name().as_str();
            let external = field_mappings.get(name).map_or(name, String::as_str);
            if !external_names.insert(external) {
                return Err(DefinitionError::DuplicateExternalName {
                    name: external.to_owned(),
                });
            }
        }

        if let Some(span) = placeholders(script.as_str()).find(|span| !seen_names.contains(span.name))
        {
            return Err(DefinitionError::InvalidPlaceholder {
                name: span.name.to_owned(),
            });
        }

        let layout = layout.unwrap_or_else(|| defaults.layout.clone());
        layout.validate()?;

        if let Some(help_link) = &help_link {
            help_link.validate()?;
        }

        Ok(Self {
            name,
            path,
            description,
            template_id,
            template_version,
            tag_type: tag_type.unwrap_or(defaults.tag_type),
            sub_type: sub_type.unwrap_or(defaults.sub_type),
            position: position.unwrap_or(defaults.position),
            pages: pages.unwrap_or_else(|| defaults.pages.clone()),
            attributes: attributes.unwrap_or_else(|| defaults.attributes.clone()),
            compatible_engines: compatible_engines
                .unwrap_or_else(|| defaults.compatible_engines.clone()),
            image,
            note,
            help_link,
            field_mappings,
            layout,
            fields,
            script,
            save_button_disabled,
        })
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the catalog slug.
    #[must_use]
    pub fn path(&self) -> &NonEmptyString {
        &self.path
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    /// Returns the stable template identifier.
    #[must_use]
    pub fn template_id(&self) -> &NonEmptyString {
        &self.template_id
    }

    /// Returns the template version.
    #[must_use]
    pub fn template_version(&self) -> &TemplateVersion {
        &self.template_version
    }

    /// Returns the tag kind.
    #[must_use]
    pub fn tag_type(&self) -> TagType {
        self.tag_type
    }

    /// Returns the delivery mode.
    #[must_use]
    pub fn sub_type(&self) -> TagSubType {
        self.sub_type
    }

    /// Returns the document position.
    #[must_use]
    pub fn position(&self) -> TagPosition {
        self.position
    }

    /// Returns page-type matchers.
    #[must_use]
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Returns tag attributes.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns supported rendering engines.
    #[must_use]
    pub fn compatible_engines(&self) -> &BTreeSet<String> {
        &self.compatible_engines
    }

    /// Returns the logo image.
    #[must_use]
    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Returns the note.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    /// Returns the documentation link.
    #[must_use]
    pub fn help_link(&self) -> Option<&HelpLink> {
        self.help_link.as_ref()
    }

    /// Returns internal to external field names.
    #[must_use]
    pub fn field_mappings(&self) -> &BTreeMap<String, String> {
        &self.field_mappings
    }

    /// Returns the form grid.
    #[must_use]
    pub fn layout(&self) -> &TemplateLayout {
        &self.layout
    }

    /// Returns fields in display order.
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Returns the script body.
    #[must_use]
    pub fn script(&self) -> &str {
        self.script.as_str()
    }

    /// Returns the custom save-button rule.
    #[must_use]
    pub fn save_button_disabled(&self) -> Option<&SaveButtonPredicate> {
        self.save_button_disabled.as_ref()
    }

    /// Finds a field by name.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldDefinition> {
        self.fields
            .iter()
            .find(|field| field.name().as_str() == name)
    }

    /// Returns the distinct field names referenced by the script.
    #[must_use]
    pub fn placeholder_names(&self) -> BTreeSet<&str> {
        placeholders(self.script.as_str())
            .map(|span| span.name)
            .collect()
    }

    /// Returns form data seeded with every field default.
    #[must_use]
    pub fn initial_form_data(&self) -> FormData {
        self.fields
            .iter()
            .filter_map(|field| {
                field
                    .default_value()
                    .map(|value| (field.name().as_str().to_owned(), value.clone()))
            })
            .collect()
    }
}

impl From<TemplateDefinition> for TemplateDefinitionInput {
    fn from(value: TemplateDefinition) -> Self {
        Self {
            name: Some(value.name.into()),
            path: Some(value.path.into()),
            description: Some(value.description),
            template_id: Some(value.template_id.into()),
            template_version: Some(value.template_version),
            tag_type: Some(value.tag_type),
            sub_type: Some(value.sub_type),
            position: Some(value.position),
            pages: Some(value.pages),
            attributes: Some(value.attributes),
            compatible_engines: Some(value.compatible_engines),
            image: value.image,
            note: value.note,
            help_link: value.help_link,
            field_mappings: Some(value.field_mappings),
            layout: Some(value.layout),
            fields: Some(
                value
                    .fields
                    .into_iter()
                    .map(FieldDefinitionInput::from)
                    .collect(),
            ),
            script: Some(value.script),
            save_button_disabled: value.save_button_disabled,
        }
    }
}

fn missing_key(key: &str) -> DefinitionError {
    DefinitionError::MissingRequiredKey {
        key: key.to_owned(),
    }
}

fn required_text(value: Option<String>, key: &str) -> Result<NonEmptyString, DefinitionError> {
    value
        .and_then(|value| NonEmptyString::new(value).ok())
        .ok_or_else(|| missing_key(key))
}
