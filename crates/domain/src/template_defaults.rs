use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use crate::placement::{TagPosition, TagSubType, TagType, TemplateLayout};

/// Values a partial template falls back to for every key it omits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateDefaults {
    /// Tag kind.
    pub tag_type: TagType,
    /// Delivery mode.
    pub sub_type: TagSubType,
    /// Document position.
    pub position: TagPosition,
    /// Page-type matchers; empty means every page.
    pub pages: Vec<String>,
    /// Attributes copied onto the injected tag.
    pub attributes: BTreeMap<String, String>,
    /// Supported rendering engines.
    pub compatible_engines: BTreeSet<String>,
    /// Internal to external field names.
    pub field_mappings: BTreeMap<String, String>,
    /// Form grid.
    pub layout: TemplateLayout,
}

static STOREFRONT_DEFAULTS: LazyLock<TemplateDefaults> = LazyLock::new(|| TemplateDefaults {
    tag_type: TagType::Js,
    sub_type: TagSubType::Inline,
    position: TagPosition::Head,
    pages: Vec::new(),
    attributes: BTreeMap::from([("async".to_owned(), "true".to_owned())]),
    compatible_engines: BTreeSet::from(["react".to_owned(), "vue2".to_owned()]),
    field_mappings: BTreeMap::new(),
    layout: TemplateLayout {
        columns: 2,
        gap: "20px".to_owned(),
        responsive: true,
    },
});

impl TemplateDefaults {
    /// Returns the defaults every storefront catalog entry is built from.
    #[must_use]
    pub fn storefront() -> &'static Self {
        &STOREFRONT_DEFAULTS
    }
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self::storefront().clone()
    }
}
