use serde::{Deserialize, Serialize};
use tagkit_core::DefinitionError;
use url::Url;

/// Kind of tag injected into the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagType {
    /// JavaScript tag.
    Js,
    /// Stylesheet tag.
    Css,
}

impl TagType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Css => "css",
        }
    }
}

/// How the tag body is delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSubType {
    /// Script body is written inline.
    Inline,
    /// Script is loaded from a URL.
    External,
}

impl TagSubType {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::External => "external",
        }
    }
}

/// Where in the document the tag is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TagPosition {
    /// Inside `<head>`.
    Head,
    /// At the start of `<body>`.
    BodyTop,
    /// At the end of `<body>`.
    BodyBottom,
}

impl TagPosition {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Head => "head",
            Self::BodyTop => "body-top",
            Self::BodyBottom => "body-bottom",
        }
    }
}

/// Grid settings for the configuration form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateLayout {
    /// Column count, 1 through 12.
    pub columns: u8,
    /// CSS length between cells.
    pub gap: String,
    /// Collapse columns on narrow screens.
    pub responsive: bool,
}

impl TemplateLayout {
    /// Checks the layout bounds.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if !(1..=12).contains(&self.columns) {
            return Err(DefinitionError::InvalidLayout(format!(
                "columns must be between 1 and 12, got {}",
                self.columns
            )));
        }

        if self.gap.trim().is_empty() {
            return Err(DefinitionError::InvalidLayout(
                "gap must not be empty".to_owned(),
            ));
        }

        Ok(())
    }
}

/// Link to vendor documentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpLink {
    /// Sentence introducing the link.
    pub text: String,
    /// Absolute documentation URL.
    pub url: String,
    /// Anchor caption.
    pub label: String,
}

impl HelpLink {
    /// Checks that the URL is absolute.
    pub fn validate(&self) -> Result<(), DefinitionError> {
        Url::parse(self.url.as_str()).map_err(|error| {
            DefinitionError::Malformed(format!("help_link url '{}' is invalid: {error}", self.url))
        })?;
        Ok(())
    }
}
