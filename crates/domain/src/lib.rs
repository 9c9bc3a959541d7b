//! Domain types and invariants for storefront tag templates.

#![forbid(unsafe_code)]

mod events;
mod field;
mod form_data;
mod placeholder;
mod placement;
mod predicate;
mod template;
mod template_defaults;

pub use events::{ChipEvents, EventHook, FieldEvent, FieldEvents};
pub use field::{
    FieldDefinition, FieldDefinitionInput, FieldOption, FieldPattern, FieldType,
    FieldValidation, FieldValidationInput, InputConfig, InputConfigInput,
};
pub use form_data::{FormData, is_blank_value};
pub use placeholder::{PlaceholderSpan, Placeholders, placeholders};
pub use placement::{HelpLink, TagPosition, TagSubType, TagType, TemplateLayout};
pub use predicate::{
    ConditionOperator, FieldCondition, Flag, FormContext, FormPredicate, SaveButtonPredicate,
};
pub use template::{TemplateDefinition, TemplateDefinitionInput, TemplateVersion};
pub use template_defaults::TemplateDefaults;
