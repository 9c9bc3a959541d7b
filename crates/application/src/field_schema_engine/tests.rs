use std::sync::{Arc, Mutex};

use serde_json::{Value, json};
use tagkit_core::FieldError;
use tagkit_domain::{
    ChipEvents, ConditionOperator, EventHook, FieldCondition, FieldDefinition,
    FieldDefinitionInput, FieldEvent, FieldType, FieldValidationInput, Flag, FormContext, FormData,
    InputConfigInput, SaveButtonPredicate, TemplateDefaults, TemplateDefinition,
    TemplateDefinitionInput, TemplateVersion,
};

use super::FieldSchemaEngine;

fn field(input: FieldDefinitionInput) -> FieldDefinition {
    FieldDefinition::new(input).unwrap_or_else(|_| unreachable!())
}

fn template(fields: Vec<FieldDefinitionInput>, script: &str) -> TemplateDefinition {
    template_with(fields, script, |_| {})
}

fn template_with(
    fields: Vec<FieldDefinitionInput>,
    script: &str,
    customize: impl FnOnce(&mut TemplateDefinitionInput),
) -> TemplateDefinition {
    let mut input = TemplateDefinitionInput {
        name: Some("Test Tag".to_owned()),
        path: Some("test-tag".to_owned()),
        description: Some("Test tag".to_owned()),
        template_id: Some("test".to_owned()),
        template_version: Some(TemplateVersion::parse("1.0").unwrap_or_else(|_| unreachable!())),
        fields: Some(fields),
        script: Some(script.to_owned()),
        ..TemplateDefinitionInput::default()
    };
    customize(&mut input);
    TemplateDefinition::materialize(input, TemplateDefaults::storefront())
        .unwrap_or_else(|_| unreachable!())
}

fn numeric_id_field() -> FieldDefinitionInput {
    let mut input = FieldDefinitionInput::new("id", FieldType::Text);
    input.label = "Tracking ID".to_owned();
    input.required = Some(Flag::Constant(true));
    input.validation = Some(FieldValidationInput {
        pattern: Some(r"^\d+$".to_owned()),
        message: Some("Must be numeric".to_owned()),
        ..FieldValidationInput::default()
    });
    input
}

fn tags_field(events: ChipEvents) -> FieldDefinitionInput {
    let mut input = FieldDefinitionInput::new("tags", FieldType::Array);
    input.input_config = Some(InputConfigInput {
        input_type: FieldType::Text,
        validation: Some(FieldValidationInput {
            pattern: Some("^[a-z]+=[a-z]+$".to_owned()),
            message: Some("Use key=value".to_owned()),
            ..FieldValidationInput::default()
        }),
        events,
        ..InputConfigInput::default()
    });
    input
}

fn recorder() -> (EventHook, Arc<Mutex<Vec<FieldEvent>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let hook = EventHook::new(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push(event.clone());
        }
    });
    (hook, seen)
}

fn recorded(seen: &Arc<Mutex<Vec<FieldEvent>>>) -> Vec<FieldEvent> {
    seen.lock()
        .map(|events| events.clone())
        .unwrap_or_else(|_| unreachable!())
}

#[test]
fn required_text_with_pattern_reports_author_message() {
    let id = field(numeric_id_field());

    assert_eq!(FieldSchemaEngine::validate(&id, Some(&json!("123")), &FormData::new()), Ok(()));
    assert_eq!(
        FieldSchemaEngine::validate(&id, Some(&json!("abc")), &FormData::new()),
        Err(FieldError::PatternMismatch {
            field: "id".to_owned(),
            message: "Must be numeric".to_owned(),
        })
    );
    assert_eq!(
        FieldSchemaEngine::validate(&id, Some(&json!("")), &FormData::new()),
        Err(FieldError::Required {
            field: "id".to_owned(),
        })
    );
}

#[test]
fn optional_blank_value_skips_pattern() {
    let mut input = numeric_id_field();
    input.required = None;
    let id = field(input);

    assert_eq!(FieldSchemaEngine::validate(&id, None, &FormData::new()), Ok(()));
    assert_eq!(FieldSchemaEngine::validate(&id, Some(&json!("  ")), &FormData::new()), Ok(()));
}

#[test]
fn hidden_invalid_field_does_not_block_the_form() {
    let mut enabled = FieldDefinitionInput::new("enabled", FieldType::Checkbox);
    enabled.default = Some(json!(false));
    let mut id = numeric_id_field();
    id.condition = Some(Flag::When(
        FieldCondition::new("enabled", ConditionOperator::Eq, json!(true))
            .unwrap_or_else(|_| unreachable!()),
    ));
    let template = template(vec![enabled, id], "track('{{id}}', {{enabled}});");

    let hidden = FormData::new()
        .with_value("enabled", json!(false))
        .with_value("id", json!("abc"));
    assert!(FieldSchemaEngine::is_form_valid(&template, &hidden));
    assert!(FieldSchemaEngine::errors(&template, &hidden).is_empty());

    let shown = hidden.with_value("enabled", json!(true));
    assert!(!FieldSchemaEngine::is_form_valid(&template, &shown));
    assert_eq!(FieldSchemaEngine::errors(&template, &shown).len(), 1);
}

#[test]
fn closure_predicates_drive_required_and_disabled() {
    let mut key = FieldDefinitionInput::new("key", FieldType::Text);
    key.required = Some(Flag::predicate(|form_data| {
        form_data.get("mode") == Some(&json!("advanced"))
    }));
    key.disabled = Some(Flag::predicate(|form_data| {
        form_data.get("mode") != Some(&json!("advanced"))
    }));
    let key = field(key);

    let basic = FormData::new().with_value("mode", json!("basic"));
    let advanced = FormData::new().with_value("mode", json!("advanced"));

    assert!(!FieldSchemaEngine::is_required(&key, &basic));
    assert!(FieldSchemaEngine::is_disabled(&key, &basic));
    assert!(FieldSchemaEngine::is_required(&key, &advanced));
    assert!(!FieldSchemaEngine::is_disabled(&key, &advanced));
    assert!(FieldSchemaEngine::validate(&key, None, &advanced).is_err());
}

#[test]
fn validation_ignores_unrelated_fields() {
    let id = field(numeric_id_field());
    let noisy = FormData::new()
        .with_value("other", json!("garbage"))
        .with_value("count", json!(-1));

    assert_eq!(
        FieldSchemaEngine::validate(&id, Some(&json!("42")), &noisy),
        FieldSchemaEngine::validate(&id, Some(&json!("42")), &FormData::new())
    );
}

#[test]
fn number_range_uses_default_message() {
    let mut input = FieldDefinitionInput::new("sample_rate", FieldType::Number);
    input.validation = Some(FieldValidationInput {
        min: Some(0.0),
        max: Some(100.0),
        ..FieldValidationInput::default()
    });
    let rate = field(input);

    assert_eq!(FieldSchemaEngine::validate(&rate, Some(&json!(50)), &FormData::new()), Ok(()));
    assert_eq!(
        FieldSchemaEngine::validate(&rate, Some(&json!("100")), &FormData::new()),
        Ok(())
    );
    assert_eq!(
        FieldSchemaEngine::validate(&rate, Some(&json!(101)), &FormData::new()),
        Err(FieldError::Range {
            field: "sample_rate".to_owned(),
            min: Some(0.0),
            max: Some(100.0),
            message: "value must be between 0 and 100".to_owned(),
        })
    );
    assert!(matches!(
        FieldSchemaEngine::validate(&rate, Some(&json!("fast")), &FormData::new()),
        Err(FieldError::TypeMismatch { .. })
    ));
}

#[test]
fn zero_and_false_are_values_not_blanks() {
    let mut count = FieldDefinitionInput::new("count", FieldType::Number);
    count.required = Some(Flag::Constant(true));
    let mut consent = FieldDefinitionInput::new("consent", FieldType::Checkbox);
    consent.required = Some(Flag::Constant(true));

    assert_eq!(
        FieldSchemaEngine::validate(&field(count), Some(&json!(0)), &FormData::new()),
        Ok(())
    );
    assert_eq!(
        FieldSchemaEngine::validate(&field(consent), Some(&json!(false)), &FormData::new()),
        Ok(())
    );
}

#[test]
fn multiselect_rejects_unknown_options() {
    let mut input = FieldDefinitionInput::new("pages", FieldType::Multiselect);
    input.options = vec![
        tagkit_domain::FieldOption::new("Home", "home"),
        tagkit_domain::FieldOption::new("Cart", "cart"),
    ];
    let pages = field(input);

    assert_eq!(
        FieldSchemaEngine::validate(&pages, Some(&json!(["home", "cart"])), &FormData::new()),
        Ok(())
    );
    assert_eq!(
        FieldSchemaEngine::validate(&pages, Some(&json!(["home", "blog"])), &FormData::new()),
        Err(FieldError::InvalidOption {
            field: "pages".to_owned(),
            value: "blog".to_owned(),
        })
    );
}

#[test]
fn add_chip_validates_before_committing() {
    let tags = field(tags_field(ChipEvents::default()));
    let form_data = FormData::new();

    let added = FieldSchemaEngine::add_array_item(&tags, "k=v", &form_data)
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(added.get("tags"), Some(&json!(["k=v"])));
    assert!(form_data.get("tags").is_none());

    let rejected = FieldSchemaEngine::add_array_item(&tags, "bad", &added);
    assert_eq!(
        rejected,
        Err(FieldError::PatternMismatch {
            field: "tags".to_owned(),
            message: "Use key=value".to_owned(),
        })
    );
    assert_eq!(added.get("tags"), Some(&json!(["k=v"])));

    assert_eq!(
        FieldSchemaEngine::add_array_item(&tags, "   ", &added),
        Err(FieldError::Required {
            field: "tags".to_owned(),
        })
    );
}

#[test]
fn chips_are_stored_as_given() {
    let tags = field(tags_field(ChipEvents::default()));
    let padded = FieldSchemaEngine::add_array_item(&tags, " k=v ", &FormData::new());
    assert!(matches!(padded, Err(FieldError::PatternMismatch { .. })));

    let labels = field(FieldDefinitionInput::new("labels", FieldType::Array));
    let added = FieldSchemaEngine::add_array_item(&labels, " spaced ", &FormData::new())
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(added.get("labels"), Some(&json!([" spaced "])));
}

#[test]
fn chip_hooks_fire_before_mutation() {
    let (click, clicks) = recorder();
    let (remove, removals) = recorder();
    let tags = field(tags_field(ChipEvents {
        click: Some(click),
        remove: Some(remove),
    }));

    let added = FieldSchemaEngine::add_array_item(&tags, "a=b", &FormData::new())
        .unwrap_or_else(|_| unreachable!());
    let added = FieldSchemaEngine::add_array_item(&tags, "c=d", &added)
        .unwrap_or_else(|_| unreachable!());
    let _ = FieldSchemaEngine::add_array_item(&tags, "nope", &added);

    assert_eq!(
        recorded(&clicks),
        vec![
            FieldEvent::Click {
                field: "tags".to_owned(),
                value: json!("a=b"),
            },
            FieldEvent::Click {
                field: "tags".to_owned(),
                value: json!("c=d"),
            },
        ]
    );

    let trimmed = FieldSchemaEngine::remove_array_item(&tags, 0, &added)
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(trimmed.get("tags"), Some(&json!(["c=d"])));
    assert_eq!(
        recorded(&removals),
        vec![FieldEvent::Remove {
            field: "tags".to_owned(),
            index: 0,
            value: json!("a=b"),
        }]
    );
}

#[test]
fn remove_chip_out_of_range_is_rejected() {
    let tags = field(tags_field(ChipEvents::default()));
    let form_data = FormData::new().with_value("tags", json!(["a=b"]));

    assert_eq!(
        FieldSchemaEngine::remove_array_item(&tags, 3, &form_data),
        Err(FieldError::IndexOutOfRange {
            field: "tags".to_owned(),
            index: 3,
            len: 1,
        })
    );
}

#[test]
fn chips_on_scalar_fields_are_type_errors() {
    let id = field(numeric_id_field());

    assert!(matches!(
        FieldSchemaEngine::add_array_item(&id, "1", &FormData::new()),
        Err(FieldError::TypeMismatch { .. })
    ));
}

#[test]
fn set_field_value_coerces_and_notifies_in_order() {
    let (hook, seen) = recorder();
    let mut input = FieldDefinitionInput::new("count", FieldType::Number);
    input.events.input = Some(hook.clone());
    input.events.change = Some(hook);
    let count = field(input);

    let updated = FieldSchemaEngine::set_field_value(&count, &json!(" 12 "), &FormData::new())
        .unwrap_or_else(|_| unreachable!());
    assert_eq!(updated.get("count"), Some(&json!(12)));
    assert_eq!(
        recorded(&seen),
        vec![
            FieldEvent::Input {
                field: "count".to_owned(),
                value: json!(12),
            },
            FieldEvent::Change {
                field: "count".to_owned(),
                value: json!(12),
            },
        ]
    );

    assert!(matches!(
        FieldSchemaEngine::set_field_value(&count, &json!("twelve"), &updated),
        Err(FieldError::TypeMismatch { .. })
    ));
    assert_eq!(recorded(&seen).len(), 2);
}

#[test]
fn coerce_handles_each_field_family() {
    let flag = field(FieldDefinitionInput::new("flag", FieldType::Boolean));
    let list = field(FieldDefinitionInput::new("list", FieldType::Array));
    let text = field(FieldDefinitionInput::new("text", FieldType::Text));
    let number = field(FieldDefinitionInput::new("n", FieldType::Number));

    assert_eq!(FieldSchemaEngine::coerce(&flag, &json!("TRUE")), Ok(json!(true)));
    assert_eq!(
        FieldSchemaEngine::coerce(&list, &json!("a, b,,c")),
        Ok(json!(["a", "b", "c"]))
    );
    assert_eq!(FieldSchemaEngine::coerce(&list, &Value::Null), Ok(json!([])));
    assert_eq!(FieldSchemaEngine::coerce(&text, &json!(7)), Ok(json!("7")));
    assert_eq!(FieldSchemaEngine::coerce(&number, &json!("2.5")), Ok(json!(2.5)));
    assert_eq!(FieldSchemaEngine::coerce(&number, &json!("")), Ok(Value::Null));
}

#[test]
fn reset_field_falls_back_to_default() {
    let mut input = FieldDefinitionInput::new("region", FieldType::Text);
    input.default = Some(json!("eu"));
    let region = field(input);

    let form_data = FormData::new().with_value("region", json!("us"));
    let reset = FieldSchemaEngine::reset_field(&region, &form_data);

    assert!(reset.get("region").is_none());
    assert_eq!(FieldSchemaEngine::resolve(&region, &reset), Some(&json!("eu")));
    assert_eq!(form_data.get("region"), Some(&json!("us")));
}

#[test]
fn save_button_follows_validity_by_default() {
    let template = template(vec![numeric_id_field()], "id={{id}}");

    let invalid = FieldSchemaEngine::evaluate(&template, &FormData::new(), &FormContext::default());
    assert!(!invalid.is_valid);
    assert!(invalid.save_button_disabled);
    assert_eq!(invalid.errors().len(), 1);

    let valid = FieldSchemaEngine::evaluate(
        &template,
        &FormData::new().with_value("id", json!("7")),
        &FormContext::default(),
    );
    assert!(valid.is_valid);
    assert!(!valid.save_button_disabled);
}

#[test]
fn custom_save_button_rule_overrides_validity() {
    let template = template_with(vec![numeric_id_field()], "id={{id}}", |input| {
        input.save_button_disabled = Some(SaveButtonPredicate::new(|_, errors, context| {
            !context.is_dirty || !errors.is_empty()
        }));
    });
    let valid = FormData::new().with_value("id", json!("7"));

    let pristine = FieldSchemaEngine::evaluate(&template, &valid, &FormContext::default());
    assert!(pristine.is_valid);
    assert!(pristine.save_button_disabled);

    let dirty = FieldSchemaEngine::evaluate(
        &template,
        &valid,
        &FormContext {
            is_dirty: true,
            is_submitting: false,
        },
    );
    assert!(!dirty.save_button_disabled);
}

#[test]
fn evaluation_reports_effective_field_state() {
    let mut enabled = FieldDefinitionInput::new("enabled", FieldType::Checkbox);
    enabled.default = Some(json!(true));
    let mut id = numeric_id_field();
    id.visible = Some(Flag::When(
        FieldCondition::new("enabled", ConditionOperator::Eq, json!(true))
            .unwrap_or_else(|_| unreachable!()),
    ));
    let template = template(vec![enabled, id], "{{enabled}}{{id}}");
    let form_data = template.initial_form_data();

    let evaluation = FieldSchemaEngine::evaluate(&template, &form_data, &FormContext::default());
    let id_state = evaluation
        .fields
        .iter()
        .find(|state| state.name == "id")
        .unwrap_or_else(|| unreachable!());

    assert!(id_state.visible);
    assert!(id_state.required);
    assert!(!id_state.disabled);
    assert!(matches!(id_state.error, Some(FieldError::Required { .. })));
}
