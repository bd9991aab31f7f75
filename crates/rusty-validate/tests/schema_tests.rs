//! Integration tests for schema validation
//!
//! Covers:
//! - Mixed factory and prebuilt validators
//! - Nested objects and arrays
//! - Optional fields
//! - Conditional rules
//! - Registration-time pattern errors

use pretty_assertions::assert_eq;
use rusty_validate::*;
use serde_json::json;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

fn signup_schema() -> Schema {
    Schema::new()
        .field("email", email)
        .field("age", |v| Validator::new(v).required(None).between(18, 120, None))
        .field("role", |v| {
            Validator::new(v).one_of(["admin", "user", "guest"], None)
        })
        .field("website", |v| url(v).map(Validator::optional))
}

#[test]
fn test_schema_reports_every_failing_field() {
    init_tracing();
    let data = Value::from(json!({ "email": "bad", "age": 200, "role": "user" }));
    let result = signup_schema().validate(&data).unwrap();

    assert!(!result.is_valid);
    let errors = result.errors_by_field();
    assert_eq!(errors.len(), 2);
    assert!(errors["email"].iter().any(|e| e.contains("Invalid email format")));
    assert!(errors["age"].iter().any(|e| e.contains("between 18 and 120")));
    assert!(!errors.contains_key("role"));
    assert!(!errors.contains_key("website"));
}

#[test]
fn test_schema_valid_record() {
    let data = Value::from(json!({
        "email": " Ada@Example.com ",
        "age": "36",
        "role": "admin",
        "website": ""
    }));
    let result = signup_schema().validate(&data).unwrap();
    assert!(result.is_valid, "{:?}", result.errors_by_field());
}

#[test]
fn test_errors_carry_field_name() {
    let data = Value::from(json!({ "email": "ada@example.com", "age": 30, "role": "root" }));
    let result = signup_schema().validate(&data).unwrap();
    let role = result.field("role").unwrap();
    assert!(role.errors[0].contains("role"));
    assert!(role.errors[0].contains("admin, user, guest"));
}

#[test]
fn test_nested_object_and_array() {
    let address = Schema::new()
        .field("street", |v| Validator::new(v).required(None).min(3, None))
        .field("zip", |v| zip_code(v, Country::Us));
    let schema = Schema::new()
        .field("address", move |v| Validator::new(v).object(address.clone(), None))
        .field("tags", |v| {
            Validator::new(v)
                .array(None)
                .array_of(ValidatorSource::factory(alphanumeric), None)
        });

    let data = Value::from(json!({
        "address": { "street": "Main St", "zip": "abc" },
        "tags": ["rust", "no spaces", "ok"]
    }));
    let result = schema.validate(&data).unwrap();
    let errors = result.errors_by_field();

    assert!(errors["address"][0].contains("Object validation failed"));
    assert!(errors["address"][0].contains("Invalid zip code format"));
    assert!(errors["tags"][0].contains("[1]"));
    assert!(!errors["tags"][0].contains("[0]"));
}

#[test]
fn test_conditional_rule() {
    let schema = Schema::new().field("company", |v| {
        Validator::new(v).when(
            true,
            Validator::new(Value::Null).required(Some("Company is required")),
        )
    });
    let result = schema.validate(&Value::from(json!({}))).unwrap();
    assert_eq!(
        result.field("company").unwrap().errors,
        vec!["Company is required"]
    );
}

#[test]
fn test_unsafe_pattern_refused_at_registration() {
    let schema = Schema::new().field("code", |v| Validator::new(v).pattern("(a+)+b", None));
    let result = schema.validate(&Value::from(json!({ "code": "aaa" }))).unwrap();
    let errors = &result.field("code").unwrap().errors;
    assert!(errors[0].starts_with("Validation setup error"));
    assert!(errors[0].contains("unsafe regex pattern"));
}

#[test]
fn test_registration_error_does_not_stop_later_fields() {
    let schema = Schema::new()
        .field("code", |v| Validator::new(v).pattern("(a+)+b", None))
        .field("email", email);
    let data = Value::from(json!({ "code": "aaa", "email": "not-an-email" }));
    let result = schema.validate(&data).unwrap();

    let errors = result.errors_by_field();
    assert_eq!(errors.len(), 2);
    assert!(errors["code"][0].starts_with("Validation setup error"));
    assert_eq!(errors["email"], vec!["Invalid email format"]);
}

#[test]
fn test_non_object_data() {
    let err = signup_schema().validate(&Value::from("nope")).unwrap_err();
    assert_eq!(err, SchemaError::DataNotObject("string"));
}

#[test]
fn test_credit_card_in_schema() {
    let schema = Schema::new().field("card", credit_card);
    for (number, valid) in [
        ("4532015112830366", true),
        ("4111111111111111", true),
        ("1234567890123456", false),
    ] {
        let result = schema.validate(&Value::from(json!({ "card": number }))).unwrap();
        assert_eq!(result.is_valid, valid, "{}", number);
    }
}

#[test]
fn test_guard_config_from_toml_applies_limit() {
    let config = GuardConfig::from_toml_str("[validation]\nmax_input_length = 8").unwrap();
    let mut validator = Validator::new("aaaaaaaaa")
        .with_config(config)
        .pattern("^a+$", None)
        .unwrap();
    assert_eq!(
        validator.validate().errors,
        vec!["Input too long for pattern validation"]
    );
}
