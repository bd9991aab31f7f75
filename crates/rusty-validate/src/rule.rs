// File: src/rule.rs
// Purpose: Tagged rule variants and their evaluation

use crate::config::GuardConfig;
use crate::error::RegexError;
use crate::regex_guard;
use crate::result::ValidationResult;
use crate::schema::Schema;
use crate::validator::Validator;
use crate::value::{Measure, Value};
use regex::Regex;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub(crate) type CheckFn = Arc<dyn Fn(&Value) -> anyhow::Result<CustomOutcome> + Send + Sync>;
pub(crate) type AsyncCheckFn =
    Arc<dyn Fn(Value) -> BoxFuture<'static, anyhow::Result<CustomOutcome>> + Send + Sync>;
pub(crate) type TransformFn = Arc<dyn Fn(&Value) -> anyhow::Result<Value> + Send + Sync>;
pub(crate) type RawRuleFn = Arc<dyn Fn(&Value) -> anyhow::Result<ValidationResult> + Send + Sync>;
type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type FactoryFn = Arc<dyn Fn(Value) -> anyhow::Result<Validator> + Send + Sync>;

pub(crate) const INPUT_TOO_LONG: &str = "Input too long for pattern validation";
pub(crate) const PATTERN_TOO_COMPLEX: &str = "Pattern too complex: validation timed out";
pub(crate) const NOT_MEASURABLE: &str = "Value must be a string, array, or number";
pub(crate) const NOT_A_NUMBER: &str = "Value must be a number";
pub(crate) const NOT_AN_ARRAY: &str = "Value must be an array";
pub(crate) const NOT_AN_OBJECT: &str = "Value must be an object";

/// What a custom check can return
///
/// Closures return anything convertible into this: `bool`, a message,
/// a full [`ValidationResult`], `()` or an `Option<String>`.
#[derive(Debug, Clone, PartialEq)]
pub enum CustomOutcome {
    /// Pass or fail with the rule's message
    Valid(bool),
    /// Fail with this message
    Message(String),
    /// Used as-is
    Result(ValidationResult),
    /// No verdict, treated as passing
    Pass,
}

impl CustomOutcome {
    fn into_result(self, message: &str) -> ValidationResult {
        match self {
            CustomOutcome::Valid(true) | CustomOutcome::Pass => ValidationResult::success(),
            CustomOutcome::Valid(false) => ValidationResult::failure(message),
            CustomOutcome::Message(text) => ValidationResult::failure(text),
            CustomOutcome::Result(result) => result,
        }
    }
}

impl From<bool> for CustomOutcome {
    fn from(valid: bool) -> Self {
        CustomOutcome::Valid(valid)
    }
}

impl From<String> for CustomOutcome {
    fn from(message: String) -> Self {
        CustomOutcome::Message(message)
    }
}

impl From<&str> for CustomOutcome {
    fn from(message: &str) -> Self {
        CustomOutcome::Message(message.to_string())
    }
}

impl From<ValidationResult> for CustomOutcome {
    fn from(result: ValidationResult) -> Self {
        CustomOutcome::Result(result)
    }
}

impl From<()> for CustomOutcome {
    fn from(_: ()) -> Self {
        CustomOutcome::Pass
    }
}

impl From<Option<String>> for CustomOutcome {
    fn from(message: Option<String>) -> Self {
        message.map_or(CustomOutcome::Pass, CustomOutcome::Message)
    }
}

/// Gate for [`Validator::when`]
#[derive(Clone)]
pub enum Condition {
    Flag(bool),
    Predicate(PredicateFn),
}

impl Condition {
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Condition::Predicate(Arc::new(f))
    }

    fn holds(&self, value: &Value) -> bool {
        match self {
            Condition::Flag(flag) => *flag,
            Condition::Predicate(f) => f(value),
        }
    }
}

impl From<bool> for Condition {
    fn from(flag: bool) -> Self {
        Condition::Flag(flag)
    }
}

/// Anything a factory may return
pub trait IntoValidator {
    fn into_validator(self) -> anyhow::Result<Validator>;
}

impl IntoValidator for Validator {
    fn into_validator(self) -> anyhow::Result<Validator> {
        Ok(self)
    }
}

impl<E> IntoValidator for Result<Validator, E>
where
    E: Into<anyhow::Error>,
{
    fn into_validator(self) -> anyhow::Result<Validator> {
        self.map_err(Into::into)
    }
}

/// A prebuilt validator or a factory that builds one from a value
#[derive(Clone)]
pub enum ValidatorSource {
    Instance(Box<Validator>),
    Factory(FactoryFn),
}

impl ValidatorSource {
    pub fn factory<F, R>(f: F) -> Self
    where
        F: Fn(Value) -> R + Send + Sync + 'static,
        R: IntoValidator + 'static,
    {
        ValidatorSource::Factory(Arc::new(move |value: Value| f(value).into_validator()))
    }

    /// Factories get `value`; instances keep their own value
    pub(crate) fn resolve(&self, value: &Value) -> anyhow::Result<Validator> {
        match self {
            ValidatorSource::Instance(validator) => Ok(validator.as_ref().clone()),
            ValidatorSource::Factory(f) => f(value.clone()),
        }
    }

    /// Like `resolve`, but instances are re-pointed at `item`
    pub(crate) fn resolve_item(&self, item: &Value) -> anyhow::Result<Validator> {
        match self {
            ValidatorSource::Instance(validator) => {
                Ok(validator.as_ref().clone().with_value(item.clone()))
            }
            ValidatorSource::Factory(f) => f(item.clone()),
        }
    }
}

impl From<Validator> for ValidatorSource {
    fn from(validator: Validator) -> Self {
        ValidatorSource::Instance(Box::new(validator))
    }
}

#[derive(Clone)]
pub(crate) enum Rule {
    Required { message: String },
    Min { limit: f64, message: String },
    Max { limit: f64, message: String },
    Pattern { regex: Regex, message: String },
    Equals { expected: Value, message: String },
    OneOf { allowed: Vec<Value>, message: String },
    Between { low: f64, high: f64, message: String },
    Transform { map: TransformFn, message: String },
    Array { message: String },
    ArrayOf { source: ValidatorSource, message: String },
    Object { schema: Arc<Schema>, message: String },
    When { condition: Condition, source: ValidatorSource },
    Custom { check: CheckFn, message: String },
    Raw(RawRuleFn),
}

impl Rule {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Rule::Required { .. } => "required",
            Rule::Min { .. } => "min",
            Rule::Max { .. } => "max",
            Rule::Pattern { .. } => "pattern",
            Rule::Equals { .. } => "equals",
            Rule::OneOf { .. } => "one_of",
            Rule::Between { .. } => "between",
            Rule::Transform { .. } => "transform",
            Rule::Array { .. } => "array",
            Rule::ArrayOf { .. } => "array_of",
            Rule::Object { .. } => "object",
            Rule::When { .. } => "when",
            Rule::Custom { .. } => "custom",
            Rule::Raw(_) => "rule",
        }
    }

    /// Transforms run even when an optional value is blank
    pub(crate) fn skips_when_optional(&self) -> bool {
        !matches!(self, Rule::Transform { .. })
    }

    pub(crate) fn evaluate(
        &self,
        value: &mut Value,
        config: &GuardConfig,
    ) -> anyhow::Result<ValidationResult> {
        let result = match self {
            Rule::Required { message } => check(!value.is_blank(), message),
            Rule::Min { limit, message } => measured(value, message, |m| m >= *limit),
            Rule::Max { limit, message } => measured(value, message, |m| m <= *limit),
            Rule::Pattern { regex, message } => {
                if value.is_blank() {
                    return Ok(ValidationResult::success());
                }
                match regex_guard::test_sync(regex, &value.to_string(), config.max_input_length) {
                    Ok(matched) => check(matched, message),
                    Err(RegexError::InputTooLong { .. }) => ValidationResult::failure(INPUT_TOO_LONG),
                    Err(e) => return Err(e.into()),
                }
            }
            Rule::Equals { expected, message } => check(*value == *expected, message),
            Rule::OneOf { allowed, message } => check(allowed.contains(value), message),
            Rule::Between { low, high, message } => match value.to_number() {
                Some(n) => check(n >= *low && n <= *high, message),
                None => ValidationResult::failure(NOT_A_NUMBER),
            },
            Rule::Transform { map, message } => match map(value) {
                Ok(transformed) => {
                    *value = transformed;
                    ValidationResult::success()
                }
                Err(e) => ValidationResult::failure(format!("{}: {}", message, e)),
            },
            Rule::Array { message } => check(matches!(value, Value::Array(_)), message),
            Rule::ArrayOf { source, message } => {
                let Some(items) = value.as_array() else {
                    return Ok(ValidationResult::failure(NOT_AN_ARRAY));
                };
                let mut failures = Vec::new();
                for (index, item) in items.iter().enumerate() {
                    let outcome = match source.resolve_item(item) {
                        Ok(mut validator) => validator.validate(),
                        Err(e) => setup_failure(&e),
                    };
                    if !outcome.is_valid {
                        failures.push((index, outcome));
                    }
                }
                combine_items(failures, message)
            }
            Rule::Object { schema, message } => {
                if value.as_object().is_none() {
                    return Ok(ValidationResult::failure(NOT_AN_OBJECT));
                }
                let nested = schema.validate(value)?;
                collapse_nested(nested.is_valid, nested.into_errors(), message)
            }
            Rule::When { condition, source } => {
                if condition.holds(value) {
                    source.resolve(value)?.validate()
                } else {
                    ValidationResult::success()
                }
            }
            Rule::Custom { check: f, message } => match f(value) {
                Ok(outcome) => outcome.into_result(message),
                Err(e) => ValidationResult::failure(format!("Custom validation error: {}", e)),
            },
            Rule::Raw(f) => f(value)?,
        };
        Ok(result)
    }
}

#[derive(Clone)]
pub(crate) enum AsyncRule {
    Pattern { regex: Regex, message: String },
    Custom { check: AsyncCheckFn, message: String },
    ArrayOf { source: ValidatorSource, message: String },
    Object { schema: Arc<Schema>, message: String },
}

impl AsyncRule {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            AsyncRule::Pattern { .. } => "pattern_async",
            AsyncRule::Custom { .. } => "custom_async",
            AsyncRule::ArrayOf { .. } => "array_of_async",
            AsyncRule::Object { .. } => "object_async",
        }
    }

    pub(crate) async fn evaluate(
        &self,
        value: &Value,
        config: &GuardConfig,
    ) -> anyhow::Result<ValidationResult> {
        let result = match self {
            AsyncRule::Pattern { regex, message } => {
                if value.is_blank() {
                    return Ok(ValidationResult::success());
                }
                let text = value.to_string();
                let tested = regex_guard::test_async_with_limit(
                    regex,
                    &text,
                    config.regex_timeout(),
                    config.max_input_length,
                )
                .await;
                match tested {
                    Ok(matched) => check(matched, message),
                    Err(RegexError::InputTooLong { .. }) => ValidationResult::failure(INPUT_TOO_LONG),
                    Err(RegexError::Timeout(_)) => ValidationResult::failure(PATTERN_TOO_COMPLEX),
                    Err(e) => return Err(e.into()),
                }
            }
            AsyncRule::Custom { check: f, message } => match f(value.clone()).await {
                Ok(outcome) => outcome.into_result(message),
                Err(e) => ValidationResult::failure(format!("Async validation error: {}", e)),
            },
            AsyncRule::ArrayOf { source, message } => {
                let Some(items) = value.as_array() else {
                    return Ok(ValidationResult::failure(NOT_AN_ARRAY));
                };
                let mut failures = Vec::new();
                for (index, item) in items.iter().enumerate() {
                    let outcome = match source.resolve_item(item) {
                        Ok(mut validator) if validator.has_async_rules() => {
                            validator.validate_async().await
                        }
                        Ok(mut validator) => validator.validate(),
                        Err(e) => setup_failure(&e),
                    };
                    if !outcome.is_valid {
                        failures.push((index, outcome));
                    }
                }
                combine_items(failures, message)
            }
            AsyncRule::Object { schema, message } => {
                if value.as_object().is_none() {
                    return Ok(ValidationResult::failure(NOT_AN_OBJECT));
                }
                let nested = schema.validate_async(value).await?;
                collapse_nested(nested.is_valid, nested.into_errors(), message)
            }
        };
        Ok(result)
    }
}

fn check(passed: bool, message: &str) -> ValidationResult {
    if passed {
        ValidationResult::success()
    } else {
        ValidationResult::failure(message)
    }
}

/// Blank values pass; anything without a length or magnitude fails
fn measured(value: &Value, message: &str, within: impl Fn(f64) -> bool) -> ValidationResult {
    if value.is_blank() {
        return ValidationResult::success();
    }
    match value.measure() {
        Some(measure) => check(within(Measure::as_f64(measure)), message),
        None => ValidationResult::failure(NOT_MEASURABLE),
    }
}

pub(crate) fn setup_failure(error: &anyhow::Error) -> ValidationResult {
    ValidationResult::failure(format!("Validation setup error: {}", error))
}

/// "{message}: [1]: a, b; [3]: c"
fn combine_items(failures: Vec<(usize, ValidationResult)>, message: &str) -> ValidationResult {
    if failures.is_empty() {
        return ValidationResult::success();
    }
    let details: Vec<String> = failures
        .into_iter()
        .map(|(index, result)| format!("[{}]: {}", index, result.errors.join(", ")))
        .collect();
    ValidationResult::failure(format!("{}: {}", message, details.join("; ")))
}

fn collapse_nested(is_valid: bool, errors: Vec<String>, message: &str) -> ValidationResult {
    if is_valid {
        return ValidationResult::success();
    }
    if errors.is_empty() {
        return ValidationResult::failure(message);
    }
    ValidationResult::failure(format!("{}: {}", message, errors.join("; ")))
}
