//! Chainable validator for a single value
//!
//! A [`Validator`] owns one [`Value`] and an ordered list of rules. Rules are
//! registered with builder methods and evaluated in registration order by
//! [`Validator::validate`]. Rules registered with the `*_async` builders form a
//! second phase that only [`Validator::validate_async`] runs, and only when the
//! synchronous phase passed.
//!
//! ```ignore
//! let mut validator = Validator::new("ada@example.com")
//!     .required(None)
//!     .max(254, None)
//!     .pattern(r"^[^\s@]+@[^\s@]+\.[^\s@]+$", Some("Invalid email format"))?;
//! assert!(validator.validate().is_valid);
//! ```

use crate::config::GuardConfig;
use crate::error::RegexError;
use crate::regex_guard;
use crate::result::ValidationResult;
use crate::rule::{
    AsyncCheckFn, AsyncRule, BoxFuture, Condition, CustomOutcome, Rule, ValidatorSource,
};
use crate::schema::Schema;
use crate::value::{format_number, Value};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

#[derive(Clone, Default)]
pub struct Validator {
    value: Value,
    rules: Vec<Rule>,
    async_rules: Vec<AsyncRule>,
    optional: bool,
    config: GuardConfig,
    field_name: Option<String>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("value", &self.value)
            .field("rules", &self.rules.iter().map(Rule::name).collect::<Vec<_>>())
            .field(
                "async_rules",
                &self.async_rules.iter().map(AsyncRule::name).collect::<Vec<_>>(),
            )
            .field("optional", &self.optional)
            .field("field_name", &self.field_name)
            .finish()
    }
}

impl Validator {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Same rules, different subject
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = value.into();
        self
    }

    /// Current value, including any transforms applied by earlier runs
    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn has_async_rules(&self) -> bool {
        !self.async_rules.is_empty()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn field_name(&self) -> Option<&str> {
        self.field_name.as_deref()
    }

    /// Prefix errors with the field name unless they already mention it
    pub fn set_field_name(mut self, name: impl Into<String>) -> Self {
        self.field_name = Some(name.into());
        self
    }

    /// Budget for async pattern rules, in milliseconds
    pub fn set_regex_timeout(mut self, timeout_ms: u64) -> Self {
        self.config.regex_timeout_ms = timeout_ms;
        self
    }

    pub fn regex_timeout(&self) -> u64 {
        self.config.regex_timeout_ms
    }

    pub fn with_config(mut self, config: GuardConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Skip every non-transform rule while the value is blank
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn required(mut self, message: Option<&str>) -> Self {
        self.rules.push(Rule::Required {
            message: message.unwrap_or("This field is required").to_string(),
        });
        self
    }

    /// Minimum length for strings and arrays, minimum magnitude for numbers
    pub fn min(mut self, limit: impl Into<f64>, message: Option<&str>) -> Self {
        let limit = limit.into();
        self.rules.push(Rule::Min {
            limit,
            message: message.map_or_else(
                || format!("Minimum length is {}", format_number(limit)),
                str::to_string,
            ),
        });
        self
    }

    /// Maximum length for strings and arrays, maximum magnitude for numbers
    pub fn max(mut self, limit: impl Into<f64>, message: Option<&str>) -> Self {
        let limit = limit.into();
        self.rules.push(Rule::Max {
            limit,
            message: message.map_or_else(
                || format!("Maximum length is {}", format_number(limit)),
                str::to_string,
            ),
        });
        self
    }

    /// Register a pattern rule. Unsafe or malformed patterns are refused here
    /// and never reach evaluation.
    pub fn pattern(mut self, pattern: &str, message: Option<&str>) -> Result<Self, RegexError> {
        let regex = regex_guard::compile_safe(pattern)?;
        self.rules.push(Rule::Pattern {
            regex,
            message: message.unwrap_or("Invalid format").to_string(),
        });
        Ok(self)
    }

    /// Pattern rule for the async phase, raced against the regex timeout
    pub fn pattern_async(
        mut self,
        pattern: &str,
        message: Option<&str>,
    ) -> Result<Self, RegexError> {
        let regex = regex_guard::compile_safe(pattern)?;
        self.async_rules.push(AsyncRule::Pattern {
            regex,
            message: message.unwrap_or("Invalid format").to_string(),
        });
        Ok(self)
    }

    pub fn equals(mut self, expected: impl Into<Value>, message: Option<&str>) -> Self {
        let expected = expected.into();
        self.rules.push(Rule::Equals {
            message: message.map_or_else(
                || format!("Value must equal {}", expected),
                str::to_string,
            ),
            expected,
        });
        self
    }

    pub fn one_of<I, V>(mut self, allowed: I, message: Option<&str>) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let allowed: Vec<Value> = allowed.into_iter().map(Into::into).collect();
        let listed: Vec<String> = allowed.iter().map(Value::to_string).collect();
        self.rules.push(Rule::OneOf {
            message: message.map_or_else(
                || format!("Value must be one of: {}", listed.join(", ")),
                str::to_string,
            ),
            allowed,
        });
        self
    }

    /// Inclusive numeric range; numeric strings are coerced
    pub fn between(
        mut self,
        low: impl Into<f64>,
        high: impl Into<f64>,
        message: Option<&str>,
    ) -> Self {
        let (low, high) = (low.into(), high.into());
        self.rules.push(Rule::Between {
            low,
            high,
            message: message.map_or_else(
                || {
                    format!(
                        "Value must be between {} and {}",
                        format_number(low),
                        format_number(high)
                    )
                },
                str::to_string,
            ),
        });
        self
    }

    /// Replace the value for every later rule and for later runs
    pub fn transform<F>(mut self, map: F, message: Option<&str>) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.rules.push(Rule::Transform {
            map: Arc::new(map),
            message: message.unwrap_or("Transform failed").to_string(),
        });
        self
    }

    pub fn array(mut self, message: Option<&str>) -> Self {
        self.rules.push(Rule::Array {
            message: message.unwrap_or(crate::rule::NOT_AN_ARRAY).to_string(),
        });
        self
    }

    /// Validate each element with a validator built from `source`
    pub fn array_of(mut self, source: impl Into<ValidatorSource>, message: Option<&str>) -> Self {
        self.rules.push(Rule::ArrayOf {
            source: source.into(),
            message: message.unwrap_or("Array item validation failed").to_string(),
        });
        self
    }

    /// Like [`array_of`](Self::array_of), running element validators' async phase
    pub fn array_of_async(
        mut self,
        source: impl Into<ValidatorSource>,
        message: Option<&str>,
    ) -> Self {
        self.async_rules.push(AsyncRule::ArrayOf {
            source: source.into(),
            message: message.unwrap_or("Array item validation failed").to_string(),
        });
        self
    }

    /// Validate an object value against a nested schema
    pub fn object(mut self, schema: Schema, message: Option<&str>) -> Self {
        self.rules.push(Rule::Object {
            schema: Arc::new(schema),
            message: message.unwrap_or("Object validation failed").to_string(),
        });
        self
    }

    pub fn object_async(mut self, schema: Schema, message: Option<&str>) -> Self {
        self.async_rules.push(AsyncRule::Object {
            schema: Arc::new(schema),
            message: message.unwrap_or("Object validation failed").to_string(),
        });
        self
    }

    /// Run the validator from `source` only while `condition` holds
    pub fn when(
        mut self,
        condition: impl Into<Condition>,
        source: impl Into<ValidatorSource>,
    ) -> Self {
        self.rules.push(Rule::When {
            condition: condition.into(),
            source: source.into(),
        });
        self
    }

    pub fn custom<F, O>(mut self, check: F, message: Option<&str>) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<O> + Send + Sync + 'static,
        O: Into<CustomOutcome> + 'static,
    {
        self.rules.push(Rule::Custom {
            check: Arc::new(move |value: &Value| {
                check(value).map(Into::<CustomOutcome>::into)
            }),
            message: message.unwrap_or("Custom validation failed").to_string(),
        });
        self
    }

    pub fn custom_async<F, Fut, O>(mut self, check: F, message: Option<&str>) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<O>> + Send + 'static,
        O: Into<CustomOutcome> + 'static,
    {
        let wrapped: AsyncCheckFn = Arc::new(
            move |value: Value| -> BoxFuture<'static, anyhow::Result<CustomOutcome>> {
                let pending = check(value);
                Box::pin(async move { pending.await.map(Into::<CustomOutcome>::into) })
            },
        );
        self.async_rules.push(AsyncRule::Custom {
            check: wrapped,
            message: message.unwrap_or("Async validation failed").to_string(),
        });
        self
    }

    /// Append a rule function that produces its own result
    pub fn rule<F>(mut self, rule: F) -> Self
    where
        F: Fn(&Value) -> anyhow::Result<ValidationResult> + Send + Sync + 'static,
    {
        self.rules.push(Rule::Raw(Arc::new(rule)));
        self
    }

    /// Run the synchronous rules
    pub fn validate(&mut self) -> ValidationResult {
        let result = self.run_rules();
        self.label(result)
    }

    /// Run the synchronous rules, then the async rules if nothing failed
    pub fn validate_async(&mut self) -> BoxFuture<'_, ValidationResult> {
        Box::pin(async move {
            let mut result = self.run_rules();
            if !result.is_valid {
                tracing::debug!(
                    field = ?self.field_name,
                    errors = result.errors.len(),
                    "Sync rules failed, skipping async rules"
                );
                return self.label(result);
            }

            let Self {
                value,
                async_rules,
                optional,
                config,
                ..
            } = &*self;
            for rule in async_rules {
                if *optional && value.is_blank() {
                    continue;
                }
                match rule.evaluate(value, config).await {
                    Ok(outcome) if !outcome.is_valid => {
                        result.merge(outcome);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!(rule = rule.name(), error = %e, "Async rule raised an error");
                        result.add_error(format!("Async validation error: {}", e));
                    }
                }
            }
            self.label(result)
        })
    }

    fn run_rules(&mut self) -> ValidationResult {
        let mut result = ValidationResult::success();
        let Self {
            value,
            rules,
            optional,
            config,
            ..
        } = &mut *self;

        for rule in rules.iter() {
            if *optional && value.is_blank() && rule.skips_when_optional() {
                continue;
            }
            match rule.evaluate(value, config) {
                Ok(outcome) if !outcome.is_valid => {
                    result.merge(outcome);
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(rule = rule.name(), error = %e, "Rule raised an error");
                    result.add_error(format!("Validation error: {}", e));
                }
            }
        }

        tracing::trace!(
            field = ?self.field_name,
            is_valid = result.is_valid,
            "Ran sync rules"
        );
        result
    }

    fn label(&self, mut result: ValidationResult) -> ValidationResult {
        if let Some(name) = &self.field_name {
            let needle = name.to_lowercase();
            for error in result.errors.iter_mut() {
                if !error.to_lowercase().contains(&needle) {
                    *error = format!("{}: {}", name, error);
                }
            }
        }
        result
    }
}
