// File: src/schema.rs
// Purpose: Map field names to validators and validate whole records

use crate::error::SchemaError;
use crate::result::ValidationResult;
use crate::rule::{setup_failure, IntoValidator, ValidatorSource};
use crate::validator::Validator;
use crate::value::Value;
use serde::Serialize;
use std::collections::BTreeMap;

/// Field name to validator mapping
///
/// Fields are validated in the order they were added. A field missing from
/// the data is validated as [`Value::Null`].
#[derive(Clone, Default)]
pub struct Schema {
    fields: Vec<(String, ValidatorSource)>,
}

/// Per-field outcome of a schema run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchemaResult {
    pub is_valid: bool,
    pub results: Vec<(String, ValidationResult)>,
}

impl SchemaResult {
    pub fn field(&self, name: &str) -> Option<&ValidationResult> {
        self.results
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, result)| result)
    }

    pub fn results(&self) -> impl Iterator<Item = (&str, &ValidationResult)> {
        self.results
            .iter()
            .map(|(field, result)| (field.as_str(), result))
    }

    /// Errors of failing fields only
    pub fn errors_by_field(&self) -> BTreeMap<String, Vec<String>> {
        self.results
            .iter()
            .filter(|(_, result)| !result.is_valid)
            .map(|(field, result)| (field.clone(), result.errors.clone()))
            .collect()
    }

    /// Every error in field order
    pub fn into_errors(self) -> Vec<String> {
        self.results
            .into_iter()
            .flat_map(|(_, result)| result.errors)
            .collect()
    }
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field whose validator is built from the field's value
    pub fn field<F, R>(self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(Value) -> R + Send + Sync + 'static,
        R: IntoValidator + 'static,
    {
        self.source(name, ValidatorSource::factory(factory))
    }

    /// Add a field checked by a prebuilt validator, which keeps its own value
    pub fn validator(self, name: impl Into<String>, validator: Validator) -> Self {
        self.source(name, validator.into())
    }

    /// Add a field, replacing any earlier one with the same name
    pub fn source(mut self, name: impl Into<String>, source: ValidatorSource) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some(slot) => slot.1 = source,
            None => self.fields.push((name, source)),
        }
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// Run each field's synchronous rules
    pub fn validate(&self, data: &Value) -> Result<SchemaResult, SchemaError> {
        check_object(data)?;

        let results = self
            .fields
            .iter()
            .map(|(name, source)| {
                let result = match prepare(name, source, data) {
                    Ok(mut validator) => validator.validate(),
                    Err(e) => {
                        tracing::warn!(field = %name, error = %e, "Validator setup failed");
                        setup_failure(&e)
                    }
                };
                (name.clone(), result)
            })
            .collect();

        Ok(finish(results))
    }

    /// Run each field's full pipeline, async phase included where present
    pub async fn validate_async(&self, data: &Value) -> Result<SchemaResult, SchemaError> {
        check_object(data)?;

        let mut results = Vec::with_capacity(self.fields.len());
        for (name, source) in &self.fields {
            let result = match prepare(name, source, data) {
                Ok(mut validator) if validator.has_async_rules() => {
                    validator.validate_async().await
                }
                Ok(mut validator) => validator.validate(),
                Err(e) => {
                    tracing::warn!(field = %name, error = %e, "Validator setup failed");
                    setup_failure(&e)
                }
            };
            results.push((name.clone(), result));
        }

        Ok(finish(results))
    }
}

fn check_object(data: &Value) -> Result<(), SchemaError> {
    match data {
        Value::Object(_) => Ok(()),
        other => Err(SchemaError::DataNotObject(other.kind())),
    }
}

fn prepare(name: &str, source: &ValidatorSource, data: &Value) -> anyhow::Result<Validator> {
    let value = data.get(name).cloned().unwrap_or_default();
    Ok(source.resolve(&value)?.set_field_name(name))
}

fn finish(results: Vec<(String, ValidationResult)>) -> SchemaResult {
    let is_valid = results.iter().all(|(_, result)| result.is_valid);
    tracing::debug!(
        fields = results.len(),
        is_valid,
        "Schema validation finished"
    );
    SchemaResult { is_valid, results }
}
