// File: src/result.rs
// Purpose: Outcome of a single rule or a whole validator run

use serde::Serialize;

/// Result of validation with errors
///
/// `is_valid` and `errors` are tracked separately: a result can be forced
/// invalid while assembling it, but every failing result handed out by a rule
/// carries at least one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new(is_valid: bool, errors: Vec<String>) -> Self {
        Self { is_valid, errors }
    }

    /// Create a successful validation result
    pub fn success() -> Self {
        Self::new(true, Vec::new())
    }

    /// Create a failed validation result with a single message
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(false, vec![message.into()])
    }

    /// Append an error and mark the result invalid
    pub fn add_error(&mut self, message: impl Into<String>) -> &mut Self {
        self.errors.push(message.into());
        self.is_valid = false;
        self
    }

    /// Fold another result into this one, keeping error order
    pub fn merge(&mut self, other: ValidationResult) -> &mut Self {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Get the first error message, if any
    pub fn first_error(&self) -> Option<&str> {
        self.errors.first().map(String::as_str)
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::success()
    }
}
