// rusty-validate - chainable field validation
// Ordered sync/async rule chains with ReDoS-guarded pattern matching

pub mod config;
pub mod error;
pub mod regex_guard;
pub mod result;
pub mod value;

// Rule engine
pub mod rule;
pub mod schema;
pub mod validator;

// Prebuilt field validators
pub mod validators;

// Re-export core types
pub use config::GuardConfig;
pub use error::{ConfigError, RegexError, SchemaError};
pub use result::ValidationResult;
pub use rule::{BoxFuture, Condition, CustomOutcome, IntoValidator, ValidatorSource};
pub use schema::{Schema, SchemaResult};
pub use validator::Validator;
pub use value::{Measure, Value};

// Re-export prebuilt validators
pub use validators::{
    alphanumeric, credit_card, email, luhn_check, numeric, password, phone, url, zip_code,
    Country, PasswordOptions, PhoneFormat,
};
