//! Prebuilt validators for common field formats
//!
//! Each function returns a [`Validator`] with its rules already registered,
//! so callers can keep chaining. They return `Result` only because pattern
//! registration is fallible; the built-in patterns all pass the safety gate.

pub mod card;
pub mod email;
pub mod password;
pub mod phone;
pub mod postal;

pub use card::{credit_card, luhn_check};
pub use email::{email, url};
pub use password::{password, PasswordOptions};
pub use phone::{phone, PhoneFormat};
pub use postal::{zip_code, Country};

use crate::error::RegexError;
use crate::validator::Validator;
use crate::value::Value;

pub(crate) const ALPHANUMERIC_PATTERN: &str = r"^[a-zA-Z0-9]+$";
pub(crate) const NUMERIC_PATTERN: &str = r"^[0-9]+$";

/// ASCII letters and digits only
pub fn alphanumeric(value: impl Into<Value>) -> Result<Validator, RegexError> {
    Validator::new(value)
        .required(Some("This field is required"))
        .pattern(ALPHANUMERIC_PATTERN, Some("Only letters and numbers are allowed"))
}

/// ASCII digits only
pub fn numeric(value: impl Into<Value>) -> Result<Validator, RegexError> {
    Validator::new(value)
        .required(Some("This field is required"))
        .pattern(NUMERIC_PATTERN, Some("Only numbers are allowed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regex_guard::is_pattern_safe;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ALPHANUMERIC_PATTERN)]
    #[case(NUMERIC_PATTERN)]
    #[case(email::EMAIL_PATTERN)]
    #[case(email::URL_PATTERN)]
    #[case(phone::US_PATTERN)]
    #[case(phone::INTERNATIONAL_PATTERN)]
    #[case(phone::SIMPLE_PATTERN)]
    #[case(postal::US_PATTERN)]
    #[case(postal::CA_PATTERN)]
    #[case(postal::UK_PATTERN)]
    #[case(password::UPPERCASE_PATTERN)]
    #[case(password::LOWERCASE_PATTERN)]
    #[case(password::NUMBER_PATTERN)]
    #[case(password::SPECIAL_PATTERN)]
    fn test_builtin_patterns_are_safe(#[case] pattern: &str) {
        assert!(is_pattern_safe(pattern), "{} flagged as unsafe", pattern);
    }

    #[test]
    fn test_alphanumeric() {
        assert!(alphanumeric("abc123").unwrap().validate().is_valid);
        assert_eq!(
            alphanumeric("abc-123").unwrap().validate().errors,
            vec!["Only letters and numbers are allowed"]
        );
        assert_eq!(
            alphanumeric("").unwrap().validate().errors,
            vec!["This field is required"]
        );
    }

    #[test]
    fn test_numeric() {
        assert!(numeric("12345").unwrap().validate().is_valid);
        assert!(numeric(42).unwrap().validate().is_valid);
        assert_eq!(
            numeric("12a").unwrap().validate().errors,
            vec!["Only numbers are allowed"]
        );
    }
}
