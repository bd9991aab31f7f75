// File: src/validators/email.rs
// Purpose: Email address and URL validators

use crate::error::RegexError;
use crate::validator::Validator;
use crate::value::Value;

pub(crate) const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
pub(crate) const URL_PATTERN: &str = r"(?i)^(https?|ftp)://[^\s/$.?#].[^\s]*$";

/// Email address, trimmed and lowercased before checking
pub fn email(value: impl Into<Value>) -> Result<Validator, RegexError> {
    Validator::new(value)
        .transform(|v| Ok(v.map_str(|s| s.trim().to_lowercase())), None)
        .required(Some("Email is required"))
        .pattern(EMAIL_PATTERN, Some("Invalid email format"))
}

/// http, https or ftp URL
pub fn url(value: impl Into<Value>) -> Result<Validator, RegexError> {
    Validator::new(value)
        .required(Some("URL is required"))
        .pattern(URL_PATTERN, Some("Invalid URL format"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("user@example.com")]
    #[case("first.last+tag@sub.example.org")]
    fn test_valid_emails(#[case] input: &str) {
        assert!(email(input).unwrap().validate().is_valid);
    }

    #[rstest]
    #[case("invalid-email")]
    #[case("@example.com")]
    #[case("user@")]
    #[case("user name@example.com")]
    fn test_invalid_emails(#[case] input: &str) {
        assert_eq!(
            email(input).unwrap().validate().errors,
            vec!["Invalid email format"]
        );
    }

    #[test]
    fn test_email_normalizes() {
        let mut validator = email("  Ada@Example.COM ").unwrap();
        assert!(validator.validate().is_valid);
        assert_eq!(validator.value(), &Value::from("ada@example.com"));
    }

    #[test]
    fn test_email_required() {
        assert_eq!(email("   ").unwrap().validate().errors, vec!["Email is required"]);
    }

    #[rstest]
    #[case("https://example.com", true)]
    #[case("HTTP://EXAMPLE.COM/path?q=1", true)]
    #[case("ftp://files.example.com", true)]
    #[case("example.com", false)]
    #[case("mailto:someone@example.com", false)]
    fn test_url(#[case] input: &str, #[case] valid: bool) {
        assert_eq!(url(input).unwrap().validate().is_valid, valid);
    }
}
