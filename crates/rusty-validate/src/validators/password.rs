//! Password validation with configurable requirements

use crate::error::RegexError;
use crate::validator::Validator;
use crate::value::Value;
use serde::{Deserialize, Serialize};

pub(crate) const UPPERCASE_PATTERN: &str = r"[A-Z]";
pub(crate) const LOWERCASE_PATTERN: &str = r"[a-z]";
pub(crate) const NUMBER_PATTERN: &str = r"[0-9]";
pub(crate) const SPECIAL_PATTERN: &str = r#"[!@#$%^&*(),.?":{}|<>]"#;

/// Password requirements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordOptions {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_numbers: bool,
    pub require_special: bool,
}

impl Default for PasswordOptions {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_numbers: true,
            require_special: false,
        }
    }
}

impl PasswordOptions {
    /// 6+ characters, nothing else
    pub fn basic() -> Self {
        Self {
            min_length: 6,
            require_uppercase: false,
            require_lowercase: false,
            require_numbers: false,
            require_special: false,
        }
    }

    /// 8+ characters with uppercase, lowercase and a digit
    pub fn medium() -> Self {
        Self::default()
    }

    /// Medium plus a special character
    pub fn strong() -> Self {
        Self {
            require_special: true,
            ..Self::default()
        }
    }

    /// Parse a preset name
    ///
    /// # Examples
    /// ```
    /// use rusty_validate::validators::PasswordOptions;
    /// assert_eq!(PasswordOptions::parse("strong"), PasswordOptions::strong());
    /// assert_eq!(PasswordOptions::parse("unknown"), PasswordOptions::medium());
    /// ```
    pub fn parse(preset: &str) -> Self {
        match preset {
            "basic" => Self::basic(),
            "strong" => Self::strong(),
            _ => Self::medium(),
        }
    }
}

pub fn password(value: impl Into<Value>, options: PasswordOptions) -> Result<Validator, RegexError> {
    let min_message = format!("Password must be at least {} characters", options.min_length);
    let mut validator = Validator::new(value)
        .required(Some("Password is required"))
        .min(options.min_length as f64, Some(min_message.as_str()));

    let requirements = [
        (
            options.require_uppercase,
            UPPERCASE_PATTERN,
            "Password must contain at least one uppercase letter",
        ),
        (
            options.require_lowercase,
            LOWERCASE_PATTERN,
            "Password must contain at least one lowercase letter",
        ),
        (
            options.require_numbers,
            NUMBER_PATTERN,
            "Password must contain at least one number",
        ),
        (
            options.require_special,
            SPECIAL_PATTERN,
            "Password must contain at least one special character",
        ),
    ];
    for (enabled, pattern, message) in requirements {
        if enabled {
            validator = validator.pattern(pattern, Some(message))?;
        }
    }
    Ok(validator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_basic_password() {
        assert!(password("simple", PasswordOptions::basic()).unwrap().validate().is_valid);
        assert_eq!(
            password("short", PasswordOptions::basic()).unwrap().validate().errors,
            vec!["Password must be at least 6 characters"]
        );
    }

    #[test]
    fn test_medium_password() {
        let options = PasswordOptions::medium();
        assert!(password("Password123", options).unwrap().validate().is_valid);
        assert_eq!(
            password("lowercase1", options).unwrap().validate().errors,
            vec!["Password must contain at least one uppercase letter"]
        );
        assert_eq!(
            password("NoDigitsHere", options).unwrap().validate().errors,
            vec!["Password must contain at least one number"]
        );
    }

    #[test]
    fn test_strong_password() {
        let options = PasswordOptions::strong();
        assert!(password("Password123!", options).unwrap().validate().is_valid);
        assert_eq!(
            password("NoSpecial123", options).unwrap().validate().errors,
            vec!["Password must contain at least one special character"]
        );
    }

    #[test]
    fn test_failures_accumulate() {
        let result = password("abc", PasswordOptions::medium()).unwrap().validate();
        assert_eq!(
            result.errors,
            vec![
                "Password must be at least 8 characters",
                "Password must contain at least one uppercase letter",
                "Password must contain at least one number",
            ]
        );
    }

    #[test]
    fn test_options_from_toml() {
        let options: PasswordOptions = toml::from_str("min_length = 12\nrequire_special = true").unwrap();
        assert_eq!(options.min_length, 12);
        assert!(options.require_special);
        assert!(options.require_uppercase);
    }
}
