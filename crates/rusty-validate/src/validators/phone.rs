// File: src/validators/phone.rs
// Purpose: Phone number validator with selectable format

use crate::error::RegexError;
use crate::validator::Validator;
use crate::value::Value;

pub(crate) const US_PATTERN: &str =
    r"^\+?1?[-.\s]?\(?([0-9]{3})\)?[-.\s]?([0-9]{3})[-.\s]?([0-9]{4})$";
pub(crate) const INTERNATIONAL_PATTERN: &str = r"^\+[1-9][0-9]{1,14}$";
pub(crate) const SIMPLE_PATTERN: &str = r"^[0-9]{10,15}$";

/// Accepted phone number layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhoneFormat {
    /// North American numbers with optional `+1`, separators and parentheses
    #[default]
    Us,
    /// E.164: `+` then up to 15 digits
    International,
    /// 10 to 15 bare digits
    Simple,
}

impl PhoneFormat {
    /// Parse a format name; unknown names fall back to `Simple`
    pub fn parse(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "us" => PhoneFormat::Us,
            "international" => PhoneFormat::International,
            _ => PhoneFormat::Simple,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            PhoneFormat::Us => US_PATTERN,
            PhoneFormat::International => INTERNATIONAL_PATTERN,
            PhoneFormat::Simple => SIMPLE_PATTERN,
        }
    }
}

pub fn phone(value: impl Into<Value>, format: PhoneFormat) -> Result<Validator, RegexError> {
    Validator::new(value)
        .transform(|v| Ok(v.map_str(|s| s.trim().to_string())), None)
        .required(Some("Phone number is required"))
        .pattern(format.pattern(), Some("Invalid phone number format"))
}
