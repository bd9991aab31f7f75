// File: src/validators/postal.rs
// Purpose: Postal code validator by country

use crate::error::RegexError;
use crate::validator::Validator;
use crate::value::Value;

pub(crate) const US_PATTERN: &str = r"^[0-9]{5}(-[0-9]{4})?$";
pub(crate) const CA_PATTERN: &str = r"^[A-Za-z][0-9][A-Za-z][ -]?[0-9][A-Za-z][0-9]$";
pub(crate) const UK_PATTERN: &str = r"(?i)^[A-Z]{1,2}[0-9][A-Z0-9]? ?[0-9][A-Z]{2}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Country {
    #[default]
    Us,
    Ca,
    Uk,
}

impl Country {
    /// Parse a country code; unknown codes fall back to `Us`
    pub fn parse(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "ca" => Country::Ca,
            "uk" => Country::Uk,
            _ => Country::Us,
        }
    }

    fn pattern(self) -> &'static str {
        match self {
            Country::Us => US_PATTERN,
            Country::Ca => CA_PATTERN,
            Country::Uk => UK_PATTERN,
        }
    }
}

pub fn zip_code(value: impl Into<Value>, country: Country) -> Result<Validator, RegexError> {
    Validator::new(value)
        .required(Some("Zip code is required"))
        .pattern(country.pattern(), Some("Invalid zip code format"))
}
