// File: src/validators/card.rs
// Purpose: Credit card number validator (length + Luhn checksum)

use crate::error::RegexError;
use crate::rule::CustomOutcome;
use crate::validator::Validator;
use crate::value::Value;

/// Luhn checksum over a string of ASCII digits
///
/// Empty input and any non-digit character make the check fail.
///
/// ```
/// use rusty_validate::validators::luhn_check;
/// assert!(luhn_check("4111111111111111"));
/// assert!(!luhn_check("4111111111111112"));
/// ```
pub fn luhn_check(digits: &str) -> bool {
    if digits.is_empty() {
        return false;
    }
    let mut sum = 0;
    for (position, c) in digits.chars().rev().enumerate() {
        let Some(mut digit) = c.to_digit(10) else {
            return false;
        };
        if position % 2 == 1 {
            digit *= 2;
            if digit > 9 {
                digit -= 9;
            }
        }
        sum += digit;
    }
    sum % 10 == 0
}

fn check_card_number(value: &Value) -> CustomOutcome {
    if value.is_blank() {
        return CustomOutcome::Pass;
    }

    let cleaned: String = value
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    if !(13..=19).contains(&cleaned.len()) || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return CustomOutcome::from("Credit card must be 13-19 digits");
    }
    if !luhn_check(&cleaned) {
        return CustomOutcome::from("Invalid credit card number");
    }
    CustomOutcome::Pass
}

pub fn credit_card(value: impl Into<Value>) -> Result<Validator, RegexError> {
    Ok(Validator::new(value)
        .required(Some("Credit card number is required"))
        .custom(|v| Ok(check_card_number(v)), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("4532015112830366")]
    #[case("4111111111111111")]
    #[case("4111 1111 1111 1111")]
    #[case("378282246310005")]
    fn test_valid_cards(#[case] input: &str) {
        assert!(credit_card(input).unwrap().validate().is_valid);
    }

    #[rstest]
    #[case("1234567890123456", "Invalid credit card number")]
    #[case("123456789012", "Credit card must be 13-19 digits")]
    #[case("12345678901234567890", "Credit card must be 13-19 digits")]
    #[case("4111-1111-1111-1111", "Credit card must be 13-19 digits")]
    fn test_invalid_cards(#[case] input: &str, #[case] message: &str) {
        assert_eq!(credit_card(input).unwrap().validate().errors, vec![message]);
    }

    #[test]
    fn test_card_required() {
        assert_eq!(
            credit_card("").unwrap().validate().errors,
            vec!["Credit card number is required"]
        );
    }

    #[test]
    fn test_optional_card() {
        assert!(credit_card("").unwrap().optional().validate().is_valid);
    }

    #[test]
    fn test_luhn_rejects_non_digits() {
        assert!(!luhn_check("41111111111111x1"));
        assert!(!luhn_check(""));
        assert!(luhn_check("0"));
    }
}
