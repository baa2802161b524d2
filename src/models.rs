use std::fmt;

use serde::{Deserialize, Serialize};

/// Minimum digit count for a usable phone number.
pub const MIN_DIGITS: usize = 10;

/// Sentinel returned when the name API has no record for a number.
pub const NAME_NOT_FOUND: &str = "Not Found";

/// Sentinel for intelligence fields the API did not provide.
pub const UNKNOWN: &str = "Unknown";

/// A normalized phone number: decimal digits only, at least [`MIN_DIGITS`] long.
///
/// No country-code canonicalization is applied, so `+91 98765 43210` and
/// `919876543210` normalize to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhoneNumber(String);

/// Input did not contain enough digits to form a phone number
#[derive(Debug, thiserror::Error)]
#[error("input has {digits} digits after stripping, need at least {MIN_DIGITS}")]
pub struct InvalidNumber {
    pub digits: usize,
}

impl PhoneNumber {
    /// Strip all non-digit characters and validate the remaining length.
    pub fn parse(input: &str) -> Result<Self, InvalidNumber> {
        let digits: String = input.chars().filter(char::is_ascii_digit).collect();

        if digits.len() < MIN_DIGITS {
            return Err(InvalidNumber {
                digits: digits.len(),
            });
        }

        Ok(Self(digits))
    }

    pub fn as_digits(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized result of one joined lookup across both external APIs.
///
/// Only `name` ever reaches the store; the rest is rendered and discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub name: String,
    pub carrier: String,
    pub location: String,
    pub country: String,
}

/// A labeled external deep link attached to a reply as an inline button
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkButton {
    pub label: String,
    pub url: String,
}

/// A fully rendered outbound message
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub links: Vec<LinkButton>,
}

impl Reply {
    /// A bare text reply with no action buttons
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_strips_formatting() {
        let number = PhoneNumber::parse("+91 98765 43210").unwrap();
        assert_eq!(number.as_digits(), "919876543210");

        let same = PhoneNumber::parse("91-9876-543-210").unwrap();
        assert_eq!(number, same);
    }

    #[test]
    fn test_parse_rejects_short_input() {
        let err = PhoneNumber::parse("12345").unwrap_err();
        assert_eq!(err.digits, 5);

        // Nine digits is one short
        assert!(PhoneNumber::parse("123 456 789").is_err());
        assert!(PhoneNumber::parse("hello").is_err());
    }

    #[test]
    fn test_parse_exactly_ten_digits() {
        let number = PhoneNumber::parse("9876543210").unwrap();
        assert_eq!(number.to_string(), "9876543210");
    }

    #[test]
    fn test_distinct_digit_sequences_stay_distinct() {
        let with_code = PhoneNumber::parse("+91 98765 43210").unwrap();
        let without_code = PhoneNumber::parse("98765 43210").unwrap();
        assert_ne!(with_code, without_code);
    }
}
