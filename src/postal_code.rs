use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static FIVE_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{5}$").expect("valid regex"));

pub const DEFAULT_POSTAL_CODE: &str = "19129";

/// A validated 5-digit US postal code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PostalCode(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostalCodeError {
    input: String,
}

impl fmt::Display for PostalCodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not a 5-digit postal code", self.input)
    }
}

impl std::error::Error for PostalCodeError {}

impl PostalCode {
    /// Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self, PostalCodeError> {
        let trimmed = input.trim();
        if FIVE_DIGITS.is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(PostalCodeError {
                input: input.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PostalCode {
    fn default() -> Self {
        Self(DEFAULT_POSTAL_CODE.to_string())
    }
}

impl fmt::Display for PostalCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PostalCode {
    type Err = PostalCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_five_digits() {
        assert_eq!(PostalCode::parse("19129").unwrap().as_str(), "19129");
        assert_eq!(PostalCode::parse(" 19103\n").unwrap().as_str(), "19103");
    }

    #[test]
    fn rejects_everything_else() {
        for bad in ["", "1912", "191290", "19l29", "19129-1234", "abcde"] {
            assert!(PostalCode::parse(bad).is_err(), "{bad} should be rejected");
        }
        let err = PostalCode::parse("12").unwrap_err();
        assert_eq!(err.to_string(), "'12' is not a 5-digit postal code");
    }
}
