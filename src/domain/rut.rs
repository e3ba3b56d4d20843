//! Chilean RUT value object.
//!
//! Accepts `12.345.678-5`, `12345678-5` or `123456785` and normalises to
//! `12345678-5` (uppercase `K`). The check digit is the usual modulo 11.

use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

use crate::errors::{AppError, AppResult};

static RUT_FORMAT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{1,2}(?:\.?\d{3}){2})-?([\dkK])$").expect("RUT regex is valid")
});

/// Validated, normalised RUT
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rut(String);

impl Rut {
    /// Parse and validate a RUT typed by a user.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let trimmed = raw.trim();
        let caps = RUT_FORMAT
            .captures(trimmed)
            .ok_or_else(|| AppError::validation("RUT con formato inválido"))?;

        let body: String = caps[1].chars().filter(char::is_ascii_digit).collect();
        let given = caps[2].to_ascii_uppercase();
        let number: u32 = body
            .parse()
            .map_err(|_| AppError::validation("RUT con formato inválido"))?;

        let expected = check_digit(number);
        if given.chars().next() != Some(expected) {
            return Err(AppError::validation("RUT con dígito verificador inválido"));
        }

        Ok(Self(format!("{}-{}", number, expected)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Rut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Modulo 11 check digit.
fn check_digit(mut number: u32) -> char {
    let mut sum = 0;
    let mut factor = 2;
    while number > 0 {
        sum += (number % 10) * factor;
        number /= 10;
        factor = if factor == 7 { 2 } else { factor + 1 };
    }
    match 11 - (sum % 11) {
        11 => '0',
        10 => 'K',
        d => char::from_digit(d, 10).unwrap_or('0'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_normalises_dots_and_case() {
        assert_eq!(Rut::parse("12.345.678-5").unwrap().as_str(), "12345678-5");
        assert_eq!(Rut::parse("123456785").unwrap().as_str(), "12345678-5");
        assert_eq!(Rut::parse(" 10.000.013-k ").unwrap().as_str(), "10000013-K");
    }

    #[test]
    fn test_seven_digit_body() {
        // 1.111.111: sum = 1*(2+3+4+5+6+7+2) = 29, 11 - 7 = 4
        assert_eq!(Rut::parse("1.111.111-4").unwrap().as_str(), "1111111-4");
    }

    #[test]
    fn test_wrong_check_digit_is_rejected() {
        let err = Rut::parse("12.345.678-9").unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.contains("verificador")));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(Rut::parse("abc").is_err());
        assert!(Rut::parse("").is_err());
        assert!(Rut::parse("12-345-678-5").is_err());
    }

    #[test]
    fn test_check_digit_values() {
        assert_eq!(check_digit(11_111_111), '1');
        assert_eq!(check_digit(12_345_678), '5');
        assert_eq!(check_digit(10_000_013), 'K');
    }
}
