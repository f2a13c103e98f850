//! Checksum-validated CNPJ (Brazilian tax-registration number) value type.
//!
//! A CNPJ is 14 digits; the last two are check digits computed with the
//! official mod-11 weighting. Formatting punctuation (`12.345.678/0001-90`)
//! is accepted on input and stripped; the canonical form is digits only.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Validated tax-registration number, stored as 14 digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "String", into = "String")]
#[schema(value_type = String, example = "11222333000181")]
pub struct Cnpj(String);

/// Errors raised when parsing a CNPJ.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CnpjError {
    /// Input did not contain exactly 14 digits.
    #[error("cnpj must contain exactly 14 digits")]
    Length,
    /// All digits are identical; valid checksum but rejected by convention.
    #[error("cnpj must not be a repeated single digit")]
    RepeatedDigits,
    /// Check digits did not match the mod-11 computation.
    #[error("cnpj check digits are invalid")]
    Checksum,
}

impl Cnpj {
    /// Parse a CNPJ, stripping punctuation and validating both check digits.
    pub fn parse(input: &str) -> Result<Self, CnpjError> {
        let digits: Vec<u8> = input
            .chars()
            .filter(char::is_ascii_digit)
            .filter_map(|c| c.to_digit(10).map(|d| d as u8))
            .collect();

        if digits.len() != 14 {
            return Err(CnpjError::Length);
        }
        if digits.iter().all(|&d| d == digits[0]) {
            return Err(CnpjError::RepeatedDigits);
        }

        let d1 = check_digit(&digits[..12]);
        let d2 = check_digit(&digits[..13]);
        if digits[12] != d1 || digits[13] != d2 {
            return Err(CnpjError::Checksum);
        }

        Ok(Self(digits.iter().map(|d| (b'0' + d) as char).collect()))
    }

    /// Canonical 14-digit representation.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Mod-11 check digit over a 12- or 13-digit prefix.
///
/// Weights start at `len - 7`, decrease to 2, then restart at 9.
fn check_digit(base: &[u8]) -> u8 {
    let mut weight = base.len() as u32 - 7;
    let mut sum: u32 = 0;
    for &digit in base {
        sum += u32::from(digit) * weight;
        weight = if weight == 2 { 9 } else { weight - 1 };
    }
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        (11 - remainder) as u8
    }
}

impl fmt::Display for Cnpj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Cnpj {
    type Error = CnpjError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Cnpj> for String {
    fn from(value: Cnpj) -> Self {
        value.0
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("11222333000181")]
    #[case("11.222.333/0001-81")]
    #[case("  11222333000181  ")]
    fn accepts_valid_cnpj(#[case] input: &str) {
        let cnpj = Cnpj::parse(input).expect("valid cnpj");
        assert_eq!(cnpj.as_str(), "11222333000181");
    }

    #[rstest]
    #[case("", CnpjError::Length)]
    #[case("123", CnpjError::Length)]
    #[case("112223330001811", CnpjError::Length)]
    #[case("00000000000000", CnpjError::RepeatedDigits)]
    #[case("11111111111111", CnpjError::RepeatedDigits)]
    #[case("11222333000182", CnpjError::Checksum)]
    #[case("11222333000171", CnpjError::Checksum)]
    fn rejects_invalid_cnpj(#[case] input: &str, #[case] expected: CnpjError) {
        let err = Cnpj::parse(input).expect_err("invalid cnpj must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn serde_round_trip_uses_canonical_digits() {
        let cnpj: Cnpj = serde_json::from_str("\"11.222.333/0001-81\"").expect("deserialize");
        assert_eq!(cnpj.as_str(), "11222333000181");
        let json = serde_json::to_string(&cnpj).expect("serialize");
        assert_eq!(json, "\"11222333000181\"");
    }

    #[test]
    fn serde_rejects_failing_checksum() {
        let result: Result<Cnpj, _> = serde_json::from_str("\"11222333000199\"");
        assert!(result.is_err());
    }
}
