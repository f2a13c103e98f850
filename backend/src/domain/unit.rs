//! Unit (physical dwelling) entity and validated payloads.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A physical unit within a condominium.
///
/// number+block pairs are deliberately not unique; duplicates are tolerated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning condominium; immutable after creation.
    pub condo_id: Uuid,
    /// Unit number, e.g. `"101"`.
    pub number: String,
    /// Optional block/tower designation.
    pub block: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validation failures for unit payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitValidationError {
    /// Number was empty after trimming.
    #[error("unit number must not be empty")]
    EmptyNumber,
}

/// Validated creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUnit {
    condo_id: Uuid,
    number: String,
    block: Option<String>,
}

impl NewUnit {
    /// Validate raw inputs; `block` is trimmed and dropped when blank.
    pub fn try_new(
        condo_id: Uuid,
        number: &str,
        block: Option<&str>,
    ) -> Result<Self, UnitValidationError> {
        Ok(Self {
            condo_id,
            number: validate_number(number)?,
            block: normalize_block(block),
        })
    }

    /// Owning condominium id.
    pub fn condo_id(&self) -> Uuid {
        self.condo_id
    }

    /// Validated unit number.
    pub fn number(&self) -> &str {
        self.number.as_str()
    }

    /// Normalized block, when present.
    pub fn block(&self) -> Option<&str> {
        self.block.as_deref()
    }
}

/// Validated partial-update payload.
///
/// The condominium reference is immutable and therefore not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitPatch {
    /// Replacement number, when present.
    pub number: Option<String>,
    /// Replacement block, when present.
    pub block: Option<String>,
}

impl UnitPatch {
    /// Validate the fields present in a partial update.
    pub fn try_new(number: Option<&str>, block: Option<&str>) -> Result<Self, UnitValidationError> {
        Ok(Self {
            number: number.map(validate_number).transpose()?,
            block: normalize_block(block),
        })
    }
}

fn validate_number(number: &str) -> Result<String, UnitValidationError> {
    let trimmed = number.trim();
    if trimmed.is_empty() {
        return Err(UnitValidationError::EmptyNumber);
    }
    Ok(trimmed.to_owned())
}

fn normalize_block(block: Option<&str>) -> Option<String> {
    block
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("")]
    #[case("   ")]
    fn rejects_empty_numbers(#[case] number: &str) {
        let err = NewUnit::try_new(Uuid::new_v4(), number, None).expect_err("empty number");
        assert_eq!(err, UnitValidationError::EmptyNumber);
    }

    #[rstest]
    #[case(Some(""), None)]
    #[case(Some("   "), None)]
    #[case(Some(" A "), Some("A"))]
    #[case(None, None)]
    fn blank_blocks_are_dropped(#[case] block: Option<&str>, #[case] expected: Option<&str>) {
        let unit = NewUnit::try_new(Uuid::new_v4(), "101", block).expect("valid unit");
        assert_eq!(unit.block(), expected);
    }

    #[test]
    fn patch_keeps_absent_fields_absent() {
        let patch = UnitPatch::try_new(None, Some("B")).expect("valid patch");
        assert!(patch.number.is_none());
        assert_eq!(patch.block.as_deref(), Some("B"));
    }
}
