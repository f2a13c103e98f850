//! Condominium entity and validated payloads.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::cnpj::{Cnpj, CnpjError};

/// A managed condominium; every other domain entity is scoped to one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condominium {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning tenant; a fixed placeholder in single-tenant deployments.
    pub tenant_id: String,
    /// Display name.
    pub name: String,
    /// Unique tax-registration number.
    pub cnpj: Cnpj,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Condominium plus child counts, as returned by list queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondominiumSummary {
    /// The condominium record.
    pub condominium: Condominium,
    /// Number of units registered under it.
    pub units: i64,
    /// Number of residents registered under it.
    pub residents: i64,
}

/// Validation failures for condominium payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CondominiumValidationError {
    /// Name shorter than two characters after trimming.
    #[error("name must be at least 2 characters")]
    NameTooShort,
    /// Tax-registration number failed parsing or checksum.
    #[error("invalid cnpj: {0}")]
    Cnpj(#[from] CnpjError),
}

/// Validated creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCondominium {
    name: String,
    cnpj: Cnpj,
}

impl NewCondominium {
    /// Validate raw name/cnpj inputs.
    pub fn try_new(name: &str, cnpj: &str) -> Result<Self, CondominiumValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            cnpj: Cnpj::parse(cnpj)?,
        })
    }

    /// Validated display name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Validated tax-registration number.
    pub fn cnpj(&self) -> &Cnpj {
        &self.cnpj
    }
}

/// Validated partial-update payload; `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CondominiumPatch {
    /// Replacement name, when present.
    pub name: Option<String>,
    /// Replacement tax-registration number, when present.
    pub cnpj: Option<Cnpj>,
}

impl CondominiumPatch {
    /// Validate the fields present in a partial update.
    pub fn try_new(
        name: Option<&str>,
        cnpj: Option<&str>,
    ) -> Result<Self, CondominiumValidationError> {
        Ok(Self {
            name: name.map(validate_name).transpose()?,
            cnpj: cnpj.map(Cnpj::parse).transpose()?,
        })
    }

    /// Whether the patch changes anything at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.cnpj.is_none()
    }
}

fn validate_name(name: &str) -> Result<String, CondominiumValidationError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(CondominiumValidationError::NameTooShort);
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "11222333000181")]
    #[case("A", "11222333000181")]
    #[case("  B ", "11222333000181")]
    fn rejects_short_names(#[case] name: &str, #[case] cnpj: &str) {
        let err = NewCondominium::try_new(name, cnpj).expect_err("short name must fail");
        assert_eq!(err, CondominiumValidationError::NameTooShort);
    }

    #[test]
    fn rejects_invalid_cnpj() {
        let err =
            NewCondominium::try_new("Residencial Aurora", "123").expect_err("bad cnpj must fail");
        assert!(matches!(err, CondominiumValidationError::Cnpj(_)));
    }

    #[test]
    fn accepts_and_trims_valid_payload() {
        let payload = NewCondominium::try_new("  Residencial Aurora  ", "11.222.333/0001-81")
            .expect("valid payload");
        assert_eq!(payload.name(), "Residencial Aurora");
        assert_eq!(payload.cnpj().as_str(), "11222333000181");
    }

    #[test]
    fn patch_validates_only_present_fields() {
        let patch = CondominiumPatch::try_new(Some("Novo Nome"), None).expect("valid patch");
        assert_eq!(patch.name.as_deref(), Some("Novo Nome"));
        assert!(patch.cnpj.is_none());
        assert!(!patch.is_empty());
        assert!(CondominiumPatch::default().is_empty());
    }
}
