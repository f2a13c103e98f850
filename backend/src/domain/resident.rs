//! Resident entity and validated payloads.
//!
//! The unit link is governed by the occupancy rules in
//! [`crate::domain::occupancy`]; this module only validates field shapes.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A person registered in a condominium, optionally linked to one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resident {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning condominium.
    pub condo_id: Uuid,
    /// Linked unit, if any. At most one resident may hold a given unit.
    pub unit_id: Option<Uuid>,
    /// Full name.
    pub name: String,
    /// Globally unique contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Validation failures for resident payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResidentValidationError {
    /// Name shorter than two characters after trimming.
    #[error("name must be at least 2 characters")]
    NameTooShort,
    /// Email not shaped like an address.
    #[error("email must be a valid address")]
    InvalidEmail,
    /// Phone shorter than eight characters after trimming.
    #[error("phone must be at least 8 characters")]
    PhoneTooShort,
}

/// Validated creation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResident {
    condo_id: Uuid,
    unit_id: Option<Uuid>,
    name: String,
    email: String,
    phone: String,
}

impl NewResident {
    /// Validate raw inputs for a new resident.
    pub fn try_new(
        condo_id: Uuid,
        unit_id: Option<Uuid>,
        name: &str,
        email: &str,
        phone: &str,
    ) -> Result<Self, ResidentValidationError> {
        Ok(Self {
            condo_id,
            unit_id,
            name: validate_name(name)?,
            email: validate_email(email)?,
            phone: validate_phone(phone)?,
        })
    }

    /// Owning condominium id.
    pub fn condo_id(&self) -> Uuid {
        self.condo_id
    }

    /// Requested unit link, if any.
    pub fn unit_id(&self) -> Option<Uuid> {
        self.unit_id
    }

    /// Validated name.
    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    /// Validated email.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Validated phone.
    pub fn phone(&self) -> &str {
        self.phone.as_str()
    }
}

/// Validated partial-update payload.
///
/// `unit_id` is tri-state: `None` leaves the link untouched, `Some(None)`
/// unlinks, `Some(Some(id))` relinks (subject to occupancy checks).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidentPatch {
    /// Replacement name, when present.
    pub name: Option<String>,
    /// Replacement email, when present.
    pub email: Option<String>,
    /// Replacement phone, when present.
    pub phone: Option<String>,
    /// Replacement condominium, when present.
    pub condo_id: Option<Uuid>,
    /// Unit-link change, when present.
    pub unit_id: Option<Option<Uuid>>,
}

impl ResidentPatch {
    /// Validate the fields present in a partial update.
    pub fn try_new(
        name: Option<&str>,
        email: Option<&str>,
        phone: Option<&str>,
        condo_id: Option<Uuid>,
        unit_id: Option<Option<Uuid>>,
    ) -> Result<Self, ResidentValidationError> {
        Ok(Self {
            name: name.map(validate_name).transpose()?,
            email: email.map(validate_email).transpose()?,
            phone: phone.map(validate_phone).transpose()?,
            condo_id,
            unit_id,
        })
    }
}

fn validate_name(name: &str) -> Result<String, ResidentValidationError> {
    let trimmed = name.trim();
    if trimmed.chars().count() < 2 {
        return Err(ResidentValidationError::NameTooShort);
    }
    Ok(trimmed.to_owned())
}

fn validate_email(email: &str) -> Result<String, ResidentValidationError> {
    let trimmed = email.trim();
    let Some((local, domain)) = trimmed.split_once('@') else {
        return Err(ResidentValidationError::InvalidEmail);
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ResidentValidationError::InvalidEmail);
    }
    Ok(trimmed.to_owned())
}

fn validate_phone(phone: &str) -> Result<String, ResidentValidationError> {
    let trimmed = phone.trim();
    if trimmed.chars().count() < 8 {
        return Err(ResidentValidationError::PhoneTooShort);
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("J", "joao@ex.com", "11999999999", ResidentValidationError::NameTooShort)]
    #[case("João Silva", "joao", "11999999999", ResidentValidationError::InvalidEmail)]
    #[case("João Silva", "joao@ex", "11999999999", ResidentValidationError::InvalidEmail)]
    #[case("João Silva", "joao@ex.com", "123", ResidentValidationError::PhoneTooShort)]
    fn rejects_invalid_fields(
        #[case] name: &str,
        #[case] email: &str,
        #[case] phone: &str,
        #[case] expected: ResidentValidationError,
    ) {
        let err = NewResident::try_new(Uuid::new_v4(), None, name, email, phone)
            .expect_err("invalid payload must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn accepts_valid_payload_with_unit() {
        let unit_id = Uuid::new_v4();
        let resident = NewResident::try_new(
            Uuid::new_v4(),
            Some(unit_id),
            " João Silva ",
            "joao@ex.com",
            "11999999999",
        )
        .expect("valid payload");
        assert_eq!(resident.name(), "João Silva");
        assert_eq!(resident.unit_id(), Some(unit_id));
    }

    #[test]
    fn patch_tri_state_unit_link() {
        let relink = ResidentPatch::try_new(None, None, None, None, Some(Some(Uuid::new_v4())))
            .expect("valid patch");
        assert!(matches!(relink.unit_id, Some(Some(_))));

        let unlink = ResidentPatch::try_new(None, None, None, None, Some(None)).expect("valid");
        assert_eq!(unlink.unit_id, Some(None));

        let untouched = ResidentPatch::try_new(Some("Maria"), None, None, None, None).expect("ok");
        assert!(untouched.unit_id.is_none());
    }
}
