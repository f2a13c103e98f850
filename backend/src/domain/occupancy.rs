//! Occupancy consistency rules for resident/unit links.
//!
//! Two invariants are enforced here: a unit has at most one linked resident
//! at any instant, and a resident's linked unit belongs to the resident's
//! condominium. Both the create and the update path funnel through
//! [`OccupancyService::ensure_unit_free`].
//!
//! The in-service occupant lookup is a fast path for friendly errors only;
//! the unique index on `residents.unit_id` remains the authoritative guard,
//! and adapters surface its violation as
//! [`ResidentRepositoryError::UnitOccupied`] so concurrent writers racing
//! past the pre-check still collapse into the same conflict.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    ResidentRepository, ResidentRepositoryError, UnitRepository, UnitRepositoryError,
};
use crate::domain::{DomainError, NewResident, Resident, ResidentPatch};

/// Domain service guarding resident/unit links.
#[derive(Clone)]
pub struct OccupancyService {
    units: Arc<dyn UnitRepository>,
    residents: Arc<dyn ResidentRepository>,
}

impl OccupancyService {
    /// Create a service over the given repositories.
    pub fn new(units: Arc<dyn UnitRepository>, residents: Arc<dyn ResidentRepository>) -> Self {
        Self { units, residents }
    }

    /// Create a resident, checking the unit link when one is requested.
    pub async fn create_resident(&self, payload: &NewResident) -> Result<Resident, DomainError> {
        if let Some(unit_id) = payload.unit_id() {
            self.ensure_unit_free(unit_id, payload.condo_id(), None)
                .await?;
        }
        self.residents
            .create(payload)
            .await
            .map_err(map_resident_error)
    }

    /// Update a resident, re-checking the unit link when the patch relinks.
    ///
    /// The resident's own row is excluded from the occupant lookup so a
    /// re-save does not detect itself as the conflicting occupant.
    /// Unlinking (`unit_id` patched to null) never runs the checks.
    pub async fn update_resident(
        &self,
        id: Uuid,
        patch: &ResidentPatch,
    ) -> Result<Resident, DomainError> {
        let existing = self
            .residents
            .find(id)
            .await
            .map_err(map_resident_error)?
            .ok_or_else(resident_not_found)?;

        if let Some(Some(unit_id)) = patch.unit_id {
            let condo_id = patch.condo_id.unwrap_or(existing.condo_id);
            self.ensure_unit_free(unit_id, condo_id, Some(id)).await?;
        }

        self.residents
            .update(id, patch)
            .await
            .map_err(map_resident_error)?
            .ok_or_else(resident_not_found)
    }

    /// Delete a resident.
    pub async fn delete_resident(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self
            .residents
            .delete(id)
            .await
            .map_err(map_resident_error)?;
        if deleted { Ok(()) } else { Err(resident_not_found()) }
    }

    /// Verify that `unit_id` exists, belongs to `condo_id`, and has no
    /// occupant other than `exclude`.
    pub async fn ensure_unit_free(
        &self,
        unit_id: Uuid,
        condo_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<(), DomainError> {
        let unit = self.units.find(unit_id).await.map_err(map_unit_error)?;
        let valid = unit.is_some_and(|u| u.condo_id == condo_id);
        if !valid {
            return Err(DomainError::invalid_request(
                "invalid unit for this condominium",
            )
            .with_details(json!({ "field": "unitId", "code": "unit_not_in_condo" })));
        }

        let occupant = self
            .residents
            .find_by_unit(unit_id, exclude)
            .await
            .map_err(map_resident_error)?;
        if occupant.is_some() {
            return Err(unit_occupied());
        }
        Ok(())
    }
}

fn resident_not_found() -> DomainError {
    DomainError::not_found("resident not found")
}

fn unit_occupied() -> DomainError {
    DomainError::conflict("unit already has a resident")
        .with_details(json!({ "code": "unit_occupied" }))
}

/// Map resident persistence failures to domain errors, preserving the
/// precise conflict reason recovered from the store's constraint identity.
pub(crate) fn map_resident_error(error: ResidentRepositoryError) -> DomainError {
    match error {
        ResidentRepositoryError::Connection { message } => {
            DomainError::service_unavailable(message)
        }
        ResidentRepositoryError::Query { message } => DomainError::internal(message),
        ResidentRepositoryError::EmailInUse => DomainError::conflict("email is already in use")
            .with_details(json!({ "field": "email", "code": "email_in_use" })),
        ResidentRepositoryError::UnitOccupied => unit_occupied(),
    }
}

/// Map unit persistence failures to domain errors.
pub(crate) fn map_unit_error(error: UnitRepositoryError) -> DomainError {
    match error {
        UnitRepositoryError::Connection { message } => DomainError::service_unavailable(message),
        UnitRepositoryError::Query { message } => DomainError::internal(message),
    }
}
