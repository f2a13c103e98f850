//! Visitor lifecycle operations over the repository ports.
//!
//! The state machine itself lives on [`VisitorEntry`]; this service loads
//! the entry, applies a transition, and persists the result, translating
//! port and transition failures into transport-agnostic domain errors.

use std::sync::Arc;

use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{
    Clock, CondominiumRepository, CondominiumRepositoryError, UnitRepository, VisitorQuery,
    VisitorRepository, VisitorRepositoryError,
};
use crate::domain::{
    DomainError, NewVisitorEntry, TransitionError, VisitorEntry, VisitorPatch,
    occupancy::map_unit_error,
};

/// Domain service driving visitor entries through their lifecycle.
#[derive(Clone)]
pub struct VisitorService {
    visitors: Arc<dyn VisitorRepository>,
    condos: Arc<dyn CondominiumRepository>,
    units: Arc<dyn UnitRepository>,
    clock: Arc<dyn Clock>,
}

impl VisitorService {
    /// Create a service over the given ports.
    pub fn new(
        visitors: Arc<dyn VisitorRepository>,
        condos: Arc<dyn CondominiumRepository>,
        units: Arc<dyn UnitRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            visitors,
            condos,
            units,
            clock,
        }
    }

    /// List entries matching the query.
    pub async fn list(&self, query: &VisitorQuery) -> Result<(Vec<VisitorEntry>, i64), DomainError> {
        self.visitors.list(query).await.map_err(map_visitor_error)
    }

    /// Fetch one entry.
    pub async fn get(&self, id: Uuid) -> Result<VisitorEntry, DomainError> {
        self.load(id).await
    }

    /// Register a check-in request; the entry starts `Pending`.
    pub async fn create(&self, payload: NewVisitorEntry) -> Result<VisitorEntry, DomainError> {
        let condo = self
            .condos
            .find(payload.condo_id())
            .await
            .map_err(map_condo_error)?;
        if condo.is_none() {
            return Err(DomainError::not_found("condominium not found"));
        }

        if let Some(unit_id) = payload.unit_id() {
            self.ensure_unit_in_condo(unit_id, payload.condo_id()).await?;
        }

        let entry = payload.into_entry(Uuid::new_v4(), self.clock.now());
        self.visitors
            .create(&entry)
            .await
            .map_err(map_visitor_error)
    }

    /// Approve a pending entry, recording who approved it.
    pub async fn approve(&self, id: Uuid, approved_by: &str) -> Result<VisitorEntry, DomainError> {
        let mut entry = self.load(id).await?;
        entry
            .approve(self.clock.now(), approved_by)
            .map_err(map_transition_error)?;
        self.persist(entry).await
    }

    /// Reject a pending entry with an optional free-text reason.
    pub async fn reject(
        &self,
        id: Uuid,
        reason: Option<String>,
    ) -> Result<VisitorEntry, DomainError> {
        let mut entry = self.load(id).await?;
        entry.reject(reason).map_err(map_transition_error)?;
        self.persist(entry).await
    }

    /// Close out an entry, stamping the departure time exactly once.
    pub async fn checkout(&self, id: Uuid) -> Result<VisitorEntry, DomainError> {
        let mut entry = self.load(id).await?;
        entry
            .checkout(self.clock.now())
            .map_err(map_transition_error)?;
        self.persist(entry).await
    }

    /// Mark an approved delivery as handed to the resident.
    pub async fn handoff(&self, id: Uuid) -> Result<VisitorEntry, DomainError> {
        let mut entry = self.load(id).await?;
        entry.handoff().map_err(map_transition_error)?;
        self.persist(entry).await
    }

    /// Patch identification/schedule fields; lifecycle status is untouched.
    pub async fn update(&self, id: Uuid, patch: &VisitorPatch) -> Result<VisitorEntry, DomainError> {
        let mut entry = self.load(id).await?;
        if let Some(Some(unit_id)) = patch.unit_id {
            self.ensure_unit_in_condo(unit_id, entry.condo_id).await?;
        }
        patch.apply(&mut entry);
        self.persist(entry).await
    }

    /// Delete an entry.
    pub async fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let deleted = self.visitors.delete(id).await.map_err(map_visitor_error)?;
        if deleted { Ok(()) } else { Err(entry_not_found()) }
    }

    async fn load(&self, id: Uuid) -> Result<VisitorEntry, DomainError> {
        self.visitors
            .find(id)
            .await
            .map_err(map_visitor_error)?
            .ok_or_else(entry_not_found)
    }

    async fn persist(&self, entry: VisitorEntry) -> Result<VisitorEntry, DomainError> {
        let updated = self
            .visitors
            .update(&entry)
            .await
            .map_err(map_visitor_error)?;
        if updated { Ok(entry) } else { Err(entry_not_found()) }
    }

    async fn ensure_unit_in_condo(&self, unit_id: Uuid, condo_id: Uuid) -> Result<(), DomainError> {
        let unit = self.units.find(unit_id).await.map_err(map_unit_error)?;
        if unit.is_some_and(|u| u.condo_id == condo_id) {
            Ok(())
        } else {
            Err(
                DomainError::invalid_request("invalid unit for this condominium")
                    .with_details(json!({ "field": "unitId", "code": "unit_not_in_condo" })),
            )
        }
    }
}

fn entry_not_found() -> DomainError {
    DomainError::not_found("visitor entry not found")
}

fn map_visitor_error(error: VisitorRepositoryError) -> DomainError {
    match error {
        VisitorRepositoryError::Connection { message } => DomainError::service_unavailable(message),
        VisitorRepositoryError::Query { message } => DomainError::internal(message),
    }
}

pub(crate) fn map_condo_error(error: CondominiumRepositoryError) -> DomainError {
    match error {
        CondominiumRepositoryError::Connection { message } => {
            DomainError::service_unavailable(message)
        }
        CondominiumRepositoryError::Query { message } => DomainError::internal(message),
        CondominiumRepositoryError::CnpjInUse => DomainError::conflict("cnpj is already in use")
            .with_details(json!({ "field": "cnpj", "code": "cnpj_in_use" })),
    }
}

fn map_transition_error(error: TransitionError) -> DomainError {
    DomainError::conflict(error.to_string())
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the lifecycle service over in-memory ports.
    use super::*;
    use crate::domain::ports::{
        CondominiumRepository, FixtureClock, FixtureCondominiumRepository, FixtureUnitRepository,
        FixtureVisitorRepository, UnitRepository,
    };
    use crate::domain::{
        Condominium, ErrorCode, NewCondominium, NewUnit, VisitorIdentification, VisitorKind,
        VisitorStatus,
    };
    use chrono::{TimeZone, Utc};

    struct Harness {
        service: VisitorService,
        condo: Condominium,
        unit_id: Uuid,
    }

    async fn harness() -> Harness {
        let condos = Arc::new(FixtureCondominiumRepository::default());
        let condo = condos
            .create(
                "default",
                &NewCondominium::try_new("Residencial Aurora", "11222333000181")
                    .expect("valid condo"),
            )
            .await
            .expect("create condo");
        let units = Arc::new(FixtureUnitRepository::default());
        let unit = units
            .create(&NewUnit::try_new(condo.id, "101", Some("A")).expect("valid unit"))
            .await
            .expect("create unit");
        let clock = Arc::new(FixtureClock(
            Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).single().expect("valid instant"),
        ));
        let service = VisitorService::new(
            Arc::new(FixtureVisitorRepository::default()),
            condos,
            units,
            clock,
        );
        Harness {
            service,
            condo,
            unit_id: unit.id,
        }
    }

    fn check_in(h: &Harness, kind: VisitorKind) -> NewVisitorEntry {
        NewVisitorEntry::try_new(
            h.condo.id,
            Some(h.unit_id),
            Some(kind),
            "Maria Souza",
            VisitorIdentification::default(),
            Some("Sedex"),
            Some(2),
            None,
            None,
        )
        .expect("valid payload")
    }

    #[tokio::test]
    async fn create_starts_pending_with_clock_time() {
        let h = harness().await;
        let entry = h
            .service
            .create(check_in(&h, VisitorKind::Visitor))
            .await
            .expect("create entry");
        assert_eq!(entry.status, VisitorStatus::Pending);
        assert_eq!(
            entry.check_in_at,
            Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).single().expect("valid instant")
        );
    }

    #[tokio::test]
    async fn create_rejects_unknown_condo() {
        let h = harness().await;
        let payload = NewVisitorEntry::try_new(
            Uuid::new_v4(),
            None,
            None,
            "Maria",
            VisitorIdentification::default(),
            None,
            None,
            None,
            None,
        )
        .expect("valid payload");
        let err = h.service.create(payload).await.expect_err("unknown condo");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn create_rejects_unit_from_another_condo() {
        let h = harness().await;
        let foreign_unit = NewVisitorEntry::try_new(
            h.condo.id,
            Some(Uuid::new_v4()),
            None,
            "Maria",
            VisitorIdentification::default(),
            None,
            None,
            None,
            None,
        )
        .expect("valid payload");
        let err = h
            .service
            .create(foreign_unit)
            .await
            .expect_err("foreign unit");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn approve_then_approve_again_conflicts() {
        let h = harness().await;
        let entry = h
            .service
            .create(check_in(&h, VisitorKind::Visitor))
            .await
            .expect("create entry");

        let approved = h
            .service
            .approve(entry.id, "admin-1")
            .await
            .expect("approve pending entry");
        assert_eq!(approved.status, VisitorStatus::Approved);
        assert_eq!(approved.approved_by.as_deref(), Some("admin-1"));

        let err = h
            .service
            .approve(entry.id, "admin-1")
            .await
            .expect_err("second approve must conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn reject_stores_trimmed_reason() {
        let h = harness().await;
        let entry = h
            .service
            .create(check_in(&h, VisitorKind::Visitor))
            .await
            .expect("create entry");
        let rejected = h
            .service
            .reject(entry.id, Some("  unexpected visit  ".to_owned()))
            .await
            .expect("reject pending entry");
        assert_eq!(rejected.status, VisitorStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("unexpected visit"));
    }

    #[tokio::test]
    async fn checkout_twice_conflicts() {
        let h = harness().await;
        let entry = h
            .service
            .create(check_in(&h, VisitorKind::Visitor))
            .await
            .expect("create entry");
        let out = h.service.checkout(entry.id).await.expect("first checkout");
        assert_eq!(out.status, VisitorStatus::CheckedOut);
        assert!(out.check_out_at.is_some());

        let err = h
            .service
            .checkout(entry.id)
            .await
            .expect_err("second checkout must conflict");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn rejected_entries_can_still_check_out() {
        let h = harness().await;
        let entry = h
            .service
            .create(check_in(&h, VisitorKind::Visitor))
            .await
            .expect("create entry");
        h.service
            .reject(entry.id, None)
            .await
            .expect("reject entry");
        let out = h
            .service
            .checkout(entry.id)
            .await
            .expect("rejected entries close out via checkout");
        assert_eq!(out.status, VisitorStatus::CheckedOut);
    }

    #[tokio::test]
    async fn handoff_requires_approved_delivery() {
        let h = harness().await;
        let delivery = h
            .service
            .create(check_in(&h, VisitorKind::Delivery))
            .await
            .expect("create delivery");

        let err = h
            .service
            .handoff(delivery.id)
            .await
            .expect_err("pending delivery cannot hand off");
        assert_eq!(err.code(), ErrorCode::Conflict);

        h.service
            .approve(delivery.id, "admin-1")
            .await
            .expect("approve delivery");
        let handed = h
            .service
            .handoff(delivery.id)
            .await
            .expect("approved delivery hands off");
        assert!(handed.handed_off);
        assert_eq!(handed.status, VisitorStatus::Approved);

        let visitor = h
            .service
            .create(check_in(&h, VisitorKind::Visitor))
            .await
            .expect("create visitor");
        h.service
            .approve(visitor.id, "admin-1")
            .await
            .expect("approve visitor");
        let err = h
            .service
            .handoff(visitor.id)
            .await
            .expect_err("non-delivery cannot hand off");
        assert_eq!(err.code(), ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn update_ignores_delivery_fields_for_visitors() {
        let h = harness().await;
        let entry = h
            .service
            .create(check_in(&h, VisitorKind::Visitor))
            .await
            .expect("create entry");
        let patch = VisitorPatch::try_new(
            Some("Maria A. Souza"),
            VisitorIdentification::default(),
            Some("Carrier X"),
            Some(5),
            None,
            None,
        )
        .expect("valid patch");
        let updated = h
            .service
            .update(entry.id, &patch)
            .await
            .expect("update entry");
        assert_eq!(updated.name, "Maria A. Souza");
        assert!(updated.carrier.is_none());
        assert!(updated.packages.is_none());
    }

    #[tokio::test]
    async fn lifecycle_actions_on_missing_entries_are_not_found() {
        let h = harness().await;
        for err in [
            h.service.approve(Uuid::new_v4(), "x").await.expect_err("approve"),
            h.service.reject(Uuid::new_v4(), None).await.expect_err("reject"),
            h.service.checkout(Uuid::new_v4()).await.expect_err("checkout"),
            h.service.handoff(Uuid::new_v4()).await.expect_err("handoff"),
        ] {
            assert_eq!(err.code(), ErrorCode::NotFound);
        }
    }
}
