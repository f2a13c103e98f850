//! Port abstraction for resident persistence adapters.
//!
//! The error enum distinguishes the two uniqueness constraints on the
//! residents table so callers can answer with a precise conflict reason.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::{NewResident, Resident, ResidentPatch};

/// Persistence errors raised by resident repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResidentRepositoryError {
    /// Repository connection could not be established.
    #[error("resident repository connection failed: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("resident repository query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
    /// The email is already registered to another resident
    /// (`residents_email_key`).
    #[error("email is already in use")]
    EmailInUse,
    /// The unit already has a linked resident (`residents_unit_id_key`);
    /// authoritative occupancy guard against concurrent writers.
    #[error("unit already has a resident")]
    UnitOccupied,
}

impl ResidentRepositoryError {
    /// Connection-failure constructor.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-failure constructor.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Filter/page parameters for resident listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResidentQuery {
    /// Required condominium scope.
    pub condo_id: Uuid,
    /// Case-insensitive substring over name/email/phone, when present.
    pub q: Option<String>,
    /// Normalized pagination.
    pub page: PageRequest,
}

/// Durable storage for residents.
#[async_trait]
pub trait ResidentRepository: Send + Sync {
    /// List residents of one condominium ordered by name.
    async fn list(
        &self,
        query: &ResidentQuery,
    ) -> Result<(Vec<Resident>, i64), ResidentRepositoryError>;

    /// Fetch one resident by id.
    async fn find(&self, id: Uuid) -> Result<Option<Resident>, ResidentRepositoryError>;

    /// Find the resident currently linked to `unit_id`, excluding
    /// `exclude` when present (a resident re-saving itself is not its own
    /// conflict).
    async fn find_by_unit(
        &self,
        unit_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Option<Resident>, ResidentRepositoryError>;

    /// Insert a new resident.
    async fn create(&self, payload: &NewResident) -> Result<Resident, ResidentRepositoryError>;

    /// Apply a partial update; `None` means the id was absent.
    async fn update(
        &self,
        id: Uuid,
        patch: &ResidentPatch,
    ) -> Result<Option<Resident>, ResidentRepositoryError>;

    /// Delete by id; `false` means the id was absent.
    async fn delete(&self, id: Uuid) -> Result<bool, ResidentRepositoryError>;
}

/// In-memory repository for tests and fixture wiring.
///
/// Mirrors the storage-level unique constraints on email and unit link so
/// conflict paths behave like the real adapter.
#[derive(Default)]
pub struct FixtureResidentRepository {
    rows: Mutex<Vec<Resident>>,
}

impl FixtureResidentRepository {
    /// Start with the given resident rows.
    pub fn with_residents(residents: Vec<Resident>) -> Self {
        Self {
            rows: Mutex::new(residents),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Resident>> {
        match self.rows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl ResidentRepository for FixtureResidentRepository {
    async fn list(
        &self,
        query: &ResidentQuery,
    ) -> Result<(Vec<Resident>, i64), ResidentRepositoryError> {
        let rows = self.lock();
        let needle = query.q.as_deref().map(str::to_lowercase);
        let mut matches: Vec<&Resident> = rows
            .iter()
            .filter(|r| r.condo_id == query.condo_id)
            .filter(|r| {
                needle.as_deref().is_none_or(|n| {
                    r.name.to_lowercase().contains(n)
                        || r.email.to_lowercase().contains(n)
                        || r.phone.to_lowercase().contains(n)
                })
            })
            .collect();
        matches.sort_by(|a, b| a.name.cmp(&b.name));
        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Resident>, ResidentRepositoryError> {
        Ok(self.lock().iter().find(|r| r.id == id).cloned())
    }

    async fn find_by_unit(
        &self,
        unit_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Option<Resident>, ResidentRepositoryError> {
        Ok(self
            .lock()
            .iter()
            .find(|r| r.unit_id == Some(unit_id) && exclude.is_none_or(|e| r.id != e))
            .cloned())
    }

    async fn create(&self, payload: &NewResident) -> Result<Resident, ResidentRepositoryError> {
        let mut rows = self.lock();
        if rows.iter().any(|r| r.email == payload.email()) {
            return Err(ResidentRepositoryError::EmailInUse);
        }
        if let Some(unit_id) = payload.unit_id() {
            if rows.iter().any(|r| r.unit_id == Some(unit_id)) {
                return Err(ResidentRepositoryError::UnitOccupied);
            }
        }
        let created = Resident {
            id: Uuid::new_v4(),
            condo_id: payload.condo_id(),
            unit_id: payload.unit_id(),
            name: payload.name().to_owned(),
            email: payload.email().to_owned(),
            phone: payload.phone().to_owned(),
            created_at: Utc::now(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ResidentPatch,
    ) -> Result<Option<Resident>, ResidentRepositoryError> {
        let mut rows = self.lock();
        if let Some(email) = &patch.email {
            if rows.iter().any(|r| r.id != id && r.email == *email) {
                return Err(ResidentRepositoryError::EmailInUse);
            }
        }
        if let Some(Some(unit_id)) = patch.unit_id {
            if rows.iter().any(|r| r.id != id && r.unit_id == Some(unit_id)) {
                return Err(ResidentRepositoryError::UnitOccupied);
            }
        }
        let Some(row) = rows.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            row.name.clone_from(name);
        }
        if let Some(email) = &patch.email {
            row.email.clone_from(email);
        }
        if let Some(phone) = &patch.phone {
            row.phone.clone_from(phone);
        }
        if let Some(condo_id) = patch.condo_id {
            row.condo_id = condo_id;
        }
        if let Some(unit_id) = patch.unit_id {
            row.unit_id = unit_id;
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ResidentRepositoryError> {
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|r| r.id != id);
        Ok(rows.len() != before)
    }
}
