//! Port abstraction for unit persistence adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::{NewUnit, Unit, UnitPatch};

/// Persistence errors raised by unit repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UnitRepositoryError {
    /// Repository connection could not be established.
    #[error("unit repository connection failed: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("unit repository query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
}

impl UnitRepositoryError {
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

/// Filter/page parameters for unit listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitQuery {
    /// Restrict to one condominium, when present.
    pub condo_id: Option<Uuid>,
    /// Case-insensitive substring over number/block, when present.
    pub q: Option<String>,
    /// Normalized pagination.
    pub page: PageRequest,
}

/// Durable storage for units.
#[async_trait]
pub trait UnitRepository: Send + Sync {
    /// List units ordered by block then number.
    async fn list(&self, query: &UnitQuery) -> Result<(Vec<Unit>, i64), UnitRepositoryError>;

    /// Fetch one unit by id.
    async fn find(&self, id: Uuid) -> Result<Option<Unit>, UnitRepositoryError>;

    /// Insert a new unit.
    async fn create(&self, payload: &NewUnit) -> Result<Unit, UnitRepositoryError>;

    /// Apply a partial update; `None` means the id was absent.
    async fn update(&self, id: Uuid, patch: &UnitPatch)
    -> Result<Option<Unit>, UnitRepositoryError>;

    /// Delete by id; `false` means the id was absent.
    async fn delete(&self, id: Uuid) -> Result<bool, UnitRepositoryError>;
}

/// In-memory repository for tests and fixture wiring.
#[derive(Default)]
pub struct FixtureUnitRepository {
    rows: Mutex<Vec<Unit>>,
}

impl FixtureUnitRepository {
    /// Start with the given unit rows.
    pub fn with_units(units: Vec<Unit>) -> Self {
        Self {
            rows: Mutex::new(units),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Unit>> {
        match self.rows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl UnitRepository for FixtureUnitRepository {
    async fn list(&self, query: &UnitQuery) -> Result<(Vec<Unit>, i64), UnitRepositoryError> {
        let rows = self.lock();
        let needle = query.q.as_deref().map(str::to_lowercase);
        let mut matches: Vec<&Unit> = rows
            .iter()
            .filter(|u| query.condo_id.is_none_or(|c| u.condo_id == c))
            .filter(|u| {
                needle.as_deref().is_none_or(|n| {
                    u.number.to_lowercase().contains(n)
                        || u.block.as_deref().is_some_and(|b| b.to_lowercase().contains(n))
                })
            })
            .collect();
        matches.sort_by(|a, b| (&a.block, &a.number).cmp(&(&b.block, &b.number)));
        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Unit>, UnitRepositoryError> {
        Ok(self.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, payload: &NewUnit) -> Result<Unit, UnitRepositoryError> {
        let created = Unit {
            id: Uuid::new_v4(),
            condo_id: payload.condo_id(),
            number: payload.number().to_owned(),
            block: payload.block().map(str::to_owned),
            created_at: Utc::now(),
        };
        self.lock().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &UnitPatch,
    ) -> Result<Option<Unit>, UnitRepositoryError> {
        let mut rows = self.lock();
        let Some(row) = rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        if let Some(number) = &patch.number {
            row.number.clone_from(number);
        }
        if let Some(block) = &patch.block {
            row.block = Some(block.clone());
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UnitRepositoryError> {
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|u| u.id != id);
        Ok(rows.len() != before)
    }
}
