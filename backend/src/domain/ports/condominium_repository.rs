//! Port abstraction for condominium persistence adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::{Condominium, CondominiumPatch, CondominiumSummary, NewCondominium};

/// Persistence errors raised by condominium repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CondominiumRepositoryError {
    /// Repository connection could not be established.
    #[error("condominium repository connection failed: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("condominium repository query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
    /// The tax-registration number is already registered.
    #[error("cnpj is already in use")]
    CnpjInUse,
}

impl CondominiumRepositoryError {
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

/// Filter/sort/page parameters for condominium listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondominiumQuery {
    /// Tenant scope.
    pub tenant_id: String,
    /// Case-insensitive substring over name/cnpj, when present.
    pub q: Option<String>,
    /// Normalized pagination.
    pub page: PageRequest,
}

/// Durable storage for condominiums.
#[async_trait]
pub trait CondominiumRepository: Send + Sync {
    /// List condominiums with child counts, newest first.
    async fn list(
        &self,
        query: &CondominiumQuery,
    ) -> Result<(Vec<CondominiumSummary>, i64), CondominiumRepositoryError>;

    /// Fetch one condominium by id.
    async fn find(&self, id: Uuid) -> Result<Option<Condominium>, CondominiumRepositoryError>;

    /// Insert a new condominium.
    async fn create(
        &self,
        tenant_id: &str,
        payload: &NewCondominium,
    ) -> Result<Condominium, CondominiumRepositoryError>;

    /// Apply a partial update; `None` means the id was absent.
    async fn update(
        &self,
        id: Uuid,
        patch: &CondominiumPatch,
    ) -> Result<Option<Condominium>, CondominiumRepositoryError>;

    /// Delete by id; `false` means the id was absent.
    async fn delete(&self, id: Uuid) -> Result<bool, CondominiumRepositoryError>;
}

/// In-memory repository for tests and fixture wiring.
///
/// Mirrors the storage-level cnpj uniqueness constraint so conflict paths
/// behave like the real adapter.
#[derive(Default)]
pub struct FixtureCondominiumRepository {
    rows: Mutex<Vec<Condominium>>,
}

impl FixtureCondominiumRepository {
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Condominium>> {
        match self.rows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl CondominiumRepository for FixtureCondominiumRepository {
    async fn list(
        &self,
        query: &CondominiumQuery,
    ) -> Result<(Vec<CondominiumSummary>, i64), CondominiumRepositoryError> {
        let rows = self.lock();
        let needle = query.q.as_deref().map(str::to_lowercase);
        let mut matches: Vec<&Condominium> = rows
            .iter()
            .filter(|c| c.tenant_id == query.tenant_id)
            .filter(|c| {
                needle.as_deref().is_none_or(|n| {
                    c.name.to_lowercase().contains(n) || c.cnpj.as_str().contains(n)
                })
            })
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .map(|c| CondominiumSummary {
                condominium: c.clone(),
                units: 0,
                residents: 0,
            })
            .collect();
        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Condominium>, CondominiumRepositoryError> {
        Ok(self.lock().iter().find(|c| c.id == id).cloned())
    }

    async fn create(
        &self,
        tenant_id: &str,
        payload: &NewCondominium,
    ) -> Result<Condominium, CondominiumRepositoryError> {
        let mut rows = self.lock();
        if rows.iter().any(|c| c.cnpj == *payload.cnpj()) {
            return Err(CondominiumRepositoryError::CnpjInUse);
        }
        let created = Condominium {
            id: Uuid::new_v4(),
            tenant_id: tenant_id.to_owned(),
            name: payload.name().to_owned(),
            cnpj: payload.cnpj().clone(),
            created_at: Utc::now(),
        };
        rows.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &CondominiumPatch,
    ) -> Result<Option<Condominium>, CondominiumRepositoryError> {
        let mut rows = self.lock();
        if let Some(cnpj) = &patch.cnpj {
            if rows.iter().any(|c| c.id != id && c.cnpj == *cnpj) {
                return Err(CondominiumRepositoryError::CnpjInUse);
            }
        }
        let Some(row) = rows.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(name) = &patch.name {
            row.name.clone_from(name);
        }
        if let Some(cnpj) = &patch.cnpj {
            row.cnpj = cnpj.clone();
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CondominiumRepositoryError> {
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|c| c.id != id);
        Ok(rows.len() != before)
    }
}
