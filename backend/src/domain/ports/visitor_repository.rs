//! Port abstraction for visitor-entry persistence adapters.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pagination::PageRequest;
use uuid::Uuid;

use crate::domain::{VisitorEntry, VisitorKind, VisitorStatus};

/// Persistence errors raised by visitor repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisitorRepositoryError {
    /// Repository connection could not be established.
    #[error("visitor repository connection failed: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("visitor repository query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
}

impl VisitorRepositoryError {
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

/// Sortable columns for visitor listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum VisitorSortField {
    /// Actual arrival time (the default).
    #[default]
    CheckInAt,
    /// Departure time.
    CheckOutAt,
    /// Person name.
    Name,
}

/// Sort direction for visitor listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending (the default; newest arrivals first).
    #[default]
    Desc,
}

/// Filter/sort/page parameters for visitor listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitorQuery {
    /// Required condominium scope.
    pub condo_id: Uuid,
    /// Restrict to one unit, when present.
    pub unit_id: Option<Uuid>,
    /// Case-insensitive substring over name/document/plate, when present.
    pub q: Option<String>,
    /// Restrict to one status; `None` is the ALL sentinel.
    pub status: Option<VisitorStatus>,
    /// Restrict to one kind; `None` is the ALL sentinel.
    pub kind: Option<VisitorKind>,
    /// Inclusive lower bound on `check_in_at`.
    pub from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `check_in_at`.
    pub to: Option<DateTime<Utc>>,
    /// Sort column.
    pub sort_by: VisitorSortField,
    /// Sort direction.
    pub sort_dir: SortDirection,
    /// Normalized pagination.
    pub page: PageRequest,
}

/// Durable storage for visitor entries.
#[async_trait]
pub trait VisitorRepository: Send + Sync {
    /// List entries matching the query.
    async fn list(
        &self,
        query: &VisitorQuery,
    ) -> Result<(Vec<VisitorEntry>, i64), VisitorRepositoryError>;

    /// Fetch one entry by id.
    async fn find(&self, id: Uuid) -> Result<Option<VisitorEntry>, VisitorRepositoryError>;

    /// Insert a fully materialized entry, returning the stored row.
    async fn create(&self, entry: &VisitorEntry) -> Result<VisitorEntry, VisitorRepositoryError>;

    /// Replace the stored row for `entry.id`; `false` means it was absent.
    async fn update(&self, entry: &VisitorEntry) -> Result<bool, VisitorRepositoryError>;

    /// Delete by id; `false` means the id was absent.
    async fn delete(&self, id: Uuid) -> Result<bool, VisitorRepositoryError>;
}

/// In-memory repository for tests and fixture wiring.
#[derive(Default)]
pub struct FixtureVisitorRepository {
    rows: Mutex<Vec<VisitorEntry>>,
}

impl FixtureVisitorRepository {
    /// Start with the given entries.
    pub fn with_entries(entries: Vec<VisitorEntry>) -> Self {
        Self {
            rows: Mutex::new(entries),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<VisitorEntry>> {
        match self.rows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl VisitorRepository for FixtureVisitorRepository {
    async fn list(
        &self,
        query: &VisitorQuery,
    ) -> Result<(Vec<VisitorEntry>, i64), VisitorRepositoryError> {
        let rows = self.lock();
        let needle = query.q.as_deref().map(str::to_lowercase);
        let mut matches: Vec<&VisitorEntry> = rows
            .iter()
            .filter(|v| v.condo_id == query.condo_id)
            .filter(|v| query.unit_id.is_none_or(|u| v.unit_id == Some(u)))
            .filter(|v| query.status.is_none_or(|s| v.status == s))
            .filter(|v| query.kind.is_none_or(|k| v.kind == k))
            .filter(|v| query.from.is_none_or(|f| v.check_in_at >= f))
            .filter(|v| query.to.is_none_or(|t| v.check_in_at <= t))
            .filter(|v| {
                needle.as_deref().is_none_or(|n| {
                    v.name.to_lowercase().contains(n)
                        || v.document.as_deref().is_some_and(|d| d.to_lowercase().contains(n))
                        || v.plate.as_deref().is_some_and(|p| p.to_lowercase().contains(n))
                })
            })
            .collect();
        matches.sort_by(|a, b| {
            let ordering = match query.sort_by {
                VisitorSortField::CheckInAt => a.check_in_at.cmp(&b.check_in_at),
                VisitorSortField::CheckOutAt => a.check_out_at.cmp(&b.check_out_at),
                VisitorSortField::Name => a.name.cmp(&b.name),
            };
            match query.sort_dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        let total = matches.len() as i64;
        let items = matches
            .into_iter()
            .skip(query.page.offset() as usize)
            .take(query.page.limit() as usize)
            .cloned()
            .collect();
        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<VisitorEntry>, VisitorRepositoryError> {
        Ok(self.lock().iter().find(|v| v.id == id).cloned())
    }

    async fn create(&self, entry: &VisitorEntry) -> Result<VisitorEntry, VisitorRepositoryError> {
        self.lock().push(entry.clone());
        Ok(entry.clone())
    }

    async fn update(&self, entry: &VisitorEntry) -> Result<bool, VisitorRepositoryError> {
        let mut rows = self.lock();
        let Some(row) = rows.iter_mut().find(|v| v.id == entry.id) else {
            return Ok(false);
        };
        *row = entry.clone();
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, VisitorRepositoryError> {
        let mut rows = self.lock();
        let before = rows.len();
        rows.retain(|v| v.id != id);
        Ok(rows.len() != before)
    }
}
