//! PostgreSQL-backed `VisitorRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::VisitorEntry;
use crate::domain::ports::{
    SortDirection, VisitorQuery, VisitorRepository, VisitorRepositoryError, VisitorSortField,
};

use super::error_map::{like_pattern, map_diesel_error, map_pool_error};
use super::models::{NewVisitorRow, VisitorChangeset, VisitorRow};
use super::pool::DbPool;
use super::schema::visitors;

/// Diesel-backed implementation of the `VisitorRepository` port.
#[derive(Clone)]
pub struct DieselVisitorRepository {
    pool: DbPool,
}

impl DieselVisitorRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: super::pool::PoolError) -> VisitorRepositoryError {
    map_pool_error(error, VisitorRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> VisitorRepositoryError {
    map_diesel_error(
        error,
        VisitorRepositoryError::query,
        VisitorRepositoryError::connection,
    )
}

fn row_to_entry(row: VisitorRow) -> Result<VisitorEntry, VisitorRepositoryError> {
    VisitorEntry::try_from(row).map_err(|err| VisitorRepositoryError::query(err.to_string()))
}

/// Apply every list filter to an already-selected boxed query.
fn apply_filters<'a, ST>(
    statement: visitors::BoxedQuery<'a, diesel::pg::Pg, ST>,
    query: &'a VisitorQuery,
) -> visitors::BoxedQuery<'a, diesel::pg::Pg, ST> {
    let mut statement = statement.filter(visitors::condo_id.eq(query.condo_id));
    if let Some(unit_id) = query.unit_id {
        statement = statement.filter(visitors::unit_id.eq(unit_id));
    }
    if let Some(status) = query.status {
        statement = statement.filter(visitors::status.eq(status.as_str()));
    }
    if let Some(kind) = query.kind {
        statement = statement.filter(visitors::kind.eq(kind.as_str()));
    }
    if let Some(from) = query.from {
        statement = statement.filter(visitors::check_in_at.ge(from));
    }
    if let Some(to) = query.to {
        statement = statement.filter(visitors::check_in_at.le(to));
    }
    if let Some(q) = &query.q {
        let pattern = like_pattern(q);
        statement = statement.filter(
            visitors::name
                .ilike(pattern.clone())
                .or(visitors::document.ilike(pattern.clone()))
                .or(visitors::plate.ilike(pattern)),
        );
    }
    statement
}

fn sorted<'a, ST>(
    statement: visitors::BoxedQuery<'a, diesel::pg::Pg, ST>,
    query: &VisitorQuery,
) -> visitors::BoxedQuery<'a, diesel::pg::Pg, ST> {
    match (query.sort_by, query.sort_dir) {
        (VisitorSortField::CheckInAt, SortDirection::Asc) => {
            statement.order(visitors::check_in_at.asc())
        }
        (VisitorSortField::CheckInAt, SortDirection::Desc) => {
            statement.order(visitors::check_in_at.desc())
        }
        (VisitorSortField::CheckOutAt, SortDirection::Asc) => {
            statement.order(visitors::check_out_at.asc())
        }
        (VisitorSortField::CheckOutAt, SortDirection::Desc) => {
            statement.order(visitors::check_out_at.desc())
        }
        (VisitorSortField::Name, SortDirection::Asc) => statement.order(visitors::name.asc()),
        (VisitorSortField::Name, SortDirection::Desc) => statement.order(visitors::name.desc()),
    }
}

#[async_trait]
impl VisitorRepository for DieselVisitorRepository {
    async fn list(
        &self,
        query: &VisitorQuery,
    ) -> Result<(Vec<VisitorEntry>, i64), VisitorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<VisitorRow> = sorted(
            apply_filters(
                visitors::table.select(VisitorRow::as_select()).into_boxed(),
                query,
            ),
            query,
        )
        .offset(query.page.offset())
        .limit(query.page.limit())
        .load(&mut conn)
        .await
        .map_err(map_diesel)?;
        let total: i64 = apply_filters(visitors::table.count().into_boxed(), query)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        let entries = rows
            .into_iter()
            .map(row_to_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((entries, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<VisitorEntry>, VisitorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<VisitorRow> = visitors::table
            .find(id)
            .select(VisitorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_entry).transpose()
    }

    async fn create(&self, entry: &VisitorEntry) -> Result<VisitorEntry, VisitorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: VisitorRow = diesel::insert_into(visitors::table)
            .values(&NewVisitorRow::from_entry(entry))
            .returning(VisitorRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        row_to_entry(row)
    }

    async fn update(&self, entry: &VisitorEntry) -> Result<bool, VisitorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let updated = diesel::update(visitors::table.find(entry.id))
            .set(&VisitorChangeset::from_entry(entry))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, VisitorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let deleted = diesel::delete(visitors::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(deleted > 0)
    }
}
