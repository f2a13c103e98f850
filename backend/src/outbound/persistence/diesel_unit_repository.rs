//! PostgreSQL-backed `UnitRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{UnitQuery, UnitRepository, UnitRepositoryError};
use crate::domain::{NewUnit, Unit, UnitPatch};

use super::error_map::{like_pattern, map_diesel_error, map_pool_error};
use super::models::{NewUnitRow, UnitChangeset, UnitRow};
use super::pool::DbPool;
use super::schema::units;

/// Diesel-backed implementation of the `UnitRepository` port.
#[derive(Clone)]
pub struct DieselUnitRepository {
    pool: DbPool,
}

impl DieselUnitRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: super::pool::PoolError) -> UnitRepositoryError {
    map_pool_error(error, UnitRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> UnitRepositoryError {
    map_diesel_error(
        error,
        UnitRepositoryError::query,
        UnitRepositoryError::connection,
    )
}

/// Apply condo and free-text filters to an already-selected boxed query.
fn apply_filters<'a, ST>(
    statement: units::BoxedQuery<'a, diesel::pg::Pg, ST>,
    query: &'a UnitQuery,
) -> units::BoxedQuery<'a, diesel::pg::Pg, ST> {
    let mut statement = statement;
    if let Some(condo_id) = query.condo_id {
        statement = statement.filter(units::condo_id.eq(condo_id));
    }
    if let Some(q) = &query.q {
        let pattern = like_pattern(q);
        statement = statement.filter(
            units::number
                .ilike(pattern.clone())
                .or(units::block.ilike(pattern)),
        );
    }
    statement
}

#[async_trait]
impl UnitRepository for DieselUnitRepository {
    async fn list(&self, query: &UnitQuery) -> Result<(Vec<Unit>, i64), UnitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<UnitRow> = apply_filters(
            units::table.select(UnitRow::as_select()).into_boxed(),
            query,
        )
        .order((units::block.asc(), units::number.asc()))
        .offset(query.page.offset())
        .limit(query.page.limit())
        .load(&mut conn)
        .await
        .map_err(map_diesel)?;
        let total: i64 = apply_filters(units::table.count().into_boxed(), query)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok((rows.into_iter().map(Unit::from).collect(), total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Unit>, UnitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<UnitRow> = units::table
            .find(id)
            .select(UnitRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(Unit::from))
    }

    async fn create(&self, payload: &NewUnit) -> Result<Unit, UnitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: UnitRow = diesel::insert_into(units::table)
            .values(&NewUnitRow {
                condo_id: payload.condo_id(),
                number: payload.number(),
                block: payload.block(),
            })
            .returning(UnitRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &UnitPatch,
    ) -> Result<Option<Unit>, UnitRepositoryError> {
        if patch.number.is_none() && patch.block.is_none() {
            return self.find(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<UnitRow> = diesel::update(units::table.find(id))
            .set(&UnitChangeset {
                number: patch.number.as_deref(),
                block: patch.block.as_deref(),
            })
            .returning(UnitRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(Unit::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, UnitRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let deleted = diesel::delete(units::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(deleted > 0)
    }
}
