//! PostgreSQL-backed `CondominiumRepository` implementation using Diesel.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::dsl::count_star;
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use uuid::Uuid;

use crate::domain::ports::{
    CondominiumQuery, CondominiumRepository, CondominiumRepositoryError,
};
use crate::domain::{Condominium, CondominiumPatch, CondominiumSummary, NewCondominium};

use super::error_map::{
    UniqueConstraint, like_pattern, map_diesel_error, map_pool_error, unique_violation_constraint,
};
use super::models::{CondominiumChangeset, CondominiumRow, NewCondominiumRow};
use super::pool::DbPool;
use super::schema::{condominiums, residents, units};

/// Diesel-backed implementation of the `CondominiumRepository` port.
#[derive(Clone)]
pub struct DieselCondominiumRepository {
    pool: DbPool,
}

impl DieselCondominiumRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: super::pool::PoolError) -> CondominiumRepositoryError {
    map_pool_error(error, CondominiumRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> CondominiumRepositoryError {
    if let Some(UniqueConstraint::Cnpj) = unique_violation_constraint(&error) {
        return CondominiumRepositoryError::CnpjInUse;
    }
    map_diesel_error(
        error,
        CondominiumRepositoryError::query,
        CondominiumRepositoryError::connection,
    )
}

fn row_to_condo(row: CondominiumRow) -> Result<Condominium, CondominiumRepositoryError> {
    Condominium::try_from(row).map_err(|err| CondominiumRepositoryError::query(err.to_string()))
}

/// Apply tenant and free-text filters to an already-selected boxed query.
///
/// Generic over the select clause so the same filters serve both the page
/// load and the count.
fn apply_filters<'a, ST>(
    statement: condominiums::BoxedQuery<'a, diesel::pg::Pg, ST>,
    query: &'a CondominiumQuery,
) -> condominiums::BoxedQuery<'a, diesel::pg::Pg, ST> {
    let mut statement = statement.filter(condominiums::tenant_id.eq(&query.tenant_id));
    if let Some(q) = &query.q {
        let pattern = like_pattern(q);
        statement = statement.filter(
            condominiums::name
                .ilike(pattern.clone())
                .or(condominiums::cnpj.ilike(pattern)),
        );
    }
    statement
}

/// Child counts for the page of condominiums, grouped by condo id.
async fn child_counts(
    conn: &mut AsyncPgConnection,
    ids: &[Uuid],
) -> Result<(HashMap<Uuid, i64>, HashMap<Uuid, i64>), CondominiumRepositoryError> {
    let unit_counts: Vec<(Uuid, i64)> = units::table
        .filter(units::condo_id.eq_any(ids))
        .group_by(units::condo_id)
        .select((units::condo_id, count_star()))
        .load(conn)
        .await
        .map_err(map_diesel)?;
    let resident_counts: Vec<(Uuid, i64)> = residents::table
        .filter(residents::condo_id.eq_any(ids))
        .group_by(residents::condo_id)
        .select((residents::condo_id, count_star()))
        .load(conn)
        .await
        .map_err(map_diesel)?;
    Ok((
        unit_counts.into_iter().collect(),
        resident_counts.into_iter().collect(),
    ))
}

#[async_trait]
impl CondominiumRepository for DieselCondominiumRepository {
    async fn list(
        &self,
        query: &CondominiumQuery,
    ) -> Result<(Vec<CondominiumSummary>, i64), CondominiumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<CondominiumRow> = apply_filters(
            condominiums::table
                .select(CondominiumRow::as_select())
                .into_boxed(),
            query,
        )
        .order(condominiums::created_at.desc())
        .offset(query.page.offset())
        .limit(query.page.limit())
        .load(&mut conn)
        .await
        .map_err(map_diesel)?;
        let total: i64 = apply_filters(condominiums::table.count().into_boxed(), query)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let (unit_counts, resident_counts) = child_counts(&mut conn, &ids).await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            let id = row.id;
            items.push(CondominiumSummary {
                condominium: row_to_condo(row)?,
                units: unit_counts.get(&id).copied().unwrap_or(0),
                residents: resident_counts.get(&id).copied().unwrap_or(0),
            });
        }
        Ok((items, total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Condominium>, CondominiumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<CondominiumRow> = condominiums::table
            .find(id)
            .select(CondominiumRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_condo).transpose()
    }

    async fn create(
        &self,
        tenant_id: &str,
        payload: &NewCondominium,
    ) -> Result<Condominium, CondominiumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: CondominiumRow = diesel::insert_into(condominiums::table)
            .values(&NewCondominiumRow {
                tenant_id,
                name: payload.name(),
                cnpj: payload.cnpj().as_str(),
            })
            .returning(CondominiumRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        row_to_condo(row)
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &CondominiumPatch,
    ) -> Result<Option<Condominium>, CondominiumRepositoryError> {
        if patch.is_empty() {
            return self.find(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<CondominiumRow> = diesel::update(condominiums::table.find(id))
            .set(&CondominiumChangeset {
                name: patch.name.as_deref(),
                cnpj: patch.cnpj.as_ref().map(|cnpj| cnpj.as_str()),
            })
            .returning(CondominiumRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_condo).transpose()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, CondominiumRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let deleted = diesel::delete(condominiums::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(deleted > 0)
    }
}
