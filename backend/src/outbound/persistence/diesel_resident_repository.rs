//! PostgreSQL-backed `ResidentRepository` implementation using Diesel.
//!
//! Writes rely on the `residents_unit_id_key` and `residents_email_key`
//! unique indexes as the authoritative guards; violations are translated by
//! constraint identity into the port's precise conflict variants so the
//! occupancy service answers concurrent writers with the same error as the
//! fast-path pre-check.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{ResidentQuery, ResidentRepository, ResidentRepositoryError};
use crate::domain::{NewResident, Resident, ResidentPatch};

use super::error_map::{
    UniqueConstraint, like_pattern, map_diesel_error, map_pool_error, unique_violation_constraint,
};
use super::models::{NewResidentRow, ResidentChangeset, ResidentRow};
use super::pool::DbPool;
use super::schema::residents;

/// Diesel-backed implementation of the `ResidentRepository` port.
#[derive(Clone)]
pub struct DieselResidentRepository {
    pool: DbPool,
}

impl DieselResidentRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: super::pool::PoolError) -> ResidentRepositoryError {
    map_pool_error(error, ResidentRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ResidentRepositoryError {
    match unique_violation_constraint(&error) {
        Some(UniqueConstraint::Email) => ResidentRepositoryError::EmailInUse,
        Some(UniqueConstraint::UnitOccupied) => ResidentRepositoryError::UnitOccupied,
        _ => map_diesel_error(
            error,
            ResidentRepositoryError::query,
            ResidentRepositoryError::connection,
        ),
    }
}

/// Apply condo and free-text filters to an already-selected boxed query.
fn apply_filters<'a, ST>(
    statement: residents::BoxedQuery<'a, diesel::pg::Pg, ST>,
    query: &'a ResidentQuery,
) -> residents::BoxedQuery<'a, diesel::pg::Pg, ST> {
    let mut statement = statement.filter(residents::condo_id.eq(query.condo_id));
    if let Some(q) = &query.q {
        let pattern = like_pattern(q);
        statement = statement.filter(
            residents::name
                .ilike(pattern.clone())
                .or(residents::email.ilike(pattern.clone()))
                .or(residents::phone.ilike(pattern)),
        );
    }
    statement
}

fn patch_is_empty(patch: &ResidentPatch) -> bool {
    patch.name.is_none()
        && patch.email.is_none()
        && patch.phone.is_none()
        && patch.condo_id.is_none()
        && patch.unit_id.is_none()
}

#[async_trait]
impl ResidentRepository for DieselResidentRepository {
    async fn list(
        &self,
        query: &ResidentQuery,
    ) -> Result<(Vec<Resident>, i64), ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let rows: Vec<ResidentRow> = apply_filters(
            residents::table.select(ResidentRow::as_select()).into_boxed(),
            query,
        )
        .order(residents::name.asc())
        .offset(query.page.offset())
        .limit(query.page.limit())
        .load(&mut conn)
        .await
        .map_err(map_diesel)?;
        let total: i64 = apply_filters(residents::table.count().into_boxed(), query)
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok((rows.into_iter().map(Resident::from).collect(), total))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Resident>, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<ResidentRow> = residents::table
            .find(id)
            .select(ResidentRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(Resident::from))
    }

    async fn find_by_unit(
        &self,
        unit_id: Uuid,
        exclude: Option<Uuid>,
    ) -> Result<Option<Resident>, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let mut statement = residents::table
            .select(ResidentRow::as_select())
            .into_boxed()
            .filter(residents::unit_id.eq(unit_id));
        if let Some(excluded_id) = exclude {
            statement = statement.filter(residents::id.ne(excluded_id));
        }
        let row: Option<ResidentRow> = statement
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(Resident::from))
    }

    async fn create(&self, payload: &NewResident) -> Result<Resident, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: ResidentRow = diesel::insert_into(residents::table)
            .values(&NewResidentRow {
                condo_id: payload.condo_id(),
                unit_id: payload.unit_id(),
                name: payload.name(),
                email: payload.email(),
                phone: payload.phone(),
            })
            .returning(ResidentRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(row.into())
    }

    async fn update(
        &self,
        id: Uuid,
        patch: &ResidentPatch,
    ) -> Result<Option<Resident>, ResidentRepositoryError> {
        if patch_is_empty(patch) {
            return self.find(id).await;
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let row: Option<ResidentRow> = diesel::update(residents::table.find(id))
            .set(&ResidentChangeset {
                condo_id: patch.condo_id,
                unit_id: patch.unit_id,
                name: patch.name.as_deref(),
                email: patch.email.as_deref(),
                phone: patch.phone.as_deref(),
            })
            .returning(ResidentRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(Resident::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ResidentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let deleted = diesel::delete(residents::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for the constraint-identity dispatch.
    use super::*;
    use diesel::result::DatabaseErrorKind;
    use rstest::rstest;

    fn unique_violation(constraint: &'static str) -> diesel::result::Error {
        #[derive(Debug)]
        struct Info(&'static str);
        impl diesel::result::DatabaseErrorInformation for Info {
            fn message(&self) -> &str {
                "duplicate key value violates unique constraint"
            }
            fn details(&self) -> Option<&str> {
                None
            }
            fn hint(&self) -> Option<&str> {
                None
            }
            fn table_name(&self) -> Option<&str> {
                Some("residents")
            }
            fn column_name(&self) -> Option<&str> {
                None
            }
            fn constraint_name(&self) -> Option<&str> {
                Some(self.0)
            }
            fn statement_position(&self) -> Option<i32> {
                None
            }
        }
        diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new(Info(constraint)),
        )
    }

    #[rstest]
    #[case("residents_email_key", ResidentRepositoryError::EmailInUse)]
    #[case("residents_unit_id_key", ResidentRepositoryError::UnitOccupied)]
    fn unique_violations_map_by_constraint_name(
        #[case] constraint: &'static str,
        #[case] expected: ResidentRepositoryError,
    ) {
        assert_eq!(map_diesel(unique_violation(constraint)), expected);
    }

    #[test]
    fn unknown_constraints_fall_back_to_query_errors() {
        let err = map_diesel(unique_violation("residents_other_key"));
        assert!(matches!(err, ResidentRepositoryError::Query { .. }));
    }
}
