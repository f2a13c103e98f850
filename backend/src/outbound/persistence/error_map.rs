//! Shared Diesel error mapping for the persistence adapters.
//!
//! Unique-constraint violations are dispatched on the constraint name so
//! callers recover a precise conflict (duplicate email, occupied unit,
//! duplicate cnpj) instead of a generic 500. The constraint names here must
//! match the migrations.

use tracing::debug;

use super::pool::PoolError;

/// Unique constraints the adapters know how to translate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueConstraint {
    /// `users_email_key` / `residents_email_key`.
    Email,
    /// `residents_unit_id_key`: the authoritative occupancy guard.
    UnitOccupied,
    /// `condominiums_cnpj_key`.
    Cnpj,
    /// A unique index this adapter has no specific mapping for.
    Other,
}

/// Classify a unique-violation by its constraint identity.
pub fn classify_unique_violation(constraint: Option<&str>) -> UniqueConstraint {
    match constraint {
        Some("users_email_key") | Some("residents_email_key") => UniqueConstraint::Email,
        Some("residents_unit_id_key") => UniqueConstraint::UnitOccupied,
        Some("condominiums_cnpj_key") => UniqueConstraint::Cnpj,
        _ => UniqueConstraint::Other,
    }
}

/// Map pool errors into a repository-specific connection error constructor.
pub fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    let message = match error {
        PoolError::Checkout { message } | PoolError::Build { message } => message,
    };
    connection(message)
}

/// Map common Diesel error variants into query/connection constructors.
///
/// Callers that care about unique violations should match those before
/// falling back to this helper.
pub fn map_diesel_error<E, Q, C>(error: diesel::result::Error, query: Q, connection: C) -> E
where
    Q: Fn(&'static str) -> E,
    C: Fn(&'static str) -> E,
{
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => query("record not found"),
        DieselError::QueryBuilderError(_) => query("database query error"),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error")
        }
        DieselError::DatabaseError(_, _) => query("database error"),
        _ => query("database error"),
    }
}

/// Extract the constraint behind a unique violation, if this is one.
pub fn unique_violation_constraint(error: &diesel::result::Error) -> Option<UniqueConstraint> {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(classify_unique_violation(info.constraint_name()))
        }
        _ => None,
    }
}

/// Escape `%`/`_` in user text destined for an `ILIKE` pattern.
pub fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Some("residents_email_key"), UniqueConstraint::Email)]
    #[case(Some("users_email_key"), UniqueConstraint::Email)]
    #[case(Some("residents_unit_id_key"), UniqueConstraint::UnitOccupied)]
    #[case(Some("condominiums_cnpj_key"), UniqueConstraint::Cnpj)]
    #[case(Some("something_else"), UniqueConstraint::Other)]
    #[case(None, UniqueConstraint::Other)]
    fn constraint_names_classify(
        #[case] name: Option<&str>,
        #[case] expected: UniqueConstraint,
    ) {
        assert_eq!(classify_unique_violation(name), expected);
    }

    #[rstest]
    #[case("ana", "%ana%")]
    #[case("100%", "%100\\%%")]
    #[case("a_b", "%a\\_b%")]
    fn like_patterns_escape_wildcards(#[case] needle: &str, #[case] expected: &str) {
        assert_eq!(like_pattern(needle), expected);
    }

    #[test]
    fn not_found_maps_to_query_error() {
        let message: &str = map_diesel_error(diesel::result::Error::NotFound, |m| m, |m| m);
        assert_eq!(message, "record not found");
    }
}
