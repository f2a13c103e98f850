//! Diesel row structs and row↔domain conversions.
//!
//! Read rows implement `TryFrom` into domain entities; enum-ish text
//! columns (role, status, kind) and the stored cnpj are re-validated on the
//! way out so corrupted rows surface as query errors instead of panics.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::{
    Cnpj, CnpjError, Condominium, Resident, Role, RoleParseError, Unit, User, VisitorEntry,
    VisitorEnumParseError,
};

use super::schema::{condominiums, residents, units, users, visitors};

/// Conversion failures from stored rows to domain entities.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowConversionError {
    /// Stored role text is not a known role.
    #[error("corrupted role in row: {0}")]
    Role(#[from] RoleParseError),
    /// Stored status/kind text is not a known variant.
    #[error("corrupted enum in row: {0}")]
    VisitorEnum(#[from] VisitorEnumParseError),
    /// Stored cnpj no longer passes validation.
    #[error("corrupted cnpj in row: {0}")]
    Cnpj(#[from] CnpjError),
}

/// Read row for the `users` table.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RowConversionError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse::<Role>()?,
            created_at: row.created_at,
        })
    }
}

/// Insert row for the `users` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub role: &'a str,
}

/// Read row for the `condominiums` table.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = condominiums)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CondominiumRow {
    pub id: Uuid,
    pub tenant_id: String,
    pub name: String,
    pub cnpj: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<CondominiumRow> for Condominium {
    type Error = RowConversionError;

    fn try_from(row: CondominiumRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            tenant_id: row.tenant_id,
            name: row.name,
            cnpj: Cnpj::parse(&row.cnpj)?,
            created_at: row.created_at,
        })
    }
}

/// Insert row for the `condominiums` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = condominiums)]
pub struct NewCondominiumRow<'a> {
    pub tenant_id: &'a str,
    pub name: &'a str,
    pub cnpj: &'a str,
}

/// Partial-update changeset for the `condominiums` table.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = condominiums)]
pub struct CondominiumChangeset<'a> {
    pub name: Option<&'a str>,
    pub cnpj: Option<&'a str>,
}

/// Read row for the `units` table.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = units)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UnitRow {
    pub id: Uuid,
    pub condo_id: Uuid,
    pub number: String,
    pub block: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<UnitRow> for Unit {
    fn from(row: UnitRow) -> Self {
        Self {
            id: row.id,
            condo_id: row.condo_id,
            number: row.number,
            block: row.block,
            created_at: row.created_at,
        }
    }
}

/// Insert row for the `units` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = units)]
pub struct NewUnitRow<'a> {
    pub condo_id: Uuid,
    pub number: &'a str,
    pub block: Option<&'a str>,
}

/// Partial-update changeset for the `units` table.
///
/// `block = None` leaves the stored value untouched.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = units)]
pub struct UnitChangeset<'a> {
    pub number: Option<&'a str>,
    pub block: Option<&'a str>,
}

/// Read row for the `residents` table.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = residents)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ResidentRow {
    pub id: Uuid,
    pub condo_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub created_at: DateTime<Utc>,
}

impl From<ResidentRow> for Resident {
    fn from(row: ResidentRow) -> Self {
        Self {
            id: row.id,
            condo_id: row.condo_id,
            unit_id: row.unit_id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

/// Insert row for the `residents` table.
#[derive(Debug, Insertable)]
#[diesel(table_name = residents)]
pub struct NewResidentRow<'a> {
    pub condo_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
}

/// Partial-update changeset for the `residents` table.
///
/// `unit_id` is tri-state: `None` skips the column, `Some(None)` writes
/// NULL (unlink), `Some(Some(id))` relinks.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = residents)]
pub struct ResidentChangeset<'a> {
    pub condo_id: Option<Uuid>,
    pub unit_id: Option<Option<Uuid>>,
    pub name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
}

/// Read row for the `visitors` table.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = visitors)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct VisitorRow {
    pub id: Uuid,
    pub condo_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub kind: String,
    pub status: String,
    pub name: String,
    pub document: Option<String>,
    pub plate: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub note: Option<String>,
    pub carrier: Option<String>,
    pub packages: Option<i32>,
    pub handed_off: bool,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub expected_in_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<VisitorRow> for VisitorEntry {
    type Error = RowConversionError;

    fn try_from(row: VisitorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            condo_id: row.condo_id,
            unit_id: row.unit_id,
            kind: row.kind.parse()?,
            status: row.status.parse()?,
            name: row.name,
            document: row.document,
            plate: row.plate,
            phone: row.phone,
            email: row.email,
            note: row.note,
            carrier: row.carrier,
            packages: row.packages,
            handed_off: row.handed_off,
            check_in_at: row.check_in_at,
            check_out_at: row.check_out_at,
            expected_in_at: row.expected_in_at,
            approved_at: row.approved_at,
            approved_by: row.approved_by,
            rejection_reason: row.rejection_reason,
            created_at: row.created_at,
        })
    }
}

/// Insert row for the `visitors` table.
///
/// The id is assigned by the domain service rather than the column default
/// so the created entity can be returned without a re-read.
#[derive(Debug, Insertable)]
#[diesel(table_name = visitors)]
pub struct NewVisitorRow<'a> {
    pub id: Uuid,
    pub condo_id: Uuid,
    pub unit_id: Option<Uuid>,
    pub kind: &'a str,
    pub status: &'a str,
    pub name: &'a str,
    pub document: Option<&'a str>,
    pub plate: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub note: Option<&'a str>,
    pub carrier: Option<&'a str>,
    pub packages: Option<i32>,
    pub handed_off: bool,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub expected_in_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl<'a> NewVisitorRow<'a> {
    /// Borrow an insert row from a materialized entry.
    pub fn from_entry(entry: &'a VisitorEntry) -> Self {
        Self {
            id: entry.id,
            condo_id: entry.condo_id,
            unit_id: entry.unit_id,
            kind: entry.kind.as_str(),
            status: entry.status.as_str(),
            name: &entry.name,
            document: entry.document.as_deref(),
            plate: entry.plate.as_deref(),
            phone: entry.phone.as_deref(),
            email: entry.email.as_deref(),
            note: entry.note.as_deref(),
            carrier: entry.carrier.as_deref(),
            packages: entry.packages,
            handed_off: entry.handed_off,
            check_in_at: entry.check_in_at,
            check_out_at: entry.check_out_at,
            expected_in_at: entry.expected_in_at,
            created_at: entry.created_at,
        }
    }
}

/// Whole-row replacement changeset for visitor lifecycle updates.
///
/// Lifecycle transitions rewrite the mutable columns wholesale, so `None`
/// here means NULL, not "skip".
#[derive(Debug, AsChangeset)]
#[diesel(table_name = visitors)]
#[diesel(treat_none_as_null = true)]
pub struct VisitorChangeset<'a> {
    pub unit_id: Option<Uuid>,
    pub kind: &'a str,
    pub status: &'a str,
    pub name: &'a str,
    pub document: Option<&'a str>,
    pub plate: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub note: Option<&'a str>,
    pub carrier: Option<&'a str>,
    pub packages: Option<i32>,
    pub handed_off: bool,
    pub check_in_at: DateTime<Utc>,
    pub check_out_at: Option<DateTime<Utc>>,
    pub expected_in_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<&'a str>,
    pub rejection_reason: Option<&'a str>,
}

impl<'a> VisitorChangeset<'a> {
    /// Borrow a replacement changeset from a materialized entry.
    pub fn from_entry(entry: &'a VisitorEntry) -> Self {
        Self {
            unit_id: entry.unit_id,
            kind: entry.kind.as_str(),
            status: entry.status.as_str(),
            name: &entry.name,
            document: entry.document.as_deref(),
            plate: entry.plate.as_deref(),
            phone: entry.phone.as_deref(),
            email: entry.email.as_deref(),
            note: entry.note.as_deref(),
            carrier: entry.carrier.as_deref(),
            packages: entry.packages,
            handed_off: entry.handed_off,
            check_in_at: entry.check_in_at,
            check_out_at: entry.check_out_at,
            expected_in_at: entry.expected_in_at,
            approved_at: entry.approved_at,
            approved_by: entry.approved_by.as_deref(),
            rejection_reason: entry.rejection_reason.as_deref(),
        }
    }
}
