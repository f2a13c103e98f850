//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Credential subjects.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Display name.
        name -> Varchar,
        /// Unique login email (`users_email_key`).
        email -> Varchar,
        /// Salted one-way password hash.
        password_hash -> Varchar,
        /// Access role stored as text (ADMIN/MANAGER/RESIDENT).
        role -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Condominium directory.
    condominiums (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning tenant identifier.
        tenant_id -> Varchar,
        /// Display name.
        name -> Varchar,
        /// Unique 14-digit tax-registration number (`condominiums_cnpj_key`).
        cnpj -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Physical units within condominiums.
    units (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning condominium.
        condo_id -> Uuid,
        /// Unit number; number+block pairs are not unique by design.
        number -> Varchar,
        /// Optional block/tower designation.
        block -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Residents, at most one per unit (`residents_unit_id_key`).
    residents (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning condominium.
        condo_id -> Uuid,
        /// Linked unit; unique across residents when set.
        unit_id -> Nullable<Uuid>,
        /// Full name.
        name -> Varchar,
        /// Unique contact email (`residents_email_key`).
        email -> Varchar,
        /// Contact phone.
        phone -> Varchar,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Visitor check-in records.
    visitors (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Owning condominium.
        condo_id -> Uuid,
        /// Destination unit, if any.
        unit_id -> Nullable<Uuid>,
        /// Entry classification stored as text (VISITOR/DELIVERY/SERVICE).
        kind -> Varchar,
        /// Lifecycle status stored as text.
        status -> Varchar,
        /// Person name.
        name -> Varchar,
        /// Identity document.
        document -> Nullable<Varchar>,
        /// Vehicle plate.
        plate -> Nullable<Varchar>,
        /// Contact phone.
        phone -> Nullable<Varchar>,
        /// Contact email.
        email -> Nullable<Varchar>,
        /// Free-form gate note.
        note -> Nullable<Varchar>,
        /// Carrier name (deliveries).
        carrier -> Nullable<Varchar>,
        /// Package count (deliveries).
        packages -> Nullable<Int4>,
        /// Delivery handed-off marker.
        handed_off -> Bool,
        /// Actual arrival timestamp.
        check_in_at -> Timestamptz,
        /// Departure timestamp.
        check_out_at -> Nullable<Timestamptz>,
        /// Scheduled arrival.
        expected_in_at -> Nullable<Timestamptz>,
        /// Approval timestamp.
        approved_at -> Nullable<Timestamptz>,
        /// Subject id of the approver.
        approved_by -> Nullable<Varchar>,
        /// Free-text rejection reason.
        rejection_reason -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(units -> condominiums (condo_id));
diesel::joinable!(residents -> condominiums (condo_id));
diesel::joinable!(visitors -> condominiums (condo_id));

diesel::allow_tables_to_appear_in_same_query!(condominiums, units, residents, visitors,);
