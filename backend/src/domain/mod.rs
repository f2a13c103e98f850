//! Domain entities, value types, services, and ports.
//!
//! Everything here is transport- and storage-agnostic. Inbound adapters
//! translate HTTP payloads into the validated types below; outbound
//! adapters implement the [`ports`] traits over PostgreSQL.

mod auth;
mod cnpj;
mod condominium;
mod error;
pub mod occupancy;
pub mod ports;
mod resident;
mod role;
mod unit;
mod user;
mod visitor;
mod visitor_service;

pub use auth::{AuthClaims, LoginCredentials, LoginValidationError};
pub use cnpj::{Cnpj, CnpjError};
pub use condominium::{
    Condominium, CondominiumPatch, CondominiumSummary, CondominiumValidationError, NewCondominium,
};
pub use error::{DomainError, DomainErrorValidationError, ErrorCode};
pub use occupancy::OccupancyService;
pub use resident::{NewResident, Resident, ResidentPatch, ResidentValidationError};
pub use role::{Action, Role, RoleParseError};
pub use unit::{NewUnit, Unit, UnitPatch, UnitValidationError};
pub use user::{NewUser, User};
pub use visitor::{
    NewVisitorEntry, TransitionError, VisitorEntry, VisitorEnumParseError, VisitorIdentification,
    VisitorKind, VisitorPatch, VisitorStatus, VisitorValidationError,
};
pub use visitor_service::VisitorService;

pub(crate) use visitor_service::map_condo_error;
