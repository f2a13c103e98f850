//! Condominium management backend.
//!
//! An HTTP API over PostgreSQL covering condominiums, units, residents, and
//! visitor check-in/out, with role-gated access control. Laid out
//! hexagonally: [`domain`] owns entities, invariants, and ports;
//! [`inbound`] adapts HTTP; [`outbound`] adapts Diesel and the auth
//! crypto; [`server`] wires them together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
