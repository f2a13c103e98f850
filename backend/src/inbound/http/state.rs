//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CondominiumRepository, PasswordHasher, ResidentRepository, TokenService, UnitRepository,
    UserRepository, VisitorRepository,
};
use crate::domain::{OccupancyService, VisitorService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Credential-subject storage.
    pub users: Arc<dyn UserRepository>,
    /// Condominium storage.
    pub condos: Arc<dyn CondominiumRepository>,
    /// Unit storage.
    pub units: Arc<dyn UnitRepository>,
    /// Resident storage (reads; writes go through `occupancy`).
    pub residents: Arc<dyn ResidentRepository>,
    /// Visitor storage (reads; writes go through `visitors_service`).
    pub visitors: Arc<dyn VisitorRepository>,
    /// Occupancy-guarded resident writes.
    pub occupancy: OccupancyService,
    /// Visitor lifecycle operations.
    pub visitors_service: VisitorService,
    /// Bearer-credential issue/verify.
    pub tokens: Arc<dyn TokenService>,
    /// Password hash/verify.
    pub passwords: Arc<dyn PasswordHasher>,
}

/// Parameter object bundling all port implementations for [`HttpState`].
pub struct HttpStatePorts {
    /// Credential-subject storage.
    pub users: Arc<dyn UserRepository>,
    /// Condominium storage.
    pub condos: Arc<dyn CondominiumRepository>,
    /// Unit storage.
    pub units: Arc<dyn UnitRepository>,
    /// Resident storage.
    pub residents: Arc<dyn ResidentRepository>,
    /// Visitor storage.
    pub visitors: Arc<dyn VisitorRepository>,
    /// Bearer-credential issue/verify.
    pub tokens: Arc<dyn TokenService>,
    /// Password hash/verify.
    pub passwords: Arc<dyn PasswordHasher>,
    /// Now source for lifecycle timestamps.
    pub clock: Arc<dyn crate::domain::ports::Clock>,
}

impl HttpState {
    /// Construct state from a ports bundle, wiring the domain services.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            condos,
            units,
            residents,
            visitors,
            tokens,
            passwords,
            clock,
        } = ports;
        let occupancy = OccupancyService::new(units.clone(), residents.clone());
        let visitors_service = VisitorService::new(
            visitors.clone(),
            condos.clone(),
            units.clone(),
            clock,
        );
        Self {
            users,
            condos,
            units,
            residents,
            visitors,
            occupancy,
            visitors_service,
            tokens,
            passwords,
        }
    }
}
