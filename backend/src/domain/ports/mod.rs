//! Domain ports and supporting types for the hexagonal boundary.

mod clock;
mod condominium_repository;
mod password_hasher;
mod resident_repository;
mod token_service;
mod unit_repository;
mod user_repository;
mod visitor_repository;

pub use clock::{Clock, FixtureClock, SystemClock};
pub use condominium_repository::{
    CondominiumQuery, CondominiumRepository, CondominiumRepositoryError,
    FixtureCondominiumRepository,
};
pub use password_hasher::{PasswordHashError, PasswordHasher};
pub use resident_repository::{
    FixtureResidentRepository, ResidentQuery, ResidentRepository, ResidentRepositoryError,
};
pub use token_service::{TokenError, TokenService};
pub use unit_repository::{FixtureUnitRepository, UnitQuery, UnitRepository, UnitRepositoryError};
pub use user_repository::{FixtureUserRepository, UserRepository, UserRepositoryError};
pub use visitor_repository::{
    FixtureVisitorRepository, SortDirection, VisitorQuery, VisitorRepository,
    VisitorRepositoryError, VisitorSortField,
};
