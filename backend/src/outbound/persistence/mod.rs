//! Diesel/PostgreSQL persistence adapters for the domain ports.

mod diesel_condominium_repository;
mod diesel_resident_repository;
mod diesel_unit_repository;
mod diesel_user_repository;
mod diesel_visitor_repository;
mod error_map;
mod models;
mod pool;
mod schema;
mod seed;

pub use diesel_condominium_repository::DieselCondominiumRepository;
pub use diesel_resident_repository::DieselResidentRepository;
pub use diesel_unit_repository::DieselUnitRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_visitor_repository::DieselVisitorRepository;
pub use pool::{DbPool, PoolError};
pub use seed::{SeedError, seed_admin_user};
