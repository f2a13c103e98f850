//! Cryptographic adapters for the identity ports.

mod jwt;
mod password;

pub use jwt::JwtTokenService;
pub use password::BcryptPasswordHasher;
