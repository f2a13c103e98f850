//! Optional startup seeding of an administrator account.
//!
//! When both seed variables are configured, the process ensures an ADMIN
//! user exists before serving traffic. The lookup-then-insert shape is
//! idempotent across restarts; a concurrent duplicate insert surfaces as
//! the repository's email conflict and is treated as "already seeded".

use tracing::info;

use crate::domain::ports::{PasswordHashError, PasswordHasher, UserRepository, UserRepositoryError};
use crate::domain::{DomainError, NewUser, Role};

/// Errors raised while seeding the admin user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeedError {
    /// Repository access failed.
    #[error("seed failed: {0}")]
    Repository(#[from] UserRepositoryError),
    /// Password hashing failed.
    #[error("seed failed: {0}")]
    Hashing(#[from] PasswordHashError),
}

impl From<SeedError> for DomainError {
    fn from(value: SeedError) -> Self {
        Self::internal(value.to_string())
    }
}

/// Ensure an ADMIN user with `email` exists, creating it when absent.
pub async fn seed_admin_user(
    users: &dyn UserRepository,
    passwords: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> Result<(), SeedError> {
    if users.find_by_email(email).await?.is_some() {
        info!(email, "admin user already present, skipping seed");
        return Ok(());
    }

    let password_hash = passwords.hash(password)?;
    let created = users
        .insert(&NewUser {
            name: "Admin".to_owned(),
            email: email.to_owned(),
            password_hash,
            role: Role::Admin,
        })
        .await;
    match created {
        Ok(user) => {
            info!(email, id = %user.id, "seeded admin user");
            Ok(())
        }
        // Lost a race against another instance seeding the same account.
        Err(UserRepositoryError::EmailInUse) => Ok(()),
        Err(err) => Err(err.into()),
    }
}
