//! Port abstraction for user persistence adapters and their errors.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{NewUser, User};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRepositoryError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-provided description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-provided description.
        message: String,
    },
    /// The email is already registered to another user.
    #[error("email is already in use")]
    EmailInUse,
}

impl UserRepositoryError {
    /// Connection-failure constructor.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-failure constructor.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Durable storage for credential subjects.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fetch a user by exact email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError>;

    /// Insert a new user record.
    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError>;
}

/// In-memory repository for tests and fixture wiring.
#[derive(Default)]
pub struct FixtureUserRepository {
    rows: Mutex<Vec<User>>,
}

impl FixtureUserRepository {
    /// Start with the given user rows.
    pub fn with_users(users: Vec<User>) -> Self {
        Self {
            rows: Mutex::new(users),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        match self.rows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl UserRepository for FixtureUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, UserRepositoryError> {
        Ok(self.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn insert(&self, user: &NewUser) -> Result<User, UserRepositoryError> {
        let mut rows = self.lock();
        if rows.iter().any(|u| u.email == user.email) {
            return Err(UserRepositoryError::EmailInUse);
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name.clone(),
            email: user.email.clone(),
            password_hash: user.password_hash.clone(),
            role: user.role,
            created_at: Utc::now(),
        };
        rows.push(created.clone());
        Ok(created)
    }
}
