//! Port abstraction for salted one-way password hashing.

/// Errors raised by password hasher adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordHashError {
    /// Hashing or verification failed inside the adapter.
    #[error("password hashing failed: {message}")]
    Hashing {
        /// Adapter-provided description.
        message: String,
    },
}

impl PasswordHashError {
    /// Hashing-failure constructor.
    pub fn hashing(message: impl Into<String>) -> Self {
        Self::Hashing {
            message: message.into(),
        }
    }
}

/// Salted one-way hashing for stored credentials.
///
/// Implementations are CPU-bound; handlers run them on a blocking pool.
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password for storage.
    fn hash(&self, password: &str) -> Result<String, PasswordHashError>;

    /// Verify a plaintext password against a stored hash.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordHashError>;
}
