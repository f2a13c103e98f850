//! Port abstraction for bearer-credential issue and verification.

use crate::domain::AuthClaims;

/// Errors raised by token service adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    /// The credential's validity window has passed.
    #[error("token is expired")]
    Expired,
    /// Signature, structure, or claim contents are invalid.
    #[error("token is invalid")]
    Invalid,
    /// The adapter failed to sign a new credential.
    #[error("token signing failed: {message}")]
    Signing {
        /// Adapter-provided description.
        message: String,
    },
}

impl TokenError {
    /// Signing-failure constructor.
    pub fn signing(message: impl Into<String>) -> Self {
        Self::Signing {
            message: message.into(),
        }
    }
}

/// Signed, time-bounded bearer credentials embedding subject id and role.
///
/// Purely cryptographic; implementations hold no per-request state.
pub trait TokenService: Send + Sync {
    /// Issue a signed credential for the given claims.
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenError>;

    /// Verify signature and expiry, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError>;
}
