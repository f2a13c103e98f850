//! `jsonwebtoken`-backed adapter for the `TokenService` port.
//!
//! Credentials are HS256-signed and carry the subject id, role, and a
//! seven-day expiry window.

use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AuthClaims, Role};

/// Default credential lifetime: seven days.
const TOKEN_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Wire shape of the signed claims.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Subject (user) id.
    sub: Uuid,
    /// Subject role.
    role: Role,
    /// Issued-at, seconds since the epoch.
    iat: i64,
    /// Expiry, seconds since the epoch.
    exp: i64,
}

/// HS256 token service over a shared signing secret.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl JwtTokenService {
    /// Create a service signing with `secret` and the default expiry.
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, TOKEN_TTL_SECONDS)
    }

    /// Create a service with a custom expiry window in seconds.
    pub fn with_ttl(secret: &str, ttl_seconds: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_seconds,
        }
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenError> {
        let now = Utc::now().timestamp();
        let payload = Claims {
            sub: claims.subject,
            role: claims.role,
            iat: now,
            exp: now + self.ttl_seconds,
        };
        encode(&Header::new(Algorithm::HS256), &payload, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;
        Ok(AuthClaims {
            subject: data.claims.sub,
            role: data.claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    fn claims() -> AuthClaims {
        AuthClaims {
            subject: Uuid::new_v4(),
            role: Role::Manager,
        }
    }

    #[test]
    fn issued_tokens_verify_round_trip() {
        let service = JwtTokenService::new("secret");
        let input = claims();
        let token = service.issue(&input).expect("issue token");
        let output = service.verify(&token).expect("verify token");
        assert_eq!(output, input);
    }

    #[test]
    fn tampered_tokens_are_invalid() {
        let service = JwtTokenService::new("secret");
        let other = JwtTokenService::new("other-secret");
        let token = service.issue(&claims()).expect("issue token");

        assert_eq!(other.verify(&token), Err(TokenError::Invalid));
        assert_eq!(service.verify("not-a-token"), Err(TokenError::Invalid));
    }

    #[test]
    fn expired_tokens_report_expiry() {
        let service = JwtTokenService::with_ttl("secret", -3600);
        let token = service.issue(&claims()).expect("issue token");
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }
}
