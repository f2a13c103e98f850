//! Bearer-credential extraction and role gating for HTTP handlers.
//!
//! [`AuthContext`] is an extractor: declaring it as a handler parameter
//! makes the endpoint require a valid bearer credential. Role checks are
//! explicit calls against the capability matrix so every mutating handler
//! names the action it performs.

use std::future::{Ready, ready};

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use uuid::Uuid;

use crate::domain::ports::TokenError;
use crate::domain::{Action, DomainError, Role};

use super::error::ApiError;
use super::state::HttpState;

/// Verified subject identity attached to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// Authenticated subject (user) id.
    pub user_id: Uuid,
    /// Subject role embedded in the credential.
    pub role: Role,
}

impl AuthContext {
    /// Fail with 403 unless the subject's role permits `action`.
    pub fn require(&self, action: Action) -> Result<(), ApiError> {
        if self.role.permits(action) {
            Ok(())
        } else {
            Err(ApiError::from(DomainError::forbidden(
                "insufficient role for this action",
            )))
        }
    }
}

impl FromRequest for AuthContext {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<AuthContext, ApiError> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| ApiError::from(DomainError::internal("http state is not configured")))?;

    let header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok());
    let token = extract_token(header)
        .ok_or_else(|| ApiError::from(DomainError::unauthorized("no token")))?;

    let claims = state.tokens.verify(token).map_err(|err| {
        let message = match err {
            TokenError::Expired => "token is expired",
            TokenError::Invalid | TokenError::Signing { .. } => "invalid token",
        };
        ApiError::from(DomainError::unauthorized(message))
    })?;

    Ok(AuthContext {
        user_id: claims.subject,
        role: claims.role,
    })
}

/// Pull the credential out of an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme case-insensitive) or a bare token.
fn extract_token(header: Option<&str>) -> Option<&str> {
    let value = header?.trim();
    if value.is_empty() {
        return None;
    }
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => {
            let token = rest.trim();
            (!token.is_empty()).then_some(token)
        }
        Some(_) => None,
        None => Some(value),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("   "), None)]
    #[case(Some("Bearer abc.def.ghi"), Some("abc.def.ghi"))]
    #[case(Some("bearer abc.def.ghi"), Some("abc.def.ghi"))]
    #[case(Some("BEARER abc.def.ghi"), Some("abc.def.ghi"))]
    #[case(Some("Bearer   "), None)]
    #[case(Some("Basic dXNlcjpwdw=="), None)]
    #[case(Some("abc.def.ghi"), Some("abc.def.ghi"))]
    fn token_extraction(#[case] header: Option<&str>, #[case] expected: Option<&str>) {
        assert_eq!(extract_token(header), expected);
    }

    #[test]
    fn require_enforces_capability_matrix() {
        let resident = AuthContext {
            user_id: Uuid::new_v4(),
            role: Role::Resident,
        };
        assert!(resident.require(Action::Read).is_ok());
        let err = resident.require(Action::Create).expect_err("must forbid");
        assert_eq!(err.code(), crate::domain::ErrorCode::Forbidden);

        let manager = AuthContext {
            user_id: Uuid::new_v4(),
            role: Role::Manager,
        };
        assert!(manager.require(Action::Update).is_ok());
        assert!(manager.require(Action::Delete).is_err());
    }
}
