//! Identity endpoints: login and current-user lookup.
//!
//! ```text
//! POST /auth/login {"email":"admin@condo.local","password":"admin123"}
//! GET /auth/me
//! ```

use std::sync::Arc;

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, TokenError, UserRepositoryError};
use crate::domain::{AuthClaims, DomainError, LoginCredentials, LoginValidationError, Role};

use super::ApiResult;
use super::auth::AuthContext;
use super::error::ApiError;
use super::state::HttpState;

/// Login request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Login email, matched case-sensitively.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Subject summary embedded in the login response.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    /// Subject id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Access role.
    pub role: Role,
}

/// Login response body.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Signed bearer credential, valid for seven days.
    pub token: String,
    /// The authenticated subject.
    pub user: UserSummary,
}

/// Current-user response body for `GET /auth/me`.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    /// Subject id.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Access role.
    pub role: Role,
}

/// Authenticate a user and issue a bearer credential.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = LoginResponse),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 401, description = "Invalid credentials", body = ApiError),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/auth/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<LoginResponse>> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;

    let user = state
        .users
        .find_by_email(credentials.email())
        .await
        .map_err(map_user_error)?
        .ok_or_else(invalid_credentials)?;

    // bcrypt verification is CPU-bound; keep it off the async workers.
    let passwords = Arc::clone(&state.passwords);
    let password = Zeroizing::new(credentials.password().to_owned());
    let stored_hash = user.password_hash.clone();
    let verified = web::block(move || passwords.verify(&password, &stored_hash))
        .await
        .map_err(|err| {
            ApiError::from(DomainError::internal(format!(
                "password verification task failed: {err}"
            )))
        })?
        .map_err(map_password_error)?;

    if !verified {
        return Err(invalid_credentials());
    }

    let token = state
        .tokens
        .issue(&AuthClaims {
            subject: user.id,
            role: user.role,
        })
        .map_err(map_token_error)?;

    Ok(web::Json(LoginResponse {
        token,
        user: UserSummary {
            id: user.id,
            name: user.name,
            role: user.role,
        },
    }))
}

/// Return the authenticated subject's profile.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current user", body = MeResponse),
        (status = 401, description = "Unauthorised", body = ApiError),
        (status = 404, description = "Subject no longer exists", body = ApiError)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/auth/me")]
pub async fn me(state: web::Data<HttpState>, auth: AuthContext) -> ApiResult<web::Json<MeResponse>> {
    let user = state
        .users
        .find_by_id(auth.user_id)
        .await
        .map_err(map_user_error)?
        .ok_or_else(|| ApiError::from(DomainError::not_found("user not found")))?;

    Ok(web::Json(MeResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        role: user.role,
    }))
}

fn invalid_credentials() -> ApiError {
    ApiError::from(DomainError::unauthorized("invalid credentials"))
}

fn map_login_validation_error(err: LoginValidationError) -> ApiError {
    let domain = match err {
        LoginValidationError::InvalidEmail => {
            DomainError::invalid_request("email must be a valid address")
                .with_details(json!({ "field": "email", "code": "invalid_email" }))
        }
        LoginValidationError::EmptyPassword => {
            DomainError::invalid_request("password must not be empty")
                .with_details(json!({ "field": "password", "code": "empty_password" }))
        }
    };
    ApiError::from(domain)
}

fn map_user_error(err: UserRepositoryError) -> ApiError {
    let domain = match err {
        UserRepositoryError::Connection { message } => DomainError::service_unavailable(message),
        UserRepositoryError::Query { message } => DomainError::internal(message),
        UserRepositoryError::EmailInUse => DomainError::conflict("email is already in use"),
    };
    ApiError::from(domain)
}

fn map_password_error(err: PasswordHashError) -> ApiError {
    ApiError::from(DomainError::internal(err.to_string()))
}

fn map_token_error(err: TokenError) -> ApiError {
    ApiError::from(DomainError::internal(err.to_string()))
}
