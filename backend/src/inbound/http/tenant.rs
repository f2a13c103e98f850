//! Tenant-scope extraction.
//!
//! Every request may carry an `X-Tenant` header; the reference deployment
//! sends a fixed placeholder, so a missing or blank header falls back to
//! the default tenant rather than failing.

use std::future::{Ready, ready};

use actix_web::{FromRequest, HttpRequest, dev::Payload};

use super::error::ApiError;

/// Header carrying the tenant identifier.
pub const TENANT_HEADER: &str = "X-Tenant";

/// Tenant used when the header is absent or blank.
pub const DEFAULT_TENANT: &str = "default";

/// Tenant scope attached to a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tenant(String);

impl Tenant {
    /// Tenant identifier string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromRequest for Tenant {
    type Error = ApiError;
    type Future = Ready<Result<Self, ApiError>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let tenant = req
            .headers()
            .get(TENANT_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or(DEFAULT_TENANT);
        ready(Ok(Self(tenant.to_owned())))
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use actix_web::test::TestRequest;

    #[actix_web::test]
    async fn falls_back_to_default_tenant() {
        let req = TestRequest::default().to_http_request();
        let tenant = Tenant::extract(&req).await.expect("infallible");
        assert_eq!(tenant.as_str(), DEFAULT_TENANT);
    }

    #[actix_web::test]
    async fn reads_the_header_when_present() {
        let req = TestRequest::default()
            .insert_header((TENANT_HEADER, "acme"))
            .to_http_request();
        let tenant = Tenant::extract(&req).await.expect("infallible");
        assert_eq!(tenant.as_str(), "acme");
    }
}
