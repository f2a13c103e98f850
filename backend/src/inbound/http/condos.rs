//! Condominium directory endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PageBounds, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::CondominiumQuery;
use crate::domain::{
    Action, Condominium, CondominiumPatch, CondominiumSummary, CondominiumValidationError,
    DomainError, NewCondominium, map_condo_error,
};

use super::ApiResult;
use super::auth::AuthContext;
use super::error::ApiError;
use super::state::HttpState;
use super::tenant::Tenant;

const PAGE_BOUNDS: PageBounds = match PageBounds::try_new(10, 100) {
    Ok(bounds) => bounds,
    Err(_) => unreachable!(),
};

/// Query parameters for `GET /condos`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListCondosQuery {
    /// Case-insensitive substring over name/cnpj.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size, clamped to 100.
    pub page_size: Option<i64>,
}

/// Condominium entity payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CondominiumDto {
    /// Primary identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Canonical 14-digit tax-registration number.
    pub cnpj: String,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// List item: entity plus child counts.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CondominiumListItemDto {
    /// Primary identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Canonical 14-digit tax-registration number.
    pub cnpj: String,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Number of units registered under this condominium.
    pub units: i64,
    /// Number of residents registered under this condominium.
    pub residents: i64,
}

/// Create/update request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCondominiumRequest {
    /// Display name (min length 2).
    pub name: Option<String>,
    /// Tax-registration number; checksum-validated.
    pub cnpj: Option<String>,
}

impl From<Condominium> for CondominiumDto {
    fn from(value: Condominium) -> Self {
        Self {
            id: value.id,
            name: value.name,
            cnpj: value.cnpj.as_str().to_owned(),
            created_at: value.created_at,
        }
    }
}

impl From<CondominiumSummary> for CondominiumListItemDto {
    fn from(value: CondominiumSummary) -> Self {
        Self {
            id: value.condominium.id,
            name: value.condominium.name,
            cnpj: value.condominium.cnpj.as_str().to_owned(),
            created_at: value.condominium.created_at,
            units: value.units,
            residents: value.residents,
        }
    }
}

/// List condominiums, newest first.
#[utoipa::path(
    get,
    path = "/condos",
    params(ListCondosQuery),
    responses(
        (status = 200, description = "Paginated condominiums in the canonical envelope"),
        (status = 401, description = "Unauthorised", body = ApiError)
    ),
    tags = ["condos"],
    operation_id = "listCondos"
)]
#[get("/condos")]
pub async fn list_condos(
    state: web::Data<HttpState>,
    auth: AuthContext,
    tenant: Tenant,
    query: web::Query<ListCondosQuery>,
) -> ApiResult<web::Json<Page<CondominiumListItemDto>>> {
    auth.require(Action::Read)?;
    let query = query.into_inner();
    let page = PageRequest::normalize(query.page, query.page_size, PAGE_BOUNDS);
    let repo_query = CondominiumQuery {
        tenant_id: tenant.as_str().to_owned(),
        q: normalize_q(query.q),
        page,
    };
    let (items, total) = state
        .condos
        .list(&repo_query)
        .await
        .map_err(map_condo_error)?;
    Ok(web::Json(
        Page::new(items, total, page).map(CondominiumListItemDto::from),
    ))
}

/// Fetch one condominium.
#[utoipa::path(
    get,
    path = "/condos/{id}",
    params(("id" = Uuid, Path, description = "Condominium id")),
    responses(
        (status = 200, description = "Condominium", body = CondominiumDto),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["condos"],
    operation_id = "getCondo"
)]
#[get("/condos/{id}")]
pub async fn get_condo(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<CondominiumDto>> {
    auth.require(Action::Read)?;
    let condo = state
        .condos
        .find(id.into_inner())
        .await
        .map_err(map_condo_error)?
        .ok_or_else(condo_not_found)?;
    Ok(web::Json(condo.into()))
}

/// Register a condominium.
#[utoipa::path(
    post,
    path = "/condos",
    request_body = UpsertCondominiumRequest,
    responses(
        (status = 201, description = "Created", body = CondominiumDto),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 409, description = "Duplicate cnpj", body = ApiError)
    ),
    tags = ["condos"],
    operation_id = "createCondo"
)]
#[post("/condos")]
pub async fn create_condo(
    state: web::Data<HttpState>,
    auth: AuthContext,
    tenant: Tenant,
    payload: web::Json<UpsertCondominiumRequest>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Create)?;
    let payload = payload.into_inner();
    let name = payload
        .name
        .as_deref()
        .ok_or_else(|| missing_field("name"))?;
    let cnpj = payload
        .cnpj
        .as_deref()
        .ok_or_else(|| missing_field("cnpj"))?;
    let new = NewCondominium::try_new(name, cnpj).map_err(map_validation_error)?;
    let created = state
        .condos
        .create(tenant.as_str(), &new)
        .await
        .map_err(map_condo_error)?;
    Ok(HttpResponse::Created().json(CondominiumDto::from(created)))
}

/// Partially update a condominium.
#[utoipa::path(
    put,
    path = "/condos/{id}",
    params(("id" = Uuid, Path, description = "Condominium id")),
    request_body = UpsertCondominiumRequest,
    responses(
        (status = 200, description = "Updated", body = CondominiumDto),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Duplicate cnpj", body = ApiError)
    ),
    tags = ["condos"],
    operation_id = "updateCondo"
)]
#[put("/condos/{id}")]
pub async fn update_condo(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpsertCondominiumRequest>,
) -> ApiResult<web::Json<CondominiumDto>> {
    auth.require(Action::Update)?;
    let payload = payload.into_inner();
    let patch = CondominiumPatch::try_new(payload.name.as_deref(), payload.cnpj.as_deref())
        .map_err(map_validation_error)?;
    let updated = state
        .condos
        .update(id.into_inner(), &patch)
        .await
        .map_err(map_condo_error)?
        .ok_or_else(condo_not_found)?;
    Ok(web::Json(updated.into()))
}

/// Delete a condominium.
///
/// Children keep their references; deletion neither cascades nor is blocked.
#[utoipa::path(
    delete,
    path = "/condos/{id}",
    params(("id" = Uuid, Path, description = "Condominium id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["condos"],
    operation_id = "deleteCondo"
)]
#[delete("/condos/{id}")]
pub async fn delete_condo(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Delete)?;
    let deleted = state
        .condos
        .delete(id.into_inner())
        .await
        .map_err(map_condo_error)?;
    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(condo_not_found())
    }
}

fn condo_not_found() -> ApiError {
    ApiError::from(DomainError::not_found("condominium not found"))
}

pub(super) fn missing_field(field: &str) -> ApiError {
    ApiError::from(
        DomainError::invalid_request(format!("{field} is required"))
            .with_details(json!({ "field": field, "code": "missing_field" })),
    )
}

pub(super) fn normalize_q(q: Option<String>) -> Option<String> {
    q.map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn map_validation_error(err: CondominiumValidationError) -> ApiError {
    let field = match err {
        CondominiumValidationError::NameTooShort => "name",
        CondominiumValidationError::Cnpj(_) => "cnpj",
    };
    ApiError::from(
        DomainError::invalid_request(err.to_string())
            .with_details(json!({ "field": field, "code": "invalid_field" })),
    )
}

#[cfg(test)]
mod tests {
    //! Handler-level coverage over in-memory ports.
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestStateBuilder, bearer};
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    fn test_app(
        state: web::Data<HttpState>,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(state)
            .service(list_condos)
            .service(get_condo)
            .service(create_condo)
            .service(update_condo)
            .service(delete_condo)
    }

    #[actix_web::test]
    async fn create_then_list_round_trips() {
        let state = TestStateBuilder::new()
            .with_user("manager@condo.local", "pw-manager", Role::Manager)
            .build()
            .await;
        let token = bearer(&state, "manager@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/condos")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(serde_json::json!({
                    "name": "Residencial Aurora",
                    "cnpj": "11.222.333/0001-81"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/condos?q=aurora")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["cnpj"], "11222333000181");
        assert_eq!(body["pageSize"], 10);
    }

    #[actix_web::test]
    async fn page_size_is_clamped_to_the_documented_maximum() {
        let state = TestStateBuilder::new()
            .with_user("admin@condo.local", "pw-admin", Role::Admin)
            .build()
            .await;
        let token = bearer(&state, "admin@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/condos?pageSize=1000&page=0")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["pageSize"], 100);
        assert_eq!(body["page"], 1);
    }

    #[actix_web::test]
    async fn invalid_cnpj_checksum_is_a_400() {
        let state = TestStateBuilder::new()
            .with_user("admin@condo.local", "pw-admin", Role::Admin)
            .build()
            .await;
        let token = bearer(&state, "admin@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        for cnpj in ["11222333000199", "00000000000000"] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/condos")
                    .insert_header(("Authorization", format!("Bearer {token}")))
                    .set_json(serde_json::json!({ "name": "Bloco Teste", "cnpj": cnpj }))
                    .to_request(),
            )
            .await;
            assert_eq!(
                res.status(),
                actix_web::http::StatusCode::BAD_REQUEST,
                "cnpj {cnpj} must be rejected"
            );
        }
    }

    #[actix_web::test]
    async fn duplicate_cnpj_is_a_409() {
        let state = TestStateBuilder::new()
            .with_user("admin@condo.local", "pw-admin", Role::Admin)
            .build()
            .await;
        let token = bearer(&state, "admin@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        for expected in [
            actix_web::http::StatusCode::CREATED,
            actix_web::http::StatusCode::CONFLICT,
        ] {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/condos")
                    .insert_header(("Authorization", format!("Bearer {token}")))
                    .set_json(serde_json::json!({
                        "name": "Residencial Aurora",
                        "cnpj": "11222333000181"
                    }))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), expected);
        }
    }

    #[actix_web::test]
    async fn manager_cannot_delete() {
        let state = TestStateBuilder::new()
            .with_user("manager@condo.local", "pw-manager", Role::Manager)
            .build()
            .await;
        let token = bearer(&state, "manager@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/condos/{}", Uuid::new_v4()))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::FORBIDDEN);
    }
}
