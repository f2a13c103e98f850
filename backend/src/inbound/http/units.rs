//! Unit registry endpoints.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PageBounds, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::UnitQuery;
use crate::domain::occupancy::map_unit_error;
use crate::domain::{
    Action, DomainError, NewUnit, Unit, UnitPatch, UnitValidationError, map_condo_error,
};

use super::ApiResult;
use super::auth::AuthContext;
use super::condos::normalize_q;
use super::error::ApiError;
use super::state::HttpState;

const PAGE_BOUNDS: PageBounds = match PageBounds::try_new(10, 100) {
    Ok(bounds) => bounds,
    Err(_) => unreachable!(),
};

/// Query parameters for `GET /units`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListUnitsQuery {
    /// Restrict to one condominium.
    pub condo_id: Option<Uuid>,
    /// Case-insensitive substring over number/block.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size, clamped to 100.
    pub page_size: Option<i64>,
}

/// Unit entity payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnitDto {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning condominium.
    pub condo_id: Uuid,
    /// Unit number.
    pub number: String,
    /// Block/tower designation, if any.
    pub block: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Unit> for UnitDto {
    fn from(value: Unit) -> Self {
        Self {
            id: value.id,
            condo_id: value.condo_id,
            number: value.number,
            block: value.block,
            created_at: value.created_at,
        }
    }
}

/// Create request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnitRequest {
    /// Unit number (min length 1).
    pub number: String,
    /// Optional block/tower designation.
    pub block: Option<String>,
    /// Owning condominium.
    pub condo_id: Uuid,
}

/// Update request body; the condominium reference is immutable.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnitRequest {
    /// Replacement number.
    pub number: Option<String>,
    /// Replacement block.
    pub block: Option<String>,
}

/// List units ordered by block then number.
#[utoipa::path(
    get,
    path = "/units",
    params(ListUnitsQuery),
    responses(
        (status = 200, description = "Paginated units in the canonical envelope"),
        (status = 401, description = "Unauthorised", body = ApiError)
    ),
    tags = ["units"],
    operation_id = "listUnits"
)]
#[get("/units")]
pub async fn list_units(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<ListUnitsQuery>,
) -> ApiResult<web::Json<Page<UnitDto>>> {
    auth.require(Action::Read)?;
    let query = query.into_inner();
    let page = PageRequest::normalize(query.page, query.page_size, PAGE_BOUNDS);
    let repo_query = UnitQuery {
        condo_id: query.condo_id,
        q: normalize_q(query.q),
        page,
    };
    let (items, total) = state
        .units
        .list(&repo_query)
        .await
        .map_err(map_unit_error)?;
    Ok(web::Json(Page::new(items, total, page).map(UnitDto::from)))
}

/// Fetch one unit.
#[utoipa::path(
    get,
    path = "/units/{id}",
    params(("id" = Uuid, Path, description = "Unit id")),
    responses(
        (status = 200, description = "Unit", body = UnitDto),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["units"],
    operation_id = "getUnit"
)]
#[get("/units/{id}")]
pub async fn get_unit(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<UnitDto>> {
    auth.require(Action::Read)?;
    let unit = state
        .units
        .find(id.into_inner())
        .await
        .map_err(map_unit_error)?
        .ok_or_else(unit_not_found)?;
    Ok(web::Json(unit.into()))
}

/// Register a unit under a condominium.
#[utoipa::path(
    post,
    path = "/units",
    request_body = CreateUnitRequest,
    responses(
        (status = 201, description = "Created", body = UnitDto),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Condominium not found", body = ApiError)
    ),
    tags = ["units"],
    operation_id = "createUnit"
)]
#[post("/units")]
pub async fn create_unit(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateUnitRequest>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Create)?;
    let payload = payload.into_inner();

    let condo = state
        .condos
        .find(payload.condo_id)
        .await
        .map_err(map_condo_error)?;
    if condo.is_none() {
        return Err(ApiError::from(DomainError::not_found(
            "condominium not found",
        )));
    }

    let new = NewUnit::try_new(payload.condo_id, &payload.number, payload.block.as_deref())
        .map_err(map_validation_error)?;
    let created = state.units.create(&new).await.map_err(map_unit_error)?;
    Ok(HttpResponse::Created().json(UnitDto::from(created)))
}

/// Partially update a unit's number/block.
#[utoipa::path(
    put,
    path = "/units/{id}",
    params(("id" = Uuid, Path, description = "Unit id")),
    request_body = UpdateUnitRequest,
    responses(
        (status = 200, description = "Updated", body = UnitDto),
        (status = 400, description = "Invalid request", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["units"],
    operation_id = "updateUnit"
)]
#[put("/units/{id}")]
pub async fn update_unit(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateUnitRequest>,
) -> ApiResult<web::Json<UnitDto>> {
    auth.require(Action::Update)?;
    let payload = payload.into_inner();
    let patch = UnitPatch::try_new(payload.number.as_deref(), payload.block.as_deref())
        .map_err(map_validation_error)?;
    let updated = state
        .units
        .update(id.into_inner(), &patch)
        .await
        .map_err(map_unit_error)?
        .ok_or_else(unit_not_found)?;
    Ok(web::Json(updated.into()))
}

/// Delete a unit.
#[utoipa::path(
    delete,
    path = "/units/{id}",
    params(("id" = Uuid, Path, description = "Unit id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["units"],
    operation_id = "deleteUnit"
)]
#[delete("/units/{id}")]
pub async fn delete_unit(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Delete)?;
    let deleted = state
        .units
        .delete(id.into_inner())
        .await
        .map_err(map_unit_error)?;
    if deleted {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(unit_not_found())
    }
}

fn unit_not_found() -> ApiError {
    ApiError::from(DomainError::not_found("unit not found"))
}

fn map_validation_error(err: UnitValidationError) -> ApiError {
    ApiError::from(
        DomainError::invalid_request(err.to_string())
            .with_details(json!({ "field": "number", "code": "invalid_field" })),
    )
}

#[cfg(test)]
mod tests {
    //! Handler-level coverage over in-memory ports.
    use super::*;
    use crate::domain::ports::CondominiumRepository;
    use crate::domain::{NewCondominium, Role};
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
            .service(list_units)
            .service(get_unit)
            .service(create_unit)
            .service(update_unit)
            .service(delete_unit)
    }

    #[actix_web::test]
    async fn create_requires_an_existing_condominium() {
        let state = TestStateBuilder::new()
            .with_user("manager@condo.local", "pw-manager", Role::Manager)
            .build()
            .await;
        let token = bearer(&state, "manager@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/units")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(serde_json::json!({
                    "number": "101",
                    "block": "A",
                    "condoId": Uuid::new_v4()
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn duplicate_number_block_pairs_are_tolerated() {
        let state = TestStateBuilder::new()
            .with_user("manager@condo.local", "pw-manager", Role::Manager)
            .build()
            .await;
        let condo = state
            .condos
            .create(
                "default",
                &NewCondominium::try_new("Residencial Aurora", "11222333000181")
                    .expect("valid condo"),
            )
            .await
            .expect("create condo");
        let token = bearer(&state, "manager@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        for _ in 0..2 {
            let res = actix_test::call_service(
                &app,
                actix_test::TestRequest::post()
                    .uri("/units")
                    .insert_header(("Authorization", format!("Bearer {token}")))
                    .set_json(serde_json::json!({
                        "number": "101",
                        "block": "A",
                        "condoId": condo.id
                    }))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
        }

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/units?condoId={}", condo.id))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["total"], 2);
    }

    #[actix_web::test]
    async fn resident_role_cannot_create_units() {
        let state = TestStateBuilder::new()
            .with_user("res@condo.local", "pw-resident", Role::Resident)
            .build()
            .await;
        let token = bearer(&state, "res@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/units")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(serde_json::json!({
                    "number": "101",
                    "condoId": Uuid::new_v4()
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::FORBIDDEN);
    }
}
