//! Resident endpoints.
//!
//! Create and update both funnel through the occupancy service so the
//! one-resident-per-unit and same-condominium rules hold on every path.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PageBounds, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::occupancy::map_resident_error;
use crate::domain::ports::ResidentQuery;
use crate::domain::{
    Action, DomainError, NewResident, Resident, ResidentPatch, ResidentValidationError,
};

use super::ApiResult;
use super::auth::AuthContext;
use super::condos::{missing_field, normalize_q};
use super::error::ApiError;
use super::state::HttpState;

const PAGE_BOUNDS: PageBounds = match PageBounds::try_new(10, 100) {
    Ok(bounds) => bounds,
    Err(_) => unreachable!(),
};

/// Query parameters for `GET /residents`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListResidentsQuery {
    /// Required condominium scope.
    pub condo_id: Option<Uuid>,
    /// Case-insensitive substring over name/email/phone.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size, clamped to 100.
    pub page_size: Option<i64>,
}

/// Resident entity payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResidentDto {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning condominium.
    pub condo_id: Uuid,
    /// Linked unit, if any.
    pub unit_id: Option<Uuid>,
    /// Full name.
    pub name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: String,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Resident> for ResidentDto {
    fn from(value: Resident) -> Self {
        Self {
            id: value.id,
            condo_id: value.condo_id,
            unit_id: value.unit_id,
            name: value.name,
            email: value.email,
            phone: value.phone,
            created_at: value.created_at,
        }
    }
}

/// Create request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateResidentRequest {
    /// Full name (min length 2).
    pub name: String,
    /// Globally unique contact email.
    pub email: String,
    /// Contact phone (min length 8).
    pub phone: String,
    /// Owning condominium.
    pub condo_id: Uuid,
    /// Unit to link, subject to the occupancy rules.
    pub unit_id: Option<Uuid>,
}

/// Update request body.
///
/// `unitId` distinguishes absent (leave untouched) from `null` (unlink).
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResidentRequest {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement phone.
    pub phone: Option<String>,
    /// Replacement condominium.
    pub condo_id: Option<Uuid>,
    /// Unit-link change: omitted = untouched, `null` = unlink, id = relink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub unit_id: Option<Option<Uuid>>,
}

/// List residents of one condominium ordered by name.
#[utoipa::path(
    get,
    path = "/residents",
    params(ListResidentsQuery),
    responses(
        (status = 200, description = "Paginated residents in the canonical envelope"),
        (status = 400, description = "condoId missing", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError)
    ),
    tags = ["residents"],
    operation_id = "listResidents"
)]
#[get("/residents")]
pub async fn list_residents(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<ListResidentsQuery>,
) -> ApiResult<web::Json<Page<ResidentDto>>> {
    auth.require(Action::Read)?;
    let query = query.into_inner();
    let condo_id = query.condo_id.ok_or_else(|| missing_field("condoId"))?;
    let page = PageRequest::normalize(query.page, query.page_size, PAGE_BOUNDS);
    let repo_query = ResidentQuery {
        condo_id,
        q: normalize_q(query.q),
        page,
    };
    let (items, total) = state
        .residents
        .list(&repo_query)
        .await
        .map_err(map_resident_error)?;
    Ok(web::Json(
        Page::new(items, total, page).map(ResidentDto::from),
    ))
}

/// Fetch one resident.
#[utoipa::path(
    get,
    path = "/residents/{id}",
    params(("id" = Uuid, Path, description = "Resident id")),
    responses(
        (status = 200, description = "Resident", body = ResidentDto),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["residents"],
    operation_id = "getResident"
)]
#[get("/residents/{id}")]
pub async fn get_resident(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<ResidentDto>> {
    auth.require(Action::Read)?;
    let resident = state
        .residents
        .find(id.into_inner())
        .await
        .map_err(map_resident_error)?
        .ok_or_else(|| ApiError::from(DomainError::not_found("resident not found")))?;
    Ok(web::Json(resident.into()))
}

/// Register a resident, optionally linking a unit.
#[utoipa::path(
    post,
    path = "/residents",
    request_body = CreateResidentRequest,
    responses(
        (status = 201, description = "Created", body = ResidentDto),
        (status = 400, description = "Invalid request or unit", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 409, description = "Duplicate email or occupied unit", body = ApiError)
    ),
    tags = ["residents"],
    operation_id = "createResident"
)]
#[post("/residents")]
pub async fn create_resident(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateResidentRequest>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Create)?;
    let payload = payload.into_inner();
    let new = NewResident::try_new(
        payload.condo_id,
        payload.unit_id,
        &payload.name,
        &payload.email,
        &payload.phone,
    )
    .map_err(map_validation_error)?;
    let created = state.occupancy.create_resident(&new).await?;
    Ok(HttpResponse::Created().json(ResidentDto::from(created)))
}

/// Partially update a resident.
#[utoipa::path(
    put,
    path = "/residents/{id}",
    params(("id" = Uuid, Path, description = "Resident id")),
    request_body = UpdateResidentRequest,
    responses(
        (status = 200, description = "Updated", body = ResidentDto),
        (status = 400, description = "Invalid request or unit", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Duplicate email or occupied unit", body = ApiError)
    ),
    tags = ["residents"],
    operation_id = "updateResident"
)]
#[put("/residents/{id}")]
pub async fn update_resident(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateResidentRequest>,
) -> ApiResult<web::Json<ResidentDto>> {
    auth.require(Action::Update)?;
    let payload = payload.into_inner();
    let patch = ResidentPatch::try_new(
        payload.name.as_deref(),
        payload.email.as_deref(),
        payload.phone.as_deref(),
        payload.condo_id,
        payload.unit_id,
    )
    .map_err(map_validation_error)?;
    let updated = state.occupancy.update_resident(id.into_inner(), &patch).await?;
    Ok(web::Json(updated.into()))
}

/// Delete a resident.
#[utoipa::path(
    delete,
    path = "/residents/{id}",
    params(("id" = Uuid, Path, description = "Resident id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["residents"],
    operation_id = "deleteResident"
)]
#[delete("/residents/{id}")]
pub async fn delete_resident(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Delete)?;
    state.occupancy.delete_resident(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

fn map_validation_error(err: ResidentValidationError) -> ApiError {
    let field = match err {
        ResidentValidationError::NameTooShort => "name",
        ResidentValidationError::InvalidEmail => "email",
        ResidentValidationError::PhoneTooShort => "phone",
    };
    ApiError::from(
        DomainError::invalid_request(err.to_string())
            .with_details(json!({ "field": field, "code": "invalid_field" })),
    )
}

#[cfg(test)]
mod tests {
    //! Handler-level coverage over in-memory ports, including the
    //! end-to-end occupancy scenario.
    use super::*;
    use crate::domain::ports::{CondominiumRepository, UnitRepository};
    use crate::domain::{NewCondominium, NewUnit, Role};
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
            .service(list_residents)
            .service(get_resident)
            .service(create_resident)
            .service(update_resident)
            .service(delete_resident)
    }

    async fn seeded_state() -> (web::Data<HttpState>, Uuid, Uuid) {
        let state = TestStateBuilder::new()
            .with_user("admin@condo.local", "pw-admin", Role::Admin)
            .with_user("res@condo.local", "pw-resident", Role::Resident)
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
        let unit = state
            .units
            .create(&NewUnit::try_new(condo.id, "101", Some("A")).expect("valid unit"))
            .await
            .expect("create unit");
        (state, condo.id, unit.id)
    }

    fn resident_body(condo_id: Uuid, unit_id: Option<Uuid>, email: &str) -> Value {
        serde_json::json!({
            "name": "João Silva",
            "email": email,
            "phone": "11999999999",
            "condoId": condo_id,
            "unitId": unit_id,
        })
    }

    #[actix_web::test]
    async fn occupancy_scenario_end_to_end() {
        let (state, condo_id, unit_id) = seeded_state().await;
        let token = bearer(&state, "admin@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        // R1 takes the unit.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/residents")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(resident_body(condo_id, Some(unit_id), "r1@ex.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
        let r1: Value = actix_test::read_body_json(res).await;

        // R2 on the same unit conflicts.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/residents")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(resident_body(condo_id, Some(unit_id), "r2@ex.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::CONFLICT);
        let conflict: Value = actix_test::read_body_json(res).await;
        assert_eq!(conflict["message"], "unit already has a resident");

        // Unlinking R1 frees the unit.
        let r1_id = r1["id"].as_str().expect("id string");
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::put()
                .uri(&format!("/residents/{r1_id}"))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(serde_json::json!({ "unitId": null }))
                .to_request(),
        )
        .await;
        assert!(res.status().is_success());
        let unlinked: Value = actix_test::read_body_json(res).await;
        assert!(unlinked["unitId"].is_null());

        // Now R2 succeeds.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/residents")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(resident_body(condo_id, Some(unit_id), "r2@ex.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    }

    #[actix_web::test]
    async fn resident_role_is_read_only_end_to_end() {
        let (state, condo_id, _unit_id) = seeded_state().await;
        let token = bearer(&state, "res@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/residents")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(resident_body(condo_id, None, "r1@ex.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::FORBIDDEN);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/residents?condoId={condo_id}"))
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::OK);
    }

    #[actix_web::test]
    async fn list_requires_condo_id() {
        let (state, _condo_id, _unit_id) = seeded_state().await;
        let token = bearer(&state, "admin@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/residents")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "missing_field");
    }

    #[actix_web::test]
    async fn cross_condo_unit_is_a_400() {
        let (state, _condo_id, unit_id) = seeded_state().await;
        let other = state
            .condos
            .create(
                "default",
                &NewCondominium::try_new("Residencial Brisas", "59541264000103")
                    .expect("valid condo"),
            )
            .await
            .expect("create condo");
        let token = bearer(&state, "admin@condo.local").await;
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/residents")
                .insert_header(("Authorization", format!("Bearer {token}")))
                .set_json(resident_body(other.id, Some(unit_id), "r1@ex.com"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body["details"]["code"], "unit_not_in_condo");
    }
}
