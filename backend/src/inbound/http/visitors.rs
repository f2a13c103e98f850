//! Visitor check-in endpoints and lifecycle actions.
//!
//! Status only ever moves through the action endpoints
//! (`/approve`, `/reject`, `/checkout`, `/handoff`); `PUT` is limited to
//! identification and schedule fields.

use actix_web::{HttpResponse, delete, get, post, put, web};
use chrono::{DateTime, NaiveDateTime, Utc};
use pagination::{Page, PageBounds, PageRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::ports::{SortDirection, VisitorQuery, VisitorSortField};
use crate::domain::{
    Action, DomainError, NewVisitorEntry, VisitorEntry, VisitorIdentification, VisitorKind,
    VisitorPatch, VisitorStatus, VisitorValidationError,
};

use super::ApiResult;
use super::auth::AuthContext;
use super::condos::{missing_field, normalize_q};
use super::error::ApiError;
use super::state::HttpState;

const PAGE_BOUNDS: PageBounds = match PageBounds::try_new(8, 100) {
    Ok(bounds) => bounds,
    Err(_) => unreachable!(),
};

/// Sentinel accepted in `status`/`kind` filters meaning "no filter".
const ALL_SENTINEL: &str = "ALL";

/// Query parameters for `GET /visitors`.
#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListVisitorsQuery {
    /// Required condominium scope.
    pub condo_id: Option<Uuid>,
    /// Restrict to one unit.
    pub unit_id: Option<Uuid>,
    /// Case-insensitive substring over name/document/plate.
    pub q: Option<String>,
    /// Status filter; `ALL` or absent means no filter.
    pub status: Option<String>,
    /// Kind filter; `ALL` or absent means no filter.
    pub kind: Option<String>,
    /// Inclusive lower bound on check-in time.
    pub from: Option<String>,
    /// Inclusive upper bound on check-in time.
    pub to: Option<String>,
    /// Sort column: `checkInAt` (default), `checkOutAt`, or `name`.
    pub sort_by: Option<String>,
    /// Sort direction: `asc` or `desc` (default).
    pub sort_dir: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    /// Page size, clamped to 100.
    pub page_size: Option<i64>,
}

/// Visitor entry payload.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VisitorDto {
    /// Primary identifier.
    pub id: Uuid,
    /// Owning condominium.
    pub condo_id: Uuid,
    /// Destination unit, if any.
    pub unit_id: Option<Uuid>,
    /// Entry classification.
    pub kind: VisitorKind,
    /// Lifecycle status.
    pub status: VisitorStatus,
    /// Person name.
    pub name: String,
    /// Identity document, if provided.
    pub document: Option<String>,
    /// Vehicle plate, if provided.
    pub plate: Option<String>,
    /// Contact phone, if provided.
    pub phone: Option<String>,
    /// Contact email, if provided.
    pub email: Option<String>,
    /// Free-form gate note.
    pub note: Option<String>,
    /// Carrier name (deliveries).
    pub carrier: Option<String>,
    /// Package count (deliveries).
    pub packages: Option<i32>,
    /// Whether a delivery has been handed to the resident.
    pub handed_off: bool,
    /// Actual arrival timestamp.
    pub check_in_at: DateTime<Utc>,
    /// Departure timestamp.
    pub check_out_at: Option<DateTime<Utc>>,
    /// Scheduled arrival.
    pub expected_in_at: Option<DateTime<Utc>>,
    /// Approval timestamp.
    pub approved_at: Option<DateTime<Utc>>,
    /// Subject id of the approver.
    pub approved_by: Option<String>,
    /// Free-text rejection reason.
    pub rejection_reason: Option<String>,
    /// Record creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<VisitorEntry> for VisitorDto {
    fn from(value: VisitorEntry) -> Self {
        Self {
            id: value.id,
            condo_id: value.condo_id,
            unit_id: value.unit_id,
            kind: value.kind,
            status: value.status,
            name: value.name,
            document: value.document,
            plate: value.plate,
            phone: value.phone,
            email: value.email,
            note: value.note,
            carrier: value.carrier,
            packages: value.packages,
            handed_off: value.handed_off,
            check_in_at: value.check_in_at,
            check_out_at: value.check_out_at,
            expected_in_at: value.expected_in_at,
            approved_at: value.approved_at,
            approved_by: value.approved_by,
            rejection_reason: value.rejection_reason,
            created_at: value.created_at,
        }
    }
}

/// Create request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateVisitorRequest {
    /// Owning condominium.
    pub condo_id: Uuid,
    /// Destination unit.
    pub unit_id: Option<Uuid>,
    /// Entry classification; defaults to `VISITOR`.
    pub kind: Option<VisitorKind>,
    /// Person name (required, trimmed).
    pub name: String,
    /// Identity document.
    pub document: Option<String>,
    /// Vehicle plate.
    pub plate: Option<String>,
    /// Contact phone.
    pub phone: Option<String>,
    /// Contact email.
    pub email: Option<String>,
    /// Free-form gate note.
    pub note: Option<String>,
    /// Carrier name (deliveries only; cleared otherwise).
    pub carrier: Option<String>,
    /// Package count (deliveries only; cleared otherwise).
    pub packages: Option<i32>,
    /// Actual arrival; server time when absent.
    pub check_in_at: Option<DateTime<Utc>>,
    /// Scheduled arrival.
    pub expected_in_at: Option<DateTime<Utc>>,
}

/// Update request body (identification/schedule fields only).
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateVisitorRequest {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement document.
    pub document: Option<String>,
    /// Replacement plate.
    pub plate: Option<String>,
    /// Replacement phone.
    pub phone: Option<String>,
    /// Replacement email.
    pub email: Option<String>,
    /// Replacement note.
    pub note: Option<String>,
    /// Replacement carrier (deliveries only).
    pub carrier: Option<String>,
    /// Replacement package count (deliveries only).
    pub packages: Option<i32>,
    /// Unit-link change: omitted = untouched, `null` = unlink, id = relink.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub unit_id: Option<Option<Uuid>>,
    /// Replacement scheduled arrival.
    pub expected_in_at: Option<DateTime<Utc>>,
}

/// Reject request body.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RejectVisitorRequest {
    /// Optional free-text reason, stored as given.
    pub reason: Option<String>,
}

/// List visitor entries for a condominium.
#[utoipa::path(
    get,
    path = "/visitors",
    params(ListVisitorsQuery),
    responses(
        (status = 200, description = "Paginated visitor entries in the canonical envelope"),
        (status = 400, description = "Invalid filter", body = ApiError),
        (status = 401, description = "Unauthorised", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "listVisitors"
)]
#[get("/visitors")]
pub async fn list_visitors(
    state: web::Data<HttpState>,
    auth: AuthContext,
    query: web::Query<ListVisitorsQuery>,
) -> ApiResult<web::Json<Page<VisitorDto>>> {
    auth.require(Action::Read)?;
    let query = query.into_inner();
    let condo_id = query.condo_id.ok_or_else(|| missing_field("condoId"))?;
    let page = PageRequest::normalize(query.page, query.page_size, PAGE_BOUNDS);

    let repo_query = VisitorQuery {
        condo_id,
        unit_id: query.unit_id,
        q: normalize_q(query.q),
        status: parse_sentinel_filter(query.status.as_deref(), "status")?,
        kind: parse_sentinel_filter(query.kind.as_deref(), "kind")?,
        from: parse_timestamp(query.from.as_deref(), "from")?,
        to: parse_timestamp(query.to.as_deref(), "to")?,
        sort_by: parse_sort_by(query.sort_by.as_deref()),
        sort_dir: parse_sort_dir(query.sort_dir.as_deref()),
        page,
    };
    let (items, total) = state.visitors_service.list(&repo_query).await?;
    Ok(web::Json(Page::new(items, total, page).map(VisitorDto::from)))
}

/// Fetch one visitor entry.
#[utoipa::path(
    get,
    path = "/visitors/{id}",
    params(("id" = Uuid, Path, description = "Visitor entry id")),
    responses(
        (status = 200, description = "Visitor entry", body = VisitorDto),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "getVisitor"
)]
#[get("/visitors/{id}")]
pub async fn get_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<VisitorDto>> {
    auth.require(Action::Read)?;
    let entry = state.visitors_service.get(id.into_inner()).await?;
    Ok(web::Json(entry.into()))
}

/// Register a check-in request; the entry starts `PENDING`.
#[utoipa::path(
    post,
    path = "/visitors",
    request_body = CreateVisitorRequest,
    responses(
        (status = 201, description = "Created", body = VisitorDto),
        (status = 400, description = "Invalid request or unit", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Condominium not found", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "createVisitor"
)]
#[post("/visitors")]
pub async fn create_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    payload: web::Json<CreateVisitorRequest>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Create)?;
    let payload = payload.into_inner();
    let new = NewVisitorEntry::try_new(
        payload.condo_id,
        payload.unit_id,
        payload.kind,
        &payload.name,
        VisitorIdentification {
            document: payload.document,
            plate: payload.plate,
            phone: payload.phone,
            email: payload.email,
            note: payload.note,
        },
        payload.carrier.as_deref(),
        payload.packages,
        payload.check_in_at,
        payload.expected_in_at,
    )
    .map_err(map_validation_error)?;
    let created = state.visitors_service.create(new).await?;
    Ok(HttpResponse::Created().json(VisitorDto::from(created)))
}

/// Partially update identification/schedule fields.
#[utoipa::path(
    put,
    path = "/visitors/{id}",
    params(("id" = Uuid, Path, description = "Visitor entry id")),
    request_body = UpdateVisitorRequest,
    responses(
        (status = 200, description = "Updated", body = VisitorDto),
        (status = 400, description = "Invalid request or unit", body = ApiError),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "updateVisitor"
)]
#[put("/visitors/{id}")]
pub async fn update_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
    payload: web::Json<UpdateVisitorRequest>,
) -> ApiResult<web::Json<VisitorDto>> {
    auth.require(Action::Update)?;
    let payload = payload.into_inner();
    let patch = VisitorPatch::try_new(
        payload.name.as_deref(),
        VisitorIdentification {
            document: payload.document,
            plate: payload.plate,
            phone: payload.phone,
            email: payload.email,
            note: payload.note,
        },
        payload.carrier.as_deref(),
        payload.packages,
        payload.unit_id,
        payload.expected_in_at,
    )
    .map_err(map_validation_error)?;
    let updated = state
        .visitors_service
        .update(id.into_inner(), &patch)
        .await?;
    Ok(web::Json(updated.into()))
}

/// Approve a pending entry.
#[utoipa::path(
    post,
    path = "/visitors/{id}/approve",
    params(("id" = Uuid, Path, description = "Visitor entry id")),
    responses(
        (status = 200, description = "Approved", body = VisitorDto),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Invalid transition", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "approveVisitor"
)]
#[post("/visitors/{id}/approve")]
pub async fn approve_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<VisitorDto>> {
    auth.require(Action::Update)?;
    let approved = state
        .visitors_service
        .approve(id.into_inner(), &auth.user_id.to_string())
        .await?;
    Ok(web::Json(approved.into()))
}

/// Reject a pending entry.
#[utoipa::path(
    post,
    path = "/visitors/{id}/reject",
    params(("id" = Uuid, Path, description = "Visitor entry id")),
    request_body = RejectVisitorRequest,
    responses(
        (status = 200, description = "Rejected", body = VisitorDto),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Invalid transition", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "rejectVisitor"
)]
#[post("/visitors/{id}/reject")]
pub async fn reject_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
    payload: Option<web::Json<RejectVisitorRequest>>,
) -> ApiResult<web::Json<VisitorDto>> {
    auth.require(Action::Update)?;
    let reason = payload.and_then(|body| body.into_inner().reason);
    let rejected = state
        .visitors_service
        .reject(id.into_inner(), reason)
        .await?;
    Ok(web::Json(rejected.into()))
}

/// Close out an entry; valid once from any non-terminal state.
#[utoipa::path(
    post,
    path = "/visitors/{id}/checkout",
    params(("id" = Uuid, Path, description = "Visitor entry id")),
    responses(
        (status = 200, description = "Checked out", body = VisitorDto),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Already checked out", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "checkoutVisitor"
)]
#[post("/visitors/{id}/checkout")]
pub async fn checkout_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<VisitorDto>> {
    auth.require(Action::Update)?;
    let entry = state.visitors_service.checkout(id.into_inner()).await?;
    Ok(web::Json(entry.into()))
}

/// Mark an approved delivery as handed to the resident.
#[utoipa::path(
    post,
    path = "/visitors/{id}/handoff",
    params(("id" = Uuid, Path, description = "Visitor entry id")),
    responses(
        (status = 200, description = "Handed off", body = VisitorDto),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError),
        (status = 409, description = "Wrong kind or status", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "handoffVisitor"
)]
#[post("/visitors/{id}/handoff")]
pub async fn handoff_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<web::Json<VisitorDto>> {
    auth.require(Action::Update)?;
    let entry = state.visitors_service.handoff(id.into_inner()).await?;
    Ok(web::Json(entry.into()))
}

/// Delete a visitor entry.
#[utoipa::path(
    delete,
    path = "/visitors/{id}",
    params(("id" = Uuid, Path, description = "Visitor entry id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = ApiError),
        (status = 404, description = "Not found", body = ApiError)
    ),
    tags = ["visitors"],
    operation_id = "deleteVisitor"
)]
#[delete("/visitors/{id}")]
pub async fn delete_visitor(
    state: web::Data<HttpState>,
    auth: AuthContext,
    id: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    auth.require(Action::Delete)?;
    state.visitors_service.delete(id.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Parse a `status`/`kind` filter honouring the `ALL` sentinel.
fn parse_sentinel_filter<T: std::str::FromStr>(
    value: Option<&str>,
    field: &str,
) -> Result<Option<T>, ApiError> {
    match value.map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) if v.eq_ignore_ascii_case(ALL_SENTINEL) => Ok(None),
        Some(v) => v.parse::<T>().map(Some).map_err(|_| {
            ApiError::from(
                DomainError::invalid_request(format!("unknown {field}: {v}"))
                    .with_details(json!({ "field": field, "code": "invalid_filter" })),
            )
        }),
    }
}

/// Accept RFC 3339 (`2025-10-12T00:00:00Z`) or the browser's
/// `datetime-local` shape (`2025-10-12T21:00`), read as UTC.
fn parse_timestamp(value: Option<&str>, field: &str) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Ok(Some(instant.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(Some(naive.and_utc()));
        }
    }
    Err(ApiError::from(
        DomainError::invalid_request(format!("invalid timestamp: {raw}"))
            .with_details(json!({ "field": field, "code": "invalid_timestamp" })),
    ))
}

fn parse_sort_by(value: Option<&str>) -> VisitorSortField {
    match value {
        Some("name") => VisitorSortField::Name,
        Some("checkOutAt") => VisitorSortField::CheckOutAt,
        _ => VisitorSortField::CheckInAt,
    }
}

fn parse_sort_dir(value: Option<&str>) -> SortDirection {
    match value {
        Some(v) if v.eq_ignore_ascii_case("asc") => SortDirection::Asc,
        _ => SortDirection::Desc,
    }
}

fn map_validation_error(err: VisitorValidationError) -> ApiError {
    let field = match err {
        VisitorValidationError::EmptyName => "name",
        VisitorValidationError::NegativePackages => "packages",
    };
    ApiError::from(
        DomainError::invalid_request(err.to_string())
            .with_details(json!({ "field": field, "code": "invalid_field" })),
    )
}
