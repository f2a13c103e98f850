//! OpenAPI surface aggregated from the endpoint annotations.

use utoipa::OpenApi;

use crate::domain::{ErrorCode, Role, VisitorKind, VisitorStatus};
use crate::inbound::http::condos::{CondominiumDto, CondominiumListItemDto, UpsertCondominiumRequest};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::residents::{CreateResidentRequest, ResidentDto, UpdateResidentRequest};
use crate::inbound::http::units::{CreateUnitRequest, UnitDto, UpdateUnitRequest};
use crate::inbound::http::users::{LoginRequest, LoginResponse, MeResponse, UserSummary};
use crate::inbound::http::visitors::{
    CreateVisitorRequest, RejectVisitorRequest, UpdateVisitorRequest, VisitorDto,
};

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::inbound::http::health::health,
        crate::inbound::http::users::login,
        crate::inbound::http::users::me,
        crate::inbound::http::condos::list_condos,
        crate::inbound::http::condos::get_condo,
        crate::inbound::http::condos::create_condo,
        crate::inbound::http::condos::update_condo,
        crate::inbound::http::condos::delete_condo,
        crate::inbound::http::units::list_units,
        crate::inbound::http::units::get_unit,
        crate::inbound::http::units::create_unit,
        crate::inbound::http::units::update_unit,
        crate::inbound::http::units::delete_unit,
        crate::inbound::http::residents::list_residents,
        crate::inbound::http::residents::get_resident,
        crate::inbound::http::residents::create_resident,
        crate::inbound::http::residents::update_resident,
        crate::inbound::http::residents::delete_resident,
        crate::inbound::http::visitors::list_visitors,
        crate::inbound::http::visitors::get_visitor,
        crate::inbound::http::visitors::create_visitor,
        crate::inbound::http::visitors::update_visitor,
        crate::inbound::http::visitors::approve_visitor,
        crate::inbound::http::visitors::reject_visitor,
        crate::inbound::http::visitors::checkout_visitor,
        crate::inbound::http::visitors::handoff_visitor,
        crate::inbound::http::visitors::delete_visitor,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        Role,
        VisitorKind,
        VisitorStatus,
        LoginRequest,
        LoginResponse,
        MeResponse,
        UserSummary,
        CondominiumDto,
        CondominiumListItemDto,
        UpsertCondominiumRequest,
        UnitDto,
        CreateUnitRequest,
        UpdateUnitRequest,
        ResidentDto,
        CreateResidentRequest,
        UpdateResidentRequest,
        VisitorDto,
        CreateVisitorRequest,
        UpdateVisitorRequest,
        RejectVisitorRequest,
    )),
    tags(
        (name = "health", description = "Service health"),
        (name = "auth", description = "Identity and access"),
        (name = "condos", description = "Condominium directory"),
        (name = "units", description = "Unit registry"),
        (name = "residents", description = "Residents and occupancy"),
        (name = "visitors", description = "Visitor check-in lifecycle"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;

    #[test]
    fn openapi_document_builds_and_lists_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/auth/login"));
        assert!(paths.contains_key("/visitors/{id}/handoff"));
        assert!(paths.contains_key("/residents/{id}"));
    }
}
