//! Server construction and wiring of ports into adapters.

mod config;

pub use config::{AppConfig, ConfigError, SeedAdmin};

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

use crate::domain::ports::SystemClock;
#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::condos::{
    create_condo, delete_condo, get_condo, list_condos, update_condo,
};
use crate::inbound::http::health::{HealthState, health};
use crate::inbound::http::residents::{
    create_resident, delete_resident, get_resident, list_residents, update_resident,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::inbound::http::units::{create_unit, delete_unit, get_unit, list_units, update_unit};
use crate::inbound::http::users::{login, me};
use crate::inbound::http::visitors::{
    approve_visitor, checkout_visitor, create_visitor, delete_visitor, get_visitor, handoff_visitor,
    list_visitors, reject_visitor, update_visitor,
};
use crate::outbound::auth::{BcryptPasswordHasher, JwtTokenService};
use crate::outbound::persistence::{
    DbPool, DieselCondominiumRepository, DieselResidentRepository, DieselUnitRepository,
    DieselUserRepository, DieselVisitorRepository, seed_admin_user,
};

/// Wire the Diesel adapters and crypto services into handler state.
pub fn build_state(pool: DbPool, jwt_secret: &str) -> HttpState {
    HttpState::new(HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        condos: Arc::new(DieselCondominiumRepository::new(pool.clone())),
        units: Arc::new(DieselUnitRepository::new(pool.clone())),
        residents: Arc::new(DieselResidentRepository::new(pool.clone())),
        visitors: Arc::new(DieselVisitorRepository::new(pool)),
        tokens: Arc::new(JwtTokenService::new(jwt_secret)),
        passwords: Arc::new(BcryptPasswordHasher::new()),
        clock: Arc::new(SystemClock),
    })
}

/// Assemble the application with every endpoint mounted.
pub fn build_app(
    state: web::Data<HttpState>,
    health_state: web::Data<HealthState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(state)
        .app_data(health_state)
        .service(health)
        .service(login)
        .service(me)
        .service(list_condos)
        .service(get_condo)
        .service(create_condo)
        .service(update_condo)
        .service(delete_condo)
        .service(list_units)
        .service(get_unit)
        .service(create_unit)
        .service(update_unit)
        .service(delete_unit)
        .service(list_residents)
        .service(get_resident)
        .service(create_resident)
        .service(update_resident)
        .service(delete_resident)
        .service(list_visitors)
        .service(get_visitor)
        .service(create_visitor)
        .service(update_visitor)
        .service(approve_visitor)
        .service(reject_visitor)
        .service(checkout_visitor)
        .service(handoff_visitor)
        .service(delete_visitor);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Run the server until shutdown.
pub async fn run(config: AppConfig) -> std::io::Result<()> {
    let pool = DbPool::connect(&config.database_url, config.pool_size)
        .await
        .map_err(std::io::Error::other)?;
    let state = web::Data::new(build_state(pool, &config.jwt_secret));

    if let Some(seed) = &config.seed_admin {
        seed_admin_user(
            state.users.as_ref(),
            state.passwords.as_ref(),
            &seed.email,
            &seed.password,
        )
        .await
        .map_err(std::io::Error::other)?;
    }

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness flag stays shared.
    let server_state = state.clone();
    let server_health_state = health_state.clone();
    let server = HttpServer::new(move || {
        build_app(server_state.clone(), server_health_state.clone())
    })
    .bind(config.bind_addr)?;

    health_state.mark_ready();
    info!(addr = %config.bind_addr, "listening");
    server.run().await
}
