//! End-to-end coverage of the HTTP surface over in-memory adapters.
//!
//! Exercises the fully wired application (routing, auth extraction, role
//! gating, occupancy rules, visitor lifecycle) without a database.

use std::sync::Arc;

use actix_web::{App, test as actix_test, web};
use serde_json::{Value, json};

use backend::domain::Role;
use backend::domain::ports::{
    FixtureCondominiumRepository, FixtureResidentRepository, FixtureUnitRepository,
    FixtureUserRepository, FixtureVisitorRepository, PasswordHasher, SystemClock, TokenService,
    UserRepository,
};
use backend::domain::{AuthClaims, NewUser};
use backend::inbound::http::health::HealthState;
use backend::inbound::http::state::{HttpState, HttpStatePorts};
use backend::outbound::auth::{BcryptPasswordHasher, JwtTokenService};
use backend::server::build_app;

const TEST_SECRET: &str = "integration-signing-secret";

async fn fixture_state() -> web::Data<HttpState> {
    let hasher = BcryptPasswordHasher::with_cost(4);
    let users = FixtureUserRepository::default();
    for (email, password, role) in [
        ("admin@condo.local", "pw-admin", Role::Admin),
        ("manager@condo.local", "pw-manager", Role::Manager),
        ("res@condo.local", "pw-resident", Role::Resident),
    ] {
        users
            .insert(&NewUser {
                name: email.to_owned(),
                email: email.to_owned(),
                password_hash: hasher.hash(password).expect("hash test password"),
                role,
            })
            .await
            .expect("seed test user");
    }

    web::Data::new(HttpState::new(HttpStatePorts {
        users: Arc::new(users),
        condos: Arc::new(FixtureCondominiumRepository::default()),
        units: Arc::new(FixtureUnitRepository::default()),
        residents: Arc::new(FixtureResidentRepository::default()),
        visitors: Arc::new(FixtureVisitorRepository::default()),
        tokens: Arc::new(JwtTokenService::new(TEST_SECRET)),
        passwords: Arc::new(hasher),
        clock: Arc::new(SystemClock),
    }))
}

async fn bearer(state: &web::Data<HttpState>, email: &str) -> String {
    let user = state
        .users
        .find_by_email(email)
        .await
        .expect("lookup test user")
        .expect("test user exists");
    let token = state
        .tokens
        .issue(&AuthClaims {
            subject: user.id,
            role: user.role,
        })
        .expect("issue test token");
    format!("Bearer {token}")
}

macro_rules! call {
    ($app:expr, $req:expr) => {
        actix_test::call_service($app, $req.to_request()).await
    };
}

#[actix_web::test]
async fn health_is_open_and_ready() {
    let state = fixture_state().await;
    let health = web::Data::new(HealthState::new());
    health.mark_ready();
    let app = actix_test::init_service(build_app(state, health)).await;

    let res = call!(&app, actix_test::TestRequest::get().uri("/health"));
    assert!(res.status().is_success());
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body, json!({ "ok": true }));
}

#[actix_web::test]
async fn login_flow_issues_usable_bearer_tokens() {
    let state = fixture_state().await;
    let health = web::Data::new(HealthState::new());
    let app = actix_test::init_service(build_app(state, health)).await;

    let res = call!(
        &app,
        actix_test::TestRequest::post().uri("/auth/login").set_json(json!({
            "email": "admin@condo.local",
            "password": "pw-admin"
        }))
    );
    assert!(res.status().is_success());
    let body: Value = actix_test::read_body_json(res).await;
    let token = body["token"].as_str().expect("token issued");
    assert_eq!(body["user"]["role"], "ADMIN");

    let res = call!(
        &app,
        actix_test::TestRequest::get()
            .uri("/auth/me")
            .insert_header(("Authorization", format!("Bearer {token}")))
    );
    assert!(res.status().is_success());
    let me: Value = actix_test::read_body_json(res).await;
    assert_eq!(me["email"], "admin@condo.local");

    // Requests without a credential are rejected.
    let res = call!(&app, actix_test::TestRequest::get().uri("/condos"));
    assert_eq!(res.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn occupancy_scenario_runs_through_the_full_surface() {
    let state = fixture_state().await;
    let health = web::Data::new(HealthState::new());
    let admin = bearer(&state, "admin@condo.local").await;
    let app = actix_test::init_service(build_app(state, health)).await;

    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/condos")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "name": "Residencial Aurora", "cnpj": "11.222.333/0001-81" }))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    let condo: Value = actix_test::read_body_json(res).await;
    let condo_id = condo["id"].as_str().expect("condo id");

    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/units")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "number": "101", "block": "A", "condoId": condo_id }))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    let unit: Value = actix_test::read_body_json(res).await;
    let unit_id = unit["id"].as_str().expect("unit id");

    // R1 takes the unit.
    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/residents")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({
                "name": "João Silva",
                "email": "r1@ex.com",
                "phone": "11999999999",
                "condoId": condo_id,
                "unitId": unit_id
            }))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    let r1: Value = actix_test::read_body_json(res).await;

    // R2 on the same unit conflicts with a specific reason.
    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/residents")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({
                "name": "Maria Souza",
                "email": "r2@ex.com",
                "phone": "11988888888",
                "condoId": condo_id,
                "unitId": unit_id
            }))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::CONFLICT);
    let conflict: Value = actix_test::read_body_json(res).await;
    assert_eq!(conflict["message"], "unit already has a resident");

    // Unlink R1, then R2 succeeds.
    let res = call!(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/residents/{}", r1["id"].as_str().expect("id")))
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({ "unitId": null }))
    );
    assert!(res.status().is_success());

    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/residents")
            .insert_header(("Authorization", admin.clone()))
            .set_json(json!({
                "name": "Maria Souza",
                "email": "r2@ex.com",
                "phone": "11988888888",
                "condoId": condo_id,
                "unitId": unit_id
            }))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);

    // The condo listing reflects child counts.
    let res = call!(
        &app,
        actix_test::TestRequest::get()
            .uri("/condos")
            .insert_header(("Authorization", admin.clone()))
    );
    assert!(res.status().is_success());
}

#[actix_web::test]
async fn resident_role_is_read_only_across_the_surface() {
    let state = fixture_state().await;
    let health = web::Data::new(HealthState::new());
    let admin = bearer(&state, "admin@condo.local").await;
    let resident = bearer(&state, "res@condo.local").await;
    let app = actix_test::init_service(build_app(state, health)).await;

    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/condos")
            .insert_header(("Authorization", admin))
            .set_json(json!({ "name": "Residencial Aurora", "cnpj": "11222333000181" }))
    );
    let condo: Value = actix_test::read_body_json(res).await;
    let condo_id = condo["id"].as_str().expect("condo id");

    // POST /residents with a RESIDENT credential is 403...
    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/residents")
            .insert_header(("Authorization", resident.clone()))
            .set_json(json!({
                "name": "João Silva",
                "email": "r1@ex.com",
                "phone": "11999999999",
                "condoId": condo_id
            }))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::FORBIDDEN);

    // ...while GET /residents with the same credential is 200.
    let res = call!(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/residents?condoId={condo_id}"))
            .insert_header(("Authorization", resident))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::OK);
}

#[actix_web::test]
async fn visitor_lifecycle_runs_through_the_full_surface() {
    let state = fixture_state().await;
    let health = web::Data::new(HealthState::new());
    let manager = bearer(&state, "manager@condo.local").await;
    let app = actix_test::init_service(build_app(state, health)).await;

    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/condos")
            .insert_header(("Authorization", manager.clone()))
            .set_json(json!({ "name": "Residencial Aurora", "cnpj": "11222333000181" }))
    );
    let condo: Value = actix_test::read_body_json(res).await;
    let condo_id = condo["id"].as_str().expect("condo id");

    let res = call!(
        &app,
        actix_test::TestRequest::post()
            .uri("/visitors")
            .insert_header(("Authorization", manager.clone()))
            .set_json(json!({
                "condoId": condo_id,
                "name": "Entrega Rápida",
                "kind": "DELIVERY",
                "carrier": "Sedex",
                "packages": 3
            }))
    );
    assert_eq!(res.status(), actix_web::http::StatusCode::CREATED);
    let entry: Value = actix_test::read_body_json(res).await;
    assert_eq!(entry["status"], "PENDING");
    let id = entry["id"].as_str().expect("entry id");

    // approve → handoff → checkout, then a second checkout conflicts.
    for (action, expected) in [
        ("approve", actix_web::http::StatusCode::OK),
        ("handoff", actix_web::http::StatusCode::OK),
        ("checkout", actix_web::http::StatusCode::OK),
        ("checkout", actix_web::http::StatusCode::CONFLICT),
        ("approve", actix_web::http::StatusCode::CONFLICT),
    ] {
        let res = call!(
            &app,
            actix_test::TestRequest::post()
                .uri(&format!("/visitors/{id}/{action}"))
                .insert_header(("Authorization", manager.clone()))
        );
        assert_eq!(res.status(), expected, "action {action}");
    }

    let res = call!(
        &app,
        actix_test::TestRequest::get()
            .uri(&format!("/visitors?condoId={condo_id}&status=CHECKED_OUT"))
            .insert_header(("Authorization", manager.clone()))
    );
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["handedOff"], true);
    assert_eq!(body["pageSize"], 8);
}
