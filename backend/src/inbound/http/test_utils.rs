//! Shared fixtures for handler-level tests.
//!
//! Builds an [`HttpState`] over the in-memory fixture repositories with a
//! real JWT token service and a low-cost bcrypt hasher so auth flows run
//! end-to-end without a database.

use std::sync::Arc;

use actix_web::web;

use crate::domain::ports::{
    FixtureCondominiumRepository, FixtureResidentRepository, FixtureUnitRepository,
    FixtureUserRepository, FixtureVisitorRepository, PasswordHasher, SystemClock, TokenService,
    UserRepository,
};
use crate::domain::{AuthClaims, NewUser, Role};
use crate::outbound::auth::{BcryptPasswordHasher, JwtTokenService};

use super::state::{HttpState, HttpStatePorts};

const TEST_SECRET: &str = "test-signing-secret";

/// Minimum bcrypt cost keeps the test suite fast.
const TEST_BCRYPT_COST: u32 = 4;

/// Builder accumulating seed users for a fixture-backed state.
pub(crate) struct TestStateBuilder {
    users: Vec<(String, String, Role)>,
}

impl TestStateBuilder {
    pub(crate) fn new() -> Self {
        Self { users: Vec::new() }
    }

    pub(crate) fn with_user(mut self, email: &str, password: &str, role: Role) -> Self {
        self.users
            .push((email.to_owned(), password.to_owned(), role));
        self
    }

    pub(crate) async fn build(self) -> web::Data<HttpState> {
        let hasher = BcryptPasswordHasher::with_cost(TEST_BCRYPT_COST);
        let users = FixtureUserRepository::default();
        for (email, password, role) in &self.users {
            let password_hash = hasher.hash(password).expect("hash test password");
            users
                .insert(&NewUser {
                    name: email
                        .split_once('@')
                        .map_or_else(|| email.clone(), |(local, _)| local.to_owned()),
                    email: email.clone(),
                    password_hash,
                    role: *role,
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
}

/// Issue a bearer token for a previously seeded user.
pub(crate) async fn bearer(state: &web::Data<HttpState>, email: &str) -> String {
    let user = state
        .users
        .find_by_email(email)
        .await
        .expect("lookup test user")
        .expect("test user exists");
    state
        .tokens
        .issue(&AuthClaims {
            subject: user.id,
            role: user.role,
        })
        .expect("issue test token")
}
