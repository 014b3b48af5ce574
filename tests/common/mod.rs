#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, header};
use base64::{Engine, engine::general_purpose::STANDARD};
use school_enrollment::app::build_router;
use school_enrollment::config::Config;
use school_enrollment::middleware::auth::policy::RolePolicy;
use school_enrollment::repos::{InMemoryStore, NewUser, SchoolStore, UserRow};
use school_enrollment::services::auth::{Clock, ManualClock, Role, build_token_services_with_clock};
use school_enrollment::services::password::hash_password;
use school_enrollment::state::AppState;

pub const SECRET: &str = "integration-test-secret-that-is-long-enough-for-hs512";
pub const START: i64 = 1_700_000_000;
pub const TTL: i64 = 3600;

pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("JWT_SECRET".to_string(), SECRET.to_string()),
        ("JWT_TTL_SECONDS".to_string(), TTL.to_string()),
    ]);
    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }
    Config::from_vars(|key| vars.get(key).cloned()).expect("config")
}

pub fn test_app() -> TestApp {
    test_app_with(test_config(&[]))
}

pub fn test_app_with(config: Config) -> TestApp {
    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::new(START));
    let shared_clock: Arc<dyn Clock> = clock.clone();
    let tokens = build_token_services_with_clock(&config, shared_clock).expect("token services");

    let state = AppState::new(
        store.clone(),
        tokens,
        RolePolicy::school_default(),
        config.jwt_header_name.clone(),
    );

    TestApp {
        router: build_router(state, &config),
        store,
        clock,
    }
}

pub async fn seed_user(store: &InMemoryStore, username: &str, password: &str, role: Role) -> UserRow {
    store
        .create_user(NewUser {
            name: format!("{username} name"),
            username: username.to_string(),
            password_hash: hash_password(password).expect("hash"),
            role,
        })
        .await
        .expect("seed user")
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn authed_json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

pub fn get_with_auth(uri: &str, authorization: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, authorization)
        .body(Body::empty())
        .expect("request")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn basic(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}
