//! End-to-end tests exercising the HTTP surface: registration, sign-in,
//! the password reset flow, and the access gate.

use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, HttpResponse, test, web};
use flock_rs::auth::AuthService;
use flock_rs::auth::middleware::{AccessGate, SESSION_COOKIE};
use flock_rs::config::Config;
use flock_rs::models::{DirectoryEntry, Role};
use flock_rs::server::{AppState, routes};
use flock_rs::services::mailer::LogMailer;
use flock_rs::storage::{CredentialStore, MemoryStore};
use serde_json::{Value, json};
use std::sync::Arc;
use uuid::Uuid;

fn test_state() -> (Arc<MemoryStore>, AppState) {
    let store = Arc::new(MemoryStore::new());
    let config = Config::default();
    let auth = AuthService::new(&config, store.clone(), Arc::new(LogMailer));
    let state = AppState::new(config, auth);
    (store, state)
}

/// Build the test service: the real routes behind the real gate, with a
/// catch-all standing in for page rendering.
macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .wrap(AccessGate)
                .configure(routes::configure)
                .default_service(web::to(|| async { HttpResponse::Ok().body("page") })),
        )
        .await
    };
}

macro_rules! post_json {
    ($service:expr, $uri:expr, $body:expr) => {{
        let req = test::TestRequest::post().uri($uri).set_json($body).to_request();
        test::call_service($service, req).await
    }};
}

macro_rules! get_page {
    ($service:expr, $uri:expr) => {{
        let req = test::TestRequest::get().uri($uri).to_request();
        test::call_service($service, req).await
    }};
    ($service:expr, $uri:expr, $token:expr) => {{
        let req = test::TestRequest::get()
            .uri($uri)
            .cookie(Cookie::new(SESSION_COOKIE, $token))
            .to_request();
        test::call_service($service, req).await
    }};
}

/// Seed a directory entry, register an account against it, sign in, and
/// return the session token.
macro_rules! signin_as {
    ($store:expr, $service:expr, $role:expr, $email:expr) => {{
        $store.insert_member(DirectoryEntry {
            id: Uuid::new_v4(),
            name: "Test".to_string(),
            email: $email.to_string(),
            role: $role,
        });
        let res = post_json!(
            $service,
            "/api/auth/register",
            json!({"name": "Test", "email": $email, "password": "password123"})
        );
        assert_eq!(res.status(), StatusCode::CREATED);
        let res = post_json!(
            $service,
            "/api/auth/signin",
            json!({"email": $email, "password": "password123"})
        );
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        body["token"].as_str().unwrap().to_string()
    }};
}

fn location<B>(res: &actix_web::dev::ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .expect("redirect should carry a Location header")
        .to_str()
        .unwrap()
}

#[actix_web::test]
async fn test_register_signin_signout_cycle() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    let res = post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "Jane", "email": "jane@church.org", "password": "password123"})
    );
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["email"], "jane@church.org");
    assert_eq!(body["role"], "member");
    assert!(body.get("password_hash").is_none());

    let res = post_json!(
        &service,
        "/api/auth/signin",
        json!({"email": "jane@church.org", "password": "password123"})
    );
    assert_eq!(res.status(), StatusCode::OK);
    let session_cookie = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("sign-in should set the session cookie");
    assert!(!session_cookie.value().is_empty());
    let body: Value = test::read_body_json(res).await;
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["user"]["email"], "jane@church.org");

    let req = test::TestRequest::post().uri("/api/auth/signout").to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let removal = res
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("sign-out should clear the session cookie");
    assert!(removal.value().is_empty());
}

#[actix_web::test]
async fn test_signin_wrong_password_is_unauthorized() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "Jane", "email": "jane@church.org", "password": "password123"})
    );

    let res = post_json!(
        &service,
        "/api/auth/signin",
        json!({"email": "jane@church.org", "password": "wrong-password"})
    );
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Invalid email or password");
}

#[actix_web::test]
async fn test_register_validation_errors() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    let res = post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "  ", "email": "jane@church.org", "password": "password123"})
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Name, email, and password are required");

    let res = post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "Jane", "email": "jane@church.org", "password": "short"})
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Password must be at least 8 characters long");

    post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "Jane", "email": "jane@church.org", "password": "password123"})
    );
    let res = post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "Jane", "email": "jane@church.org", "password": "password123"})
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Email already in use");
}

#[actix_web::test]
async fn test_password_reset_flow() {
    let (store, state) = test_state();
    let service = init_app!(state);

    post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "Jane", "email": "jane@church.org", "password": "password123"})
    );

    // Requesting a reset never reveals whether the email exists
    let res = post_json!(
        &service,
        "/api/auth/forgot-password",
        json!({"email": "jane@church.org"})
    );
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], true);

    let res = post_json!(
        &service,
        "/api/auth/forgot-password",
        json!({"email": "nobody@church.org"})
    );
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["success"], true);

    // The stored token verifies, consumes once, and rejects replay
    let token = store
        .find_by_email("jane@church.org")
        .await
        .unwrap()
        .unwrap()
        .reset_token
        .expect("forgot-password should store a reset token");

    let res = get_page!(&service, &format!("/api/auth/verify-token?token={}", token));
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["valid"], true);

    let res = post_json!(
        &service,
        "/api/auth/reset-password",
        json!({"token": token, "password": "new-password"})
    );
    assert_eq!(res.status(), StatusCode::OK);

    let res = post_json!(
        &service,
        "/api/auth/reset-password",
        json!({"token": token, "password": "another-password"})
    );
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["error"], "Invalid or expired token");

    // Old password out, new password in
    let res = post_json!(
        &service,
        "/api/auth/signin",
        json!({"email": "jane@church.org", "password": "password123"})
    );
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = post_json!(
        &service,
        "/api/auth/signin",
        json!({"email": "jane@church.org", "password": "new-password"})
    );
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_verify_token_handles_garbage() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    let res = get_page!(&service, "/api/auth/verify-token?token=not-a-real-token");
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["valid"], false);

    let res = get_page!(&service, "/api/auth/verify-token");
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_gate_redirects_anonymous_to_signin() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    let res = get_page!(&service, "/dashboard");
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/signin?callbackUrl=%2Fdashboard");

    let res = get_page!(&service, "/events/new");
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/signin?callbackUrl=%2Fevents%2Fnew");
}

#[actix_web::test]
async fn test_gate_enforces_role_tiers() {
    let (store, state) = test_state();
    let service = init_app!(state);

    let member = signin_as!(store, &service, Role::Member, "member@church.org");
    let leader = signin_as!(store, &service, Role::Leader, "leader@church.org");
    let admin = signin_as!(store, &service, Role::Admin, "admin@church.org");

    // Admin-only pages send lesser roles home
    let res = get_page!(&service, "/dashboard", member.clone());
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/");

    let res = get_page!(&service, "/dashboard", leader.clone());
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);

    let res = get_page!(&service, "/dashboard", admin.clone());
    assert_eq!(res.status(), StatusCode::OK);

    // Leader-tier pages admit leader and above
    let res = get_page!(&service, "/members/new", member.clone());
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/");

    let res = get_page!(&service, "/members/new", leader.clone());
    assert_eq!(res.status(), StatusCode::OK);

    // Authenticated pages admit any signed-in role
    let res = get_page!(&service, "/events/new", member);
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_gate_treats_garbage_session_as_anonymous() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    let res = get_page!(&service, "/dashboard", "not-a-jwt");
    assert_eq!(res.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&res), "/auth/signin?callbackUrl=%2Fdashboard");
}

#[actix_web::test]
async fn test_gate_skips_public_paths_and_assets() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    for uri in ["/", "/about", "/favicon.ico", "/static/app.css", "/health"] {
        let res = get_page!(&service, uri);
        assert_eq!(res.status(), StatusCode::OK, "expected {} to be public", uri);
    }
}

#[actix_web::test]
async fn test_gate_accepts_bearer_sessions() {
    let (store, state) = test_state();
    let service = init_app!(state);

    let admin = signin_as!(store, &service, Role::Admin, "admin@church.org");

    let req = test::TestRequest::get()
        .uri("/dashboard")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", admin)))
        .to_request();
    let res = test::call_service(&service, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_signin_lockout_after_repeated_failures() {
    let (_store, state) = test_state();
    let service = init_app!(state);

    post_json!(
        &service,
        "/api/auth/register",
        json!({"name": "Jane", "email": "jane@church.org", "password": "password123"})
    );

    let attempt = json!({"email": "jane@church.org", "password": "wrong-password"});
    for _ in 0..4 {
        let res = post_json!(&service, "/api/auth/signin", attempt.clone());
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }
    let res = post_json!(&service, "/api/auth/signin", attempt.clone());
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

    // The right password doesn't help while locked out
    let res = post_json!(
        &service,
        "/api/auth/signin",
        json!({"email": "jane@church.org", "password": "password123"})
    );
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
}
