mod common;

use axum::{Router, middleware};
use axum_test::TestServer;
use qrlink::api::dto::auth::{LoginResponse, UserResponse};
use qrlink::api::middleware::auth;
use qrlink::api::routes::{auth_routes, protected_routes};
use qrlink::state::AppState;
use serde_json::json;
use sqlx::PgPool;

use common::MockConnectInfoLayer;

fn server(state: AppState) -> TestServer {
    let protected = protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::layer,
    ));

    let app = Router::new()
        .nest("/api", protected.merge(auth_routes()))
        .layer(MockConnectInfoLayer)
        .with_state(state);

    TestServer::new(app).unwrap()
}

#[sqlx::test]
async fn test_register_and_login(pool: PgPool) {
    let server = server(common::create_test_state(pool));

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "carol",
            "email": "Carol@Example.com",
            "password": "s3cret-pass"
        }))
        .await;

    assert_eq!(response.status_code(), 201);
    let user: UserResponse = response.json();
    assert_eq!(user.username, "carol");
    assert_eq!(user.email, "carol@example.com");

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "carol@example.com", "password": "s3cret-pass" }))
        .await;

    response.assert_status_ok();
    let cookie = response
        .headers()
        .get("set-cookie")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("session_id="));
    assert!(cookie.contains("HttpOnly"));

    let login: LoginResponse = response.json();
    assert_eq!(login.user_id, user.id);

    server
        .get("/api/links")
        .add_header("Authorization", format!("Bearer {}", login.token))
        .await
        .assert_status_ok();
}

#[sqlx::test]
async fn test_register_duplicate_conflicts(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let server = server(common::create_test_state(pool));

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "alice",
            "email": "other@example.com",
            "password": "s3cret-pass"
        }))
        .await;

    assert_eq!(response.status_code(), 409);
}

#[sqlx::test]
async fn test_register_rejects_short_password(pool: PgPool) {
    let server = server(common::create_test_state(pool));

    let response = server
        .post("/api/auth/register")
        .json(&json!({
            "username": "dave",
            "email": "dave@example.com",
            "password": "123"
        }))
        .await;

    response.assert_status_bad_request();
}

#[sqlx::test]
async fn test_login_wrong_password(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let server = server(common::create_test_state(pool));

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "alice@example.com", "password": "wrong-password" }))
        .await;

    response.assert_status_unauthorized();
    assert!(response.headers().get("set-cookie").is_none());
}

#[sqlx::test]
async fn test_logout_ends_session(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let state = common::create_test_state(pool);
    let token = common::login_token(&state, "alice").await;
    let server = server(state);

    let response = server
        .post("/api/auth/logout")
        .add_header("Authorization", format!("Bearer {token}"))
        .await;
    assert_eq!(response.status_code(), 204);

    server
        .get("/api/links")
        .add_header("Authorization", format!("Bearer {token}"))
        .await
        .assert_status_unauthorized();
}

#[sqlx::test]
async fn test_expired_session_rejected(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let state = common::create_test_state(pool.clone());
    let token = common::login_token(&state, "alice").await;

    sqlx::query("UPDATE sessions SET expires_at = NOW() - INTERVAL '1 minute'")
        .execute(&pool)
        .await
        .unwrap();

    let server = server(state);
    server
        .get("/api/links")
        .add_header("Authorization", format!("Bearer {token}"))
        .await
        .assert_status_unauthorized();
}
