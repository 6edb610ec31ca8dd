mod common;

use axum::{Router, middleware, routing::get};
use axum_test::TestServer;
use qrlink::api::dto::links::{LinkListResponse, LinkResponse};
use qrlink::api::handlers::redirect_handler;
use qrlink::api::middleware::auth;
use qrlink::api::routes::protected_routes;
use qrlink::state::AppState;
use serde_json::json;
use sqlx::PgPool;

use common::MockConnectInfoLayer;

fn server(state: AppState) -> TestServer {
    let api = protected_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        auth::layer,
    ));

    let app = Router::new()
        .route("/{token}", get(redirect_handler))
        .nest("/api", api)
        .layer(MockConnectInfoLayer)
        .with_state(state);

    TestServer::new(app).unwrap()
}

fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

#[sqlx::test]
async fn test_requires_session(pool: PgPool) {
    let server = server(common::create_test_state(pool));

    let response = server.get("/api/links").await;
    response.assert_status_unauthorized();

    let response = server
        .get("/api/links")
        .add_header("Authorization", bearer("not-a-session"))
        .await;
    response.assert_status_unauthorized();
}

#[sqlx::test]
async fn test_create_link(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let state = common::create_test_state(pool.clone());
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    let response = server
        .post("/api/links")
        .add_header("Authorization", bearer(&session))
        .json(&json!({ "name": "Menu", "url": "https://example.com/menu" }))
        .await;

    assert_eq!(response.status_code(), 201);
    let link: LinkResponse = response.json();
    assert_eq!(link.name, "Menu");
    assert_eq!(link.destination_url, "https://example.com/menu");
    assert_eq!(link.token.len(), 6);
    assert!(link.active);
    assert_eq!(link.scan_count, 0);
    assert_eq!(link.short_url, format!("http://qr.test/{}", link.token));
}

#[sqlx::test]
async fn test_create_link_session_cookie(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let state = common::create_test_state(pool);
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    let response = server
        .post("/api/links")
        .add_header("Cookie", format!("session_id={session}"))
        .json(&json!({ "name": "Menu", "url": "https://example.com/menu" }))
        .await;

    assert_eq!(response.status_code(), 201);
}

#[sqlx::test]
async fn test_create_link_rejects_bad_url(pool: PgPool) {
    common::create_test_user(&pool, "alice").await;
    let state = common::create_test_state(pool);
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    for url in ["javascript:alert(1)", "data:text/html,hi", "ftp://example.com/file"] {
        let response = server
            .post("/api/links")
            .add_header("Authorization", bearer(&session))
            .json(&json!({ "name": "Bad", "url": url }))
            .await;

        response.assert_status_bad_request();
    }
}

#[sqlx::test]
async fn test_list_links_only_own(pool: PgPool) {
    let alice = common::create_test_user(&pool, "alice").await;
    let bob = common::create_test_user(&pool, "bob").await;
    common::create_test_link(&pool, alice, "Alice1", "https://a.example.com", true).await;
    common::create_test_link(&pool, alice, "Alice2", "https://b.example.com", false).await;
    common::create_test_link(&pool, bob, "Bob001", "https://c.example.com", true).await;

    let state = common::create_test_state(pool);
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    let response = server
        .get("/api/links")
        .add_header("Authorization", bearer(&session))
        .await;

    response.assert_status_ok();
    let list: LinkListResponse = response.json();
    assert_eq!(list.items.len(), 2);
    assert!(list.items.iter().all(|l| l.token.starts_with("Alice")));
    assert_eq!(list.summary.total_links, 2);
    assert_eq!(list.summary.active_links, 1);
}

#[sqlx::test]
async fn test_list_links_limit(pool: PgPool) {
    let alice = common::create_test_user(&pool, "alice").await;
    for i in 0..3 {
        common::create_test_link(&pool, alice, &format!("Tok00{i}"), "https://example.com", true)
            .await;
    }

    let state = common::create_test_state(pool);
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    let list: LinkListResponse = server
        .get("/api/links?limit=2")
        .add_header("Authorization", bearer(&session))
        .await
        .json();

    assert_eq!(list.items.len(), 2);
    assert_eq!(list.summary.total_links, 3);
}

#[sqlx::test]
async fn test_update_keeps_token_and_count(pool: PgPool) {
    let alice = common::create_test_user(&pool, "alice").await;
    let id = common::create_test_link(&pool, alice, "Edit01", "https://old.example.com", true).await;
    sqlx::query("UPDATE short_links SET scan_count = 7 WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await
        .unwrap();

    let state = common::create_test_state(pool);
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    let response = server
        .put(&format!("/api/links/{id}"))
        .add_header("Authorization", bearer(&session))
        .json(&json!({ "name": "Renamed", "url": "https://new.example.com" }))
        .await;

    response.assert_status_ok();
    let link: LinkResponse = response.json();
    assert_eq!(link.token, "Edit01");
    assert_eq!(link.scan_count, 7);
    assert_eq!(link.name, "Renamed");

    let response = server.get("/Edit01").await;
    assert_eq!(response.header("location"), "https://new.example.com");
}

#[sqlx::test]
async fn test_toggle_twice_restores(pool: PgPool) {
    let alice = common::create_test_user(&pool, "alice").await;
    let id = common::create_test_link(&pool, alice, "Flip01", "https://example.com", true).await;

    let state = common::create_test_state(pool);
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    let link: LinkResponse = server
        .patch(&format!("/api/links/{id}/toggle"))
        .add_header("Authorization", bearer(&session))
        .await
        .json();
    assert!(!link.active);

    let response = server.get("/Flip01").await;
    assert_eq!(response.header("location"), "/error?reason=deactivated");

    let link: LinkResponse = server
        .patch(&format!("/api/links/{id}/toggle"))
        .add_header("Authorization", bearer(&session))
        .await
        .json();
    assert!(link.active);

    let response = server.get("/Flip01").await;
    assert_eq!(response.header("location"), "https://example.com");
}

#[sqlx::test]
async fn test_delete_link(pool: PgPool) {
    let alice = common::create_test_user(&pool, "alice").await;
    let id = common::create_test_link(&pool, alice, "Gone01", "https://example.com", true).await;

    let state = common::create_test_state(pool);
    let session = common::login_token(&state, "alice").await;
    let server = server(state);

    let response = server
        .delete(&format!("/api/links/{id}"))
        .add_header("Authorization", bearer(&session))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = server.get("/Gone01").await;
    assert_eq!(response.header("location"), "/error?reason=not-found");

    let response = server
        .get(&format!("/api/links/{id}"))
        .add_header("Authorization", bearer(&session))
        .await;
    response.assert_status_not_found();
}

#[sqlx::test]
async fn test_foreign_link_is_forbidden(pool: PgPool) {
    let alice = common::create_test_user(&pool, "alice").await;
    common::create_test_user(&pool, "bob").await;
    let id = common::create_test_link(&pool, alice, "Mine01", "https://example.com", true).await;

    let state = common::create_test_state(pool.clone());
    let session = common::login_token(&state, "bob").await;
    let server = server(state);

    server
        .get(&format!("/api/links/{id}"))
        .add_header("Authorization", bearer(&session))
        .await
        .assert_status_forbidden();

    server
        .patch(&format!("/api/links/{id}/toggle"))
        .add_header("Authorization", bearer(&session))
        .await
        .assert_status_forbidden();

    server
        .delete(&format!("/api/links/{id}"))
        .add_header("Authorization", bearer(&session))
        .await
        .assert_status_forbidden();

    let active: bool = sqlx::query_scalar("SELECT active FROM short_links WHERE id = $1")
        .bind(id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert!(active);
}
