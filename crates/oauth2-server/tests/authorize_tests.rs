//! HTTP tests for the authorization endpoint validation ladder.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use oauth2_server::config::Config;
use oauth2_server::server::{AppState, create_router};
use oauth2_server::store::Client;

async fn build_test_router() -> Router {
    let state = Arc::new(AppState::in_memory(&Config::default()));
    state
        .clients
        .register(Client {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost:3001/callback".to_string(),
            scopes: vec!["read".to_string(), "write".to_string()],
        })
        .await
        .unwrap();
    create_router(state)
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let response =
        app.clone().oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_missing_parameters_is_invalid_request() {
    let app = build_test_router().await;

    for uri in [
        "/oauth/authorize",
        "/oauth/authorize?client_id=test-client",
        "/oauth/authorize?client_id=test-client&response_type=code",
        // Empty values count as missing.
        "/oauth/authorize?client_id=&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback&response_type=code",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["error"], "invalid_request");
        assert_eq!(body["error_description"], "Missing required parameters");
    }
}

#[tokio::test]
async fn test_unknown_client_is_invalid_client_400() {
    let app = build_test_router().await;

    let (status, body) = get_json(
        &app,
        "/oauth/authorize?client_id=nobody&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback&response_type=code",
    )
    .await;
    // 400 here, not 401: the authorization endpoint has no credentials to
    // challenge.
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_client");
}

#[tokio::test]
async fn test_wrong_redirect_uri_rejected() {
    let app = build_test_router().await;

    let (status, body) = get_json(
        &app,
        "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Fevil.example%2Fsteal&response_type=code",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["error_description"], "Invalid redirect URI");
}

#[tokio::test]
async fn test_redirect_uri_must_match_exactly() {
    let app = build_test_router().await;

    // Same origin and path prefix, but not byte-for-byte equal.
    for uri in [
        "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback%2F&response_type=code",
        "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback%2Fextra&response_type=code",
    ] {
        let (status, body) = get_json(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "invalid_request");
    }
}

#[tokio::test]
async fn test_unsupported_response_type() {
    let app = build_test_router().await;

    let (status, body) = get_json(
        &app,
        "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback&response_type=token",
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unsupported_response_type");
}

#[tokio::test]
async fn test_response_type_checked_after_client_and_redirect() {
    let app = build_test_router().await;

    // Bad response_type with an unknown client: the client error wins.
    let (_, body) = get_json(
        &app,
        "/oauth/authorize?client_id=nobody&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback&response_type=token",
    )
    .await;
    assert_eq!(body["error"], "invalid_client");

    // Bad response_type with a bad redirect: the redirect error wins.
    let (_, body) = get_json(
        &app,
        "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Fevil.example%2F&response_type=token",
    )
    .await;
    assert_eq!(body["error"], "invalid_request");
}

#[tokio::test]
async fn test_success_redirects_with_code_and_state() {
    let app = build_test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::get(
                "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback&response_type=code&scope=read+write&state=xyz123",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers().get("Location").unwrap().to_str().unwrap();
    assert!(location.starts_with("http://localhost:3001/callback"));

    let url = url::Url::parse(location).unwrap();
    let pairs: std::collections::HashMap<_, _> = url.query_pairs().collect();
    let code = pairs.get("code").unwrap();
    assert_eq!(code.len(), 32);
    assert!(code.chars().all(|c| c.is_ascii_hexdigit()));
    let state: Option<&str> = pairs.get("state").map(|s| s.as_ref());
    assert_eq!(state, Some("xyz123"));
}

#[tokio::test]
async fn test_state_is_omitted_when_absent() {
    let app = build_test_router().await;

    let response = app
        .clone()
        .oneshot(
            Request::get(
                "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback&response_type=code",
            )
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    let location = response.headers().get("Location").unwrap().to_str().unwrap();
    assert!(!location.contains("state="));
}

#[tokio::test]
async fn test_each_authorization_issues_a_fresh_code() {
    let app = build_test_router().await;
    let uri = "/oauth/authorize?client_id=test-client&redirect_uri=http%3A%2F%2Flocalhost%3A3001%2Fcallback&response_type=code";

    let mut codes = std::collections::HashSet::new();
    for _ in 0..10 {
        let response =
            app.clone().oneshot(Request::get(uri).body(Body::empty()).unwrap()).await.unwrap();
        let location = response.headers().get("Location").unwrap().to_str().unwrap();
        let url = url::Url::parse(location).unwrap();
        let code =
            url.query_pairs().find(|(k, _)| k == "code").map(|(_, v)| v.into_owned()).unwrap();
        codes.insert(code);
    }
    assert_eq!(codes.len(), 10);
}
