//! Concurrency properties: single-use codes under racing redeemers and
//! uniqueness of generated material at scale.

use std::collections::HashSet;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures::future::join_all;
use tokio::sync::Barrier;
use tower::ServiceExt;

use oauth2_server::config::Config;
use oauth2_server::server::{AppState, create_router};
use oauth2_server::store::{
    Client, GrantStore, MemoryGrantStore, MemoryTokenStore, TokenStore,
};

#[tokio::test]
async fn test_concurrent_redeem_has_exactly_one_winner() {
    let store = Arc::new(MemoryGrantStore::new());
    let grant = store.issue("test-client", "http://localhost:3001/callback", "read").await;

    let contenders = 32;
    let barrier = Arc::new(Barrier::new(contenders));
    let handles: Vec<_> = (0..contenders)
        .map(|_| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            let code = grant.code.clone();
            tokio::spawn(async move {
                barrier.wait().await;
                store.redeem(&code).await
            })
        })
        .collect();

    let results = join_all(handles).await;
    let wins = results.iter().filter(|r| r.as_ref().unwrap().is_ok()).count();
    assert_eq!(wins, 1, "exactly one redeemer may win");
}

#[tokio::test]
async fn test_every_code_in_a_batch_is_redeemed_once() {
    let store = Arc::new(MemoryGrantStore::new());

    let mut codes = Vec::new();
    for _ in 0..100 {
        codes.push(store.issue("test-client", "http://localhost:3001/callback", "read").await.code);
    }

    // Two contenders per code, all racing at once.
    let barrier = Arc::new(Barrier::new(200));
    let handles: Vec<_> = codes
        .iter()
        .flat_map(|code| [code.clone(), code.clone()])
        .map(|code| {
            let store = Arc::clone(&store);
            let barrier = Arc::clone(&barrier);
            tokio::spawn(async move {
                barrier.wait().await;
                store.redeem(&code).await
            })
        })
        .collect();

    let results = join_all(handles).await;
    let wins = results.iter().filter(|r| r.as_ref().unwrap().is_ok()).count();
    assert_eq!(wins, 100);
    assert_eq!(store.active_count().await, 0);
}

#[tokio::test]
async fn test_concurrent_http_exchange_single_winner() {
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
    let app = create_router(Arc::clone(&state));

    let grant = state.grants.issue("test-client", "http://localhost:3001/callback", "read").await;
    let body = serde_urlencoded::to_string([
        ("grant_type", "authorization_code"),
        ("code", grant.code.as_str()),
        ("redirect_uri", "http://localhost:3001/callback"),
        ("client_id", "test-client"),
        ("client_secret", "test-secret"),
    ])
    .unwrap();

    let requests = (0..8).map(|_| {
        let app = app.clone();
        let body = body.clone();
        async move {
            app.oneshot(
                Request::post("/oauth/token")
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap()
            .status()
        }
    });

    let statuses = join_all(requests).await;
    let ok = statuses.iter().filter(|s| **s == StatusCode::OK).count();
    let rejected = statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count();
    assert_eq!(ok, 1);
    assert_eq!(rejected, 7);
}

#[tokio::test]
async fn test_ten_thousand_codes_are_unique_and_well_formed() {
    let store = MemoryGrantStore::new();

    let mut codes = HashSet::new();
    for _ in 0..10_000 {
        let grant = store.issue("test-client", "http://localhost:3001/callback", "read").await;
        assert_eq!(grant.code.len(), 32);
        assert!(grant.code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        codes.insert(grant.code);
    }
    assert_eq!(codes.len(), 10_000);
}

#[tokio::test]
async fn test_ten_thousand_tokens_are_unique_and_well_formed() {
    let store = MemoryTokenStore::new();

    let mut tokens = HashSet::new();
    for _ in 0..10_000 {
        let token = store.issue_access_token("test-client", "read").await;
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        tokens.insert(token);
    }
    assert_eq!(tokens.len(), 10_000);
}

#[tokio::test]
async fn test_parallel_token_issuance_never_collides() {
    let store = Arc::new(MemoryTokenStore::new());

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut minted = Vec::with_capacity(50);
                for _ in 0..50 {
                    minted.push(store.issue_access_token("test-client", "read").await);
                }
                minted
            })
        })
        .collect();

    let mut all = HashSet::new();
    for handle in join_all(handles).await {
        for token in handle.unwrap() {
            all.insert(token);
        }
    }
    assert_eq!(all.len(), 32 * 50);
    assert_eq!(store.active_token_count().await, 32 * 50);
}
