//! End-to-end tests against a real (in-memory) SQLite database.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::{Duration, Utc};
use http_body_util::BodyExt;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use bookshelf::api::{router, AppState};
use bookshelf::crypto::{PasswordHasher, Sha256Hasher};
use bookshelf::session::{verify_signed_cookie, SessionConfig, SessionStore};
use bookshelf::sqlite::{
    migrations, SqliteBookRepository, SqliteSessionStore, SqliteUserRepository,
};
use bookshelf::{CredentialVerifier, SecretString, SessionManager, UserRepository};

const TEST_SECRET: &str = "test-secret-key-that-is-long-enough-123";

struct TestApp {
    app: Router,
    store: SqliteSessionStore,
}

async fn create_app() -> TestApp {
    // One connection: every pooled connection would otherwise get its own
    // private in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    migrations::run(&pool).await.unwrap();

    let users = SqliteUserRepository::new(pool.clone());
    let hash = Sha256Hasher.hash("secret").unwrap();
    users.create_user("alice", "Alice", &hash).await.unwrap();

    let config = SessionConfig {
        cookie_secure: false,
        secret_key: SecretString::new(TEST_SECRET),
        ..Default::default()
    };

    let store = SqliteSessionStore::new(pool.clone());
    let state = AppState {
        sessions: SessionManager::new(store.clone(), users.clone(), config.session_lifetime),
        verifier: CredentialVerifier::new(users, Sha256Hasher),
        books: SqliteBookRepository::new(pool),
        session_config: config,
    };

    TestApp {
        app: router(state),
        store,
    }
}

async fn body_to_json(body: Body) -> serde_json::Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn login_request(login: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::json!({"login": login, "password": password}).to_string(),
        ))
        .unwrap()
}

fn request_with_cookie(method: &str, uri: &str, cookie: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap()
}

fn session_cookie(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned()
}

fn session_id_of(cookie: &str) -> String {
    let signed = cookie.split_once('=').unwrap().1;
    verify_signed_cookie(signed, &SecretString::new(TEST_SECRET)).unwrap()
}

async fn login(test: &TestApp) -> String {
    let response = test
        .app
        .clone()
        .oneshot(login_request("alice", "secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    session_cookie(&response)
}

#[tokio::test]
async fn test_login_against_stored_sha256_hash() {
    let test = create_app().await;

    let response = test
        .app
        .clone()
        .oneshot(login_request("alice", "secret"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["login"], "alice");

    let response = test
        .app
        .clone()
        .oneshot(login_request("alice", "wrong"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_full_session_lifecycle() {
    let test = create_app().await;
    let cookie = login(&test).await;
    let session_id = session_id_of(&cookie);

    // Authenticated introspection works and slides the expiry forward
    test.store
        .update_expiry(&session_id, Utc::now() + Duration::hours(1))
        .await
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_with_cookie("GET", "/auth/session", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let record = test.store.get(&session_id).await.unwrap().unwrap();
    assert!(record.session_end > Utc::now() + Duration::hours(23));

    // Force the expiry into the past: the same token is now rejected
    test.store
        .update_expiry(&session_id, Utc::now() - Duration::seconds(1))
        .await
        .unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_with_cookie("GET", "/auth/session", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The expired row is still on disk until a login sweeps it
    assert!(test.store.get(&session_id).await.unwrap().is_some());
    login(&test).await;
    assert!(test.store.get(&session_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_logout_then_reuse_is_rejected() {
    let test = create_app().await;
    let cookie = login(&test).await;

    let response = test
        .app
        .clone()
        .oneshot(request_with_cookie("POST", "/auth/logout", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .clone()
        .oneshot(request_with_cookie("GET", "/auth/session", &cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_book_crud_against_sqlite() {
    let test = create_app().await;
    let cookie = login(&test).await;

    let response = test
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/users/1/books")
                .header("content-type", "application/json")
                .header(header::COOKIE, &cookie)
                .body(Body::from(
                    serde_json::json!({
                        "title": "Solaris",
                        "titleOrig": "Solaris",
                        "author": "Stanislaw Lem",
                        "publicationYear": 1961,
                        "annotation": "A planet that thinks"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_to_json(response.into_body()).await;
    let book_id = body["bookId"].as_i64().unwrap();

    let response = test
        .app
        .clone()
        .oneshot(request_with_cookie(
            "GET",
            &format!("/users/1/books/{book_id}"),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["title"], "Solaris");
    assert_eq!(body["publicationYear"], 1961);
    assert!(body["insertedAt"].as_i64().is_some());

    let response = test
        .app
        .clone()
        .oneshot(request_with_cookie(
            "DELETE",
            &format!("/users/1/books/{book_id}"),
            &cookie,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = test
        .app
        .clone()
        .oneshot(request_with_cookie("GET", "/users/1/books", &cookie))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}
