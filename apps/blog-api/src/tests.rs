//! HTTP endpoint tests for the blog API
//!
//! Runs the full router (middleware included) through axum-test against
//! the in-memory stores, plus one pass over the SQLite store.

#[cfg(test)]
mod http_endpoint_tests {
    use std::sync::Arc;

    use axum::http::{header::AUTHORIZATION, HeaderValue, StatusCode};
    use axum_test::TestServer;
    use blog_auth::{AuthService, MemoryCredentialStore, PasswordHasher, TokenCodec};
    use chrono::{Duration, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use crate::db::SqliteStore;
    use crate::posts::MemoryPostStore;
    use crate::routes::router;
    use crate::state::AppState;

    const SECRET: &[u8] = b"http-test-secret";

    fn fast_auth(store: Arc<dyn blog_auth::CredentialStore>) -> AuthService {
        AuthService::new(store, TokenCodec::new(SECRET))
            .with_hasher(PasswordHasher::with_params(4096, 1, 1).unwrap())
    }

    /// Create a test server with the full router over in-memory stores
    fn create_test_server() -> TestServer {
        let state = AppState::new(
            fast_auth(Arc::new(MemoryCredentialStore::new())),
            Arc::new(MemoryPostStore::new()),
        );
        TestServer::new(router(Arc::new(state))).unwrap()
    }

    async fn create_sqlite_server() -> TestServer {
        let store = Arc::new(SqliteStore::in_memory().await.unwrap());
        let state = AppState::new(fast_auth(store.clone()), store);
        TestServer::new(router(Arc::new(state))).unwrap()
    }

    fn bearer(token: &str) -> HeaderValue {
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
    }

    async fn register(server: &TestServer, username: &str, password: &str, email: &str) -> Value {
        let response = server
            .post("/auth/register")
            .json(&json!({ "username": username, "password": password, "email": email }))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    async fn login_token(server: &TestServer, username: &str, password: &str) -> String {
        let response = server
            .post("/auth/login")
            .json(&json!({ "username": username, "password": password }))
            .await;
        response.assert_status_ok();
        response.json::<Value>()["data"]["token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    async fn signed_in(server: &TestServer) -> String {
        register(server, "alice", "secret1", "a@x.com").await;
        login_token(server, "alice", "secret1").await
    }

    // ============================================================
    // Health
    // ============================================================

    #[tokio::test]
    async fn test_health_returns_200() {
        let server = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "blog-api");
    }

    // ============================================================
    // Registration and login
    // ============================================================

    #[tokio::test]
    async fn test_end_to_end_register_login_protected_route() {
        let server = create_test_server();

        let body = register(&server, "alice", "secret1", "a@x.com").await;
        let user = body["data"].as_object().unwrap();
        assert_eq!(user["username"], "alice");
        assert_eq!(user["email"], "a@x.com");
        assert!(!user.contains_key("password"));
        assert!(!user.contains_key("password_hash"));
        assert!(!body.to_string().contains("argon2"));

        let response = server
            .post("/auth/login")
            .json(&json!({ "username": "alice", "password": "secret1" }))
            .await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        let token = body["data"]["token"].as_str().unwrap().to_string();
        assert!(!token.is_empty());
        assert_eq!(body["data"]["user"]["username"], "alice");
        assert!(body["data"]["user"].get("password_hash").is_none());

        let response = server.get("/me").add_header(AUTHORIZATION, bearer(&token)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["username"], "alice");

        let response = server
            .get("/me")
            .add_header(AUTHORIZATION, bearer(&format!("{token}x")))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_register_rejects_short_password() {
        let server = create_test_server();
        let response = server
            .post("/auth/register")
            .json(&json!({ "username": "alice", "password": "12345", "email": "a@x.com" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_register_rejects_missing_fields() {
        let server = create_test_server();
        let response = server
            .post("/auth/register")
            .json(&json!({ "username": "alice" }))
            .await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_register_rejects_duplicates() {
        let server = create_test_server();
        register(&server, "alice", "secret1", "a@x.com").await;

        let response = server
            .post("/auth/register")
            .json(&json!({ "username": "alice", "password": "secret1", "email": "b@x.com" }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "Username already exists");

        let response = server
            .post("/auth/register")
            .json(&json!({ "username": "bob", "password": "secret1", "email": "a@x.com" }))
            .await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"], "Email already exists");
    }

    #[tokio::test]
    async fn test_register_rejects_malformed_json() {
        let server = create_test_server();
        let response = server.post("/auth/register").text("{not json").await;

        response.assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_login_failures_are_identical() {
        let server = create_test_server();
        register(&server, "alice", "secret1", "a@x.com").await;

        let wrong_password = server
            .post("/auth/login")
            .json(&json!({ "username": "alice", "password": "nope-nope" }))
            .await;
        let unknown_user = server
            .post("/auth/login")
            .json(&json!({ "username": "mallory", "password": "secret1" }))
            .await;

        wrong_password.assert_status(StatusCode::UNAUTHORIZED);
        unknown_user.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_password.text(), unknown_user.text());
    }

    #[tokio::test]
    async fn test_login_rejects_malformed_body() {
        let server = create_test_server();
        let response = server.post("/auth/login").text("username=alice").await;

        response.assert_status_bad_request();
    }

    // ============================================================
    // Request authenticator
    // ============================================================

    #[tokio::test]
    async fn test_protected_route_requires_token() {
        let server = create_test_server();
        let response = server.get("/me").await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["error"],
            "Missing authentication token"
        );
    }

    #[tokio::test]
    async fn test_protected_route_rejects_malformed_header() {
        let server = create_test_server();
        let token = signed_in(&server).await;

        for value in [token.clone(), format!("Basic {token}"), format!("Bearer {token} extra")] {
            let response = server
                .get("/me")
                .add_header(AUTHORIZATION, HeaderValue::from_str(&value).unwrap())
                .await;
            response.assert_status(StatusCode::UNAUTHORIZED);
            assert_eq!(
                response.json::<Value>()["error"],
                "Invalid authorization header format"
            );
        }
    }

    #[tokio::test]
    async fn test_expired_token_has_distinct_message() {
        let server = create_test_server();
        signed_in(&server).await;

        let stale = TokenCodec::new(SECRET)
            .issue("1", "alice", Utc::now() - Duration::hours(24) - Duration::seconds(5))
            .unwrap();
        let response = server.get("/me").add_header(AUTHORIZATION, bearer(&stale)).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.json::<Value>()["error"],
            "Token expired, please log in again"
        );
    }

    #[tokio::test]
    async fn test_token_for_deleted_subject_is_404_on_me() {
        let server = create_test_server();
        let orphan = TokenCodec::new(SECRET).issue("999", "ghost", Utc::now()).unwrap();

        let response = server.get("/me").add_header(AUTHORIZATION, bearer(&orphan)).await;
        response.assert_status_not_found();
    }

    // ============================================================
    // Blog posts
    // ============================================================

    #[tokio::test]
    async fn test_post_crud_flow() {
        let server = create_test_server();
        let token = signed_in(&server).await;

        let response = server
            .post("/blogs")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "title": "Hello", "content": "First post", "tags": ["intro"] }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let post = response.json::<Value>()["data"].clone();
        assert_eq!(post["author"], "alice");
        assert_eq!(post["show"], true);
        assert_eq!(post["views"], 0);
        let id = post["id"].as_str().unwrap().to_string();

        let response = server.get(&format!("/blogs/{id}")).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["title"], "Hello");

        let response = server
            .put(&format!("/blogs/{id}"))
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "content": "Edited", "tags": [], "views": 3 }))
            .await;
        response.assert_status_ok();
        let updated = response.json::<Value>()["data"].clone();
        assert_eq!(updated["title"], "Hello");
        assert_eq!(updated["content"], "Edited");
        assert_eq!(updated["tags"], json!([]));
        assert_eq!(updated["views"], 3);

        let response = server
            .delete(&format!("/blogs/{id}"))
            .add_header(AUTHORIZATION, bearer(&token))
            .await;
        response.assert_status(StatusCode::NO_CONTENT);

        server.get(&format!("/blogs/{id}")).await.assert_status_not_found();
        server
            .delete(&format!("/blogs/{id}"))
            .add_header(AUTHORIZATION, bearer(&token))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_post_writes_require_auth() {
        let server = create_test_server();

        server
            .post("/blogs")
            .json(&json!({ "title": "x" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .put("/blogs/1")
            .json(&json!({ "title": "x" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server
            .delete("/blogs/1")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_post_reads_are_public() {
        let server = create_test_server();
        server.get("/blogs").await.assert_status_ok();
        server.get("/blogs/1").await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_create_post_requires_title() {
        let server = create_test_server();
        let token = signed_in(&server).await;

        server
            .post("/blogs")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "title": "  ", "content": "body" }))
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_list_posts_pagination() {
        let server = create_test_server();
        let token = signed_in(&server).await;

        for i in 1..=3 {
            server
                .post("/blogs")
                .add_header(AUTHORIZATION, bearer(&token))
                .json(&json!({ "title": format!("post {i}") }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = server.get("/blogs?page=2&limit=2").await;
        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["pagination"], json!({ "page": 2, "limit": 2, "total": 3 }));
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["title"], "post 1");

        let response = server.get("/blogs?page=zero&limit=500").await;
        let body = response.json::<Value>();
        assert_eq!(body["pagination"], json!({ "page": 1, "limit": 10, "total": 3 }));
        assert_eq!(body["data"][0]["title"], "post 3");
    }

    // ============================================================
    // SQLite backend
    // ============================================================

    #[tokio::test]
    async fn test_sqlite_backend_end_to_end() {
        let server = create_sqlite_server().await;
        let token = signed_in(&server).await;

        let response = server.get("/me").add_header(AUTHORIZATION, bearer(&token)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["email"], "a@x.com");

        let response = server
            .post("/auth/register")
            .json(&json!({ "username": "alice", "password": "secret1", "email": "z@x.com" }))
            .await;
        response.assert_status_bad_request();

        let response = server
            .post("/blogs")
            .add_header(AUTHORIZATION, bearer(&token))
            .json(&json!({ "title": "Stored", "show": false }))
            .await;
        response.assert_status(StatusCode::CREATED);
        let id = response.json::<Value>()["data"]["id"]
            .as_str()
            .unwrap()
            .to_string();

        let response = server.get(&format!("/blogs/{id}")).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["data"]["show"], false);
    }
}
