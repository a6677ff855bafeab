//! Shared harness for the HTTP integration tests.
//!
//! Each test gets its own in-memory SQLite database with the real migrations
//! applied and drives the full router through `oneshot`. Google is replaced
//! by `FakeIdentityProvider`.
#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::ServiceExt;

use board_server::auth::{IdentityProvider, OAuthError, VerifiedIdentity};
use board_server::config::{
    AccessConfig, AdminConfig, Config, DatabaseConfig, OAuthConfig, PromotionConfig, ServerConfig,
};
use board_server::db::Database;
use board_server::{app, AppState};

pub const ADMIN_EMAIL: &str = "admin@example.com";

/// Authorization codes understood by the fake provider.
pub const CODE_ADMIN: &str = "code-admin";
pub const CODE_STRANGER: &str = "code-stranger";
pub const CODE_UNVERIFIED: &str = "code-unverified";

pub struct FakeIdentityProvider;

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn authorization_url(&self, state: &str) -> Result<String, OAuthError> {
        Ok(format!("https://idp.test/authorize?state={}", state))
    }

    async fn exchange_code(&self, code: &str) -> Result<VerifiedIdentity, OAuthError> {
        match code {
            // mixed case on purpose: the admin check ignores case
            CODE_ADMIN => Ok(VerifiedIdentity {
                email: "Admin@Example.com".to_string(),
                email_verified: true,
                name: Some("Board Admin".to_string()),
            }),
            CODE_STRANGER => Ok(VerifiedIdentity {
                email: "someone@example.com".to_string(),
                email_verified: true,
                name: None,
            }),
            CODE_UNVERIFIED => Ok(VerifiedIdentity {
                email: ADMIN_EMAIL.to_string(),
                email_verified: false,
                name: None,
            }),
            _ => Err(OAuthError::TokenExchange("unknown code".to_string())),
        }
    }
}

pub fn test_config(password: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            static_dir: std::env::temp_dir()
                .join("board-server-missing-static")
                .to_string_lossy()
                .into_owned(),
        },
        database: DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
        },
        access: AccessConfig {
            password: password.to_string(),
        },
        admin: AdminConfig {
            email: ADMIN_EMAIL.to_string(),
            session_ttl_hours: 24,
            cookie_secure: false,
        },
        oauth: OAuthConfig {
            client_id: "test-client".to_string(),
            client_secret: "test-secret".to_string(),
            redirect_uri: "http://localhost/api/admin/auth/google/callback".to_string(),
            post_login_redirect: "/admin".to_string(),
        },
        promotion: PromotionConfig::default(),
    }
}

/// A single-connection in-memory database. One connection keeps every query
/// on the same database, and no idle timeout keeps it alive for the test.
pub async fn memory_db() -> Database {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    let db = Database::new(pool);
    db.run_migrations().await.expect("Failed to run migrations");
    db
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: axum::http::HeaderMap,
    pub body: Value,
    pub text: String,
}

impl TestResponse {
    pub fn header(&self, name: header::HeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// `name=value` part of the `Set-Cookie` header.
    pub fn cookie(&self) -> Option<String> {
        self.header(header::SET_COOKIE)
            .and_then(|v| v.split(';').next())
            .map(str::to_string)
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config("")).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = memory_db().await;
        let state = AppState::new(db, config, Arc::new(FakeIdentityProvider));
        let router = app(state.clone());
        Self { router, state }
    }

    pub fn db(&self) -> &Database {
        &self.state.db
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let text = String::from_utf8_lossy(&bytes).into_owned();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }

    /// Request from a given origin address, optionally with a JSON body and
    /// a session cookie.
    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        ip: &str,
        body: Option<Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-forwarded-for", ip);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str, ip: &str) -> TestResponse {
        self.call(Method::GET, uri, ip, None, None).await
    }

    pub async fn post_json(&self, uri: &str, ip: &str, body: Value) -> TestResponse {
        self.call(Method::POST, uri, ip, Some(body), None).await
    }

    pub async fn create_post(&self, ip: &str, title: &str) -> i64 {
        let response = self
            .post_json(
                "/api/public/post/",
                ip,
                serde_json::json!({ "author": "anon", "title": title, "content": "body text" }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["data"]["id"].as_i64().expect("post id")
    }

    pub async fn create_comment(&self, ip: &str, post_id: i64, parent_id: Option<i64>) -> i64 {
        let response = self
            .post_json(
                "/api/public/comment/",
                ip,
                serde_json::json!({
                    "post_id": post_id,
                    "parent_id": parent_id,
                    "author": "anon",
                    "content": "a comment",
                }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.text);
        response.body["data"]["id"].as_i64().expect("comment id")
    }

    pub async fn vote(&self, ip: &str, post_id: i64, kind: &str) -> TestResponse {
        self.post_json(
            "/api/public/vote/",
            ip,
            serde_json::json!({ "post_id": post_id, "type": kind }),
        )
        .await
    }

    /// Cookie header value for a signed-in admin session.
    pub fn admin_cookie(&self) -> String {
        let (pending, _) = self.state.sessions.begin_login();
        let session_id = self
            .state
            .sessions
            .promote(&pending, ADMIN_EMAIL.to_string(), None);
        format!("board_session={}", session_id)
    }

    pub async fn admin(&self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let cookie = self.admin_cookie();
        self.call(method, uri, "10.0.0.1", body, Some(&cookie)).await
    }
}
