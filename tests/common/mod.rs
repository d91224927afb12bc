// Common test utilities and helper structs
// Shared across all test files to avoid duplication

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, Response, StatusCode},
    Router,
};
use bizcards_users::{
    app_config::{
        AppConfig, DatabaseConfig, Environment, JwtConfig as JwtSettings, SecurityConfig,
        ServerConfig, StorageBackend,
    },
    build_router,
    db::{MemoryUserStore, UserStore},
    AppState, JwtConfig, JwtService, PasswordConfig,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "integration-test-secret-at-least-32-chars";
pub const TEST_PASSWORD: &str = "secret1";

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub fn get(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "GET", uri)
    }

    pub fn post(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "POST", uri)
    }

    pub fn put(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "PUT", uri)
    }

    pub fn patch(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "PATCH", uri)
    }

    pub fn delete(&self, uri: &str) -> TestRequest {
        TestRequest::new(self, "DELETE", uri)
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.state.store
    }

    /// Register through the API and return the created user id
    pub async fn register(&self, email: &str) -> Uuid {
        let response = self
            .post("/users")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "register {}", email);

        let body: Value = response.json().await;
        Uuid::parse_str(body["user"]["id"].as_str().unwrap()).unwrap()
    }

    /// Log in through the API and return the bearer token
    pub async fn login(&self, email: &str) -> String {
        let response = self
            .post("/users/login")
            .json(&json!({ "email": email, "password": TEST_PASSWORD }))
            .send()
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "login {}", email);

        let body: Value = response.json().await;
        body["token"].as_str().unwrap().to_string()
    }

    /// Registered user plus a token for them
    pub async fn user_with_token(&self, email: &str) -> (Uuid, String) {
        let id = self.register(email).await;
        let token = self.login(email).await;
        (id, token)
    }

    /// Admin account created the way startup bootstraps it
    pub async fn admin_with_token(&self, email: &str) -> (Uuid, String) {
        let admin = self
            .state
            .user_service
            .ensure_admin(email, TEST_PASSWORD)
            .await
            .unwrap();
        let token = self.login(email).await;
        (admin.id, token)
    }
}

/// Test request builder
pub struct TestRequest<'a> {
    app: &'a TestApp,
    method: &'static str,
    uri: String,
    headers: Vec<(&'static str, String)>,
    body: Body,
}

impl<'a> TestRequest<'a> {
    fn new(app: &'a TestApp, method: &'static str, uri: &str) -> Self {
        Self {
            app,
            method,
            uri: uri.to_string(),
            headers: Vec::new(),
            body: Body::empty(),
        }
    }

    /// Add JSON body to request
    pub fn json<T: Serialize>(self, body: &T) -> Self {
        self.raw_json(serde_json::to_string(body).unwrap())
    }

    /// Send `body` verbatim with a JSON content type
    pub fn raw_json(mut self, body: impl Into<String>) -> Self {
        self.headers
            .push(("content-type", "application/json".to_string()));
        self.body = Body::from(body.into());
        self
    }

    /// Send `body` verbatim without touching the content type
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Body::from(body.into());
        self
    }

    pub fn bearer(mut self, token: &str) -> Self {
        self.headers
            .push(("authorization", format!("Bearer {}", token)));
        self
    }

    pub fn header(mut self, name: &'static str, value: &str) -> Self {
        self.headers.push((name, value.to_string()));
        self
    }

    /// Send the request
    pub async fn send(self) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(&self.uri);
        for (name, value) in &self.headers {
            builder = builder.header(*name, value);
        }
        let request = builder.body(self.body).unwrap();

        let response = self.app.app.clone().oneshot(request).await.unwrap();
        TestResponse { response }
    }
}

/// Test response wrapper
pub struct TestResponse {
    response: Response<Body>,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Parse JSON response
    pub async fn json<T: serde::de::DeserializeOwned>(self) -> T {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    pub async fn text(self) -> String {
        let body = axum::body::to_bytes(self.response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(body.to_vec()).unwrap()
    }
}

pub fn test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            port: 0,
            environment: Environment::Test,
            rust_log: "debug".to_string(),
            body_limit_bytes: 64 * 1024,
        },
        storage: StorageBackend::Memory,
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout: 1,
            idle_timeout: 1,
            max_lifetime: 1,
        },
        jwt: JwtSettings {
            secret: TEST_JWT_SECRET.to_string(),
            expiry: 3600,
            audience: "bizcards-test".to_string(),
            issuer: "bizcards-test".to_string(),
            key_version: 1,
        },
        security: SecurityConfig {
            password_memory_cost: 4096,
            password_time_cost: 1,
            cors_allowed_origins: vec!["*".to_string()],
        },
        bootstrap_admin: None,
        disable_embedded_migrations: true,
    }
}

/// Setup test application backed by the in-memory store
pub fn setup_test_app() -> TestApp {
    setup_test_app_with_store(Arc::new(MemoryUserStore::new()))
}

/// Setup test application around a caller-supplied store
pub fn setup_test_app_with_store(store: Arc<dyn UserStore>) -> TestApp {
    let config = test_config();
    let jwt_service = JwtService::new(JwtConfig::from_app_config(&config));
    let password_config = PasswordConfig::from_app_config(&config);

    let state = AppState::new(config, store, jwt_service, password_config);

    TestApp {
        app: build_router(state.clone()),
        state,
    }
}
