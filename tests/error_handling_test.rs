// Unclassified failures reaching the HTTP boundary
// Store doubles that fail or panic stand in for a broken database

use async_trait::async_trait;
use axum::http::StatusCode;
use bizcards_users::{
    db::{StoreError, StoreResult, UserStore},
    models::{NewUser, RegisterRequest, User, UserChanges},
};
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

mod common;
use common::{setup_test_app_with_store, TestApp, TEST_PASSWORD};

const SECRET_DETAIL: &str = "connection to 10.0.0.7:5432 refused for role bizcards";

#[derive(Clone, Copy)]
enum Failure {
    Error,
    Panic,
}

/// Every operation fails the configured way
struct BrokenStore(Failure);

impl BrokenStore {
    fn fail<T>(&self) -> StoreResult<T> {
        match self.0 {
            Failure::Error => Err(StoreError::Database(SECRET_DETAIL.to_string())),
            Failure::Panic => panic!("{}", SECRET_DETAIL),
        }
    }
}

#[async_trait]
impl UserStore for BrokenStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        self.fail()
    }

    async fn find_by_id(&self, _id: Uuid) -> StoreResult<Option<User>> {
        self.fail()
    }

    async fn find_by_email(&self, _email: &str) -> StoreResult<Option<User>> {
        self.fail()
    }

    async fn insert(&self, _user: NewUser) -> StoreResult<User> {
        self.fail()
    }

    async fn update(&self, _id: Uuid, _changes: UserChanges) -> StoreResult<Option<User>> {
        self.fail()
    }

    async fn toggle_business(&self, _id: Uuid) -> StoreResult<Option<User>> {
        self.fail()
    }

    async fn promote_to_admin(&self, _id: Uuid) -> StoreResult<Option<User>> {
        self.fail()
    }

    async fn delete(&self, _id: Uuid) -> StoreResult<Option<User>> {
        self.fail()
    }

    async fn health_check(&self) -> StoreResult<()> {
        self.fail()
    }
}

/// Token for an admin that never touched the store
fn admin_token(app: &TestApp) -> String {
    let request: RegisterRequest =
        serde_json::from_value(json!({ "email": "admin@example.com", "password": TEST_PASSWORD }))
            .unwrap();
    let mut admin = NewUser::from_registration(request, "unused".to_string()).into_user();
    admin.is_admin = true;

    app.state.jwt_service.issue_for(&admin).unwrap()
}

async fn assert_internal_error(response: common::TestResponse) {
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = response.text().await;
    assert!(!body.contains("10.0.0.7"), "detail leaked: {}", body);

    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({ "message": "Internal Server Error" }));
}

#[tokio::test]
async fn test_store_error_on_listing_is_internal_server_error() {
    let app = setup_test_app_with_store(Arc::new(BrokenStore(Failure::Error)));
    let token = admin_token(&app);

    let response = app.get("/users").bearer(&token).send().await;
    assert_internal_error(response).await;
}

#[tokio::test]
async fn test_store_error_on_registration_is_internal_server_error() {
    let app = setup_test_app_with_store(Arc::new(BrokenStore(Failure::Error)));

    let response = app
        .post("/users")
        .json(&json!({ "email": "a@example.com", "password": TEST_PASSWORD }))
        .send()
        .await;
    assert_internal_error(response).await;
}

#[tokio::test]
async fn test_handler_panic_is_internal_server_error() {
    let app = setup_test_app_with_store(Arc::new(BrokenStore(Failure::Panic)));
    let token = admin_token(&app);

    let response = app.get("/users").bearer(&token).send().await;
    assert_internal_error(response).await;
}

#[tokio::test]
async fn test_health_reports_degraded_store() {
    let app = setup_test_app_with_store(Arc::new(BrokenStore(Failure::Error)));

    let response = app.get("/health").send().await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json().await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["components"]["storage"]["status"], "unhealthy");
}
