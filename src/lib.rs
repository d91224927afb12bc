// Library exports for the users API
// This file exposes modules and functions for library consumers

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use std::{any::Any, sync::Arc};

use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    middleware::from_fn_with_state,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info;

// Re-export commonly used types
pub use app::AppState;
pub use app_config::{AppConfig, StorageBackend};
pub use db::{DieselUserStore, MemoryUserStore, StoreError, UserStore};
pub use middleware::AuthenticatedUser;
pub use services::{JwtConfig, JwtError, JwtService, UserService};
pub use utils::{ApiError, PasswordConfig};

// Re-export handler route builders
pub use handlers::users_routes;

/// Open the configured store, apply migrations and wire services
pub async fn initialize_app_state(
    config: AppConfig,
) -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let store: Arc<dyn UserStore> = match config.storage {
        StorageBackend::Postgres => {
            if migrations::should_run_migrations(&config) {
                info!("Running embedded migrations...");
                migrations::run_all_migrations(&config)
                    .await
                    .map_err(|e| format!("Migration failed: {}", e))?;
            }

            info!("Initializing database pool...");
            let pool = db::create_diesel_pool(db::DieselDatabaseConfig::from_app_config(&config))
                .await?;
            Arc::new(DieselUserStore::new(pool))
        },
        StorageBackend::Memory => {
            info!("Using in-memory user store; data is lost on restart");
            Arc::new(MemoryUserStore::new())
        },
    };

    let jwt_service = JwtService::new(JwtConfig::from_app_config(&config));
    let password_config = PasswordConfig::from_app_config(&config);
    let bootstrap_admin = config.bootstrap_admin.clone();

    let state = AppState::new(config, store, jwt_service, password_config);

    if let Some(admin) = bootstrap_admin {
        state
            .user_service
            .ensure_admin(&admin.email, &admin.password)
            .await
            .map_err(|e| format!("Failed to ensure bootstrap admin: {}", e))?;
    }

    Ok(state)
}

/// Full application router with the middleware stack
pub fn build_router(state: AppState) -> Router {
    let cors = middleware::cors_layer(&state.config);
    let body_limit = state.config.server.body_limit_bytes;

    Router::new()
        .nest("/users", handlers::users_routes())
        .route("/health", get(health_check))
        .fallback(not_found)
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::json_body_guard))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Panics render as the generic 500 body
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    ApiError::internal(format!("handler panicked: {}", detail)).into_response()
}

async fn not_found() -> ApiError {
    ApiError::not_found("Not Found")
}

// Health check handler
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let backend = match state.config.storage {
        StorageBackend::Postgres => "postgres",
        StorageBackend::Memory => "memory",
    };

    let (healthy, storage) = match state.store.health_check().await {
        Ok(()) => (
            true,
            serde_json::json!({ "status": "healthy", "backend": backend, "error": null }),
        ),
        Err(e) => (
            false,
            serde_json::json!({
                "status": "unhealthy",
                "backend": backend,
                "error": format!("Storage check failed: {}", e)
            }),
        ),
    };

    let response = serde_json::json!({
        "status": if healthy { "healthy" } else { "degraded" },
        "service": "bizcards-users",
        "timestamp": timestamp,
        "components": { "storage": storage }
    });

    if healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
