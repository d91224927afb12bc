// Users API handlers
// Access control and body validation happen in the extractors, in argument
// order, so a handler body only runs for an authorized caller with a valid
// payload.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;

use crate::{
    app::AppState,
    middleware::{AdminOnly, Authorized, OwnerOnly, OwnerOrAdmin, ValidatedJson},
    models::{LoginRequest, RegisterRequest},
    utils::ApiError,
};

/// GET /users - every user, admin only
pub async fn list_users(
    State(state): State<AppState>,
    _auth: Authorized<AdminOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_service.list_users().await?;
    Ok(Json(users))
}

/// GET /users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: Authorized<OwnerOrAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.get_user(auth.target_id()?).await?;
    Ok(Json(json!({ "user": user })))
}

/// PUT /users/{id} - full profile update by the owner
pub async fn update_user(
    State(state): State<AppState>,
    auth: Authorized<OwnerOnly>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .user_service
        .replace_user(auth.target_id()?, payload)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User Updated", "userDetails": user })),
    ))
}

/// POST /users - registration
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.create_user(payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Saved", "user": user })),
    ))
}

/// POST /users/login
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let token = state
        .user_service
        .validate_user(&payload.email, &payload.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "OK", "token": token })),
    ))
}

/// DELETE /users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: Authorized<OwnerOrAdmin>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.delete_user(auth.target_id()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Deleted", "userDetails": user })),
    ))
}

/// PATCH /users/{id} - flip the business flag
pub async fn toggle_business(
    State(state): State<AppState>,
    auth: Authorized<OwnerOnly>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state.user_service.toggle_business(auth.target_id()?).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Updated", "user": user })),
    ))
}
