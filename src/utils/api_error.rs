// Terminal error handling for the users API
// Every failure a handler can produce is one of four variants; the single
// `IntoResponse` match below is the only place errors become HTTP responses.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::{db::StoreError, services::JwtError, utils::password::PasswordError};

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum ApiError {
    /// Expected business-rule failure carrying its own status
    #[error("{message}")]
    Domain { status: StatusCode, message: String },

    /// Unique-constraint violation reported by the store
    #[error("Duplicate Key: {field}={value}")]
    DuplicateKey { field: String, value: String },

    /// Request body was not parseable JSON
    #[error("Invalid JSON")]
    MalformedInput,

    /// Anything else. The detail is logged, never sent to the client.
    #[error("Internal Server Error: {0}")]
    Unclassified(String),
}

impl ApiError {
    pub fn domain(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError::Domain {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::domain(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::domain(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::domain(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::domain(StatusCode::NOT_FOUND, message)
    }

    pub fn user_not_found() -> Self {
        Self::not_found("User not found")
    }

    pub fn internal(detail: impl std::fmt::Display) -> Self {
        ApiError::Unclassified(detail.to_string())
    }

    /// Convert to HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Domain { status, .. } => *status,
            ApiError::DuplicateKey { .. } | ApiError::MalformedInput => StatusCode::BAD_REQUEST,
            ApiError::Unclassified(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// JSON body sent to the client
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Domain { message, .. } => json!({ "message": message }),
            ApiError::DuplicateKey { field, value } => {
                let mut property = Map::new();
                property.insert(field.clone(), Value::String(value.clone()));
                let mut index = Map::new();
                index.insert(field.clone(), json!(1));

                json!({
                    "message": "Duplicate Key",
                    "property": property,
                    "index": index,
                })
            },
            ApiError::MalformedInput => json!({ "message": "Invalid JSON" }),
            ApiError::Unclassified(_) => json!({ "message": "Internal Server Error" }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Unclassified(detail) => {
                tracing::error!(error = %detail, "Unclassified error while handling request");
            },
            ApiError::DuplicateKey { field, .. } => {
                tracing::info!(field = %field, "Rejected duplicate key");
            },
            ApiError::Domain { status, message } if status.is_server_error() => {
                tracing::error!(status = status.as_u16(), "{}", message);
            },
            ApiError::Domain { .. } | ApiError::MalformedInput => {},
        }

        (self.status_code(), Json(self.to_json())).into_response()
    }
}

// =============================================================================
// ERROR CONVERSIONS
// =============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateKey { field, value } => ApiError::DuplicateKey { field, value },
            other => ApiError::Unclassified(other.to_string()),
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Unclassified(err.to_string())
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Unclassified(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    format!("{}: {}", field, message)
                })
            })
            .collect();
        // HashMap order is unstable; keep messages deterministic
        messages.sort();

        ApiError::bad_request(messages.join(", "))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::JsonSyntaxError(_) => ApiError::MalformedInput,
            // Well-formed JSON of the wrong shape is a validation failure
            JsonRejection::JsonDataError(e) => ApiError::bad_request(e.body_text()),
            // Missing JSON content type or an unreadable body
            other => ApiError::bad_request(other.body_text()),
        }
    }
}
