// Request body guard
// Any request that declares a JSON body must carry parseable JSON, whatever
// route it targets. Routes that ignore their body still answer 400
// "Invalid JSON" for a broken one.

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::{app::AppState, utils::ApiError};

/// `application/json` or any `+json` media type
pub fn is_json_content_type(value: &str) -> bool {
    let essence = value
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    essence == "application/json" || (essence.starts_with("application/") && essence.ends_with("+json"))
}

pub async fn json_body_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let declares_json = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(is_json_content_type);

    if !declares_json {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, state.config.server.body_limit_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!("Failed to buffer request body: {}", e);
            return ApiError::domain(
                axum::http::StatusCode::PAYLOAD_TOO_LARGE,
                "Request body too large",
            )
            .into_response();
        },
    };

    if !bytes.is_empty() && serde_json::from_slice::<serde::de::IgnoredAny>(&bytes).is_err() {
        return ApiError::MalformedInput.into_response();
    }

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}
