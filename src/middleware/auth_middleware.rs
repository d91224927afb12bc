// Authentication middleware
// Verifies an optional bearer token and records the outcome in request
// extensions. It never rejects on its own: routes decide through the
// `AuthenticatedUser` / `Authorized<P>` extractors whether identity is needed.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    app::AppState,
    middleware::auth::{AuthenticatedUser, RejectedToken},
};

pub async fn auth_middleware(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    if !request.headers().contains_key(header::AUTHORIZATION) {
        return next.run(request).await;
    }

    let bearer = request.headers().typed_get::<Authorization<Bearer>>();
    let identity = match bearer {
        Some(Authorization(bearer)) => app_state
            .jwt_service
            .validate_token(bearer.token())
            .map_err(|e| e.to_string())
            .and_then(|claims| AuthenticatedUser::try_from(claims).map_err(|e| e.to_string())),
        None => Err("authorization header is not a bearer token".to_string()),
    };

    match identity {
        Ok(user) => {
            request.extensions_mut().insert(user);
        },
        Err(reason) => {
            tracing::warn!("JWT validation failed: {}", reason);
            request.extensions_mut().insert(RejectedToken);
        },
    }

    next.run(request).await
}
