use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{debug, warn};

use crate::app_config::AppConfig;

/// CORS policy from `CORS_ALLOWED_ORIGINS`
///
/// `*` allows any origin outside production. Otherwise only the listed
/// origins are echoed back.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = &config.security.cors_allowed_origins;
    let has_wildcard = origins.iter().any(|o| o == "*");

    let allow_origin = if has_wildcard && !config.is_production() {
        debug!("CORS: allowing any origin");
        AllowOrigin::from(Any)
    } else {
        if has_wildcard {
            warn!("CORS: wildcard origin ignored in production");
        }
        let listed: Vec<HeaderValue> = origins
            .iter()
            .filter(|o| o.as_str() != "*")
            .filter_map(|o| match HeaderValue::from_str(o) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("CORS: skipping invalid origin {}", o);
                    None
                },
            })
            .collect();
        AllowOrigin::list(listed)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}
