// Validated JSON bodies

use axum::{
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::utils::ApiError;

/// `Json<T>` that has also passed `T`'s validation rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LoginRequest, RegisterRequest};
    use axum::{body::Body, http::StatusCode};

    fn json_request(body: &'static str) -> Request {
        axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_valid_body_passes() {
        let ValidatedJson(login) = ValidatedJson::<LoginRequest>::from_request(
            json_request(r#"{"email":"a@b.com","password":"x"}"#),
            &(),
        )
        .await
        .unwrap();
        assert_eq!(login.email, "a@b.com");
    }

    #[tokio::test]
    async fn test_syntax_error_is_malformed_input() {
        let err = ValidatedJson::<LoginRequest>::from_request(json_request(r#"{"email":"#), &())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::MalformedInput));
    }

    #[tokio::test]
    async fn test_wrong_shape_is_bad_request() {
        let err = ValidatedJson::<LoginRequest>::from_request(
            json_request(r#"{"email":"a@b.com"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rule_failure_names_the_field() {
        let err = ValidatedJson::<RegisterRequest>::from_request(
            json_request(r#"{"email":"a@b.com","password":"abc"}"#),
            &(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let message = err.to_json()["message"].as_str().unwrap().to_string();
        assert!(message.starts_with("password:"), "{}", message);
    }

    #[tokio::test]
    async fn test_missing_content_type_is_bad_request() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/")
            .body(Body::from(r#"{"email":"a@b.com","password":"x"}"#))
            .unwrap();

        let err = ValidatedJson::<LoginRequest>::from_request(request, &())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }
}
