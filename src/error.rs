use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::validate::FieldError;

/// Every failure a handler can surface, mapped onto the HTTP contract.
/// Business failures (validation, duplicate email, bad credentials, bad
/// token) are expected and carry fixed client-facing bodies; anything
/// else is an internal error whose detail stays server-side.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("user with this email already exists")]
    DuplicateEmail,

    #[error("incorrect credentials")]
    InvalidCredentials,

    #[error("invalid auth token")]
    InvalidToken,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Validation(errors) => json!({ "success": false, "errors": errors }),
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                json!({ "success": false, "error": "internal server error" })
            }
            other => json!({ "success": false, "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn duplicate_email_body_is_fixed() {
        let response = ApiError::DuplicateEmail.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "user with this email already exists");
    }

    #[tokio::test]
    async fn invalid_credentials_body_names_neither_cause() {
        let response = ApiError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "incorrect credentials");
    }

    #[tokio::test]
    async fn validation_body_lists_failures_in_order() {
        let response = ApiError::Validation(vec![
            FieldError {
                field: "name".into(),
                message: "too short".into(),
            },
            FieldError {
                field: "email".into(),
                message: "invalid".into(),
            },
        ])
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["field"], "name");
        assert_eq!(body["errors"][1]["field"], "email");
    }

    #[test]
    fn invalid_token_maps_to_unauthorized() {
        assert_eq!(ApiError::InvalidToken.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn internal_detail_stays_server_side() {
        let err = ApiError::Internal(anyhow::anyhow!("connection refused to 10.0.0.1"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "internal server error");
    }
}
