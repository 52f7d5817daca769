use crate::error::{QueryError, UpstreamError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid input: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::InvalidInput(msg) => ApiError::BadRequest(msg),
            QueryError::NotFound(msg) => ApiError::NotFound(msg),
            QueryError::Upstream(e) => ApiError::Upstream(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            ApiError::Upstream(e) => {
                // Provider detail stays in the logs
                tracing::warn!(provider = e.provider, status = %e.status, error = %e.message, "Upstream failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "Upstream provider request failed".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamStatus;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::BadRequest("q".to_string()), StatusCode::BAD_REQUEST),
            (ApiError::NotFound("anime 1".to_string()), StatusCode::NOT_FOUND),
            (
                ApiError::Upstream(UpstreamError::new("jikan", UpstreamStatus::Timeout, "slow")),
                StatusCode::BAD_GATEWAY,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_query_error_mapping() {
        let err: ApiError = QueryError::InvalidInput("empty".to_string()).into();
        assert!(matches!(err, ApiError::BadRequest(_)));

        let err: ApiError = QueryError::NotFound("manga".to_string()).into();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
