use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sims_core::error::{ARTICLE_FAILED, ARTICLE_NOT_FOUND, DASHBOARD_FAILED};
use sims_core::Error;
use tracing::error;

/// JSON error reply: `{"error": message}` with the given status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    /// Failure while loading the dashboard collection.
    pub fn dashboard(err: Error) -> Self {
        match err {
            Error::InvalidInput(message) => Self::bad_request(message),
            other => {
                error!("Dashboard fetch failed: {}", other);
                Self::new(StatusCode::BAD_GATEWAY, DASHBOARD_FAILED)
            }
        }
    }

    /// Failure while loading a single article.
    pub fn article(err: Error) -> Self {
        match err {
            Error::NotFound(_) => Self::new(StatusCode::NOT_FOUND, ARTICLE_NOT_FOUND),
            Error::InvalidInput(message) => Self::bad_request(message),
            other => {
                error!("Article fetch failed: {}", other);
                Self::new(StatusCode::BAD_GATEWAY, ARTICLE_FAILED)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_errors() {
        let upstream = ApiError::dashboard(Error::Upstream {
            status: 500,
            message: "boom".into(),
        });
        assert_eq!(upstream.status, StatusCode::BAD_GATEWAY);
        assert_eq!(upstream.message, DASHBOARD_FAILED);

        let bad = ApiError::dashboard(Error::InvalidInput("Unknown sort key: x".into()));
        assert_eq!(bad.status, StatusCode::BAD_REQUEST);
        assert_eq!(bad.message, "Unknown sort key: x");
    }

    #[test]
    fn test_article_errors() {
        let missing = ApiError::article(Error::NotFound("/api/articles/9".into()));
        assert_eq!(missing.status, StatusCode::NOT_FOUND);
        assert_eq!(missing.message, ARTICLE_NOT_FOUND);

        let failed = ApiError::article(Error::Config("x".into()));
        assert_eq!(failed.status, StatusCode::BAD_GATEWAY);
        assert_eq!(failed.message, ARTICLE_FAILED);
    }
}
