use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// StoreError
///
/// Failures surfaced by a `Repository`. Only `NotFound` is distinguished at the HTTP
/// edge; every other variant becomes a generic 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,
    #[error("slug already in use: {0}")]
    SlugTaken(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl StoreError {
    /// Maps a sqlx error, turning unique-index violations into `SlugTaken`.
    /// The slug unique indexes are the only unique constraints besides primary keys.
    pub fn from_write(err: sqlx::Error, slug: &str) -> Self {
        if matches!(&err, sqlx::Error::Database(db) if db.is_unique_violation()) {
            return StoreError::SlugTaken(slug.to_string());
        }
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other),
        }
    }
}

/// ErrorBody
///
/// The JSON body of every error response: `{"error": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: String,
}

/// ApiError
///
/// The error side of every handler. Messages are static so that no store or upstream
/// detail leaks to the caller; the detail goes to the log instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(&'static str),
    Unauthorized(&'static str),
    NotFound(&'static str),
    Internal(&'static str),
}

impl ApiError {
    /// Converts a store failure, logging it. `NotFound` keeps its meaning; anything
    /// else collapses to a 500 carrying `message`.
    pub fn from_store(err: StoreError, message: &'static str) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound("Not found"),
            other => {
                tracing::error!(error = %other, "{}", message);
                ApiError::Internal(message)
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ApiError::BadRequest(m)
            | ApiError::Unauthorized(m)
            | ApiError::NotFound(m)
            | ApiError::Internal(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_keeps_its_status() {
        let err = ApiError::from_store(StoreError::NotFound, "Failed to fetch blog");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn slug_collision_is_a_generic_failure() {
        let err = ApiError::from_store(
            StoreError::SlugTaken("hello".to_string()),
            "Failed to create blog",
        );
        assert_eq!(err, ApiError::Internal("Failed to create blog"));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
