//! Public API types

use axum::response::{IntoResponse, Response};
use http::StatusCode;

// Errors

pub struct ApiError {
    status: StatusCode,
    err: anyhow::Error,
}

impl ApiError {
    /// An error with a specific response status, e.g. 401 for a
    /// missing or expired calendar connection.
    pub fn new(status: StatusCode, err: impl Into<anyhow::Error>) -> Self {
        Self {
            status,
            err: err.into(),
        }
    }
}

/// Convert `ApiError` into an Axum compatible response.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Always log the error
        tracing::error!("{}", self.err);

        (self.status, format!("{}", self.err)).into_response()
    }
}

/// Enables using `?` on functions that return `Result<_,
/// anyhow::Error>` to turn them into `Result<_, ApiError>`
impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            err: err.into(),
        }
    }
}

// Re-export public types from each route

pub mod analyze {
    pub use crate::api::routes::analyze::public::*;
}

pub mod auth {
    pub use crate::api::routes::auth::public::*;
}

pub mod calendar {
    pub use crate::api::routes::calendar::public::*;
}
