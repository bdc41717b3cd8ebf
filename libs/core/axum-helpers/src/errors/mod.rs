pub mod handlers;
pub mod messages;
pub mod path;
pub mod responses;

pub use path::attach_request_path;

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Body returned for every error status.
///
/// `path` starts empty and is filled in by [`attach_request_path`], which
/// knows the original request URI even when the handler sits under a
/// nested router.
///
/// # JSON Example
///
/// ```json
/// {
///   "timestamp": "2024-01-01T12:00:00.000000",
///   "status": "Bad Request",
///   "statusCode": 400,
///   "messages": ["Email may not be blank"],
///   "path": "/api/users"
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Local server time at which the error was produced
    #[schema(value_type = String, example = "2024-01-01T12:00:00.000000")]
    pub timestamp: NaiveDateTime,
    /// Reason phrase of the HTTP status
    #[schema(example = "Bad Request")]
    pub status: String,
    #[schema(example = 400)]
    pub status_code: u16,
    /// Every problem found, in a stable order
    pub messages: Vec<String>,
    /// Original request path
    #[schema(example = "/api/users/1")]
    pub path: String,
}

impl ErrorResponse {
    pub fn new(status: StatusCode, messages: Vec<String>) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            status: status.canonical_reason().unwrap_or("Unknown").to_string(),
            status_code: status.as_u16(),
            messages,
            path: String::new(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn http_status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.http_status();
        let mut response = (status, Json(self.clone())).into_response();
        // Kept so the path middleware can re-render the body
        response.extensions_mut().insert(self);
        response
    }
}

/// Application error type that can be converted to HTTP responses.
///
/// Domain crates convert their own errors into this type; every variant is
/// rendered as an [`ErrorResponse`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Path extraction error: {0}")]
    PathExtractorRejection(#[from] PathRejection),

    /// One message per problem with the request
    #[error("Bad Request: {}", .0.join("; "))]
    BadRequest(Vec<String>),

    #[error("Not Found: {0}")]
    NotFound(String),

    /// Details are logged, never returned to the client
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(vec![message.into()])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(_)
            | AppError::QueryExtractorRejection(_)
            | AppError::PathExtractorRejection(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let messages = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!("JSON extraction error: {:?}", e);
                vec![e.body_text()]
            }
            AppError::QueryExtractorRejection(e) => {
                tracing::warn!("Query extraction error: {:?}", e);
                vec![e.body_text()]
            }
            AppError::PathExtractorRejection(e) => {
                tracing::warn!("Path extraction error: {:?}", e);
                vec![e.body_text()]
            }
            AppError::BadRequest(messages) => {
                tracing::info!(?messages, "Bad request");
                messages
            }
            AppError::NotFound(msg) => {
                tracing::info!("Not found: {}", msg);
                vec![msg]
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal server error: {}", msg);
                vec![messages::INTERNAL_ERROR.to_string()]
            }
        };

        ErrorResponse::new(status, messages).into_response()
    }
}
