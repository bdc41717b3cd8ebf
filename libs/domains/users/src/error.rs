use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("No user with id {0}")]
    NotFound(i64),

    /// Every violated field constraint, in field order
    #[error("Invalid input: {}", .0.join(", "))]
    Validation(Vec<String>),

    #[error("Users under {allowed_age} y.o. are not allowed")]
    UnderAge { allowed_age: u32 },

    #[error("Start date should be before end date")]
    InvalidRange,

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type UserResult<T> = Result<T, UserError>;

impl From<DbErr> for UserError {
    fn from(err: DbErr) -> Self {
        UserError::Internal(format!("Database error: {}", err))
    }
}

/// Convert UserError to AppError for standardized error responses
impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => AppError::NotFound(err.to_string()),
            UserError::Validation(messages) => AppError::BadRequest(messages),
            UserError::UnderAge { .. } | UserError::InvalidRange => {
                AppError::bad_request(err.to_string())
            }
            UserError::Internal(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for UserError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_messages() {
        assert_eq!(UserError::NotFound(999).to_string(), "No user with id 999");
        assert_eq!(
            UserError::UnderAge { allowed_age: 18 }.to_string(),
            "Users under 18 y.o. are not allowed"
        );
        assert_eq!(
            UserError::InvalidRange.to_string(),
            "Start date should be before end date"
        );
    }

    #[test]
    fn test_status_mapping() {
        let status = |e: UserError| AppError::from(e).status();

        assert_eq!(status(UserError::NotFound(1)), StatusCode::NOT_FOUND);
        assert_eq!(status(UserError::Validation(vec![])), StatusCode::BAD_REQUEST);
        assert_eq!(status(UserError::UnderAge { allowed_age: 18 }), StatusCode::BAD_REQUEST);
        assert_eq!(status(UserError::InvalidRange), StatusCode::BAD_REQUEST);
        assert_eq!(
            status(UserError::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_messages_are_passed_through() {
        let app_error = AppError::from(UserError::Validation(vec![
            "Wrong email format".to_string(),
            "Wrong phone number format".to_string(),
        ]));

        match app_error {
            AppError::BadRequest(messages) => assert_eq!(messages.len(), 2),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_db_errors_become_internal() {
        let err: UserError = DbErr::Custom("pool closed".into()).into();
        assert!(matches!(err, UserError::Internal(msg) if msg.contains("pool closed")));
    }
}
