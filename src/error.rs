use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Crate-wide error taxonomy. Every handler failure outside the auth
/// payload endpoints surfaces as one of these, rendered as a JSON
/// `{"message": ...}` body with the matching status code.
#[derive(Debug, Display)]
pub enum ApiError {
    #[display(fmt = "{}", _0)]
    Validation(String),
    #[display(fmt = "Email already exists")]
    DuplicateEmail,
    #[display(fmt = "Invalid credentials")]
    InvalidCredentials,
    #[display(fmt = "Invalid or expired reset token")]
    InvalidOrExpiredToken,
    #[display(fmt = "Employee not found")]
    EmployeeNotFound,
    #[display(fmt = "End date must be after or equal to start date")]
    InvalidDateRange,
    #[display(fmt = "Not authenticated")]
    Unauthenticated,
    #[display(fmt = "Not authorized")]
    Forbidden,
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),
    #[display(fmt = "Leave request already processed")]
    AlreadyProcessed,
    #[display(fmt = "Internal Server Error")]
    Internal,
}

impl ApiError {
    /// Map a database failure to `Internal` after logging it with context.
    pub fn db(context: &'static str) -> impl Fn(sqlx::Error) -> ApiError {
        move |e| {
            tracing::error!(error = %e, context, "Database error");
            ApiError::Internal
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidDateRange | ApiError::InvalidOrExpiredToken => {
                StatusCode::BAD_REQUEST
            }
            ApiError::DuplicateEmail | ApiError::AlreadyProcessed => StatusCode::CONFLICT,
            ApiError::InvalidCredentials | ApiError::Unauthenticated => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::EmployeeNotFound | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.to_string()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_taxonomy() {
        assert_eq!(ApiError::DuplicateEmail.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidOrExpiredToken.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::EmployeeNotFound.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(ApiError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            ApiError::Unauthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::InvalidDateRange.status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn credentials_message_is_generic() {
        // Must not leak whether the email exists or the password was wrong.
        assert_eq!(ApiError::InvalidCredentials.to_string(), "Invalid credentials");
    }
}
