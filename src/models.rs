use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::employee::{EmployeeView, Gender};
use crate::model::role::Role;

#[derive(Deserialize, ToSchema)]
pub struct SignUpDto {
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "secret123")]
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    #[schema(example = "1990-01-01", format = "date", value_type = String)]
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
}

#[derive(Deserialize, ToSchema)]
pub struct SignInDto {
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
    #[schema(example = "secret123")]
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ForgotPasswordDto {
    #[schema(example = "john@email.com", format = "email")]
    pub email: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ResetPasswordDto {
    pub token: String,
    #[schema(example = "newsecret123")]
    pub password: String,
}

/// Uniform response of the auth endpoints. Failures come back with
/// `success: false` and a message, never as a protocol-level error.
#[derive(Serialize, ToSchema)]
pub struct AuthPayload {
    pub token: Option<String>,
    pub user: Option<EmployeeView>,
    pub success: bool,
    pub message: String,
}

impl AuthPayload {
    pub fn ok(token: String, user: EmployeeView, message: &str) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            success: true,
            message: message.to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            token: None,
            user: None,
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    /// Email address of the subject.
    pub sub: String,
    pub role: Role,
    pub exp: usize,
    pub jti: String,
}
