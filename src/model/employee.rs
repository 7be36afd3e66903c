use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::role::Role;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
#[sqlx(rename_all = "UPPERCASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Full employee row, password hash included. Never serialized outward;
/// handlers respond with [`EmployeeView`] instead.
#[derive(Debug, sqlx::FromRow)]
pub struct Employee {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub role: Role,
    pub password_reset_token: Option<String>,
    pub password_reset_expires: Option<NaiveDateTime>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    pub fn into_view(self) -> EmployeeView {
        EmployeeView {
            id: self.id,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            address: self.address,
            birth_date: self.birth_date,
            gender: self.gender,
            role: self.role,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Public employee projection (no password, no reset fields).
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "phone_number": "+8801712345678",
        "address": "Dhaka",
        "birth_date": "1990-01-01",
        "gender": "MALE",
        "role": "EMPLOYEE",
        "created_at": "2026-01-01T00:00:00Z",
        "updated_at": "2026-01-01T00:00:00Z"
    })
)]
pub struct EmployeeView {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone_number: Option<String>,

    #[schema(example = "Dhaka", nullable = true)]
    pub address: Option<String>,

    #[schema(example = "1990-01-01", value_type = String, format = "date", nullable = true)]
    pub birth_date: Option<NaiveDate>,

    pub gender: Option<Gender>,

    pub role: Role,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub created_at: DateTime<Utc>,

    #[schema(example = "2026-01-01T00:00:00Z", value_type = String, format = "date-time")]
    pub updated_at: DateTime<Utc>,
}

/// Columns of the public projection, for SELECTs that must not touch
/// the password or reset fields.
pub const VIEW_COLUMNS: &str =
    "id, name, email, phone_number, address, birth_date, gender, role, created_at, updated_at";
