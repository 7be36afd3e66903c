use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::MySqlPool;
use tracing::{debug, error, info};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::error::ApiError;
use crate::model::employee::{EmployeeView, Gender, VIEW_COLUMNS};
use crate::model::leave_request::LeaveRequest;
use crate::model::role::Role;
use crate::utils::db_utils::{build_update_sql, execute_update};

/// Columns an update payload may touch. Password and reset fields are
/// changed only through the auth endpoints.
const UPDATABLE_COLUMNS: &[&str] = &[
    "name",
    "email",
    "phone_number",
    "address",
    "birth_date",
    "gender",
    "role",
];

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
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
    /// Defaults to EMPLOYEE when omitted.
    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    /// Pagination page number (1-based)
    pub page: Option<u32>,
    /// Items per page
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<EmployeeView>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 10)]
    pub total: i64,
}

/// Employee detail with the employee's leave requests, newest first.
#[derive(Serialize, ToSchema)]
pub struct EmployeeDetail {
    #[serde(flatten)]
    pub employee: EmployeeView,
    pub leave_requests: Vec<LeaveRequest>,
}

#[derive(Serialize, ToSchema)]
pub struct CountResponse {
    #[schema(example = 42)]
    pub count: i64,
}

fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code() == Some("23000".into()))
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployee,
    responses(
        (status = 200, description = "Employee created", body = EmployeeView),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Email already exists")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> Result<HttpResponse, ApiError> {
    if payload.name.trim().len() < 2 {
        return Err(ApiError::Validation(
            "Name must be at least 2 characters".to_string(),
        ));
    }
    if payload.password.len() < 6 {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let hashed = hash_password(&payload.password);
    let role = payload.role.unwrap_or(Role::Employee);

    let result = sqlx::query(
        r#"
        INSERT INTO employees (name, email, password, phone_number, address, birth_date, gender, role)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(payload.name.trim())
    .bind(&payload.email)
    .bind(&hashed)
    .bind(&payload.phone_number)
    .bind(&payload.address)
    .bind(payload.birth_date)
    .bind(payload.gender)
    .bind(role)
    .execute(pool.get_ref())
    .await;

    let created_id = match result {
        Ok(res) => res.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => return Err(ApiError::DuplicateEmail),
        Err(e) => {
            error!(error = %e, "Failed to create employee");
            return Err(ApiError::Internal);
        }
    };

    let employee = fetch_view(pool.get_ref(), created_id)
        .await?
        .ok_or(ApiError::Internal)?;

    info!(employee_id = created_id, "Employee created");

    Ok(HttpResponse::Ok().json(employee))
}

async fn fetch_view(pool: &MySqlPool, id: u64) -> Result<Option<EmployeeView>, ApiError> {
    let sql = format!("SELECT {VIEW_COLUMNS} FROM employees WHERE id = ?");
    sqlx::query_as::<_, EmployeeView>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(ApiError::db("fetch employee view"))
}

/// List employees (paginated)
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    debug!(page, per_page, "Fetching employees");

    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::db("count employees"))?;

    let sql = format!("SELECT {VIEW_COLUMNS} FROM employees ORDER BY id DESC LIMIT ? OFFSET ?");
    let employees = sqlx::query_as::<_, EmployeeView>(&sql)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::db("fetch employees"))?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page,
        per_page,
        total,
    }))
}

/// Count employees
#[utoipa::path(
    get,
    path = "/api/employees/count",
    responses(
        (status = 200, description = "Employee count", body = CountResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn employee_count(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::db("count employees"))?;

    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// Get Employee by ID, with their leave requests
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found", body = EmployeeDetail),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let employee = fetch_view(pool.get_ref(), employee_id)
        .await?
        .ok_or(ApiError::EmployeeNotFound)?;

    let leave_requests = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, start_date, end_date, description, status, created_at, updated_at
        FROM leave_requests
        WHERE employee_id = ?
        ORDER BY created_at DESC
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::db("fetch employee leave requests"))?;

    Ok(HttpResponse::Ok().json(EmployeeDetail {
        employee,
        leave_requests,
    }))
}

/// Update Employee (admin, or the employee themselves)
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    request_body = Object,
    responses(
        (status = 200, description = "Updated employee", body = EmployeeView),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    auth.require_admin_or_self(employee_id)?;

    let update = build_update_sql("employees", &body, UPDATABLE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        if is_duplicate_key(&e) {
            ApiError::DuplicateEmail
        } else {
            error!(error = %e, employee_id, "Failed to update employee");
            ApiError::Internal
        }
    })?;

    if affected == 0 {
        return Err(ApiError::EmployeeNotFound);
    }

    let employee = fetch_view(pool.get_ref(), employee_id)
        .await?
        .ok_or(ApiError::EmployeeNotFound)?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Delete Employee (leave requests are removed by the FK cascade)
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Deleted", body = bool),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let employee_id = path.into_inner();

    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::db("delete employee"))?;

    if result.rows_affected() == 0 {
        return Err(ApiError::EmployeeNotFound);
    }

    info!(employee_id, "Employee deleted");

    Ok(HttpResponse::Ok().json(true))
}
