use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::leave_request::{LeaveRequest, LeaveRequestWithEmployee, LeaveStatus};

const MIN_DESCRIPTION_LEN: usize = 10;

const JOINED_SELECT: &str = r#"
    SELECT
        lr.id,
        lr.employee_id,
        lr.start_date,
        lr.end_date,
        lr.description,
        lr.status,
        lr.created_at,
        lr.updated_at,
        e.name AS employee_name,
        e.email AS employee_email,
        e.role AS employee_role
    FROM leave_requests lr
    JOIN employees e ON e.id = lr.employee_id
"#;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = "2026-01-10", format = "date", value_type = String)]
    pub start_date: NaiveDate,
    #[schema(example = "2026-01-12", format = "date", value_type = String)]
    pub end_date: NaiveDate,
    #[schema(example = "Family vacation trip")]
    pub description: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateLeaveStatus {
    /// Target status; must be APPROVED or CANCELLED.
    pub status: LeaveStatus,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    /// Filter by employee ID
    #[param(example = 1000)]
    pub employee_id: Option<u64>,
    /// Filter by leave status
    pub status: Option<LeaveStatus>,
    /// Pagination page number (1-based)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Status(LeaveStatus),
}

#[derive(Serialize, ToSchema)]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequestWithEmployee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct CountResponse {
    #[schema(example = 7)]
    pub count: i64,
}

pub(crate) fn validate_date_range(start: NaiveDate, end: NaiveDate) -> Result<(), ApiError> {
    if end < start {
        return Err(ApiError::InvalidDateRange);
    }
    Ok(())
}

pub(crate) fn validate_description(description: &str) -> Result<(), ApiError> {
    if description.trim().len() < MIN_DESCRIPTION_LEN {
        return Err(ApiError::Validation(
            "Description must be at least 10 characters".to_string(),
        ));
    }
    Ok(())
}

/* =========================
Create leave request
========================= */
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body = CreateLeave,
    responses(
        (status = 200, description = "Leave request created in PENDING", body = LeaveRequest),
        (status = 400, description = "Validation error or invalid date range"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> Result<HttpResponse, ApiError> {
    validate_description(&payload.description)?;

    let employee_exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE id = ? LIMIT 1)",
    )
    .bind(payload.employee_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::db("check employee exists"))?;

    if !employee_exists {
        return Err(ApiError::EmployeeNotFound);
    }

    validate_date_range(payload.start_date, payload.end_date)?;

    // No overlap check against existing requests; two overlapping
    // submissions both land in PENDING.
    let result = sqlx::query(
        r#"
        INSERT INTO leave_requests (employee_id, start_date, end_date, description)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(payload.employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.description.trim())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to create leave request");
        ApiError::Internal
    })?;

    let leave = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, start_date, end_date, description, status, created_at, updated_at
        FROM leave_requests
        WHERE id = ?
        "#,
    )
    .bind(result.last_insert_id())
    .fetch_one(pool.get_ref())
    .await
    .map_err(ApiError::db("fetch created leave request"))?;

    info!(
        leave_id = leave.id,
        employee_id = leave.employee_id,
        "Leave request submitted"
    );

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
Transition status (Admin)
========================= */
#[utoipa::path(
    put,
    path = "/api/leave/{id}/status",
    params(("id" = u64, Path, description = "Leave request ID")),
    request_body = UpdateLeaveStatus,
    responses(
        (status = 200, description = "Updated request with the owning employee", body = LeaveRequestWithEmployee),
        (status = 400, description = "Invalid target status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Already approved or cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_leave_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<UpdateLeaveStatus>,
) -> Result<HttpResponse, ApiError> {
    auth.require_admin()?;

    let leave_id = path.into_inner();
    let new_status = payload.status;

    // PENDING is the initial state, never a transition target.
    if !new_status.is_terminal() {
        return Err(ApiError::Validation(
            "Status must be APPROVED or CANCELLED".to_string(),
        ));
    }

    let exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM leave_requests WHERE id = ?)")
            .bind(leave_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(ApiError::db("check leave request exists"))?;

    if !exists {
        return Err(ApiError::NotFound("Leave request"));
    }

    // Terminal states are final: the precondition makes a second
    // transition a no-op reported as a conflict.
    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = ?
        WHERE id = ?
        AND status = 'PENDING'
        "#,
    )
    .bind(new_status)
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, leave_id, "Leave status transition failed");
        ApiError::Internal
    })?;

    if result.rows_affected() == 0 {
        return Err(ApiError::AlreadyProcessed);
    }

    let sql = format!("{JOINED_SELECT} WHERE lr.id = ?");
    let leave = sqlx::query_as::<_, LeaveRequestWithEmployee>(&sql)
        .bind(leave_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::db("fetch transitioned leave request"))?;

    info!(
        leave_id,
        status = new_status.as_str(),
        admin_id = auth.user_id,
        "Leave request transitioned"
    );

    Ok(HttpResponse::Ok().json(leave))
}

/* =========================
List leave requests
========================= */
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated list, newest first", body = LeaveListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_list(
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> Result<HttpResponse, ApiError> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id {
        where_sql.push_str(" AND lr.employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status {
        where_sql.push_str(" AND lr.status = ?");
        args.push(FilterValue::Status(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!(
        "SELECT COUNT(*) FROM leave_requests lr{}",
        where_sql
    );

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Status(s) => count_q.bind(*s),
        };
    }

    let total = count_q
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::db("count leave requests"))?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        "{JOINED_SELECT} {} ORDER BY lr.created_at DESC LIMIT ? OFFSET ?",
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequestWithEmployee>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Status(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::db("fetch leave list"))?;

    Ok(HttpResponse::Ok().json(LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Count leave requests
#[utoipa::path(
    get,
    path = "/api/leave/count",
    responses(
        (status = 200, description = "Leave request count", body = CountResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn leave_count(pool: web::Data<MySqlPool>) -> Result<HttpResponse, ApiError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leave_requests")
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::db("count leave requests"))?;

    Ok(HttpResponse::Ok().json(CountResponse { count }))
}

/// Get one leave request with its owning employee
#[utoipa::path(
    get,
    path = "/api/leave/{id}",
    params(("id" = u64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequestWithEmployee),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> Result<HttpResponse, ApiError> {
    let leave_id = path.into_inner();

    let sql = format!("{JOINED_SELECT} WHERE lr.id = ?");
    let leave = sqlx::query_as::<_, LeaveRequestWithEmployee>(&sql)
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::db("fetch leave request"))?;

    match leave {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Err(ApiError::NotFound("Leave request")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn end_before_start_is_rejected() {
        assert!(matches!(
            validate_date_range(date("2024-01-12"), date("2024-01-10")),
            Err(ApiError::InvalidDateRange)
        ));
    }

    #[test]
    fn equal_dates_are_accepted() {
        assert!(validate_date_range(date("2024-01-10"), date("2024-01-10")).is_ok());
    }

    #[test]
    fn normal_range_is_accepted() {
        assert!(validate_date_range(date("2024-01-10"), date("2024-01-12")).is_ok());
    }

    #[test]
    fn short_description_is_rejected() {
        assert!(validate_description("too short").is_err());
        // whitespace does not count toward the minimum
        assert!(validate_description("         a         ").is_err());
    }

    #[test]
    fn ten_char_description_is_accepted() {
        assert!(validate_description("0123456789").is_ok());
        assert!(validate_description("Family vacation trip").is_ok());
    }
}
