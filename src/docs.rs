use crate::api::employee::{
    CountResponse, CreateEmployee, EmployeeDetail, EmployeeListResponse, EmployeeQuery,
};
use crate::api::leave_request::{CreateLeave, LeaveFilter, LeaveListResponse, UpdateLeaveStatus};
use crate::model::employee::{EmployeeView, Gender};
use crate::model::leave_request::{LeaveRequest, LeaveRequestWithEmployee, LeaveStatus};
use crate::model::role::Role;
use crate::models::{AuthPayload, ForgotPasswordDto, ResetPasswordDto, SignInDto, SignUpDto};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaffHub API",
        version = "1.0.0",
        description = r#"
## Staff Management System

This API powers a staff management system: employee records, sign-in, and a
leave-request approval workflow.

### 🔹 Key Features
- **Authentication**
  - Sign up, sign in, forgot/reset password
- **Employee Management**
  - Create, update, list, count, and view employee profiles
- **Leave Management**
  - Submit leave requests; admins approve or cancel them

### 🔐 Security
Routes under the API prefix require **JWT Bearer authentication**. Changing a
leave request's status requires the **ADMIN** role; an employee record may be
updated by an admin or by the employee themselves.

### 📦 Response Format
- JSON responses; list endpoints are paginated
- Auth endpoints always answer 200 with a `success` flag

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::auth::handlers::sign_up,
        crate::auth::handlers::sign_in,
        crate::auth::handlers::forgot_password,
        crate::auth::handlers::reset_password,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::employee_count,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::leave_list,
        crate::api::leave_request::leave_count,
        crate::api::leave_request::get_leave,
        crate::api::leave_request::update_leave_status
    ),
    components(
        schemas(
            SignUpDto,
            SignInDto,
            ForgotPasswordDto,
            ResetPasswordDto,
            AuthPayload,
            Role,
            Gender,
            EmployeeView,
            EmployeeDetail,
            EmployeeQuery,
            EmployeeListResponse,
            CreateEmployee,
            CountResponse,
            LeaveStatus,
            LeaveRequest,
            LeaveRequestWithEmployee,
            CreateLeave,
            UpdateLeaveStatus,
            LeaveFilter,
            LeaveListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Authentication APIs"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Leave", description = "Leave request APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}
