use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

use crate::auth::jwt::generate_session_token;
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::error::ApiError;
use crate::mail::Mailer;
use crate::model::employee::Employee;
use crate::models::{AuthPayload, ForgotPasswordDto, ResetPasswordDto, SignInDto, SignUpDto};

const MIN_NAME_LEN: usize = 2;
const MIN_PASSWORD_LEN: usize = 6;

fn is_valid_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

fn validate_sign_up(dto: &SignUpDto) -> Result<(), ApiError> {
    if dto.name.trim().len() < MIN_NAME_LEN {
        return Err(ApiError::Validation(
            "Name must be at least 2 characters".to_string(),
        ));
    }
    if !is_valid_email(&dto.email) {
        return Err(ApiError::Validation("Invalid email address".to_string()));
    }
    if dto.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }
    Ok(())
}

/// Opaque single-use reset token: 32 random bytes, hex encoded.
pub(crate) fn generate_reset_token() -> String {
    let bytes: [u8; 32] = rand::thread_rng().r#gen();
    hex::encode(bytes)
}

fn is_duplicate_key(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.code() == Some("23000".into()))
}

async fn fetch_employee_by_id(pool: &MySqlPool, id: u64) -> Result<Employee, ApiError> {
    sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await
        .map_err(ApiError::db("fetch employee by id"))
}

/// Sign up. All failures come back as a `success: false` payload, never a
/// protocol-level error.
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignUpDto,
    responses(
        (status = 200, description = "Auth payload; check the success flag", body = AuthPayload)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_signup", skip(pool, config, dto), fields(email = %dto.email))]
pub async fn sign_up(
    dto: web::Json<SignUpDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Signup request received");

    if let Err(e) = validate_sign_up(&dto) {
        info!(reason = %e, "Signup validation failed");
        return HttpResponse::Ok().json(AuthPayload::failed(e.to_string()));
    }

    let hashed = hash_password(&dto.password);

    let result = sqlx::query(
        r#"
        INSERT INTO employees (name, email, password, phone_number, address, birth_date, gender)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(dto.name.trim())
    .bind(&dto.email)
    .bind(&hashed)
    .bind(&dto.phone_number)
    .bind(&dto.address)
    .bind(dto.birth_date)
    .bind(dto.gender)
    .execute(pool.get_ref())
    .await;

    let created_id = match result {
        Ok(res) => res.last_insert_id(),
        Err(e) if is_duplicate_key(&e) => {
            info!("Signup rejected: duplicate email");
            return HttpResponse::Ok().json(AuthPayload::failed(ApiError::DuplicateEmail.to_string()));
        }
        Err(e) => {
            error!(error = %e, "Failed to insert employee");
            return HttpResponse::Ok().json(AuthPayload::failed("Signup failed"));
        }
    };

    let employee = match fetch_employee_by_id(pool.get_ref(), created_id).await {
        Ok(emp) => emp,
        Err(_) => return HttpResponse::Ok().json(AuthPayload::failed("Signup failed")),
    };

    let token = generate_session_token(
        employee.id,
        employee.email.clone(),
        employee.role,
        &config.jwt_secret,
        config.session_token_ttl,
    );

    info!(employee_id = employee.id, "Signup successful");

    HttpResponse::Ok().json(AuthPayload::ok(token, employee.into_view(), "Signup successful"))
}

/// Sign in. Unknown email and wrong password produce the identical
/// generic message.
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SignInDto,
    responses(
        (status = 200, description = "Auth payload; check the success flag", body = AuthPayload)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_signin", skip(pool, config, dto), fields(email = %dto.email))]
pub async fn sign_in(
    dto: web::Json<SignInDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Signin request received");

    if dto.email.trim().is_empty() || dto.password.is_empty() {
        return HttpResponse::Ok().json(AuthPayload::failed("Email and password are required"));
    }

    debug!("Fetching employee from database");

    let employee = match sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE email = ?")
        .bind(&dto.email)
        .fetch_optional(pool.get_ref())
        .await
    {
        Ok(Some(emp)) => emp,
        Ok(None) => {
            info!("Invalid credentials: employee not found");
            return HttpResponse::Ok()
                .json(AuthPayload::failed(ApiError::InvalidCredentials.to_string()));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching employee");
            return HttpResponse::Ok().json(AuthPayload::failed("Sign in failed"));
        }
    };

    debug!("Verifying password");

    if verify_password(&dto.password, &employee.password).is_err() {
        info!("Invalid credentials: password mismatch");
        return HttpResponse::Ok()
            .json(AuthPayload::failed(ApiError::InvalidCredentials.to_string()));
    }

    let token = generate_session_token(
        employee.id,
        employee.email.clone(),
        employee.role,
        &config.jwt_secret,
        config.session_token_ttl,
    );

    info!(employee_id = employee.id, "Signin successful");

    HttpResponse::Ok().json(AuthPayload::ok(token, employee.into_view(), "Sign in successful"))
}

/// Always answers `true`, whether or not the email exists, so accounts
/// cannot be enumerated. The reset email is dispatched fire-and-forget.
#[utoipa::path(
    post,
    path = "/auth/forgot-password",
    request_body = ForgotPasswordDto,
    responses(
        (status = 200, description = "Always true", body = bool)
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_forgot_password", skip_all)]
pub async fn forgot_password(
    dto: web::Json<ForgotPasswordDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    mailer: web::Data<Mailer>,
) -> Result<HttpResponse, ApiError> {
    let employee = sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE email = ?")
        .bind(&dto.email)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::db("lookup employee for password reset"))?;

    let Some(employee) = employee else {
        // Don't reveal whether the email exists.
        return Ok(HttpResponse::Ok().json(true));
    };

    let token = generate_reset_token();
    let expires = Utc::now().naive_utc() + Duration::seconds(config.reset_token_ttl as i64);

    sqlx::query(
        "UPDATE employees SET password_reset_token = ?, password_reset_expires = ? WHERE id = ?",
    )
    .bind(&token)
    .bind(expires)
    .bind(employee.id)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::db("store password reset token"))?;

    let mailer = mailer.get_ref().clone();
    let recipient = employee.email.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = mailer.send_password_reset(&recipient, &token).await {
            // best-effort: never fails the operation
            error!(error = %e, "Failed to send password reset email");
        }
    });

    Ok(HttpResponse::Ok().json(true))
}

/// Completes a reset. The token is single-use: the same UPDATE that stores
/// the new hash clears the token and its expiry.
#[utoipa::path(
    post,
    path = "/auth/reset-password",
    request_body = ResetPasswordDto,
    responses(
        (status = 200, description = "Password replaced", body = bool),
        (status = 400, description = "Invalid or expired reset token")
    ),
    tag = "Auth"
)]
#[instrument(name = "auth_reset_password", skip_all)]
pub async fn reset_password(
    dto: web::Json<ResetPasswordDto>,
    pool: web::Data<MySqlPool>,
) -> Result<HttpResponse, ApiError> {
    if dto.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters".to_string(),
        ));
    }

    let employee = sqlx::query_as::<_, Employee>(
        r#"
        SELECT * FROM employees
        WHERE password_reset_token = ?
        AND password_reset_expires > UTC_TIMESTAMP()
        "#,
    )
    .bind(&dto.token)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::db("lookup employee by reset token"))?
    .ok_or(ApiError::InvalidOrExpiredToken)?;

    let hashed = hash_password(&dto.password);

    // new hash stored and token cleared in one statement
    sqlx::query(
        r#"
        UPDATE employees
        SET password = ?, password_reset_token = NULL, password_reset_expires = NULL
        WHERE id = ?
        "#,
    )
    .bind(&hashed)
    .bind(employee.id)
    .execute(pool.get_ref())
    .await
    .map_err(ApiError::db("replace password"))?;

    info!(employee_id = employee.id, "Password reset completed");

    Ok(HttpResponse::Ok().json(true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::employee::Gender;

    fn sign_up_dto() -> SignUpDto {
        SignUpDto {
            name: "John Doe".to_string(),
            email: "john@email.com".to_string(),
            password: "secret123".to_string(),
            phone_number: None,
            address: None,
            birth_date: None,
            gender: Some(Gender::Male),
        }
    }

    #[test]
    fn valid_sign_up_passes() {
        assert!(validate_sign_up(&sign_up_dto()).is_ok());
    }

    #[test]
    fn short_name_is_rejected() {
        let mut dto = sign_up_dto();
        dto.name = "J".to_string();
        assert!(validate_sign_up(&dto).is_err());
    }

    #[test]
    fn short_password_is_rejected() {
        let mut dto = sign_up_dto();
        dto.password = "12345".to_string();
        assert!(validate_sign_up(&dto).is_err());
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("john@email.com"));
        assert!(!is_valid_email("john"));
        assert!(!is_valid_email("@email.com"));
        assert!(!is_valid_email("john@email"));
        assert!(!is_valid_email("john@.com."));
    }

    #[test]
    fn reset_token_is_64_hex_chars() {
        let token = generate_reset_token();
        assert_eq!(token.len(), 64);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn reset_tokens_are_unique() {
        assert_ne!(generate_reset_token(), generate_reset_token());
    }
}
