use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};
use jsonwebtoken::{DecodingKey, Validation, decode};

use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::models::Claims;

/// Per-request identity, decoded once from the bearer token. The token is
/// the sole source of identity; nothing is held in ambient session state.
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ApiError::Unauthenticated.into())),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let data = match decode::<Claims>(
            token,
            &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            &Validation::default(),
        ) {
            Ok(d) => d,
            Err(_) => return ready(Err(ApiError::Unauthenticated.into())),
        };

        ready(Ok(AuthUser {
            user_id: data.claims.user_id,
            email: data.claims.sub,
            role: data.claims.role,
        }))
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }

    /// Admins may act on anyone; employees only on their own record.
    pub fn require_admin_or_self(&self, employee_id: u64) -> Result<(), ApiError> {
        if self.is_admin() || self.user_id == employee_id {
            Ok(())
        } else {
            Err(ApiError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(role: Role, user_id: u64) -> AuthUser {
        AuthUser {
            user_id,
            email: "a@b.com".to_string(),
            role,
        }
    }

    #[test]
    fn only_admin_passes_admin_check() {
        assert!(user(Role::Admin, 1).require_admin().is_ok());
        assert!(matches!(
            user(Role::Employee, 1).require_admin(),
            Err(ApiError::Forbidden)
        ));
    }

    #[test]
    fn self_check_allows_own_record_only() {
        let employee = user(Role::Employee, 7);
        assert!(employee.require_admin_or_self(7).is_ok());
        assert!(matches!(
            employee.require_admin_or_self(8),
            Err(ApiError::Forbidden)
        ));

        // admin may act on any record
        assert!(user(Role::Admin, 1).require_admin_or_self(8).is_ok());
    }
}
