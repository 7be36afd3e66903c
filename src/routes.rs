use crate::{
    api::{employee, leave_request},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let signin_limiter = Arc::new(build_limiter(config.rate_signin_per_min));
    let signup_limiter = Arc::new(build_limiter(config.rate_signup_per_min));
    let forgot_limiter = Arc::new(build_limiter(config.rate_forgot_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/signup")
                    .wrap(signup_limiter.clone())
                    .route(web::post().to(handlers::sign_up)),
            )
            .service(
                web::resource("/signin")
                    .wrap(signin_limiter.clone())
                    .route(web::post().to(handlers::sign_in)),
            )
            .service(
                web::resource("/forgot-password")
                    .wrap(forgot_limiter.clone())
                    .route(web::post().to(handlers::forgot_password)),
            )
            .service(
                web::resource("/reset-password")
                    .wrap(forgot_limiter.clone())
                    .route(web::post().to(handlers::reset_password)),
            ),
    );

    // Protected routes: the middleware decodes the bearer token once per
    // request; role checks live in the handlers.
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware))
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/count (registered before /{id})
                    .service(
                        web::resource("/count").route(web::get().to(employee::employee_count)),
                    )
                    // /employees/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::create_leave)),
                    )
                    // /leave/count
                    .service(
                        web::resource("/count").route(web::get().to(leave_request::leave_count)),
                    )
                    // /leave/{id}
                    .service(
                        web::resource("/{id}").route(web::get().to(leave_request::get_leave)),
                    )
                    // /leave/{id}/status
                    .service(
                        web::resource("/{id}/status")
                            .route(web::put().to(leave_request::update_leave_status)),
                    ),
            ),
    );
}

// SIGNIN
//  └─ session token (7 days) carrying {user_id, email, role}

// API REQUEST
//  └─ Authorization: Bearer <session token>

// PASSWORD LOST
//  └─ POST /auth/forgot-password → emailed single-use token (1 hour)
//       └─ POST /auth/reset-password completes the replacement
