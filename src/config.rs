use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,
    /// Session token lifetime in seconds (7 days by default).
    pub session_token_ttl: usize,
    /// Password-reset token lifetime in seconds (1 hour by default).
    pub reset_token_ttl: usize,

    // Rate limiting
    pub rate_signin_per_min: u32,
    pub rate_signup_per_min: u32,
    pub rate_forgot_per_min: u32,
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Outgoing mail (password reset links)
    pub app_base_url: String,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub smtp_from: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        Self {
            server_addr: env::var("SERVER_ADDR").expect("SERVER_ADDR must be set"),
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
            session_token_ttl: env::var("SESSION_TOKEN_TTL")
                .unwrap_or_else(|_| "604800".to_string()) // default 7 days
                .parse()
                .unwrap(),
            reset_token_ttl: env::var("RESET_TOKEN_TTL")
                .unwrap_or_else(|_| "3600".to_string()) // default 1 hour
                .parse()
                .unwrap(),

            rate_signin_per_min: env::var("RATE_SIGNIN_PER_MIN")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap(),
            rate_signup_per_min: env::var("RATE_SIGNUP_PER_MIN")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap(),
            rate_forgot_per_min: env::var("RATE_FORGOT_PER_MIN")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap(),
            rate_protected_per_min: env::var("RATE_PROTECTED_PER_MIN")
                .unwrap_or_else(|_| "1000".to_string())
                .parse()
                .unwrap(),

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            app_base_url: env::var("APP_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            smtp_host: env::var("SMTP_HOST").unwrap_or_else(|_| "smtp.gmail.com".to_string()),
            smtp_port: env::var("SMTP_PORT")
                .unwrap_or_else(|_| "587".to_string())
                .parse()
                .unwrap(),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_pass: env::var("SMTP_PASS").ok(),
            smtp_from: env::var("SMTP_FROM")
                .unwrap_or_else(|_| "no-reply@staffhub.local".to_string()),
        }
    }
}
