use anyhow::Context;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::Config;

/// SMTP mailer for password-reset links. Dispatch is fire-and-forget from
/// the handlers; a send failure is logged, never surfaced to the caller.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    base_url: String,
}

impl Mailer {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .context("invalid SMTP host")?
            .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_pass) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: builder.build(),
            from: config.smtp_from.clone(),
            base_url: config.app_base_url.clone(),
        })
    }

    pub async fn send_password_reset(&self, to: &str, token: &str) -> anyhow::Result<()> {
        let link = format!("{}/auth/reset-password?token={}", self.base_url, token);

        let email = Message::builder()
            .from(self.from.parse().context("invalid SMTP_FROM address")?)
            .to(to.parse().context("invalid recipient address")?)
            .subject("Password Reset Request")
            .header(ContentType::TEXT_HTML)
            .body(format!(
                "<h2>Password Reset Request</h2>\
                 <p>You requested a password reset. Click the link below to reset your password:</p>\
                 <a href=\"{link}\">Reset Password</a>\
                 <p>This link expires in 1 hour.</p>\
                 <p>If you didn't request this, please ignore this email.</p>"
            ))
            .context("failed to build reset email")?;

        self.transport
            .send(email)
            .await
            .context("SMTP send failed")?;

        tracing::info!(to, "Password reset email sent");
        Ok(())
    }
}
