//! Email delivery collaborator
//!
//! The auth core only needs a single "send" capability; content templating
//! and real provider integration live outside this crate.

use crate::utils::error::Result;
use async_trait::async_trait;
use tracing::{debug, info};

/// An outbound email
#[derive(Debug, Clone)]
pub struct Email {
    /// Recipient address
    pub to: String,
    /// Subject line
    pub subject: String,
    /// Plain-text body
    pub body: String,
}

/// Email delivery contract
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one email
    async fn send(&self, email: Email) -> Result<()>;
}

/// Mailer that logs instead of delivering, for development and tests
#[derive(Debug, Default)]
pub struct LogMailer;

#[async_trait]
impl EmailSender for LogMailer {
    async fn send(&self, email: Email) -> Result<()> {
        info!("Sending email to {}: {}", email.to, email.subject);
        debug!("Email body:\n{}", email.body);
        Ok(())
    }
}

/// Compose the password reset email for a token
pub fn reset_email(base_url: &str, to: &str, token: &str) -> Email {
    let reset_url = format!("{}/auth/reset-password?token={}", base_url, token);
    Email {
        to: to.to_string(),
        subject: "Reset Your Password".to_string(),
        body: format!(
            "You requested a password reset for your account.\n\n\
             Open the link below to choose a new password. \
             The link expires in 1 hour.\n\n{}\n\n\
             If you didn't request this, you can safely ignore this email.",
            reset_url
        ),
    }
}
