//! Password reset flow

use super::AuthService;
use crate::models::normalize_email;
use crate::services::mailer::reset_email;
use crate::utils::crypto::{generate_reset_token, hash_password};
use crate::utils::error::{AppError, Result};
use chrono::{Duration, Utc};
use tracing::info;

impl AuthService {
    /// Handle a forgot-password request.
    ///
    /// An unknown email reports success without touching the store, so the
    /// endpoint cannot be used to enumerate accounts. For a known email a
    /// fresh token replaces any prior one; only the newest token is valid.
    /// Email delivery failure surfaces to the caller but the stored token
    /// stays usable until expiry or a retry.
    pub async fn request_reset(&self, email: &str) -> Result<()> {
        let email = normalize_email(email);
        info!("Password reset requested for {}", email);

        let Some(account) = self.store.find_by_email(&email).await? else {
            return Ok(());
        };

        let token = generate_reset_token();
        let expiry = Utc::now() + Duration::seconds(self.reset_token_ttl_secs);
        self.store.set_reset_token(account.id, &token, expiry).await?;

        self.mailer
            .send(reset_email(&self.public_url, &email, &token))
            .await?;

        info!("Reset token issued for account: {}", account.id);
        Ok(())
    }

    /// Whether a reset token is currently valid. Read-only and idempotent.
    pub async fn verify_reset_token(&self, token: &str) -> Result<bool> {
        Ok(self.store.find_by_reset_token(token).await?.is_some())
    }

    /// Consume a reset token and set a new password.
    ///
    /// The password length check runs before any store access. The store
    /// clears the token in the same operation as the hash write, so a
    /// consumed token can never authenticate a second reset.
    pub async fn reset_password(&self, token: &str, new_password: &str) -> Result<()> {
        self.ensure_password_length(new_password)?;

        let Some(account) = self.store.find_by_reset_token(token).await? else {
            return Err(AppError::InvalidToken);
        };

        let password_hash = hash_password(new_password)?;
        self.store.update_password(account.id, &password_hash).await?;

        info!("Password reset for account: {}", account.id);
        Ok(())
    }
}
