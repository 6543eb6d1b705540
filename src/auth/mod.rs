//! Authentication, session, and access-control core

pub mod gate;
pub mod middleware;
pub mod reset;
pub mod session;


pub use gate::{GateDecision, RouteClass, classify, decide};
pub use session::{SessionClaims, SessionIssuer};

use crate::config::Config;
use crate::models::{Account, AccountStatus, NewAccount, Role, normalize_email};
use crate::services::mailer::{EmailSender, reset_email};
use crate::storage::CredentialStore;
use crate::utils::crypto::{generate_reset_token, hash_password, unusable_password_hash, verify_password};
use crate::utils::error::{AppError, Result};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{info, warn};

/// Main authentication service
#[derive(Clone)]
pub struct AuthService {
    /// Credential store collaborator
    store: Arc<dyn CredentialStore>,
    /// Email collaborator
    mailer: Arc<dyn EmailSender>,
    /// Session token issuer
    sessions: SessionIssuer,
    /// Public base URL for reset links
    public_url: String,
    /// Reset token lifetime in seconds
    reset_token_ttl_secs: i64,
    /// Minimum password length
    min_password_len: usize,
}

impl AuthService {
    /// Create a new authentication service
    pub fn new(
        config: &Config,
        store: Arc<dyn CredentialStore>,
        mailer: Arc<dyn EmailSender>,
    ) -> Self {
        info!("Initializing authentication service");

        Self {
            store,
            mailer,
            sessions: SessionIssuer::new(&config.auth),
            public_url: config.server.public_url.clone(),
            reset_token_ttl_secs: config.auth.reset_token_ttl_secs,
            min_password_len: config.auth.min_password_len,
        }
    }

    /// Get the session issuer
    pub fn sessions(&self) -> &SessionIssuer {
        &self.sessions
    }

    /// Authenticate credentials and mint a session token.
    ///
    /// Every failure is the same generic [`AppError::AuthFailure`], so the
    /// caller cannot tell an unknown email from a wrong password.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<(Account, String)> {
        let email = normalize_email(email);
        info!("Sign-in attempt for {}", email);

        let account = match self.store.find_by_email(&email).await? {
            Some(account) => account,
            None => return self.promote_legacy_member(&email, password).await,
        };

        self.verify_and_issue(account, password)
    }

    /// Register a new account.
    ///
    /// A matching directory entry hands its role and member link to the
    /// account; otherwise the account starts as a regular member.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Account> {
        let email = normalize_email(email);
        info!("Registration attempt for {}", email);

        self.ensure_password_length(password)?;
        let password_hash = hash_password(password)?;

        let member = self.store.find_member_by_email(&email).await?;
        let (role, member_id) = match member {
            Some(entry) => (entry.role, Some(entry.id)),
            None => (Role::Member, None),
        };

        let account = self
            .store
            .create(NewAccount {
                name: name.to_string(),
                email,
                password_hash,
                role,
                status: AccountStatus::Active,
                member_id,
            })
            .await?;

        info!("Account registered: {}", account.id);
        Ok(account)
    }

    /// Check the password and issue a session
    fn verify_and_issue(&self, account: Account, password: &str) -> Result<(Account, String)> {
        if !account.is_active() {
            // Provisioned accounts must complete the reset flow first;
            // externally this is indistinguishable from a bad password
            warn!("Sign-in attempt for pending account: {}", account.id);
            return Err(AppError::AuthFailure);
        }

        if !verify_password(password, &account.password_hash)? {
            return Err(AppError::AuthFailure);
        }

        let token = self.sessions.issue(&account)?;
        info!("Sign-in succeeded for account: {}", account.id);
        Ok((account, token))
    }

    /// Back-compat path for privileged directory entries without an account.
    ///
    /// Instead of granting a session against a placeholder credential, the
    /// entry gets an account in the must-set-password state plus a reset
    /// link, and the caller still sees the generic failure. The account
    /// owner activates it through the reset flow.
    async fn promote_legacy_member(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Account, String)> {
        let Some(entry) = self.store.find_member_by_email(email).await? else {
            return Err(AppError::AuthFailure);
        };
        if !entry.role.at_least(Role::Leader) {
            return Err(AppError::AuthFailure);
        }

        let placeholder = unusable_password_hash()?;
        let created = self
            .store
            .create(NewAccount {
                name: entry.name.clone(),
                email: email.to_string(),
                password_hash: placeholder,
                role: entry.role,
                status: AccountStatus::PendingPassword,
                member_id: Some(entry.id),
            })
            .await;

        let account = match created {
            Ok(account) => account,
            Err(AppError::DuplicateEmail) => {
                // Lost the provision race; the account now exists, so fall
                // through to the normal path
                let Some(account) = self.store.find_by_email(email).await? else {
                    return Err(AppError::AuthFailure);
                };
                return self.verify_and_issue(account, password);
            }
            Err(e) => return Err(e),
        };

        info!(
            "Provisioned pending account {} for directory entry {}",
            account.id, entry.id
        );

        // Kick off the reset flow so the owner can set a real password
        let token = generate_reset_token();
        let expiry = Utc::now() + Duration::seconds(self.reset_token_ttl_secs);
        self.store.set_reset_token(account.id, &token, expiry).await?;

        if let Err(e) = self
            .mailer
            .send(reset_email(&self.public_url, email, &token))
            .await
        {
            warn!("Failed to send activation email to {}: {}", email, e);
        }

        Err(AppError::AuthFailure)
    }

    /// Reject passwords shorter than the configured minimum, before any
    /// store access
    pub(crate) fn ensure_password_length(&self, password: &str) -> Result<()> {
        if password.len() < self.min_password_len {
            return Err(AppError::validation(format!(
                "Password must be at least {} characters long",
                self.min_password_len
            )));
        }
        Ok(())
    }
}
