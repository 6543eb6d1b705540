//! Credential persistence
//!
//! The auth core talks to persistence through the [`CredentialStore`] trait;
//! the store performs no side effects beyond its own state (it never sends
//! email or renders anything). An in-memory implementation is provided for
//! tests and single-node deployments.

pub mod memory;

pub use memory::MemoryStore;

use crate::models::{Account, DirectoryEntry, NewAccount};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Persistence contract for accounts and reset tokens
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find an account by normalized email
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>>;

    /// Find the account holding this reset token, only while the token is
    /// unexpired
    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>>;

    /// Create an account; fails with `DuplicateEmail` when the email is taken
    async fn create(&self, fields: NewAccount) -> Result<Account>;

    /// Replace the password hash, clearing any reset token and expiry and
    /// marking the account active, all in the same operation
    async fn update_password(&self, id: Uuid, new_hash: &str) -> Result<()>;

    /// Set the reset token and expiry, replacing any prior token wholesale
    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<()>;

    /// Look up a directory entry by normalized email
    async fn find_member_by_email(&self, email: &str) -> Result<Option<DirectoryEntry>>;
}
