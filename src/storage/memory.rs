//! In-memory credential store

use crate::models::{Account, AccountStatus, DirectoryEntry, NewAccount};
use crate::storage::CredentialStore;
use crate::utils::error::{AppError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// In-memory store state; one lock serializes conflicting writes to the same
/// account, matching the discipline a relational store would provide
#[derive(Default)]
struct StoreData {
    accounts: HashMap<Uuid, Account>,
    directory: HashMap<String, DirectoryEntry>,
}

/// In-memory credential store, for tests and single-node deployments
#[derive(Default)]
pub struct MemoryStore {
    data: RwLock<StoreData>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a directory entry (the directory itself is managed elsewhere)
    pub fn insert_member(&self, entry: DirectoryEntry) {
        let mut data = self.data.write();
        data.directory.insert(entry.email.clone(), entry);
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>> {
        let data = self.data.read();
        Ok(data.accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_reset_token(&self, token: &str) -> Result<Option<Account>> {
        let now = Utc::now();
        let data = self.data.read();
        Ok(data
            .accounts
            .values()
            .find(|a| {
                a.reset_token.as_deref() == Some(token)
                    && a.reset_token_expiry.is_some_and(|expiry| expiry > now)
            })
            .cloned())
    }

    async fn create(&self, fields: NewAccount) -> Result<Account> {
        let mut data = self.data.write();

        if data.accounts.values().any(|a| a.email == fields.email) {
            return Err(AppError::DuplicateEmail);
        }

        let account = Account {
            id: Uuid::new_v4(),
            name: fields.name,
            email: fields.email,
            password_hash: fields.password_hash,
            role: fields.role,
            status: fields.status,
            reset_token: None,
            reset_token_expiry: None,
            member_id: fields.member_id,
            created_at: Utc::now(),
        };

        data.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_password(&self, id: Uuid, new_hash: &str) -> Result<()> {
        let mut data = self.data.write();
        let account = data
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::store(format!("No account with id {}", id)))?;

        // Hash write, token clear, and activation are one atomic mutation
        account.password_hash = new_hash.to_string();
        account.reset_token = None;
        account.reset_token_expiry = None;
        account.status = AccountStatus::Active;
        Ok(())
    }

    async fn set_reset_token(
        &self,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<()> {
        let mut data = self.data.write();
        let account = data
            .accounts
            .get_mut(&id)
            .ok_or_else(|| AppError::store(format!("No account with id {}", id)))?;

        account.reset_token = Some(token.to_string());
        account.reset_token_expiry = Some(expiry);
        Ok(())
    }

    async fn find_member_by_email(&self, email: &str) -> Result<Option<DirectoryEntry>> {
        let data = self.data.read();
        Ok(data.directory.get(email).cloned())
    }
}
