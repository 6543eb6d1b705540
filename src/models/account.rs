//! Account and role types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalize an email for lookup and storage.
///
/// Every entry point lowercases and trims, so exactly one account can exist
/// per address regardless of the casing the caller typed.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Account role, ordered by privilege
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Regular member
    Member,
    /// Group or ministry leader
    Leader,
    /// Pastor
    Pastor,
    /// Administrator
    Admin,
}

impl Role {
    /// Whether this role sits at or above the given tier
    pub fn at_least(self, tier: Role) -> bool {
        self >= tier
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Member => write!(f, "member"),
            Role::Leader => write!(f, "leader"),
            Role::Pastor => write!(f, "pastor"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Role::Member),
            "leader" => Ok(Role::Leader),
            "pastor" => Ok(Role::Pastor),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountStatus {
    /// Active account
    Active,
    /// Provisioned without a real password; must complete the reset flow
    PendingPassword,
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Account ID
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Email address (unique, normalized)
    pub email: String,
    /// Password hash
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Account status
    pub status: AccountStatus,
    /// Current reset token; set and cleared together with the expiry
    #[serde(skip_serializing, default)]
    pub reset_token: Option<String>,
    /// Reset token expiry
    #[serde(skip_serializing, default)]
    pub reset_token_expiry: Option<DateTime<Utc>>,
    /// Optional link to a directory entry
    pub member_id: Option<Uuid>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Whether the account can authenticate
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }
}

/// Fields for creating a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name
    pub name: String,
    /// Email address (normalized by the caller)
    pub email: String,
    /// Password hash
    pub password_hash: String,
    /// Account role
    pub role: Role,
    /// Account status
    pub status: AccountStatus,
    /// Optional link to a directory entry
    pub member_id: Option<Uuid>,
}

/// A person record in the church directory, distinct from an Account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
    /// Directory entry ID
    pub id: Uuid,
    /// Person's name
    pub name: String,
    /// Email address
    pub email: String,
    /// Role held in the church
    pub role: Role,
}
