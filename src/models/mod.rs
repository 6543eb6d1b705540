//! Data model types

pub mod account;

pub use account::{Account, AccountStatus, DirectoryEntry, NewAccount, Role, normalize_email};
