//! Service collaborators

pub mod mailer;

pub use mailer::{Email, EmailSender, LogMailer};
