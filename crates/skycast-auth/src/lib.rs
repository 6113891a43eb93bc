//! Demo credential store for Skycast.
//!
//! Users, sessions, per-user favorites, a capped search-history log and
//! password-reset tokens, all persisted through the local key-value store.
//! Passwords are hashed with a non-cryptographic rolling hash; this is a
//! demo account system, not real security.

pub mod error;
pub mod service;
pub mod types;

pub use error::AuthError;
pub use service::{AuthService, SECURITY_QUESTIONS};
pub use types::{HistoryEntry, ResetToken, SecurityQuestion, Session, UserInfo, UserRecord};
