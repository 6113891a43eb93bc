use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user as persisted under the `users` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub security_question_index: usize,
    pub security_answer_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The active session as persisted under the `session` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: String,
    pub login_at: DateTime<Utc>,
}

/// Public identity handed to the rest of the app; never carries hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl From<&UserRecord> for UserInfo {
    fn from(user: &UserRecord) -> Self {
        Self { id: user.id.clone(), username: user.username.clone(), email: user.email.clone() }
    }
}

impl From<&Session> for UserInfo {
    fn from(session: &Session) -> Self {
        Self {
            id: session.id.clone(),
            username: session.username.clone(),
            email: session.email.clone(),
        }
    }
}

/// One search recorded in the capped history log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: String,
    pub user_id: String,
    pub city: String,
    pub temperature: f64,
    pub condition: String,
    pub timestamp: DateTime<Utc>,
}

/// Password reset token payload keyed by the token string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetToken {
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A user's security question, looked up by email for password recovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityQuestion {
    pub index: usize,
    pub question: &'static str,
    pub email: String,
}
