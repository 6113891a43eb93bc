//! Registration, login, sessions, favorites and search history.
//!
//! Everything is serialized into the shared [`LocalStore`]; there is no
//! server. The storage layout mirrors the persisted-key contract:
//! `users`, `session`, `search_history`, `favorites`, `reset_tokens`.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use skycast_core::{LocalStore, StorageError};

use crate::error::AuthError;
use crate::types::{HistoryEntry, ResetToken, SecurityQuestion, Session, UserInfo, UserRecord};

const USERS_KEY: &str = "users";
const SESSION_KEY: &str = "session";
const HISTORY_KEY: &str = "search_history";
const FAVORITES_KEY: &str = "favorites";
const RESET_TOKENS_KEY: &str = "reset_tokens";

/// Search history keeps at most this many entries, newest first.
const HISTORY_CAP: usize = 100;

/// Reset tokens are valid for one hour.
const RESET_TOKEN_TTL_HOURS: i64 = 1;

/// Fixed list of security questions offered at registration.
pub const SECURITY_QUESTIONS: [&str; 8] = [
    "What was the name of your first pet?",
    "In what city were you born?",
    "What is your mother's first name?",
    "What is the name of your best friend from school?",
    "What is the name of the street you live on?",
    "What is your favorite food?",
    "In what year did you finish primary school?",
    "What is your father's first name?",
];

type FavoritesMap = HashMap<String, Vec<String>>;
type ResetTokenMap = HashMap<String, ResetToken>;

/// Demo credential store backed by [`LocalStore`].
pub struct AuthService {
    store: Arc<LocalStore>,
}

impl AuthService {
    /// Create the service, seeding demo data on first run.
    pub fn new(store: Arc<LocalStore>) -> Result<Self, AuthError> {
        let service = Self { store };
        service.ensure_initialized()?;
        Ok(service)
    }

    /// Seed a demo user and repair legacy value shapes.
    fn ensure_initialized(&self) -> Result<(), AuthError> {
        if !self.store.contains(USERS_KEY) {
            let demo = UserRecord {
                id: "1".to_string(),
                username: "test".to_string(),
                email: "test@test.com".to_string(),
                password_hash: hash_password("test123"),
                security_question_index: 0,
                security_answer_hash: hash_password("whiskers"),
                created_at: Utc::now(),
            };
            self.store.set(USERS_KEY, &vec![demo])?;
            tracing::info!("Seeded demo user");
        }

        if !self.store.contains(HISTORY_KEY) {
            self.store.set(HISTORY_KEY, &Vec::<HistoryEntry>::new())?;
        }

        // Favorites must be a map of user id -> city list; older builds
        // stored a flat array, which gets reset here.
        let favorites: Result<Option<FavoritesMap>, StorageError> = self.store.get(FAVORITES_KEY);
        match favorites {
            Ok(Some(_)) => {}
            Ok(None) => self.store.set(FAVORITES_KEY, &FavoritesMap::new())?,
            Err(StorageError::Corrupt { .. }) => {
                tracing::warn!("Favorites had a legacy shape, resetting to a map");
                self.store.set(FAVORITES_KEY, &FavoritesMap::new())?;
            }
            Err(e) => return Err(e.into()),
        }

        Ok(())
    }

    // --- Registration & login ---

    /// Register a new user.
    pub fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        security_question_index: usize,
        security_answer: &str,
    ) -> Result<UserInfo, AuthError> {
        if username.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if username.len() < 3 {
            return Err(AuthError::UsernameTooShort);
        }
        if !is_valid_email(email) {
            return Err(AuthError::InvalidEmail);
        }
        if password.len() < 5 {
            return Err(AuthError::PasswordTooShort);
        }
        if security_answer.trim().len() < 2 {
            return Err(AuthError::AnswerTooShort);
        }

        let mut users = self.users()?;
        if users.iter().any(|u| u.username == username) {
            return Err(AuthError::UsernameTaken);
        }
        if users.iter().any(|u| u.email == email) {
            return Err(AuthError::EmailTaken);
        }

        let user = UserRecord {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash: hash_password(password),
            security_question_index: security_question_index % SECURITY_QUESTIONS.len(),
            security_answer_hash: hash_password(&normalize_answer(security_answer)),
            created_at: Utc::now(),
        };
        let info = UserInfo::from(&user);

        users.push(user);
        self.store.set(USERS_KEY, &users)?;

        tracing::info!("Registered user: {}", username);
        Ok(info)
    }

    /// Log in by username or email, creating the persisted session.
    pub fn login(&self, username_or_email: &str, password: &str) -> Result<UserInfo, AuthError> {
        if username_or_email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingFields);
        }

        let users = self.users()?;
        let user = users
            .iter()
            .find(|u| u.username == username_or_email || u.email == username_or_email)
            .ok_or(AuthError::UnknownUser)?;

        if user.password_hash != hash_password(password) {
            return Err(AuthError::WrongPassword);
        }

        let session = Session {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            token: generate_token(),
            login_at: Utc::now(),
        };
        self.store.set(SESSION_KEY, &session)?;

        tracing::info!("Logged in: {}", user.username);
        Ok(UserInfo::from(user))
    }

    /// Drop the persisted session.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.store.remove(SESSION_KEY)?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// The active session, if any. A malformed stored session is cleared
    /// and treated as absent.
    pub fn current_session(&self) -> Option<Session> {
        match self.store.get::<Session>(SESSION_KEY) {
            Ok(session) => session,
            Err(StorageError::Corrupt { .. }) => {
                tracing::warn!("Clearing malformed session");
                let _ = self.store.remove(SESSION_KEY);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to read session: {}", e);
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_session().is_some()
    }

    // --- Favorites ---

    /// Favorite cities of the signed-in user; empty without a session.
    pub fn favorites(&self) -> Result<Vec<String>, AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(Vec::new());
        };
        let all = self.favorites_map()?;
        Ok(all.get(&session.id).cloned().unwrap_or_default())
    }

    /// Add a city to the signed-in user's favorites (at most once).
    pub fn add_favorite(&self, city: &str) -> Result<(), AuthError> {
        let session = self.current_session().ok_or(AuthError::NotAuthenticated)?;
        let mut all = self.favorites_map()?;
        let list = all.entry(session.id).or_default();
        if !list.iter().any(|c| c == city) {
            list.push(city.to_string());
            self.store.set(FAVORITES_KEY, &all)?;
            tracing::debug!("Added favorite: {}", city);
        }
        Ok(())
    }

    /// Remove a city from the signed-in user's favorites.
    pub fn remove_favorite(&self, city: &str) -> Result<(), AuthError> {
        let session = self.current_session().ok_or(AuthError::NotAuthenticated)?;
        let mut all = self.favorites_map()?;
        if let Some(list) = all.get_mut(&session.id) {
            list.retain(|c| c != city);
            self.store.set(FAVORITES_KEY, &all)?;
            tracing::debug!("Removed favorite: {}", city);
        }
        Ok(())
    }

    // --- Search history ---

    /// Record a search for the signed-in user; silently skipped without a
    /// session. The log is capped at 100 entries, newest first.
    pub fn add_history(
        &self,
        city: &str,
        temperature: f64,
        condition: &str,
    ) -> Result<(), AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };

        let mut history = self.full_history()?;
        history.insert(
            0,
            HistoryEntry {
                id: Uuid::new_v4().to_string(),
                user_id: session.id,
                city: city.to_string(),
                temperature,
                condition: condition.to_string(),
                timestamp: Utc::now(),
            },
        );
        history.truncate(HISTORY_CAP);
        self.store.set(HISTORY_KEY, &history)?;

        tracing::debug!("Recorded search: {}", city);
        Ok(())
    }

    /// Search history of the signed-in user, newest first.
    pub fn history(&self) -> Result<Vec<HistoryEntry>, AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(Vec::new());
        };
        let history = self.full_history()?;
        Ok(history.into_iter().filter(|e| e.user_id == session.id).collect())
    }

    /// Delete one history entry by id.
    pub fn delete_history_entry(&self, entry_id: &str) -> Result<(), AuthError> {
        let mut history = self.full_history()?;
        history.retain(|e| e.id != entry_id);
        self.store.set(HISTORY_KEY, &history)?;
        Ok(())
    }

    /// Clear the signed-in user's history, leaving other users' intact.
    pub fn clear_history(&self) -> Result<(), AuthError> {
        let Some(session) = self.current_session() else {
            return Ok(());
        };
        let mut history = self.full_history()?;
        history.retain(|e| e.user_id != session.id);
        self.store.set(HISTORY_KEY, &history)?;
        Ok(())
    }

    // --- Password recovery ---

    /// The fixed security question list.
    pub fn security_questions(&self) -> &'static [&'static str] {
        &SECURITY_QUESTIONS
    }

    /// Look up a user's security question by email.
    pub fn security_question_by_email(&self, email: &str) -> Result<Option<SecurityQuestion>, AuthError> {
        let users = self.users()?;
        Ok(users.iter().find(|u| u.email == email).map(|u| SecurityQuestion {
            index: u.security_question_index,
            question: SECURITY_QUESTIONS[u.security_question_index % SECURITY_QUESTIONS.len()],
            email: u.email.clone(),
        }))
    }

    /// Verify a security answer (case-insensitive, trimmed).
    pub fn verify_security_answer(&self, email: &str, answer: &str) -> Result<(), AuthError> {
        let users = self.users()?;
        let user = users.iter().find(|u| u.email == email).ok_or(AuthError::UnknownUser)?;

        if user.security_answer_hash != hash_password(&normalize_answer(answer)) {
            return Err(AuthError::WrongAnswer);
        }
        Ok(())
    }

    /// Set a new password after the security answer was verified.
    pub fn reset_password_by_security_question(
        &self,
        email: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if email.is_empty() || new_password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if new_password.len() < 5 {
            return Err(AuthError::PasswordTooShort);
        }

        let mut users = self.users()?;
        let user =
            users.iter_mut().find(|u| u.email == email).ok_or(AuthError::UnknownUser)?;
        user.password_hash = hash_password(new_password);
        self.store.set(USERS_KEY, &users)?;

        tracing::info!("Password reset for: {}", email);
        Ok(())
    }

    /// Request a password reset token.
    ///
    /// Returns `Ok(None)` for an unknown email so callers can show the
    /// same non-revealing message in both cases.
    pub fn request_password_reset(&self, email: &str) -> Result<Option<String>, AuthError> {
        let users = self.users()?;
        let Some(user) = users.iter().find(|u| u.email == email) else {
            return Ok(None);
        };

        let token = generate_token();
        let mut tokens = self.reset_tokens()?;
        tokens.insert(
            token.clone(),
            ResetToken {
                user_id: user.id.clone(),
                email: user.email.clone(),
                expires_at: Utc::now() + Duration::hours(RESET_TOKEN_TTL_HOURS),
                created_at: Utc::now(),
            },
        );
        self.store.set(RESET_TOKENS_KEY, &tokens)?;

        // There is no mail server; the controller logs the link instead.
        tracing::info!("Reset token issued for: {}", email);
        Ok(Some(token))
    }

    /// Reset a password with a previously issued token. The token is
    /// consumed on success and removed when expired.
    pub fn reset_password(&self, token: &str, new_password: &str) -> Result<(), AuthError> {
        if token.is_empty() || new_password.is_empty() {
            return Err(AuthError::MissingFields);
        }
        if new_password.len() < 5 {
            return Err(AuthError::PasswordTooShort);
        }

        let mut tokens = self.reset_tokens()?;
        let data = tokens.get(token).cloned().ok_or(AuthError::InvalidResetToken)?;

        if data.expires_at < Utc::now() {
            tokens.remove(token);
            self.store.set(RESET_TOKENS_KEY, &tokens)?;
            return Err(AuthError::ResetTokenExpired);
        }

        let mut users = self.users()?;
        if let Some(user) = users.iter_mut().find(|u| u.id == data.user_id) {
            user.password_hash = hash_password(new_password);
            self.store.set(USERS_KEY, &users)?;
        }

        tokens.remove(token);
        self.store.set(RESET_TOKENS_KEY, &tokens)?;

        tracing::info!("Password reset via token for: {}", data.email);
        Ok(())
    }

    // --- Storage helpers ---

    fn users(&self) -> Result<Vec<UserRecord>, AuthError> {
        Ok(self.store.get(USERS_KEY)?.unwrap_or_default())
    }

    fn favorites_map(&self) -> Result<FavoritesMap, AuthError> {
        Ok(self.store.get(FAVORITES_KEY)?.unwrap_or_default())
    }

    fn full_history(&self) -> Result<Vec<HistoryEntry>, AuthError> {
        Ok(self.store.get(HISTORY_KEY)?.unwrap_or_default())
    }

    fn reset_tokens(&self) -> Result<ResetTokenMap, AuthError> {
        Ok(self.store.get(RESET_TOKENS_KEY)?.unwrap_or_default())
    }
}

/// Rolling 32-bit hash over UTF-16 code units, hex-encoded.
///
/// Demo-grade only; kept for compatibility with the persisted records.
fn hash_password(password: &str) -> String {
    let mut hash: i32 = 0;
    for unit in password.encode_utf16() {
        hash = hash.wrapping_shl(5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    format!("{:x}", hash.unsigned_abs())
}

fn normalize_answer(answer: &str) -> String {
    answer.trim().to_lowercase()
}

fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty()
                && domain.contains('.')
                && domain.split('.').all(|segment| !segment.is_empty())
        }
        _ => false,
    }
}

fn generate_token() -> String {
    format!("{}{:x}", Uuid::new_v4().simple(), Utc::now().timestamp_millis())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use tempfile::tempdir;

    fn service(dir: &std::path::Path) -> AuthService {
        let store = Arc::new(LocalStore::open(dir).unwrap());
        AuthService::new(store).unwrap()
    }

    #[test]
    fn test_demo_user_can_log_in() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        let user = auth.login("test", "test123").unwrap();
        assert_eq!(user.username, "test");
        assert!(auth.is_authenticated());
    }

    #[test]
    fn test_login_by_email() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        let user = auth.login("test@test.com", "test123").unwrap();
        assert_eq!(user.email, "test@test.com");
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        let err = auth.login("test", "nope1").unwrap_err();
        assert!(matches!(err, AuthError::WrongPassword));
        assert!(!auth.is_authenticated());
    }

    #[test]
    fn test_unknown_user_is_rejected() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());
        assert!(matches!(auth.login("ghost", "pass123"), Err(AuthError::UnknownUser)));
    }

    #[test]
    fn test_register_then_login() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        let info =
            auth.register("alice", "alice@example.com", "secret1", 1, "Rex").unwrap();
        assert_eq!(info.username, "alice");

        let logged_in = auth.login("alice", "secret1").unwrap();
        assert_eq!(logged_in.id, info.id);
    }

    #[test]
    fn test_register_validations() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        assert!(matches!(
            auth.register("", "a@b.com", "secret1", 0, "Rex"),
            Err(AuthError::MissingFields)
        ));
        assert!(matches!(
            auth.register("ab", "a@b.com", "secret1", 0, "Rex"),
            Err(AuthError::UsernameTooShort)
        ));
        assert!(matches!(
            auth.register("alice", "not-an-email", "secret1", 0, "Rex"),
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            auth.register("alice", "a@b.com", "1234", 0, "Rex"),
            Err(AuthError::PasswordTooShort)
        ));
        assert!(matches!(
            auth.register("alice", "a@b.com", "secret1", 0, " x "),
            Err(AuthError::AnswerTooShort)
        ));
    }

    #[test]
    fn test_duplicate_username_and_email_rejected() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        auth.register("alice", "alice@example.com", "secret1", 0, "Rex").unwrap();
        assert!(matches!(
            auth.register("alice", "other@example.com", "secret1", 0, "Rex"),
            Err(AuthError::UsernameTaken)
        ));
        assert!(matches!(
            auth.register("bob", "alice@example.com", "secret1", 0, "Rex"),
            Err(AuthError::EmailTaken)
        ));
    }

    #[test]
    fn test_logout_clears_session() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        auth.login("test", "test123").unwrap();
        auth.logout().unwrap();
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn test_corrupt_session_is_cleared() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        std::fs::write(dir.path().join("session.json"), "{broken").unwrap();
        assert!(auth.current_session().is_none());
        // A later read finds the key gone, not corrupt again.
        assert!(auth.current_session().is_none());
    }

    #[test]
    fn test_favorites_require_session() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        assert!(auth.favorites().unwrap().is_empty());
        assert!(matches!(auth.add_favorite("Oslo"), Err(AuthError::NotAuthenticated)));
    }

    #[test]
    fn test_favorites_add_once_remove() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());
        auth.login("test", "test123").unwrap();

        auth.add_favorite("Oslo").unwrap();
        auth.add_favorite("Oslo").unwrap(); // idempotent
        auth.add_favorite("Paris").unwrap();
        assert_eq!(auth.favorites().unwrap(), vec!["Oslo", "Paris"]);

        auth.remove_favorite("Oslo").unwrap();
        assert_eq!(auth.favorites().unwrap(), vec!["Paris"]);
    }

    #[test]
    fn test_favorites_are_per_user() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        auth.login("test", "test123").unwrap();
        auth.add_favorite("Oslo").unwrap();

        auth.register("alice", "alice@example.com", "secret1", 0, "Rex").unwrap();
        auth.login("alice", "secret1").unwrap();
        assert!(auth.favorites().unwrap().is_empty());

        auth.add_favorite("Paris").unwrap();
        auth.login("test", "test123").unwrap();
        assert_eq!(auth.favorites().unwrap(), vec!["Oslo"]);
    }

    #[test]
    fn test_history_is_capped_and_newest_first() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());
        auth.login("test", "test123").unwrap();

        for i in 0..105 {
            auth.add_history(&format!("City{}", i), 20.0, "Clear").unwrap();
        }

        let history = auth.history().unwrap();
        assert_eq!(history.len(), 100);
        assert_eq!(history[0].city, "City104");
        assert_eq!(history[99].city, "City5");
    }

    #[test]
    fn test_history_without_session_is_dropped() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        auth.add_history("Oslo", 5.0, "Snow").unwrap();
        auth.login("test", "test123").unwrap();
        assert!(auth.history().unwrap().is_empty());
    }

    #[test]
    fn test_clear_history_only_touches_current_user() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        auth.login("test", "test123").unwrap();
        auth.add_history("Oslo", 5.0, "Snow").unwrap();

        auth.register("alice", "alice@example.com", "secret1", 0, "Rex").unwrap();
        auth.login("alice", "secret1").unwrap();
        auth.add_history("Paris", 15.0, "Clear").unwrap();
        auth.clear_history().unwrap();
        assert!(auth.history().unwrap().is_empty());

        auth.login("test", "test123").unwrap();
        assert_eq!(auth.history().unwrap().len(), 1);
    }

    #[test]
    fn test_delete_history_entry() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());
        auth.login("test", "test123").unwrap();

        auth.add_history("Oslo", 5.0, "Snow").unwrap();
        auth.add_history("Paris", 15.0, "Clear").unwrap();

        let history = auth.history().unwrap();
        auth.delete_history_entry(&history[0].id).unwrap();

        let remaining = auth.history().unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].city, "Oslo");
    }

    #[test]
    fn test_security_answer_is_case_insensitive() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        auth.verify_security_answer("test@test.com", "  WhIsKeRs ").unwrap();
        assert!(matches!(
            auth.verify_security_answer("test@test.com", "rex"),
            Err(AuthError::WrongAnswer)
        ));
    }

    #[test]
    fn test_security_question_lookup() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        let questions = auth.security_questions();
        assert_eq!(questions.len(), 8);

        let q = auth.security_question_by_email("test@test.com").unwrap().unwrap();
        assert_eq!(q.index, 0);
        assert_eq!(q.question, questions[0]);

        assert!(auth.security_question_by_email("ghost@test.com").unwrap().is_none());
    }

    #[test]
    fn test_reset_by_security_question() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        auth.reset_password_by_security_question("test@test.com", "newpass").unwrap();
        assert!(matches!(auth.login("test", "test123"), Err(AuthError::WrongPassword)));
        auth.login("test", "newpass").unwrap();
    }

    #[test]
    fn test_reset_token_flow() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());

        let token = auth.request_password_reset("test@test.com").unwrap().unwrap();
        auth.reset_password(&token, "newpass").unwrap();
        auth.login("test", "newpass").unwrap();

        // Token is consumed.
        assert!(matches!(
            auth.reset_password(&token, "evenmore"),
            Err(AuthError::InvalidResetToken)
        ));
    }

    #[test]
    fn test_reset_token_unknown_email_is_non_revealing() {
        let dir = tempdir().unwrap();
        let auth = service(dir.path());
        assert!(auth.request_password_reset("ghost@test.com").unwrap().is_none());
    }

    #[test]
    fn test_expired_reset_token_is_rejected_and_removed() {
        let dir = tempdir().unwrap();
        let store = Arc::new(LocalStore::open(dir.path()).unwrap());
        let auth = AuthService::new(store.clone()).unwrap();

        let mut tokens = ResetTokenMap::new();
        tokens.insert(
            "stale".to_string(),
            ResetToken {
                user_id: "1".to_string(),
                email: "test@test.com".to_string(),
                expires_at: Utc::now() - Duration::hours(2),
                created_at: Utc::now() - Duration::hours(3),
            },
        );
        store.set(RESET_TOKENS_KEY, &tokens).unwrap();

        assert!(matches!(
            auth.reset_password("stale", "newpass"),
            Err(AuthError::ResetTokenExpired)
        ));
        let remaining: ResetTokenMap = store.get(RESET_TOKENS_KEY).unwrap().unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_hash_is_stable_and_hex() {
        let a = hash_password("test123");
        let b = hash_password("test123");
        assert_eq!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(hash_password("test123"), hash_password("test124"));
    }

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.domain.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a@b..com"));
    }
}
