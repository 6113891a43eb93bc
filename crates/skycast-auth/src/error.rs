//! Credential store error types.
//!
//! Validation failures are tagged variants, not `{success, message}`
//! pairs, so callers get exhaustive handling instead of string-sniffing.

use skycast_core::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("All fields are required")]
    MissingFields,

    #[error("Username must be at least 3 characters")]
    UsernameTooShort,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least 5 characters")]
    PasswordTooShort,

    #[error("Security answer must be at least 2 characters")]
    AnswerTooShort,

    #[error("Username is already taken")]
    UsernameTaken,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Unknown user")]
    UnknownUser,

    #[error("Wrong password")]
    WrongPassword,

    #[error("Wrong security answer")]
    WrongAnswer,

    #[error("Invalid reset token")]
    InvalidResetToken,

    #[error("Reset token has expired")]
    ResetTokenExpired,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl AuthError {
    /// User-friendly message for UI display.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::MissingFields => "Please fill in all fields.",
            AuthError::UsernameTooShort => "Username must have at least 3 characters.",
            AuthError::InvalidEmail => "Please enter a valid email address.",
            AuthError::PasswordTooShort => "Password must have at least 5 characters.",
            AuthError::AnswerTooShort => "The security answer must not be empty.",
            AuthError::UsernameTaken => "That username is already taken.",
            AuthError::EmailTaken => "That email is already in use.",
            AuthError::UnknownUser => "User does not exist.",
            AuthError::WrongPassword => "Wrong password.",
            AuthError::WrongAnswer => "Wrong answer to the security question.",
            AuthError::InvalidResetToken => "Invalid password reset token.",
            AuthError::ResetTokenExpired => "The password reset token has expired.",
            AuthError::NotAuthenticated => "Please sign in first.",
            AuthError::Storage(_) => "A local data operation failed. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let errors = [
            AuthError::MissingFields,
            AuthError::UsernameTaken,
            AuthError::WrongPassword,
            AuthError::ResetTokenExpired,
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
        }
    }
}
