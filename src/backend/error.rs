//! Collaborator error types

use thiserror::Error;

/// Message shown when a collaborator failure carries no text of its own
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Authentication failures reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("wrong password")]
    WrongPassword,
    #[error("no account found for {0}")]
    UserNotFound(String),
    #[error("email already in use")]
    EmailTaken,
    #[error("password should be at least {0} characters")]
    WeakPassword(usize),
    #[error("invalid email")]
    InvalidEmail,
    #[error("network error: {0}")]
    Network(String),
    #[error("{0}")]
    Other(String),
}

/// Record store failures reported by the backend
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("write rejected: {0}")]
    Rejected(String),
    #[error("{0}")]
    Other(String),
}

/// Any failure coming back from the collaborator during a submission.
///
/// These are only ever surfaced as a single top-level message next to the
/// form, never attached to an individual field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CollaboratorError {
    /// Human-readable text for the form's top-level error line
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_password_is_surfaced_verbatim() {
        let err = CollaboratorError::from(AuthError::WrongPassword);
        assert_eq!(err.user_message(), "wrong password");
    }

    #[test]
    fn test_store_error_message() {
        let err = CollaboratorError::from(StoreError::Rejected("quota exceeded".into()));
        assert_eq!(err.user_message(), "write rejected: quota exceeded");
    }

    #[test]
    fn test_empty_message_falls_back_to_generic() {
        let err = CollaboratorError::from(AuthError::Other(String::new()));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);

        let err = CollaboratorError::from(StoreError::Other("   ".into()));
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
    }
}
