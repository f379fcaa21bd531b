//! Trait abstraction for the authentication and record-store collaborator

use super::error::{AuthError, StoreError};
use super::subscription::{SessionCallback, Subscription};
use super::types::{Filter, Record, RecordFields, RecordId, Session};
use async_trait::async_trait;

/// Operations the forms need from the backend, enabling mocking in tests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Backend: Send + Sync {
    /// Sign in with existing credentials
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// Create an account and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError>;

    /// End the current session
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Store a new record in `collection`
    async fn create_record(
        &self,
        collection: &str,
        fields: RecordFields,
    ) -> Result<RecordId, StoreError>;

    /// Find records in `collection` matching `filter`.
    /// An empty result is not an error.
    async fn find_records(&self, collection: &str, filter: Filter)
        -> Result<Vec<Record>, StoreError>;

    /// Observe session changes. The callback fires once right away with the
    /// current state, then on every sign-in and sign-out until the returned
    /// subscription is cancelled or dropped.
    fn on_session_change(&self, callback: SessionCallback) -> Subscription;
}
