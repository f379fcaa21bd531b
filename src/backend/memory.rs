//! In-process backend used by the application and its tests

use super::error::{AuthError, StoreError};
use super::subscription::{SessionCallback, SessionListeners, Subscription};
use super::traits::Backend;
use super::types::{Filter, Record, RecordFields, RecordId, Session};
use anyhow::{Context, Result};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

/// Shortest password the backend accepts on sign-up
pub const MIN_PASSWORD_LEN: usize = 6;

/// Stored account
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Account {
    uid: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

/// Everything that survives a restart. Sessions are deliberately absent.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    accounts: BTreeMap<String, Account>,
    #[serde(default)]
    collections: BTreeMap<String, Vec<Record>>,
}

#[derive(Debug, Default)]
struct Inner {
    data: Snapshot,
    session: Option<Session>,
    fail_next_auth: Option<AuthError>,
    fail_next_store: Option<StoreError>,
}

/// Backend keeping accounts and records in memory, optionally mirrored to a
/// JSON snapshot on disk
#[derive(Debug)]
pub struct MemoryBackend {
    inner: Mutex<Inner>,
    listeners: Arc<SessionListeners>,
    latency: Duration,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    /// Create an empty backend with no latency and no persistence
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            listeners: SessionListeners::new(),
            latency: Duration::ZERO,
            snapshot_path: None,
        }
    }

    /// Open a backend mirrored to `path`, loading it when the file exists
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("failed to parse {}", path.display()))?
        } else {
            Snapshot::default()
        };

        tracing::info!(
            path = %path.display(),
            accounts = data.accounts.len(),
            "opened local backend"
        );

        let backend = Self::new();
        backend.inner.lock().data = data;
        Ok(Self {
            snapshot_path: Some(path),
            ..backend
        })
    }

    /// Delay every call by `latency`
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Make the next sign-in, sign-up or sign-out fail with `error`
    #[cfg(test)]
    pub fn fail_next_auth(&self, error: AuthError) {
        self.inner.lock().fail_next_auth = Some(error);
    }

    /// Make the next record store call fail with `error`
    #[cfg(test)]
    pub fn fail_next_store(&self, error: StoreError) {
        self.inner.lock().fail_next_store = Some(error);
    }

    /// The signed-in session, if any
    pub fn current_session(&self) -> Option<Session> {
        self.inner.lock().session.clone()
    }

    /// Number of live session listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// All records in a collection, in insertion order
    #[cfg(test)]
    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.inner
            .lock()
            .data
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn take_auth_failure(&self) -> Result<(), AuthError> {
        match self.inner.lock().fail_next_auth.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn take_store_failure(&self) -> Result<(), StoreError> {
        match self.inner.lock().fail_next_store.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn start_session(&self, account: &Account) -> Session {
        let session = Session {
            uid: account.uid.clone(),
            email: account.email.clone(),
            signed_in_at: Utc::now(),
        };
        self.inner.lock().session = Some(session.clone());
        self.listeners.notify(Some(session.clone()));
        session
    }

    /// Write the snapshot if this backend is file-backed
    fn persist(&self) -> Result<()> {
        let Some(path) = &self.snapshot_path else {
            return Ok(());
        };
        let content = serde_json::to_string_pretty(&self.inner.lock().data)?;
        write_snapshot(path, &content)
    }
}

fn write_snapshot(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Other(format!("failed to hash password: {e}")))
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.simulate_latency().await;
        self.take_auth_failure()?;

        let key = normalize_email(email);
        let account = self
            .inner
            .lock()
            .data
            .accounts
            .get(&key)
            .cloned()
            .ok_or_else(|| AuthError::UserNotFound(key.clone()))?;

        if !verify_password(password, &account.password_hash) {
            tracing::info!(uid = %account.uid, "sign-in rejected");
            return Err(AuthError::WrongPassword);
        }

        tracing::info!(uid = %account.uid, "signed in");
        Ok(self.start_session(&account))
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        self.simulate_latency().await;
        self.take_auth_failure()?;

        let key = normalize_email(email);
        if !key.contains('@') {
            return Err(AuthError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword(MIN_PASSWORD_LEN));
        }
        if self.inner.lock().data.accounts.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }

        let account = Account {
            uid: uuid::Uuid::new_v4().simple().to_string(),
            email: key.clone(),
            password_hash: hash_password(password)?,
            created_at: Utc::now(),
        };

        {
            let mut inner = self.inner.lock();
            // Re-check under the lock: hashing above is slow.
            if inner.data.accounts.contains_key(&key) {
                return Err(AuthError::EmailTaken);
            }
            inner.data.accounts.insert(key, account.clone());
        }
        if let Err(e) = self.persist() {
            tracing::warn!("failed to persist account: {e:#}");
        }

        tracing::info!(uid = %account.uid, "account created");
        Ok(self.start_session(&account))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.simulate_latency().await;
        self.take_auth_failure()?;

        let previous = self.inner.lock().session.take();
        if let Some(session) = previous {
            tracing::info!(uid = %session.uid, "signed out");
            self.listeners.notify(None);
        }
        Ok(())
    }

    async fn create_record(
        &self,
        collection: &str,
        fields: RecordFields,
    ) -> Result<RecordId, StoreError> {
        self.simulate_latency().await;
        self.take_store_failure()?;

        let record = Record {
            id: RecordId::generate(),
            collection: collection.to_string(),
            fields,
            created_at: Utc::now(),
        };
        let id = record.id.clone();

        self.inner
            .lock()
            .data
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
        self.persist()
            .map_err(|e| StoreError::Unavailable(format!("{e:#}")))?;

        tracing::debug!(collection, id = %id, "record created");
        Ok(id)
    }

    async fn find_records(
        &self,
        collection: &str,
        filter: Filter,
    ) -> Result<Vec<Record>, StoreError> {
        self.simulate_latency().await;
        self.take_store_failure()?;

        let inner = self.inner.lock();
        let records = inner
            .data
            .collections
            .get(collection)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filter.matches(r))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(records)
    }

    fn on_session_change(&self, callback: SessionCallback) -> Subscription {
        let current = self.current_session();
        self.listeners.subscribe(current, callback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio_test::{assert_err, assert_ok};

    fn user_fields(uid: &str, name: &str) -> RecordFields {
        let mut fields = RecordFields::new();
        fields.insert("uid".into(), json!(uid));
        fields.insert("name".into(), json!(name));
        fields
    }

    mod auth {
        use super::*;

        #[tokio::test]
        async fn test_sign_up_then_sign_in() {
            let backend = MemoryBackend::new();
            let created = assert_ok!(backend.sign_up("Ada@Example.com", "secret1").await);
            assert_eq!(created.email, "ada@example.com");

            assert_ok!(backend.sign_out().await);
            let session = assert_ok!(backend.sign_in("ada@example.com ", "secret1").await);
            assert_eq!(session.uid, created.uid);
            assert_eq!(backend.current_session(), Some(session));
        }

        #[tokio::test]
        async fn test_wrong_password() {
            let backend = MemoryBackend::new();
            assert_ok!(backend.sign_up("a@b.com", "secret1").await);
            assert_ok!(backend.sign_out().await);

            let err = assert_err!(backend.sign_in("a@b.com", "secret2").await);
            assert_eq!(err, AuthError::WrongPassword);
            assert!(backend.current_session().is_none());
        }

        #[tokio::test]
        async fn test_unknown_user() {
            let backend = MemoryBackend::new();
            let err = assert_err!(backend.sign_in("nobody@b.com", "secret1").await);
            assert_eq!(err, AuthError::UserNotFound("nobody@b.com".into()));
        }

        #[tokio::test]
        async fn test_duplicate_email_rejected() {
            let backend = MemoryBackend::new();
            assert_ok!(backend.sign_up("a@b.com", "secret1").await);
            let err = assert_err!(backend.sign_up("A@B.COM", "another1").await);
            assert_eq!(err, AuthError::EmailTaken);
        }

        #[tokio::test]
        async fn test_weak_password_and_invalid_email() {
            let backend = MemoryBackend::new();
            let err = assert_err!(backend.sign_up("a@b.com", "abc").await);
            assert_eq!(err, AuthError::WeakPassword(MIN_PASSWORD_LEN));
            let err = assert_err!(backend.sign_up("not-an-email", "secret1").await);
            assert_eq!(err, AuthError::InvalidEmail);
        }

        #[tokio::test]
        async fn test_injected_failure_applies_once() {
            let backend = MemoryBackend::new();
            backend.fail_next_auth(AuthError::Network("offline".into()));
            let err = assert_err!(backend.sign_up("a@b.com", "secret1").await);
            assert_eq!(err, AuthError::Network("offline".into()));
            assert_ok!(backend.sign_up("a@b.com", "secret1").await);
        }
    }

    mod records {
        use super::*;

        #[tokio::test]
        async fn test_find_on_empty_collection_is_ok() {
            let backend = MemoryBackend::new();
            let found = assert_ok!(backend.find_records("users", Filter::eq("uid", "x")).await);
            assert!(found.is_empty());
        }

        #[tokio::test]
        async fn test_create_and_find() {
            let backend = MemoryBackend::new();
            let id = assert_ok!(backend.create_record("users", user_fields("u-1", "Ada")).await);
            assert_ok!(backend.create_record("users", user_fields("u-2", "Grace")).await);

            let found = assert_ok!(backend.find_records("users", Filter::eq("uid", "u-1")).await);
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].id, id);
            assert_eq!(found[0].text("name"), Some("Ada"));
            assert_eq!(backend.records("users").len(), 2);
        }

        #[tokio::test]
        async fn test_injected_store_failure() {
            let backend = MemoryBackend::new();
            backend.fail_next_store(StoreError::Unavailable("down".into()));
            let err = assert_err!(backend.create_record("users", user_fields("u", "n")).await);
            assert_eq!(err, StoreError::Unavailable("down".into()));
            assert!(backend.records("users").is_empty());
        }
    }

    mod sessions {
        use super::*;

        #[tokio::test]
        async fn test_listener_sees_current_state_then_changes() {
            let backend = MemoryBackend::new();
            let seen = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&seen);
            let _sub = backend.on_session_change(Box::new(move |s| sink.lock().push(s.is_some())));

            assert_ok!(backend.sign_up("a@b.com", "secret1").await);
            assert_ok!(backend.sign_out().await);
            assert_eq!(*seen.lock(), vec![false, true, false]);
        }

        #[tokio::test]
        async fn test_sign_out_without_session_is_silent() {
            let backend = MemoryBackend::new();
            let calls = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&calls);
            let _sub = backend.on_session_change(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
            assert_ok!(backend.sign_out().await);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_cancelled_subscription_misses_sign_out() {
            let backend = MemoryBackend::new();
            assert_ok!(backend.sign_up("a@b.com", "secret1").await);

            let calls = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&calls);
            let mut sub = backend.on_session_change(Box::new(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }));
            assert_eq!(calls.load(Ordering::SeqCst), 1);

            sub.cancel();
            assert_eq!(backend.listener_count(), 0);
            assert_ok!(backend.sign_out().await);
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }
    }

    mod snapshot {
        use super::*;

        #[tokio::test]
        async fn test_accounts_and_records_survive_reopen() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("nested").join("backend.json");

            let backend = MemoryBackend::open(&path).unwrap();
            let session = assert_ok!(backend.sign_up("a@b.com", "secret1").await);
            assert_ok!(backend.create_record("users", user_fields(&session.uid, "Ada")).await);
            drop(backend);

            let reopened = MemoryBackend::open(&path).unwrap();
            assert!(reopened.current_session().is_none());
            let again = assert_ok!(reopened.sign_in("a@b.com", "secret1").await);
            assert_eq!(again.uid, session.uid);
            assert_eq!(reopened.records("users").len(), 1);
        }

        #[test]
        fn test_open_rejects_corrupt_snapshot() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("backend.json");
            fs::write(&path, "not json").unwrap();
            assert!(MemoryBackend::open(&path).is_err());
        }
    }
}
