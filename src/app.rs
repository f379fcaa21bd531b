//! Application state and core logic
//!
//! Key handling runs on the UI loop. Backend calls are spawned onto the
//! runtime and report back as [`AppEvent`]s, so a slow collaborator never
//! blocks input.

use crate::backend::{
    AuthError, Backend, CollaboratorError, Filter, RecordFields, Session, StoreError,
    Subscription,
};
use crate::config::TuiConfig;
use crate::platform::LINK_MODIFIER;
use crate::state::{
    AppState, FieldValue, Form, FormKind, FormValues, HomeState, SubmitDecision, View,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Collection holding one profile per account
pub const USERS_COLLECTION: &str = "users";

/// Collection holding employee intake records
pub const EMPLOYEES_COLLECTION: &str = "employees";

/// Fields that never leave the form
const SECRET_FIELDS: &[&str] = &["password", "confirm_password"];

/// Welcome screen buttons
const WELCOME_BUTTONS: usize = 2;

/// Results delivered back to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    /// A form submission resolved
    SubmissionFinished {
        kind: FormKind,
        mount: u64,
        outcome: Result<(), CollaboratorError>,
    },
    /// The session observer fired for the home mount `mount`
    SessionChanged {
        mount: u64,
        session: Option<Session>,
    },
    /// The profile lookup for `uid` resolved
    ProfileResolved {
        mount: u64,
        uid: String,
        result: Result<Option<String>, StoreError>,
    },
    /// Log out finished
    SignedOut(Result<(), AuthError>),
}

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    /// Authentication and record store collaborator
    backend: Arc<dyn Backend>,
    events_tx: mpsc::UnboundedSender<AppEvent>,
    events_rx: mpsc::UnboundedReceiver<AppEvent>,
    /// Session observer, alive only while the home view is mounted
    session_subscription: Option<Subscription>,
    /// Incremented on every home mount and unmount; stale events carry an
    /// older value and are dropped
    home_mount: u64,
    /// Same scheme for the mounted form, so an outcome never reaches a
    /// later mount of the same form
    form_mount: u64,
    config: TuiConfig,
    config_dirty: bool,
    /// Whether the app should quit
    quit: bool,
    /// One-line feedback in the status bar
    pub status_message: Option<String>,
}

impl App {
    /// Create a new App instance
    pub fn new(backend: Arc<dyn Backend>, config: TuiConfig) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            state: AppState::default(),
            backend,
            events_tx,
            events_rx,
            session_subscription: None,
            home_mount: 0,
            form_mount: 0,
            config,
            config_dirty: false,
            quit: false,
            status_message: None,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Configuration to write back on exit, if it changed
    pub fn take_dirty_config(&mut self) -> Option<&TuiConfig> {
        if std::mem::take(&mut self.config_dirty) {
            Some(&self.config)
        } else {
            None
        }
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Navigate to a new view
    pub fn navigate(&mut self, view: View) {
        if view == self.state.current_view {
            return;
        }
        let previous = self.state.current_view;
        self.unmount(previous);
        self.state.view_history.push(previous);
        self.state.current_view = view;
        self.mount(view);
    }

    /// Navigate and forget the history (after sign-in, sign-out, redirects)
    pub fn reset_to(&mut self, view: View) {
        let previous = self.state.current_view;
        self.unmount(previous);
        self.state.view_history.clear();
        if view != View::Welcome {
            self.state.view_history.push(View::Welcome);
        }
        self.state.current_view = view;
        self.mount(view);
    }

    /// Go back to previous view
    pub fn go_back(&mut self) {
        let current = self.state.current_view;
        let target = loop {
            match self.state.view_history.pop() {
                Some(view) if view == current => continue,
                Some(view) => break view,
                None => break View::Welcome,
            }
        };
        if target == current {
            return;
        }
        self.unmount(current);
        self.state.current_view = target;
        self.mount(target);
    }

    fn mount(&mut self, view: View) {
        tracing::debug!(?view, "mount");
        if let Some(kind) = view.form_kind() {
            self.form_mount += 1;
            self.state.mount_form(kind);
            if kind == FormKind::SignIn {
                if let Some(email) = self.config.remember_email.clone() {
                    if let Some(form) = self.state.form_mut(kind) {
                        form.set_value("email", email);
                    }
                }
            }
        }
        if view == View::Home {
            self.mount_home();
        }
    }

    fn unmount(&mut self, view: View) {
        if view.is_form_view() {
            self.form_mount += 1;
            self.state.clear_form();
        }
        if view == View::Home {
            self.unmount_home();
        }
    }

    /// Start observing the session for a fresh home screen
    fn mount_home(&mut self) {
        self.home_mount += 1;
        self.state.home = HomeState::default();

        let tx = self.events_tx.clone();
        let mount = self.home_mount;
        let subscription = self.backend.on_session_change(Box::new(move |session| {
            // The receiver lives as long as the app; a send error means shutdown.
            let _ = tx.send(AppEvent::SessionChanged { mount, session });
        }));
        self.session_subscription = Some(subscription);
    }

    fn unmount_home(&mut self) {
        if let Some(mut subscription) = self.session_subscription.take() {
            subscription.cancel();
        }
        self.home_mount += 1;
        self.state.home = HomeState::default();
    }

    /// Whether the home screen currently holds a session subscription
    pub fn is_observing_session(&self) -> bool {
        self.session_subscription
            .as_ref()
            .is_some_and(Subscription::is_active)
    }

    /// Handle a key press
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return;
        }

        // Clear any status messages on key press
        self.status_message = None;

        match self.state.current_view {
            View::Welcome => self.handle_welcome_key(key),
            View::SignIn | View::SignUp | View::Employee => self.handle_form_key(key),
            View::Home => self.handle_home_key(key),
        }
    }

    fn handle_welcome_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::BackTab => self.state.move_selection_up(),
            KeyCode::Down | KeyCode::Tab => self.state.move_selection_down(WELCOME_BUTTONS),
            KeyCode::Enter => {
                if self.state.selected_index == 0 {
                    self.navigate(View::SignIn);
                } else {
                    self.navigate(View::SignUp);
                }
            }
            KeyCode::Char('i') => self.navigate(View::SignIn),
            KeyCode::Char('u') => self.navigate(View::SignUp),
            KeyCode::Char('q') => self.quit = true,
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let link = ctrl || key.modifiers.contains(LINK_MODIFIER);
        match key.code {
            KeyCode::Char('s') if ctrl => self.submit_active_form(),
            KeyCode::Char('n') if link => self.follow_form_link(),
            KeyCode::Esc => self.go_back(),
            _ => {
                let Some(form) = self.state.form.as_mut() else {
                    return;
                };
                match key.code {
                    KeyCode::Tab | KeyCode::Down => form.next_field(),
                    KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                    KeyCode::Enter if form.is_submit_row_active() => self.submit_active_form(),
                    KeyCode::Enter => form.next_field(),
                    KeyCode::Char(' ')
                        if form
                            .get_field(form.active_field_index)
                            .is_some_and(|f| f.is_checkbox()) =>
                    {
                        form.toggle_active()
                    }
                    KeyCode::Char(c) => form.input_char(c),
                    KeyCode::Backspace => form.backspace(),
                    _ => {}
                }
            }
        }
    }

    /// "No account? Sign up" / "Already have an account? Sign in"
    fn follow_form_link(&mut self) {
        match self.state.current_view {
            View::SignIn => self.navigate(View::SignUp),
            View::SignUp => self.navigate(View::SignIn),
            _ => {}
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('l') => self.logout(),
            KeyCode::Char('e') => self.navigate(View::Employee),
            KeyCode::Char('q') => self.quit = true,
            _ => {}
        }
    }

    /// Explicit submit of the mounted form
    pub fn submit_active_form(&mut self) {
        let Some(form) = self.state.form.as_mut() else {
            return;
        };
        let kind = form.kind;
        match form.begin_submit() {
            SubmitDecision::Ignored => {}
            SubmitDecision::Invalid(count) => {
                tracing::debug!(form = ?kind, errors = count, "submission blocked");
            }
            SubmitDecision::Ready(values) => {
                tracing::info!(
                    form = ?kind,
                    attempt = form.submit_attempts(),
                    fields = ?values.keys().collect::<Vec<_>>(),
                    "submitting"
                );
                self.spawn_submission(kind, self.form_mount, values);
            }
        }
    }

    fn spawn_submission(&self, kind: FormKind, mount: u64, values: FormValues) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = submit_to_backend(backend.as_ref(), kind, &values).await;
            let _ = tx.send(AppEvent::SubmissionFinished {
                kind,
                mount,
                outcome,
            });
        });
    }

    fn logout(&mut self) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.sign_out().await;
            let _ = tx.send(AppEvent::SignedOut(result));
        });
    }

    fn spawn_profile_lookup(&self, mount: u64, uid: String) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend
                .find_records(USERS_COLLECTION, Filter::eq("uid", uid.as_str()))
                .await
                .map(|records| {
                    records
                        .first()
                        .map(|r| r.text("name").unwrap_or_default().to_string())
                });
            let _ = tx.send(AppEvent::ProfileResolved { mount, uid, result });
        });
    }

    /// Apply every event that is already waiting
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
        }
    }

    /// Wait for the next event
    #[cfg(test)]
    pub async fn next_event(&mut self) -> Option<AppEvent> {
        self.events_rx.recv().await
    }

    /// Update state from a finished background operation
    pub fn apply_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SubmissionFinished {
                kind,
                mount,
                outcome,
            } => self.finish_submission(kind, mount, outcome),
            AppEvent::SessionChanged { mount, session } => {
                if !self.is_current_home(mount) {
                    tracing::debug!(mount, "dropping session event for unmounted home");
                    return;
                }
                match session {
                    None => {
                        tracing::info!("no active session, redirecting to sign-in");
                        self.reset_to(View::SignIn);
                    }
                    Some(session) => {
                        let uid = session.uid.clone();
                        let same_user = self
                            .state
                            .home
                            .session
                            .as_ref()
                            .is_some_and(|s| s.uid == uid);
                        if !same_user {
                            self.state.home.display_name = None;
                        }
                        self.state.home.session = Some(session);
                        self.state.home.resolving = true;
                        self.spawn_profile_lookup(mount, uid);
                    }
                }
            }
            AppEvent::ProfileResolved { mount, uid, result } => {
                let current_uid = self.state.home.session.as_ref().map(|s| s.uid.as_str());
                if !self.is_current_home(mount) || current_uid != Some(uid.as_str()) {
                    return;
                }
                self.state.home.resolving = false;
                match result {
                    Ok(Some(name)) => self.state.home.display_name = Some(name),
                    Ok(None) => {
                        tracing::info!(%uid, "user not found, redirecting to sign-in");
                        self.reset_to(View::SignIn);
                    }
                    Err(e) => {
                        tracing::warn!(%uid, "profile lookup failed: {e}");
                        self.push_error(format!("Failed to load profile: {e}"));
                    }
                }
            }
            AppEvent::SignedOut(result) => {
                if let Err(e) = result {
                    tracing::warn!("sign-out failed: {e}");
                    self.push_error(format!("Failed to sign out: {e}"));
                }
            }
        }
    }

    fn is_current_home(&self, mount: u64) -> bool {
        self.state.current_view == View::Home && mount == self.home_mount
    }

    fn finish_submission(
        &mut self,
        kind: FormKind,
        mount: u64,
        outcome: Result<(), CollaboratorError>,
    ) {
        let current = mount == self.form_mount;
        let Some(form) = self.state.form_mut(kind).filter(|_| current) else {
            tracing::debug!(form = ?kind, mount, "dropping outcome for unmounted form");
            return;
        };

        let result = outcome.as_ref().map(|_| ()).map_err(|e| e.user_message());
        if !form.finish_submit(result) {
            tracing::debug!(form = ?kind, "dropping outcome: nothing in flight");
            return;
        }

        match outcome {
            Ok(()) => {
                tracing::info!(form = ?kind, "submission succeeded");
                if kind == FormKind::SignIn {
                    let email = form.text("email").trim().to_string();
                    if self.config.remember_email.as_deref() != Some(email.as_str()) {
                        self.config.remember_email = Some(email);
                        self.config_dirty = true;
                    }
                }
                if kind == FormKind::Employee {
                    self.status_message = Some("Employee information submitted".to_string());
                }
                self.reset_to(View::Home);
            }
            Err(e) => {
                tracing::warn!(form = ?kind, "submission failed: {e}");
            }
        }
    }
}

/// Run the collaborator calls for one submission
async fn submit_to_backend(
    backend: &dyn Backend,
    kind: FormKind,
    values: &FormValues,
) -> Result<(), CollaboratorError> {
    let text = |name: &str| {
        values
            .get(name)
            .and_then(FieldValue::as_text)
            .unwrap_or("")
            .trim()
            .to_string()
    };

    match kind {
        FormKind::SignIn => {
            backend
                .sign_in(&text("email"), &raw_text(values, "password"))
                .await?;
        }
        FormKind::SignUp => {
            let email = text("email");
            let password = raw_text(values, "password");
            let session = match backend.sign_up(&email, &password).await {
                Ok(session) => session,
                Err(AuthError::EmailTaken) => resume_sign_up(backend, &email, &password).await?,
                Err(e) => return Err(e.into()),
            };
            let mut profile = RecordFields::new();
            profile.insert("uid".into(), Value::from(session.uid));
            profile.insert("name".into(), Value::from(text("full_name")));
            profile.insert("username".into(), Value::from(text("username")));
            profile.insert("email".into(), Value::from(session.email));
            profile.insert("phone".into(), Value::from(text("phone")));
            if let Err(e) = backend.create_record(USERS_COLLECTION, profile).await {
                // No profile means no usable account yet; don't stay signed in.
                sign_out_quietly(backend).await;
                return Err(e.into());
            }
        }
        FormKind::Employee => {
            backend
                .create_record(EMPLOYEES_COLLECTION, record_fields(values))
                .await?;
        }
    }
    Ok(())
}

/// Sign-up for an email that already has an account. An account whose
/// profile write failed is picked up again when the password matches and
/// it still has no `users` record; anything else stays "email already in use".
async fn resume_sign_up(
    backend: &dyn Backend,
    email: &str,
    password: &str,
) -> Result<Session, CollaboratorError> {
    let Ok(session) = backend.sign_in(email, password).await else {
        return Err(AuthError::EmailTaken.into());
    };

    let existing = backend
        .find_records(USERS_COLLECTION, Filter::eq("uid", session.uid.as_str()))
        .await;
    match existing {
        Ok(records) if records.is_empty() => {
            tracing::info!(uid = %session.uid, "resuming sign-up without profile");
            Ok(session)
        }
        Ok(_) => {
            sign_out_quietly(backend).await;
            Err(AuthError::EmailTaken.into())
        }
        Err(e) => {
            sign_out_quietly(backend).await;
            Err(e.into())
        }
    }
}

async fn sign_out_quietly(backend: &dyn Backend) {
    if let Err(e) = backend.sign_out().await {
        tracing::warn!("sign-out after failed sign-up: {e}");
    }
}

/// Passwords are sent exactly as typed
fn raw_text(values: &FormValues, name: &str) -> String {
    values
        .get(name)
        .and_then(FieldValue::as_text)
        .unwrap_or("")
        .to_string()
}

/// Convert form values into a record payload, leaving secrets out
fn record_fields(values: &FormValues) -> RecordFields {
    values
        .iter()
        .filter(|(name, _)| !SECRET_FIELDS.contains(&name.as_str()))
        .map(|(name, value)| {
            let value = match value {
                FieldValue::Text(s) => Value::from(s.trim()),
                FieldValue::Flag(b) => Value::from(*b),
            };
            (name.clone(), value)
        })
        .collect()
}
