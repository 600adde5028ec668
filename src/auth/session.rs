//! Session lifecycle management.
//!
//! The `SessionManager` is the single owner of the persisted session:
//! it reads the store exactly once at startup, performs the
//! login/logout transitions, and publishes the current state on a
//! watch channel so the route gate re-renders on every change. No
//! other component reads identity out of storage; screens call
//! `current()`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::store::{
    SessionStore, StoreError, KEY_PHONE_NUMBER, KEY_ROLE, KEY_TOKEN, KEY_USER_ID,
};
use crate::models::{Role, UserId};
use crate::submit::SubmitGuard;

/// The identity carried by an authenticated session.
///
/// Only meaningful while the token is held; the manager never hands
/// out stale copies after the token is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
    pub phone_number: String,
}

/// Where the client is in the authentication lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// The persisted store has not been read yet.
    #[default]
    Unknown,
    Unauthenticated,
    Authenticated(SessionData),
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }
}

/// Registration state held between the register call and OTP
/// verification. Never persisted; discarded once verification
/// succeeds or the flow is abandoned.
#[derive(Debug, Clone)]
pub struct PendingRegistration {
    pub phone_number: String,
    pub email: Option<String>,
}

pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    state: watch::Sender<SessionState>,
    // Serializes store-plus-memory transitions. Nothing awaits while
    // holding this lock; the login exchange happens before it is taken.
    transition: Mutex<()>,
    initialized: AtomicBool,
    login_guard: SubmitGuard,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self {
            store,
            state,
            transition: Mutex::new(()),
            initialized: AtomicBool::new(false),
            login_guard: SubmitGuard::new(),
        }
    }

    /// Read the persisted store once and resolve `Unknown`.
    ///
    /// Idempotent: only the first call reads the store; later calls
    /// (and concurrent ones) return the already-resolved state. Must
    /// run before the route gate makes its first decision.
    pub fn initialize(&self) -> SessionState {
        let _guard = self.transition.lock().unwrap_or_else(PoisonError::into_inner);
        if self.initialized.load(Ordering::SeqCst) {
            return self.state.borrow().clone();
        }

        let next = match self.read_stored_session() {
            Ok(Some(data)) => SessionState::Authenticated(data),
            Ok(None) => SessionState::Unauthenticated,
            Err(err) => {
                // An unreadable store cannot block startup; treat it
                // as no session.
                warn!(error = %err, "failed to read persisted session");
                SessionState::Unauthenticated
            }
        };

        debug!(authenticated = next.is_authenticated(), "session initialized");
        self.state.send_replace(next.clone());
        self.initialized.store(true, Ordering::SeqCst);
        next
    }

    fn read_stored_session(&self) -> Result<Option<SessionData>, StoreError> {
        let token = match self.store.get(KEY_TOKEN)? {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(None),
        };

        let user_id = self
            .store
            .get(KEY_USER_ID)?
            .and_then(|v| UserId::parse(&v));
        let Some(user_id) = user_id else {
            // Token present but identity unusable: discard rather than
            // run with a half-formed session.
            warn!("stored session has no usable user id; discarding");
            if let Err(err) = self.store.clear() {
                warn!(error = %err, "failed to discard stale session");
            }
            return Ok(None);
        };

        let role = self
            .store
            .get(KEY_ROLE)?
            .map(|v| Role::from_str(&v))
            .unwrap_or_default();
        let phone_number = self.store.get(KEY_PHONE_NUMBER)?.unwrap_or_default();

        Ok(Some(SessionData {
            token,
            user_id,
            role,
            phone_number,
        }))
    }

    /// Exchange credentials for a session and adopt it.
    ///
    /// All four keys are persisted before the in-memory state flips, so
    /// a crash in between never leaves memory ahead of storage. On any
    /// failure the existing state is untouched. A second call while one
    /// is in flight fails with `ApiError::InFlight` instead of sending
    /// a duplicate request.
    pub async fn login(
        &self,
        api: &ApiClient,
        phone_number: &str,
        password: &str,
    ) -> Result<SessionData, ApiError> {
        let permit = self.login_guard.try_begin().ok_or(ApiError::InFlight)?;

        let exchange = match api.login_exchange(phone_number, password).await {
            Ok(exchange) => exchange,
            Err(err) => {
                permit.fail(err.to_string());
                return Err(err);
            }
        };

        let data = SessionData {
            token: exchange.token,
            user_id: exchange.user_id,
            role: exchange.role,
            phone_number: phone_number.to_string(),
        };

        {
            let _guard = self.transition.lock().unwrap_or_else(PoisonError::into_inner);
            if let Err(err) = self.persist(&data) {
                // Roll back partial writes so storage and memory agree.
                if let Err(clear_err) = self.store.clear() {
                    warn!(error = %clear_err, "failed to roll back partial session write");
                }
                permit.fail(err.to_string());
                return Err(ApiError::Storage(err));
            }
            self.state
                .send_replace(SessionState::Authenticated(data.clone()));
        }

        info!(user_id = %data.user_id, "signed in");
        permit.succeed();
        Ok(data)
    }

    /// Clear the store and drop the session. Never fails: a storage
    /// error is logged and the in-memory state still transitions.
    pub fn logout(&self) {
        let _guard = self.transition.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored session during logout");
        }
        self.state.send_replace(SessionState::Unauthenticated);
        info!("signed out");
    }

    /// Forced sign-out after the backend rejected the token.
    ///
    /// Idempotent under concurrency: with several in-flight requests
    /// all hitting the same rejection, only the first caller performs
    /// the store clear and the transition. Returns whether this call
    /// was the one that did.
    pub fn force_sign_out(&self) -> bool {
        let _guard = self.transition.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.state.borrow().is_authenticated() {
            return false;
        }
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "failed to clear stored session during forced sign-out");
        }
        self.state.send_replace(SessionState::Unauthenticated);
        warn!("session rejected by server; signed out");
        true
    }

    /// The current session, if authenticated. Purely in-memory.
    pub fn current(&self) -> Option<SessionData> {
        match &*self.state.borrow() {
            SessionState::Authenticated(data) => Some(data.clone()),
            _ => None,
        }
    }

    /// Snapshot of the full lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    /// Watch the session state; the route gate re-evaluates on change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    fn persist(&self, data: &SessionData) -> Result<(), StoreError> {
        self.store.set(KEY_TOKEN, &data.token)?;
        self.store.set(KEY_USER_ID, &data.user_id.to_string())?;
        self.store.set(KEY_ROLE, data.role.as_str())?;
        self.store.set(KEY_PHONE_NUMBER, &data.phone_number)?;
        Ok(())
    }
}
