//! Authentication: persisted session storage and lifecycle management.

pub mod session;
pub mod store;

pub use session::{PendingRegistration, SessionData, SessionManager, SessionState};
pub use store::{
    JsonFileStore, KeyringStore, MemoryStore, SessionStore, StoreError, KEY_PHONE_NUMBER,
    KEY_ROLE, KEY_TOKEN, KEY_USER_ID, SESSION_KEYS,
};
