//! Core client library for the Our New Hope community app.
//!
//! This crate holds everything the mobile shells share: the persisted
//! session and its lifecycle, the route gate that keys navigation off
//! the session state, the backend API client, and the data models for
//! news, messages, surveys, campaigns, and the skills directory.
//!
//! A shell wires the pieces together like this:
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use newhope_core::api::ApiClient;
//! use newhope_core::auth::{KeyringStore, SessionManager};
//! use newhope_core::config::Config;
//! use newhope_core::routes::{route_for, RouteTree};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::load()?;
//! let session = Arc::new(SessionManager::new(Arc::new(KeyringStore::new())));
//! let api = ApiClient::new(&config, session.clone())?;
//!
//! let state = session.initialize();
//! assert_ne!(route_for(&state), RouteTree::Loading);
//! # Ok(())
//! # }
//! ```

use std::io;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod routes;
pub mod submit;

pub use api::{ApiClient, ApiError};
pub use auth::{SessionData, SessionManager, SessionState};
pub use config::Config;
pub use routes::{RouteGate, RouteTree};
pub use submit::{SubmitGuard, SubmitState};

/// Install the default tracing subscriber: warnings and above to
/// stderr, overridable with `RUST_LOG`. Safe to call more than once;
/// later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .try_init();
}
