//! Route gating on the session state.
//!
//! Navigation is a pure function of `SessionState`: the loading screen
//! while the persisted session is being read, the onboarding stack
//! (login, register, verify) without a session, and the main tabs with
//! one. Screens never navigate across this boundary themselves; they
//! change the session and the gate follows.

use crate::auth::SessionState;

/// The three top-level navigation trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTree {
    Loading,
    Onboarding,
    Main,
}

/// The tree the current session state maps to.
pub fn route_for(state: &SessionState) -> RouteTree {
    match state {
        SessionState::Unknown => RouteTree::Loading,
        SessionState::Unauthenticated => RouteTree::Onboarding,
        SessionState::Authenticated(_) => RouteTree::Main,
    }
}

/// What the navigation layer should do for a state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDecision {
    pub tree: RouteTree,
    /// Drop the back stack. Set when crossing the auth boundary so the
    /// back button never leads from the main tabs into onboarding or
    /// the other way around.
    pub reset_history: bool,
}

/// Tracks the last tree shown and decides when history must be cleared.
#[derive(Debug, Default)]
pub struct RouteGate {
    last: Option<RouteTree>,
}

impl RouteGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold the next session state into a navigation decision.
    /// The initial move out of the loading screen keeps history empty
    /// anyway, so only later crossings request a reset.
    pub fn observe(&mut self, state: &SessionState) -> RouteDecision {
        let tree = route_for(state);
        let reset_history = match self.last {
            Some(prev) => prev != tree && prev != RouteTree::Loading,
            None => false,
        };
        self.last = Some(tree);
        RouteDecision {
            tree,
            reset_history,
        }
    }
}
