//! Submission state tracking.
//!
//! Every user-triggered request (login, register, send-message, submit
//! skills) runs behind a `SubmitGuard`: a small state machine that
//! makes a second tap while a request is outstanding a no-op instead
//! of a duplicate request, and that screens can bind their buttons to.

use std::sync::{Mutex, PoisonError};

/// Lifecycle of a single submission.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed(String),
}

impl SubmitState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, SubmitState::InFlight)
    }
}

/// Re-entrancy guard for a submit action.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    state: Mutex<SubmitState>,
}

impl SubmitGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SubmitState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Claim the guard for one submission.
    /// Returns `None` while another submission is still in flight.
    pub fn try_begin(&self) -> Option<SubmitPermit<'_>> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.is_in_flight() {
            return None;
        }
        *state = SubmitState::InFlight;
        Some(SubmitPermit {
            guard: self,
            finished: false,
        })
    }

    fn finish(&self, next: SubmitState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Exclusive right to run one submission to completion.
#[derive(Debug)]
pub struct SubmitPermit<'a> {
    guard: &'a SubmitGuard,
    finished: bool,
}

impl SubmitPermit<'_> {
    pub fn succeed(mut self) {
        self.finished = true;
        self.guard.finish(SubmitState::Succeeded);
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.finished = true;
        self.guard.finish(SubmitState::Failed(message.into()));
    }
}

impl Drop for SubmitPermit<'_> {
    fn drop(&mut self) {
        // An abandoned permit (the screen navigated away mid-request)
        // releases the guard without recording an outcome.
        if !self.finished {
            self.guard.finish(SubmitState::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_blocked_while_in_flight() {
        let guard = SubmitGuard::new();
        let permit = guard.try_begin().expect("first begin");
        assert!(guard.try_begin().is_none());
        permit.succeed();
        assert_eq!(guard.state(), SubmitState::Succeeded);
        assert!(guard.try_begin().is_some());
    }

    #[test]
    fn test_failure_records_message() {
        let guard = SubmitGuard::new();
        let permit = guard.try_begin().expect("begin");
        permit.fail("backend unreachable");
        assert_eq!(
            guard.state(),
            SubmitState::Failed("backend unreachable".to_string())
        );
    }

    #[test]
    fn test_dropped_permit_returns_to_idle() {
        let guard = SubmitGuard::new();
        {
            let _permit = guard.try_begin().expect("begin");
            assert!(guard.state().is_in_flight());
        }
        assert_eq!(guard.state(), SubmitState::Idle);
    }
}
