//! Focus Session State
//!
//! Local mirror of the remote focus operation log. Stateless request
//! handlers share one store; the cached record is what lets them issue
//! causally continuous operations against the remote session.

use parking_lot::Mutex;
use serde_json::Value;
use std::sync::Arc;

/// Cached state of the current focus session.
///
/// `last_point` is the sync pointer into the remote log and outlives any
/// individual session; everything else describes the session itself and is
/// cleared as a unit when the session ends.
#[derive(Debug, Clone)]
pub struct FocusSessionState {
    /// Monotonic cursor into the remote operation log
    pub last_point: i64,
    /// Active session id, `None` when no session is mirrored
    pub focus_id: Option<String>,
    /// Id of the session that started the current pause/continue chain
    pub first_focus_id: Option<String>,
    /// Session length in minutes
    pub duration: i64,
    pub auto_pomo_left: i64,
    pub pomo_count: i64,
    /// Explicitly triggered vs. auto-continued
    pub manual: bool,
    pub note: String,
    /// Linked task/list/habit id, empty string when unlinked
    pub focus_on_id: String,
    pub focus_on_type: Option<i64>,
    pub focus_on_title: Option<String>,
    /// Last remote-reported lifecycle code, absent until first sync
    pub status: Option<i64>,
    /// Verbatim last "current" object from the remote, for inspection only
    pub raw_current: Value,
}

impl Default for FocusSessionState {
    fn default() -> Self {
        Self {
            last_point: 0,
            focus_id: None,
            first_focus_id: None,
            duration: 25,
            auto_pomo_left: 0,
            pomo_count: 0,
            manual: true,
            note: String::new(),
            focus_on_id: String::new(),
            focus_on_type: None,
            focus_on_title: None,
            status: None,
            raw_current: Value::Null,
        }
    }
}

impl FocusSessionState {
    /// Clear everything tied to the current session, keeping the pointer
    /// and the counters. Session-scoped fields go absent together; a
    /// partially cleared record would break the composer's invariants.
    pub fn clear_session(&mut self) {
        self.focus_id = None;
        self.first_focus_id = None;
        self.focus_on_id = String::new();
        self.focus_on_type = None;
        self.focus_on_title = None;
        self.status = None;
        self.raw_current = Value::Null;
    }

    /// Whether a session is currently mirrored locally
    pub fn has_session(&self) -> bool {
        self.focus_id.is_some()
    }
}

/// Process-wide store guarding the session mirror.
///
/// Explicitly constructed and injected from the composition root so tests
/// get isolated stores. All access is through the single mutex; callers
/// must never hold the guard across a network suspension point, which the
/// API enforces by only exposing closures and copies.
#[derive(Clone, Default)]
pub struct FocusStateStore {
    inner: Arc<Mutex<FocusSessionState>>,
}

impl FocusStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the state. No return value on
    /// purpose: nothing borrowed from the guarded record can escape.
    pub fn with_state<F>(&self, f: F)
    where
        F: FnOnce(&mut FocusSessionState),
    {
        let mut state = self.inner.lock();
        f(&mut state);
    }

    /// Read a value out of the state under the lock.
    pub fn read<T, F>(&self, f: F) -> T
    where
        F: FnOnce(&FocusSessionState) -> T,
    {
        let state = self.inner.lock();
        f(&state)
    }

    /// Deep copy of the current state, sharing no substructure.
    pub fn snapshot(&self) -> FocusSessionState {
        self.inner.lock().clone()
    }

    /// Unconditionally overwrite the sync pointer, clamped to >= 0.
    pub fn set_point(&self, point: i64) {
        let mut state = self.inner.lock();
        state.last_point = point.max(0);
    }

    /// Replace the record with a fresh one, optionally preserving the
    /// pointer. Pointer-keeping is the normal case; a full reset is only
    /// for starting over against a different remote log.
    pub fn reset(&self, keep_pointer: bool) {
        let mut state = self.inner.lock();
        let point = if keep_pointer { state.last_point } else { 0 };
        *state = FocusSessionState {
            last_point: point,
            ..FocusSessionState::default()
        };
    }
}
