//! Controller state machine.
//!
//! ```text
//! Idle --plan_save--> Enumerating --> AwaitingConfirmation --commit_save--> Fetching --> Idle
//! Idle --plan_removal--> AwaitingRemovalConfirmation --commit_removal--> Removing --> Idle
//! ```
//!
//! A plan that is dropped instead of committed returns the controller to
//! `Idle`, and so does a commit whose future is dropped mid-operation. A
//! rejected save (below the minimum zoom or above the tile limit) or a
//! failed size query never leaves `Idle`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

/// Where the controller is in a save or removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Enumerating,
    AwaitingConfirmation,
    Fetching,
    AwaitingRemovalConfirmation,
    Removing,
}

impl fmt::Display for ControllerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ControllerState::Idle => "idle",
            ControllerState::Enumerating => "enumerating",
            ControllerState::AwaitingConfirmation => "awaiting confirmation",
            ControllerState::Fetching => "fetching",
            ControllerState::AwaitingRemovalConfirmation => "awaiting removal confirmation",
            ControllerState::Removing => "removing",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Default)]
struct StateInner {
    state: ControllerState,
    /// Plan currently awaiting confirmation.
    pending: Option<u64>,
}

/// Shared, observable controller state.
#[derive(Debug, Clone, Default)]
pub(crate) struct StateCell {
    inner: Arc<Mutex<StateInner>>,
    next_plan: Arc<AtomicU64>,
}

impl StateCell {
    pub(crate) fn get(&self) -> ControllerState {
        self.inner.lock().state
    }

    pub(crate) fn set(&self, state: ControllerState) {
        let mut inner = self.inner.lock();
        inner.state = state;
        if !matches!(
            state,
            ControllerState::AwaitingConfirmation | ControllerState::AwaitingRemovalConfirmation
        ) {
            inner.pending = None;
        }
    }

    /// Enters an awaiting state and returns a guard for the pending plan.
    pub(crate) fn await_confirmation(&self, state: ControllerState) -> PendingGuard {
        let id = self.next_plan.fetch_add(1, Ordering::Relaxed);
        let mut inner = self.inner.lock();
        inner.state = state;
        inner.pending = Some(id);
        PendingGuard {
            cell: self.clone(),
            id,
            armed: true,
        }
    }

    /// Enters a running state until the returned guard is dropped.
    pub(crate) fn enter(&self, state: ControllerState) -> ActiveGuard {
        self.set(state);
        ActiveGuard { cell: self.clone() }
    }

    fn abandon(&self, id: u64) {
        let mut inner = self.inner.lock();
        if inner.pending == Some(id) {
            inner.pending = None;
            inner.state = ControllerState::Idle;
        }
    }
}

/// Returns the controller to `Idle` when an uncommitted plan is dropped.
#[derive(Debug)]
pub(crate) struct PendingGuard {
    cell: StateCell,
    id: u64,
    armed: bool,
}

impl PendingGuard {
    /// The plan is being committed; dropping it is no longer an abandonment.
    pub(crate) fn disarm(&mut self) {
        self.armed = false;
    }

    /// Whether this plan was issued by `cell`.
    pub(crate) fn belongs_to(&self, cell: &StateCell) -> bool {
        Arc::ptr_eq(&self.cell.inner, &cell.inner)
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if self.armed {
            self.cell.abandon(self.id);
        }
    }
}

/// Returns the controller to `Idle` when a commit finishes or is dropped.
#[derive(Debug)]
pub(crate) struct ActiveGuard {
    cell: StateCell,
}

impl Drop for ActiveGuard {
    fn drop(&mut self) {
        self.cell.set(ControllerState::Idle);
    }
}
