//! Cooperative cancellation and progress reporting for a running `Trainer`.
//!
//! Cancellation is orderly: `Trainer::execute` polls `TaskState` only at
//! pattern/epoch boundaries, never interrupts mid-pattern, and ends in
//! `Cancelled` rather than surfacing an error — cancellation is a normal
//! outcome of the task state machine, not an exception (see the error
//! taxonomy).

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Ready,
    Running,
    Succeeded,
    Cancelled,
    Failed,
}

impl TaskState {
    fn to_u8(self) -> u8 {
        match self {
            TaskState::Ready => 0,
            TaskState::Running => 1,
            TaskState::Succeeded => 2,
            TaskState::Cancelled => 3,
            TaskState::Failed => 4,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            1 => TaskState::Running,
            2 => TaskState::Succeeded,
            3 => TaskState::Cancelled,
            4 => TaskState::Failed,
            _ => TaskState::Ready,
        }
    }
}

/// Receives progress notifications from `Trainer::execute`. All methods
/// have default no-op bodies except `state`/`progress`, which a listener
/// must be able to answer even without ever being called back, so a
/// caller can request cancellation before the first epoch starts.
pub trait ProgressListener: Send + Sync {
    fn start(&self, _total: u64) {}
    fn end(&self) {}
    fn message(&self, _text: &str) {}
    fn progress(&self, _done: u64, _total: u64) {}
    fn reset(&self) {}
    fn indeterminate(&self, _yes: bool) {}

    /// Requests cancellation. Polled by the trainer between patterns.
    fn cancel(&self) {}

    fn state(&self) -> TaskState;
}

/// A `ProgressListener` that discards every notification and is never
/// cancelled — the default when the caller doesn't need observability.
#[derive(Default)]
pub struct NullProgressListener {
    state: AtomicU8,
}

impl NullProgressListener {
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(TaskState::Ready.to_u8()),
        }
    }
}

impl ProgressListener for NullProgressListener {
    fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Relaxed))
    }
}

/// A listener whose `cancel()` flips a shared atomic flag, checkable from
/// any thread — the handle a caller keeps to cancel a running `Trainer`.
pub struct CancellableProgressListener {
    state: Arc<AtomicU8>,
}

impl Default for CancellableProgressListener {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellableProgressListener {
    pub fn new() -> Self {
        Self {
            state: Arc::new(AtomicU8::new(TaskState::Ready.to_u8())),
        }
    }

    pub fn handle(&self) -> Arc<AtomicU8> {
        Arc::clone(&self.state)
    }

    pub(crate) fn set_state(&self, s: TaskState) {
        self.state.store(s.to_u8(), Ordering::Relaxed);
    }
}

impl ProgressListener for CancellableProgressListener {
    fn cancel(&self) {
        self.state.store(TaskState::Cancelled.to_u8(), Ordering::Relaxed);
    }

    fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_listener_never_cancels() {
        let l = NullProgressListener::new();
        assert_eq!(l.state(), TaskState::Ready);
        l.cancel();
        assert_eq!(l.state(), TaskState::Ready);
    }

    #[test]
    fn cancellable_listener_flips_to_cancelled() {
        let l = CancellableProgressListener::new();
        assert_eq!(l.state(), TaskState::Ready);
        l.cancel();
        assert_eq!(l.state(), TaskState::Cancelled);
    }
}
