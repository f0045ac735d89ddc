//! Process-wide holder of the one [`CounterState`], shared by every
//! writer (UI loop, hotkey listener, HTTP handlers) through a handle.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use shared::{
    domain::{CounterAction, CounterState},
    protocol::merge_patch,
};

pub struct CounterStore {
    current: Mutex<CounterState>,
}

impl CounterStore {
    pub fn new(initial: CounterState) -> Self {
        Self {
            current: Mutex::new(initial),
        }
    }

    /// Cloned snapshot of the current state.
    pub fn snapshot(&self) -> CounterState {
        self.lock().clone()
    }

    /// Whole-object swap. Last writer wins; this path has no field-level
    /// merge.
    pub fn replace(&self, next: CounterState) {
        *self.lock() = next;
    }

    /// Atomic read-compute-swap. Concurrent writers must come through
    /// here: a separate `snapshot` + `replace` pair can lose updates
    /// between the two calls.
    pub fn apply<F>(&self, mutate: F) -> CounterState
    where
        F: FnOnce(&CounterState) -> CounterState,
    {
        let mut current = self.lock();
        let next = mutate(&current);
        *current = next.clone();
        next
    }

    pub fn apply_action(&self, action: &CounterAction) -> CounterState {
        self.apply(|state| action.apply(state))
    }

    /// Networked-mode write: shallow key-wise merge of a JSON patch,
    /// performed under the same lock as the swap.
    pub fn merge(&self, patch: &Value) -> CounterState {
        self.apply(|state| merge_patch(state, patch))
    }

    fn lock(&self) -> MutexGuard<'_, CounterState> {
        // a panicked writer must not wedge every later caller
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for CounterStore {
    fn default() -> Self {
        Self::new(CounterState::default())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
