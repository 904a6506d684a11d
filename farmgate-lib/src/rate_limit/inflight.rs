//! One request in flight per logical action.
//!
//! Buttons such as "Approve", "Pay" or "Delete" start a request keyed by the
//! action and the record it targets. While that request is pending, further
//! attempts are refused instead of queued, and the control stays disabled
//! until the permit drops.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::Error;

/// Tracks which actions currently have a request in flight.
///
/// Cheap to clone; clones share the same set.
///
/// # Example
///
/// ```
/// use farmgate_lib::rate_limit::ActionGuard;
///
/// let guard = ActionGuard::new();
/// let permit = guard.try_begin("approve:loan-7").unwrap();
/// assert!(guard.is_in_flight("approve:loan-7"));
/// assert!(guard.try_begin("approve:loan-7").is_none());
///
/// drop(permit);
/// assert!(!guard.is_in_flight("approve:loan-7"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct ActionGuard {
    in_flight: Arc<DashMap<String, ()>>,
}

impl ActionGuard {
    /// Creates an empty guard.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `action` as in flight. Returns `None` if it already is.
    pub fn try_begin(&self, action: impl Into<String>) -> Option<ActionPermit> {
        let action = action.into();
        match self.in_flight.entry(action.clone()) {
            Entry::Occupied(_) => {
                log::debug!("[inflight] refusing duplicate '{}'", action);
                None
            }
            Entry::Vacant(slot) => {
                slot.insert(());
                Some(ActionPermit {
                    in_flight: Arc::clone(&self.in_flight),
                    action,
                })
            }
        }
    }

    /// Returns `true` while a request for `action` is pending.
    ///
    /// Renderers use this to show the control as disabled.
    pub fn is_in_flight(&self, action: &str) -> bool {
        self.in_flight.contains_key(action)
    }

    /// Returns the number of pending actions.
    pub fn pending(&self) -> usize {
        self.in_flight.len()
    }

    /// Runs `fut` under a permit for `action`.
    ///
    /// Returns [`Error::Busy`] without polling `fut` when the action is
    /// already in flight. The permit is released whether `fut` succeeds or
    /// fails.
    pub async fn run<T, F>(&self, action: impl Into<String>, fut: F) -> Result<T, Error>
    where
        F: Future<Output = Result<T, Error>>,
    {
        let action = action.into();
        let Some(_permit) = self.try_begin(action.clone()) else {
            return Err(Error::Busy { action });
        };
        fut.await
    }
}

/// Proof that an action is in flight. Dropping it settles the action.
#[derive(Debug)]
pub struct ActionPermit {
    in_flight: Arc<DashMap<String, ()>>,
    action: String,
}

impl ActionPermit {
    /// Returns the action key.
    pub fn action(&self) -> &str {
        &self.action
    }
}

impl Drop for ActionPermit {
    fn drop(&mut self) {
        self.in_flight.remove(&self.action);
    }
}
