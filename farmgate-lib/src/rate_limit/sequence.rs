//! Latest-request-wins sequencing.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    /// Returns the raw sequence number.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out increasing tickets so late responses can be recognised.
///
/// A response is applied only if its ticket is still the latest one issued;
/// anything older was superseded by a newer request for the same resource.
#[derive(Debug, Clone, Default)]
pub struct RequestSequencer {
    latest: Arc<AtomicU64>,
}

impl RequestSequencer {
    /// Creates a sequencer with no tickets issued.
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a new ticket, superseding every earlier one.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Returns `true` if no newer ticket has been issued since `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Supersedes all outstanding tickets without issuing a usable one.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
