//! Request pacing: retries, concurrency caps and in-flight guards.

mod concurrency;
mod inflight;
mod retry;
mod sequence;

pub use concurrency::ConcurrencyLimiter;
pub use inflight::ActionGuard;
pub use inflight::ActionPermit;
pub use retry::RetryConfig;
pub use sequence::RequestSequencer;
pub use sequence::Ticket;
