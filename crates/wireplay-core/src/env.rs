//! Environment abstraction for deterministic timing.
//!
//! Decouples the runner's pacing waits from the system clock. The production
//! driver sleeps on the tokio timer; the test harness completes sleeps
//! instantly against a virtual clock, so every timing test is deterministic
//! and wall-time free.
//!
//! # Invariants
//!
//! - Monotonicity: `now()` never goes backwards within one execution.
//! - `sleep()` is the only async method and is awaited solely by driver
//!   code, never by the state machine itself.

use std::time::{Duration, Instant};

/// Abstract clock and timer for the execution flow.
pub trait Environment: Clone + Send + Sync + 'static {
    /// Returns the current time.
    fn now(&self) -> Instant;

    /// Suspends the calling flow for `duration`.
    ///
    /// Implementations must suspend, not spin: pacing waits are scheduling
    /// primitives and must never occupy the interactive flow.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;
}
