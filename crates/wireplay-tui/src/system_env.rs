//! Production `Environment` implementation.

use std::time::{Duration, Instant};

use wireplay_core::Environment;

/// Production environment: system time, tokio timer.
///
/// The replay core never reads the clock itself; this is the only place the
/// binary touches real time.
#[derive(Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}
