//! Time abstraction for the polling loop.
//!
//! The poll loop never reads the system clock or sleeps directly; it goes
//! through [`Clock`], so tests can simulate elapsed time without real
//! delays.

use std::future::Future;
use std::pin::Pin;
use std::time::{Duration, Instant};

/// Boxed future, so the trait stays object-safe.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Source of time and suspension for the polling loop.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Suspend for the given duration.
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Real clock backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}
