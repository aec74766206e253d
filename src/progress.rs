//! Progress notifications for lifecycle observers.

use crate::types::{AccountInfo, Mobile};
use std::time::Duration;

/// Observer notified at lease lifecycle points.
///
/// Purely observational: implementations never affect control flow. All
/// methods default to no-ops, so implementors only override what they
/// display. Typical implementations print console progress.
pub trait ProgressObserver: Send + Sync {
    /// An auth token was resolved via login.
    fn token_acquired(&self) {}

    /// Account info was fetched.
    fn account_fetched(&self, info: &AccountInfo) {
        let _ = info;
    }

    /// A number was leased.
    fn number_acquired(&self, mobile: &Mobile) {
        let _ = mobile;
    }

    /// One poll attempt came back empty-handed.
    fn poll_tick(&self, polls: u32, elapsed: Duration) {
        let _ = (polls, elapsed);
    }

    /// The awaited SMS arrived.
    fn sms_received(&self, text: &str) {
        let _ = text;
    }

    /// Polling gave up after the maximum wait.
    fn wait_timed_out(&self, elapsed: Duration) {
        let _ = elapsed;
    }

    /// A release call completed; `ok` is false when the provider declined.
    fn released(&self, mobile: &Mobile, ok: bool) {
        let _ = (mobile, ok);
    }

    /// An ignore (blacklist-and-release) call completed.
    fn ignored(&self, mobile: &Mobile, ok: bool) {
        let _ = (mobile, ok);
    }
}

/// Observer that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressObserver for NoopProgress {}
