//! Timers that are used by the signaling channel.

use core::future::Future;
use core::time::Duration;

/// The timer trait to implement by the user application.
pub trait Timer {
    /// Expire after the specified number of milliseconds.
    fn after_millis(milliseconds: u64) -> impl Future<Output = ()>;
}

/// Create a timer future that expires after `timeout`.
///
/// Timeouts beyond `u64::MAX` milliseconds saturate.
pub(crate) fn after<TIMER: Timer>(timeout: Duration) -> impl Future<Output = ()> {
    TIMER::after_millis(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX))
}
