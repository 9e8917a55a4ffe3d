use crate::error::DispatchError;
use crate::membership::Member;

use std::time::Duration;

/// Sink for dispatch events that do not reach the caller as errors.
///
/// Handed to the `Dispatcher` at construction.
pub trait DispatchObserver: Send + Sync {
    /// `member` did not finish within `timeout` and was left out of the result.
    fn instruction_timed_out(&self, member: &Member, timeout: Duration);

    /// A dispatch is about to abort because of `error`.
    fn instruction_failed(&self, _error: &DispatchError) {}
}

/// Writes dispatch events to `tracing` at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DispatchObserver for TracingObserver {
    fn instruction_timed_out(&self, member: &Member, timeout: Duration) {
        tracing::error!(
            member = %member,
            timeout_ms = timeout.as_millis() as u64,
            "Cluster member {} did not complete its instructions within {} milliseconds",
            member,
            timeout.as_millis()
        );
    }

    fn instruction_failed(&self, error: &DispatchError) {
        tracing::error!("Aborting dispatch: {}", error);
    }
}
