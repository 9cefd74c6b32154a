//! Trait abstraction for submission transports to enable mocking in tests

use crate::error::TransportError;
use crate::state::FormSnapshot;
use async_trait::async_trait;

/// Sends one form snapshot to a backend and interprets the reply
///
/// Exactly one call is outstanding per form at a time; the state machine
/// enforces that, so implementations need not guard against reentry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionTransport: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// POST the snapshot; `Ok` means the backend accepted it
    async fn submit(&self, snapshot: &FormSnapshot) -> Result<(), TransportError>;
}
