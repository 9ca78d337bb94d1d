//! Downstream scheduler contract.

use async_trait::async_trait;

use crate::projector::Envelope;

/// Accepts projected envelopes for detection scheduling.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// `true` means accepted; `false` means the caller should log and drop.
    async fn schedule(&self, source: &str, name: &str, envelope: &Envelope) -> bool;
}
