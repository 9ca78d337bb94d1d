//! Broker client contract. The core depends only on these traits; a real
//! Kafka-backed implementation (or a mock, for tests) plugs in underneath.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error::Result;

pub type Partition = i32;
pub type Offset = i64;
pub type RawRecord = Vec<u8>;

/// A single joined consumer, subscribed to one or more topics under a group id.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Consumer: Send + Sync {
    /// Awaits the next record from the broker-provided iterator. `Ok(None)`
    /// means the iterator closed naturally; it never resumes afterward.
    async fn next_record(&mut self) -> Result<Option<RawRecord>>;

    /// Current partition assignment. Empty before the first rebalance.
    async fn assignment(&self) -> Result<Vec<Partition>>;

    /// Forces the consumer to join its group, triggering assignment.
    async fn poll(&mut self) -> Result<()>;

    /// Current consumed position for a partition.
    async fn position(&self, partition: Partition) -> Result<Offset>;

    /// Current log end offset for each of the given partitions.
    async fn end_offsets(&self, partitions: &[Partition]) -> Result<HashMap<Partition, Offset>>;
}

/// Creates consumers joined to a named group.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerClient: Send + Sync {
    async fn subscribe(
        &self,
        group_id: &str,
        topics: &[String],
        servers: &[String],
    ) -> Result<Box<dyn Consumer>>;
}
