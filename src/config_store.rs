//! Configuration store contract: yields raw source configs to be bound and
//! validated by [`crate::config::source`].

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Returns the raw config maps whose `source` field equals `source`.
    async fn get_sources(&self, source: &str) -> Result<Vec<Value>>;
}
