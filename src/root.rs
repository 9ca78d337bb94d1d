//! `RootSupervisor`: fans out one `GroupSupervisor` per valid source config
//! and waits until all of them terminate.

use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::broker::BrokerClient;
use crate::config::source::ConfigBinding;
use crate::config_store::ConfigStore;
use crate::error::{Error, Result};
use crate::group;
use crate::scheduler::Scheduler;

/// Runs until every spawned group has terminated, then returns
/// [`Error::AllGroupsTerminated`] — under healthy operation this function
/// never returns.
pub async fn run(
    config_store: Arc<dyn ConfigStore>,
    broker: Arc<dyn BrokerClient>,
    scheduler: Arc<dyn Scheduler>,
    warm_up: std::time::Duration,
    single_config: Option<Value>,
) -> Result<()> {
    let raw_configs = match single_config {
        Some(raw) => {
            validate_override(&raw)?;
            vec![raw]
        }
        None => config_store.get_sources("kafka").await?,
    };

    let mut handles = Vec::new();
    for raw in raw_configs {
        let bound = match ConfigBinding::bind(raw) {
            Ok(cfg) => cfg,
            Err(e) => {
                error!(error = %e, "rejecting invalid source config");
                continue;
            }
        };
        info!(source = %bound.name, "starting group supervisor");
        let config = Arc::new(bound);
        let broker = broker.clone();
        let scheduler = scheduler.clone();
        handles.push(tokio::spawn(group::run(config, broker, scheduler, warm_up)));
    }

    if handles.is_empty() {
        error!("no valid source configs, root supervisor has nothing to run");
        return Err(Error::Config("no valid source configs".to_string()));
    }

    for handle in handles {
        if let Err(e) = handle.await {
            error!(error = %e, "group supervisor task failed");
        }
    }

    Err(Error::AllGroupsTerminated)
}

/// Validates a single-config override before handing it to [`run`]. The
/// override path rejects anything but `source == "kafka"` immediately,
/// without consulting the config store at all.
pub fn validate_override(raw: &Value) -> Result<()> {
    match raw.get("source").and_then(Value::as_str) {
        Some("kafka") => Ok(()),
        Some(other) => Err(Error::Config(format!("unsupported source type: {other}"))),
        None => Err(Error::Config("missing source field".to_string())),
    }
}
