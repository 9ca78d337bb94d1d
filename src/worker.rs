//! `ConsumerWorker`: iterates a broker consumer, projects each record, and
//! forwards non-empty envelopes to the scheduler.

use std::sync::Arc;

use tracing::{error, trace, warn};

use crate::broker::Consumer;
use crate::config::source::SourceConfig;
use crate::control::StopReceiver;
use crate::observability::metrics::get_metrics;
use crate::projector;
use crate::scheduler::Scheduler;

/// Runs until the stop signal is observed, the consumer's iterator closes
/// naturally, or a broker error is surfaced from `next_record`. Never
/// panics on a scheduling failure or a malformed record; both are logged
/// and the loop continues.
pub async fn run(
    config: Arc<SourceConfig>,
    mut consumer: Box<dyn Consumer>,
    scheduler: Arc<dyn Scheduler>,
    stop: StopReceiver,
) {
    loop {
        if stop.should_stop() {
            trace!(source = %config.name, "stop signal observed, worker exiting");
            return;
        }

        let record = match consumer.next_record().await {
            Ok(Some(record)) => record,
            Ok(None) => {
                trace!(source = %config.name, "consumer iterator closed, worker exiting");
                return;
            }
            Err(e) => {
                error!(source = %config.name, error = %e, "unrecoverable broker error, worker exiting");
                return;
            }
        };

        let Some(envelope) = projector::project(&config, &record) else {
            get_metrics().record_record_dropped(&config.name, "projection");
            continue;
        };
        if envelope.is_empty() {
            get_metrics().record_record_dropped(&config.name, "empty_envelope");
            continue;
        }

        if scheduler.schedule(&config.source, &config.name, &envelope).await {
            get_metrics().record_record_processed(&config.name);
        } else {
            get_metrics().record_schedule_failure(&config.name);
            warn!(source = %config.name, "scheduler rejected envelope, dropping record");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use crate::broker::MockConsumer;
    use crate::control::stop_channel;
    use crate::scheduler::MockScheduler;

    use super::*;

    fn config(key_aliases: &[(&str, &str)]) -> Arc<SourceConfig> {
        Arc::new(SourceConfig {
            name: "orders".to_string(),
            source: "kafka".to_string(),
            servers: vec!["localhost:9092".to_string()],
            topics: vec!["orders".to_string()],
            key_aliases: key_aliases
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<BTreeMap<_, _>>(),
            key_sep: ".".to_string(),
            min_backlog: 50.0,
            max_backlog: 200.0,
            max_consumers: 32,
        })
    }

    #[tokio::test]
    async fn forwards_projected_records_to_scheduler() {
        let cfg = config(&[("a", "k")]);
        let mut consumer = MockConsumer::new();
        let mut call = 0;
        consumer.expect_next_record().returning(move || {
            call += 1;
            if call == 1 {
                Ok(Some(json!({"a": 1}).to_string().into_bytes()))
            } else {
                Ok(None)
            }
        });

        let scheduled = Arc::new(AtomicUsize::new(0));
        let scheduled_clone = scheduled.clone();
        let mut scheduler = MockScheduler::new();
        scheduler.expect_schedule().returning(move |source, name, envelope| {
            assert_eq!(source, "kafka");
            assert_eq!(name, "orders");
            assert_eq!(envelope.get("k"), Some(&json!(1)));
            scheduled_clone.fetch_add(1, Ordering::SeqCst);
            true
        });

        let (_tx, rx) = stop_channel();
        run(cfg, Box::new(consumer), Arc::new(scheduler), rx).await;

        assert_eq!(scheduled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_signal_is_honored_before_next_record() {
        let cfg = config(&[("a", "k")]);
        let mut consumer = MockConsumer::new();
        consumer
            .expect_next_record()
            .returning(|| panic!("should not be polled after stop signal"));
        let mut scheduler = MockScheduler::new();
        scheduler.expect_schedule().never();

        let (tx, rx) = stop_channel();
        tx.signal();
        run(cfg, Box::new(consumer), Arc::new(scheduler), rx).await;
    }

    #[tokio::test]
    async fn dropped_projection_does_not_call_scheduler() {
        let cfg = config(&[("missing", "k")]);
        let mut consumer = MockConsumer::new();
        let mut call = 0;
        consumer.expect_next_record().returning(move || {
            call += 1;
            if call == 1 {
                Ok(Some(json!({"a": 1}).to_string().into_bytes()))
            } else {
                Ok(None)
            }
        });
        let mut scheduler = MockScheduler::new();
        scheduler.expect_schedule().never();

        let (_tx, rx) = stop_channel();
        run(cfg, Box::new(consumer), Arc::new(scheduler), rx).await;
    }

    #[tokio::test]
    async fn broker_error_terminates_worker() {
        let cfg = config(&[("a", "k")]);
        let mut consumer = MockConsumer::new();
        consumer
            .expect_next_record()
            .returning(|| Err(anyhow::anyhow!("connection reset").into()));
        let mut scheduler = MockScheduler::new();
        scheduler.expect_schedule().never();

        let (_tx, rx) = stop_channel();
        run(cfg, Box::new(consumer), Arc::new(scheduler), rx).await;
    }

    #[tokio::test]
    async fn scheduler_rejection_does_not_terminate_worker() {
        let cfg = config(&[("a", "k")]);
        let mut consumer = MockConsumer::new();
        let mut call = 0;
        consumer.expect_next_record().returning(move || {
            call += 1;
            match call {
                1 | 2 => Ok(Some(json!({"a": 1}).to_string().into_bytes())),
                _ => Ok(None),
            }
        });
        let mut scheduler = MockScheduler::new();
        scheduler.expect_schedule().times(2).returning(|_, _, _| false);

        let (_tx, rx) = stop_channel();
        run(cfg, Box::new(consumer), Arc::new(scheduler), rx).await;
    }
}
