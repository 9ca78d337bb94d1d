//! `GroupSupervisor`: maintains the worker set of one source and runs the
//! backlog-driven autoscaler loop.

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::backlog;
use crate::broker::BrokerClient;
use crate::config::source::SourceConfig;
use crate::control::{stop_channel, WorkerHandle};
use crate::observability::metrics::get_metrics;
use crate::scheduler::Scheduler;
use crate::worker;

/// Outcome of one autoscaler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Grow,
    Shrink,
    NoOp,
}

/// Runs the group's lifecycle to completion: creates the monitor consumer,
/// warms up, spawns the first worker, then alternates `reallocate` ticks
/// with reaping dead handles until the worker set is empty.
pub async fn run(
    config: Arc<SourceConfig>,
    broker: Arc<dyn BrokerClient>,
    scheduler: Arc<dyn Scheduler>,
    warm_up: Duration,
) {
    let monitor = match broker
        .subscribe(&config.name, &config.topics, &config.servers)
        .await
    {
        Ok(consumer) => consumer,
        Err(e) => {
            error!(source = %config.name, error = %e, "failed to create monitor consumer, group not started");
            return;
        }
    };
    let mut monitor = monitor;

    tokio::time::sleep(warm_up).await;

    let mut workers: Vec<WorkerHandle> = Vec::new();
    match spawn_worker(&config, &broker, &scheduler).await {
        Some(handle) => workers.push(handle),
        None => {
            error!(source = %config.name, "failed to spawn initial worker, group not started");
            return;
        }
    }
    get_metrics().set_worker_count(&config.name, workers.len() as i64);

    while !workers.is_empty() {
        reallocate(
            &config,
            &broker,
            &scheduler,
            monitor.as_mut(),
            &mut workers,
            warm_up,
        )
        .await;
        reap(&config, &mut workers);
        get_metrics().set_worker_count(&config.name, workers.len() as i64);
    }

    info!(source = %config.name, "all workers terminated, group supervisor exiting");
}

/// One autoscaler tick: sample backlog twice, decide, act.
async fn reallocate(
    config: &Arc<SourceConfig>,
    broker: &Arc<dyn BrokerClient>,
    scheduler: &Arc<dyn Scheduler>,
    monitor: &mut dyn crate::broker::Consumer,
    workers: &mut Vec<WorkerHandle>,
    warm_up: Duration,
) -> Decision {
    let b1 = backlog::backlog(monitor).await;
    tokio::time::sleep(warm_up).await;
    let b2 = backlog::backlog(monitor).await;
    get_metrics().set_backlog(&config.name, b2);

    if b1 > config.max_backlog && b2 > config.max_backlog && workers.len() < config.max_consumers as usize
    {
        info!(source = %config.name, b1, b2, workers = workers.len(), "backlog above ceiling, growing");
        if let Some(handle) = spawn_worker(config, broker, scheduler).await {
            workers.push(handle);
        }
        return Decision::Grow;
    }

    if b1 <= config.min_backlog && b2 <= config.min_backlog && workers.len() > 1 {
        if let Some(victim) = workers.iter().find(|w| !w.is_signaled()) {
            info!(source = %config.name, b1, b2, workers = workers.len(), "backlog below floor, shrinking");
            victim.signal_stop();
            get_metrics().record_worker_stopped(&config.name);
        }
        tokio::time::sleep(warm_up).await;
        return Decision::Shrink;
    }

    Decision::NoOp
}

/// Removes finished handles, awaiting each to surface panics as logged
/// errors. Natural termination and panics are both treated as reaping
/// candidates; only the log message differs.
fn reap(config: &Arc<SourceConfig>, workers: &mut Vec<WorkerHandle>) {
    let mut i = 0;
    while i < workers.len() {
        if workers[i].is_finished() {
            let handle = workers.remove(i);
            let source = config.name.clone();
            tokio::spawn(async move {
                match handle.join.await {
                    Ok(()) => {}
                    Err(e) if e.is_panic() => {
                        error!(source = %source, "consumer worker panicked: {e}");
                    }
                    Err(e) => {
                        warn!(source = %source, "consumer worker task cancelled: {e}");
                    }
                }
            });
        } else {
            i += 1;
        }
    }
}

async fn spawn_worker(
    config: &Arc<SourceConfig>,
    broker: &Arc<dyn BrokerClient>,
    scheduler: &Arc<dyn Scheduler>,
) -> Option<WorkerHandle> {
    let consumer = match broker
        .subscribe(&config.name, &config.topics, &config.servers)
        .await
    {
        Ok(consumer) => consumer,
        Err(e) => {
            error!(source = %config.name, error = %e, "failed to subscribe new worker");
            return None;
        }
    };

    let (stop_tx, stop_rx) = stop_channel();
    let worker_config = config.clone();
    let worker_scheduler = scheduler.clone();
    let join = tokio::spawn(worker::run(worker_config, consumer, worker_scheduler, stop_rx));
    get_metrics().record_worker_spawned(&config.name);
    Some(WorkerHandle::new(join, stop_tx))
}
