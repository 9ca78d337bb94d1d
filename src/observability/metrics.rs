use metrics::{counter, describe_counter, describe_gauge, gauge, Unit};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Global metrics instance.
pub static METRICS: OnceLock<Metrics> = OnceLock::new();

/// Metrics collector for the ingestion supervisor. Records against
/// whatever recorder is globally installed; a no-op recorder if
/// [`init_metrics`] was never called, which is the library's default.
#[derive(Debug, Clone)]
pub struct Metrics {
    initialized: bool,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self { initialized: true }
    }

    pub fn record_worker_spawned(&self, source: &str) {
        counter!("autoscaler_workers_spawned_total", "source" => source.to_string()).increment(1);
    }

    pub fn record_worker_stopped(&self, source: &str) {
        counter!("autoscaler_workers_stopped_total", "source" => source.to_string()).increment(1);
    }

    pub fn set_worker_count(&self, source: &str, count: i64) {
        gauge!("autoscaler_worker_count", "source" => source.to_string()).set(count as f64);
    }

    pub fn set_backlog(&self, source: &str, backlog: f64) {
        gauge!("autoscaler_backlog", "source" => source.to_string()).set(backlog);
    }

    pub fn record_record_processed(&self, source: &str) {
        counter!("autoscaler_records_processed_total", "source" => source.to_string()).increment(1);
    }

    pub fn record_record_dropped(&self, source: &str, reason: &str) {
        counter!("autoscaler_records_dropped_total", "source" => source.to_string(), "reason" => reason.to_string()).increment(1);
    }

    pub fn record_schedule_failure(&self, source: &str) {
        counter!("autoscaler_schedule_failures_total", "source" => source.to_string()).increment(1);
    }
}

/// Initializes the metrics system and returns the Prometheus handle.
/// The library never calls this itself; an embedding daemon opts in once
/// at process start.
pub fn init_metrics() -> PrometheusHandle {
    let handle = METRICS_HANDLE.get_or_init(|| {
        let builder = PrometheusBuilder::new();
        let handle = builder
            .install_recorder()
            .expect("failed to install prometheus recorder");

        describe_metrics();
        handle
    });

    METRICS.get_or_init(Metrics::new);

    handle.clone()
}

fn describe_metrics() {
    describe_counter!(
        "autoscaler_workers_spawned_total",
        Unit::Count,
        "Total number of consumer workers spawned per source"
    );
    describe_counter!(
        "autoscaler_workers_stopped_total",
        Unit::Count,
        "Total number of consumer workers signaled to stop per source"
    );
    describe_gauge!(
        "autoscaler_worker_count",
        Unit::Count,
        "Current worker count per source"
    );
    describe_gauge!(
        "autoscaler_backlog",
        Unit::Count,
        "Last-observed mean per-partition backlog per source"
    );
    describe_counter!(
        "autoscaler_records_processed_total",
        Unit::Count,
        "Total records successfully scheduled per source"
    );
    describe_counter!(
        "autoscaler_records_dropped_total",
        Unit::Count,
        "Total records dropped before scheduling per source"
    );
    describe_counter!(
        "autoscaler_schedule_failures_total",
        Unit::Count,
        "Total scheduler rejections per source"
    );
}

/// Returns the global metrics instance.
pub fn get_metrics() -> &'static Metrics {
    METRICS.get_or_init(Metrics::new)
}
