//! Mean per-partition lag for a consumer: the autoscaler's control signal.

use tracing::error;

use crate::broker::Consumer;

/// Returned by [`backlog`] when the probe cannot establish a reliable
/// reading. The autoscaler treats it as "over-provisioned": never grows,
/// and never blocks a shrink, on a failed probe.
pub const PROBE_FAILED: f64 = -1.0;

/// Computes `(Σ end_offsets − Σ positions) / |partitions|` for `consumer`.
///
/// Forces one `poll` if the consumer has no assignment yet. Any broker
/// error, or a still-empty assignment after the forced poll, yields
/// [`PROBE_FAILED`].
pub async fn backlog(consumer: &mut dyn Consumer) -> f64 {
    let mut partitions = match consumer.assignment().await {
        Ok(p) => p,
        Err(e) => {
            error!(error = %e, "failed to read partition assignment");
            return PROBE_FAILED;
        }
    };

    if partitions.is_empty() {
        if let Err(e) = consumer.poll().await {
            error!(error = %e, "poll to force assignment failed");
            return PROBE_FAILED;
        }
        partitions = match consumer.assignment().await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "failed to read partition assignment after poll");
                return PROBE_FAILED;
            }
        };
        if partitions.is_empty() {
            error!("no partitions assigned to consumer after forced poll");
            return PROBE_FAILED;
        }
    }

    let mut positions = Vec::with_capacity(partitions.len());
    for partition in &partitions {
        match consumer.position(*partition).await {
            Ok(offset) => positions.push(offset),
            Err(e) => {
                error!(error = %e, partition, "failed to read consumer position");
                return PROBE_FAILED;
            }
        }
    }

    let end_offsets = match consumer.end_offsets(&partitions).await {
        Ok(offsets) => offsets,
        Err(e) => {
            error!(error = %e, "failed to read end offsets");
            return PROBE_FAILED;
        }
    };

    if end_offsets.len() != partitions.len() || positions.len() != partitions.len() {
        error!("backlog check failed: partition/offset counts disagree");
        return PROBE_FAILED;
    }

    let sum_end: i64 = partitions.iter().filter_map(|p| end_offsets.get(p)).sum();
    let sum_pos: i64 = positions.iter().sum();
    (sum_end - sum_pos) as f64 / partitions.len() as f64
}
