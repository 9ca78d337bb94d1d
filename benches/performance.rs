use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use kafka_autoscale::backlog::backlog;
use kafka_autoscale::broker::{Consumer, Offset, Partition, RawRecord};
use kafka_autoscale::config::source::SourceConfig;
use kafka_autoscale::projector::project;
use kafka_autoscale::Result;

/// Fixed-lag stand-in for a real consumer, used only to keep the backlog
/// probe's bookkeeping (not the broker round-trip) on the hot path.
struct FixedLagConsumer {
    partitions: Vec<Partition>,
    lag: Offset,
}

#[async_trait]
impl Consumer for FixedLagConsumer {
    async fn next_record(&mut self) -> Result<Option<RawRecord>> {
        Ok(None)
    }

    async fn assignment(&self) -> Result<Vec<Partition>> {
        Ok(self.partitions.clone())
    }

    async fn poll(&mut self) -> Result<()> {
        Ok(())
    }

    async fn position(&self, _partition: Partition) -> Result<Offset> {
        Ok(0)
    }

    async fn end_offsets(&self, partitions: &[Partition]) -> Result<HashMap<Partition, Offset>> {
        Ok(partitions.iter().map(|p| (*p, self.lag)).collect())
    }
}

fn source_config(alias_count: usize) -> SourceConfig {
    let key_aliases = (0..alias_count)
        .map(|i| (format!("a.b.field{i}"), format!("k{i}")))
        .collect::<BTreeMap<_, _>>();

    SourceConfig {
        name: "bench-source".to_string(),
        source: "kafka".to_string(),
        servers: vec!["localhost:9092".to_string()],
        topics: vec!["bench".to_string()],
        key_aliases,
        key_sep: ".".to_string(),
        min_backlog: 50.0,
        max_backlog: 200.0,
        max_consumers: 32,
    }
}

fn record_json(alias_count: usize) -> Vec<u8> {
    let mut fields = serde_json::Map::new();
    for i in 0..alias_count {
        fields.insert(format!("field{i}"), serde_json::json!(i));
    }
    serde_json::json!({"a": {"b": fields}}).to_string().into_bytes()
}

fn benchmark_projection(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection");

    for alias_count in [1, 10, 50].iter() {
        let config = source_config(*alias_count);
        let raw = record_json(*alias_count);

        group.bench_with_input(
            BenchmarkId::new("project", alias_count),
            alias_count,
            |b, _| {
                b.iter(|| {
                    let envelope = project(black_box(&config), black_box(&raw));
                    black_box(envelope)
                });
            },
        );
    }

    group.finish();
}

fn benchmark_projection_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection_miss");
    let config = source_config(1);
    let raw = serde_json::json!({"unrelated": true}).to_string().into_bytes();

    group.bench_function("project_drops_on_missing_path", |b| {
        b.iter(|| {
            let envelope = project(black_box(&config), black_box(&raw));
            black_box(envelope)
        });
    });

    group.finish();
}

fn benchmark_backlog_probe(c: &mut Criterion) {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("backlog");

    for partition_count in [1, 10, 100].iter() {
        group.bench_with_input(
            BenchmarkId::new("backlog", partition_count),
            partition_count,
            |b, &partition_count| {
                b.to_async(&runtime).iter(|| async move {
                    let mut consumer = FixedLagConsumer {
                        partitions: (0..partition_count).collect(),
                        lag: 100,
                    };
                    let lag = backlog(&mut consumer).await;
                    black_box(lag)
                });
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_projection,
    benchmark_projection_miss,
    benchmark_backlog_probe,
);

criterion_main!(benches);
