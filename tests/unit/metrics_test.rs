//! Tests for the metrics collector

use std::sync::Arc;
use std::thread;

use prometheus_publish_core::core::{series_key, MetricsCollector};

#[test]
fn test_gauges_overwrite() {
    let metrics = MetricsCollector::default();
    metrics.set_gauge("queue.depth", 4.0, &[("pool", "a")]);
    metrics.set_gauge("queue.depth", 2.0, &[("pool", "a")]);
    assert_eq!(metrics.gauge("queue.depth", &[("pool", "a")]), Some(2.0));
    assert_eq!(metrics.gauge("queue.depth", &[("pool", "b")]), None);
}

#[test]
fn test_snapshot_uses_series_keys() {
    let metrics = MetricsCollector::default();
    metrics.increment("publish.success", 2, &[("tenant", "acme"), ("action", "publish")]);
    metrics.record_timing("publish.latency_ms", 12.0, &[]);

    let snapshot = metrics.snapshot();
    let key = series_key("publish.success", &[("action", "publish"), ("tenant", "acme")]);
    assert_eq!(snapshot.counters.get(&key), Some(&2));
    assert_eq!(snapshot.histograms["publish.latency_ms"].count, 1);

    let json = serde_json::to_value(&snapshot).unwrap();
    assert_eq!(json["counters"][key.as_str()], 2);
}

#[test]
fn test_reset_clears_everything() {
    let metrics = MetricsCollector::default();
    metrics.increment("a", 1, &[]);
    metrics.set_gauge("b", 1.0, &[]);
    metrics.record_timing("c", 1.0, &[]);
    metrics.reset();
    let snapshot = metrics.snapshot();
    assert!(snapshot.counters.is_empty());
    assert!(snapshot.gauges.is_empty());
    assert!(snapshot.histograms.is_empty());
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    let metrics = Arc::new(MetricsCollector::default());
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let metrics = Arc::clone(&metrics);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    metrics.increment("hits", 1, &[("shard", "x")]);
                    metrics.record_timing("lat", 1.0, &[]);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(metrics.counter("hits", &[("shard", "x")]), 8_000);
    assert_eq!(
        metrics.histogram("lat", &[]).unwrap().count,
        metrics.histogram_capacity()
    );
}
