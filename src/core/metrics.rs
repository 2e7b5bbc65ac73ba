//! Tagged metrics: counters, bounded histograms and gauges.
//!
//! Series are keyed by the metric name followed by its tag pairs sorted by
//! key, so `[("a","1"),("b","2")]` and `[("b","2"),("a","1")]` land in the
//! same series. Histograms keep only the most recent samples and compute
//! percentiles by sorting the retained window when queried.
//!
//! ```
//! use prometheus_publish_core::core::MetricsCollector;
//!
//! let metrics = MetricsCollector::new(100);
//! metrics.increment("publish.success", 1, &[("tenant", "acme")]);
//! metrics.record_timing("publish.latency", 42.0, &[("tenant", "acme")]);
//! assert_eq!(metrics.counter("publish.success", &[("tenant", "acme")]), 1);
//! ```

use std::collections::{BTreeMap, HashMap, VecDeque};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Default number of samples retained per histogram.
pub const DEFAULT_HISTOGRAM_CAPACITY: usize = 100;

/// Tag pairs qualifying a metric.
pub type Tags<'a> = &'a [(&'a str, &'a str)];

/// Summary statistics over a histogram's retained window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Retained sample count.
    pub count: usize,
    /// Smallest retained sample.
    pub min: f64,
    /// Largest retained sample.
    pub max: f64,
    /// Arithmetic mean of retained samples.
    pub mean: f64,
    /// Median.
    pub p50: f64,
    /// 95th percentile.
    pub p95: f64,
    /// 99th percentile.
    pub p99: f64,
}

/// Point-in-time copy of every series.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Counter series.
    pub counters: BTreeMap<String, u64>,
    /// Gauge series.
    pub gauges: BTreeMap<String, f64>,
    /// Histogram series summaries.
    pub histograms: BTreeMap<String, HistogramSummary>,
}

#[derive(Debug, Default)]
struct MetricsState {
    counters: HashMap<String, u64>,
    gauges: HashMap<String, f64>,
    histograms: HashMap<String, VecDeque<f64>>,
}

/// Thread-safe collector shared by every component of the core.
#[derive(Debug)]
pub struct MetricsCollector {
    histogram_capacity: usize,
    state: Mutex<MetricsState>,
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new(DEFAULT_HISTOGRAM_CAPACITY)
    }
}

impl MetricsCollector {
    /// Create a collector retaining `histogram_capacity` samples per histogram.
    pub fn new(histogram_capacity: usize) -> Self {
        Self {
            histogram_capacity: histogram_capacity.max(1),
            state: Mutex::new(MetricsState::default()),
        }
    }

    /// Samples retained per histogram.
    pub const fn histogram_capacity(&self) -> usize {
        self.histogram_capacity
    }

    /// Add `amount` to a counter.
    pub fn increment(&self, name: &str, amount: u64, tags: Tags<'_>) {
        let key = series_key(name, tags);
        let mut state = self.state.lock();
        let counter = state.counters.entry(key).or_insert(0);
        *counter = counter.saturating_add(amount);
    }

    /// Record a duration sample, evicting the oldest once the window is full.
    pub fn record_timing(&self, name: &str, duration_ms: f64, tags: Tags<'_>) {
        if !duration_ms.is_finite() {
            return;
        }
        let key = series_key(name, tags);
        let capacity = self.histogram_capacity;
        let mut state = self.state.lock();
        let samples = state
            .histograms
            .entry(key)
            .or_insert_with(|| VecDeque::with_capacity(capacity));
        while samples.len() >= capacity {
            samples.pop_front();
        }
        samples.push_back(duration_ms);
    }

    /// Overwrite a gauge.
    pub fn set_gauge(&self, name: &str, value: f64, tags: Tags<'_>) {
        let key = series_key(name, tags);
        self.state.lock().gauges.insert(key, value);
    }

    /// Current counter value, zero when the series does not exist.
    pub fn counter(&self, name: &str, tags: Tags<'_>) -> u64 {
        let key = series_key(name, tags);
        self.state.lock().counters.get(&key).copied().unwrap_or(0)
    }

    /// Current gauge value.
    pub fn gauge(&self, name: &str, tags: Tags<'_>) -> Option<f64> {
        let key = series_key(name, tags);
        self.state.lock().gauges.get(&key).copied()
    }

    /// Summary of a histogram's retained window.
    pub fn histogram(&self, name: &str, tags: Tags<'_>) -> Option<HistogramSummary> {
        let key = series_key(name, tags);
        let samples: Vec<f64> = {
            let state = self.state.lock();
            state.histograms.get(&key)?.iter().copied().collect()
        };
        summarize(samples)
    }

    /// Copy every series. Percentiles are computed outside the lock.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let (counters, gauges, histograms) = {
            let state = self.state.lock();
            (
                state.counters.clone(),
                state.gauges.clone(),
                state
                    .histograms
                    .iter()
                    .map(|(k, v)| (k.clone(), v.iter().copied().collect::<Vec<_>>()))
                    .collect::<Vec<_>>(),
            )
        };

        MetricsSnapshot {
            counters: counters.into_iter().collect(),
            gauges: gauges.into_iter().collect(),
            histograms: histograms
                .into_iter()
                .filter_map(|(k, samples)| summarize(samples).map(|s| (k, s)))
                .collect(),
        }
    }

    /// Drop every series.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.counters.clear();
        state.gauges.clear();
        state.histograms.clear();
    }
}

/// Build the series key for a metric name and tag set.
pub fn series_key(name: &str, tags: Tags<'_>) -> String {
    if tags.is_empty() {
        return name.to_string();
    }
    let mut sorted: Vec<&(&str, &str)> = tags.iter().collect();
    sorted.sort_unstable();
    let pairs: Vec<String> = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", escape_tag(k), escape_tag(v)))
        .collect();
    format!("{name}{{{}}}", pairs.join(","))
}

/// Backslash-escape the characters that delimit tag pairs.
fn escape_tag(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ',' | '=' | '{' | '}') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[allow(clippy::cast_precision_loss)]
fn summarize(mut samples: Vec<f64>) -> Option<HistogramSummary> {
    if samples.is_empty() {
        return None;
    }
    samples.sort_by(f64::total_cmp);
    let count = samples.len();
    let sum: f64 = samples.iter().sum();
    Some(HistogramSummary {
        count,
        min: samples[0],
        max: samples[count - 1],
        mean: sum / count as f64,
        p50: percentile(&samples, 0.50),
        p95: percentile(&samples, 0.95),
        p99: percentile(&samples, 0.99),
    })
}

/// Nearest-rank percentile over an already sorted, non-empty slice.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile(sorted: &[f64], quantile: f64) -> f64 {
    let idx = ((sorted.len() as f64) * quantile).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}
