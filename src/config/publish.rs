//! Publishing core configuration structures.

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::core::{AppResult, CircuitBreakerConfig, RateLimitPolicy};
use crate::intelligence::ContentPolicy;
use crate::orchestrator::OrchestratorSettings;

/// Prefix of environment variables read by [`CoreConfig::from_env`].
pub const ENV_PREFIX: &str = "PUBLISH_CORE_";

/// Publisher circuit breaker settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BreakerSection {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,
    /// Cooldown before a trial call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for BreakerSection {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            timeout_ms: 60_000,
        }
    }
}

impl BreakerSection {
    /// Breaker configuration for this section.
    pub const fn to_breaker_config(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.failure_threshold,
            timeout: Duration::from_millis(self.timeout_ms),
        }
    }
}

/// Rate limiting settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSection {
    /// Policy for tiers without an override.
    pub default: RateLimitPolicy,
    /// Per-tier overrides.
    pub tiers: HashMap<String, RateLimitPolicy>,
}

/// Lock settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockSection {
    /// TTL of locks held by bulk actions, in milliseconds.
    pub ttl_ms: u64,
}

impl Default for LockSection {
    fn default() -> Self {
        Self { ttl_ms: 300_000 }
    }
}

/// Metrics settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSection {
    /// Samples retained per histogram.
    pub histogram_capacity: usize,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            histogram_capacity: crate::core::DEFAULT_HISTOGRAM_CAPACITY,
        }
    }
}

/// Bulk publishing settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkSection {
    /// Entries processed concurrently per group.
    pub group_size: usize,
    /// Delay between groups under AI-optimized pacing, in milliseconds.
    pub pacing_delay_ms: u64,
}

impl Default for BulkSection {
    fn default() -> Self {
        Self {
            group_size: 5,
            pacing_delay_ms: 2_000,
        }
    }
}

/// Root configuration of the publishing core.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Publisher breaker.
    pub circuit_breaker: BreakerSection,
    /// Admission control.
    pub rate_limit: RateLimitSection,
    /// Bulk locks.
    pub locks: LockSection,
    /// Metrics retention.
    pub metrics: MetricsSection,
    /// Bulk processing.
    pub bulk: BulkSection,
    /// Scoring lexicons and thresholds.
    pub content: ContentPolicy,
}

fn validate_policy(name: &str, policy: &RateLimitPolicy) -> Result<(), String> {
    if policy.limit == 0 {
        return Err(format!("rate limit `{name}`: limit must be greater than 0"));
    }
    if policy.window.is_zero() {
        return Err(format!("rate limit `{name}`: window must be greater than 0"));
    }
    Ok(())
}

impl CoreConfig {
    /// Validate every section.
    pub fn validate(&self) -> Result<(), String> {
        if self.circuit_breaker.failure_threshold == 0 {
            return Err("circuit_breaker.failure_threshold must be greater than 0".into());
        }
        if self.circuit_breaker.timeout_ms == 0 {
            return Err("circuit_breaker.timeout_ms must be greater than 0".into());
        }
        validate_policy("default", &self.rate_limit.default)?;
        for (tier, policy) in &self.rate_limit.tiers {
            validate_policy(tier, policy)?;
        }
        if self.locks.ttl_ms == 0 {
            return Err("locks.ttl_ms must be greater than 0".into());
        }
        if self.metrics.histogram_capacity == 0 {
            return Err("metrics.histogram_capacity must be greater than 0".into());
        }
        if self.bulk.group_size == 0 {
            return Err("bulk.group_size must be greater than 0".into());
        }
        if !(0.0..=1.0).contains(&self.content.engagement_floor)
            || !(0.0..=1.0).contains(&self.content.sentiment_floor)
        {
            return Err("content floors for engagement and sentiment must lie in [0, 1]".into());
        }
        Ok(())
    }

    /// Parse configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `PUBLISH_CORE_*` variables, after loading `.env` if present.
    pub fn from_env() -> AppResult<Self> {
        // A missing .env file is fine.
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by values from `lookup`, keyed by full variable name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let mut cfg = Self::default();
        let var = |suffix: &str| lookup(&format!("{ENV_PREFIX}{suffix}"));

        if let Some(v) = var("BREAKER_FAILURE_THRESHOLD") {
            cfg.circuit_breaker.failure_threshold = parse_var("BREAKER_FAILURE_THRESHOLD", &v)?;
        }
        if let Some(v) = var("BREAKER_TIMEOUT_MS") {
            cfg.circuit_breaker.timeout_ms = parse_var("BREAKER_TIMEOUT_MS", &v)?;
        }
        if let Some(v) = var("RATE_LIMIT") {
            cfg.rate_limit.default.limit = parse_var("RATE_LIMIT", &v)?;
        }
        if let Some(v) = var("RATE_WINDOW_MS") {
            cfg.rate_limit.default.window = Duration::from_millis(parse_var("RATE_WINDOW_MS", &v)?);
        }
        if let Some(v) = var("RATE_BURST") {
            cfg.rate_limit.default.burst_limit = parse_var("RATE_BURST", &v)?;
        }
        if let Some(v) = var("LOCK_TTL_MS") {
            cfg.locks.ttl_ms = parse_var("LOCK_TTL_MS", &v)?;
        }
        if let Some(v) = var("HISTOGRAM_CAPACITY") {
            cfg.metrics.histogram_capacity = parse_var("HISTOGRAM_CAPACITY", &v)?;
        }
        if let Some(v) = var("BULK_GROUP_SIZE") {
            cfg.bulk.group_size = parse_var("BULK_GROUP_SIZE", &v)?;
        }
        if let Some(v) = var("BULK_PACING_DELAY_MS") {
            cfg.bulk.pacing_delay_ms = parse_var("BULK_PACING_DELAY_MS", &v)?;
        }

        cfg.validate().map_err(anyhow::Error::msg)?;
        Ok(cfg)
    }

    /// Orchestrator tunables derived from the lock and bulk sections.
    pub const fn orchestrator_settings(&self) -> OrchestratorSettings {
        OrchestratorSettings {
            lock_ttl: Duration::from_millis(self.locks.ttl_ms),
            bulk_group_size: self.bulk.group_size,
            pacing_delay: Duration::from_millis(self.bulk.pacing_delay_ms),
        }
    }
}

fn parse_var<T>(suffix: &str, raw: &str) -> AppResult<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse()
        .with_context(|| format!("invalid value `{raw}` for {ENV_PREFIX}{suffix}"))
}
