//! Per-(tenant, endpoint) admission control with burst allowance.
//!
//! Each key owns a fixed window. Burst capacity is consumed first and is
//! additive headroom on top of the steady-state limit, so a fresh window
//! admits exactly `burst_limit + limit` requests before denying.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::util::clock::SharedClock;
use crate::util::serde::RequestContext;

/// Checks between sweeps of expired windows on the request path.
pub const WINDOW_SWEEP_INTERVAL: u64 = 64;

/// Limits applied to one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Steady-state admissions per window.
    pub limit: u32,
    /// Window length.
    #[serde(with = "duration_ms")]
    pub window: Duration,
    /// Extra admissions granted above `limit` within a window.
    pub burst_limit: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            limit: 100,
            window: Duration::from_secs(60),
            burst_limit: 20,
        }
    }
}

impl RateLimitPolicy {
    /// Total admissions a fresh window grants.
    pub const fn capacity(&self) -> u32 {
        self.limit.saturating_add(self.burst_limit)
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateDecision {
    /// Whether the request was admitted.
    pub allowed: bool,
    /// Admissions left in the current window, burst included.
    pub remaining: u32,
    /// Epoch milliseconds at which the window resets.
    pub reset_time_ms: u128,
    /// Burst admissions left in the current window.
    pub burst_remaining: u32,
}

impl RateDecision {
    /// Milliseconds until the window resets, relative to `now_ms`.
    pub const fn retry_after_ms(&self, now_ms: u128) -> u128 {
        self.reset_time_ms.saturating_sub(now_ms)
    }
}

/// Window state for one key. Replaced wholesale once `now > reset_time_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RateWindow {
    /// Admissions granted in this window, burst included.
    count: u32,
    reset_time_ms: u128,
    burst_remaining: u32,
    policy: RateLimitPolicy,
}

impl RateWindow {
    const fn burst_used(&self) -> u32 {
        self.policy
            .burst_limit
            .saturating_sub(self.burst_remaining)
    }

    /// Admissions counted against the steady-state limit.
    const fn steady_count(&self) -> u32 {
        self.count.saturating_sub(self.burst_used())
    }

    const fn remaining(&self) -> u32 {
        self.policy
            .limit
            .saturating_sub(self.steady_count())
            .saturating_add(self.burst_remaining)
    }

    const fn decision(&self, allowed: bool) -> RateDecision {
        RateDecision {
            allowed,
            remaining: if allowed { self.remaining() } else { 0 },
            reset_time_ms: self.reset_time_ms,
            burst_remaining: self.burst_remaining,
        }
    }
}

/// Fixed-window rate limiter keyed by tenant and endpoint.
///
/// # Example
/// ```
/// use prometheus_publish_core::core::{RateLimiter, RateLimitPolicy};
/// use prometheus_publish_core::util::SystemClock;
///
/// let limiter = RateLimiter::new(RateLimitPolicy::default(), SystemClock::shared());
/// let decision = limiter.check("tenant-a", "publish");
/// assert!(decision.allowed);
/// ```
#[derive(Debug)]
pub struct RateLimiter {
    default_policy: RateLimitPolicy,
    tier_policies: HashMap<String, RateLimitPolicy>,
    clock: SharedClock,
    windows: Mutex<HashMap<String, RateWindow>>,
    checks: AtomicU64,
}

impl RateLimiter {
    /// Create a limiter applying `default_policy` to every key.
    pub fn new(default_policy: RateLimitPolicy, clock: SharedClock) -> Self {
        Self {
            default_policy,
            tier_policies: HashMap::new(),
            clock,
            windows: Mutex::new(HashMap::new()),
            checks: AtomicU64::new(0),
        }
    }

    /// Register a policy for a billing tier.
    #[must_use]
    pub fn with_tier(mut self, tier: impl Into<String>, policy: RateLimitPolicy) -> Self {
        self.tier_policies.insert(tier.into(), policy);
        self
    }

    /// Policy used for a tier, falling back to the default.
    pub fn policy_for(&self, tier: &str) -> RateLimitPolicy {
        self.tier_policies
            .get(tier)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Admission check under the default policy.
    pub fn check(&self, tenant: &str, endpoint: &str) -> RateDecision {
        self.check_with_policy(&window_key(tenant, endpoint), self.default_policy)
    }

    /// Admission check for a request context, using its tier's policy.
    pub fn check_context(&self, ctx: &RequestContext, endpoint: &str) -> RateDecision {
        let policy = self.policy_for(&ctx.tier);
        self.check_with_policy(&window_key(&ctx.tenant_id, endpoint), policy)
    }

    fn check_with_policy(&self, key: &str, policy: RateLimitPolicy) -> RateDecision {
        let now = self.clock.now_ms();
        let sweep = (self.checks.fetch_add(1, Ordering::Relaxed) + 1) % WINDOW_SWEEP_INTERVAL == 0;
        let mut windows = self.windows.lock();

        if sweep {
            let before = windows.len();
            windows.retain(|_, w| now <= w.reset_time_ms);
            let swept = before - windows.len();
            if swept > 0 {
                tracing::debug!(swept, remaining = windows.len(), "swept expired rate windows");
            }
        }

        if let Some(window) = windows.get_mut(key).filter(|w| now <= w.reset_time_ms) {
            return Self::admit_within(key, window);
        }

        let fresh = RateWindow {
            count: 1,
            reset_time_ms: now + policy.window.as_millis(),
            burst_remaining: policy.burst_limit.saturating_sub(1),
            policy,
        };
        windows.insert(key.to_string(), fresh);
        fresh.decision(true)
    }

    fn admit_within(key: &str, window: &mut RateWindow) -> RateDecision {
        if window.burst_remaining > 0 {
            window.burst_remaining -= 1;
            window.count += 1;
            return window.decision(true);
        }

        if window.steady_count() >= window.policy.limit {
            tracing::debug!(key = %key, reset_time_ms = %window.reset_time_ms, "rate limit exceeded");
            return window.decision(false);
        }

        window.count += 1;
        window.decision(true)
    }

    /// Drop windows whose reset time has passed. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut windows = self.windows.lock();
        let before = windows.len();
        windows.retain(|_, w| now <= w.reset_time_ms);
        before - windows.len()
    }

    /// Number of keys currently tracked.
    pub fn window_count(&self) -> usize {
        self.windows.lock().len()
    }
}

/// Rate-limit key for a tenant and endpoint.
pub fn window_key(tenant: &str, endpoint: &str) -> String {
    format!("{tenant}:{endpoint}")
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    #[allow(clippy::cast_possible_truncation)]
    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
