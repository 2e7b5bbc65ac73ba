//! Resilience primitives: metrics, circuit breaking, admission control and locking.

pub mod circuit_breaker;
pub mod error;
pub mod lock_manager;
pub mod metrics;
pub mod rate_limiter;

pub use circuit_breaker::{
    BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState,
};
pub use error::{AppResult, PublishError};
pub use lock_manager::{LockAcquisition, LockGuard, LockInfo, LockManager, LockMetadata};
pub use metrics::{
    series_key, HistogramSummary, MetricsCollector, MetricsSnapshot, Tags,
    DEFAULT_HISTOGRAM_CAPACITY,
};
pub use rate_limiter::{
    window_key, RateDecision, RateLimitPolicy, RateLimiter, WINDOW_SWEEP_INTERVAL,
};
