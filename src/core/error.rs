//! Error types for the publishing core.

use thiserror::Error;

use crate::intelligence::IntelligenceError;
use crate::orchestrator::PublishRecord;

/// Errors produced by the publishing core.
///
/// Every variant is recoverable from the process point of view; admission and
/// lock failures carry the hints a caller needs to retry.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Rate limit exceeded for the tenant/endpoint pair.
    #[error("rate limit exceeded for `{key}`; window resets at {reset_time_ms}")]
    AdmissionDenied {
        /// Rate-limit key that was rejected.
        key: String,
        /// Epoch milliseconds at which the window resets.
        reset_time_ms: u128,
        /// Milliseconds until the window resets.
        retry_after_ms: u128,
    },
    /// Another request holds the lock for this resource.
    #[error("resource `{resource}` is locked; retry in {wait_ms}ms")]
    LockContention {
        /// Locked resource key.
        resource: String,
        /// Milliseconds until the current lock expires.
        wait_ms: u128,
    },
    /// Downstream protected by a circuit breaker is degraded and no fallback ran.
    #[error("circuit `{name}` is open")]
    CircuitOpen {
        /// Breaker name.
        name: String,
        /// Milliseconds until a trial call will be let through.
        retry_after_ms: u128,
    },
    /// Content scoring failed.
    #[error("content optimization failed: {0}")]
    Optimization(#[from] IntelligenceError),
    /// The external publish call failed; the persisted record carries per-platform detail.
    #[error("publish failed: {message}")]
    PublishFailure {
        /// Failure reported by the publisher.
        message: String,
        /// Record persisted for the failed attempt.
        record: Box<PublishRecord>,
    },
    /// Content item does not exist.
    #[error("content item `{0}` not found")]
    NotFound(String),
    /// Storage collaborator failure.
    #[error("storage error: {0}")]
    Storage(String),
    /// Configuration rejected during validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl PublishError {
    /// Stable machine-readable kind, used for metric tags and API responses.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AdmissionDenied { .. } => "admission_denied",
            Self::LockContention { .. } => "lock_contention",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::Optimization(_) => "optimization_failure",
            Self::PublishFailure { .. } => "publish_failure",
            Self::NotFound(_) => "not_found",
            Self::Storage(_) => "storage",
            Self::InvalidConfig(_) => "invalid_config",
        }
    }

    /// Milliseconds the caller should wait before retrying, when known.
    pub const fn retry_after_ms(&self) -> Option<u128> {
        match self {
            Self::AdmissionDenied { retry_after_ms, .. }
            | Self::CircuitOpen { retry_after_ms, .. } => Some(*retry_after_ms),
            Self::LockContention { wait_ms, .. } => Some(*wait_ms),
            _ => None,
        }
    }

    /// Whether retrying the same request later can succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AdmissionDenied { .. }
                | Self::LockContention { .. }
                | Self::CircuitOpen { .. }
                | Self::PublishFailure { .. }
                | Self::Storage(_)
        )
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
