//! Configuration models for the resilience components, bulk processing and scoring.

pub mod publish;

pub use publish::{
    BreakerSection, BulkSection, CoreConfig, LockSection, MetricsSection, RateLimitSection,
    ENV_PREFIX,
};
