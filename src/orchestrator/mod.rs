//! Publish orchestration: admission, locking, optimization, breaker-protected
//! publishing and record persistence.

pub mod model;
pub mod ports;
pub mod service;

pub use model::{
    lock_resource, BulkItemOutcome, BulkPublishReport, BulkPublishRequest, PacingStrategy,
    PlatformResult, PublishAction, PublishContent, PublishOptions, PublishOutcome, PublishRecord,
    PublishRequest, DEGRADED_MESSAGE,
};
pub use ports::{ContentStore, Publisher, PublisherError, StoreError};
pub use service::{
    HealthReport, OrchestratorSettings, PublishOrchestrator, ANALYZE_ENDPOINT, PUBLISHER_BREAKER,
};
