//! Build a publish orchestrator from configuration.

use std::sync::Arc;

use crate::config::CoreConfig;
use crate::core::{CircuitBreaker, LockManager, MetricsCollector, PublishError, RateLimiter};
use crate::intelligence::ContentIntelligence;
use crate::orchestrator::{ContentStore, PublishOrchestrator, Publisher, PUBLISHER_BREAKER};
use crate::util::clock::SharedClock;

/// Validate `cfg` and wire every resilience component around the given collaborators.
pub fn build_orchestrator(
    cfg: &CoreConfig,
    store: Arc<dyn ContentStore>,
    publisher: Arc<dyn Publisher>,
    clock: SharedClock,
) -> Result<PublishOrchestrator, PublishError> {
    cfg.validate()
        .map_err(|e| PublishError::InvalidConfig(format!("config invalid: {e}")))?;

    let rate_limiter = cfg.rate_limit.tiers.iter().fold(
        RateLimiter::new(cfg.rate_limit.default, clock.clone()),
        |limiter, (tier, policy)| limiter.with_tier(tier.clone(), *policy),
    );
    let breaker = CircuitBreaker::new(
        PUBLISHER_BREAKER,
        cfg.circuit_breaker.to_breaker_config(),
        clock.clone(),
    );
    let optimizer = Arc::new(ContentIntelligence::new(cfg.content.clone()));

    tracing::info!(
        tiers = cfg.rate_limit.tiers.len(),
        group_size = cfg.bulk.group_size,
        "publish orchestrator configured"
    );

    Ok(
        PublishOrchestrator::new(store, publisher, optimizer, clock.clone())
            .with_rate_limiter(Arc::new(rate_limiter))
            .with_lock_manager(Arc::new(LockManager::new(clock)))
            .with_breaker(Arc::new(breaker))
            .with_metrics(Arc::new(MetricsCollector::new(
                cfg.metrics.histogram_capacity,
            )))
            .with_settings(cfg.orchestrator_settings()),
    )
}
