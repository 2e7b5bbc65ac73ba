//! The publish pipeline.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use uuid::Uuid;

use super::model::{
    lock_resource, BulkItemOutcome, BulkPublishReport, BulkPublishRequest, PacingStrategy,
    PlatformResult, PublishAction, PublishContent, PublishOptions, PublishOutcome, PublishRecord,
    PublishRequest, DEGRADED_MESSAGE,
};
use super::ports::{ContentStore, Publisher, PublisherError};
use crate::core::{
    window_key, BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitSnapshot, CircuitState,
    LockGuard, LockManager, LockMetadata, MetricsCollector, MetricsSnapshot, PublishError,
    RateLimitPolicy, RateLimiter,
};
use crate::intelligence::{ContentAnalysis, ContentItem, ContentOptimizer, IntelligenceError};
use crate::util::clock::SharedClock;
use crate::util::serde::{Platform, RequestContext};

/// Rate-limit endpoint for analysis previews.
pub const ANALYZE_ENDPOINT: &str = "analyze";
/// Name of the breaker guarding the publisher.
pub const PUBLISHER_BREAKER: &str = "publisher";

/// Tunables for locking and bulk processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// TTL of locks held by bulk actions.
    pub lock_ttl: Duration,
    /// Entries processed concurrently per bulk group.
    pub bulk_group_size: usize,
    /// Delay between bulk groups under [`PacingStrategy::AiOptimized`].
    pub pacing_delay: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            lock_ttl: Duration::from_secs(300),
            bulk_group_size: 5,
            pacing_delay: Duration::from_secs(2),
        }
    }
}

/// Point-in-time health of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    /// False while the publisher circuit is open.
    pub healthy: bool,
    /// Publisher breaker state.
    pub circuit: CircuitSnapshot,
    /// Rate-limit windows currently tracked.
    pub rate_windows: usize,
    /// Every metric series.
    pub metrics: MetricsSnapshot,
    /// Epoch milliseconds of the check.
    pub checked_at_ms: u128,
}

/// Coordinates admission, locking, optimization and publishing.
///
/// Every collaborator is shared behind an `Arc`, so one orchestrator serves
/// concurrent requests without external locking.
pub struct PublishOrchestrator {
    store: Arc<dyn ContentStore>,
    publisher: Arc<dyn Publisher>,
    optimizer: Arc<dyn ContentOptimizer>,
    rate_limiter: Arc<RateLimiter>,
    locks: Arc<LockManager>,
    breaker: Arc<CircuitBreaker>,
    metrics: Arc<MetricsCollector>,
    clock: SharedClock,
    settings: OrchestratorSettings,
}

impl std::fmt::Debug for PublishOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PublishOrchestrator")
            .field("breaker", &self.breaker.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl PublishOrchestrator {
    /// Orchestrator with default resilience components on `clock`.
    pub fn new(
        store: Arc<dyn ContentStore>,
        publisher: Arc<dyn Publisher>,
        optimizer: Arc<dyn ContentOptimizer>,
        clock: SharedClock,
    ) -> Self {
        Self {
            store,
            publisher,
            optimizer,
            rate_limiter: Arc::new(RateLimiter::new(RateLimitPolicy::default(), clock.clone())),
            locks: Arc::new(LockManager::new(clock.clone())),
            breaker: Arc::new(CircuitBreaker::new(
                PUBLISHER_BREAKER,
                CircuitBreakerConfig::default(),
                clock.clone(),
            )),
            metrics: Arc::new(MetricsCollector::default()),
            clock,
            settings: OrchestratorSettings::default(),
        }
    }

    /// Replace the rate limiter.
    #[must_use]
    pub fn with_rate_limiter(mut self, rate_limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = rate_limiter;
        self
    }

    /// Replace the lock manager.
    #[must_use]
    pub fn with_lock_manager(mut self, locks: Arc<LockManager>) -> Self {
        self.locks = locks;
        self
    }

    /// Replace the publisher breaker.
    #[must_use]
    pub fn with_breaker(mut self, breaker: Arc<CircuitBreaker>) -> Self {
        self.breaker = breaker;
        self
    }

    /// Replace the metrics collector.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<MetricsCollector>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Replace the settings.
    #[must_use]
    pub const fn with_settings(mut self, settings: OrchestratorSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Shared metrics collector.
    pub fn metrics(&self) -> &Arc<MetricsCollector> {
        &self.metrics
    }

    /// Shared lock manager.
    pub fn locks(&self) -> &Arc<LockManager> {
        &self.locks
    }

    /// Publisher breaker.
    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    /// Active settings.
    pub const fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    /// Publish a single calendar entry.
    ///
    /// Bulk actions take the tenant-wide lock for the duration of the call.
    /// Degraded outcomes produced while the publisher circuit is open are
    /// returned as records with `degraded` set; publisher failures are
    /// persisted and then surfaced as [`PublishError::PublishFailure`].
    pub async fn publish(&self, request: PublishRequest) -> Result<PublishRecord, PublishError> {
        let ctx = &request.context;
        self.admit(ctx, request.action.as_str())?;

        let _guard = if request.action.requires_lock() {
            Some(self.acquire_lock(ctx, request.action)?)
        } else {
            None
        };

        self.publish_item(ctx, &request.content_id, request.action, &request.platforms)
            .await
    }

    /// Publish many entries under one admission check and one lock.
    ///
    /// Entries run concurrently in groups of `bulk_group_size`. Entry failures
    /// are collected into the report and never abort the batch.
    pub async fn publish_bulk(
        &self,
        request: BulkPublishRequest,
    ) -> Result<BulkPublishReport, PublishError> {
        let ctx = &request.context;
        let action = request.action.bulk();
        self.admit(ctx, action.as_str())?;
        let _guard = self.acquire_lock(ctx, action)?;

        let started = Instant::now();
        let group_size = self.settings.bulk_group_size.max(1);
        let mut items = Vec::with_capacity(request.content_ids.len());
        let mut groups = 0;

        for group in request.content_ids.chunks(group_size) {
            if groups > 0
                && request.pacing == PacingStrategy::AiOptimized
                && !self.settings.pacing_delay.is_zero()
            {
                tracing::debug!(
                    delay_ms = %self.settings.pacing_delay.as_millis(),
                    "pacing before next bulk group"
                );
                tokio::time::sleep(self.settings.pacing_delay).await;
            }

            let results = join_all(
                group
                    .iter()
                    .map(|id| self.publish_item(ctx, id, action, &[])),
            )
            .await;
            items.extend(
                group
                    .iter()
                    .zip(results)
                    .map(|(id, result)| bulk_item(id, result)),
            );
            groups += 1;
        }

        let succeeded = items.iter().filter(|i| i.success).count();
        let report = BulkPublishReport {
            batch_id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id.clone(),
            action,
            total: items.len(),
            succeeded,
            failed: items.len() - succeeded,
            groups,
            items,
            elapsed: started.elapsed(),
        };

        let tags = [("tenant", ctx.tenant_id.as_str()), ("action", action.as_str())];
        self.metrics
            .record_timing("bulk.latency_ms", millis(report.elapsed), &tags);
        self.metrics.increment(
            "bulk.items",
            u64::try_from(report.total).unwrap_or(u64::MAX),
            &tags,
        );
        tracing::info!(
            tenant = %ctx.tenant_id,
            batch = %report.batch_id,
            total = report.total,
            succeeded = report.succeeded,
            "bulk publish finished"
        );
        Ok(report)
    }

    /// Score a calendar entry without publishing it.
    pub async fn analyze(
        &self,
        ctx: &RequestContext,
        content_id: &str,
    ) -> Result<ContentAnalysis, PublishError> {
        self.admit(ctx, ANALYZE_ENDPOINT)?;
        let item = self.load_item(content_id).await?;
        self.run_optimizer(ctx, &item).map_err(PublishError::from)
    }

    /// Breaker state, tracked windows and metrics.
    ///
    /// Refreshes the `rate_limit.windows` and `circuit.open` gauges before
    /// taking the metrics snapshot.
    #[allow(clippy::cast_precision_loss)]
    pub fn health(&self) -> HealthReport {
        let circuit = self.breaker.snapshot();
        let rate_windows = self.rate_limiter.window_count();
        let open = circuit.state == CircuitState::Open;
        self.metrics
            .set_gauge("rate_limit.windows", rate_windows as f64, &[]);
        self.metrics.set_gauge(
            "circuit.open",
            if open { 1.0 } else { 0.0 },
            &[("breaker", circuit.name.as_str())],
        );
        HealthReport {
            healthy: !open,
            circuit,
            rate_windows,
            metrics: self.metrics.snapshot(),
            checked_at_ms: self.clock.now_ms(),
        }
    }

    fn admit(&self, ctx: &RequestContext, endpoint: &str) -> Result<(), PublishError> {
        let decision = self.rate_limiter.check_context(ctx, endpoint);
        let tags = [("tenant", ctx.tenant_id.as_str()), ("endpoint", endpoint)];
        if decision.allowed {
            self.metrics.increment("admission.allowed", 1, &tags);
            return Ok(());
        }

        self.metrics.increment("admission.denied", 1, &tags);
        let retry_after_ms = decision.retry_after_ms(self.clock.now_ms());
        tracing::warn!(
            tenant = %ctx.tenant_id,
            endpoint,
            retry_after_ms = %retry_after_ms,
            "request rejected by rate limiter"
        );
        Err(PublishError::AdmissionDenied {
            key: window_key(&ctx.tenant_id, endpoint),
            reset_time_ms: decision.reset_time_ms,
            retry_after_ms,
        })
    }

    #[allow(clippy::cast_precision_loss)]
    fn acquire_lock(
        &self,
        ctx: &RequestContext,
        action: PublishAction,
    ) -> Result<LockGuard, PublishError> {
        let resource = lock_resource(action, &ctx.tenant_id);
        let mut metadata = LockMetadata::new();
        metadata.insert("action".into(), action.as_str().into());
        metadata.insert("tier".into(), ctx.tier.clone());

        let tags = [("tenant", ctx.tenant_id.as_str()), ("action", action.as_str())];
        match self
            .locks
            .acquire_guard(&resource, &ctx.tenant_id, self.settings.lock_ttl, metadata)
        {
            Ok(guard) => {
                self.metrics.increment("lock.acquired", 1, &tags);
                self.metrics.record_timing("lock.wait_ms", 0.0, &tags);
                Ok(guard)
            }
            Err(err) => {
                if let PublishError::LockContention { wait_ms, .. } = &err {
                    self.metrics
                        .record_timing("lock.wait_ms", *wait_ms as f64, &tags);
                }
                self.metrics.increment("lock.contention", 1, &tags);
                tracing::warn!(resource = %resource, "duplicate request rejected: {err}");
                Err(err)
            }
        }
    }

    async fn load_item(&self, content_id: &str) -> Result<ContentItem, PublishError> {
        self.store
            .get_content_item(content_id)
            .await
            .map_err(|e| PublishError::Storage(e.to_string()))?
            .ok_or_else(|| PublishError::NotFound(content_id.to_string()))
    }

    fn run_optimizer(
        &self,
        ctx: &RequestContext,
        item: &ContentItem,
    ) -> Result<ContentAnalysis, IntelligenceError> {
        let started = Instant::now();
        let result = self.optimizer.analyze(item);
        let tags = [("tenant", ctx.tenant_id.as_str())];
        self.metrics
            .record_timing("ai.latency_ms", millis(started.elapsed()), &tags);
        match &result {
            Ok(_) => self.metrics.increment("ai.success", 1, &tags),
            Err(err) => {
                self.metrics.increment("ai.failure", 1, &tags);
                tracing::warn!(content = %item.id, "content optimization failed: {err}");
            }
        }
        result
    }

    async fn publish_item(
        &self,
        ctx: &RequestContext,
        content_id: &str,
        action: PublishAction,
        platform_override: &[Platform],
    ) -> Result<PublishRecord, PublishError> {
        let requested_at_ms = self.clock.now_ms();
        let mut item = self.load_item(content_id).await?;
        if !platform_override.is_empty() {
            item.platforms = platform_override.to_vec();
        }
        let platforms = item.distinct_platforms();
        if platforms.is_empty() {
            return Err(IntelligenceError::NoPlatforms(item.id).into());
        }

        // Optimization failures fall back to the raw content.
        let analysis = self.run_optimizer(ctx, &item).ok();
        let content = PublishContent::new(&item, analysis.as_ref());
        let options = PublishOptions {
            action: action.per_item(),
            tenant_id: ctx.tenant_id.clone(),
        };

        let outcome = self.call_publisher(ctx, &content, &platforms, &options).await?;
        let error = outcome_error(&outcome);
        let record = PublishRecord {
            id: Uuid::new_v4(),
            tenant_id: ctx.tenant_id.clone(),
            content_id: item.id.clone(),
            action,
            success: outcome.any_success(),
            degraded: outcome.degraded,
            platforms,
            platform_results: outcome.results,
            optimized: content.is_optimized(),
            analysis,
            requested_at_ms,
            completed_at_ms: self.clock.now_ms(),
            error,
        };

        self.store
            .insert_publish_record(&record)
            .await
            .map_err(|e| {
                self.metrics.increment("store.failure", 1, &[]);
                tracing::error!(content = %record.content_id, "failed to persist publish record: {e}");
                PublishError::Storage(e.to_string())
            })?;

        let tags = [("tenant", ctx.tenant_id.as_str()), ("action", action.as_str())];
        if record.success {
            self.metrics.increment("publish.success", 1, &tags);
            tracing::info!(content = %record.content_id, record = %record.id, "content published");
            Ok(record)
        } else if record.degraded {
            self.metrics.increment("publish.degraded", 1, &tags);
            tracing::warn!(content = %record.content_id, "publisher degraded, nothing posted");
            Ok(record)
        } else {
            self.metrics.increment("publish.failure", 1, &tags);
            let message = record
                .error
                .clone()
                .unwrap_or_else(|| "no platform accepted the post".to_string());
            tracing::warn!(content = %record.content_id, "publish failed: {message}");
            Err(PublishError::PublishFailure {
                message,
                record: Box::new(record),
            })
        }
    }

    async fn call_publisher(
        &self,
        ctx: &RequestContext,
        content: &PublishContent,
        platforms: &[Platform],
        options: &PublishOptions,
    ) -> Result<PublishOutcome, PublishError> {
        let publisher = &self.publisher;
        let started = Instant::now();
        let result = self
            .breaker
            .call_with_fallback(
                move || publisher.publish(content, platforms, options),
                move || async move { Ok::<_, PublisherError>(PublishOutcome::degraded(platforms)) },
            )
            .await;
        self.metrics.record_timing(
            "publish.latency_ms",
            millis(started.elapsed()),
            &[("tenant", ctx.tenant_id.as_str())],
        );

        match result {
            Ok(outcome) => Ok(outcome),
            Err(BreakerError::Inner(err)) => {
                let message = err.to_string();
                Ok(PublishOutcome::from_results(
                    platforms
                        .iter()
                        .map(|p| PlatformResult::failed(*p, message.clone()))
                        .collect(),
                ))
            }
            Err(BreakerError::Open {
                name,
                retry_after_ms,
            }) => Err(PublishError::CircuitOpen {
                name,
                retry_after_ms,
            }),
        }
    }
}

fn outcome_error(outcome: &PublishOutcome) -> Option<String> {
    if outcome.any_success() {
        return None;
    }
    if outcome.degraded {
        return Some(DEGRADED_MESSAGE.to_string());
    }
    let messages: Vec<&str> = outcome
        .results
        .iter()
        .filter_map(|r| r.error.as_deref())
        .collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

fn bulk_item(content_id: &str, result: Result<PublishRecord, PublishError>) -> BulkItemOutcome {
    match result {
        Ok(record) => BulkItemOutcome {
            content_id: content_id.to_string(),
            success: record.success,
            record_id: Some(record.id),
            error_kind: record.degraded.then(|| "degraded".to_string()),
            error: record.error,
        },
        Err(err) => BulkItemOutcome {
            content_id: content_id.to_string(),
            success: false,
            record_id: match &err {
                PublishError::PublishFailure { record, .. } => Some(record.id),
                _ => None,
            },
            error_kind: Some(err.kind().to_string()),
            error: Some(err.to_string()),
        },
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}
