//! Requests, publisher payloads and persisted records.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intelligence::{ContentAnalysis, ContentItem, PlatformVariant};
use crate::util::serde::{Platform, RequestContext, TenantId};

/// Error message carried by degraded platform results.
pub const DEGRADED_MESSAGE: &str = "service degraded";

/// What a publish request asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishAction {
    /// Post now.
    Publish,
    /// Queue for the item's scheduled time.
    Schedule,
    /// Multi-item post; runs under a tenant-wide lock.
    BulkPublish,
    /// Multi-item scheduling; runs under a tenant-wide lock.
    BulkSchedule,
}

impl PublishAction {
    /// Stable name used for rate-limit endpoints, lock keys and metric tags.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Publish => "publish",
            Self::Schedule => "schedule",
            Self::BulkPublish => "bulk_publish",
            Self::BulkSchedule => "bulk_schedule",
        }
    }

    /// Whether the action is multi-step and must hold a lock.
    pub const fn requires_lock(self) -> bool {
        matches!(self, Self::BulkPublish | Self::BulkSchedule)
    }

    /// Multi-item form of the action.
    pub const fn bulk(self) -> Self {
        match self {
            Self::Publish | Self::BulkPublish => Self::BulkPublish,
            Self::Schedule | Self::BulkSchedule => Self::BulkSchedule,
        }
    }

    /// Single-item action used for each entry of a bulk action.
    pub const fn per_item(self) -> Self {
        match self {
            Self::Publish | Self::BulkPublish => Self::Publish,
            Self::Schedule | Self::BulkSchedule => Self::Schedule,
        }
    }
}

/// Lock key guarding an action for a tenant.
pub fn lock_resource(action: PublishAction, tenant: &str) -> String {
    format!("{}:{tenant}", action.as_str())
}

/// How bulk groups are spaced out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingStrategy {
    /// Groups run back to back.
    #[default]
    Immediate,
    /// Groups are separated by the configured pacing delay.
    AiOptimized,
}

/// Single-entry publish request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishRequest {
    /// Caller identity.
    pub context: RequestContext,
    /// Calendar entry to publish.
    pub content_id: String,
    /// Requested action.
    pub action: PublishAction,
    /// Platforms to target; empty means the item's own platforms.
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

impl PublishRequest {
    /// Publish `content_id` now to the item's platforms.
    pub fn new(context: RequestContext, content_id: impl Into<String>) -> Self {
        Self {
            context,
            content_id: content_id.into(),
            action: PublishAction::Publish,
            platforms: Vec::new(),
        }
    }

    /// Override the action.
    #[must_use]
    pub const fn with_action(mut self, action: PublishAction) -> Self {
        self.action = action;
        self
    }

    /// Override target platforms.
    #[must_use]
    pub fn with_platforms(mut self, platforms: impl IntoIterator<Item = Platform>) -> Self {
        self.platforms = platforms.into_iter().collect();
        self
    }
}

/// Multi-entry publish request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkPublishRequest {
    /// Caller identity.
    pub context: RequestContext,
    /// Calendar entries, processed in order, group by group.
    pub content_ids: Vec<String>,
    /// `BulkPublish` or `BulkSchedule`; single actions are promoted.
    pub action: PublishAction,
    /// Group spacing.
    #[serde(default)]
    pub pacing: PacingStrategy,
}

impl BulkPublishRequest {
    /// Bulk publish `content_ids` with immediate pacing.
    pub fn new<S: Into<String>>(
        context: RequestContext,
        content_ids: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            context,
            content_ids: content_ids.into_iter().map(Into::into).collect(),
            action: PublishAction::BulkPublish,
            pacing: PacingStrategy::Immediate,
        }
    }

    /// Override the action.
    #[must_use]
    pub const fn with_action(mut self, action: PublishAction) -> Self {
        self.action = action;
        self
    }

    /// Override pacing.
    #[must_use]
    pub const fn with_pacing(mut self, pacing: PacingStrategy) -> Self {
        self.pacing = pacing;
        self
    }
}

/// Content handed to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishContent {
    /// Calendar entry.
    pub content_id: String,
    /// Headline.
    pub title: String,
    /// Original body text.
    pub body: String,
    /// Attached media.
    pub media_urls: Vec<String>,
    /// Original hashtags.
    pub hashtags: Vec<String>,
    /// Platform rewrites; empty when optimization failed.
    pub variants: Vec<PlatformVariant>,
    /// Scheduled time for `Schedule` actions.
    pub scheduled_at_ms: Option<u128>,
}

impl PublishContent {
    /// Build from an item and, when available, its analysis.
    pub fn new(item: &ContentItem, analysis: Option<&ContentAnalysis>) -> Self {
        Self {
            content_id: item.id.clone(),
            title: item.title.clone(),
            body: item.description.clone(),
            media_urls: item.media_urls.clone(),
            hashtags: item.hashtags.clone(),
            variants: analysis.map(|a| a.variants.clone()).unwrap_or_default(),
            scheduled_at_ms: item.scheduled_at_ms,
        }
    }

    /// Whether platform rewrites are attached.
    pub fn is_optimized(&self) -> bool {
        !self.variants.is_empty()
    }

    /// Text to post on `platform`: the rewrite when present, the raw body otherwise.
    pub fn text_for(&self, platform: Platform) -> &str {
        self.variants
            .iter()
            .find(|v| v.platform == platform)
            .map_or(self.body.as_str(), |v| v.text.as_str())
    }
}

/// Options passed through to the publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOptions {
    /// Action being carried out.
    pub action: PublishAction,
    /// Tenant the post belongs to.
    pub tenant_id: TenantId,
}

/// Per-platform publish result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformResult {
    /// Target platform.
    pub platform: Platform,
    /// Whether the post went through.
    pub success: bool,
    /// Identifier assigned by the platform.
    pub post_id: Option<String>,
    /// Failure detail.
    pub error: Option<String>,
}

impl PlatformResult {
    /// Successful result.
    pub fn ok(platform: Platform, post_id: impl Into<String>) -> Self {
        Self {
            platform,
            success: true,
            post_id: Some(post_id.into()),
            error: None,
        }
    }

    /// Failed result.
    pub fn failed(platform: Platform, error: impl Into<String>) -> Self {
        Self {
            platform,
            success: false,
            post_id: None,
            error: Some(error.into()),
        }
    }
}

/// What the publisher reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishOutcome {
    /// Platforms the post reached.
    pub successful_platforms: Vec<Platform>,
    /// One entry per targeted platform.
    pub results: Vec<PlatformResult>,
    /// Produced by the breaker fallback instead of the publisher.
    #[serde(default)]
    pub degraded: bool,
}

impl PublishOutcome {
    /// Outcome assembled from per-platform results.
    pub fn from_results(results: Vec<PlatformResult>) -> Self {
        Self {
            successful_platforms: results
                .iter()
                .filter(|r| r.success)
                .map(|r| r.platform)
                .collect(),
            results,
            degraded: false,
        }
    }

    /// Fallback outcome used while the publisher circuit is open.
    pub fn degraded(platforms: &[Platform]) -> Self {
        Self {
            successful_platforms: Vec::new(),
            results: platforms
                .iter()
                .map(|p| PlatformResult::failed(*p, DEGRADED_MESSAGE))
                .collect(),
            degraded: true,
        }
    }

    /// Whether at least one platform succeeded.
    pub fn any_success(&self) -> bool {
        !self.successful_platforms.is_empty()
    }
}

/// Persisted trace of one publish attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishRecord {
    /// Record identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_id: TenantId,
    /// Calendar entry.
    pub content_id: String,
    /// Action carried out.
    pub action: PublishAction,
    /// Whether any platform succeeded.
    pub success: bool,
    /// Whether the breaker fallback produced the outcome.
    pub degraded: bool,
    /// Platforms that were targeted.
    pub platforms: Vec<Platform>,
    /// Per-platform results.
    pub platform_results: Vec<PlatformResult>,
    /// Scoring output, absent when optimization failed.
    pub analysis: Option<ContentAnalysis>,
    /// Whether optimized variants were published.
    pub optimized: bool,
    /// Epoch milliseconds at request start.
    pub requested_at_ms: u128,
    /// Epoch milliseconds at completion.
    pub completed_at_ms: u128,
    /// Failure detail when unsuccessful.
    pub error: Option<String>,
}

/// Result of one entry of a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkItemOutcome {
    /// Calendar entry.
    pub content_id: String,
    /// Whether the entry published.
    pub success: bool,
    /// Persisted record id, when a record was written.
    pub record_id: Option<Uuid>,
    /// Machine-readable failure kind.
    pub error_kind: Option<String>,
    /// Failure detail.
    pub error: Option<String>,
}

/// Aggregate result of a bulk request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BulkPublishReport {
    /// Batch identifier.
    pub batch_id: Uuid,
    /// Tenant the batch ran for.
    pub tenant_id: TenantId,
    /// Action carried out.
    pub action: PublishAction,
    /// Entries submitted.
    pub total: usize,
    /// Entries that published.
    pub succeeded: usize,
    /// Entries that failed.
    pub failed: usize,
    /// Concurrent groups processed.
    pub groups: usize,
    /// Per-entry results, in submission order.
    pub items: Vec<BulkItemOutcome>,
    /// Wall time spent, including pacing delays.
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
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
