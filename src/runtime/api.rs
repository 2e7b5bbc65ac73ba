//! API-facing request/response models.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::{CircuitState, PublishError};
use crate::orchestrator::{
    BulkPublishReport, BulkPublishRequest, PacingStrategy, PlatformResult, PublishAction,
    PublishOrchestrator, PublishRecord, PublishRequest,
};
use crate::util::serde::{Platform, RequestContext, TenantId, DEFAULT_TIER};

/// Publish submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishSubmission {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Billing tier; the default tier when absent.
    #[serde(default)]
    pub tier: Option<String>,
    /// Calendar entry.
    pub content_id: String,
    /// Requested action.
    #[serde(default = "default_action")]
    pub action: PublishAction,
    /// Platform override.
    #[serde(default)]
    pub platforms: Vec<Platform>,
}

/// Bulk submission payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkSubmission {
    /// Tenant identifier.
    pub tenant_id: TenantId,
    /// Billing tier; the default tier when absent.
    #[serde(default)]
    pub tier: Option<String>,
    /// Calendar entries.
    pub content_ids: Vec<String>,
    /// Requested action.
    #[serde(default = "default_bulk_action")]
    pub action: PublishAction,
    /// Group spacing.
    #[serde(default)]
    pub pacing: PacingStrategy,
}

const fn default_action() -> PublishAction {
    PublishAction::Publish
}

const fn default_bulk_action() -> PublishAction {
    PublishAction::BulkPublish
}

fn context(tenant_id: &str, tier: Option<&str>) -> RequestContext {
    RequestContext::new(tenant_id).with_tier(tier.unwrap_or(DEFAULT_TIER))
}

/// Publish response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResponse {
    /// Persisted record.
    pub record_id: Uuid,
    /// Calendar entry.
    pub content_id: String,
    /// Whether any platform accepted the post.
    pub success: bool,
    /// Whether the publisher was bypassed by the fallback.
    pub degraded: bool,
    /// Whether optimized variants were published.
    pub optimized: bool,
    /// Aggregate score, when optimization succeeded.
    pub performance_score: Option<u32>,
    /// Per-platform results.
    pub platform_results: Vec<PlatformResult>,
}

impl From<PublishRecord> for PublishResponse {
    fn from(record: PublishRecord) -> Self {
        Self {
            record_id: record.id,
            content_id: record.content_id,
            success: record.success,
            degraded: record.degraded,
            optimized: record.optimized,
            performance_score: record.analysis.map(|a| a.performance_score),
            platform_results: record.platform_results,
        }
    }
}

/// Error body returned to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable error kind.
    pub kind: String,
    /// Human-readable message.
    pub message: String,
    /// Milliseconds to wait before retrying, when known.
    pub retry_after_ms: Option<u128>,
    /// Record persisted for a failed publish.
    pub record_id: Option<Uuid>,
}

impl From<&PublishError> for ErrorResponse {
    fn from(err: &PublishError) -> Self {
        Self {
            kind: err.kind().to_string(),
            message: err.to_string(),
            retry_after_ms: err.retry_after_ms(),
            record_id: match err {
                PublishError::PublishFailure { record, .. } => Some(record.id),
                _ => None,
            },
        }
    }
}

impl From<PublishError> for ErrorResponse {
    fn from(err: PublishError) -> Self {
        Self::from(&err)
    }
}

/// Health response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// Healthy flag.
    pub ok: bool,
    /// Publisher breaker state.
    pub circuit_state: CircuitState,
    /// Rate-limit windows tracked.
    pub rate_windows: usize,
}

/// Run a publish submission.
pub async fn submit_publish(
    orchestrator: &PublishOrchestrator,
    submission: PublishSubmission,
) -> Result<PublishResponse, ErrorResponse> {
    let request = PublishRequest::new(
        context(&submission.tenant_id, submission.tier.as_deref()),
        submission.content_id,
    )
    .with_action(submission.action)
    .with_platforms(submission.platforms);

    orchestrator
        .publish(request)
        .await
        .map(PublishResponse::from)
        .map_err(ErrorResponse::from)
}

/// Run a bulk submission.
pub async fn submit_bulk(
    orchestrator: &PublishOrchestrator,
    submission: BulkSubmission,
) -> Result<BulkPublishReport, ErrorResponse> {
    let request = BulkPublishRequest::new(
        context(&submission.tenant_id, submission.tier.as_deref()),
        submission.content_ids,
    )
    .with_action(submission.action)
    .with_pacing(submission.pacing);

    orchestrator
        .publish_bulk(request)
        .await
        .map_err(ErrorResponse::from)
}

/// Run a publish submission framed as JSON, answering in JSON.
pub async fn submit_publish_json(orchestrator: &PublishOrchestrator, body: &str) -> String {
    let response = match serde_json::from_str::<PublishSubmission>(body) {
        Ok(submission) => submit_publish(orchestrator, submission)
            .await
            .map_or_else(|e| serde_json::to_string(&e), |r| serde_json::to_string(&r)),
        Err(e) => serde_json::to_string(&ErrorResponse {
            kind: "bad_request".into(),
            message: e.to_string(),
            retry_after_ms: None,
            record_id: None,
        }),
    };
    response.unwrap_or_else(|e| format!(r#"{{"kind":"internal","message":"{e}"}}"#))
}

/// Return a health payload.
pub fn health(orchestrator: &PublishOrchestrator) -> Health {
    let report = orchestrator.health();
    Health {
        ok: report.healthy,
        circuit_state: report.circuit.state,
        rate_windows: report.rate_windows,
    }
}
