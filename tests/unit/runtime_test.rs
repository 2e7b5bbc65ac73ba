//! Tests for the API surface

use std::sync::Arc;

use prometheus_publish_core::core::CircuitState;
use prometheus_publish_core::infra::{InMemoryContentStore, ScriptedPublisher};
use prometheus_publish_core::intelligence::{ContentIntelligence, ContentItem};
use prometheus_publish_core::orchestrator::{PublishAction, PublishOrchestrator};
use prometheus_publish_core::runtime::{
    health, submit_bulk, submit_publish, submit_publish_json, BulkSubmission, PublishSubmission,
};
use prometheus_publish_core::util::{ManualClock, Platform};

fn orchestrator(publisher: Arc<ScriptedPublisher>) -> PublishOrchestrator {
    let store = Arc::new(InMemoryContentStore::default());
    store.insert_item(
        ContentItem::new("c1", "Launch", "Our great release is live.")
            .with_platforms([Platform::Twitter, Platform::LinkedIn]),
    );
    PublishOrchestrator::new(
        store,
        publisher,
        Arc::new(ContentIntelligence::default()),
        ManualClock::new(0),
    )
}

#[tokio::test]
async fn test_submit_publish_success() {
    let orch = orchestrator(Arc::new(ScriptedPublisher::new()));
    let response = submit_publish(
        &orch,
        PublishSubmission {
            tenant_id: "acme".into(),
            tier: None,
            content_id: "c1".into(),
            action: PublishAction::Publish,
            platforms: vec![],
        },
    )
    .await
    .unwrap();
    assert!(response.success);
    assert!(response.optimized);
    assert!(response.performance_score.is_some());
    assert_eq!(response.platform_results.len(), 2);
}

#[tokio::test]
async fn test_submit_publish_not_found() {
    let orch = orchestrator(Arc::new(ScriptedPublisher::new()));
    let err = submit_publish(
        &orch,
        PublishSubmission {
            tenant_id: "acme".into(),
            tier: Some("standard".into()),
            content_id: "missing".into(),
            action: PublishAction::Schedule,
            platforms: vec![],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, "not_found");
    assert_eq!(err.retry_after_ms, None);
}

#[tokio::test]
async fn test_publish_failure_carries_record_id() {
    let publisher = Arc::new(ScriptedPublisher::new());
    publisher.fail_platform(Platform::Twitter);
    publisher.fail_platform(Platform::LinkedIn);
    let orch = orchestrator(publisher);
    let err = submit_publish(
        &orch,
        PublishSubmission {
            tenant_id: "acme".into(),
            tier: None,
            content_id: "c1".into(),
            action: PublishAction::Publish,
            platforms: vec![],
        },
    )
    .await
    .unwrap_err();
    assert_eq!(err.kind, "publish_failure");
    assert!(err.record_id.is_some());
}

#[tokio::test]
async fn test_json_framing() {
    let orch = orchestrator(Arc::new(ScriptedPublisher::new()));
    let ok = submit_publish_json(&orch, r#"{"tenant_id":"acme","content_id":"c1"}"#).await;
    let ok: serde_json::Value = serde_json::from_str(&ok).unwrap();
    assert_eq!(ok["success"], true);

    let bad = submit_publish_json(&orch, "{").await;
    let bad: serde_json::Value = serde_json::from_str(&bad).unwrap();
    assert_eq!(bad["kind"], "bad_request");
}

#[tokio::test]
async fn test_submit_bulk_and_health() {
    let orch = orchestrator(Arc::new(ScriptedPublisher::new()));
    let report = submit_bulk(
        &orch,
        serde_json::from_str::<BulkSubmission>(
            r#"{"tenant_id":"acme","content_ids":["c1","missing"]}"#,
        )
        .unwrap(),
    )
    .await
    .unwrap();
    assert_eq!(report.total, 2);
    assert_eq!(report.succeeded, 1);

    let h = health(&orch);
    assert!(h.ok);
    assert_eq!(h.circuit_state, CircuitState::Closed);
    assert_eq!(h.rate_windows, 1);
}
