//! Tests for builder modules

use std::sync::Arc;
use std::time::Duration;

use prometheus_publish_core::builders::build_orchestrator;
use prometheus_publish_core::config::CoreConfig;
use prometheus_publish_core::core::{PublishError, RateLimitPolicy};
use prometheus_publish_core::infra::{InMemoryContentStore, ScriptedPublisher};
use prometheus_publish_core::intelligence::ContentItem;
use prometheus_publish_core::orchestrator::PublishRequest;
use prometheus_publish_core::util::{ManualClock, Platform, RequestContext};

#[tokio::test]
async fn test_tier_policies_are_wired() {
    let mut cfg = CoreConfig::default();
    cfg.rate_limit.tiers.insert(
        "trial".into(),
        RateLimitPolicy {
            limit: 1,
            window: Duration::from_secs(60),
            burst_limit: 0,
        },
    );

    let store = Arc::new(InMemoryContentStore::default());
    store.insert_item(ContentItem::new("c1", "Hello", "World").with_platforms([Platform::Twitter]));
    let orchestrator = build_orchestrator(
        &cfg,
        store,
        Arc::new(ScriptedPublisher::new()),
        ManualClock::new(0),
    )
    .unwrap();

    let trial = RequestContext::new("t1").with_tier("trial");
    assert!(orchestrator
        .publish(PublishRequest::new(trial.clone(), "c1"))
        .await
        .is_ok());
    let err = orchestrator
        .publish(PublishRequest::new(trial, "c1"))
        .await
        .unwrap_err();
    assert!(matches!(err, PublishError::AdmissionDenied { .. }));

    let standard = RequestContext::new("t2");
    assert!(orchestrator.publish(PublishRequest::new(standard, "c1")).await.is_ok());
}

#[test]
fn test_histogram_capacity_is_wired() {
    let mut cfg = CoreConfig::default();
    cfg.metrics.histogram_capacity = 7;
    let orchestrator = build_orchestrator(
        &cfg,
        Arc::new(InMemoryContentStore::default()),
        Arc::new(ScriptedPublisher::new()),
        ManualClock::new(0),
    )
    .unwrap();
    assert_eq!(orchestrator.metrics().histogram_capacity(), 7);
}
