//! Tests for configuration validation

use std::collections::HashMap;
use std::time::Duration;

use prometheus_publish_core::config::CoreConfig;
use prometheus_publish_core::core::RateLimitPolicy;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn test_defaults_are_valid() {
    let cfg = CoreConfig::default();
    assert!(cfg.validate().is_ok());
    assert_eq!(cfg.circuit_breaker.failure_threshold, 5);
    assert_eq!(cfg.circuit_breaker.timeout_ms, 60_000);
    assert_eq!(cfg.rate_limit.default.limit, 100);
    assert_eq!(cfg.rate_limit.default.burst_limit, 20);
    assert_eq!(cfg.rate_limit.default.window, Duration::from_secs(60));
}

#[test]
fn test_invalid_breaker_threshold() {
    let mut cfg = CoreConfig::default();
    cfg.circuit_breaker.failure_threshold = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_invalid_tier_policy_names_the_tier() {
    let mut cfg = CoreConfig::default();
    cfg.rate_limit.tiers.insert(
        "pro".into(),
        RateLimitPolicy {
            limit: 0,
            window: Duration::from_secs(1),
            burst_limit: 0,
        },
    );
    let err = cfg.validate().unwrap_err();
    assert!(err.contains("pro"), "{err}");
}

#[test]
fn test_invalid_lock_ttl_and_group_size() {
    let mut cfg = CoreConfig::default();
    cfg.locks.ttl_ms = 0;
    assert!(cfg.validate().is_err());

    let mut cfg = CoreConfig::default();
    cfg.bulk.group_size = 0;
    assert!(cfg.validate().is_err());
}

#[test]
fn test_from_json_partial_sections() {
    let cfg = CoreConfig::from_json_str(
        r#"{
            "circuit_breaker": {"failure_threshold": 3},
            "rate_limit": {
                "default": {"limit": 10, "window": 1000, "burst_limit": 2},
                "tiers": {"enterprise": {"limit": 1000, "window": 60000, "burst_limit": 200}}
            },
            "bulk": {"group_size": 10}
        }"#,
    )
    .unwrap();
    assert_eq!(cfg.circuit_breaker.failure_threshold, 3);
    assert_eq!(cfg.circuit_breaker.timeout_ms, 60_000);
    assert_eq!(cfg.rate_limit.default.capacity(), 12);
    assert_eq!(cfg.rate_limit.tiers["enterprise"].limit, 1000);
    assert_eq!(cfg.bulk.group_size, 10);
    assert_eq!(cfg.bulk.pacing_delay_ms, 2_000);
}

#[test]
fn test_from_json_rejects_invalid() {
    assert!(CoreConfig::from_json_str("not json").is_err());
    assert!(CoreConfig::from_json_str(r#"{"metrics": {"histogram_capacity": 0}}"#).is_err());
}

#[test]
fn test_from_lookup_overrides() {
    let cfg = CoreConfig::from_lookup(lookup(&[
        ("PUBLISH_CORE_BREAKER_FAILURE_THRESHOLD", "2"),
        ("PUBLISH_CORE_RATE_LIMIT", "50"),
        ("PUBLISH_CORE_RATE_WINDOW_MS", "1000"),
        ("PUBLISH_CORE_BULK_PACING_DELAY_MS", " 250 "),
    ]))
    .unwrap();
    assert_eq!(cfg.circuit_breaker.failure_threshold, 2);
    assert_eq!(cfg.rate_limit.default.limit, 50);
    assert_eq!(cfg.rate_limit.default.window, Duration::from_secs(1));
    assert_eq!(cfg.orchestrator_settings().pacing_delay, Duration::from_millis(250));
}

#[test]
fn test_from_lookup_reports_bad_values() {
    let err = CoreConfig::from_lookup(lookup(&[("PUBLISH_CORE_LOCK_TTL_MS", "soon")])).unwrap_err();
    assert!(err.to_string().contains("PUBLISH_CORE_LOCK_TTL_MS"));

    let err = CoreConfig::from_lookup(lookup(&[("PUBLISH_CORE_BULK_GROUP_SIZE", "0")])).unwrap_err();
    assert!(err.to_string().contains("group_size"));
}
