//! Tests for utility functions

use std::time::Duration;

use prometheus_publish_core::util::{
    init_tracing, Clock, ManualClock, Platform, Priority, RequestContext, SystemClock, DEFAULT_TIER,
};

#[test]
fn test_priority_ordering() {
    assert!(Priority::High > Priority::Medium);
    assert!(Priority::Medium > Priority::Low);
}

#[test]
fn test_platform_limits() {
    assert_eq!(Platform::Twitter.char_limit(), 280);
    assert_eq!(Platform::LinkedIn.char_limit(), 3000);
    assert_eq!(Platform::Instagram.char_limit(), 2200);
    assert_eq!(Platform::ALL.len(), 5);
    assert_eq!(Platform::TikTok.to_string(), "tiktok");
}

#[test]
fn test_platform_serde_names() {
    let json = serde_json::to_string(&Platform::LinkedIn).unwrap();
    assert_eq!(json, "\"linkedin\"");
    let parsed: Platform = serde_json::from_str("\"tiktok\"").unwrap();
    assert_eq!(parsed, Platform::TikTok);
}

#[test]
fn test_request_context_tier() {
    let ctx = RequestContext::new("acme");
    assert_eq!(ctx.tier, DEFAULT_TIER);
    assert_eq!(ctx.with_tier("enterprise").tier, "enterprise");
}

#[test]
fn test_manual_clock() {
    let clock = ManualClock::new(5);
    clock.advance(Duration::from_millis(10));
    clock.advance_ms(5);
    assert_eq!(clock.now_ms(), 20);
    clock.set(1);
    assert_eq!(clock.now_ms(), 1);
}

#[test]
fn test_system_clock_is_epoch_based() {
    // 2020-01-01T00:00:00Z
    assert!(SystemClock.now_ms() > 1_577_836_800_000);
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
