//! Tests for rate limiting with burst

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use prometheus_publish_core::core::{window_key, RateLimitPolicy, RateLimiter};
use prometheus_publish_core::util::{ManualClock, RequestContext};

#[test]
fn test_documented_example() {
    let clock = ManualClock::new(0);
    let limiter = RateLimiter::new(
        RateLimitPolicy {
            limit: 100,
            window: Duration::from_millis(60_000),
            burst_limit: 20,
        },
        clock.clone(),
    );

    let admitted = (0..121).filter(|_| limiter.check("acme", "publish").allowed).count();
    assert_eq!(admitted, 120);

    clock.set(60_000);
    assert!(!limiter.check("acme", "publish").allowed);
    clock.set(60_001);
    assert!(limiter.check("acme", "publish").allowed);
}

#[test]
fn test_remaining_counts_down() {
    let limiter = RateLimiter::new(
        RateLimitPolicy {
            limit: 2,
            window: Duration::from_secs(1),
            burst_limit: 1,
        },
        ManualClock::new(0),
    );
    let remaining: Vec<u32> = (0..4).map(|_| limiter.check("t", "e").remaining).collect();
    assert_eq!(remaining, vec![2, 1, 0, 0]);
}

#[test]
fn test_zero_burst_admits_exactly_limit() {
    let limiter = RateLimiter::new(
        RateLimitPolicy {
            limit: 3,
            window: Duration::from_secs(1),
            burst_limit: 0,
        },
        ManualClock::new(0),
    );
    let admitted = (0..10).filter(|_| limiter.check("t", "e").allowed).count();
    assert_eq!(admitted, 3);
}

#[test]
fn test_concurrent_checks_never_exceed_capacity() {
    let limiter = Arc::new(RateLimiter::new(
        RateLimitPolicy {
            limit: 50,
            window: Duration::from_secs(60),
            burst_limit: 10,
        },
        ManualClock::new(0),
    ));
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let limiter = Arc::clone(&limiter);
            thread::spawn(move || (0..20).filter(|_| limiter.check("t", "e").allowed).count())
        })
        .collect();
    let admitted: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
    assert_eq!(admitted, 60);
}

#[test]
fn test_unknown_tier_uses_default() {
    let limiter = RateLimiter::new(RateLimitPolicy::default(), ManualClock::new(0)).with_tier(
        "pro",
        RateLimitPolicy {
            limit: 1,
            window: Duration::from_secs(1),
            burst_limit: 0,
        },
    );
    assert_eq!(limiter.policy_for("free"), RateLimitPolicy::default());
    assert_eq!(limiter.policy_for("pro").limit, 1);

    let ctx = RequestContext::new("acme").with_tier("free");
    assert_eq!(limiter.check_context(&ctx, "publish").remaining, 119);
}

#[test]
fn test_window_key_format() {
    assert_eq!(window_key("acme", "bulk_publish"), "acme:bulk_publish");
}
