//! Tests for the circuit breaker state machine

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prometheus_publish_core::core::{
    BreakerError, CircuitBreaker, CircuitBreakerConfig, CircuitState,
};
use prometheus_publish_core::util::ManualClock;

fn breaker(threshold: u32, timeout: Duration) -> (CircuitBreaker, Arc<ManualClock>) {
    let clock = ManualClock::new(0);
    let breaker = CircuitBreaker::new(
        "publisher",
        CircuitBreakerConfig {
            failure_threshold: threshold,
            timeout,
        },
        clock.clone(),
    );
    (breaker, clock)
}

async fn failing(b: &CircuitBreaker) -> Result<u32, BreakerError<String>> {
    b.call(|| async { Err::<u32, String>("timeout".into()) }).await
}

#[tokio::test]
async fn test_default_config() {
    let config = CircuitBreakerConfig::default();
    assert_eq!(config.failure_threshold, 5);
    assert_eq!(config.timeout, Duration::from_secs(60));
}

#[tokio::test]
async fn test_full_cycle() {
    let (b, clock) = breaker(5, Duration::from_secs(60));

    for _ in 0..5 {
        assert!(matches!(failing(&b).await, Err(BreakerError::Inner(_))));
    }
    assert_eq!(b.state(), CircuitState::Open);

    clock.advance_ms(30_000);
    match failing(&b).await {
        Err(BreakerError::Open { retry_after_ms, .. }) => assert_eq!(retry_after_ms, 30_001),
        other => panic!("expected open, got {other:?}"),
    }

    clock.advance_ms(30_001);
    let value = b.call(|| async { Ok::<u32, String>(7) }).await.unwrap();
    assert_eq!(value, 7);
    assert_eq!(b.state(), CircuitState::Closed);
    assert_eq!(b.failure_count(), 0);
}

#[tokio::test]
async fn test_trial_failure_reopens_and_restarts_cooldown() {
    let (b, clock) = breaker(1, Duration::from_millis(100));
    failing(&b).await.ok();
    clock.advance_ms(101);
    failing(&b).await.ok();
    assert_eq!(b.state(), CircuitState::Open);

    clock.advance_ms(50);
    assert!(matches!(failing(&b).await, Err(BreakerError::Open { .. })));
    clock.advance_ms(51);
    assert!(matches!(failing(&b).await, Err(BreakerError::Inner(_))));
}

#[tokio::test]
async fn test_fallback_does_not_touch_state() {
    let (b, _clock) = breaker(1, Duration::from_secs(60));
    failing(&b).await.ok();

    let fallbacks = AtomicUsize::new(0);
    let fallbacks_ref = &fallbacks;
    for _ in 0..3 {
        let value = b
            .call_with_fallback(
                || async { Ok::<u32, String>(1) },
                move || async move {
                    fallbacks_ref.fetch_add(1, Ordering::SeqCst);
                    Ok(0)
                },
            )
            .await
            .unwrap();
        assert_eq!(value, 0);
    }
    assert_eq!(fallbacks.load(Ordering::SeqCst), 3);
    assert_eq!(b.state(), CircuitState::Open);
    assert_eq!(b.snapshot().short_circuited, 3);
}

#[tokio::test]
async fn test_snapshot_serializes() {
    let (b, _clock) = breaker(2, Duration::from_secs(1));
    failing(&b).await.ok();
    let json = serde_json::to_value(b.snapshot()).unwrap();
    assert_eq!(json["name"], "publisher");
    assert_eq!(json["state"], "closed");
    assert_eq!(json["failure_count"], 1);
}
