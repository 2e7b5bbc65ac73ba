//! Tests for error types

use prometheus_publish_core::core::PublishError;
use prometheus_publish_core::intelligence::IntelligenceError;

#[test]
fn test_admission_denied_error() {
    let err = PublishError::AdmissionDenied {
        key: "acme:publish".to_string(),
        reset_time_ms: 60_000,
        retry_after_ms: 1_500,
    };
    assert_eq!(
        format!("{err}"),
        "rate limit exceeded for `acme:publish`; window resets at 60000"
    );
    assert_eq!(err.kind(), "admission_denied");
    assert_eq!(err.retry_after_ms(), Some(1_500));
    assert!(err.is_retryable());
}

#[test]
fn test_lock_contention_error() {
    let err = PublishError::LockContention {
        resource: "bulk_publish:acme".to_string(),
        wait_ms: 250,
    };
    assert_eq!(format!("{err}"), "resource `bulk_publish:acme` is locked; retry in 250ms");
    assert_eq!(err.retry_after_ms(), Some(250));
}

#[test]
fn test_optimization_error_from_intelligence() {
    let err: PublishError = IntelligenceError::EmptyContent("c1".into()).into();
    assert_eq!(err.kind(), "optimization_failure");
    assert_eq!(
        format!("{err}"),
        "content optimization failed: content `c1` has no text to analyze"
    );
    assert!(!err.is_retryable());
    assert_eq!(err.retry_after_ms(), None);
}

#[test]
fn test_not_found_and_config_errors() {
    assert_eq!(
        format!("{}", PublishError::NotFound("c9".into())),
        "content item `c9` not found"
    );
    let err = PublishError::InvalidConfig("bad".into());
    assert_eq!(format!("{err}"), "invalid configuration: bad");
    assert!(!err.is_retryable());
}
