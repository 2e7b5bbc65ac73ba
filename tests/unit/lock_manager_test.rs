//! Tests for TTL locks

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use prometheus_publish_core::core::{LockAcquisition, LockManager, LockMetadata, PublishError};
use prometheus_publish_core::util::ManualClock;

#[test]
fn test_sequential_acquires_exclude_each_other() {
    let clock = ManualClock::new(0);
    let locks = LockManager::new(clock.clone());
    let ttl = Duration::from_secs(30);

    assert!(locks.acquire("bulk_schedule:acme", "req-1", ttl, LockMetadata::new()).is_acquired());
    assert!(!locks.acquire("bulk_schedule:acme", "req-2", ttl, LockMetadata::new()).is_acquired());

    clock.advance_ms(30_001);
    assert!(locks.acquire("bulk_schedule:acme", "req-2", ttl, LockMetadata::new()).is_acquired());
}

#[test]
fn test_double_release_is_noop() {
    let locks = LockManager::new(ManualClock::new(0));
    let acquisition = locks.acquire("r", "o", Duration::from_secs(1), LockMetadata::new());
    let token = acquisition.token().unwrap().to_string();
    assert!(locks.release("r", &token));
    assert!(!locks.release("r", &token));
    assert!(!locks.release("never-locked", &token));
}

#[test]
fn test_concurrent_acquire_has_single_winner() {
    let locks = Arc::new(LockManager::new(ManualClock::new(0)));
    let handles: Vec<_> = (0..16)
        .map(|i| {
            let locks = Arc::clone(&locks);
            thread::spawn(move || {
                locks
                    .acquire("hot", &format!("worker-{i}"), Duration::from_secs(5), LockMetadata::new())
                    .is_acquired()
            })
        })
        .collect();
    let winners = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}

#[test]
fn test_acquisition_serializes_with_status_tag() {
    let busy = LockAcquisition::Busy { wait_ms: 10 };
    let json = serde_json::to_value(&busy).unwrap();
    assert_eq!(json["status"], "busy");
    assert_eq!(json["wait_ms"], 10);
}

#[test]
fn test_guard_contention_reports_wait() {
    let clock = ManualClock::new(0);
    let locks = Arc::new(LockManager::new(clock.clone()));
    let _guard = locks
        .acquire_guard("r", "a", Duration::from_millis(500), LockMetadata::new())
        .unwrap();
    clock.advance_ms(200);
    match locks.acquire_guard("r", "b", Duration::from_millis(500), LockMetadata::new()) {
        Err(PublishError::LockContention { resource, wait_ms }) => {
            assert_eq!(resource, "r");
            assert_eq!(wait_ms, 300);
        }
        other => panic!("expected contention, got {other:?}"),
    }
}
