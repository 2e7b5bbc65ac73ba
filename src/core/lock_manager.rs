//! Advisory, TTL-scoped locks keyed by resource name.
//!
//! Locks live in process memory only. They keep two concurrent requests on
//! the same node out of the same critical section (bulk scheduling, analytics
//! aggregation); they give no guarantee across nodes. Acquisition never
//! waits: a busy resource reports how long the current holder has left.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::PublishError;
use crate::util::clock::SharedClock;

/// Free-form metadata attached to a lock for diagnostics.
pub type LockMetadata = BTreeMap<String, String>;

/// Outcome of an acquisition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LockAcquisition {
    /// The caller now owns the lock.
    Acquired {
        /// Token proving ownership at release.
        token: String,
        /// Epoch milliseconds at which the lock lapses.
        expires_at_ms: u128,
    },
    /// A live lock is held by someone else.
    Busy {
        /// Milliseconds until the current lock expires.
        wait_ms: u128,
    },
}

impl LockAcquisition {
    /// Whether the lock was acquired.
    pub const fn is_acquired(&self) -> bool {
        matches!(self, Self::Acquired { .. })
    }

    /// Ownership token, when acquired.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Acquired { token, .. } => Some(token),
            Self::Busy { .. } => None,
        }
    }
}

/// Public view of a live lock. The owner token is never exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Locked resource key.
    pub resource: String,
    /// Owner named at acquisition.
    pub owner: String,
    /// Epoch milliseconds of acquisition.
    pub acquired_at_ms: u128,
    /// Epoch milliseconds at which the lock lapses.
    pub expires_at_ms: u128,
    /// Diagnostic metadata.
    pub metadata: LockMetadata,
}

#[derive(Debug, Clone)]
struct LockEntry {
    owner_token: String,
    owner: String,
    acquired_at_ms: u128,
    expires_at_ms: u128,
    metadata: LockMetadata,
}

impl LockEntry {
    const fn is_expired(&self, now_ms: u128) -> bool {
        now_ms > self.expires_at_ms
    }
}

/// In-process lock table.
#[derive(Debug)]
pub struct LockManager {
    clock: SharedClock,
    locks: Mutex<HashMap<String, LockEntry>>,
}

impl LockManager {
    /// Create an empty lock table.
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Try to take the lock on `resource` for `ttl`.
    ///
    /// An expired lock is removed first and never blocks acquisition.
    pub fn acquire(
        &self,
        resource: &str,
        owner: &str,
        ttl: Duration,
        metadata: LockMetadata,
    ) -> LockAcquisition {
        let now = self.clock.now_ms();
        let mut locks = self.locks.lock();

        if let Some(existing) = locks.get(resource) {
            if existing.is_expired(now) {
                tracing::debug!(resource, owner = %existing.owner, "reclaiming expired lock");
                locks.remove(resource);
            } else {
                return LockAcquisition::Busy {
                    wait_ms: existing.expires_at_ms - now,
                };
            }
        }

        let token = format!("{owner}-{now}-{}", Uuid::new_v4().simple());
        let expires_at_ms = now + ttl.as_millis();
        locks.insert(
            resource.to_string(),
            LockEntry {
                owner_token: token.clone(),
                owner: owner.to_string(),
                acquired_at_ms: now,
                expires_at_ms,
                metadata,
            },
        );
        tracing::debug!(resource, owner, expires_at_ms = %expires_at_ms, "lock acquired");
        LockAcquisition::Acquired {
            token,
            expires_at_ms,
        }
    }

    /// Release `resource` if `token` matches the live lock. Returns whether a lock was removed.
    pub fn release(&self, resource: &str, token: &str) -> bool {
        let mut locks = self.locks.lock();
        match locks.get(resource) {
            Some(entry) if entry.owner_token == token => {
                locks.remove(resource);
                tracing::debug!(resource, "lock released");
                true
            }
            Some(_) => {
                tracing::warn!(resource, "release rejected: token mismatch");
                false
            }
            None => false,
        }
    }

    /// Whether a live lock exists on `resource`.
    pub fn is_locked(&self, resource: &str) -> bool {
        let now = self.clock.now_ms();
        self.locks
            .lock()
            .get(resource)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Details of the live lock on `resource`.
    pub fn inspect(&self, resource: &str) -> Option<LockInfo> {
        let now = self.clock.now_ms();
        let locks = self.locks.lock();
        let entry = locks.get(resource).filter(|e| !e.is_expired(now))?;
        Some(LockInfo {
            resource: resource.to_string(),
            owner: entry.owner.clone(),
            acquired_at_ms: entry.acquired_at_ms,
            expires_at_ms: entry.expires_at_ms,
            metadata: entry.metadata.clone(),
        })
    }

    /// Remove every expired lock. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_ms();
        let mut locks = self.locks.lock();
        let before = locks.len();
        locks.retain(|_, entry| !entry.is_expired(now));
        before - locks.len()
    }

    /// Acquire a lock that is released when the returned guard drops.
    pub fn acquire_guard(
        self: &Arc<Self>,
        resource: &str,
        owner: &str,
        ttl: Duration,
        metadata: LockMetadata,
    ) -> Result<LockGuard, PublishError> {
        match self.acquire(resource, owner, ttl, metadata) {
            LockAcquisition::Acquired { token, .. } => Ok(LockGuard {
                manager: Arc::clone(self),
                resource: resource.to_string(),
                token,
                released: false,
            }),
            LockAcquisition::Busy { wait_ms } => Err(PublishError::LockContention {
                resource: resource.to_string(),
                wait_ms,
            }),
        }
    }
}

/// Owned lock that releases itself on drop.
#[derive(Debug)]
pub struct LockGuard {
    manager: Arc<LockManager>,
    resource: String,
    token: String,
    released: bool,
}

impl LockGuard {
    /// Locked resource key.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Ownership token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Release now. Returns whether the lock was still held by this guard.
    pub fn release(mut self) -> bool {
        self.released = true;
        self.manager.release(&self.resource, &self.token)
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if !self.released {
            self.manager.release(&self.resource, &self.token);
        }
    }
}
