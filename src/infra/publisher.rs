//! Scripted publisher for development and testing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::orchestrator::{
    PlatformResult, PublishAction, PublishContent, PublishOptions, PublishOutcome, Publisher,
    PublisherError,
};
use crate::util::serde::Platform;

/// One call observed by [`ScriptedPublisher`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishCall {
    /// Calendar entry.
    pub content_id: String,
    /// Tenant named in the options.
    pub tenant_id: String,
    /// Action named in the options.
    pub action: PublishAction,
    /// Targeted platforms.
    pub platforms: Vec<Platform>,
    /// Text sent to each platform.
    pub texts: Vec<(Platform, String)>,
}

/// Publisher whose behaviour is set by the test.
///
/// By default every platform succeeds. Individual platforms can be made to
/// fail, or the whole service can be taken down.
#[derive(Debug, Default)]
pub struct ScriptedPublisher {
    calls: Mutex<Vec<PublishCall>>,
    failing: Mutex<HashSet<Platform>>,
    outage: AtomicBool,
    latency: Mutex<Option<Duration>>,
    next_post: AtomicU64,
}

impl ScriptedPublisher {
    /// Publisher that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `platform` reject posts.
    pub fn fail_platform(&self, platform: Platform) {
        self.failing.lock().insert(platform);
    }

    /// Let `platform` accept posts again.
    pub fn heal_platform(&self, platform: Platform) {
        self.failing.lock().remove(&platform);
    }

    /// Toggle a full outage: every call returns [`PublisherError::Unavailable`].
    pub fn set_outage(&self, down: bool) {
        self.outage.store(down, Ordering::SeqCst);
    }

    /// Sleep for `latency` on every call.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock() = latency;
    }

    /// Calls observed so far.
    pub fn calls(&self) -> Vec<PublishCall> {
        self.calls.lock().clone()
    }

    /// Number of calls observed so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Publisher for ScriptedPublisher {
    async fn publish(
        &self,
        content: &PublishContent,
        platforms: &[Platform],
        options: &PublishOptions,
    ) -> Result<PublishOutcome, PublisherError> {
        self.calls.lock().push(PublishCall {
            content_id: content.content_id.clone(),
            tenant_id: options.tenant_id.clone(),
            action: options.action,
            platforms: platforms.to_vec(),
            texts: platforms
                .iter()
                .map(|p| (*p, content.text_for(*p).to_string()))
                .collect(),
        });

        let latency = *self.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.outage.load(Ordering::SeqCst) {
            return Err(PublisherError::Unavailable("scripted outage".into()));
        }

        let failing = self.failing.lock().clone();
        let results = platforms
            .iter()
            .map(|p| {
                if failing.contains(p) {
                    PlatformResult::failed(*p, format!("{p} rejected the post"))
                } else {
                    let n = self.next_post.fetch_add(1, Ordering::SeqCst);
                    PlatformResult::ok(*p, format!("{p}-{n}"))
                }
            })
            .collect();
        Ok(PublishOutcome::from_results(results))
    }
}
