//! Collaborators the orchestrator drives: the external publisher and the content store.

use async_trait::async_trait;
use thiserror::Error;

use super::model::{PublishContent, PublishOptions, PublishOutcome, PublishRecord};
use crate::intelligence::ContentItem;
use crate::util::serde::Platform;

/// Failure reported by the external publishing service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PublisherError {
    /// The service could not be reached or returned a server error.
    #[error("publisher unavailable: {0}")]
    Unavailable(String),
    /// The service rejected the post.
    #[error("publisher rejected post: {0}")]
    Rejected(String),
}

/// Failure reported by the content store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backend failure.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// External multi-platform publishing service.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Post `content` to `platforms`.
    async fn publish(
        &self,
        content: &PublishContent,
        platforms: &[Platform],
        options: &PublishOptions,
    ) -> Result<PublishOutcome, PublisherError>;
}

/// Persistence for calendar entries and publish records.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Look up a calendar entry.
    async fn get_content_item(&self, id: &str) -> Result<Option<ContentItem>, StoreError>;

    /// Append a publish record.
    async fn insert_publish_record(&self, record: &PublishRecord) -> Result<(), StoreError>;
}
