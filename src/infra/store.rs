//! In-memory content store.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::intelligence::ContentItem;
use crate::orchestrator::{ContentStore, PublishRecord, StoreError};

/// Default number of publish records retained.
pub const DEFAULT_RECORD_CAPACITY: usize = 10_000;

/// Content store for development and testing.
///
/// Records are kept in a bounded log; the oldest record is evicted once the
/// log is full.
#[derive(Debug)]
pub struct InMemoryContentStore {
    items: Mutex<HashMap<String, ContentItem>>,
    records: Mutex<VecDeque<PublishRecord>>,
    record_capacity: usize,
    fail_writes: AtomicBool,
}

impl Default for InMemoryContentStore {
    fn default() -> Self {
        Self::new(DEFAULT_RECORD_CAPACITY)
    }
}

impl InMemoryContentStore {
    /// Empty store retaining up to `record_capacity` records.
    pub fn new(record_capacity: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            records: Mutex::new(VecDeque::new()),
            record_capacity: record_capacity.max(1),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Add or replace a calendar entry.
    pub fn insert_item(&self, item: ContentItem) {
        self.items.lock().insert(item.id.clone(), item);
    }

    /// Remove a calendar entry.
    pub fn remove_item(&self, id: &str) -> Option<ContentItem> {
        self.items.lock().remove(id)
    }

    /// Every retained record, oldest first.
    pub fn records(&self) -> Vec<PublishRecord> {
        self.records.lock().iter().cloned().collect()
    }

    /// Retained records for one calendar entry.
    pub fn records_for(&self, content_id: &str) -> Vec<PublishRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.content_id == content_id)
            .cloned()
            .collect()
    }

    /// Number of retained records.
    pub fn record_count(&self) -> usize {
        self.records.lock().len()
    }

    /// Make record writes fail until switched off.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ContentStore for InMemoryContentStore {
    async fn get_content_item(&self, id: &str) -> Result<Option<ContentItem>, StoreError> {
        Ok(self.items.lock().get(id).cloned())
    }

    async fn insert_publish_record(&self, record: &PublishRecord) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("record log unavailable".into()));
        }
        let mut records = self.records.lock();
        while records.len() >= self.record_capacity {
            records.pop_front();
        }
        records.push_back(record.clone());
        Ok(())
    }
}
