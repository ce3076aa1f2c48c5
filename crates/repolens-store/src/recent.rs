//! Bounded, persisted list of recently submitted jobs.
//!
//! Records are write-once: the status captured at submission is never
//! updated afterwards. Callers that want live status re-fetch it at render
//! time instead of trusting the cached value.

use crate::kv::{FileKvStore, KeyValueStore};
use anyhow::Result;
use serde_json::Value;
use repolens_core::{AnalysisJob, RecentJobRecord};

/// Fixed storage key for the list.
pub const RECENT_JOBS_KEY: &str = "repolens.recent_jobs";

pub const MAX_RECENT_JOBS: usize = 5;

/// Prepend `record` and drop the oldest entries beyond the cap.
/// No deduplication: resubmitting a URL adds another entry.
pub fn insert_newest(records: &mut Vec<RecentJobRecord>, record: RecentJobRecord) {
    records.insert(0, record);
    records.truncate(MAX_RECENT_JOBS);
}

pub struct RecentJobs {
    store: Box<dyn KeyValueStore>,
    records: Option<Vec<RecentJobRecord>>,
}

impl RecentJobs {
    /// Wrap a store. Nothing is read until the list is first accessed.
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            records: None,
        }
    }

    /// The cache backed by `store_root/storage.json`.
    pub fn open_default() -> Self {
        Self::new(Box::new(FileKvStore::open_default()))
    }

    /// Newest first, at most [`MAX_RECENT_JOBS`] entries.
    pub fn list(&mut self) -> &[RecentJobRecord] {
        self.loaded()
    }

    /// Record a freshly submitted job and persist the list.
    pub fn record(&mut self, job: &AnalysisJob) -> Result<()> {
        self.record_entry(RecentJobRecord::from_job(job, repolens_core::now_rfc3339()))
    }

    /// Prepend `record` to the list as currently persisted, under the
    /// store's lock, so concurrent submitters never drop each other's entry.
    pub fn record_entry(&mut self, record: RecentJobRecord) -> Result<()> {
        let mut merged = Vec::new();
        self.store.modify(RECENT_JOBS_KEY, &mut |current| {
            let mut records = current.map(records_from_value).unwrap_or_default();
            insert_newest(&mut records, record.clone());
            let value = serde_json::to_value(&records)?;
            merged = records;
            Ok(value)
        })?;
        self.records = Some(merged);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.loaded().clear();
        self.store.remove(RECENT_JOBS_KEY)
    }

    fn loaded(&mut self) -> &mut Vec<RecentJobRecord> {
        if self.records.is_none() {
            self.records = Some(load_records(self.store.as_ref()));
        }
        self.records.get_or_insert_with(Vec::new)
    }
}

/// Read the persisted list. Unreadable or malformed state reads as empty.
fn load_records(store: &dyn KeyValueStore) -> Vec<RecentJobRecord> {
    match store.get(RECENT_JOBS_KEY) {
        Ok(Some(value)) => records_from_value(value),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read recent jobs, starting empty");
            Vec::new()
        }
    }
}

fn records_from_value(value: Value) -> Vec<RecentJobRecord> {
    match serde_json::from_value::<Vec<RecentJobRecord>>(value) {
        Ok(mut records) => {
            records.truncate(MAX_RECENT_JOBS);
            records
        }
        Err(e) => {
            tracing::warn!(error = %e, "recent jobs entry is malformed, starting empty");
            Vec::new()
        }
    }
}
