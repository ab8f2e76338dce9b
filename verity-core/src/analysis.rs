//! # Analysis queue — bounded, most-recent-first submission tracking
//!
//! Holds the last few analysis records keyed by a monotonic submission id.
//! Records are owned exclusively by the queue and transition one way:
//! processing → complete | failed. Completion after eviction is a no-op,
//! as is a second terminal transition (idempotent).

use crate::score::AnalysisVerdict;
use crate::types::{FileDescriptor, MediaKind};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub const FAILURE_REASON_CORRUPT: &str = "Analysis failed - file may be corrupted";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Processing,
    Complete,
    Failed,
}

impl AnalysisStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, AnalysisStatus::Complete | AnalysisStatus::Failed)
    }
}

/// One tracked submission. `reality_score`/`confidence` are only present
/// once the record is complete.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AnalysisRecord {
    pub id: u64,
    pub file_name: String,
    pub media_kind: MediaKind,
    pub status: AnalysisStatus,
    pub reality_score: Option<u8>,
    pub confidence: Option<u8>,
    pub detections: Vec<String>,
    /// Unix timestamp (millis) of submission.
    pub created_at: i64,
}

pub struct AnalysisQueue {
    /// Most-recent-first; eviction truncates the tail (oldest submission).
    records: RwLock<Vec<AnalysisRecord>>,
    capacity: usize,
    next_id: AtomicU64,
    total_submitted: AtomicU64,
    total_completed: AtomicU64,
    total_failed: AtomicU64,
}

impl AnalysisQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: RwLock::new(Vec::with_capacity(capacity.max(1))),
            capacity: capacity.max(1),
            next_id: AtomicU64::new(1),
            total_submitted: AtomicU64::new(0),
            total_completed: AtomicU64::new(0),
            total_failed: AtomicU64::new(0),
        }
    }

    /// Create a processing record at the front of the list. Non-blocking;
    /// the oldest record is evicted once capacity is exceeded.
    pub fn submit(&self, file: &FileDescriptor) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.total_submitted.fetch_add(1, Ordering::Relaxed);
        let record = AnalysisRecord {
            id,
            file_name: file.name.clone(),
            media_kind: file.media_kind,
            status: AnalysisStatus::Processing,
            reality_score: None,
            confidence: None,
            detections: Vec::new(),
            created_at: chrono::Utc::now().timestamp_millis(),
        };

        let mut records = self.records.write();
        records.insert(0, record);
        records.truncate(self.capacity);

        debug!(id = id, file = %file.name, "Analysis submitted");
        id
    }

    /// Attach a verdict to a processing record. Returns false when the
    /// record was evicted or already terminal.
    pub fn complete(&self, id: u64, verdict: AnalysisVerdict) -> bool {
        let mut records = self.records.write();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if record.status.is_terminal() {
            return false;
        }
        record.status = AnalysisStatus::Complete;
        record.reality_score = Some(verdict.reality_score);
        record.confidence = Some(verdict.confidence);
        record.detections = verdict.detections;
        self.total_completed.fetch_add(1, Ordering::Relaxed);
        debug!(id = id, score = verdict.reality_score, "Analysis complete");
        true
    }

    /// Transition a processing record to failed with a single reason label.
    pub fn fail(&self, id: u64, reason: &str) -> bool {
        let mut records = self.records.write();
        let Some(record) = records.iter_mut().find(|r| r.id == id) else {
            return false;
        };
        if record.status.is_terminal() {
            return false;
        }
        record.status = AnalysisStatus::Failed;
        record.detections = vec![reason.to_string()];
        self.total_failed.fetch_add(1, Ordering::Relaxed);
        debug!(id = id, reason = %reason, "Analysis failed");
        true
    }

    /// Snapshot of tracked records, most-recent-first.
    pub fn records(&self) -> Vec<AnalysisRecord> {
        self.records.read().clone()
    }

    pub fn get(&self, id: u64) -> Option<AnalysisRecord> {
        self.records.read().iter().find(|r| r.id == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn total_submitted(&self) -> u64 {
        self.total_submitted.load(Ordering::Relaxed)
    }
    pub fn total_completed(&self) -> u64 {
        self.total_completed.load(Ordering::Relaxed)
    }
    pub fn total_failed(&self) -> u64 {
        self.total_failed.load(Ordering::Relaxed)
    }
}
