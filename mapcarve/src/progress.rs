//! In-flight job progress tracking
//!
//! The tracker is the authoritative "is this job running" signal: admission
//! seeds an entry, the owning worker replaces it wholesale as progress lines
//! arrive, and retirement removes it. Updates are last-write-wins whole
//! snapshots; since exactly one worker ever owns a given id, the last write
//! is always the newest one.

use crate::job::{JobId, ProgressSnapshot};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Shared handle to a progress tracker.
pub type SharedProgressTracker = Arc<ProgressTracker>;

/// Concurrent map from job id to its latest progress snapshot.
#[derive(Debug)]
pub struct ProgressTracker {
    entries: RwLock<HashMap<JobId, ProgressSnapshot>>,
}

impl ProgressTracker {
    /// Creates a new shared tracker.
    pub fn new() -> SharedProgressTracker {
        Arc::new(Self {
            entries: RwLock::new(HashMap::new()),
        })
    }

    /// Inserts or replaces the snapshot for a job.
    pub fn set(&self, id: &JobId, snapshot: ProgressSnapshot) {
        self.entries.write().unwrap().insert(id.clone(), snapshot);
    }

    /// Returns the latest snapshot for a job, if it is in flight.
    pub fn get(&self, id: &JobId) -> Option<ProgressSnapshot> {
        self.entries.read().unwrap().get(id).cloned()
    }

    /// Removes a job's entry, returning the final snapshot it held.
    pub fn remove(&self, id: &JobId) -> Option<ProgressSnapshot> {
        self.entries.write().unwrap().remove(id)
    }

    /// Whether a job is currently tracked.
    pub fn contains(&self, id: &JobId) -> bool {
        self.entries.read().unwrap().contains_key(id)
    }

    /// Number of jobs currently tracked.
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// Whether no jobs are tracked.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
