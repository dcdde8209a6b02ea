//! Job registry: the only shared mutable state.
//!
//! Each job lives behind its own `RwLock`, so status polls on one job never
//! contend with pipeline writes on another. Removing a job from the map is
//! how cancellation works: the pipeline task notices its next
//! [`JobRegistry::update`] returning `false` and abandons the run.

use std::sync::Arc;

use dashmap::DashMap;
use reelforge_common::JobId;
use tokio::sync::RwLock;

use crate::job::{Job, JobStatus};

/// Concurrent map of live jobs.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: DashMap<JobId, Arc<RwLock<Job>>>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new job, returning its id.
    pub fn insert(&self, job: Job) -> JobId {
        let id = job.id;
        self.jobs.insert(id, Arc::new(RwLock::new(job)));
        id
    }

    /// Handle to a job's lock, if it is still registered.
    pub fn get(&self, id: JobId) -> Option<Arc<RwLock<Job>>> {
        self.jobs.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether the job is still registered.
    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// Evict a job. Returns true if it was registered.
    ///
    /// A pipeline task running for the job will notice on its next state
    /// write and stop.
    pub fn remove(&self, id: JobId) -> bool {
        self.jobs.remove(&id).is_some()
    }

    /// Number of registered jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// True when no jobs are registered.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Cloned status snapshot of a job.
    pub async fn snapshot(&self, id: JobId) -> Option<JobStatus> {
        let job = self.get(id)?;
        let guard = job.read().await;
        Some(guard.status())
    }

    /// Mutate a job under its write lock.
    ///
    /// Returns `false` if the job has been evicted, signalling the caller to
    /// abandon its run.
    pub async fn update<F>(&self, id: JobId, f: F) -> bool
    where
        F: FnOnce(&mut Job),
    {
        let Some(job) = self.get(id) else {
            return false;
        };
        let mut guard = job.write().await;
        f(&mut guard);
        true
    }
}
