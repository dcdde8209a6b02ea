//! The studio facade: the crate's public entry point.
//!
//! [`Studio`] owns the registry, the artifact cache, the pipeline and the
//! regeneration coordinator, and exposes the five operations callers use:
//! submit a brief, poll status, fetch the result, read the planned
//! parameters, and modify one parameter after completion.

use std::sync::Arc;

use reelforge_common::{Error, JobId, Result};
use tracing::info;

use crate::cache::{ArtifactStore, InMemoryArtifactCache};
use crate::config::Config;
use crate::job::{Job, JobResult, JobStatus};
use crate::params::{ModificationRequest, ModificationResult, ParamPath, ParamValue};
use crate::pipeline::{Pipeline, StageServices};
use crate::regen::RegenerationCoordinator;
use crate::registry::JobRegistry;
use crate::storyboard::{Brief, Storyboard};

/// Facade over the whole orchestration core.
pub struct Studio {
    pipeline: Arc<Pipeline>,
    coordinator: RegenerationCoordinator,
}

impl Studio {
    /// Build a studio with an in-memory artifact cache.
    pub fn new(services: StageServices, config: Config) -> Self {
        Self::with_cache(services, config, Arc::new(InMemoryArtifactCache::new()))
    }

    /// Build a studio over a caller-provided artifact store.
    pub fn with_cache(
        services: StageServices,
        config: Config,
        cache: Arc<dyn ArtifactStore>,
    ) -> Self {
        let registry = Arc::new(JobRegistry::new());
        let pipeline = Arc::new(Pipeline::new(registry, cache, services, config.pipeline));
        Self {
            coordinator: RegenerationCoordinator::new(pipeline.clone()),
            pipeline,
        }
    }

    /// Validate a brief and start a job for it.
    ///
    /// Returns immediately with the job id; the pipeline runs on a spawned
    /// task and progress is observable through [`Studio::get_status`].
    pub async fn create_job(&self, brief: Brief) -> Result<JobId> {
        brief.validate()?;

        let id = self.pipeline.registry().insert(Job::new(brief));
        info!(job_id = %id, "Job created");

        let pipeline = self.pipeline.clone();
        tokio::spawn(async move {
            pipeline.run(id).await;
        });

        Ok(id)
    }

    /// Current stage, progress and message of a job.
    pub async fn get_status(&self, id: JobId) -> Result<JobStatus> {
        self.pipeline
            .registry()
            .snapshot(id)
            .await
            .ok_or_else(|| Error::not_found(format!("job {id} not found")))
    }

    /// Final outcome of a terminal job.
    ///
    /// Polling a job that is still running is a conflict; callers should
    /// watch [`Studio::get_status`] until the stage is terminal.
    pub async fn get_result(&self, id: JobId) -> Result<JobResult> {
        let handle = self
            .pipeline
            .registry()
            .get(id)
            .ok_or_else(|| Error::not_found(format!("job {id} not found")))?;
        let job = handle.read().await;
        if !job.stage.is_terminal() {
            return Err(Error::conflict(format!(
                "job {id} is {}; result is not available yet",
                job.stage
            )));
        }
        Ok(job.result())
    }

    /// The planned storyboard with each scene's current parameters.
    pub async fn get_parameters(&self, id: JobId) -> Result<Storyboard> {
        let handle = self
            .pipeline
            .registry()
            .get(id)
            .ok_or_else(|| Error::not_found(format!("job {id} not found")))?;
        let job = handle.read().await;
        job.storyboard.clone().ok_or_else(|| {
            Error::conflict(format!("job {id} is {}; no storyboard planned yet", job.stage))
        })
    }

    /// Change one parameter on a completed job and regenerate what changed.
    ///
    /// `path` is the dotted parameter name (e.g. `lighting.style`); an empty
    /// `scenes` list targets every scene. Resolves once the regenerated
    /// video is ready.
    pub async fn modify_parameter(
        &self,
        id: JobId,
        path: &str,
        value: ParamValue,
        scenes: Vec<u32>,
    ) -> Result<ModificationResult> {
        let request = ModificationRequest {
            path: path.parse::<ParamPath>()?,
            value,
            scenes,
        };
        self.coordinator.modify(id, &request).await
    }

    /// Cancel a job. Returns true if it was still registered.
    ///
    /// A running pipeline task notices the eviction at its next state write
    /// and abandons the run.
    pub fn cancel_job(&self, id: JobId) -> bool {
        let removed = self.pipeline.registry().remove(id);
        if removed {
            info!(job_id = %id, "Job cancelled");
        }
        removed
    }

    /// Number of registered jobs.
    pub fn job_count(&self) -> usize {
        self.pipeline.registry().len()
    }
}
