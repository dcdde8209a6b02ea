//! Post-completion parameter edits.
//!
//! The regeneration coordinator is the only path that re-enters the
//! pipeline after a job completes. It applies a single-parameter change to
//! the stored storyboard, re-renders exactly the scenes whose parameter
//! hash changed (every other scene comes back from the cache untouched),
//! and re-assembles the full video under a new run identity. The previous
//! runs stay on the job's history.

use std::sync::Arc;

use reelforge_common::{Error, JobId, Result, RunId};
use tracing::{error, info};

use crate::job::{progress, JobError, JobStage};
use crate::params::{apply_modification, ModificationRequest, ModificationResult};
use crate::pipeline::Pipeline;
use crate::stages::StageFailure;
use crate::storyboard::Storyboard;

/// Applies parameter edits to completed jobs and re-runs what changed.
pub struct RegenerationCoordinator {
    pipeline: Arc<Pipeline>,
}

impl RegenerationCoordinator {
    /// Build a coordinator over the shared pipeline.
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Apply one parameter change and regenerate the affected scenes.
    ///
    /// Only completed jobs accept edits. A change that leaves every targeted
    /// scene's hash unchanged is a no-op: the job stays `complete` and no
    /// service is called. Otherwise the job re-enters `frame-generation`,
    /// and this call resolves once the new run reaches a terminal stage.
    pub async fn modify(
        &self,
        job_id: JobId,
        request: &ModificationRequest,
    ) -> Result<ModificationResult> {
        let registry = self.pipeline.registry();
        let handle = registry
            .get(job_id)
            .ok_or_else(|| Error::not_found(format!("job {job_id} not found")))?;

        let (result, storyboard) = {
            let mut job = handle.write().await;
            if job.stage != JobStage::Complete {
                return Err(Error::conflict(format!(
                    "job {job_id} is {}; parameters can only be modified once complete",
                    job.stage
                )));
            }
            let Some(storyboard) = job.storyboard.as_mut() else {
                return Err(Error::conflict(format!(
                    "job {job_id} has no storyboard to modify"
                )));
            };

            let result = apply_modification(storyboard, request)?;
            if result.is_noop() {
                info!(job_id = %job_id, path = %request.path, "Modification is a no-op");
                return Ok(result);
            }

            let storyboard = storyboard.clone();
            job.begin_run(
                progress::PLANNED,
                format!("Regenerating {} scene(s)", result.regenerated_scenes.len()),
            );
            (result, storyboard)
        };

        info!(
            job_id = %job_id,
            path = %request.path,
            scenes = ?result.regenerated_scenes,
            "Regenerating after parameter change"
        );

        match self.regenerate(job_id, &storyboard).await {
            Ok(()) => Ok(result),
            Err(failure) => {
                error!(job_id = %job_id, error = %failure, "Regeneration failed");
                let retryable = failure.is_retryable();
                let message = failure.to_string();
                registry
                    .update(job_id, |job| job.fail(JobError::from(&failure)))
                    .await;
                Err(Error::pipeline(failure.stage, message, retryable))
            }
        }
    }

    async fn regenerate(
        &self,
        job_id: JobId,
        storyboard: &Storyboard,
    ) -> std::result::Result<(), StageFailure> {
        // Unchanged scenes resolve as cache hits; only changed hashes render.
        let Some(artifacts) = self
            .pipeline
            .render_scenes(job_id, &storyboard.scenes, storyboard.aspect_ratio)
            .await?
        else {
            return Ok(());
        };

        let registry = self.pipeline.registry();
        let live = registry
            .update(job_id, |job| {
                job.scene_artifacts = artifacts.clone();
                job.advance(
                    JobStage::Compositing,
                    progress::COMPOSITING,
                    "Compositing video",
                );
            })
            .await;
        if !live {
            return Ok(());
        }

        let run_id = RunId::new();
        let video = self
            .pipeline
            .assemble_run(run_id, storyboard, &artifacts)
            .await?;

        registry
            .update(job_id, |job| job.complete_run(run_id, video.clone()))
            .await;
        Ok(())
    }
}
