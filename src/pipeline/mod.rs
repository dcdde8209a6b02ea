//! The per-job pipeline: planning, frame generation, compositing.
//!
//! One pipeline run drives one job from `queued` to a terminal stage. Every
//! external call goes through the uniform retry layer; scene renders are
//! consulted against the artifact cache first and fanned out with bounded
//! concurrency. The run owns no state of its own: all observable progress
//! lives in the registry, and an evicted job makes the run stop at its next
//! state write.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use reelforge_common::{AspectRatio, JobId, RunId};
use tracing::{debug, error, info};

use crate::cache::{Artifact, ArtifactStore};
use crate::config::PipelineConfig;
use crate::job::{progress, JobError, JobStage};
use crate::params::hash_params;
use crate::registry::JobRegistry;
use crate::stages::{
    run_with_retry, AssemblyClip, AssemblyRequest, AssemblyService, PlanningService,
    RenderingService, ServiceError, StageFailure,
};
use crate::storyboard::{Scene, Storyboard};

/// The external collaborators the pipeline calls into.
#[derive(Clone)]
pub struct StageServices {
    /// Storyboard generator.
    pub planning: Arc<dyn PlanningService>,
    /// Per-scene frame renderer.
    pub rendering: Arc<dyn RenderingService>,
    /// Final video compositor.
    pub assembly: Arc<dyn AssemblyService>,
}

/// Drives jobs through the three stages.
pub struct Pipeline {
    registry: Arc<JobRegistry>,
    cache: Arc<dyn ArtifactStore>,
    services: StageServices,
    config: PipelineConfig,
}

impl Pipeline {
    /// Build a pipeline over shared registry and cache.
    pub fn new(
        registry: Arc<JobRegistry>,
        cache: Arc<dyn ArtifactStore>,
        services: StageServices,
        config: PipelineConfig,
    ) -> Self {
        Self {
            registry,
            cache,
            services,
            config,
        }
    }

    /// Shared job registry this pipeline writes to.
    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.registry
    }

    /// Run a queued job to a terminal stage.
    ///
    /// Errors are recorded on the job rather than returned; a job evicted
    /// mid-run is abandoned silently.
    pub async fn run(&self, job_id: JobId) {
        if let Err(failure) = self.execute(job_id).await {
            error!(job_id = %job_id, error = %failure, "Pipeline run failed");
            self.registry
                .update(job_id, |job| job.fail(JobError::from(&failure)))
                .await;
        }
    }

    async fn execute(&self, job_id: JobId) -> Result<(), StageFailure> {
        let Some(handle) = self.registry.get(job_id) else {
            return Ok(());
        };
        let brief = handle.read().await.brief.clone();
        drop(handle);

        let live = self
            .registry
            .update(job_id, |job| {
                job.advance(
                    JobStage::Storyboard,
                    progress::STORYBOARD,
                    "Generating storyboard",
                );
            })
            .await;
        if !live {
            return Ok(());
        }

        info!(
            job_id = %job_id,
            brand = %brief.brand_name,
            product = %brief.product_name,
            "Planning storyboard"
        );

        let policy = self.config.retry_policy();
        let storyboard =
            run_with_retry(&policy, "storyboard", || self.services.planning.plan(&brief)).await?;
        storyboard.validate().map_err(|e| StageFailure {
            stage: "storyboard",
            attempts: 1,
            error: ServiceError::invalid_request(e.to_string()),
        })?;

        let total = storyboard.scenes.len();
        let live = self
            .registry
            .update(job_id, |job| {
                job.storyboard = Some(storyboard.clone());
                job.advance(
                    JobStage::FrameGeneration,
                    progress::PLANNED,
                    format!("Rendering {total} scenes"),
                );
            })
            .await;
        if !live {
            return Ok(());
        }

        let Some(artifacts) = self
            .render_scenes(job_id, &storyboard.scenes, storyboard.aspect_ratio)
            .await?
        else {
            return Ok(());
        };

        let live = self
            .registry
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
        let video = self.assemble_run(run_id, &storyboard, &artifacts).await?;

        info!(job_id = %job_id, run_id = %run_id, location = %video.location, "Job complete");
        self.registry
            .update(job_id, |job| job.complete_run(run_id, video.clone()))
            .await;
        Ok(())
    }

    /// Render artifacts for the given scenes, reusing cached frames.
    ///
    /// Cache hits count towards progress without a render call. Misses are
    /// rendered with bounded fan-out and written back to the cache as they
    /// finish. Returns `None` when the job was evicted mid-stage.
    pub(crate) async fn render_scenes(
        &self,
        job_id: JobId,
        scenes: &[Scene],
        aspect_ratio: AspectRatio,
    ) -> Result<Option<BTreeMap<u32, Artifact>>, StageFailure> {
        let total = scenes.len();
        let done = AtomicUsize::new(0);
        let mut artifacts = BTreeMap::new();
        let mut pending = Vec::new();

        for scene in scenes {
            let hash = hash_params(&scene.params);
            match self.cache.get(scene.scene_number, &hash) {
                Some(artifact) => {
                    debug!(
                        job_id = %job_id,
                        scene = scene.scene_number,
                        "Reusing cached frame"
                    );
                    done.fetch_add(1, Ordering::SeqCst);
                    artifacts.insert(scene.scene_number, artifact);
                }
                // Owned copies keep the render futures free of slice
                // lifetimes, so the whole run can live on a spawned task.
                None => pending.push((scene.clone(), hash)),
            }
        }

        let policy = self.config.retry_policy();
        let done = &done;
        let mut renders = stream::iter(pending.into_iter().map(|(scene, hash)| {
            let policy = policy.clone();
            async move {
                let artifact = run_with_retry(&policy, "frame-generation", || {
                    self.services.rendering.render(&scene, aspect_ratio)
                })
                .await?;
                self.cache
                    .put(scene.scene_number, hash, artifact.clone());
                let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                Ok::<_, StageFailure>((scene.scene_number, artifact, finished))
            }
        }))
        .buffer_unordered(self.config.fan_out());

        while let Some(result) = renders.next().await {
            let (scene_number, artifact, finished) = result?;
            artifacts.insert(scene_number, artifact);
            let live = self
                .registry
                .update(job_id, |job| {
                    job.advance(
                        JobStage::FrameGeneration,
                        progress::rendering(finished, total),
                        format!("Rendered {finished} of {total} scenes"),
                    );
                })
                .await;
            if !live {
                return Ok(None);
            }
        }

        Ok(Some(artifacts))
    }

    /// Composite one run's clips into a final video.
    pub(crate) async fn assemble_run(
        &self,
        run_id: RunId,
        storyboard: &Storyboard,
        artifacts: &BTreeMap<u32, Artifact>,
    ) -> Result<Artifact, StageFailure> {
        let mut clips = Vec::with_capacity(storyboard.scenes.len());
        for scene in &storyboard.scenes {
            let Some(artifact) = artifacts.get(&scene.scene_number) else {
                return Err(StageFailure {
                    stage: "compositing",
                    attempts: 1,
                    error: ServiceError::invalid_request(format!(
                        "no rendered artifact for scene {}",
                        scene.scene_number
                    )),
                });
            };
            clips.push(AssemblyClip {
                scene_number: scene.scene_number,
                duration_secs: scene.duration_secs,
                transition: scene.transition,
                artifact: artifact.clone(),
            });
        }

        let request = AssemblyRequest {
            run_id,
            aspect_ratio: storyboard.aspect_ratio,
            clips,
        };
        let policy = self.config.retry_policy();
        run_with_retry(&policy, "compositing", || {
            self.services.assembly.assemble(&request)
        })
        .await
    }
}
