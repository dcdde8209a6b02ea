//! Job state: the pipeline state machine's observable fields.
//!
//! A [`Job`] is the per-request record the registry owns. The pipeline task
//! and the regeneration coordinator are its only writers; pollers read
//! cloned [`JobStatus`] snapshots. Progress is derived deterministically
//! from the stage and the fraction of scenes completed, and never moves
//! backwards within a run.

use chrono::{DateTime, Utc};
use reelforge_common::JobId;
use reelforge_common::RunId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::cache::Artifact;
use crate::stages::StageFailure;
use crate::storyboard::{Brief, Storyboard};

/// Pipeline stage of a job.
///
/// Fresh jobs move strictly forward:
/// `queued -> storyboard -> frame-generation -> compositing -> complete`,
/// with `error` reachable from any non-terminal stage. Regeneration runs
/// re-enter at `frame-generation` under a new run identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStage {
    /// Accepted, pipeline task not yet started planning.
    Queued,
    /// Planning service is generating the storyboard.
    Storyboard,
    /// Rendering service is generating per-scene frames.
    FrameGeneration,
    /// Assembly tool is compositing the final video.
    Compositing,
    /// Terminal: final artifact available.
    Complete,
    /// Terminal: a stage failed after retries, or an invariant was violated.
    Error,
}

impl JobStage {
    /// Whether this stage ends the run.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Error)
    }
}

impl std::fmt::Display for JobStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Storyboard => write!(f, "storyboard"),
            Self::FrameGeneration => write!(f, "frame-generation"),
            Self::Compositing => write!(f, "compositing"),
            Self::Complete => write!(f, "complete"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Progress checkpoints per stage. Rendering interpolates between
/// [`progress::PLANNED`] and [`progress::RENDERED`] by scenes completed.
pub mod progress {
    /// Job accepted, nothing started.
    pub const QUEUED: u8 = 0;
    /// Planning call in flight.
    pub const STORYBOARD: u8 = 10;
    /// Storyboard accepted; rendering about to start.
    pub const PLANNED: u8 = 25;
    /// All scene frames rendered.
    pub const RENDERED: u8 = 75;
    /// Assembly call in flight.
    pub const COMPOSITING: u8 = 85;
    /// Final artifact available.
    pub const COMPLETE: u8 = 100;

    /// Rendering progress for `done` of `total` scenes.
    pub fn rendering(done: usize, total: usize) -> u8 {
        if total == 0 {
            return RENDERED;
        }
        let span = u32::from(RENDERED - PLANNED);
        PLANNED + (span * done as u32 / total as u32) as u8
    }
}

/// Terminal failure recorded on a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobError {
    /// User-facing failure description.
    pub message: String,
    /// Whether resubmitting the job could succeed.
    pub retryable: bool,
}

impl From<&StageFailure> for JobError {
    fn from(failure: &StageFailure) -> Self {
        Self {
            message: failure.to_string(),
            retryable: failure.is_retryable(),
        }
    }
}

/// One completed pipeline run and its final artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRun {
    /// Identity of the run.
    pub run_id: RunId,
    /// The final assembled video artifact.
    pub artifact: Artifact,
    /// When the run finished.
    pub completed_at: DateTime<Utc>,
}

/// Snapshot of a job's observable state, returned to pollers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobStatus {
    /// Current stage.
    pub stage: JobStage,
    /// Progress percentage (0-100).
    pub progress: u8,
    /// Human-readable status message.
    pub message: String,
    /// Terminal failure, if the job errored.
    pub error: Option<JobError>,
}

/// Final outcome of a job, returned once polling sees a terminal stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    /// True when the latest run completed.
    pub success: bool,
    /// The latest run's final video artifact.
    pub artifact: Option<Artifact>,
    /// Terminal failure, if the job errored.
    pub error: Option<JobError>,
}

/// One end-to-end video generation job.
///
/// Owned exclusively by the registry; mutated only by the pipeline task and
/// the regeneration coordinator through the registry's per-job lock.
#[derive(Debug, Clone)]
pub struct Job {
    /// Job identity.
    pub id: JobId,
    /// The originating brief.
    pub brief: Brief,
    /// Current pipeline stage.
    pub stage: JobStage,
    /// Progress percentage, monotone within a run.
    pub progress: u8,
    /// Human-readable status message.
    pub message: String,
    /// Storyboard, once planning succeeded.
    pub storyboard: Option<Storyboard>,
    /// Current per-scene rendered artifacts, keyed by scene number.
    pub scene_artifacts: BTreeMap<u32, Artifact>,
    /// Completed runs, oldest first. The last entry is the current result.
    pub runs: Vec<JobRun>,
    /// Terminal failure, if any.
    pub error: Option<JobError>,
}

impl Job {
    /// Create a queued job for a brief.
    pub fn new(brief: Brief) -> Self {
        Self {
            id: JobId::new(),
            brief,
            stage: JobStage::Queued,
            progress: progress::QUEUED,
            message: "Queued".to_string(),
            storyboard: None,
            scene_artifacts: BTreeMap::new(),
            runs: Vec::new(),
            error: None,
        }
    }

    /// Move to a stage and update the status message.
    ///
    /// Progress only ever increases within a run; a stale lower value is
    /// ignored so pollers never observe regressions.
    pub fn advance(&mut self, stage: JobStage, progress: u8, message: impl Into<String>) {
        self.stage = stage;
        self.progress = self.progress.max(progress);
        self.message = message.into();
    }

    /// Reset progress for a regeneration run (new run identity).
    pub fn begin_run(&mut self, progress: u8, message: impl Into<String>) {
        self.stage = JobStage::FrameGeneration;
        self.progress = progress;
        self.message = message.into();
        self.error = None;
    }

    /// Record a terminal failure. Progress freezes where it was.
    pub fn fail(&mut self, error: JobError) {
        self.stage = JobStage::Error;
        self.message = error.message.clone();
        self.error = Some(error);
    }

    /// Record a completed run and its final artifact.
    pub fn complete_run(&mut self, run_id: RunId, artifact: Artifact) {
        self.runs.push(JobRun {
            run_id,
            artifact,
            completed_at: Utc::now(),
        });
        self.stage = JobStage::Complete;
        self.progress = progress::COMPLETE;
        self.message = "Video ready".to_string();
        self.error = None;
    }

    /// Cloned status snapshot for pollers.
    pub fn status(&self) -> JobStatus {
        JobStatus {
            stage: self.stage,
            progress: self.progress,
            message: self.message.clone(),
            error: self.error.clone(),
        }
    }

    /// Final outcome: the latest run's artifact, or the recorded error.
    pub fn result(&self) -> JobResult {
        JobResult {
            success: self.stage == JobStage::Complete,
            artifact: self.runs.last().map(|run| run.artifact.clone()),
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelforge_common::AspectRatio;

    fn brief() -> Brief {
        Brief {
            brand_name: "Acme".to_string(),
            product_name: "Rocket Mug".to_string(),
            product_description: "Keeps coffee hot".to_string(),
            duration_secs: 8,
            aspect_ratio: AspectRatio::Portrait,
            product_image_url: None,
        }
    }

    #[test]
    fn test_new_job_is_queued() {
        let job = Job::new(brief());
        assert_eq!(job.stage, JobStage::Queued);
        assert_eq!(job.progress, 0);
        assert!(job.runs.is_empty());
    }

    #[test]
    fn test_progress_is_monotone() {
        let mut job = Job::new(brief());
        job.advance(JobStage::FrameGeneration, 50, "rendering");
        job.advance(JobStage::FrameGeneration, 40, "stale update");
        assert_eq!(job.progress, 50);
    }

    #[test]
    fn test_rendering_progress_interpolation() {
        assert_eq!(progress::rendering(0, 4), 25);
        assert_eq!(progress::rendering(1, 4), 37);
        assert_eq!(progress::rendering(2, 4), 50);
        assert_eq!(progress::rendering(4, 4), 75);
    }

    #[test]
    fn test_fail_freezes_progress() {
        let mut job = Job::new(brief());
        job.advance(JobStage::FrameGeneration, 50, "rendering");
        job.fail(JobError {
            message: "rendering failed".to_string(),
            retryable: true,
        });
        assert_eq!(job.stage, JobStage::Error);
        assert_eq!(job.progress, 50);
        assert!(job.error.as_ref().unwrap().retryable);
        assert!(!job.result().success);
    }

    #[test]
    fn test_complete_run_keeps_history() {
        let mut job = Job::new(brief());
        let first = RunId::new();
        let second = RunId::new();

        job.complete_run(first, Artifact::new("v1.mp4"));
        assert_eq!(job.progress, 100);
        assert_eq!(job.result().artifact.unwrap().location, "v1.mp4");

        job.begin_run(progress::PLANNED, "Regenerating 1 scene");
        assert_eq!(job.stage, JobStage::FrameGeneration);
        job.complete_run(second, Artifact::new("v2.mp4"));

        assert_eq!(job.runs.len(), 2);
        assert_eq!(job.runs[0].run_id, first);
        assert_eq!(job.runs[0].artifact.location, "v1.mp4");
        assert_eq!(job.result().artifact.unwrap().location, "v2.mp4");
    }

    #[test]
    fn test_terminal_stages() {
        assert!(JobStage::Complete.is_terminal());
        assert!(JobStage::Error.is_terminal());
        assert!(!JobStage::Queued.is_terminal());
        assert!(!JobStage::FrameGeneration.is_terminal());
    }

    #[test]
    fn test_status_snapshot_is_detached() {
        let mut job = Job::new(brief());
        let snapshot = job.status();
        job.advance(JobStage::Storyboard, 10, "planning");
        assert_eq!(snapshot.stage, JobStage::Queued);
        assert_eq!(job.status().stage, JobStage::Storyboard);
    }
}
