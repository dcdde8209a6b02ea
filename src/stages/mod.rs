//! External stage collaborators and the uniform retry layer.
//!
//! Each pipeline stage wraps exactly one external call per unit of work:
//! one [`PlanningService::plan`] per job, one [`RenderingService::render`]
//! per scene needing regeneration, one [`AssemblyService::assemble`] per
//! run. Implementations live outside the core (HTTP clients, subprocess
//! wrappers); the core only sees these traits and the typed
//! [`ServiceError`] classification that drives retries.

pub mod retry;

pub use retry::{run_with_retry, RetryPolicy, StageFailure};

use async_trait::async_trait;
use reelforge_common::{AspectRatio, RunId, Transition};
use serde::{Deserialize, Serialize};

use crate::cache::Artifact;
use crate::storyboard::{Brief, Scene, Storyboard};

/// Classification of an external service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceErrorKind {
    /// The call did not complete in time.
    Timeout,
    /// The service asked us to slow down.
    RateLimited,
    /// The service failed internally (5xx-class).
    Server,
    /// The request never reached the service.
    Network,
    /// Credentials were rejected.
    Unauthorized,
    /// The service rejected the request as malformed.
    InvalidRequest,
}

/// A typed failure from an external stage collaborator.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{kind:?}: {message}")]
pub struct ServiceError {
    /// Failure classification.
    pub kind: ServiceErrorKind,
    /// Service-provided detail.
    pub message: String,
}

impl ServiceError {
    /// Build an error of the given kind.
    pub fn new<S: Into<String>>(kind: ServiceErrorKind, message: S) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// The call timed out.
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::new(ServiceErrorKind::Timeout, message)
    }

    /// The service rate-limited us.
    pub fn rate_limited<S: Into<String>>(message: S) -> Self {
        Self::new(ServiceErrorKind::RateLimited, message)
    }

    /// The service failed internally.
    pub fn server<S: Into<String>>(message: S) -> Self {
        Self::new(ServiceErrorKind::Server, message)
    }

    /// Transport-level failure.
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::new(ServiceErrorKind::Network, message)
    }

    /// Credentials rejected; retrying cannot help.
    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::new(ServiceErrorKind::Unauthorized, message)
    }

    /// Malformed request; retrying cannot help.
    pub fn invalid_request<S: Into<String>>(message: S) -> Self {
        Self::new(ServiceErrorKind::InvalidRequest, message)
    }

    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self.kind,
            ServiceErrorKind::Timeout
                | ServiceErrorKind::RateLimited
                | ServiceErrorKind::Server
                | ServiceErrorKind::Network
        )
    }
}

/// One clip of an assembly request: a rendered artifact plus the scene
/// timing metadata the compositor needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyClip {
    /// Scene number the clip belongs to.
    pub scene_number: u32,
    /// How long the clip plays, in seconds.
    pub duration_secs: f64,
    /// Transition into the next clip.
    pub transition: Transition,
    /// The rendered frame artifact.
    pub artifact: Artifact,
}

/// Input to one assembly call: the full ordered artifact set for a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyRequest {
    /// The run this assembly belongs to (names the output artifact).
    pub run_id: RunId,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Clips ordered by ascending scene number.
    pub clips: Vec<AssemblyClip>,
}

/// Scene planning collaborator (e.g. an LLM storyboard generator).
///
/// Implementations are expected to be cheaply cloneable or wrapped in an
/// `Arc` so they can be shared across job tasks.
#[async_trait]
pub trait PlanningService: Send + Sync {
    /// Plan a storyboard for the brief.
    ///
    /// The returned storyboard is validated by the pipeline against the
    /// scene-count and duration-sum invariants before any rendering starts.
    async fn plan(&self, brief: &Brief) -> Result<Storyboard, ServiceError>;
}

/// Frame rendering collaborator (e.g. a structured-prompt image API).
#[async_trait]
pub trait RenderingService: Send + Sync {
    /// Render one scene's key frame from its resolved parameters.
    async fn render(
        &self,
        scene: &Scene,
        aspect_ratio: AspectRatio,
    ) -> Result<Artifact, ServiceError>;
}

/// Media assembly collaborator (e.g. an ffmpeg wrapper).
#[async_trait]
pub trait AssemblyService: Send + Sync {
    /// Assemble the ordered clips into one final video artifact.
    async fn assemble(&self, request: &AssemblyRequest) -> Result<Artifact, ServiceError>;
}
