//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which wires a [`Studio`] to scriptable mock
//! stage services, plus helpers for polling a job to a terminal stage.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use async_trait::async_trait;

use reelforge::cache::Artifact;
use reelforge::common::{
    AspectRatio, CameraAngle, JobId, LightingStyle, SubjectPosition, Transition,
};
use reelforge::config::Config;
use reelforge::job::{JobStage, JobStatus};
use reelforge::pipeline::StageServices;
use reelforge::stages::{
    AssemblyRequest, AssemblyService, PlanningService, RenderingService, ServiceError,
};
use reelforge::storyboard::{
    Brief, CameraParams, CompositionParams, LightingParams, Scene, SceneParameters, Storyboard,
    StyleParams,
};
use reelforge::Studio;

static TRACING: Once = Once::new();

/// Install a test subscriber once per binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

/// A brief that passes validation.
pub fn sample_brief() -> Brief {
    Brief {
        brand_name: "Acme".to_string(),
        product_name: "Rocket Mug".to_string(),
        product_description: "A mug that keeps coffee hot for 12 hours".to_string(),
        duration_secs: 8,
        aspect_ratio: AspectRatio::Portrait,
        product_image_url: None,
    }
}

fn scene_params(description: &str) -> SceneParameters {
    SceneParameters {
        scene_description: description.to_string(),
        camera: CameraParams {
            angle: CameraAngle::CloseUp,
            shot_type: "product shot".to_string(),
        },
        lighting: LightingParams {
            style: LightingStyle::Studio,
            direction: "front".to_string(),
            intensity: "medium".to_string(),
        },
        composition: CompositionParams {
            subject_position: SubjectPosition::Center,
            background: "seamless white".to_string(),
            depth_of_field: "shallow".to_string(),
        },
        style: StyleParams {
            color_palette: vec!["#101820".to_string(), "#f2aa4c".to_string()],
            material: "matte ceramic".to_string(),
            mood: "confident".to_string(),
            aesthetic: "minimalist".to_string(),
        },
    }
}

/// Planning mock: returns a deterministic storyboard with `scenes` scenes.
pub struct MockPlanner {
    pub scenes: usize,
    pub calls: AtomicU32,
    /// Errors consumed one per call before a success.
    pub failures: Mutex<Vec<ServiceError>>,
}

impl MockPlanner {
    pub fn new(scenes: usize) -> Self {
        Self {
            scenes,
            calls: AtomicU32::new(0),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_with(&self, errors: Vec<ServiceError>) {
        *self.failures.lock().unwrap() = errors;
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlanningService for MockPlanner {
    async fn plan(&self, brief: &Brief) -> Result<Storyboard, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(error) = self.failures.lock().unwrap().pop() {
            return Err(error);
        }

        let per_scene = f64::from(brief.duration_secs) / self.scenes as f64;
        let scenes = (1..=self.scenes as u32)
            .map(|n| Scene {
                scene_number: n,
                duration_secs: per_scene,
                transition: Transition::Fade,
                params: scene_params(&format!("{} scene {n}", brief.product_name)),
            })
            .collect();

        Ok(Storyboard {
            brand_name: brief.brand_name.clone(),
            product_name: brief.product_name.clone(),
            total_duration_secs: brief.duration_secs,
            aspect_ratio: brief.aspect_ratio,
            scenes,
        })
    }
}

/// Rendering mock: scriptable per-scene failures, consumed one per attempt.
pub struct MockRenderer {
    pub calls: AtomicU32,
    failures: Mutex<HashMap<u32, Vec<ServiceError>>>,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures: Mutex::new(HashMap::new()),
        }
    }

    /// Queue failures for one scene; later attempts succeed once drained.
    pub fn fail_scene(&self, scene_number: u32, errors: Vec<ServiceError>) {
        self.failures.lock().unwrap().insert(scene_number, errors);
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderingService for MockRenderer {
    async fn render(
        &self,
        scene: &Scene,
        aspect_ratio: AspectRatio,
    ) -> Result<Artifact, ServiceError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(queue) = self.failures.lock().unwrap().get_mut(&scene.scene_number) {
            if !queue.is_empty() {
                return Err(queue.remove(0));
            }
        }
        let (width, height) = aspect_ratio.dimensions();
        Ok(Artifact::new(format!(
            "frames/{}-{}x{}-{}.png",
            scene.scene_number, width, height, call
        )))
    }
}

/// Assembly mock: records the requests it receives.
pub struct MockAssembler {
    pub calls: AtomicU32,
    pub requests: Mutex<Vec<AssemblyRequest>>,
    pub failures: Mutex<Vec<ServiceError>>,
}

impl MockAssembler {
    pub fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
            requests: Mutex::new(Vec::new()),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_with(&self, errors: Vec<ServiceError>) {
        *self.failures.lock().unwrap() = errors;
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AssemblyService for MockAssembler {
    async fn assemble(&self, request: &AssemblyRequest) -> Result<Artifact, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        if let Some(error) = self.failures.lock().unwrap().pop() {
            return Err(error);
        }
        Ok(Artifact::new(format!("videos/{}.mp4", request.run_id)))
    }
}

/// Test harness wrapping a [`Studio`] backed by the three mocks.
pub struct TestHarness {
    pub studio: Studio,
    pub planner: Arc<MockPlanner>,
    pub renderer: Arc<MockRenderer>,
    pub assembler: Arc<MockAssembler>,
}

impl TestHarness {
    /// Harness with a 4-scene planner and millisecond backoff.
    pub fn new() -> Self {
        Self::with_scenes(4)
    }

    pub fn with_scenes(scenes: usize) -> Self {
        init_tracing();

        let planner = Arc::new(MockPlanner::new(scenes));
        let renderer = Arc::new(MockRenderer::new());
        let assembler = Arc::new(MockAssembler::new());

        let mut config = Config::default();
        config.pipeline.backoff_base_ms = 1;
        config.pipeline.backoff_max_ms = 4;

        let studio = Studio::new(
            StageServices {
                planning: planner.clone(),
                rendering: renderer.clone(),
                assembly: assembler.clone(),
            },
            config,
        );

        Self {
            studio,
            planner,
            renderer,
            assembler,
        }
    }

    /// Poll a job until it reaches a terminal stage.
    pub async fn wait_terminal(&self, id: JobId) -> JobStatus {
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            let status = self
                .studio
                .get_status(id)
                .await
                .expect("job disappeared while polling");
            if status.stage.is_terminal() {
                return status;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "job {id} did not reach a terminal stage in time (last: {status:?})"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    /// Submit the sample brief and wait for the first run to finish.
    pub async fn completed_job(&self) -> JobId {
        let id = self
            .studio
            .create_job(sample_brief())
            .await
            .expect("brief should validate");
        let status = self.wait_terminal(id).await;
        assert_eq!(
            status.stage,
            JobStage::Complete,
            "first run failed: {status:?}"
        );
        id
    }
}
