//! Brief, scene, and storyboard model types.
//!
//! A [`Brief`] is what the client submits; the planning service turns it
//! into a [`Storyboard`] of 3-5 [`Scene`]s. Scene visuals live in
//! [`SceneParameters`], the unit the hash/diff engine operates on.
//!
//! [`Storyboard::validate`] enforces the planning-output invariants at the
//! boundary between the planning service and the rest of the core.

use reelforge_common::{
    AspectRatio, CameraAngle, Error, LightingStyle, Result, SubjectPosition, Transition,
};
use serde::{Deserialize, Serialize};

/// Minimum number of scenes a storyboard may contain.
pub const MIN_SCENES: usize = 3;
/// Maximum number of scenes a storyboard may contain.
pub const MAX_SCENES: usize = 5;
/// Allowed deviation between the scene duration sum and the declared total.
pub const DURATION_TOLERANCE: f64 = 0.1;

/// Minimum video duration in seconds a brief may request.
pub const MIN_DURATION_SECS: u32 = 5;
/// Maximum video duration in seconds a brief may request.
pub const MAX_DURATION_SECS: u32 = 12;
/// Default video duration when the brief does not specify one.
pub const DEFAULT_DURATION_SECS: u32 = 8;

/// Client input for video generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brief {
    /// Brand name.
    pub brand_name: String,
    /// Product name.
    pub product_name: String,
    /// Product description used to steer the storyboard.
    pub product_description: String,
    /// Requested video duration in seconds (5-12).
    #[serde(default = "default_duration")]
    pub duration_secs: u32,
    /// Output aspect ratio.
    #[serde(default)]
    pub aspect_ratio: AspectRatio,
    /// Optional product image URL used as a rendering reference.
    #[serde(default)]
    pub product_image_url: Option<String>,
}

fn default_duration() -> u32 {
    DEFAULT_DURATION_SECS
}

impl Brief {
    /// Validate the brief before a job is created for it.
    pub fn validate(&self) -> Result<()> {
        if self.brand_name.trim().is_empty() {
            return Err(Error::validation("brand_name must not be empty"));
        }
        if self.product_name.trim().is_empty() {
            return Err(Error::validation("product_name must not be empty"));
        }
        if self.product_description.trim().is_empty() {
            return Err(Error::validation("product_description must not be empty"));
        }
        if !(MIN_DURATION_SECS..=MAX_DURATION_SECS).contains(&self.duration_secs) {
            return Err(Error::validation(format!(
                "duration must be between {MIN_DURATION_SECS} and {MAX_DURATION_SECS} seconds, got {}",
                self.duration_secs
            )));
        }
        Ok(())
    }
}

/// Camera sub-record of a scene's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraParams {
    /// Camera angle (closed vocabulary).
    pub angle: CameraAngle,
    /// Shot type description (free text, e.g. "macro product shot").
    pub shot_type: String,
}

/// Lighting sub-record of a scene's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightingParams {
    /// Lighting style (closed vocabulary).
    pub style: LightingStyle,
    /// Light direction (free text, e.g. "from the left").
    pub direction: String,
    /// Light intensity (free text, e.g. "high").
    pub intensity: String,
}

/// Composition sub-record of a scene's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositionParams {
    /// Subject position within the frame (closed vocabulary).
    pub subject_position: SubjectPosition,
    /// Background description (free text).
    pub background: String,
    /// Depth of field (free text, e.g. "shallow").
    pub depth_of_field: String,
}

/// Style sub-record of a scene's parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleParams {
    /// Ordered hex color palette (`#rrggbb` entries).
    pub color_palette: Vec<String>,
    /// Dominant material (free text, e.g. "brushed steel").
    pub material: String,
    /// Emotional mood (free text).
    pub mood: String,
    /// Overall aesthetic (free text, e.g. "minimalist").
    pub aesthetic: String,
}

/// The full visual parameter set of one scene.
///
/// This is the value the parameter hash digests and the modification engine
/// mutates path-by-path. Duration and transition are scene attributes, not
/// parameters: they affect assembly, not rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneParameters {
    /// Detailed scene description sent to the rendering service.
    pub scene_description: String,
    /// Camera parameters.
    pub camera: CameraParams,
    /// Lighting parameters.
    pub lighting: LightingParams,
    /// Composition parameters.
    pub composition: CompositionParams,
    /// Style parameters.
    pub style: StyleParams,
}

/// A single scene in the storyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Scene number (1-indexed, contiguous within a job).
    pub scene_number: u32,
    /// Scene duration in seconds (> 0).
    pub duration_secs: f64,
    /// Transition effect to the next scene.
    pub transition: Transition,
    /// The scene's visual parameters.
    pub params: SceneParameters,
}

/// Complete storyboard produced by the planning service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Storyboard {
    /// Brand name.
    pub brand_name: String,
    /// Product name.
    pub product_name: String,
    /// Declared total video duration in seconds.
    pub total_duration_secs: u32,
    /// Output aspect ratio.
    pub aspect_ratio: AspectRatio,
    /// Ordered scene list (3-5 scenes).
    pub scenes: Vec<Scene>,
}

impl Storyboard {
    /// Validate the planning-output invariants.
    ///
    /// Checks scene count bounds, 1-indexed contiguous numbering, positive
    /// per-scene durations, and that the durations sum to the declared total
    /// within [`DURATION_TOLERANCE`]. Violations are pipeline errors: the
    /// planning service produced output the rest of the core must not accept.
    pub fn validate(&self) -> Result<()> {
        if self.scenes.len() < MIN_SCENES || self.scenes.len() > MAX_SCENES {
            return Err(Error::pipeline(
                "storyboard",
                format!(
                    "storyboard must contain {MIN_SCENES}-{MAX_SCENES} scenes, got {}",
                    self.scenes.len()
                ),
                false,
            ));
        }

        for (index, scene) in self.scenes.iter().enumerate() {
            let expected = index as u32 + 1;
            if scene.scene_number != expected {
                return Err(Error::pipeline(
                    "storyboard",
                    format!(
                        "scene numbers must be contiguous from 1: expected {expected}, got {}",
                        scene.scene_number
                    ),
                    false,
                ));
            }
            if scene.duration_secs <= 0.0 {
                return Err(Error::pipeline(
                    "storyboard",
                    format!("scene {} has non-positive duration", scene.scene_number),
                    false,
                ));
            }
        }

        let sum: f64 = self.scenes.iter().map(|s| s.duration_secs).sum();
        let declared = f64::from(self.total_duration_secs);
        if (sum - declared).abs() > DURATION_TOLERANCE {
            return Err(Error::pipeline(
                "storyboard",
                format!(
                    "scene durations sum to {sum:.2}s but the storyboard declares {declared:.1}s"
                ),
                false,
            ));
        }

        Ok(())
    }

    /// Look up a scene by its number.
    pub fn scene(&self, scene_number: u32) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.scene_number == scene_number)
    }
}
