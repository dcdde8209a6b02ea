//! Single-parameter modification with isolation guarantees.
//!
//! [`apply_modification`] is the diff-engine entry point: it sets exactly
//! one path on the targeted scenes, leaves every other path of every scene
//! byte-identical, and reports which scenes' parameter hashes changed.

use reelforge_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::params::hash::hash_params;
use crate::params::{ParamPath, ParamValue};
use crate::storyboard::Storyboard;

/// A request to change one parameter on one or more scenes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModificationRequest {
    /// The parameter to change.
    pub path: ParamPath,
    /// The new value.
    pub value: ParamValue,
    /// Target scene numbers; empty means all scenes.
    #[serde(default)]
    pub scenes: Vec<u32>,
}

/// Outcome of a parameter modification.
///
/// `modified_scenes` lists the scenes whose parameter hash changed;
/// `regenerated_scenes` lists the scenes whose artifacts must be recomputed.
/// The two are identical today but kept distinct so a future cross-scene
/// dependency rule could diverge them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModificationResult {
    /// Scene numbers whose parameter hash changed.
    pub modified_scenes: Vec<u32>,
    /// Scene numbers whose artifacts must be regenerated.
    pub regenerated_scenes: Vec<u32>,
}

impl ModificationResult {
    /// True when no scene's hash changed (e.g. the value was already set).
    pub fn is_noop(&self) -> bool {
        self.regenerated_scenes.is_empty()
    }
}

/// Apply a single parameter change to a storyboard in place.
///
/// Validation happens before any mutation: an unknown target scene or a
/// domain-violating value rejects the request and leaves the storyboard
/// untouched. Targeted scenes whose value already matches keep their hash
/// and stay out of the regeneration set; untargeted scenes are never
/// rebuilt, so their artifacts remain trivially reusable.
pub fn apply_modification(
    storyboard: &mut Storyboard,
    request: &ModificationRequest,
) -> Result<ModificationResult> {
    request.path.check_value(&request.value)?;

    for &number in &request.scenes {
        if storyboard.scene(number).is_none() {
            return Err(Error::validation(format!(
                "scene {number} does not exist in this storyboard"
            )));
        }
    }

    let target_all = request.scenes.is_empty();
    let mut result = ModificationResult::default();

    for scene in &mut storyboard.scenes {
        if !target_all && !request.scenes.contains(&scene.scene_number) {
            continue;
        }

        let old_hash = hash_params(&scene.params);
        request.path.set(&mut scene.params, &request.value)?;
        let new_hash = hash_params(&scene.params);

        if new_hash != old_hash {
            result.modified_scenes.push(scene.scene_number);
            result.regenerated_scenes.push(scene.scene_number);
        }
    }

    Ok(result)
}
