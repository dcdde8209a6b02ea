//! Parameter addressing, domains, hashing, and selective modification.
//!
//! Scene parameters are addressed by [`ParamPath`], a closed enum with one
//! variant per addressable field. Dotted-string paths from clients parse
//! into it, so an invalid path is rejected at the boundary instead of being
//! string-matched deep inside the engine.
//!
//! [`hash`] digests one scene's parameter set; [`modify`] applies a single
//! parameter change and reports which scenes need regeneration.

pub mod hash;
pub mod modify;

pub use hash::{diff, hash_params, ParamHash};
pub use modify::{apply_modification, ModificationRequest, ModificationResult};

use reelforge_common::{CameraAngle, Error, LightingStyle, Result, SubjectPosition};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::storyboard::SceneParameters;

/// A parameter value: free text or an ordered list of strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A single text value (enum member, free text, or hex color).
    Text(String),
    /// An ordered list (currently only `style.color_palette`).
    List(Vec<String>),
}

impl ParamValue {
    /// Convenience constructor for text values.
    pub fn text<S: Into<String>>(s: S) -> Self {
        Self::Text(s.into())
    }

    /// Convenience constructor for list values.
    pub fn list<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Canonical string form used by the parameter hash.
    ///
    /// List entries never contain commas (hex colors), so joining is
    /// unambiguous within a path.
    pub fn canonical(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::List(items) => items.join(","),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.canonical())
    }
}

/// Closed enumeration of addressable scene parameter fields.
///
/// One variant per category x field. The canonical order of [`ALL`]
/// (not construction order) drives the parameter hash, which makes hash
/// determinism independent of how a parameter set was assembled.
///
/// [`ALL`]: Self::ALL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ParamPath {
    SceneDescription,
    CameraAngle,
    CameraShotType,
    LightingStyle,
    LightingDirection,
    LightingIntensity,
    CompositionSubjectPosition,
    CompositionBackground,
    CompositionDepthOfField,
    StyleColorPalette,
    StyleMaterial,
    StyleMood,
    StyleAesthetic,
}

impl ParamPath {
    /// Every addressable path, in canonical hash order.
    pub const ALL: [ParamPath; 13] = [
        Self::SceneDescription,
        Self::CameraAngle,
        Self::CameraShotType,
        Self::LightingStyle,
        Self::LightingDirection,
        Self::LightingIntensity,
        Self::CompositionSubjectPosition,
        Self::CompositionBackground,
        Self::CompositionDepthOfField,
        Self::StyleColorPalette,
        Self::StyleMaterial,
        Self::StyleMood,
        Self::StyleAesthetic,
    ];

    /// The dotted wire form of this path.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SceneDescription => "scene_description",
            Self::CameraAngle => "camera.angle",
            Self::CameraShotType => "camera.shot_type",
            Self::LightingStyle => "lighting.style",
            Self::LightingDirection => "lighting.direction",
            Self::LightingIntensity => "lighting.intensity",
            Self::CompositionSubjectPosition => "composition.subject_position",
            Self::CompositionBackground => "composition.background",
            Self::CompositionDepthOfField => "composition.depth_of_field",
            Self::StyleColorPalette => "style.color_palette",
            Self::StyleMaterial => "style.material",
            Self::StyleMood => "style.mood",
            Self::StyleAesthetic => "style.aesthetic",
        }
    }

    /// Read the value at this path from a parameter set.
    pub fn get(self, params: &SceneParameters) -> ParamValue {
        match self {
            Self::SceneDescription => ParamValue::text(&params.scene_description),
            Self::CameraAngle => ParamValue::text(params.camera.angle.to_string()),
            Self::CameraShotType => ParamValue::text(&params.camera.shot_type),
            Self::LightingStyle => ParamValue::text(params.lighting.style.to_string()),
            Self::LightingDirection => ParamValue::text(&params.lighting.direction),
            Self::LightingIntensity => ParamValue::text(&params.lighting.intensity),
            Self::CompositionSubjectPosition => {
                ParamValue::text(params.composition.subject_position.to_string())
            }
            Self::CompositionBackground => ParamValue::text(&params.composition.background),
            Self::CompositionDepthOfField => ParamValue::text(&params.composition.depth_of_field),
            Self::StyleColorPalette => ParamValue::List(params.style.color_palette.clone()),
            Self::StyleMaterial => ParamValue::text(&params.style.material),
            Self::StyleMood => ParamValue::text(&params.style.mood),
            Self::StyleAesthetic => ParamValue::text(&params.style.aesthetic),
        }
    }

    /// Check a value against this path's domain without mutating anything.
    ///
    /// Domains: closed vocabularies for the enum-backed paths, `#rrggbb`
    /// entries for the color palette, non-empty text everywhere else.
    pub fn check_value(self, value: &ParamValue) -> Result<()> {
        match self {
            Self::CameraAngle => {
                self.expect_text(value)?.parse::<CameraAngle>()?;
            }
            Self::LightingStyle => {
                self.expect_text(value)?.parse::<LightingStyle>()?;
            }
            Self::CompositionSubjectPosition => {
                self.expect_text(value)?.parse::<SubjectPosition>()?;
            }
            Self::StyleColorPalette => {
                let colors = match value {
                    ParamValue::List(items) => items,
                    ParamValue::Text(_) => {
                        return Err(Error::validation(
                            "style.color_palette expects a list of hex colors",
                        ))
                    }
                };
                if colors.is_empty() {
                    return Err(Error::validation("color palette must not be empty"));
                }
                for color in colors {
                    if !is_hex_color(color) {
                        return Err(Error::validation(format!(
                            "'{color}' is not a #rrggbb hex color"
                        )));
                    }
                }
            }
            _ => {
                let text = self.expect_text(value)?;
                if text.trim().is_empty() {
                    return Err(Error::validation(format!(
                        "{} must not be empty",
                        self.as_str()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Write a value to this path, validating its domain first.
    ///
    /// On error the parameter set is left untouched.
    pub fn set(self, params: &mut SceneParameters, value: &ParamValue) -> Result<()> {
        self.check_value(value)?;
        match self {
            Self::SceneDescription => params.scene_description = value.canonical(),
            Self::CameraAngle => params.camera.angle = value.canonical().parse()?,
            Self::CameraShotType => params.camera.shot_type = value.canonical(),
            Self::LightingStyle => params.lighting.style = value.canonical().parse()?,
            Self::LightingDirection => params.lighting.direction = value.canonical(),
            Self::LightingIntensity => params.lighting.intensity = value.canonical(),
            Self::CompositionSubjectPosition => {
                params.composition.subject_position = value.canonical().parse()?
            }
            Self::CompositionBackground => params.composition.background = value.canonical(),
            Self::CompositionDepthOfField => params.composition.depth_of_field = value.canonical(),
            Self::StyleColorPalette => {
                if let ParamValue::List(items) = value {
                    params.style.color_palette = items.clone();
                }
            }
            Self::StyleMaterial => params.style.material = value.canonical(),
            Self::StyleMood => params.style.mood = value.canonical(),
            Self::StyleAesthetic => params.style.aesthetic = value.canonical(),
        }
        Ok(())
    }

    fn expect_text<'a>(self, value: &'a ParamValue) -> Result<&'a str> {
        match value {
            ParamValue::Text(s) => Ok(s),
            ParamValue::List(_) => Err(Error::validation(format!(
                "{} expects a single text value, not a list",
                self.as_str()
            ))),
        }
    }
}

impl fmt::Display for ParamPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParamPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        // Legacy global aliases fan out to the style fields on the targeted
        // scenes; the target set still controls which scenes are touched.
        match s {
            "global_material" => return Ok(Self::StyleMaterial),
            "global_color_palette" => return Ok(Self::StyleColorPalette),
            _ => {}
        }
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| Error::validation(format!("Unknown parameter path '{s}'")))
    }
}

/// Check a `#rrggbb` hex color literal.
fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}
