//! Core type definitions for briefs, scenes, and scene parameters.
//!
//! This module defines the closed categorical vocabularies accepted by the
//! planning and rendering services. All enums serialize in the kebab-case
//! wire form the services expect, and parse back from the same form so
//! user-supplied parameter values can be domain-checked.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Output video aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatio {
    /// Vertical 9:16 (stories / reels).
    #[serde(rename = "9:16")]
    Portrait,
    /// Square 1:1 (feed).
    #[serde(rename = "1:1")]
    Square,
    /// Horizontal 16:9.
    #[serde(rename = "16:9")]
    Landscape,
}

impl AspectRatio {
    /// Pixel dimensions (width, height) for this aspect ratio.
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Portrait => (1080, 1920),
            Self::Square => (1080, 1080),
            Self::Landscape => (1920, 1080),
        }
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::Portrait
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Portrait => write!(f, "9:16"),
            Self::Square => write!(f, "1:1"),
            Self::Landscape => write!(f, "16:9"),
        }
    }
}

impl FromStr for AspectRatio {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "9:16" => Ok(Self::Portrait),
            "1:1" => Ok(Self::Square),
            "16:9" => Ok(Self::Landscape),
            other => Err(Error::validation(format!(
                "Unknown aspect ratio '{other}' (expected 9:16, 1:1, or 16:9)"
            ))),
        }
    }
}

/// Transition effect between a scene and its successor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    Fade,
    Dissolve,
    Cut,
    Slide,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fade => write!(f, "fade"),
            Self::Dissolve => write!(f, "dissolve"),
            Self::Cut => write!(f, "cut"),
            Self::Slide => write!(f, "slide"),
        }
    }
}

impl FromStr for Transition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fade" => Ok(Self::Fade),
            "dissolve" => Ok(Self::Dissolve),
            "cut" => Ok(Self::Cut),
            "slide" => Ok(Self::Slide),
            other => Err(Error::validation(format!("Unknown transition '{other}'"))),
        }
    }
}

/// Camera angle for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CameraAngle {
    CloseUp,
    MediumShot,
    WideShot,
    Overhead,
    LowAngle,
}

impl fmt::Display for CameraAngle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CloseUp => write!(f, "close-up"),
            Self::MediumShot => write!(f, "medium-shot"),
            Self::WideShot => write!(f, "wide-shot"),
            Self::Overhead => write!(f, "overhead"),
            Self::LowAngle => write!(f, "low-angle"),
        }
    }
}

impl FromStr for CameraAngle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "close-up" => Ok(Self::CloseUp),
            "medium-shot" => Ok(Self::MediumShot),
            "wide-shot" => Ok(Self::WideShot),
            "overhead" => Ok(Self::Overhead),
            "low-angle" => Ok(Self::LowAngle),
            other => Err(Error::validation(format!("Unknown camera angle '{other}'"))),
        }
    }
}

/// Lighting style for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LightingStyle {
    Soft,
    Dramatic,
    Natural,
    Studio,
    GoldenHour,
}

impl fmt::Display for LightingStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Soft => write!(f, "soft"),
            Self::Dramatic => write!(f, "dramatic"),
            Self::Natural => write!(f, "natural"),
            Self::Studio => write!(f, "studio"),
            Self::GoldenHour => write!(f, "golden-hour"),
        }
    }
}

impl FromStr for LightingStyle {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "soft" => Ok(Self::Soft),
            "dramatic" => Ok(Self::Dramatic),
            "natural" => Ok(Self::Natural),
            "studio" => Ok(Self::Studio),
            "golden-hour" => Ok(Self::GoldenHour),
            other => Err(Error::validation(format!(
                "Unknown lighting style '{other}'"
            ))),
        }
    }
}

/// Subject position within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubjectPosition {
    Center,
    RuleOfThirdsLeft,
    RuleOfThirdsRight,
}

impl fmt::Display for SubjectPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Center => write!(f, "center"),
            Self::RuleOfThirdsLeft => write!(f, "rule-of-thirds-left"),
            Self::RuleOfThirdsRight => write!(f, "rule-of-thirds-right"),
        }
    }
}

impl FromStr for SubjectPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "center" => Ok(Self::Center),
            "rule-of-thirds-left" => Ok(Self::RuleOfThirdsLeft),
            "rule-of-thirds-right" => Ok(Self::RuleOfThirdsRight),
            other => Err(Error::validation(format!(
                "Unknown subject position '{other}'"
            ))),
        }
    }
}
