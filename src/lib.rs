//! Reelforge - Product video generation orchestration core
//!
//! Turns a short product brief into a rendered video by coordinating three
//! external stages (storyboard planning, per-scene frame rendering, video
//! assembly) behind a single [`service::Studio`] facade.

pub mod cache;
pub mod config;
pub mod job;
pub mod params;
pub mod pipeline;
pub mod regen;
pub mod registry;
pub mod service;
pub mod stages;
pub mod storyboard;

pub use reelforge_common as common;
pub use service::Studio;
