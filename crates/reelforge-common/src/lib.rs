//! Reelforge-Common: Shared types, IDs, and errors.
//!
//! This crate provides common functionality used across reelforge:
//!
//! - **Typed IDs**: Type-safe UUID wrappers for jobs and pipeline runs
//! - **Core Types**: Closed categorical enums for aspect ratios, transitions,
//!   and the visual vocabulary accepted by the rendering service
//! - **Error Handling**: The unified error taxonomy and result alias
//!
//! # Examples
//!
//! ```
//! use reelforge_common::{AspectRatio, CameraAngle, Error, JobId, Result};
//!
//! let job_id = JobId::new();
//! let angle: CameraAngle = "close-up".parse().unwrap();
//! assert_eq!(AspectRatio::Portrait.dimensions(), (1080, 1920));
//!
//! fn example() -> Result<()> {
//!     Err(Error::not_found("job"))
//! }
//! ```

pub mod error;
pub mod ids;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
