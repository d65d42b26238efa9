//! Facade for the `basefinder-*` workspace.
//!
//! Locates a ground target ("base") from a downward camera by combining two
//! cues: the pair of blue light bars on the target's armor plates, and the
//! fiducial tags laid out around the base. Per frame the [`BaseLocator`]
//! tracks the armor center in the image, solves the camera pose from the
//! tags, projects the armor into the ground frame and keeps a short window
//! of positions to decide whether the target has stopped.
//!
//! ## Quickstart
//!
//! ```no_run
//! use basefinder::{detect, BaseLocator, LocatorParams};
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut locator = BaseLocator::new(LocatorParams::default())?;
//! let img = detect::load_rgb(Path::new("frame.png"))?;
//! let tags = Vec::new(); // from your tag decoder
//!
//! let report = detect::process_image(&mut locator, &img, &tags);
//! if report.is_stationary() {
//!     println!("target stopped at {:?}", report.ground);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `basefinder::core`: image views, morphology, contours, homography, intrinsics, logging.
//! - `basefinder::lights`: light-bar filter, armor pairing, armor tracker.
//! - `basefinder::pose`: tag filtering, planar pose solve, ground projection.
//! - `basefinder::stability`: position window and stop decision.
//! - `basefinder::detect` (feature `image`): helpers for `image` buffers and files.

pub use basefinder_core as core;
pub use basefinder_lights as lights;
pub use basefinder_pose as pose;
pub use basefinder_stability as stability;

pub use basefinder_core::{CameraIntrinsics, ColorImageView};
pub use basefinder_lights::{ArmorCandidate, ArmorTracker, LightBlob, TrackOutput};
pub use basefinder_pose::{CameraPose, PoseError, TagDetection, TagLayout};
pub use basefinder_stability::{EnclosingCircle, StabilityDecision};

mod frames;
mod pipeline;

pub use frames::{FrameEntry, FrameList};
pub use pipeline::{BaseLocator, FrameReport, LocateError, LocatorParams};

#[cfg(feature = "image")]
pub mod detect;
