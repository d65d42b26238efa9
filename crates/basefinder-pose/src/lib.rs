//! Camera pose from fiducial tags on the ground plane, and back-projection
//! of image points into that world frame.
//!
//! The world frame is the base: `Z = 0` is the ground, tag positions come
//! from a [`TagLayout`]. Poses follow `x_cam = R · X_world + t`.
//!
//! ```
//! use basefinder_pose::{GroundProjector, PoseEstimator, PoseError};
//!
//! let estimator = PoseEstimator::default();
//! assert_eq!(estimator.estimate(&[]), Err(PoseError::NoTags));
//!
//! let projector = GroundProjector::default();
//! assert_eq!(projector.ground_depth(), 2.0);
//! ```

mod error;
mod estimator;
mod pnp;
mod pose;
mod project;
mod tags;

pub use error::{PoseError, PoseParamsError};
pub use estimator::{PoseEstimator, PoseParams};
pub use pnp::solve_planar_pose;
pub use pose::CameraPose;
pub use project::GroundProjector;
pub use tags::{filter_tags, IdRemap, TagDetection, TagLayout};
