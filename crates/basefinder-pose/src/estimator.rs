use basefinder_core::CameraIntrinsics;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::error::{PoseError, PoseParamsError};
use crate::pnp::solve_planar_pose;
use crate::pose::CameraPose;
use crate::tags::{filter_tags, TagDetection, TagLayout};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Camera model, tag layout and solver settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoseParams {
    pub intrinsics: CameraIntrinsics,
    pub layout: TagLayout,
    /// Tags with more corrected bits than this are ignored.
    pub max_hamming: u8,
    /// Levenberg-Marquardt iterations after the closed-form initialization;
    /// zero keeps the closed-form pose.
    pub max_iterations: usize,
    /// Reject poses whose RMS reprojection error exceeds this many pixels.
    pub max_rms_px: Option<f64>,
    /// Camera-frame depth assigned to the armor center when projecting it to
    /// the ground (meters).
    pub ground_depth: f64,
}

impl Default for PoseParams {
    fn default() -> Self {
        Self {
            intrinsics: CameraIntrinsics::default(),
            layout: TagLayout::default(),
            max_hamming: 0,
            max_iterations: 20,
            max_rms_px: None,
            ground_depth: 2.0,
        }
    }
}

impl PoseParams {
    pub fn validate(&self) -> Result<(), PoseParamsError> {
        if !self.intrinsics.is_valid() {
            return Err(PoseParamsError::Intrinsics);
        }
        let size = self.layout.tag_size;
        if !size.is_finite() || size <= 0.0 {
            return Err(PoseParamsError::TagSize(size));
        }
        if let Some((&id, _)) = self
            .layout
            .positions
            .iter()
            .find(|(_, p)| !p.iter().all(|v| v.is_finite()))
        {
            return Err(PoseParamsError::TagPosition(id));
        }
        if !self.ground_depth.is_finite() || self.ground_depth <= 0.0 {
            return Err(PoseParamsError::GroundDepth(self.ground_depth));
        }
        if let Some(max) = self.max_rms_px {
            if !max.is_finite() || max <= 0.0 {
                return Err(PoseParamsError::RmsGate(max));
            }
        }
        Ok(())
    }
}

/// Camera pose from the base tags visible in a frame.
#[derive(Clone, Debug, Default)]
pub struct PoseEstimator {
    params: PoseParams,
}

impl PoseEstimator {
    pub fn new(params: PoseParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PoseParams {
        &self.params
    }

    /// Remapped detections that belong to the layout and decoded cleanly.
    pub fn usable_tags(&self, detections: &[TagDetection]) -> Vec<TagDetection> {
        filter_tags(detections, &self.params.layout, self.params.max_hamming)
    }

    /// Filter `detections` and solve the pose from the survivors.
    pub fn estimate(&self, detections: &[TagDetection]) -> Result<CameraPose, PoseError> {
        self.estimate_filtered(&self.usable_tags(detections))
    }

    /// Solve the pose from tags already passed through [`Self::usable_tags`].
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "debug", skip(self, tags), fields(num_tags = tags.len()))
    )]
    pub fn estimate_filtered(&self, tags: &[TagDetection]) -> Result<CameraPose, PoseError> {
        if tags.is_empty() {
            return Err(PoseError::NoTags);
        }
        let mut object = Vec::with_capacity(tags.len() * 4);
        let mut image = Vec::with_capacity(tags.len() * 4);
        for tag in tags {
            let Some(corners) = self.params.layout.object_corners(tag.id) else {
                continue;
            };
            object.extend_from_slice(&corners);
            image.extend(tag.corners.iter().map(|c| Point2::new(c.x as f64, c.y as f64)));
        }
        if object.is_empty() {
            return Err(PoseError::NoTags);
        }

        let pose = solve_planar_pose(
            &object,
            &image,
            self.params.intrinsics,
            self.params.max_iterations,
        )?;
        if let Some(max_px) = self.params.max_rms_px {
            if pose.rms_reprojection_px > max_px {
                return Err(PoseError::ReprojectionTooLarge {
                    rms_px: pose.rms_reprojection_px,
                    max_px,
                });
            }
        }
        log::debug!(
            "pose from {} tags: rms={:.3}px camera={:?}",
            tags.len(),
            pose.rms_reprojection_px,
            pose.camera_center().coords.as_slice()
        );
        Ok(pose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(PoseParams::default().validate().is_ok());
    }

    #[test]
    fn validation_catches_bad_values() {
        let mut p = PoseParams::default();
        p.layout.tag_size = 0.0;
        assert_eq!(p.validate(), Err(PoseParamsError::TagSize(0.0)));

        let mut p = PoseParams::default();
        p.layout.positions.insert(3, [f64::NAN, 0.0]);
        assert_eq!(p.validate(), Err(PoseParamsError::TagPosition(3)));

        let p = PoseParams {
            max_rms_px: Some(-1.0),
            ..PoseParams::default()
        };
        assert_eq!(p.validate(), Err(PoseParamsError::RmsGate(-1.0)));

        let p = PoseParams {
            intrinsics: CameraIntrinsics::new(0.0, 1.0, 0.0, 0.0),
            ..PoseParams::default()
        };
        assert_eq!(p.validate(), Err(PoseParamsError::Intrinsics));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let p: PoseParams = serde_json::from_str(r#"{"max_hamming": 2}"#).expect("json");
        assert_eq!(p.max_hamming, 2);
        assert_eq!(p.layout, TagLayout::default());
        assert_eq!(p.ground_depth, 2.0);
    }

    #[test]
    fn no_tags_is_an_error() {
        let est = PoseEstimator::default();
        assert_eq!(est.estimate(&[]), Err(PoseError::NoTags));
    }
}
