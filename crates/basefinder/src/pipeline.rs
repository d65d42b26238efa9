//! Per-frame pipeline: lights → armor → tracker, tags → pose, then ground
//! projection and the stop decision.

use std::path::{Path, PathBuf};

use basefinder_core::{ColorImageView, ImageError};
use basefinder_lights::{
    ArmorCandidate, ArmorDetector, ArmorTracker, LightBlob, LightParams, PairParams,
    TrackOutput, TrackerParams,
};
use basefinder_pose::{
    CameraPose, GroundProjector, PoseError, PoseEstimator, PoseParams, PoseParamsError,
    TagDetection,
};
use basefinder_stability::{
    StabilityDecision, StabilityDetector, StabilityParams, StabilityParamsError,
};
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};

/// Errors from configuration, input loading and parameter validation.
#[derive(thiserror::Error, Debug)]
pub enum LocateError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in {what}: {source}")]
    Json {
        what: String,
        source: serde_json::Error,
    },

    #[cfg(feature = "image")]
    #[error("failed to decode image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error(transparent)]
    Frame(#[from] ImageError),

    #[error(transparent)]
    LightParams(#[from] basefinder_lights::ParamsError),

    #[error(transparent)]
    PoseParams(#[from] PoseParamsError),

    #[error(transparent)]
    StabilityParams(#[from] StabilityParamsError),
}

pub(crate) fn read_to_string(path: &Path) -> Result<String, LocateError> {
    std::fs::read_to_string(path).map_err(|source| LocateError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Every tunable of the pipeline, loadable from partial JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorParams {
    pub light: LightParams,
    pub pair: PairParams,
    pub tracker: TrackerParams,
    pub pose: PoseParams,
    pub stability: StabilityParams,
}

impl LocatorParams {
    pub fn validate(&self) -> Result<(), LocateError> {
        self.light.validate()?;
        self.pair.validate()?;
        self.tracker.validate()?;
        self.pose.validate()?;
        self.stability.validate()?;
        Ok(())
    }

    /// Parse and validate; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, LocateError> {
        let params: Self = serde_json::from_str(json).map_err(|source| LocateError::Json {
            what: "locator params".to_string(),
            source,
        })?;
        params.validate()?;
        Ok(params)
    }

    pub fn load(path: &Path) -> Result<Self, LocateError> {
        let json = read_to_string(path)?;
        serde_json::from_str::<Self>(&json)
            .map_err(|source| LocateError::Json {
                what: path.display().to_string(),
                source,
            })
            .and_then(|params| {
                params.validate()?;
                Ok(params)
            })
    }
}

/// Everything the pipeline learned from one frame.
#[derive(Clone, Debug, Serialize)]
pub struct FrameReport {
    /// Zero-based index of the frame within this locator's run.
    pub frame_index: u64,
    pub blobs: Vec<LightBlob>,
    pub candidates: Vec<ArmorCandidate>,
    /// Tracked armor center in pixels.
    pub armor: Option<TrackOutput>,
    /// Ids (after remapping) of the tags the pose was solved from.
    pub tags_used: Vec<u32>,
    pub pose: Option<CameraPose>,
    pub pose_error: Option<PoseError>,
    pub camera_center: Option<Point3<f64>>,
    /// Armor center projected into the world frame, in meters.
    pub ground: Option<Point3<f64>>,
    /// Present on frames that produced a ground position.
    pub stability: Option<StabilityDecision>,
}

impl FrameReport {
    pub fn is_stationary(&self) -> bool {
        self.stability.is_some_and(|d| d.is_stationary())
    }
}

/// Owns the per-run state (armor tracker, position history) and runs the
/// stages in order for each frame.
#[derive(Debug)]
pub struct BaseLocator {
    params: LocatorParams,
    detector: ArmorDetector,
    tracker: ArmorTracker,
    pose: PoseEstimator,
    projector: GroundProjector,
    stability: StabilityDetector,
    frames: u64,
}

impl BaseLocator {
    pub fn new(params: LocatorParams) -> Result<Self, LocateError> {
        params.validate()?;
        Ok(Self {
            detector: ArmorDetector::new(params.light.clone(), params.pair.clone()),
            tracker: ArmorTracker::new(params.tracker.clone()),
            pose: PoseEstimator::new(params.pose.clone()),
            projector: GroundProjector::from_params(&params.pose),
            stability: StabilityDetector::new(params.stability.clone()),
            params,
            frames: 0,
        })
    }

    pub fn params(&self) -> &LocatorParams {
        &self.params
    }

    pub fn tracker(&self) -> &ArmorTracker {
        &self.tracker
    }

    pub fn stability(&self) -> &StabilityDetector {
        &self.stability
    }

    /// Forget the tracked armor and the position history.
    pub fn reset(&mut self) {
        self.tracker = ArmorTracker::new(self.params.tracker.clone());
        self.stability.reset();
        self.frames = 0;
    }

    /// Run every stage on one frame and the tags decoded from it.
    ///
    /// The tracker is updated on every frame. The ground position, and with
    /// it a stability decision, exists only when both an armor center and a
    /// pose were found.
    pub fn process_frame(
        &mut self,
        frame: &ColorImageView<'_>,
        tags: &[TagDetection],
    ) -> FrameReport {
        let frame_index = self.frames;
        self.frames += 1;
        let _scope = basefinder_core::frame_scope(frame_index);

        let detection = self.detector.detect(frame);
        let armor = self.tracker.update(&detection.candidates);

        let used = self.pose.usable_tags(tags);
        let (pose, pose_error) = match self.pose.estimate_filtered(&used) {
            Ok(pose) => (Some(pose), None),
            Err(err) => {
                log::debug!("no pose ({err})");
                (None, Some(err))
            }
        };

        let ground = match (&armor, &pose) {
            (Some(track), Some(pose)) => {
                let pixel = Point2::new(f64::from(track.center.x), f64::from(track.center.y));
                self.projector.project(pixel, pose)
            }
            _ => None,
        };
        let stability = ground.map(|g| self.stability.push(Point2::new(g.x, g.y)));

        log::debug!(
            "lights={} armors={} tracked={} tags={} ground={:?}",
            detection.blobs.len(),
            detection.candidates.len(),
            armor.is_some(),
            used.len(),
            ground.map(|g| [g.x, g.y, g.z])
        );

        FrameReport {
            frame_index,
            blobs: detection.blobs,
            candidates: detection.candidates,
            armor,
            tags_used: used.iter().map(|t| t.id).collect(),
            camera_center: pose.as_ref().map(CameraPose::camera_center),
            pose,
            pose_error,
            ground,
            stability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_params_validate() {
        assert!(LocatorParams::default().validate().is_ok());
        assert!(BaseLocator::new(LocatorParams::default()).is_ok());
    }

    #[test]
    fn partial_json_overrides_only_named_fields() {
        let params = LocatorParams::from_json_str(
            r#"{"light": {"max_area": 250}, "stability": {"history_len": 5}}"#,
        )
        .expect("params");
        assert_eq!(params.light.max_area, 250.0);
        assert_eq!(params.light.min_area, 20.0);
        assert_eq!(params.stability.history_len, 5);
        assert_eq!(params.pose, PoseParams::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = LocatorParams::from_json_str(r#"{"stability": {"history_len": 0}}"#)
            .expect_err("zero history");
        assert!(matches!(
            err,
            LocateError::StabilityParams(StabilityParamsError::ZeroHistory)
        ));

        let err = LocatorParams::from_json_str(r#"{"light": {"min_area": 50, "max_area": 10}}"#)
            .expect_err("inverted range");
        assert!(matches!(err, LocateError::LightParams(_)));

        let err = LocatorParams::from_json_str("{not json").expect_err("syntax");
        assert!(matches!(err, LocateError::Json { .. }));
    }

    #[test]
    fn empty_frame_reports_nothing() {
        let mut locator = BaseLocator::new(LocatorParams::default()).expect("locator");
        let data = vec![0u8; 64 * 48 * 3];
        let frame = ColorImageView::new(64, 48, 3, &data).expect("frame");
        let report = locator.process_frame(&frame, &[]);
        assert_eq!(report.frame_index, 0);
        assert!(report.blobs.is_empty());
        assert!(report.armor.is_none());
        assert_eq!(report.pose_error, Some(PoseError::NoTags));
        assert!(report.ground.is_none());
        assert!(report.stability.is_none());

        let next = locator.process_frame(&frame, &[]);
        assert_eq!(next.frame_index, 1);
        // the frame log scope closes with the call
        assert_eq!(basefinder_core::current_frame(), None);
    }
}
