use serde::{Deserialize, Serialize};

/// Why no camera pose was produced for a frame.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum PoseError {
    #[error("no usable tags")]
    NoTags,
    #[error("need at least 4 correspondences, got {got}")]
    TooFewPoints { got: usize },
    #[error("object/image point count mismatch ({object} vs {image})")]
    CountMismatch { object: usize, image: usize },
    #[error("degenerate point configuration")]
    DegenerateGeometry,
    #[error("non-finite value in pose input or solution")]
    NonFinite,
    #[error("reprojection rms {rms_px:.3} px exceeds {max_px:.3} px")]
    ReprojectionTooLarge { rms_px: f64, max_px: f64 },
}

/// Invalid [`PoseParams`](crate::PoseParams).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PoseParamsError {
    #[error("camera intrinsics must be finite with non-zero focal lengths")]
    Intrinsics,
    #[error("tag size must be finite and positive (got {0})")]
    TagSize(f64),
    #[error("tag {0} has a non-finite position")]
    TagPosition(u32),
    #[error("ground depth must be finite and positive (got {0})")]
    GroundDepth(f64),
    #[error("max_rms_px must be finite and positive (got {0})")]
    RmsGate(f64),
}
