//! Light-bar detection, armor pairing and armor tracking.
//!
//! ## Quickstart
//!
//! ```
//! use basefinder_core::ColorImageView;
//! use basefinder_lights::{ArmorDetector, ArmorTracker};
//!
//! let pixels = vec![0u8; 64 * 48 * 3];
//! let frame = ColorImageView::new(64, 48, 3, &pixels).unwrap();
//!
//! let detector = ArmorDetector::default();
//! let mut tracker = ArmorTracker::default();
//!
//! let detection = detector.detect(&frame);
//! let tracked = tracker.update(&detection.candidates);
//! assert!(tracked.is_none());
//! ```
//!
//! Per frame:
//! 1. Grayscale, threshold at the intensity of the N-th brightest pixel.
//! 2. Erode + dilate (2x2 cross), trace outer contours.
//! 3. Gate each contour on area, border distance, aspect ratio and color.
//! 4. Pair surviving bars whose spacing and orientation match an armor plate.
//! 5. Feed the plate midpoints to the [`ArmorTracker`].

mod filter;
mod pair;
mod params;
mod threshold;
mod tracker;

use basefinder_core::ColorImageView;
use serde::{Deserialize, Serialize};

pub use filter::{classify_contour, detect_light_blobs, BlobRejection, LightBlob};
pub use pair::{lights_form_armor, pair_lights, ArmorCandidate};
pub use params::{LightParams, PairParams, ParamsError, TrackerParams};
pub use tracker::{AnchorUpdate, ArmorTracker, TrackOutput, TrackState};

/// Light bars and armor candidates found in one frame.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ArmorDetection {
    pub blobs: Vec<LightBlob>,
    pub candidates: Vec<ArmorCandidate>,
}

/// Stateless per-frame detector: blob filter followed by the pairer.
#[derive(Clone, Debug, Default)]
pub struct ArmorDetector {
    light: LightParams,
    pair: PairParams,
}

impl ArmorDetector {
    pub fn new(light: LightParams, pair: PairParams) -> Self {
        Self { light, pair }
    }

    pub fn light_params(&self) -> &LightParams {
        &self.light
    }

    pub fn pair_params(&self) -> &PairParams {
        &self.pair
    }

    pub fn detect(&self, frame: &ColorImageView<'_>) -> ArmorDetection {
        let blobs = detect_light_blobs(frame, &self.light);
        let candidates = pair_lights(&blobs, &self.pair);
        ArmorDetection { blobs, candidates }
    }
}
