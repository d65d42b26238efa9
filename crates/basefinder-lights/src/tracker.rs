//! Identity-continuity tracking of the armor pair across frames.
//!
//! The target carries two armor plates. While both are visible the tracker
//! records their positions as anchors. When only one is visible, it is
//! matched to the nearest anchor and the other anchor is moved by the same
//! displacement, so the reported center (midpoint of the anchors) keeps
//! following the target.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::pair::ArmorCandidate;
use crate::params::TrackerParams;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackState {
    Unlocked,
    Locked,
}

/// How the anchors changed in a frame that produced output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorUpdate {
    /// Both plates seen; anchors replaced.
    Both,
    /// Lone plate matched anchor `0` or `1`; the other anchor was shifted.
    Single(usize),
    /// Lone plate near neither anchor; anchors kept from the last frame.
    Stale,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackOutput {
    /// Midpoint of the two anchors, in pixels.
    pub center: Point2<f32>,
    pub update: AnchorUpdate,
}

/// Stateful armor tracker. Create one per camera stream.
#[derive(Clone, Debug)]
pub struct ArmorTracker {
    params: TrackerParams,
    state: TrackState,
    anchors: [Point2<f32>; 2],
}

impl Default for ArmorTracker {
    fn default() -> Self {
        Self::new(TrackerParams::default())
    }
}

impl ArmorTracker {
    pub fn new(params: TrackerParams) -> Self {
        Self {
            params,
            state: TrackState::Unlocked,
            anchors: [Point2::origin(); 2],
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    #[inline]
    pub fn state(&self) -> TrackState {
        self.state
    }

    #[inline]
    pub fn is_locked(&self) -> bool {
        self.state == TrackState::Locked
    }

    /// Last known plate positions.
    pub fn anchors(&self) -> [Point2<f32>; 2] {
        self.anchors
    }

    fn center(&self) -> Point2<f32> {
        nalgebra::center(&self.anchors[0], &self.anchors[1])
    }

    /// Feed this frame's armor candidates and get the tracked center, if any.
    ///
    /// Two or more candidates lock the tracker. While locked: two
    /// candidates replace the anchors, one candidate updates the nearest
    /// anchor, and any other count unlocks without output.
    pub fn update(&mut self, candidates: &[ArmorCandidate]) -> Option<TrackOutput> {
        if candidates.len() >= 2 && self.state == TrackState::Unlocked {
            log::debug!("tracker locked on {} candidates", candidates.len());
            self.state = TrackState::Locked;
        }
        if self.state == TrackState::Unlocked {
            return None;
        }

        let update = match candidates {
            [a, b] => {
                self.anchors = [a.center, b.center];
                AnchorUpdate::Both
            }
            [only] => self.follow_single(only.center),
            _ => {
                log::debug!("tracker unlocked ({} candidates)", candidates.len());
                self.state = TrackState::Unlocked;
                return None;
            }
        };

        Some(TrackOutput {
            center: self.center(),
            update,
        })
    }

    fn follow_single(&mut self, seen: Point2<f32>) -> AnchorUpdate {
        let max = self.params.anchor_update_max_px;
        let d0 = (seen - self.anchors[0]).norm();
        let d1 = (seen - self.anchors[1]).norm();

        let matched = if d0 < d1 && d0 < max {
            0
        } else if d1 < max {
            1
        } else {
            log::trace!("lone plate {:?} near neither anchor; keeping anchors", seen);
            return AnchorUpdate::Stale;
        };
        let other = 1 - matched;
        let shift = seen - self.anchors[matched];
        self.anchors[other] += shift;
        self.anchors[matched] = seen;
        AnchorUpdate::Single(matched)
    }
}
