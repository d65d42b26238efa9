use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::circle::{min_enclosing_circle, EnclosingCircle};
use crate::history::PositionHistory;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Invalid [`StabilityParams`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StabilityParamsError {
    #[error("history_len must be at least 1")]
    ZeroHistory,
    #[error("stationary_radius must be finite and non-negative (got {0})")]
    Radius(f64),
    #[error("position_scale must be finite and positive (got {0})")]
    Scale(f64),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityParams {
    /// Number of recent positions the decision is made over.
    pub history_len: usize,
    /// Window is stationary when its enclosing circle radius is at most
    /// this, in scaled units.
    pub stationary_radius: f64,
    /// Factor applied to incoming positions (meters to centimeters by
    /// default).
    pub position_scale: f64,
}

impl Default for StabilityParams {
    fn default() -> Self {
        Self {
            history_len: 10,
            stationary_radius: 2.0,
            position_scale: 100.0,
        }
    }
}

impl StabilityParams {
    pub fn validate(&self) -> Result<(), StabilityParamsError> {
        if self.history_len == 0 {
            return Err(StabilityParamsError::ZeroHistory);
        }
        if !self.stationary_radius.is_finite() || self.stationary_radius < 0.0 {
            return Err(StabilityParamsError::Radius(self.stationary_radius));
        }
        if !self.position_scale.is_finite() || self.position_scale <= 0.0 {
            return Err(StabilityParamsError::Scale(self.position_scale));
        }
        Ok(())
    }
}

/// Verdict over the current history window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StabilityDecision {
    /// The window has not been filled yet.
    Insufficient { samples: usize, capacity: usize },
    Stationary { circle: EnclosingCircle },
    Moving { circle: EnclosingCircle },
}

impl StabilityDecision {
    pub fn is_stationary(&self) -> bool {
        matches!(self, Self::Stationary { .. })
    }

    pub fn circle(&self) -> Option<EnclosingCircle> {
        match self {
            Self::Stationary { circle } | Self::Moving { circle } => Some(*circle),
            Self::Insufficient { .. } => None,
        }
    }
}

/// Decides whether the target stopped from its recent ground positions.
#[derive(Clone, Debug)]
pub struct StabilityDetector {
    params: StabilityParams,
    history: PositionHistory,
}

impl Default for StabilityDetector {
    fn default() -> Self {
        Self::new(StabilityParams::default())
    }
}

impl StabilityDetector {
    pub fn new(params: StabilityParams) -> Self {
        let history = PositionHistory::new(params.history_len);
        Self { params, history }
    }

    pub fn params(&self) -> &StabilityParams {
        &self.params
    }

    /// Scaled positions currently in the window.
    pub fn history(&self) -> &PositionHistory {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Record one ground position `(X, Y)` in world units and decide.
    ///
    /// Non-finite positions are not recorded; the decision is then made over
    /// the unchanged window.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn push(&mut self, ground: Point2<f64>) -> StabilityDecision {
        let scaled = ground * self.params.position_scale;
        if scaled.x.is_finite() && scaled.y.is_finite() {
            self.history.push(scaled);
        } else {
            log::warn!("ignoring non-finite ground position {ground:?}");
        }
        self.decide()
    }

    /// Decision over the current window without recording anything.
    pub fn decide(&self) -> StabilityDecision {
        if !self.history.is_full() {
            return StabilityDecision::Insufficient {
                samples: self.history.len(),
                capacity: self.history.capacity(),
            };
        }
        let Some(circle) = min_enclosing_circle(self.history.as_slice()) else {
            // unreachable for a full window of finite samples
            return StabilityDecision::Insufficient {
                samples: self.history.len(),
                capacity: self.history.capacity(),
            };
        };
        log::debug!(
            "window center=({:.2}, {:.2}) radius={:.3}",
            circle.center.x,
            circle.center.y,
            circle.radius
        );
        if circle.radius <= self.params.stationary_radius {
            StabilityDecision::Stationary { circle }
        } else {
            StabilityDecision::Moving { circle }
        }
    }
}
