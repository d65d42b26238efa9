use serde::{Deserialize, Serialize};

/// Invalid parameter combination.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("{name}: expected a finite, non-negative value (got {value})")]
    NotFinite { name: &'static str, value: f32 },
    #[error("{name}: range is empty (min={min}, max={max})")]
    EmptyRange {
        name: &'static str,
        min: f32,
        max: f32,
    },
    #[error("{name} must be at least 1")]
    Zero { name: &'static str },
}

fn check_value(name: &'static str, value: f32) -> Result<(), ParamsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ParamsError::NotFinite { name, value })
    }
}

fn check_range(name: &'static str, min: f32, max: f32) -> Result<(), ParamsError> {
    check_value(name, min)?;
    check_value(name, max)?;
    if min > max {
        return Err(ParamsError::EmptyRange { name, min, max });
    }
    Ok(())
}

/// Gates applied to each bright contour before it counts as a light bar.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightParams {
    /// Rank (0-based, brightest first) of the pixel whose intensity becomes
    /// the binarization threshold. Roughly the number of pixels allowed to be
    /// foreground, so the threshold follows scene brightness.
    pub bright_pixel_rank: usize,
    /// Contour area must lie strictly inside `(min_area, max_area)`.
    pub min_area: f32,
    pub max_area: f32,
    /// Blobs whose center is closer than this to a frame edge are clipped.
    pub border_margin_px: f32,
    /// Long/short side ratio of the rotated rectangle, inclusive.
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Side of the square window sampled around the blob center.
    pub color_window: usize,
    /// Mean blue must exceed mean red by more than this inside the window.
    pub color_delta_min: f32,
}

impl Default for LightParams {
    fn default() -> Self {
        Self {
            bright_pixel_rank: 2500,
            min_area: 20.0,
            max_area: 100.0,
            border_margin_px: 10.0,
            min_aspect: 1.3,
            max_aspect: 5.0,
            color_window: 15,
            color_delta_min: 10.0,
        }
    }
}

impl LightParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        // rank 0 thresholds at the brightest pixel and leaves nothing above it
        if self.bright_pixel_rank == 0 {
            return Err(ParamsError::Zero {
                name: "light.bright_pixel_rank",
            });
        }
        check_range("light.area", self.min_area, self.max_area)?;
        check_value("light.border_margin_px", self.border_margin_px)?;
        check_range("light.aspect", self.min_aspect, self.max_aspect)?;
        if !self.color_delta_min.is_finite() {
            return Err(ParamsError::NotFinite {
                name: "light.color_delta_min",
                value: self.color_delta_min,
            });
        }
        if self.color_window == 0 {
            return Err(ParamsError::Zero {
                name: "light.color_window",
            });
        }
        Ok(())
    }
}

/// Geometry a pair of light bars must satisfy to form one armor plate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PairParams {
    /// Center distance in units of the bar length, inclusive.
    pub min_distance_ratio: f32,
    pub max_distance_ratio: f32,
    /// Upper bound on `|cos|` between a bar's long axis and the line joining
    /// the two centers. Small values mean the bars stand across that line.
    pub max_axis_alignment: f32,
}

impl Default for PairParams {
    fn default() -> Self {
        Self {
            min_distance_ratio: 3.0,
            max_distance_ratio: 4.5,
            max_axis_alignment: 0.3,
        }
    }
}

impl PairParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_range(
            "pair.distance_ratio",
            self.min_distance_ratio,
            self.max_distance_ratio,
        )?;
        check_value("pair.max_axis_alignment", self.max_axis_alignment)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerParams {
    /// A lone candidate updates an anchor only when closer than this (px).
    pub anchor_update_max_px: f32,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            anchor_update_max_px: 10.0,
        }
    }
}

impl TrackerParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        check_value("tracker.anchor_update_max_px", self.anchor_update_max_px)
    }
}
