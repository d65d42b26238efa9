//! Bright light-bar blob extraction.

use basefinder_core::{
    binarize_above, contour_area, dilate_cross2, erode_cross2, find_outer_contours,
    min_area_rect, rgb_to_gray, window_mean, ColorImageView, Contour, RotatedRect,
};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::params::LightParams;
use crate::threshold::bright_rank_threshold;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// One accepted light bar.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightBlob {
    pub rect: RotatedRect,
    /// Polygon area of the traced contour, in pixels.
    pub area: f32,
}

/// Why a contour was not accepted as a light bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobRejection {
    Area,
    Border,
    Aspect,
    Color,
}

/// Run every gate on one contour.
///
/// Gates run in a fixed order (area, border, aspect, color) and the first
/// failing one is reported.
pub fn classify_contour(
    contour: &Contour,
    frame: &ColorImageView<'_>,
    params: &LightParams,
) -> Result<LightBlob, BlobRejection> {
    let area = contour_area(&contour.points) as f32;
    if area <= params.min_area || area >= params.max_area {
        return Err(BlobRejection::Area);
    }

    let rect = min_area_rect(&contour.points).ok_or(BlobRejection::Area)?;
    let m = params.border_margin_px;
    let (w, h) = (frame.width as f32, frame.height as f32);
    let c = rect.center;
    if c.x < m || c.x > w - m || c.y < m || c.y > h - m {
        return Err(BlobRejection::Border);
    }

    let aspect = rect.aspect_ratio();
    if !(params.min_aspect..=params.max_aspect).contains(&aspect) {
        return Err(BlobRejection::Aspect);
    }

    let mean = window_mean(
        frame,
        c.x.floor() as i64,
        c.y.floor() as i64,
        params.color_window,
    )
    .ok_or(BlobRejection::Color)?;
    let (red, blue) = (mean[0], mean[2]);
    if blue - red <= params.color_delta_min as f64 {
        return Err(BlobRejection::Color);
    }

    Ok(LightBlob { rect, area })
}

/// Extract light-bar blobs from an RGB frame.
///
/// Frames that are not three channel yield no blobs. The result is a pure
/// function of the frame and `params`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "debug", skip(frame, params), fields(width = frame.width, height = frame.height))
)]
pub fn detect_light_blobs(frame: &ColorImageView<'_>, params: &LightParams) -> Vec<LightBlob> {
    let Some(gray) = rgb_to_gray(frame) else {
        debug!(
            "skipping frame with {} channels ({} bytes)",
            frame.channels,
            frame.data.len()
        );
        return Vec::new();
    };
    let Some(threshold) = bright_rank_threshold(&gray.view(), params.bright_pixel_rank) else {
        return Vec::new();
    };

    let mask = binarize_above(&gray.view(), threshold);
    let mask = dilate_cross2(&erode_cross2(&mask));
    let contours = find_outer_contours(&mask);

    let mut blobs = Vec::new();
    for contour in &contours {
        match classify_contour(contour, frame, params) {
            Ok(blob) => blobs.push(blob),
            Err(reason) => trace!(
                "contour at ({}, {}) rejected: {:?}",
                contour.points[0].x,
                contour.points[0].y,
                reason
            ),
        }
    }
    debug!(
        "threshold={} contours={} lights={}",
        threshold,
        contours.len(),
        blobs.len()
    );
    blobs
}
