//! Pairing of light bars into armor plates.

use basefinder_core::RotatedRect;
use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::filter::LightBlob;
use crate::params::PairParams;

/// Midpoint of two light bars accepted as one armor plate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArmorCandidate {
    pub center: Point2<f32>,
    /// Indices of the two bars in the blob list, ascending.
    pub lights: [usize; 2],
}

fn axis_alignment(rect: &RotatedRect, joint: Vector2<f32>, distance: f32) -> f32 {
    let theta = rect.long_axis_deg().to_radians();
    (theta.cos() * joint.x + theta.sin() * joint.y).abs() / distance
}

/// Whether two bars satisfy the armor geometry.
///
/// The distance gate is measured in units of the longer of the two bars, so
/// the verdict does not depend on argument order.
pub fn lights_form_armor(a: &RotatedRect, b: &RotatedRect, params: &PairParams) -> bool {
    let joint = a.center - b.center;
    let distance = joint.norm();
    let bar = a.size.long_side().max(b.size.long_side());
    if bar <= 0.0 || distance <= 0.0 {
        return false;
    }
    if distance < params.min_distance_ratio * bar || distance > params.max_distance_ratio * bar {
        return false;
    }

    axis_alignment(a, joint, distance) <= params.max_axis_alignment
        && axis_alignment(b, joint, distance) <= params.max_axis_alignment
}

/// Test every unordered pair of blobs and return the midpoints of the
/// accepted ones, in `(i, j)` lexicographic order.
pub fn pair_lights(blobs: &[LightBlob], params: &PairParams) -> Vec<ArmorCandidate> {
    let mut out = Vec::new();
    for i in 0..blobs.len() {
        for j in (i + 1)..blobs.len() {
            let (a, b) = (&blobs[i].rect, &blobs[j].rect);
            if lights_form_armor(a, b, params) {
                out.push(ArmorCandidate {
                    center: nalgebra::center(&a.center, &b.center),
                    lights: [i, j],
                });
            }
        }
    }
    out
}
