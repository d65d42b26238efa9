//! Fiducial tag records and the world layout of the base tags.

use std::collections::BTreeMap;

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// One decoded fiducial tag as reported by the tag decoder.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TagDetection {
    pub id: u32,
    /// Image corners in the order (-s,-s), (+s,-s), (+s,+s), (-s,+s) of the
    /// tag plane, `s` being half the tag size.
    pub corners: [Point2<f32>; 4],
    /// Bits corrected by the decoder.
    #[serde(default)]
    pub hamming: u8,
}

impl TagDetection {
    pub fn center(&self) -> Point2<f32> {
        let sum = self
            .corners
            .iter()
            .fold(nalgebra::Vector2::zeros(), |acc, c| acc + c.coords);
        Point2::from(sum / 4.0)
    }

    fn is_finite(&self) -> bool {
        self.corners
            .iter()
            .all(|c| c.x.is_finite() && c.y.is_finite())
    }
}

/// Decoder id rewritten before the layout lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdRemap {
    pub from: u32,
    pub to: u32,
}

const CORNER_NEAR: f64 = 0.1524;
const CORNER_FAR: f64 = 1.8476;
const MID: f64 = 1.0;

/// World placement of the tags on the ground plane (`Z = 0`), in meters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagLayout {
    /// Full side length of every tag.
    pub tag_size: f64,
    /// Tag center `(X, Y)` per id.
    pub positions: BTreeMap<u32, [f64; 2]>,
    pub id_remap: Vec<IdRemap>,
}

impl Default for TagLayout {
    /// Eight tags around the border of a 2 m x 2 m base; the physical tag
    /// printed with id 10 takes slot 7.
    fn default() -> Self {
        let (a, m, b) = (CORNER_NEAR, MID, CORNER_FAR);
        let centers = [
            [a, a],
            [m, a],
            [b, a],
            [a, m],
            [b, m],
            [a, b],
            [m, b],
            [b, b],
        ];
        Self {
            tag_size: 0.2286,
            positions: (0u32..).zip(centers).collect(),
            id_remap: vec![IdRemap { from: 10, to: 7 }],
        }
    }
}

impl TagLayout {
    /// Apply the first matching remap, if any.
    pub fn remap(&self, id: u32) -> u32 {
        self.id_remap
            .iter()
            .find(|r| r.from == id)
            .map_or(id, |r| r.to)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.positions.contains_key(&id)
    }

    /// Ground-plane corners of tag `id`, in detection corner order.
    pub fn object_corners(&self, id: u32) -> Option<[Point2<f64>; 4]> {
        let [x, y] = *self.positions.get(&id)?;
        let s = self.tag_size / 2.0;
        Some([
            Point2::new(x - s, y - s),
            Point2::new(x + s, y - s),
            Point2::new(x + s, y + s),
            Point2::new(x - s, y + s),
        ])
    }
}

/// Keep the detections usable for pose estimation.
///
/// Ids are remapped first; tags whose id is not in the layout, whose
/// Hamming distance exceeds `max_hamming`, or whose corners are not finite
/// are dropped. The input is left untouched.
pub fn filter_tags(
    detections: &[TagDetection],
    layout: &TagLayout,
    max_hamming: u8,
) -> Vec<TagDetection> {
    detections
        .iter()
        .filter_map(|det| {
            let id = layout.remap(det.id);
            if !layout.contains(id) {
                log::trace!("dropping tag {} (not in layout)", det.id);
                return None;
            }
            if det.hamming > max_hamming || !det.is_finite() {
                log::trace!("dropping tag {} (hamming {})", det.id, det.hamming);
                return None;
            }
            Some(TagDetection { id, ..*det })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn tag(id: u32, hamming: u8) -> TagDetection {
        TagDetection {
            id,
            corners: [
                Point2::new(0.0, 0.0),
                Point2::new(10.0, 0.0),
                Point2::new(10.0, 10.0),
                Point2::new(0.0, 10.0),
            ],
            hamming,
        }
    }

    #[test]
    fn default_layout_has_eight_border_tags() {
        let layout = TagLayout::default();
        assert_eq!(layout.positions.len(), 8);
        assert_eq!(layout.positions[&1], [1.0, 0.1524]);
        assert_eq!(layout.positions[&7], [1.8476, 1.8476]);
        assert!(!layout.contains(8));
    }

    #[test]
    fn object_corners_follow_detection_order() {
        let layout = TagLayout::default();
        let c = layout.object_corners(0).expect("tag 0");
        let s = 0.2286 / 2.0;
        assert_abs_diff_eq!(c[0], Point2::new(0.1524 - s, 0.1524 - s), epsilon = 1e-12);
        assert_abs_diff_eq!(c[2], Point2::new(0.1524 + s, 0.1524 + s), epsilon = 1e-12);
        assert!(layout.object_corners(42).is_none());
    }

    #[test]
    fn filter_remaps_and_drops() {
        let layout = TagLayout::default();
        let input = [tag(3, 0), tag(10, 0), tag(9, 0), tag(5, 1), tag(7, 0)];
        let kept = filter_tags(&input, &layout, 0);
        let ids: Vec<u32> = kept.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 7, 7]);
        // source untouched
        assert_eq!(input[1].id, 10);
    }

    #[test]
    fn hamming_limit_is_configurable() {
        let layout = TagLayout::default();
        let kept = filter_tags(&[tag(5, 1), tag(6, 2)], &layout, 1);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 5);
    }

    #[test]
    fn non_finite_corners_are_dropped() {
        let mut bad = tag(2, 0);
        bad.corners[1].x = f32::NAN;
        assert!(filter_tags(&[bad], &TagLayout::default(), 0).is_empty());
    }

    #[test]
    fn layout_round_trips_through_json() {
        let layout = TagLayout::default();
        let json = serde_json::to_string(&layout).expect("serialize");
        let back: TagLayout = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, layout);
    }
}
