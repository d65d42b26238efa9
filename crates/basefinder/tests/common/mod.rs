#![allow(dead_code)]

use basefinder::pose::{CameraPose, TagDetection, TagLayout};
use basefinder::CameraIntrinsics;
use image::{Rgb, RgbImage};
use nalgebra::{Point2, Point3, Vector3};

pub const WIDTH: u32 = 200;
pub const HEIGHT: u32 = 120;

/// Dark blue background with 4x12 light bars whose top-left corners are
/// given.
pub fn paint_frame(bars: &[(u32, u32)]) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([10, 10, 30]));
    for &(x0, y0) in bars {
        for y in y0..y0 + 12 {
            for x in x0..x0 + 4 {
                img.put_pixel(x, y, Rgb([180, 230, 250]));
            }
        }
    }
    img
}

/// Two armor plates, 110 px apart.
pub fn two_plates() -> RgbImage {
    paint_frame(&[(20, 50), (60, 50), (130, 50), (170, 50)])
}

pub fn hover_pose() -> CameraPose {
    CameraPose::from_rvec(Vector3::new(0.05, -0.04, 0.2), Vector3::new(-1.0, -1.0, 2.6))
}

/// All eight base tags as the camera at `pose` would see them.
pub fn base_tags(pose: &CameraPose) -> Vec<TagDetection> {
    let layout = TagLayout::default();
    let k = CameraIntrinsics::default();
    layout
        .positions
        .keys()
        .map(|&id| {
            let corners = layout
                .object_corners(id)
                .expect("tag in layout")
                .map(|c| {
                    let px = pose.project(k, &Point3::new(c.x, c.y, 0.0)).expect("in front");
                    Point2::new(px.x as f32, px.y as f32)
                });
            // the tag printed with id 10 sits in slot 7
            let id = if id == 7 { 10 } else { id };
            TagDetection {
                id,
                corners,
                hamming: 0,
            }
        })
        .collect()
}
