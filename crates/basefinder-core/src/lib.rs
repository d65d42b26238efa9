//! Core image and geometry primitives for target localization.
//!
//! This crate is intentionally small and free of any detector logic. It
//! provides the building blocks the light-bar, pose and stability crates
//! share: borrowed image views, grayscale conversion, binary morphology,
//! contour tracing, rotated rectangles, homographies and pinhole intrinsics.

mod camera;
mod contour;
mod geometry;
mod homography;
mod image;
mod logger;
mod morphology;

pub use camera::CameraIntrinsics;
pub use contour::{find_outer_contours, Contour};
pub use geometry::{contour_area, convex_hull, min_area_rect, RotatedRect, Size2};
pub use homography::{estimate_homography, Homography};
pub use image::{
    binarize_above, rgb_to_gray, window_mean, BinaryImage, ColorImageView, GrayImage,
    GrayImageView, ImageError,
};
pub use morphology::{dilate_cross2, erode_cross2};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::{current_frame, frame_scope, init_with_level, FrameScope};
