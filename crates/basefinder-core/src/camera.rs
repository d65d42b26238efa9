//! Pinhole camera intrinsics (zero distortion).

use nalgebra::{Matrix3, Point2, Point3, Vector3};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CameraIntrinsics {
    /// Focal length in x (pixels).
    pub fx: f64,
    /// Focal length in y (pixels).
    pub fy: f64,
    /// Principal point x (pixels).
    pub cx: f64,
    /// Principal point y (pixels).
    pub cy: f64,
}

impl Default for CameraIntrinsics {
    /// Calibration of the 640x480 downward camera the defaults were tuned on.
    fn default() -> Self {
        Self {
            fx: 508.013,
            fy: 507.49,
            cx: 322.632,
            cy: 231.39,
        }
    }
}

impl CameraIntrinsics {
    pub fn new(fx: f64, fy: f64, cx: f64, cy: f64) -> Self {
        Self { fx, fy, cx, cy }
    }

    /// Returns `true` when all entries are finite and focal lengths non-zero.
    pub fn is_valid(self) -> bool {
        self.fx.is_finite()
            && self.fy.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.fx.abs() > 1e-12
            && self.fy.abs() > 1e-12
    }

    /// The 3x3 camera matrix `K`.
    pub fn matrix(self) -> Matrix3<f64> {
        Matrix3::new(
            self.fx, 0.0, self.cx, //
            0.0, self.fy, self.cy, //
            0.0, 0.0, 1.0,
        )
    }

    /// Closed-form `K⁻¹`; `None` for invalid intrinsics.
    pub fn inverse_matrix(self) -> Option<Matrix3<f64>> {
        if !self.is_valid() {
            return None;
        }
        Some(Matrix3::new(
            1.0 / self.fx,
            0.0,
            -self.cx / self.fx,
            0.0,
            1.0 / self.fy,
            -self.cy / self.fy,
            0.0,
            0.0,
            1.0,
        ))
    }

    /// Convert pixel coordinates to normalized pinhole coordinates.
    pub fn pixel_to_normalized(self, pixel: Point2<f64>) -> Option<Point2<f64>> {
        if !self.is_valid() {
            return None;
        }
        let x = (pixel.x - self.cx) / self.fx;
        let y = (pixel.y - self.cy) / self.fy;
        (x.is_finite() && y.is_finite()).then(|| Point2::new(x, y))
    }

    /// Project a camera-frame point; `None` behind or on the image plane.
    pub fn project(self, p_cam: &Point3<f64>) -> Option<Point2<f64>> {
        if p_cam.z <= 1e-12 {
            return None;
        }
        Some(Point2::new(
            self.fx * p_cam.x / p_cam.z + self.cx,
            self.fy * p_cam.y / p_cam.z + self.cy,
        ))
    }

    /// Ray through `pixel` scaled so that its z component equals `depth`.
    pub fn back_project(self, pixel: Point2<f64>, depth: f64) -> Option<Vector3<f64>> {
        let k_inv = self.inverse_matrix()?;
        Some(k_inv * (Vector3::new(pixel.x, pixel.y, 1.0) * depth))
    }
}
