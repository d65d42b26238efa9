use basefinder_core::CameraIntrinsics;
use nalgebra::{Matrix3, Point2, Point3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Rigid world-to-camera transform, `x_cam = R · X_world + t`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3<f64>,
    /// Axis-angle form of `rotation` (radians).
    pub rvec: Vector3<f64>,
    /// RMS pixel distance between observed and reprojected corners.
    pub rms_reprojection_px: f64,
    /// Number of point correspondences the pose was solved from.
    pub num_points: usize,
}

impl CameraPose {
    /// Pose from a rotation vector and translation, without fit statistics.
    pub fn from_rvec(rvec: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self {
            rotation: Rotation3::new(rvec).into_inner(),
            translation,
            rvec,
            rms_reprojection_px: 0.0,
            num_points: 0,
        }
    }

    pub fn identity() -> Self {
        Self::from_rvec(Vector3::zeros(), Vector3::zeros())
    }

    /// Camera optical center in world coordinates, `-Rᵀ t`.
    pub fn camera_center(&self) -> Point3<f64> {
        Point3::from(-(self.rotation.transpose() * self.translation))
    }

    #[inline]
    pub fn world_to_camera(&self, world: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation * world.coords + self.translation)
    }

    #[inline]
    pub fn camera_to_world(&self, cam: &Point3<f64>) -> Point3<f64> {
        Point3::from(self.rotation.transpose() * (cam.coords - self.translation))
    }

    /// Pixel of a world point; `None` when it is behind the camera.
    pub fn project(&self, intrinsics: CameraIntrinsics, world: &Point3<f64>) -> Option<Point2<f64>> {
        intrinsics.project(&self.world_to_camera(world))
    }

    pub(crate) fn is_finite(&self) -> bool {
        self.rotation.iter().all(|v| v.is_finite())
            && self.translation.iter().all(|v| v.is_finite())
            && self.rms_reprojection_px.is_finite()
    }
}
