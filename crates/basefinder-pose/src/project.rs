use basefinder_core::CameraIntrinsics;
use nalgebra::{Point2, Point3};

use crate::estimator::PoseParams;
use crate::pose::CameraPose;

/// Back-projects an image point to world coordinates at a fixed camera
/// depth.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroundProjector {
    intrinsics: CameraIntrinsics,
    ground_depth: f64,
}

impl Default for GroundProjector {
    fn default() -> Self {
        Self::from_params(&PoseParams::default())
    }
}

impl GroundProjector {
    pub fn new(intrinsics: CameraIntrinsics, ground_depth: f64) -> Self {
        Self {
            intrinsics,
            ground_depth,
        }
    }

    pub fn from_params(params: &PoseParams) -> Self {
        Self::new(params.intrinsics, params.ground_depth)
    }

    pub fn intrinsics(&self) -> CameraIntrinsics {
        self.intrinsics
    }

    pub fn ground_depth(&self) -> f64 {
        self.ground_depth
    }

    /// World point seen at `pixel`, assuming it sits `ground_depth` in front
    /// of the camera: `Rᵀ (K⁻¹ · Zc [u, v, 1]ᵀ - t)`.
    pub fn project(&self, pixel: Point2<f64>, pose: &CameraPose) -> Option<Point3<f64>> {
        let cam = self.intrinsics.back_project(pixel, self.ground_depth)?;
        let world = pose.camera_to_world(&Point3::from(cam));
        world.iter().all(|v| v.is_finite()).then_some(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn principal_point_with_identity_pose_lands_on_axis() {
        let projector = GroundProjector::default();
        let k = projector.intrinsics();
        let p = projector
            .project(Point2::new(k.cx, k.cy), &CameraPose::identity())
            .expect("finite");
        assert_relative_eq!(p, Point3::new(0.0, 0.0, 2.0), epsilon = 1e-12);
    }

    #[test]
    fn inverts_projection_at_the_given_depth() {
        let k = CameraIntrinsics::default();
        let pose = CameraPose::from_rvec(Vector3::new(0.05, 0.1, -0.3), Vector3::new(-1.0, -0.8, 2.4));
        // a world point that ends up exactly 2 m in front of the camera
        let cam = Point3::new(0.3, -0.1, 2.0);
        let world = pose.camera_to_world(&cam);
        let pixel = k.project(&cam).expect("in front");

        let back = GroundProjector::new(k, 2.0)
            .project(pixel, &pose)
            .expect("finite");
        assert_relative_eq!(back, world, epsilon = 1e-9);
    }

    #[test]
    fn invalid_intrinsics_give_none() {
        let projector = GroundProjector::new(CameraIntrinsics::new(0.0, 0.0, 0.0, 0.0), 2.0);
        assert!(projector
            .project(Point2::new(1.0, 1.0), &CameraPose::identity())
            .is_none());
    }
}
