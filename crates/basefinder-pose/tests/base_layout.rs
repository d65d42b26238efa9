use approx::assert_relative_eq;
use basefinder_core::CameraIntrinsics;
use basefinder_pose::{
    CameraPose, GroundProjector, PoseError, PoseEstimator, PoseParams, TagDetection, TagLayout,
};
use nalgebra::{Point2, Point3, Vector3};

/// Camera about 2.5 m above the middle of the base, slightly tilted.
fn hover_pose() -> CameraPose {
    CameraPose::from_rvec(Vector3::new(0.08, -0.06, 0.3), Vector3::new(-1.0, -0.95, 2.5))
}

fn render_tag(id: u32, printed_id: u32, pose: &CameraPose) -> TagDetection {
    let layout = TagLayout::default();
    let k = CameraIntrinsics::default();
    let corners = layout.object_corners(id).expect("tag in layout").map(|c| {
        let px = pose
            .project(k, &Point3::new(c.x, c.y, 0.0))
            .expect("in front");
        Point2::new(px.x as f32, px.y as f32)
    });
    TagDetection {
        id: printed_id,
        corners,
        hamming: 0,
    }
}

#[test]
fn recovers_pose_from_all_base_tags() {
    let truth = hover_pose();
    let tags: Vec<TagDetection> = (0..7)
        .map(|id| render_tag(id, id, &truth))
        .chain(std::iter::once(render_tag(7, 10, &truth)))
        .collect();

    let estimator = PoseEstimator::default();
    assert_eq!(estimator.usable_tags(&tags).len(), 8);
    let pose = estimator.estimate(&tags).expect("pose");

    assert_eq!(pose.num_points, 32);
    // corners were rounded to f32
    assert!(pose.rms_reprojection_px < 1e-3);
    assert_relative_eq!(pose.rotation, truth.rotation, epsilon = 1e-5);
    assert_relative_eq!(pose.translation, truth.translation, epsilon = 1e-5);
    assert_relative_eq!(pose.camera_center(), truth.camera_center(), epsilon = 1e-4);
}

#[test]
fn zero_iterations_keeps_the_closed_form_pose() {
    let truth = hover_pose();
    let tags: Vec<TagDetection> = (0..8).map(|id| render_tag(id, id, &truth)).collect();
    let params = PoseParams {
        max_iterations: 0,
        ..PoseParams::default()
    };
    assert!(params.validate().is_ok());

    let closed = PoseEstimator::new(params).estimate(&tags).expect("pose");
    let refined = PoseEstimator::default().estimate(&tags).expect("pose");
    assert_eq!(closed.num_points, 32);
    assert!(refined.rms_reprojection_px <= closed.rms_reprojection_px + 1e-12);
    assert_relative_eq!(closed.translation, truth.translation, epsilon = 1e-3);
}

#[test]
fn unusable_tags_yield_no_pose() {
    let truth = hover_pose();
    let mut noisy = render_tag(2, 2, &truth);
    noisy.hamming = 1;
    let stranger = render_tag(3, 12, &truth);

    let err = PoseEstimator::default()
        .estimate(&[noisy, stranger])
        .expect_err("nothing usable");
    assert_eq!(err, PoseError::NoTags);
}

#[test]
fn reprojection_gate_rejects_inconsistent_tags() {
    let truth = hover_pose();
    let mut tags: Vec<TagDetection> = (0..8).map(|id| render_tag(id, id, &truth)).collect();
    // tag 4 decoded a quarter turn off
    tags[4].corners.rotate_left(1);

    let params = PoseParams {
        max_rms_px: Some(1.0),
        ..PoseParams::default()
    };
    match PoseEstimator::new(params).estimate(&tags) {
        Err(PoseError::ReprojectionTooLarge { rms_px, max_px }) => {
            assert!(rms_px > max_px);
        }
        other => panic!("expected reprojection failure, got {other:?}"),
    }
}

#[test]
fn armor_under_camera_center_projects_below_camera() {
    let truth = hover_pose();
    let tags: Vec<TagDetection> = (0..8).map(|id| render_tag(id, id, &truth)).collect();
    let pose = PoseEstimator::default().estimate(&tags).expect("pose");

    let projector = GroundProjector::default();
    let k = projector.intrinsics();
    let ground = projector
        .project(Point2::new(k.cx, k.cy), &pose)
        .expect("finite");

    // the principal ray hits the point 2 m along the optical axis
    let axis = pose.rotation.transpose() * Vector3::z();
    let expected = pose.camera_center() + axis * 2.0;
    assert_relative_eq!(ground, expected, epsilon = 1e-6);
}
