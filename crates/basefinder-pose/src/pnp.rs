//! Perspective pose from points on a plane.
//!
//! The object points live on `Z = 0`. An initial `[R | t]` comes from the
//! plane-to-image homography in normalized camera coordinates
//! (`H ∝ [r1 r2 t]`); it is then refined by Levenberg-Marquardt
//! (`tiny_solver`) on the pixel reprojection error over the rotation vector
//! and translation.

use std::collections::HashMap;

use basefinder_core::{estimate_homography, CameraIntrinsics};
use nalgebra::{Matrix2, Matrix3, Point2, Point3, Rotation3, Vector2, Vector3, Vector6};
use tiny_solver::factors::na as ts_na;
use tiny_solver::Optimizer;

use crate::error::PoseError;
use crate::pose::CameraPose;

const MIN_POINTS: usize = 4;
const RVEC_KEY: &str = "rvec";
const T_KEY: &str = "t";

fn is_degenerate(points: &[Point2<f64>]) -> bool {
    let n = points.len() as f64;
    let mean = points
        .iter()
        .fold(Vector2::zeros(), |acc, p| acc + p.coords)
        / n;
    let mut cov = Matrix2::zeros();
    for p in points {
        let d = p.coords - mean;
        cov += d * d.transpose();
    }
    let eig = cov.symmetric_eigenvalues();
    let (lo, hi) = (eig.min(), eig.max());
    !(hi > 1e-18 && lo > 1e-9 * hi)
}

fn initial_pose(
    object: &[Point2<f64>],
    normalized: &[Point2<f64>],
) -> Result<(Matrix3<f64>, Vector3<f64>), PoseError> {
    let h = estimate_homography(object, normalized)
        .ok_or(PoseError::DegenerateGeometry)?
        .h;
    let (h1, h2, h3) = (
        h.column(0).into_owned(),
        h.column(1).into_owned(),
        h.column(2).into_owned(),
    );

    let norm = 0.5 * (h1.norm() + h2.norm());
    if !norm.is_finite() || norm < 1e-12 {
        return Err(PoseError::DegenerateGeometry);
    }
    // the plane must lie in front of the camera
    let scale = if h3.z < 0.0 { -1.0 / norm } else { 1.0 / norm };
    let r1 = h1 * scale;
    let r2 = h2 * scale;
    let t = h3 * scale;

    let approx = Matrix3::from_columns(&[r1, r2, r1.cross(&r2)]);
    let svd = approx.svd(true, true);
    let (u, v_t) = match (svd.u, svd.v_t) {
        (Some(u), Some(v_t)) => (u, v_t),
        _ => return Err(PoseError::DegenerateGeometry),
    };
    let mut r = u * v_t;
    if r.determinant() < 0.0 {
        r = u * Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -1.0)) * v_t;
    }
    Ok((r, t))
}

fn residuals(
    x: &Vector6<f64>,
    object: &[Point2<f64>],
    image: &[Point2<f64>],
    intrinsics: CameraIntrinsics,
) -> Option<Vec<Vector2<f64>>> {
    let rot = Rotation3::new(Vector3::new(x[0], x[1], x[2]));
    let t = Vector3::new(x[3], x[4], x[5]);
    object
        .iter()
        .zip(image)
        .map(|(o, obs)| {
            let cam = rot * Vector3::new(o.x, o.y, 0.0) + t;
            let px = intrinsics.project(&Point3::from(cam))?;
            Some(px - obs)
        })
        .collect()
}

fn squared_norm(r: &[Vector2<f64>]) -> f64 {
    r.iter().map(|v| v.norm_squared()).sum()
}

/// Pixel residual of one plane point `(x, y, 0)` under `(rvec, t)`.
#[derive(Debug, Clone)]
struct ReprojectionFactor {
    object: [f64; 2],
    pixel: [f64; 2],
    intrinsics: CameraIntrinsics,
}

impl<T: ts_na::RealField> tiny_solver::factors::Factor<T> for ReprojectionFactor {
    fn residual_func(&self, params: &[ts_na::DVector<T>]) -> ts_na::DVector<T> {
        let c = |v: f64| -> T { ts_na::convert(v) };
        let r = &params[0];
        let t = &params[1];
        let x = c(self.object[0]);
        let y = c(self.object[1]);
        let (rx, ry, rz) = (r[0].clone(), r[1].clone(), r[2].clone());

        let theta2 = rx.clone() * rx.clone() + ry.clone() * ry.clone() + rz.clone() * rz.clone();
        let (px, py, pz) = if theta2 > c(1e-16) {
            // Rodrigues: p cos + (k x p) sin + k (k . p)(1 - cos)
            let theta = theta2.sqrt();
            let kx = rx / theta.clone();
            let ky = ry / theta.clone();
            let kz = rz / theta.clone();
            let sin = theta.clone().sin();
            let cos = theta.cos();
            let w = (kx.clone() * x.clone() + ky.clone() * y.clone()) * (c(1.0) - cos.clone());
            let px = x.clone() * cos.clone() - kz.clone() * y.clone() * sin.clone()
                + kx.clone() * w.clone();
            let py = y.clone() * cos + kz.clone() * x.clone() * sin.clone() + ky.clone() * w.clone();
            let pz = (kx * y - ky * x) * sin + kz * w;
            (px, py, pz)
        } else {
            // first order near the identity
            let px = x.clone() - rz.clone() * y.clone();
            let py = y.clone() + rz * x.clone();
            let pz = rx * y - ry * x;
            (px, py, pz)
        };

        let xc = px + t[0].clone();
        let yc = py + t[1].clone();
        let zc = pz + t[2].clone();
        let k = &self.intrinsics;
        let u = c(k.fx) * xc / zc.clone() + c(k.cx) - c(self.pixel[0]);
        let v = c(k.fy) * yc / zc + c(k.cy) - c(self.pixel[1]);
        ts_na::DVector::<T>::from_vec(vec![u, v])
    }
}

/// Run Levenberg-Marquardt from `x0 = (rvec, t)`. `None` when the solver
/// gives up or returns malformed blocks.
fn refine(
    x0: &Vector6<f64>,
    object: &[Point2<f64>],
    image: &[Point2<f64>],
    intrinsics: CameraIntrinsics,
    max_iterations: usize,
) -> Option<Vector6<f64>> {
    let mut problem = tiny_solver::Problem::new();
    for (o, px) in object.iter().zip(image) {
        problem.add_residual_block(
            2,
            &[RVEC_KEY, T_KEY],
            Box::new(ReprojectionFactor {
                object: [o.x, o.y],
                pixel: [px.x, px.y],
                intrinsics,
            }),
            None,
        );
    }

    let mut initial_values = HashMap::<String, ts_na::DVector<f64>>::new();
    initial_values.insert(
        RVEC_KEY.to_string(),
        ts_na::DVector::<f64>::from_vec(vec![x0[0], x0[1], x0[2]]),
    );
    initial_values.insert(
        T_KEY.to_string(),
        ts_na::DVector::<f64>::from_vec(vec![x0[3], x0[4], x0[5]]),
    );

    let optimizer = tiny_solver::LevenbergMarquardtOptimizer::default();
    let options = tiny_solver::OptimizerOptions {
        max_iteration: max_iterations.clamp(1, 200),
        verbosity_level: 0,
        ..Default::default()
    };
    let result = optimizer.optimize(&problem, &initial_values, Some(options))?;
    let rvec = result.get(RVEC_KEY)?;
    let t = result.get(T_KEY)?;
    if rvec.len() != 3 || t.len() != 3 {
        return None;
    }
    let x = Vector6::new(rvec[0], rvec[1], rvec[2], t[0], t[1], t[2]);
    x.iter().all(|v| v.is_finite()).then_some(x)
}

/// Solve `x_cam = R · X + t` from points `object` on the plane `Z = 0` and
/// their observed pixels `image`.
///
/// Lens distortion is assumed to be zero. `max_iterations` bounds the
/// refinement; zero returns the closed-form homography pose.
pub fn solve_planar_pose(
    object: &[Point2<f64>],
    image: &[Point2<f64>],
    intrinsics: CameraIntrinsics,
    max_iterations: usize,
) -> Result<CameraPose, PoseError> {
    if object.len() != image.len() {
        return Err(PoseError::CountMismatch {
            object: object.len(),
            image: image.len(),
        });
    }
    if object.len() < MIN_POINTS {
        return Err(PoseError::TooFewPoints { got: object.len() });
    }
    let finite = |p: &Point2<f64>| p.x.is_finite() && p.y.is_finite();
    if !intrinsics.is_valid() || !object.iter().all(finite) || !image.iter().all(finite) {
        return Err(PoseError::NonFinite);
    }
    let normalized: Vec<Point2<f64>> = image
        .iter()
        .map(|&p| intrinsics.pixel_to_normalized(p))
        .collect::<Option<_>>()
        .ok_or(PoseError::NonFinite)?;
    if is_degenerate(object) || is_degenerate(&normalized) {
        return Err(PoseError::DegenerateGeometry);
    }

    let (r0, t0) = initial_pose(object, &normalized)?;
    let rvec0 = Rotation3::from_matrix_unchecked(r0).scaled_axis();
    let x0 = Vector6::new(rvec0.x, rvec0.y, rvec0.z, t0.x, t0.y, t0.z);
    let Some(r0) = residuals(&x0, object, image, intrinsics) else {
        // some point projects behind the camera
        return Err(PoseError::DegenerateGeometry);
    };
    let cost0 = squared_norm(&r0);

    let refined = (max_iterations > 0)
        .then(|| refine(&x0, object, image, intrinsics, max_iterations))
        .flatten()
        .and_then(|x| {
            let cost = squared_norm(&residuals(&x, object, image, intrinsics)?);
            (cost.is_finite() && cost <= cost0).then_some((x, cost))
        });
    let (x, cost) = match refined {
        Some(best) => best,
        None => {
            if max_iterations > 0 {
                log::debug!("pose refinement did not improve cost {cost0:.3e}, keeping closed form");
            }
            (x0, cost0)
        }
    };
    let rvec = Vector3::new(x[0], x[1], x[2]);
    let translation = Vector3::new(x[3], x[4], x[5]);
    let pose = CameraPose {
        rms_reprojection_px: (cost / object.len() as f64).sqrt(),
        num_points: object.len(),
        ..CameraPose::from_rvec(rvec, translation)
    };
    if !pose.is_finite() {
        return Err(PoseError::NonFinite);
    }
    Ok(pose)
}
