//! Minimum enclosing circle (Welzl, iterative form).
//!
//! Points are visited in input order, without the usual random shuffle, so
//! the result is a deterministic function of the input. The window sizes
//! used here are tiny, so the cubic worst case does not matter.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-9;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnclosingCircle {
    pub center: Point2<f64>,
    pub radius: f64,
}

impl EnclosingCircle {
    fn point(p: Point2<f64>) -> Self {
        Self {
            center: p,
            radius: 0.0,
        }
    }

    fn diameter(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self {
            center: nalgebra::center(&a, &b),
            radius: 0.5 * (a - b).norm(),
        }
    }

    /// Circumcircle, or the widest two-point circle when `a`, `b`, `c` are
    /// collinear.
    fn through(a: Point2<f64>, b: Point2<f64>, c: Point2<f64>) -> Self {
        let ab = b - a;
        let ac = c - a;
        let d = 2.0 * (ab.x * ac.y - ab.y * ac.x);
        let scale = ab.norm_squared().max(ac.norm_squared());
        if d.abs() <= EPS * scale {
            return [Self::diameter(a, b), Self::diameter(a, c), Self::diameter(b, c)]
                .into_iter()
                .fold(Self::point(a), |best, cand| {
                    if cand.radius > best.radius {
                        cand
                    } else {
                        best
                    }
                });
        }
        let ux = (ac.y * ab.norm_squared() - ab.y * ac.norm_squared()) / d;
        let uy = (ab.x * ac.norm_squared() - ac.x * ab.norm_squared()) / d;
        let offset = nalgebra::Vector2::new(ux, uy);
        Self {
            center: a + offset,
            radius: offset.norm(),
        }
    }

    /// Inclusive containment with a small relative tolerance.
    pub fn contains(&self, p: &Point2<f64>) -> bool {
        (p - self.center).norm() <= self.radius + EPS * self.radius.max(1.0)
    }
}

/// Smallest circle containing every point.
///
/// Returns `None` for an empty slice or when any coordinate is not finite.
pub fn min_enclosing_circle(points: &[Point2<f64>]) -> Option<EnclosingCircle> {
    let (&first, _) = points.split_first()?;
    if !points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        return None;
    }

    let mut circle = EnclosingCircle::point(first);
    for i in 1..points.len() {
        let p = points[i];
        if circle.contains(&p) {
            continue;
        }
        circle = EnclosingCircle::point(p);
        for j in 0..i {
            let q = points[j];
            if circle.contains(&q) {
                continue;
            }
            circle = EnclosingCircle::diameter(p, q);
            for &r in &points[..j] {
                if !circle.contains(&r) {
                    circle = EnclosingCircle::through(p, q, r);
                }
            }
        }
    }
    Some(circle)
}
