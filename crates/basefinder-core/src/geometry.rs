use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Size2 {
    pub width: f32,
    pub height: f32,
}

impl Size2 {
    #[inline]
    pub fn long_side(&self) -> f32 {
        self.width.max(self.height)
    }

    #[inline]
    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }
}

/// Oriented rectangle.
///
/// `size.width` is measured along the direction `angle_deg` (degrees,
/// clockwise in image coordinates since y points down), `size.height`
/// along the perpendicular. Rectangles produced by [`min_area_rect`] keep
/// `angle_deg` in `[0, 90)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f32>,
    pub size: Size2,
    pub angle_deg: f32,
}

impl RotatedRect {
    /// Long side over short side; infinite for a degenerate rectangle.
    pub fn aspect_ratio(&self) -> f32 {
        let short = self.size.short_side();
        if short <= 0.0 {
            return f32::INFINITY;
        }
        self.size.long_side() / short
    }

    /// Direction of the long side, in degrees.
    pub fn long_axis_deg(&self) -> f32 {
        if self.size.width < self.size.height {
            self.angle_deg + 90.0
        } else {
            self.angle_deg
        }
    }

    /// Corner points, counter-clockwise from `center - w/2·u - h/2·v`.
    pub fn corners(&self) -> [Point2<f32>; 4] {
        let a = self.angle_deg.to_radians();
        let u = Vector2::new(a.cos(), a.sin()) * (0.5 * self.size.width);
        let v = Vector2::new(-a.sin(), a.cos()) * (0.5 * self.size.height);
        let c = self.center;
        [c - u - v, c + u - v, c + u + v, c - u + v]
    }
}

/// Absolute polygon area (shoelace) of a closed contour.
pub fn contour_area(points: &[Point2<i32>]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let mut acc = 0i64;
    for (i, p) in points.iter().enumerate() {
        let q = points[(i + 1) % points.len()];
        acc += p.x as i64 * q.y as i64 - q.x as i64 * p.y as i64;
    }
    (acc as f64 * 0.5).abs()
}

fn cross(o: Point2<f64>, a: Point2<f64>, b: Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull (monotone chain), counter-clockwise, without collinear points.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(2 * pts.len());
    for &p in &pts {
        while hull.len() >= 2 && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(p);
    }
    let lower_len = hull.len() + 1;
    for &p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(hull[hull.len() - 2], hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(p);
    }
    hull.pop();
    hull
}

/// Minimum-area enclosing rectangle of a point set (rotating calipers over
/// the convex hull edges).
///
/// Returns `None` for an empty input. One or two distinct points give a
/// rectangle with a zero side.
pub fn min_area_rect(points: &[Point2<i32>]) -> Option<RotatedRect> {
    let pts: Vec<Point2<f64>> = points
        .iter()
        .map(|p| Point2::new(p.x as f64, p.y as f64))
        .collect();
    let hull = convex_hull(&pts);

    match hull.len() {
        0 => return None,
        1 => {
            return Some(RotatedRect {
                center: hull[0].cast::<f32>(),
                size: Size2 {
                    width: 0.0,
                    height: 0.0,
                },
                angle_deg: 0.0,
            })
        }
        _ => {}
    }

    // (area, u, min_u, max_u, min_v, max_v)
    let mut best: Option<(f64, Vector2<f64>, f64, f64, f64, f64)> = None;
    for i in 0..hull.len() {
        let edge = hull[(i + 1) % hull.len()] - hull[i];
        let len = edge.norm();
        if len <= f64::EPSILON {
            continue;
        }
        let u = edge / len;
        let v = Vector2::new(-u.y, u.x);

        let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
        for p in &hull {
            let pu = p.coords.dot(&u);
            let pv = p.coords.dot(&v);
            min_u = min_u.min(pu);
            max_u = max_u.max(pu);
            min_v = min_v.min(pv);
            max_v = max_v.max(pv);
        }
        let area = (max_u - min_u) * (max_v - min_v);
        if best.as_ref().is_none_or(|b| area < b.0 - 1e-9) {
            best = Some((area, u, min_u, max_u, min_v, max_v));
        }
    }

    let (_, u, min_u, max_u, min_v, max_v) = best?;
    let v = Vector2::new(-u.y, u.x);
    let center = u * (0.5 * (min_u + max_u)) + v * (0.5 * (min_v + max_v));
    let mut width = max_u - min_u;
    let mut height = max_v - min_v;

    // fold the edge direction into [0, 90), swapping sides on each quarter turn
    let mut angle = u.y.atan2(u.x).to_degrees().rem_euclid(180.0);
    if angle >= 90.0 {
        angle -= 90.0;
        std::mem::swap(&mut width, &mut height);
    }
    if angle >= 90.0 - 1e-9 {
        angle = 0.0;
        std::mem::swap(&mut width, &mut height);
    }

    Some(RotatedRect {
        center: Point2::new(center.x as f32, center.y as f32),
        size: Size2 {
            width: width as f32,
            height: height as f32,
        },
        angle_deg: angle as f32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rect_outline(x0: i32, y0: i32, w: i32, h: i32) -> Vec<Point2<i32>> {
        let mut pts = Vec::new();
        for x in x0..x0 + w {
            pts.push(Point2::new(x, y0));
            pts.push(Point2::new(x, y0 + h - 1));
        }
        for y in y0..y0 + h {
            pts.push(Point2::new(x0, y));
            pts.push(Point2::new(x0 + w - 1, y));
        }
        pts
    }

    #[test]
    fn shoelace_area_of_square() {
        let sq = [
            Point2::new(0, 0),
            Point2::new(4, 0),
            Point2::new(4, 4),
            Point2::new(0, 4),
        ];
        assert_abs_diff_eq!(contour_area(&sq), 16.0);
        let rev: Vec<_> = sq.iter().rev().copied().collect();
        assert_abs_diff_eq!(contour_area(&rev), 16.0);
        assert_eq!(contour_area(&sq[..2]), 0.0);
    }

    #[test]
    fn hull_drops_interior_points() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(2.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(2.0, 2.0),
            Point2::new(0.0, 2.0),
            Point2::new(1.0, 0.0),
        ];
        assert_eq!(convex_hull(&pts).len(), 4);
    }

    #[test]
    fn vertical_bar_rect() {
        let rect = min_area_rect(&rect_outline(10, 20, 4, 12)).expect("rect");
        assert_abs_diff_eq!(rect.center.x, 11.5, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.center.y, 25.5, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.size.short_side(), 3.0, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.size.long_side(), 11.0, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.angle_deg, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(rect.long_axis_deg(), 90.0, epsilon = 1e-4);
    }

    #[test]
    fn tilted_segment_rect_follows_direction() {
        let pts: Vec<_> = (0..10).map(|i| Point2::new(i, i)).collect();
        let rect = min_area_rect(&pts).expect("rect");
        assert_abs_diff_eq!(rect.angle_deg, 45.0, epsilon = 1e-3);
        assert_abs_diff_eq!(rect.size.long_side(), 9.0 * 2f32.sqrt(), epsilon = 1e-3);
        assert_abs_diff_eq!(rect.size.short_side(), 0.0, epsilon = 1e-3);
        assert!(rect.aspect_ratio().is_infinite());
    }

    #[test]
    fn empty_input_has_no_rect() {
        assert!(min_area_rect(&[]).is_none());
    }
}
