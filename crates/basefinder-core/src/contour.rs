//! Border following (Suzuki & Abe) on binary masks.
//!
//! The mask is copied into a zero-padded `i32` label buffer, every border
//! is traced once and labelled with its sequence number. Only outer borders
//! are returned; hole borders are traced (so their pixels get labelled) and
//! then dropped.

use nalgebra::Point2;

use crate::BinaryImage;

/// 8-neighbourhood offsets `(dx, dy)`, counter-clockwise starting east.
const NEIGHBORHOOD: [[i32; 2]; 8] = [
    [1, 0],
    [1, -1],
    [0, -1],
    [-1, -1],
    [-1, 0],
    [-1, 1],
    [0, 1],
    [1, 1],
];

/// One traced outer border, in image pixel coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Contour {
    pub points: Vec<Point2<i32>>,
}

impl Contour {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Flat offsets of the 8 neighbours for a padded row stride, repeated twice
/// so the tracer can run past index 7 without wrapping.
fn neighborhood_deltas(stride: i32) -> [isize; 16] {
    let mut deltas = [0isize; 16];
    for (i, n) in NEIGHBORHOOD.iter().enumerate() {
        let d = (n[0] + n[1] * stride) as isize;
        deltas[i] = d;
        deltas[i + 8] = d;
    }
    deltas
}

fn padded_labels(mask: &BinaryImage) -> Vec<i32> {
    let stride = mask.width + 2;
    let mut buf = vec![0i32; stride * (mask.height + 2)];
    for y in 0..mask.height {
        let row = &mask.data[y * mask.width..(y + 1) * mask.width];
        let dst = &mut buf[(y + 1) * stride + 1..(y + 1) * stride + 1 + mask.width];
        for (d, &v) in dst.iter_mut().zip(row) {
            *d = i32::from(v != 0);
        }
    }
    buf
}

fn follow_border(
    labels: &mut [i32],
    pos: usize,
    nbd: i32,
    start: Point2<i32>,
    hole: bool,
    deltas: &[isize; 16],
) -> Vec<Point2<i32>> {
    let at = |p: usize, s: usize| (p as isize + deltas[s]) as usize;
    let mut points = Vec::new();
    let mut point = start;

    let mut s: usize = if hole { 0 } else { 4 };
    let mut s_end = s;
    let mut pos1;
    loop {
        s = s.wrapping_sub(1) & 7;
        pos1 = at(pos, s);
        if labels[pos1] != 0 || s == s_end {
            break;
        }
    }

    if labels[pos1] == 0 {
        // isolated pixel
        labels[pos] = -nbd;
        points.push(point);
        return points;
    }

    let mut pos3 = pos;
    loop {
        s_end = s;
        let mut pos4;
        loop {
            s = (s + 1) & 15;
            pos4 = at(pos3, s);
            if labels[pos4] != 0 {
                break;
            }
        }
        s &= 7;

        if (s.wrapping_sub(1) as u32) < s_end as u32 {
            labels[pos3] = -nbd;
        } else if labels[pos3] == 1 {
            labels[pos3] = nbd;
        }

        points.push(point);
        point.x += NEIGHBORHOOD[s][0];
        point.y += NEIGHBORHOOD[s][1];

        if pos4 == pos && pos3 == pos1 {
            break;
        }
        pos3 = pos4;
        s = (s + 4) & 7;
    }
    points
}

/// Trace the outer borders of all foreground components in `mask`.
///
/// Contours come out in raster order of their first pixel, which keeps the
/// result deterministic for a given mask.
pub fn find_outer_contours(mask: &BinaryImage) -> Vec<Contour> {
    let (width, height) = (mask.width, mask.height);
    let mut labels = padded_labels(mask);
    let deltas = neighborhood_deltas((width + 2) as i32);
    let mut out = Vec::new();

    let mut nbd = 1;
    let mut pos = width + 3;
    for y in 0..height {
        for x in 0..width {
            let pix = labels[pos];
            if pix != 0 {
                let outer = pix == 1 && labels[pos - 1] == 0;
                let hole = !outer && pix >= 1 && labels[pos + 1] == 0;
                if outer || hole {
                    nbd += 1;
                    let start = Point2::new(x as i32, y as i32);
                    let points = follow_border(&mut labels, pos, nbd, start, hole, &deltas);
                    if outer {
                        out.push(Contour { points });
                    }
                }
            }
            pos += 1;
        }
        pos += 2;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_from(width: usize, rows: &[&str]) -> BinaryImage {
        let mut m = BinaryImage::zeros(width, rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                m.data[y * width + x] = u8::from(c == '#');
            }
        }
        m
    }

    #[test]
    fn empty_mask_has_no_contours() {
        let m = BinaryImage::zeros(6, 4);
        assert!(find_outer_contours(&m).is_empty());
    }

    #[test]
    fn ring_yields_single_outer_border() {
        let m = mask_from(5, &[".....", ".###.", ".#.#.", ".###.", "....."]);
        let contours = find_outer_contours(&m);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 8);
        assert_eq!(contours[0].points[0], Point2::new(1, 1));
    }

    #[test]
    fn separate_blobs_are_traced_in_raster_order() {
        let m = mask_from(
            8,
            &["........", ".##..#..", ".##..#..", "........"],
        );
        let contours = find_outer_contours(&m);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].points[0], Point2::new(1, 1));
        assert_eq!(contours[1].points[0], Point2::new(5, 1));
    }

    #[test]
    fn isolated_pixel_is_a_one_point_contour() {
        let m = mask_from(3, &["...", ".#.", "..."]);
        let contours = find_outer_contours(&m);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points, vec![Point2::new(1, 1)]);
    }
}
