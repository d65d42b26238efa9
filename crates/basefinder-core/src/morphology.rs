//! Binary erosion/dilation with the 2x2 cross structuring element.
//!
//! The 2x2 cross anchored at its center `(1, 1)` has three active taps
//! relative to the anchor: up `(0, -1)`, left `(-1, 0)` and the anchor
//! itself. Taps that fall outside the frame are ignored, so the border
//! neither erodes nor grows the mask.

use crate::BinaryImage;

const CROSS2_TAPS: [(i64, i64); 3] = [(0, -1), (-1, 0), (0, 0)];

fn apply_taps(src: &BinaryImage, require_all: bool) -> BinaryImage {
    let mut out = BinaryImage::zeros(src.width, src.height);
    for y in 0..src.height {
        for x in 0..src.width {
            let mut taps = CROSS2_TAPS
                .iter()
                .filter_map(|&(dx, dy)| src.get(x as i64 + dx, y as i64 + dy));
            let set = if require_all {
                taps.all(|v| v)
            } else {
                taps.any(|v| v)
            };
            out.data[y * src.width + x] = u8::from(set);
        }
    }
    out
}

/// Pixel survives only if every in-frame tap is set.
pub fn erode_cross2(src: &BinaryImage) -> BinaryImage {
    apply_taps(src, true)
}

/// Pixel is set if any in-frame tap is set.
pub fn dilate_cross2(src: &BinaryImage) -> BinaryImage {
    apply_taps(src, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask(width: usize, height: usize, rows: &[&str]) -> BinaryImage {
        let mut m = BinaryImage::zeros(width, height);
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                m.data[y * width + x] = u8::from(c == '#');
            }
        }
        m
    }

    #[test]
    fn erosion_removes_isolated_speckle() {
        let m = mask(3, 3, &["...", ".#.", "..."]);
        assert_eq!(erode_cross2(&m).count_set(), 0);
    }

    #[test]
    fn erosion_peels_top_and_left_edges() {
        let m = mask(5, 5, &[".....", ".###.", ".###.", ".###.", "....."]);
        let e = erode_cross2(&m);
        assert_eq!(e, mask(5, 5, &[".....", ".....", "..##.", "..##.", "....."]));
    }

    #[test]
    fn dilation_grows_down_and_right() {
        let m = mask(4, 4, &["....", ".#..", "....", "...."]);
        let d = dilate_cross2(&m);
        assert_eq!(d, mask(4, 4, &["....", ".##.", ".#..", "...."]));
    }

    #[test]
    fn frame_border_is_neutral() {
        let m = mask(2, 2, &["##", "##"]);
        assert_eq!(erode_cross2(&m), m);
    }
}
