//! Rank-based adaptive threshold.

use basefinder_core::GrayImageView;

/// Intensity of the pixel at `rank` when all pixels are sorted brightest
/// first. Ranks past the end clamp to the darkest pixel.
///
/// Equivalent to a descending sort but computed from a histogram.
pub(crate) fn bright_rank_threshold(gray: &GrayImageView<'_>, rank: usize) -> Option<u8> {
    if gray.data.is_empty() {
        return None;
    }
    let rank = rank.min(gray.data.len() - 1);

    let mut hist = [0usize; 256];
    for &v in gray.data {
        hist[v as usize] += 1;
    }

    let mut seen = 0usize;
    for v in (0..=255u8).rev() {
        seen += hist[v as usize];
        if seen > rank {
            return Some(v);
        }
    }
    None
}
