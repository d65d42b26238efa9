/// Errors raised when wrapping a raw pixel buffer.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    #[error("invalid image buffer length (expected {expected} bytes, got {got})")]
    BufferSize { expected: usize, got: usize },
    #[error("invalid image dimensions (width={width}, height={height}, channels={channels})")]
    Dimensions {
        width: usize,
        height: usize,
        channels: usize,
    },
}

/// Borrowed interleaved color frame.
///
/// Pixels are row-major with `channels` bytes each. For three channel frames
/// the byte order is R, G, B.
#[derive(Clone, Copy, Debug)]
pub struct ColorImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub channels: usize,
    pub data: &'a [u8], // len = w*h*channels
}

impl<'a> ColorImageView<'a> {
    /// Wrap a raw buffer, checking that its length matches the dimensions.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: &'a [u8],
    ) -> Result<Self, ImageError> {
        let expected = width
            .checked_mul(height)
            .and_then(|n| n.checked_mul(channels))
            .filter(|&n| n > 0)
            .ok_or(ImageError::Dimensions {
                width,
                height,
                channels,
            })?;
        if data.len() != expected {
            return Err(ImageError::BufferSize {
                expected,
                got: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// True when this is a well-formed three channel frame.
    pub fn is_rgb(&self) -> bool {
        self.channels == 3 && self.data.len() == self.width * self.height * 3
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let idx = (y * self.width + x) * self.channels;
        &self.data[idx..idx + self.channels]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct GrayImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8], // row-major, len = w*h
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrayImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl GrayImage {
    pub fn view(&self) -> GrayImageView<'_> {
        GrayImageView {
            width: self.width,
            height: self.height,
            data: &self.data,
        }
    }
}

/// Binary mask, one byte per pixel (0 or 1).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BinaryImage {
    pub width: usize,
    pub height: usize,
    pub data: Vec<u8>,
}

impl BinaryImage {
    pub fn zeros(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![0; width * height],
        }
    }

    #[inline]
    pub fn get(&self, x: i64, y: i64) -> Option<bool> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(self.data[y as usize * self.width + x as usize] != 0)
    }

    pub fn count_set(&self) -> usize {
        self.data.iter().filter(|&&v| v != 0).count()
    }
}

/// Convert an RGB frame to 8-bit luma using fixed-point BT.601 weights.
///
/// Returns `None` for anything but a well-formed three channel frame.
pub fn rgb_to_gray(src: &ColorImageView<'_>) -> Option<GrayImage> {
    if !src.is_rgb() {
        return None;
    }
    let data = src
        .data
        .chunks_exact(3)
        .map(|px| {
            let (r, g, b) = (px[0] as u32, px[1] as u32, px[2] as u32);
            ((r * 4899 + g * 9617 + b * 1868 + 8192) >> 14) as u8
        })
        .collect();
    Some(GrayImage {
        width: src.width,
        height: src.height,
        data,
    })
}

/// Foreground where the intensity is strictly above `threshold`.
pub fn binarize_above(src: &GrayImageView<'_>, threshold: u8) -> BinaryImage {
    BinaryImage {
        width: src.width,
        height: src.height,
        data: src.data.iter().map(|&v| u8::from(v > threshold)).collect(),
    }
}

/// Per-channel mean over a square window centered on `(cx, cy)`.
///
/// The window is clipped to the frame. Returns `None` when nothing of the
/// window overlaps the frame.
pub fn window_mean(src: &ColorImageView<'_>, cx: i64, cy: i64, size: usize) -> Option<Vec<f64>> {
    let half = (size / 2) as i64;
    let x0 = (cx - half).max(0);
    let y0 = (cy - half).max(0);
    let x1 = (cx - half + size as i64).min(src.width as i64);
    let y1 = (cy - half + size as i64).min(src.height as i64);
    if x0 >= x1 || y0 >= y1 || src.channels == 0 {
        return None;
    }

    let mut sums = vec![0u64; src.channels];
    for y in y0..y1 {
        for x in x0..x1 {
            for (acc, &v) in sums.iter_mut().zip(src.pixel(x as usize, y as usize)) {
                *acc += v as u64;
            }
        }
    }
    let n = ((x1 - x0) * (y1 - y0)) as f64;
    Some(sums.into_iter().map(|s| s as f64 / n).collect())
}
