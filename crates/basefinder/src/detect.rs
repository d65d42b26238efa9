//! Adapters from `image` types into the borrowed frame views, plus
//! file-based helpers.

use std::path::Path;

use basefinder_core::ColorImageView;
use basefinder_pose::TagDetection;

use crate::pipeline::{BaseLocator, FrameReport, LocateError};

/// Borrow an `image::RgbImage` as a three channel frame.
pub fn rgb_view(img: &::image::RgbImage) -> ColorImageView<'_> {
    ColorImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        channels: 3,
        data: img.as_raw(),
    }
}

/// Decode any supported image file into 8-bit RGB.
pub fn load_rgb(path: &Path) -> Result<::image::RgbImage, LocateError> {
    let img = ::image::open(path).map_err(|source| LocateError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(img.to_rgb8())
}

/// Run the locator on a decoded image.
pub fn process_image(
    locator: &mut BaseLocator,
    img: &::image::RgbImage,
    tags: &[TagDetection],
) -> FrameReport {
    locator.process_frame(&rgb_view(img), tags)
}

/// Run the locator on any `DynamicImage`, converting to RGB first.
pub fn process_dynamic(
    locator: &mut BaseLocator,
    img: &::image::DynamicImage,
    tags: &[TagDetection],
) -> FrameReport {
    process_image(locator, &img.to_rgb8(), tags)
}

/// Run the locator on a raw interleaved RGB buffer.
pub fn process_rgb_buffer(
    locator: &mut BaseLocator,
    width: usize,
    height: usize,
    data: &[u8],
    tags: &[TagDetection],
) -> Result<FrameReport, LocateError> {
    let view = ColorImageView::new(width, height, 3, data)?;
    Ok(locator.process_frame(&view, tags))
}
