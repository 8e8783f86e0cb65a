//! Utility functions for pixel regions and buffer formats.

pub mod image_conversion;
pub mod safe_cast;

use crate::Result;
use opencv::core::{Mat, Rect};
use opencv::imgproc;
use opencv::prelude::*;

/// Clip a rectangle to the bounds of a `width` x `height` image
///
/// Returns `None` when nothing of the rectangle remains inside the image.
#[must_use]
pub fn clip_to_image(rect: Rect, width: i32, height: i32) -> Option<Rect> {
    let mut clipped = rect;
    if clipped.x < 0 {
        clipped.width += clipped.x;
        clipped.x = 0;
    }
    if clipped.y < 0 {
        clipped.height += clipped.y;
        clipped.y = 0;
    }
    if clipped.x + clipped.width > width {
        clipped.width = width - clipped.x;
    }
    if clipped.y + clipped.height > height {
        clipped.height = height - clipped.y;
    }

    if clipped.width <= 0 || clipped.height <= 0 {
        None
    } else {
        Some(clipped)
    }
}

/// Convert an 8-bit gray, BGR or BGRA image to single-channel gray
///
/// # Errors
///
/// Returns an error if the OpenCV conversion fails
pub fn to_grayscale(image: &Mat) -> Result<Mat> {
    let mut gray = Mat::default();
    if image.channels() == 1 {
        image.copy_to(&mut gray)?;
    } else {
        // BGR2GRAY accepts both 3 and 4 channel input
        imgproc::cvt_color(image, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
    }
    Ok(gray)
}
