//! Garment sprite placement and alpha blending.

use crate::garment::Garment;
use crate::utils::safe_cast::{round_to_i32, truncate_to_i32};
use crate::{Error, Result};
use log::warn;
use opencv::core::{self, Mat, Point2d, Rect, Size, Vector};
use opencv::imgproc;
use opencv::prelude::*;

/// What happened when a sprite was drawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOutcome {
    /// Blended through the sprite's alpha channel
    Blended,
    /// Sprite had no alpha channel and was copied opaquely
    Opaque,
    /// Nothing visible to draw
    Skipped,
}

/// Matching regions of the base image and the scaled sprite
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Region of the base image that is overwritten
    pub target: Rect,
    /// Region of the scaled sprite that is copied
    pub source: Rect,
}

/// Place a `sprite_size` sprite so that `center` (sprite pixels) lands on
/// `anchor` (base pixels), cropping whatever falls outside the base
///
/// Returns `None` when nothing of the sprite is visible.
#[must_use]
pub fn placement(base_size: Size, sprite_size: Size, center: Point2d, anchor: Point2d) -> Option<Placement> {
    let mut x = truncate_to_i32(anchor.x - center.x);
    let mut y = truncate_to_i32(anchor.y - center.y);
    let mut width = sprite_size.width;
    let mut height = sprite_size.height;
    let mut source_x = 0;
    let mut source_y = 0;

    if x < 0 {
        source_x = -x;
        width += x;
        x = 0;
    } else if x > base_size.width {
        return None;
    }

    if y < 0 {
        source_y = -y;
        height += y;
        y = 0;
    } else if y > base_size.height {
        return None;
    }

    width = width.min(base_size.width - x);
    height = height.min(base_size.height - y);
    if width <= 0 || height <= 0 {
        return None;
    }

    Some(Placement {
        target: Rect::new(x, y, width, height),
        source: Rect::new(source_x, source_y, width, height),
    })
}

/// Convert sprite colour channels to the channel count of the base image
fn match_channels(sprite: &Mat, channels: i32) -> Result<Mat> {
    let code = match (sprite.channels(), channels) {
        (from, to) if from == to => return Ok(sprite.try_clone()?),
        (4, 3) => imgproc::COLOR_BGRA2BGR,
        (3, 4) => imgproc::COLOR_BGR2BGRA,
        (4, 1) => imgproc::COLOR_BGRA2GRAY,
        (3, 1) => imgproc::COLOR_BGR2GRAY,
        (1, 3) => imgproc::COLOR_GRAY2BGR,
        (1, 4) => imgproc::COLOR_GRAY2BGRA,
        (from, to) => {
            return Err(Error::InvalidInput(format!(
                "Cannot draw a {from} channel sprite onto a {to} channel image"
            )))
        }
    };
    let mut converted = Mat::default();
    imgproc::cvt_color(sprite, &mut converted, code, 0)?;
    Ok(converted)
}

/// Draw `garment` onto `base`, scaled by `scale` with its reference centre at `anchor`
///
/// The sprite's fourth channel is used as a copy mask. Sprites without one
/// are copied opaquely.
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails or the channel layouts are incompatible
pub fn draw_clothing_on_image(base: &mut Mat, garment: &Garment, scale: f64, anchor: Point2d) -> Result<BlendOutcome> {
    let sprite = garment.buffer();
    let width = round_to_i32(f64::from(sprite.cols()) * scale);
    let height = round_to_i32(f64::from(sprite.rows()) * scale);
    if width <= 0 || height <= 0 {
        return Ok(BlendOutcome::Skipped);
    }

    let reference = garment.reference_center();
    let center = Point2d::new(reference.x * scale, reference.y * scale);
    let Some(placement) = placement(base.size()?, Size::new(width, height), center, anchor) else {
        return Ok(BlendOutcome::Skipped);
    };

    let mut resized = Mat::default();
    imgproc::resize(sprite, &mut resized, Size::new(width, height), 0.0, 0.0, imgproc::INTER_LINEAR)?;
    let visible = Mat::roi(&resized, placement.source)?.try_clone()?;
    let colour = match_channels(&visible, base.channels())?;

    let mut target = base.roi_mut(placement.target)?;
    if visible.channels() > 3 {
        let mut planes = Vector::<Mat>::new();
        core::split(&visible, &mut planes)?;
        let alpha = planes.get(3)?;
        colour.copy_to_masked(&mut target, &alpha)?;
        Ok(BlendOutcome::Blended)
    } else {
        colour.copy_to(&mut target)?;
        warn!("Alpha channel not found, garment drawn opaquely");
        Ok(BlendOutcome::Opaque)
    }
}
