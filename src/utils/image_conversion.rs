//! Conversion between `image` buffers and OpenCV Mats.
//!
//! `RgbaImage` plays the role of the host's platform image; the pipeline
//! itself works on BGR/BGRA `Mat`s.

use crate::utils::safe_cast::{i32_to_u32, u32_to_i32};
use crate::{Error, Result};
use image::{Rgba, RgbaImage};
use opencv::core::{Mat, Scalar, Vec3b, Vec4b, VecN, CV_8UC4};
use opencv::prelude::*;

/// Convert an RGBA image to a 4-channel BGRA Mat
///
/// # Errors
/// * Returns error if the image is empty or too large for a Mat
/// * Returns error if Mat creation fails
pub fn mat_from_rgba_image(image: &RgbaImage) -> Result<Mat> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::InvalidInput(format!(
            "Invalid image dimensions: {width}x{height}"
        )));
    }

    let rows = u32_to_i32(height)?;
    let cols = u32_to_i32(width)?;
    let mut mat = Mat::new_rows_cols_with_default(rows, cols, CV_8UC4, Scalar::default())?;

    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        *mat.at_2d_mut::<Vec4b>(u32_to_i32(y)?, u32_to_i32(x)?)? = VecN([b, g, r, a]);
    }

    Ok(mat)
}

/// Convert an 8-bit Mat (gray, BGR or BGRA) to an RGBA image
///
/// Missing alpha is filled with 255.
///
/// # Errors
/// * Returns error if Mat dimensions are invalid
/// * Returns error if the channel count is unsupported
pub fn rgba_image_from_mat(mat: &Mat) -> Result<RgbaImage> {
    let rows = mat.rows();
    let cols = mat.cols();
    let channels = mat.channels();

    if rows <= 0 || cols <= 0 {
        return Err(Error::InvalidInput(format!(
            "Invalid Mat dimensions: {rows}x{cols}x{channels}"
        )));
    }

    let mut image = RgbaImage::new(i32_to_u32(cols)?, i32_to_u32(rows)?);

    for row in 0..rows {
        for col in 0..cols {
            let rgba = match channels {
                4 => {
                    let p = mat.at_2d::<Vec4b>(row, col)?;
                    [p[2], p[1], p[0], p[3]]
                }
                3 => {
                    let p = mat.at_2d::<Vec3b>(row, col)?;
                    [p[2], p[1], p[0], 255]
                }
                1 => {
                    let v = *mat.at_2d::<u8>(row, col)?;
                    [v, v, v, 255]
                }
                _ => {
                    return Err(Error::InvalidInput(format!(
                        "Unsupported channel count: {channels}"
                    )))
                }
            };
            image.put_pixel(i32_to_u32(col)?, i32_to_u32(row)?, Rgba(rgba));
        }
    }

    Ok(image)
}
