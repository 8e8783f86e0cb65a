//! Rotation of image buffers about their centre.

use crate::utils::safe_cast::truncate_to_i32;
use crate::{Error, Result};
use opencv::core::{self, Mat, Point2f, Rect, Scalar, Size};
use opencv::imgproc;
use opencv::prelude::*;

fn image_center(image: &Mat) -> Point2f {
    #[allow(clippy::cast_precision_loss)] // image sides fit f32 exactly
    Point2f::new(image.cols() as f32 / 2.0, image.rows() as f32 / 2.0)
}

/// Rotate `image` by `angle` degrees (counter-clockwise) onto a canvas grown
/// to the rotated bounding box, so no corner is cut off
///
/// The canvas is never smaller than `image` on either side, so a centred crop
/// of the original size always fits after [`rotate_image_back`].
///
/// # Errors
///
/// Returns an error if the OpenCV transform fails
pub fn rotate_image(image: &Mat, angle: f64) -> Result<Mat> {
    let center = image_center(image);
    let mut rotation = imgproc::get_rotation_matrix_2d(center, angle, 1.0)?;

    let cos = rotation.at_2d::<f64>(0, 0)?.abs();
    let sin = rotation.at_2d::<f64>(0, 1)?.abs();
    let width = f64::from(image.cols());
    let height = f64::from(image.rows());
    let new_width = truncate_to_i32(width * cos + height * sin).max(image.cols());
    let new_height = truncate_to_i32(width * sin + height * cos).max(image.rows());

    // keep the content centred on the larger canvas
    *rotation.at_2d_mut::<f64>(0, 2)? += f64::from(new_width) / 2.0 - f64::from(center.x);
    *rotation.at_2d_mut::<f64>(1, 2)? += f64::from(new_height) / 2.0 - f64::from(center.y);

    let mut rotated = Mat::default();
    imgproc::warp_affine(
        image,
        &mut rotated,
        &rotation,
        Size::new(new_width, new_height),
        imgproc::INTER_LINEAR,
        core::BORDER_CONSTANT,
        Scalar::default(),
    )?;
    Ok(rotated)
}

/// Rotate `image` by `angle` degrees keeping its size
///
/// Only meant to undo [`rotate_image`]; follow it with [`crop_centered`].
///
/// # Errors
///
/// Returns an error if the OpenCV transform fails
pub fn rotate_image_back(image: &Mat, angle: f64) -> Result<Mat> {
    let rotation = imgproc::get_rotation_matrix_2d(image_center(image), angle, 1.0)?;

    let mut rotated = Mat::default();
    imgproc::warp_affine(
        image,
        &mut rotated,
        &rotation,
        image.size()?,
        imgproc::INTER_LINEAR,
        core::BORDER_CONSTANT,
        Scalar::default(),
    )?;
    Ok(rotated)
}

/// Copy the centred `width` x `height` region of `image`
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the region does not fit inside the image
pub fn crop_centered(image: &Mat, width: i32, height: i32) -> Result<Mat> {
    let roi = Rect::new(
        (image.cols() - width) / 2,
        (image.rows() - height) / 2,
        width,
        height,
    );
    if roi.x < 0 || roi.y < 0 || width <= 0 || height <= 0 {
        return Err(Error::InvalidInput(format!(
            "Cannot crop {}x{} from a {}x{} image",
            width,
            height,
            image.cols(),
            image.rows()
        )));
    }

    Ok(Mat::roi(image, roi)?.try_clone()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opencv::core::{Vec3b, VecN, CV_8UC3};

    fn gradient(width: i32, height: i32) -> Mat {
        let mut image = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(0.0)).unwrap();
        for y in 0..height {
            for x in 0..width {
                *image.at_2d_mut::<Vec3b>(y, x).unwrap() = VecN([x as u8, y as u8, 100]);
            }
        }
        image
    }

    #[test]
    fn test_zero_angle_keeps_size_and_content() {
        let image = gradient(60, 40);
        let rotated = rotate_image(&image, 0.0).unwrap();
        assert_eq!(rotated.size().unwrap(), Size::new(60, 40));
        assert_eq!(*rotated.at_2d::<Vec3b>(20, 30).unwrap(), *image.at_2d::<Vec3b>(20, 30).unwrap());
    }

    #[test]
    fn test_right_angle_keeps_both_sides() {
        let rotated = rotate_image(&gradient(60, 40), 90.0).unwrap();
        let size = rotated.size().unwrap();
        // the rotated box is 40x60, the canvas keeps the original width
        assert_eq!(size.width, 60);
        assert!((size.height - 60).abs() <= 1);
    }

    #[test]
    fn test_steep_angle_on_wide_image_still_crops() {
        // the 60 degree bounding box of a 640x360 image is only 630 wide
        let image = gradient(640, 360);
        let angle = 60.26;
        let rotated = rotate_image(&image, angle).unwrap();
        assert!(rotated.cols() >= 640);
        assert!(rotated.rows() >= 360);

        let back = rotate_image_back(&rotated, -angle).unwrap();
        let restored = crop_centered(&back, 640, 360).unwrap();
        assert_eq!(restored.size().unwrap(), Size::new(640, 360));
    }

    #[test]
    fn test_canvas_grows_for_small_angles() {
        let rotated = rotate_image(&gradient(100, 80), 15.0).unwrap();
        assert!(rotated.cols() > 100);
        assert!(rotated.rows() > 80);
    }

    #[test]
    fn test_rotate_back_keeps_size() {
        let image = gradient(70, 50);
        let back = rotate_image_back(&image, 12.0).unwrap();
        assert_eq!(back.size().unwrap(), image.size().unwrap());
    }

    #[test]
    fn test_round_trip_restores_interior() {
        let image = gradient(120, 90);
        let angle = 12.0;
        let rotated = rotate_image(&image, angle).unwrap();
        let back = rotate_image_back(&rotated, -angle).unwrap();
        let restored = crop_centered(&back, 120, 90).unwrap();
        assert_eq!(restored.size().unwrap(), Size::new(120, 90));

        for y in 10..80 {
            for x in 10..110 {
                let a = image.at_2d::<Vec3b>(y, x).unwrap();
                let b = restored.at_2d::<Vec3b>(y, x).unwrap();
                for c in 0..3 {
                    let diff = (i32::from(a[c]) - i32::from(b[c])).abs();
                    assert!(diff <= 3, "pixel ({x},{y}) channel {c} differs by {diff}");
                }
            }
        }
    }

    #[test]
    fn test_crop_larger_than_image_rejected() {
        let image = gradient(30, 30);
        assert!(matches!(crop_centered(&image, 40, 20), Err(Error::InvalidInput(_))));
    }
}
