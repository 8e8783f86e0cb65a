//! Edge and contour point extraction.

use crate::constants::{
    BLUR_KERNEL_SIZE, CANNY_THRESHOLD_HIGH, CANNY_THRESHOLD_LOW, CONTOUR_KERNEL_DIVISOR, MIN_CONTOUR_KERNEL,
};
use crate::utils::to_grayscale;
use crate::Result;
use opencv::core::{self, Mat, Point, Scalar, Size, Vector};
use opencv::imgproc;
use opencv::prelude::*;

/// Edge map of `image` after directional morphology
///
/// The image is blurred, then eroded and dilated with a rectangular
/// `kernel_size` element. A tall kernel removes bright horizontal lines,
/// a wide one removes vertical lines, a square one keeps all edges.
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails
pub fn canny_edge_detection(image: &Mat, kernel_size: Size) -> Result<Mat> {
    let gray = to_grayscale(image)?;

    let mut blurred = Mat::default();
    imgproc::blur(
        &gray,
        &mut blurred,
        Size::new(BLUR_KERNEL_SIZE, BLUR_KERNEL_SIZE),
        Point::new(-1, -1),
        core::BORDER_DEFAULT,
    )?;

    let kernel = imgproc::get_structuring_element(imgproc::MORPH_RECT, kernel_size, Point::new(-1, -1))?;
    let border = imgproc::morphology_default_border_value()?;
    let mut eroded = Mat::default();
    imgproc::erode(&blurred, &mut eroded, &kernel, Point::new(-1, -1), 1, core::BORDER_CONSTANT, border)?;
    let mut opened = Mat::default();
    imgproc::dilate(&eroded, &mut opened, &kernel, Point::new(-1, -1), 1, core::BORDER_CONSTANT, border)?;

    let mut edges = Mat::default();
    imgproc::canny(&opened, &mut edges, CANNY_THRESHOLD_LOW, CANNY_THRESHOLD_HIGH, 3, false)?;
    Ok(edges)
}

/// Points on mostly vertical contours
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails
pub fn vertical_contours(image: &Mat) -> Result<Vec<Point>> {
    let height = (image.cols() / CONTOUR_KERNEL_DIVISOR).max(MIN_CONTOUR_KERNEL);
    contour_points(image, Size::new(1, height))
}

/// Points on mostly horizontal contours
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails
pub fn horizontal_contours(image: &Mat) -> Result<Vec<Point>> {
    let width = (image.rows() / CONTOUR_KERNEL_DIVISOR).max(MIN_CONTOUR_KERNEL);
    contour_points(image, Size::new(width, 1))
}

fn trace_contours(image: &Mat, kernel_size: Size) -> Result<(Vector<Vector<Point>>, Mat)> {
    let edges = canny_edge_detection(image, kernel_size)?;
    let mut contours = Vector::<Vector<Point>>::new();
    let mut hierarchy = Mat::default();
    imgproc::find_contours_with_hierarchy(
        &edges,
        &mut contours,
        &mut hierarchy,
        imgproc::RETR_TREE,
        imgproc::CHAIN_APPROX_NONE,
        Point::default(),
    )?;
    Ok((contours, hierarchy))
}

fn contour_points(image: &Mat, kernel_size: Size) -> Result<Vec<Point>> {
    let (contours, _) = trace_contours(image, kernel_size)?;
    Ok(contours.iter().flat_map(|contour| contour.to_vec()).collect())
}

/// Draw every detected edge contour onto `image` in blue
///
/// Debug aid for tuning the waist search.
///
/// # Errors
///
/// Returns an error if an OpenCV operation fails
pub fn draw_contours(image: &mut Mat) -> Result<()> {
    let (contours, hierarchy) = trace_contours(image, Size::new(1, 1))?;
    imgproc::draw_contours(
        image,
        &contours,
        -1,
        Scalar::new(255.0, 0.0, 0.0, 255.0),
        2,
        imgproc::LINE_8,
        &hierarchy,
        i32::MAX,
        Point::default(),
    )?;
    Ok(())
}
