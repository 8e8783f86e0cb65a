//! Checked and saturating numeric conversions for pixel arithmetic

use crate::{Error, Result};

/// Safely convert u32 to i32 with overflow checking
///
/// # Errors
///
/// Returns an error if the value exceeds i32::MAX
pub fn u32_to_i32(value: u32) -> Result<i32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} too large to fit in i32")))
}

/// Safely convert a non-negative i32 to u32
///
/// # Errors
///
/// Returns an error if the value is negative
pub fn i32_to_u32(value: i32) -> Result<u32> {
    value
        .try_into()
        .map_err(|_| Error::InvalidInput(format!("Value {value} cannot be a pixel dimension")))
}

/// Round half up to the nearest pixel, saturating at the i32 range
///
/// Non-finite input maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Saturating float-to-int cast
pub fn round_to_i32(value: f64) -> i32 {
    if value.is_finite() {
        (value + 0.5).floor() as i32
    } else {
        0
    }
}

/// Truncate toward zero, saturating at the i32 range
///
/// Non-finite input maps to 0.
#[must_use]
#[allow(clippy::cast_possible_truncation)] // Saturating float-to-int cast
pub fn truncate_to_i32(value: f64) -> i32 {
    if value.is_finite() {
        value as i32
    } else {
        0
    }
}
