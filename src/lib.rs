//! Virtual dressing room library.
//!
//! Overlays garment sprites (tops, glasses and face masks) onto a photo or a
//! live video frame, placing and scaling them from the face alone:
//! - Haar cascade face and eye detection through `OpenCV`
//! - Head tilt correction for still images
//! - Waist width estimation from torso contours with bucketed-median calibration
//! - Alpha-blended compositing with clipping at the image border
//!
//! # Examples
//!
//! ## Dressing a photo
//!
//! ```no_run
//! use virtual_dressing_room::{config::Config, engine::DressingRoom,
//!                             garment::{Garment, GarmentKind, Outfit}};
//! use opencv::{imgcodecs, core::Vector};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut room = DressingRoom::load(&Config::default())?;
//!
//! let mut outfit = Outfit::new();
//! outfit.add_glasses(Garment::from_image_file("assets/glasses.png", GarmentKind::Glasses, None)?);
//!
//! let photo = imgcodecs::imread("person.jpg", imgcodecs::IMREAD_COLOR)?;
//! let dressed = room.detect_and_add_clothing(&photo, &outfit)?;
//! imgcodecs::imwrite("dressed.jpg", &dressed, &Vector::new())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Live video
//!
//! ```no_run
//! use virtual_dressing_room::{config::Config, engine::DressingRoom,
//!                             garment::Outfit, live::LiveDressingRoom};
//! use opencv::{videoio, core::Mat, highgui, prelude::*};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let room = DressingRoom::load(&Config::default())?;
//! let mut live = LiveDressingRoom::spawn(room)?;
//! let outfit = Outfit::new();
//!
//! let mut cap = videoio::VideoCapture::new(0, videoio::CAP_ANY)?;
//! let mut frame = Mat::default();
//! while cap.read(&mut frame)? {
//!     // detection runs on a worker, rendering never waits for it
//!     live.render(&mut frame, &outfit)?;
//!     highgui::imshow("Dressing Room", &frame)?;
//!     if highgui::wait_key(1)? == b'q' as i32 {
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

/// Cascade classifier seam and Haar implementation
pub mod classifier;

/// Face detection, largest-face selection and frame-to-frame stabilization
pub mod face_detection;

/// Head tilt estimation from eye positions
pub mod head_pose;

/// Canvas-expanding and size-preserving image rotation
pub mod rotation;

/// Edge and contour point extraction
pub mod contours;

/// Waist width estimation and calibration
pub mod waist;

/// Sprite placement and alpha blending
pub mod compositor;

/// Garments and outfits
pub mod garment;

/// Per-subject live session state
pub mod session;

/// Still-image and real-time dressing pipelines
pub mod engine;

/// Live dressing with a background detection worker
pub mod live;

/// Utility functions for regions, casts and buffer conversion
pub mod utils;

/// Error types and result handling
pub mod error;

/// Demo application
pub mod app;

/// Constants used throughout the library
pub mod constants;

/// Configuration management
pub mod config;

pub use error::{Error, Result};
