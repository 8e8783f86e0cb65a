//! Error types for the virtual dressing room library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding or encoding failed
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// No face was found in a still image; the caller should ask for another photo
    #[error("No face detected")]
    NoFaceDetected,

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A required cascade classifier could not be loaded
    #[error("Classifier load failure: {0}")]
    ClassifierLoad(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// The background detection worker stopped unexpectedly
    #[error("Detection worker error: {0}")]
    Worker(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
