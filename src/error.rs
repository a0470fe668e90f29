use thiserror::Error;

/// Errors raised while reading an image source
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// Local or remote I/O failure
    #[error("I/O error: {0}")]
    Io(String),

    /// Source does not exist
    #[error("Image not found: {0}")]
    NotFound(String),

    /// Source opened but yielded no bytes
    #[error("Image source is empty: {0}")]
    Empty(String),
}

impl From<std::io::Error> for SourceError {
    fn from(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            SourceError::NotFound(err.to_string())
        } else {
            SourceError::Io(err.to_string())
        }
    }
}

/// Errors raised by region decoders
#[derive(Debug, Clone, Error)]
pub enum DecodeError {
    /// Error while reading the source bytes
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Encoded format cannot be decoded by this backend
    #[error("Unsupported image format: {reason}")]
    UnsupportedFormat { reason: String },

    /// Requested region lies outside the image or is empty
    #[error("Invalid region {rect} for {width}x{height} image")]
    InvalidRegion {
        rect: crate::geometry::IntRect,
        width: u32,
        height: u32,
    },

    /// Sample size is not a power of two
    #[error("Invalid sample size {0}: must be a power of two")]
    InvalidSampleSize(u32),

    /// Pixel decoding failed
    #[error("Decode failed: {message}")]
    Failed { message: String },

    /// Decode worker stopped before producing a result
    #[error("Decode worker aborted: {message}")]
    Aborted { message: String },
}

/// Reasons subsampling is disabled for an image
#[derive(Debug, Clone, Error)]
pub enum SubsamplingError {
    /// Reading the image source failed
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Creating the region decoder failed
    #[error("Decoder error: {0}")]
    Decode(#[from] DecodeError),

    /// Mime type cannot be region-decoded
    #[error("Unsupported mime type: {0}")]
    UnsupportedMimeType(String),

    /// Image is not larger than the content already shown
    #[error("Image {image} is not larger than content {content}")]
    ImageTooSmall {
        image: crate::geometry::IntSize,
        content: crate::geometry::IntSize,
    },

    /// Preview content has a different aspect ratio than the image
    #[error("Content {content} aspect ratio does not match image {image}")]
    AspectRatioMismatch {
        image: crate::geometry::IntSize,
        content: crate::geometry::IntSize,
    },

    /// Container or content size is not known yet
    #[error("Viewport is not ready: {0}")]
    NotReady(String),

    /// Tile decoding needs a Tokio runtime
    #[error("No Tokio runtime available for tile decoding")]
    NoRuntime,
}

/// Errors raised by the zoom engine for rejected requests
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ZoomError {
    /// Rotation is not a multiple of 90 degrees
    #[error("Invalid rotation {0}: must be a multiple of 90")]
    InvalidRotation(i32),

    /// Scale is zero, negative, or not finite
    #[error("Invalid scale {0}")]
    InvalidScale(f32),
}
