//! Error types for the smooth-edges crate.

use std::path::PathBuf;

/// Errors that can occur while keying, smoothing and saving an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A caller-supplied value is malformed or out of range.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// The input file is missing, unreadable, or not a decodable image.
    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        /// Path of the input image.
        path: PathBuf,
        /// Underlying decoder error.
        source: image::ImageError,
    },

    /// The encoder rejected the output buffer.
    #[error("failed to encode {}: {source}", path.display())]
    Encode {
        /// Path of the requested output image.
        path: PathBuf,
        /// Underlying encoder error.
        source: image::ImageError,
    },

    /// The encoded bytes could not be written to the output location.
    #[error("failed to write {}: {source}", path.display())]
    Write {
        /// Path of the requested output image.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The output format cannot be inferred, or cannot hold the result.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
