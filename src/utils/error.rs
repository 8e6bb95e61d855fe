//! Error Handling Module
//!
//! Defines the error taxonomy for the RealWaste classification server.
//! Uses thiserror for ergonomic error definitions.
//!
//! - [`InitError`]: the native engine could not be brought up (fatal)
//! - [`DecodeError`]: uploaded bytes are not a usable image (client error)
//! - [`InferenceError`]: a single prediction failed (server error, recoverable)

use std::path::PathBuf;

use thiserror::Error;

use crate::inference::GatewayState;

/// Failure to load the native engine or its model
#[derive(Error, Debug)]
pub enum InitError {
    /// The shared library could not be opened
    #[error("Failed to load native library '{path}': {source}")]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// The shared library does not export a required entry point
    #[error("Native library is missing symbol '{symbol}': {source}")]
    MissingSymbol {
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// The model path cannot be passed across the native boundary
    #[error("Model path '{0}' is not representable as a wide C string")]
    InvalidModelPath(PathBuf),

    /// The native init call reported failure
    #[error("failed to initialize model (native status {0})")]
    Status(i32),

    /// `initialize` was called outside the `Uninitialized` state
    #[error("Gateway cannot be initialized from state {0}")]
    InvalidState(GatewayState),
}

/// Failure to turn uploaded bytes into an image
#[derive(Error, Debug)]
pub enum DecodeError {
    /// No bytes were supplied
    #[error("Image data is empty")]
    Empty,

    /// The decoder rejected the bytes
    #[error("Invalid image format: {0}")]
    Unreadable(#[from] image::ImageError),

    /// Decoding succeeded but the image has no pixels
    #[error("Image has zero size ({width}x{height})")]
    ZeroSize { width: u32, height: u32 },
}

/// Failure of a single prediction
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The native predict call returned a non-zero status
    #[error("prediction failed")]
    Failed { status: i32 },

    /// The native routine returned an index outside the label table
    #[error("Native engine returned class index {index}, outside 0..{num_classes}")]
    ClassIndexOutOfRange { index: i32, num_classes: usize },

    /// `predict` was called outside the `Ready` state
    #[error("Inference gateway is not ready (state: {0})")]
    NotReady(GatewayState),
}

/// Main error type for RealWaste operations
#[derive(Error, Debug)]
pub enum RealWasteError {
    /// Native engine initialization error
    #[error(transparent)]
    Init(#[from] InitError),

    /// Image decode error
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Inference error
    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// A buffer of the wrong size was offered as a tensor
    #[error("Tensor must hold {expected} values, got {actual}")]
    InvalidTensorLength { expected: usize, actual: usize },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for RealWaste operations
pub type Result<T> = std::result::Result<T, RealWasteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_failed_message() {
        let err = InferenceError::Failed { status: -1 };
        assert_eq!(err.to_string(), "prediction failed");
    }

    #[test]
    fn test_out_of_range_message() {
        let err = InferenceError::ClassIndexOutOfRange {
            index: 12,
            num_classes: 9,
        };
        assert!(err.to_string().contains("12"));
        assert!(err.to_string().contains("0..9"));
    }

    #[test]
    fn test_init_status_message() {
        let err = InitError::Status(-1);
        assert!(err.to_string().starts_with("failed to initialize model"));
    }

    #[test]
    fn test_transparent_wrapping() {
        let err: RealWasteError = InferenceError::Failed { status: 3 }.into();
        assert_eq!(err.to_string(), "prediction failed");
        assert!(matches!(err, RealWasteError::Inference(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RealWasteError = io_err.into();
        assert!(matches!(err, RealWasteError::Io(_)));
    }
}
