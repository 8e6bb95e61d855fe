//! Inference module: the native engine boundary and its gateway
//!
//! This module provides:
//! - [`NativeEngine`]: safe trait over the engine's C entry points
//! - [`DynamicEngine`]: engine loaded from a shared library at runtime
//! - [`InferenceGateway`]: lifecycle owner that serializes every native call
//!
//! ## Lifecycle
//!
//! ```text
//! Uninitialized --initialize--> Ready --shutdown--> Closed
//!                                 |  ^
//!                                 +--+ predict
//! ```

pub mod gateway;
pub mod native;

// Re-export main types for convenience
pub use gateway::{GatewayState, InferenceGateway, PredictionResult};
pub use native::{DynamicEngine, NativeEngine, WideCString, STATUS_OK};

/// Default model file handed to the native engine
pub const DEFAULT_MODEL_PATH: &str = "model.onnx";

/// Default file name of the native engine library
#[cfg(windows)]
pub const DEFAULT_LIBRARY_PATH: &str = "onnx_model_infer_win64_model.dll";

/// Default file name of the native engine library
#[cfg(target_os = "macos")]
pub const DEFAULT_LIBRARY_PATH: &str = "libonnx_model_infer.dylib";

/// Default file name of the native engine library
#[cfg(all(unix, not(target_os = "macos")))]
pub const DEFAULT_LIBRARY_PATH: &str = "libonnx_model_infer.so";
