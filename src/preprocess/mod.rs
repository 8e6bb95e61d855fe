//! Preprocessing module: uploaded bytes to model input
//!
//! This module provides:
//! - [`decode`]: bytes to a decoded image, rejecting empty or zero-sized input
//! - [`encode`]: decoded image to the fixed `[3, 128, 128]` normalized tensor
//!
//! ## Normalization
//!
//! Every channel byte `v` becomes `(v / 255 - 0.5) / 0.5`, so values span
//! `[-1, 1]`. This matches the mean/std of 0.5 the model was exported with.

pub mod decode;
pub mod tensor;

// Re-export main types for convenience
pub use decode::decode;
pub use tensor::{encode, Tensor, PLANE_LEN, TENSOR_CHANNELS, TENSOR_HEIGHT, TENSOR_LEN, TENSOR_WIDTH};
