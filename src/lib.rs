//! # RealWaste Classification Server
//!
//! Classifies photos of waste into nine material categories by handing a
//! normalized tensor to a pre-built native inference engine.
//!
//! ## Modules
//!
//! - `preprocess`: image decoding and the fixed `[3, 128, 128]` tensor encoding
//! - `inference`: native engine boundary and the gateway that owns it
//! - `labels`: class label table matching the model's output layer
//! - `server`: axum router and request handlers
//! - `config`: server configuration
//! - `utils`: logging and error types
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use realwaste::inference::{DynamicEngine, InferenceGateway};
//! use realwaste::preprocess::decode;
//!
//! let engine = DynamicEngine::load("libonnx_model_infer.so")?;
//! let gateway = InferenceGateway::open(Box::new(engine), "model.onnx".as_ref())?;
//! let image = decode(&std::fs::read("bottle.jpg")?)?;
//! let result = gateway.predict_image(&image)?;
//! println!("{} ({} ms)", result.label, result.elapsed_ms);
//! ```

pub mod config;
pub mod inference;
pub mod labels;
pub mod preprocess;
pub mod server;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::ServerConfig;
pub use inference::{DynamicEngine, GatewayState, InferenceGateway, NativeEngine, PredictionResult};
pub use labels::{CLASS_NAMES, NUM_CLASSES};
pub use preprocess::{decode, encode, Tensor, TENSOR_LEN};
pub use utils::error::{DecodeError, InferenceError, InitError, RealWasteError, Result};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
