//! Inference Gateway
//!
//! Owns the native engine for the life of the process and enforces its
//! lifecycle: `Uninitialized -> Ready -> Closed`. Every native call goes
//! through one engine-wide mutex, since the engine's thread-safety is not
//! documented.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use super::native::{NativeEngine, WideCString, STATUS_OK};
use crate::labels::{class_name, NUM_CLASSES};
use crate::preprocess::{encode, Tensor};
use crate::utils::error::{InferenceError, InitError};

/// Lifecycle state of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayState {
    Uninitialized,
    Ready,
    Closed,
}

impl std::fmt::Display for GatewayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayState::Uninitialized => write!(f, "uninitialized"),
            GatewayState::Ready => write!(f, "ready"),
            GatewayState::Closed => write!(f, "closed"),
        }
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Predicted class index, always within the label table
    pub class_index: usize,

    /// Predicted class name
    pub label: String,

    /// Wall-clock time spent in the native call, in milliseconds
    #[serde(rename = "time_ms")]
    pub elapsed_ms: u64,
}

impl PredictionResult {
    /// Create a new prediction result
    pub fn new(class_index: usize, label: &str, elapsed: Duration) -> Self {
        Self {
            class_index,
            label: label.to_string(),
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

struct EngineSlot {
    engine: Box<dyn NativeEngine>,
    state: GatewayState,
}

/// Process-wide owner of the native inference engine
///
/// Construct once at startup, share behind an `Arc`, and call
/// [`shutdown`](Self::shutdown) on the way out. Dropping the gateway performs
/// the shutdown as well, so the native cleanup runs on every exit path.
pub struct InferenceGateway {
    slot: Mutex<EngineSlot>,
}

impl InferenceGateway {
    /// Wrap an engine without initializing it
    pub fn new(engine: Box<dyn NativeEngine>) -> Self {
        Self {
            slot: Mutex::new(EngineSlot {
                engine,
                state: GatewayState::Uninitialized,
            }),
        }
    }

    /// Wrap an engine and initialize it with the model at `model_path`
    pub fn open(engine: Box<dyn NativeEngine>, model_path: &Path) -> Result<Self, InitError> {
        let gateway = Self::new(engine);
        gateway.initialize(model_path)?;
        Ok(gateway)
    }

    /// Current lifecycle state
    pub fn state(&self) -> GatewayState {
        self.lock().state
    }

    /// Load the model; valid only once, from `Uninitialized`
    ///
    /// On failure the gateway stays `Uninitialized` and refuses predictions.
    pub fn initialize(&self, model_path: &Path) -> Result<(), InitError> {
        let mut slot = self.lock();
        if slot.state != GatewayState::Uninitialized {
            return Err(InitError::InvalidState(slot.state));
        }

        let wide_path = WideCString::from_path(model_path)?;
        let status = slot.engine.init(&wide_path);
        if status != STATUS_OK {
            error!("Native engine failed to load model {:?} (status {})", model_path, status);
            return Err(InitError::Status(status));
        }

        slot.state = GatewayState::Ready;
        info!("Native engine ready with model {:?}", model_path);
        Ok(())
    }

    /// Run the native model on an encoded tensor
    ///
    /// Blocks the calling thread until the native call returns. Concurrent
    /// callers wait on the engine lock; elapsed time covers only the native
    /// call itself.
    pub fn predict(&self, tensor: &Tensor) -> Result<PredictionResult, InferenceError> {
        let mut slot = self.lock();
        if slot.state != GatewayState::Ready {
            return Err(InferenceError::NotReady(slot.state));
        }

        let mut class_index: i32 = 0;
        let start = Instant::now();
        let status = slot.engine.predict(tensor.as_slice(), &mut class_index);
        let elapsed = start.elapsed();
        drop(slot);

        if status != STATUS_OK {
            warn!("Native predict returned status {}", status);
            return Err(InferenceError::Failed { status });
        }

        let label = class_name(class_index).ok_or_else(|| {
            error!(
                "Native engine returned class index {} but only {} labels are known",
                class_index, NUM_CLASSES
            );
            InferenceError::ClassIndexOutOfRange {
                index: class_index,
                num_classes: NUM_CLASSES,
            }
        })?;

        debug!(
            "Predicted {} (class {}) in {:.2} ms",
            label,
            class_index,
            elapsed.as_secs_f64() * 1000.0
        );

        // class_name only succeeds for non-negative indices
        Ok(PredictionResult::new(class_index as usize, label, elapsed))
    }

    /// Encode a decoded image and run the native model on it
    pub fn predict_image(&self, image: &DynamicImage) -> Result<PredictionResult, InferenceError> {
        let tensor = encode(image);
        self.predict(&tensor)
    }

    /// Release the native engine
    ///
    /// Calls the native cleanup only when leaving `Ready`; any later call is
    /// a no-op. The gateway ends `Closed` either way.
    pub fn shutdown(&self) {
        let mut slot = self.lock();
        match slot.state {
            GatewayState::Ready => {
                slot.engine.cleanup();
                info!("Native engine released");
            }
            GatewayState::Uninitialized => {
                debug!("Closing gateway that was never initialized");
            }
            GatewayState::Closed => return,
        }
        slot.state = GatewayState::Closed;
    }

    fn lock(&self) -> MutexGuard<'_, EngineSlot> {
        self.slot.lock().unwrap_or_else(|poisoned| {
            warn!("Engine lock poisoned by a panicking caller, continuing");
            poisoned.into_inner()
        })
    }
}

impl Drop for InferenceGateway {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for InferenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceGateway")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
