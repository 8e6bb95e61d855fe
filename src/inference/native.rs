//! Native inference engine boundary
//!
//! The engine is a pre-built shared library exporting three C entry points:
//!
//! ```c
//! int  ONNX_MODEL_INFER_Init(const wchar_t* modelPath);
//! int  ONNX_MODEL_INFER_Predict(const float* inputCHW, int len, int* classIndexOut);
//! void ONNX_MODEL_INFER_Cleanup(void);
//! ```
//!
//! Status `0` means success, anything else is failure. [`NativeEngine`] is the
//! safe seam over that contract; [`DynamicEngine`] binds it to a library
//! loaded at runtime.

use std::ffi::{c_float, c_int};
use std::path::{Path, PathBuf};

use libloading::Library;
use tracing::debug;

use crate::utils::error::InitError;

/// Status code the native engine returns on success
pub const STATUS_OK: i32 = 0;

/// Status reported locally when an input cannot be described to the engine
pub const STATUS_INVALID_INPUT: i32 = -1;

/// Exported symbol for model initialization
pub const INIT_SYMBOL: &str = "ONNX_MODEL_INFER_Init";

/// Exported symbol for a single prediction
pub const PREDICT_SYMBOL: &str = "ONNX_MODEL_INFER_Predict";

/// Exported symbol for releasing the engine
pub const CLEANUP_SYMBOL: &str = "ONNX_MODEL_INFER_Cleanup";

/// Platform `wchar_t`
#[cfg(windows)]
pub type WChar = u16;

/// Platform `wchar_t`
#[cfg(not(windows))]
pub type WChar = u32;

type InitFn = unsafe extern "C" fn(model_path: *const WChar) -> c_int;
type PredictFn =
    unsafe extern "C" fn(input: *const c_float, len: c_int, class_index_out: *mut c_int) -> c_int;
type CleanupFn = unsafe extern "C" fn();

/// Safe view of the native engine's three entry points
///
/// Implementations receive borrowed buffers that are valid only for the
/// duration of each call and must not keep pointers to them afterwards.
/// Callers serialize access, so implementations need not be reentrant.
pub trait NativeEngine: Send {
    /// Load the model at `model_path`; returns the native status code
    fn init(&mut self, model_path: &WideCString) -> i32;

    /// Run the model on `input` and write the class index to `class_index_out`
    fn predict(&mut self, input: &[f32], class_index_out: &mut i32) -> i32;

    /// Release all native resources
    fn cleanup(&mut self);
}

/// NUL-terminated `wchar_t` string for passing paths across the boundary
///
/// UTF-16 on Windows, UTF-32 elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideCString {
    units: Vec<WChar>,
}

impl WideCString {
    /// Convert a filesystem path, rejecting non-UTF-8 paths and interior NULs
    pub fn from_path(path: &Path) -> Result<Self, InitError> {
        let invalid = || InitError::InvalidModelPath(path.to_path_buf());

        let text = path.to_str().ok_or_else(invalid)?;
        let mut units = encode_wide(text);
        if units.contains(&0) {
            return Err(invalid());
        }
        units.push(0);

        Ok(Self { units })
    }

    /// Pointer to the first unit; valid while `self` is alive
    pub fn as_ptr(&self) -> *const WChar {
        self.units.as_ptr()
    }

    /// Units without the trailing NUL
    pub fn as_units(&self) -> &[WChar] {
        &self.units[..self.units.len() - 1]
    }

    /// Decode back to a Rust string, replacing invalid units
    pub fn to_string_lossy(&self) -> String {
        decode_wide(self.as_units())
    }
}

#[cfg(windows)]
fn encode_wide(text: &str) -> Vec<WChar> {
    text.encode_utf16().collect()
}

#[cfg(not(windows))]
fn encode_wide(text: &str) -> Vec<WChar> {
    text.chars().map(u32::from).collect()
}

#[cfg(windows)]
fn decode_wide(units: &[WChar]) -> String {
    String::from_utf16_lossy(units)
}

#[cfg(not(windows))]
fn decode_wide(units: &[WChar]) -> String {
    units
        .iter()
        .map(|&u| char::from_u32(u).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Native engine loaded from a shared library at runtime
pub struct DynamicEngine {
    path: PathBuf,
    init_fn: InitFn,
    predict_fn: PredictFn,
    cleanup_fn: CleanupFn,
    // Declared last so the function pointers above never outlive the mapping.
    _library: Library,
}

impl DynamicEngine {
    /// Open the shared library at `path` and resolve all three entry points
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let path = path.as_ref();

        // SAFETY: opening the library runs its initializers. The engine
        // library is a trusted deployment artifact chosen by the operator.
        let library = unsafe { Library::new(path) }.map_err(|source| InitError::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: the symbol types match the exported C signatures above.
        let (init_fn, predict_fn, cleanup_fn) = unsafe {
            (
                lookup::<InitFn>(&library, INIT_SYMBOL)?,
                lookup::<PredictFn>(&library, PREDICT_SYMBOL)?,
                lookup::<CleanupFn>(&library, CLEANUP_SYMBOL)?,
            )
        };

        debug!("Resolved native entry points in {:?}", path);

        Ok(Self {
            path: path.to_path_buf(),
            init_fn,
            predict_fn,
            cleanup_fn,
            _library: library,
        })
    }
}

/// Resolve `name` as a function pointer of type `T`
///
/// # Safety
/// `T` must be the exact function pointer type of the exported symbol, and
/// the returned pointer must not be called after `library` is dropped.
unsafe fn lookup<T: Copy>(library: &Library, name: &'static str) -> Result<T, InitError> {
    library
        .get::<T>(name.as_bytes())
        .map(|symbol| *symbol)
        .map_err(|source| InitError::MissingSymbol {
            symbol: name,
            source,
        })
}

impl NativeEngine for DynamicEngine {
    fn init(&mut self, model_path: &WideCString) -> i32 {
        // SAFETY: `model_path` is NUL-terminated and outlives the call.
        unsafe { (self.init_fn)(model_path.as_ptr()) }
    }

    fn predict(&mut self, input: &[f32], class_index_out: &mut i32) -> i32 {
        let Ok(len) = c_int::try_from(input.len()) else {
            return STATUS_INVALID_INPUT;
        };

        // SAFETY: both borrows stay valid and unmoved for the whole call, and
        // the engine copies what it needs before returning.
        unsafe { (self.predict_fn)(input.as_ptr(), len, class_index_out) }
    }

    fn cleanup(&mut self) {
        // SAFETY: takes no arguments; the gateway calls it at most once.
        unsafe { (self.cleanup_fn)() }
    }
}

impl std::fmt::Debug for DynamicEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicEngine")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wide_string_is_nul_terminated() {
        let wide = WideCString::from_path(Path::new("model.onnx")).unwrap();
        assert_eq!(wide.as_units().len(), "model.onnx".len());
        // SAFETY: reading one past the visible units stays inside the buffer.
        let terminator = unsafe { *wide.as_ptr().add(wide.as_units().len()) };
        assert_eq!(terminator, 0);
    }

    #[test]
    fn test_wide_string_round_trip() {
        let path = Path::new("models/realwaste_cnn_ä.onnx");
        let wide = WideCString::from_path(path).unwrap();
        assert_eq!(wide.to_string_lossy(), "models/realwaste_cnn_ä.onnx");
    }

    #[test]
    fn test_interior_nul_rejected() {
        let result = WideCString::from_path(Path::new("model\0.onnx"));
        assert!(matches!(result, Err(InitError::InvalidModelPath(_))));
    }

    #[test]
    fn test_missing_library_fails_to_load() {
        let result = DynamicEngine::load("/nonexistent/libonnx_model_infer.so");
        match result {
            Err(InitError::LibraryLoad { path, .. }) => {
                assert_eq!(path, PathBuf::from("/nonexistent/libonnx_model_infer.so"));
            }
            other => panic!("expected LibraryLoad error, got {:?}", other.map(|_| ())),
        }
    }
}
