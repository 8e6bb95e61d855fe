//! Prediction endpoint
//!
//! Accepts a multipart upload with one `image` field, decodes it, and runs
//! the native model on the blocking thread pool.

use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartRejection},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::inference::PredictionResult;
use crate::preprocess::decode;
use crate::server::state::SharedState;
use crate::utils::error::RealWasteError;

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

const MISSING_IMAGE: &str = "Please upload an image file";
const INVALID_IMAGE: &str = "Invalid image format";
const PROCESSING_FAILED: &str = "Failed to process image";
const TOO_LARGE: &str = "Image exceeds the upload size limit";

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Error returned by the prediction handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse { error: self.message })).into_response()
    }
}

impl From<RealWasteError> for ApiError {
    fn from(err: RealWasteError) -> Self {
        match err {
            RealWasteError::Decode(_) => Self::new(StatusCode::BAD_REQUEST, INVALID_IMAGE),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        }
    }
}

/// POST /predict - Classify an uploaded image
pub async fn predict(
    State(state): State<SharedState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictionResult>, ApiError> {
    let request_id = Uuid::new_v4();

    let mut multipart = multipart.map_err(|e| {
        warn!(%request_id, "Rejected non-multipart upload: {}", e);
        ApiError::new(StatusCode::BAD_REQUEST, MISSING_IMAGE)
    })?;

    let bytes = read_image_field(&mut multipart).await.map_err(|e| {
        warn!(%request_id, "Could not read upload: {}", e.message);
        e
    })?;
    debug!(%request_id, "Received {} bytes", bytes.len());

    let worker_state = state.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<PredictionResult, RealWasteError> {
        let image = decode(&bytes)?;
        Ok(worker_state.gateway.predict_image(&image)?)
    })
    .await
    .map_err(|e| {
        error!(%request_id, "Prediction task failed: {}", e);
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
    })?;

    match outcome {
        Ok(result) => {
            info!(
                %request_id,
                "Predicted {} (class {}) in {} ms",
                result.label, result.class_index, result.elapsed_ms
            );
            Ok(Json(result))
        }
        Err(err) => {
            match &err {
                RealWasteError::Decode(e) => warn!(%request_id, "{}", e),
                e => error!(%request_id, "Prediction failed: {}", e),
            }
            Err(err.into())
        }
    }
}

/// Find the `image` file part and read it fully
async fn read_image_field(multipart: &mut Multipart) -> Result<Bytes, ApiError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    return ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE);
                }
                debug!("Malformed multipart body: {}", e);
                ApiError::new(StatusCode::BAD_REQUEST, MISSING_IMAGE)
            })?;

        let Some(field) = field else {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, MISSING_IMAGE));
        };

        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        // Plain form values named `image` are not uploads
        if field.file_name().is_none() {
            return Err(ApiError::new(StatusCode::BAD_REQUEST, MISSING_IMAGE));
        }

        return field.bytes().await.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::new(StatusCode::PAYLOAD_TOO_LARGE, TOO_LARGE)
            } else {
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, PROCESSING_FAILED)
            }
        });
    }
}
