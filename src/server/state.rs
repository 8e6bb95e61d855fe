//! Application state for the RealWaste server
//!
//! Holds the single inference gateway every request handler shares.

use std::sync::Arc;
use std::time::Instant;

use crate::inference::InferenceGateway;

/// Shared application state
pub struct AppState {
    /// The process-wide native engine owner
    pub gateway: InferenceGateway,
    /// Server start time
    pub started_at: Instant,
}

impl AppState {
    pub fn new(gateway: InferenceGateway) -> Self {
        Self {
            gateway,
            started_at: Instant::now(),
        }
    }

    /// Get uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

pub type SharedState = Arc<AppState>;
