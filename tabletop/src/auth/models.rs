//! Handshake data models.

use serde::{Deserialize, Serialize};

/// Structured rejection delivered to a refused channel before it is closed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rejection {
    pub code: String,
    pub message: String,
}
