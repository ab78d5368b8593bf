// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — DBE Errors
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbeError {
    /// Invalid static parameter. Fatal to construction.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Resource request exceeds capacity. The previous allocation stays in force.
    #[error(
        "Allocation rejected: detection={detection} + simulation={simulation} exceeds capacity {capacity}"
    )]
    AllocationError {
        detection: usize,
        simulation: usize,
        capacity: usize,
    },

    /// Memory retrieval miss.
    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Physics constraint violated: {0}")]
    PhysicsViolation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DbeError {
    /// True for errors the control loop is expected to absorb and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DbeError::AllocationError { .. } | DbeError::KeyNotFound(_)
        )
    }
}

pub type DbeResult<T> = Result<T, DbeError>;
