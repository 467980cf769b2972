//! Error types for the spawn preparation pipeline.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Fatal errors raised while preparing or submitting a spawn request.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("Instance id {id} out of range (supported: 0..={max})")]
    InstanceOutOfRange { id: u16, max: u16 },

    #[error("Model '{model}' has no description directory at {}", dir.display())]
    ModelDirMissing { model: String, dir: PathBuf },

    #[error("No description found for model '{model}' in {}: expected 'model.sdf' or 'model.xacro'", dir.display())]
    MissingDescription { model: String, dir: PathBuf },

    #[error("Template compilation failed: {0}")]
    TemplateCompile(String),

    #[error("Description conversion failed: {0}")]
    Conversion(String),

    #[error("Malformed description XML: {0}")]
    MalformedDescription(String),

    #[error("Unknown backend '{0}' (expected 'mavros' or 'light')")]
    UnknownBackend(String),

    #[error("Only yaw rotation is allowed at spawn: rotation.{component} should be 0, found {value}")]
    InvalidRotation { component: &'static str, value: f64 },

    #[error("Spawn service not ready after {0:?}")]
    ServiceNotReady(Duration),

    #[error("Spawn rejected for model '{name}': {reason}")]
    SpawnRejected { name: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for spawn pipeline operations.
pub type SpawnResult<T> = Result<T, SpawnError>;

/// Recoverable transform lookup failures.
///
/// These never abort a spawn: the pose transformer logs them and falls
/// back to treating the requested pose as world-frame.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Frame '{0}' does not exist")]
    UnknownFrame(String),

    #[error("Frame '{frame}' is not connected to '{target}'")]
    Disconnected { frame: String, target: String },

    #[error("No transform available for frame '{0}' at the requested time")]
    Extrapolation(String),

    #[error("Transform lookup timed out after {0:?}")]
    Timeout(Duration),
}
