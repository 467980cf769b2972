//! Collaborator interfaces for the spawn pipeline.
//!
//! The pipeline talks to its external collaborators through these traits
//! and carries them in an explicit [`SpawnContext`], so the core has no
//! ambient global state and runs against mocks in tests. Process-backed
//! implementations live in the binary crate.

use crate::error::{LookupError, SpawnResult};
use crate::pose::WorldTransform;
use std::path::Path;
use std::time::Duration;

/// Compiles a template description into a concrete document.
pub trait TemplateCompiler {
    /// Compile `template` with the flat `key:=value` argument list into
    /// `output`. Failure must surface the compiler's diagnostics.
    fn compile(&self, template: &Path, args: &[String], output: &Path) -> SpawnResult<()>;
}

/// Converts a concrete document into the format the spawn service accepts.
pub trait DescriptionConverter {
    fn convert(&self, input: &Path, output: &Path) -> SpawnResult<()>;
}

/// Resolves a named frame's pose in another frame.
pub trait TransformLookup {
    /// Transform of `source_frame` expressed in `target_frame`, bounded
    /// by `timeout`. Failures are recoverable by the caller's policy.
    fn lookup(
        &self,
        target_frame: &str,
        source_frame: &str,
        timeout: Duration,
    ) -> Result<WorldTransform, LookupError>;
}

/// One spawn submission.
#[derive(Debug, Clone)]
pub struct ModelSpawn<'a> {
    /// Path of the prepared description document.
    pub document: &'a Path,
    /// Instance-qualified model name.
    pub name: &'a str,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
}

/// The external model-spawn facility.
pub trait SpawnService {
    /// Block until the service is ready to accept spawns, up to `timeout`.
    fn wait_until_ready(&self, timeout: Duration) -> SpawnResult<()>;

    /// Instantiate the model in the simulation.
    fn spawn(&self, spawn: &ModelSpawn<'_>) -> SpawnResult<()>;
}

/// Execution context for one spawn request: the four collaborators plus
/// the working directory for intermediate and final documents.
pub struct SpawnContext<'a> {
    pub compiler: &'a dyn TemplateCompiler,
    pub converter: &'a dyn DescriptionConverter,
    pub lookup: &'a dyn TransformLookup,
    pub service: &'a dyn SpawnService,
    pub workdir: &'a Path,
}
