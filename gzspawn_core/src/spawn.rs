//! Spawn orchestration.
//!
//! Sequences the pipeline for one request: ports, description
//! resolution and patching, pose composition, then submission to the
//! spawn service. Every fatal error fires before anything external is
//! spawned; the in-memory description is simply dropped with it.

use crate::context::{ModelSpawn, SpawnContext};
use crate::description::{self, InstanceParams};
use crate::error::{SpawnError, SpawnResult};
use crate::pose::{self, FramePose, WorldPose};
use crate::ports::InstanceId;
use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Added to the world z unconditionally so the model never spawns into
/// the ground plane.
pub const GROUND_CLEARANCE: f64 = 0.3;

/// Flight stack backend selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// Full flight stack bridge; descriptions keep their physics.
    Mavros,
    /// Lightweight simulation; every link gets gravity forced to zero.
    Light,
}

impl FromStr for Backend {
    type Err = SpawnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mavros" => Ok(Self::Mavros),
            "light" => Ok(Self::Light),
            other => Err(SpawnError::UnknownBackend(other.to_string())),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mavros => f.write_str("mavros"),
            Self::Light => f.write_str("light"),
        }
    }
}

/// Everything needed to spawn one robot instance.
#[derive(Debug, Clone)]
pub struct SpawnRequest {
    pub model: String,
    pub instance: InstanceId,
    /// Requested pose, relative to `frame_id`.
    pub pose: FramePose,
    pub frame_id: String,
    pub material: String,
    pub backend: Backend,
    pub description_root: PathBuf,
    pub ready_timeout: Duration,
    pub lookup_timeout: Duration,
}

/// What a successful spawn produced.
#[derive(Debug, Clone)]
pub struct SpawnOutcome {
    /// Instance-qualified model name in the simulation.
    pub name: String,
    /// Final world pose, before ground clearance.
    pub pose: WorldPose,
    /// Path of the prepared description document.
    pub document: PathBuf,
}

/// Prepare the description and pose for one request and submit them to
/// the spawn service.
pub fn spawn_model(ctx: &SpawnContext<'_>, request: &SpawnRequest) -> SpawnResult<SpawnOutcome> {
    let params = InstanceParams::new(&request.model, request.instance, &request.material);
    info!(
        model = %request.model,
        id = %request.instance,
        sim_port = params.udp.sim_port,
        backend = %request.backend,
        "preparing spawn"
    );

    let source = description::resolve(&request.description_root, &request.model)?;
    let document = description::materialize(&source, &params, ctx.compiler, ctx.converter, ctx.workdir)?;
    let document = description::apply_instance_patches(document, &params)?;
    let document = description::apply_backend_patches(document, request.backend)?;

    let pose = pose::world_pose(request.pose, &request.frame_id, ctx.lookup, request.lookup_timeout)?;

    let name = params.instance_name();
    let path = ctx.workdir.join(format!("{name}.sdf"));
    fs::write(&path, document.into_xml())?;

    ctx.service.wait_until_ready(request.ready_timeout)?;
    ctx.service.spawn(&ModelSpawn {
        document: &path,
        name: &name,
        x: pose.x,
        y: pose.y,
        z: pose.z + GROUND_CLEARANCE,
        yaw: pose.yaw,
    })?;

    info!(name = %name, x = pose.x, y = pose.y, z = pose.z, yaw = pose.yaw, "model spawned");
    Ok(SpawnOutcome {
        name,
        pose,
        document: path,
    })
}
