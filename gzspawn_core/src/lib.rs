//! gzspawn_core - description resolution and spawn pose pipeline for
//! SITL robot models.
//!
//! The library prepares one robot instance for spawning: it resolves the
//! model's description (static or templated), patches it with
//! per-instance parameters, computes the world-frame spawn pose from a
//! frame-relative request, and hands both to the external spawn service
//! through the collaborator interfaces in [`context`].

pub mod context;
pub mod description;
pub mod error;
pub mod ports;
pub mod pose;
pub mod spawn;

pub use context::{
    DescriptionConverter, ModelSpawn, SpawnContext, SpawnService, TemplateCompiler,
    TransformLookup,
};
pub use description::{Description, DescriptionKind, DescriptionSource, InstanceParams};
pub use error::{LookupError, SpawnError, SpawnResult};
pub use ports::{InstanceId, UdpConfig, MAX_INSTANCE_ID};
pub use pose::{world_pose, FramePose, WorldPose, WorldTransform, WORLD_FRAME};
pub use spawn::{spawn_model, Backend, SpawnOutcome, SpawnRequest, GROUND_CLEARANCE};
