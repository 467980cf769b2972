//! Robot description resolution and patching.
//!
//! A model name resolves to either a static document or a template; the
//! result is materialized into concrete XML and run through the
//! instance and backend patch pipelines before the spawn service sees it.

mod document;
mod patch;
mod quirks;
mod resolver;
mod template;

pub use document::{Description, DescriptionKind};
pub use patch::{force_zero_gravity, set_mavlink_port, PatchOutcome};
pub use quirks::{quirks_for, QuirkPatch};
pub use resolver::{
    apply_backend_patches, apply_instance_patches, materialize, resolve, DescriptionSource,
    STATIC_DESCRIPTION, TEMPLATE_DESCRIPTION,
};
pub use template::InstanceParams;
