//! Model description resolution and the patch pipeline.

use super::document::{Description, DescriptionKind};
use super::patch;
use super::quirks;
use super::template::InstanceParams;
use crate::context::{DescriptionConverter, TemplateCompiler};
use crate::error::{SpawnError, SpawnResult};
use crate::spawn::Backend;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Static description file name inside a model directory.
pub const STATIC_DESCRIPTION: &str = "model.sdf";

/// Template description file name inside a model directory.
pub const TEMPLATE_DESCRIPTION: &str = "model.xacro";

/// A selected description file, not yet materialized.
#[derive(Debug, Clone)]
pub struct DescriptionSource {
    pub kind: DescriptionKind,
    pub path: PathBuf,
}

/// Select the description file for a model.
///
/// Looks in `<description_root>/models/<model>/`. A static
/// `model.sdf` takes precedence over a template `model.xacro` when both
/// are present. A missing model directory, or a directory with neither
/// file, is a fatal resolution error.
pub fn resolve(description_root: &Path, model: &str) -> SpawnResult<DescriptionSource> {
    let dir = description_root.join("models").join(model);
    if !dir.is_dir() {
        return Err(SpawnError::ModelDirMissing {
            model: model.to_string(),
            dir,
        });
    }

    let source = if dir.join(STATIC_DESCRIPTION).is_file() {
        DescriptionSource {
            kind: DescriptionKind::Static,
            path: dir.join(STATIC_DESCRIPTION),
        }
    } else if dir.join(TEMPLATE_DESCRIPTION).is_file() {
        DescriptionSource {
            kind: DescriptionKind::Template,
            path: dir.join(TEMPLATE_DESCRIPTION),
        }
    } else {
        return Err(SpawnError::MissingDescription {
            model: model.to_string(),
            dir,
        });
    };

    info!(model, kind = ?source.kind, path = %source.path.display(), "resolved description");
    Ok(source)
}

/// Turn a selected source into a concrete description.
///
/// Static sources are read from disk directly. Template sources are
/// compiled with the instance parameters into `<workdir>/<model>.urdf`,
/// then converted into `<workdir>/<model>.sdf`. Either way the result
/// must parse as XML.
pub fn materialize(
    source: &DescriptionSource,
    params: &InstanceParams,
    compiler: &dyn TemplateCompiler,
    converter: &dyn DescriptionConverter,
    workdir: &Path,
) -> SpawnResult<Description> {
    match source.kind {
        DescriptionKind::Static => {
            let xml = fs::read_to_string(&source.path)?;
            Description::from_xml(DescriptionKind::Static, xml)
        }
        DescriptionKind::Template => {
            let compiled = workdir.join(format!("{}.urdf", params.model));
            compiler.compile(&source.path, &params.template_args(), &compiled)?;
            let converted = workdir.join(format!("{}.sdf", params.model));
            converter.convert(&compiled, &converted)?;
            let xml = fs::read_to_string(&converted)?;
            Description::from_xml(DescriptionKind::Template, xml)
        }
    }
}

/// Apply the per-instance patches.
///
/// Template-origin descriptions already received their instance
/// parameters at compile time, so this is the identity for them. Static
/// descriptions get the mavlink port patch followed by any quirk patches
/// registered for the model.
pub fn apply_instance_patches(
    description: Description,
    params: &InstanceParams,
) -> SpawnResult<Description> {
    if description.kind() == DescriptionKind::Template {
        return Ok(description);
    }

    let outcome = patch::set_mavlink_port(description.as_str(), params.udp.sim_port)?;
    debug!(matches = outcome.matches, port = params.udp.sim_port, "mavlink port patch");
    let mut description = description.with_xml(outcome.xml);

    for quirk in quirks::quirks_for(&params.model) {
        let outcome = quirk.run(description.as_str(), params)?;
        if outcome.matches == 0 {
            warn!(model = %params.model, quirk = quirk.name(), "quirk patch found no target");
        } else {
            debug!(quirk = quirk.name(), matches = outcome.matches, "quirk patch applied");
        }
        description = description.with_xml(outcome.xml);
    }

    Ok(description)
}

/// Apply backend-dependent patches: the `light` backend forces zero
/// gravity on every link so the model holds its pose without physics.
pub fn apply_backend_patches(description: Description, backend: Backend) -> SpawnResult<Description> {
    if backend != Backend::Light {
        return Ok(description);
    }
    let outcome = patch::force_zero_gravity(description.as_str())?;
    debug!(links = outcome.matches, "zero gravity patch");
    Ok(description.with_xml(outcome.xml))
}
