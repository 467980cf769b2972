//! gzspawn - prepare and spawn a SITL robot model in Gazebo.
//!
//! Resolves the model description, patches it for this instance,
//! computes the world-frame spawn pose and submits the result through
//! the `xacro` and `gz` command line tools.

mod cli;
mod frames;
mod gazebo;
mod xacro;

use anyhow::{Context, Result};
use clap::Parser;
use gzspawn_core::{spawn_model, FramePose, InstanceId, SpawnContext, SpawnRequest};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = cli::Args::parse();

    let instance = InstanceId::new(args.id)?;
    let lookup = match &args.frames {
        Some(path) => frames::StaticFrameGraph::load(path)?,
        None => frames::StaticFrameGraph::empty(),
    };

    let tempdir = tempfile::Builder::new()
        .prefix("gzspawn_")
        .tempdir()
        .context("creating working directory")?;
    // Retention is decided up front; a failed spawn leaves the
    // intermediate files in place when --keep-workdir is set.
    let (workdir, _workdir_guard) = resolve_workdir(args.keep_workdir, tempdir);

    let request = SpawnRequest {
        model: args.model,
        instance,
        pose: FramePose {
            x: args.x,
            y: args.y,
            z: args.z,
            yaw: args.yaw,
        },
        frame_id: args.frame_id,
        material: args.material,
        backend: args.backend,
        description_root: args.description_root,
        ready_timeout: Duration::from_secs(args.ready_timeout),
        lookup_timeout: Duration::from_secs(args.lookup_timeout),
    };

    let ctx = SpawnContext {
        compiler: &xacro::XacroCompiler,
        converter: &gazebo::GzSdfConverter,
        lookup: &lookup,
        service: &gazebo::GzModelService,
        workdir: &workdir,
    };

    let outcome = spawn_model(&ctx, &request).context("spawn failed")?;
    info!(
        name = %outcome.name,
        x = outcome.pose.x,
        y = outcome.pose.y,
        z = outcome.pose.z,
        yaw = outcome.pose.yaw,
        document = %outcome.document.display(),
        "spawned model"
    );
    Ok(())
}

/// Turn the temp directory into the pipeline's working directory.
///
/// When kept, the directory is persisted immediately so it survives any
/// later failure; otherwise the returned guard removes it on exit.
fn resolve_workdir(
    keep: bool,
    tempdir: tempfile::TempDir,
) -> (std::path::PathBuf, Option<tempfile::TempDir>) {
    if keep {
        let path = tempdir.into_path();
        info!(path = %path.display(), "keeping working directory");
        (path, None)
    } else {
        (tempdir.path().to_path_buf(), Some(tempdir))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kept_workdir_survives_guard_drop() {
        let tempdir = tempfile::tempdir().unwrap();
        let (path, guard) = resolve_workdir(true, tempdir);
        drop(guard);
        assert!(path.is_dir());
        std::fs::remove_dir_all(&path).unwrap();
    }

    #[test]
    fn test_unkept_workdir_removed_with_guard() {
        let tempdir = tempfile::tempdir().unwrap();
        let (path, guard) = resolve_workdir(false, tempdir);
        assert!(path.is_dir());
        drop(guard);
        assert!(!path.exists());
    }
}
