//! Process adapters for the Gazebo command line tools.

use gzspawn_core::{DescriptionConverter, ModelSpawn, SpawnError, SpawnResult, SpawnService};
use std::fs;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Delay after the service first reports ready before submitting, giving
/// the world time to finish loading.
const SETTLE_DELAY: Duration = Duration::from_millis(400);

const READY_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Converts a description into spawnable SDF via `gz sdf -p`.
pub struct GzSdfConverter;

impl DescriptionConverter for GzSdfConverter {
    fn convert(&self, input: &Path, output: &Path) -> SpawnResult<()> {
        debug!(input = %input.display(), output = %output.display(), "converting description");
        let out = Command::new("gz").arg("sdf").arg("-p").arg(input).output()?;
        if !out.status.success() {
            return Err(SpawnError::Conversion(
                String::from_utf8_lossy(&out.stderr).into_owned(),
            ));
        }
        fs::write(output, &out.stdout)?;
        Ok(())
    }
}

/// Spawn service backed by the `gz model` tool.
pub struct GzModelService;

impl SpawnService for GzModelService {
    fn wait_until_ready(&self, timeout: Duration) -> SpawnResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            let ready = Command::new("gz")
                .arg("model")
                .arg("--list")
                .output()
                .map(|out| out.status.success())
                .unwrap_or(false);
            if ready {
                info!("spawn service ready");
                thread::sleep(SETTLE_DELAY);
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(SpawnError::ServiceNotReady(timeout));
            }
            thread::sleep(READY_POLL_INTERVAL);
        }
    }

    fn spawn(&self, spawn: &ModelSpawn<'_>) -> SpawnResult<()> {
        let out = Command::new("gz")
            .arg("model")
            .arg("-f")
            .arg(spawn.document)
            .arg("-m")
            .arg(spawn.name)
            .arg("-x")
            .arg(spawn.x.to_string())
            .arg("-y")
            .arg(spawn.y.to_string())
            .arg("-z")
            .arg(spawn.z.to_string())
            .arg("-Y")
            .arg(spawn.yaw.to_string())
            .output()?;
        if !out.status.success() {
            return Err(SpawnError::SpawnRejected {
                name: spawn.name.to_string(),
                reason: String::from_utf8_lossy(&out.stderr).into_owned(),
            });
        }
        Ok(())
    }
}
