//! Model-specific quirk patches.
//!
//! Some static descriptions need bespoke fixups beyond the generic port
//! and physics patches. Each known model maps to an explicit list of
//! named patch functions; unknown models receive none.

use super::patch::{self, PatchOutcome};
use super::template::InstanceParams;
use crate::error::SpawnResult;

type QuirkFn = fn(&str, &InstanceParams) -> SpawnResult<PatchOutcome>;

/// One named, model-specific patch.
pub struct QuirkPatch {
    name: &'static str,
    apply: QuirkFn,
}

impl QuirkPatch {
    /// Human-readable patch name, for logging.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the patch. A zero-match outcome means the expected target was
    /// absent; callers decide whether that is worth a warning.
    pub fn run(&self, xml: &str, params: &InstanceParams) -> SpawnResult<PatchOutcome> {
        (self.apply)(xml, params)
    }
}

/// Quirk patches for a model, in application order.
pub fn quirks_for(model: &str) -> &'static [QuirkPatch] {
    match model {
        "typhoon_h480" => &TYPHOON_H480,
        _ => &[],
    }
}

/// The typhoon_h480 gimbal references its camera IMU by absolute name,
/// which must be qualified with the instance name to stay unique across
/// instances.
static TYPHOON_H480: [QuirkPatch; 2] = [
    QuirkPatch {
        name: "gimbal_imu_retarget",
        apply: retarget_gimbal_imu,
    },
    QuirkPatch {
        name: "camera_imu_rename",
        apply: rename_camera_imu,
    },
];

/// Point the gimbal controller at the instance-qualified camera IMU.
fn retarget_gimbal_imu(xml: &str, params: &InstanceParams) -> SpawnResult<PatchOutcome> {
    let imu = camera_imu_name(params);
    patch::set_child_text(xml, "plugin", Some("gimbal_controller"), "gimbal_imu", &imu, false)
}

/// Rename the camera IMU sensor to its instance-qualified name.
fn rename_camera_imu(xml: &str, params: &InstanceParams) -> SpawnResult<PatchOutcome> {
    let imu = camera_imu_name(params);
    patch::rename_child(xml, "link", "cgo3_camera_link", "sensor", "camera_imu", &imu)
}

fn camera_imu_name(params: &InstanceParams) -> String {
    format!("{}::camera_imu", params.instance_name())
}
