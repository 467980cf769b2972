//! Per-instance parameters for description resolution.

use crate::ports::{InstanceId, UdpConfig};

/// Simulation feature flags handed to the template compiler, fixed for
/// every instance.
const FEATURE_FLAGS: &[(&str, &str)] = &[
    ("enable_mavlink_interface", "true"),
    ("enable_gps_plugin", "true"),
    ("enable_ground_truth", "false"),
    ("enable_logging", "false"),
    ("enable_camera", "false"),
    ("enable_wind", "false"),
];

/// Parameter bundle for one spawn request, shared by the template
/// compiler argument builder and the static patch pipeline.
#[derive(Debug, Clone)]
pub struct InstanceParams {
    pub model: String,
    pub instance: InstanceId,
    pub udp: UdpConfig,
    pub material: String,
}

impl InstanceParams {
    /// Bundle the parameters for one instance; ports are derived from the
    /// instance id.
    pub fn new(model: impl Into<String>, instance: InstanceId, material: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            instance,
            udp: UdpConfig::for_instance(instance),
            material: material.into(),
        }
    }

    /// Instance-qualified model name, e.g. `typhoon_h480_1`.
    pub fn instance_name(&self) -> String {
        format!("{}_{}", self.model, self.instance)
    }

    /// Flat `key:=value` argument list for the template compiler.
    ///
    /// Template-origin descriptions receive their instance parameters
    /// here, at compile time, instead of being patched afterward.
    pub fn template_args(&self) -> Vec<String> {
        let mut args = vec![format!("robot_id:={}", self.instance)];
        for (key, value) in FEATURE_FLAGS {
            args.push(format!("{key}:={value}"));
        }
        args.push(format!("mavlink_udp_port:={}", self.udp.sim_port));
        args.push(format!("visual_material:={}", self.material));
        args
    }
}
