//! Command line surface.

use clap::Parser;
use gzspawn_core::Backend;
use std::path::PathBuf;

/// CLI arguments
#[derive(Debug, Parser)]
#[command(name = "gzspawn")]
#[command(about = "Prepare and spawn a SITL robot model in Gazebo")]
pub struct Args {
    /// Robot model name, must match a models/ subdirectory of the
    /// description root
    #[arg(long)]
    pub model: String,

    /// Robot id, used to compute the simulation UDP ports
    #[arg(long, default_value_t = 1)]
    pub id: u16,

    /// Initial x position
    #[arg(short = 'x', default_value_t = 0.0, allow_hyphen_values = true)]
    pub x: f64,

    /// Initial y position
    #[arg(short = 'y', default_value_t = 0.0, allow_hyphen_values = true)]
    pub y: f64,

    /// Initial z position
    #[arg(short = 'z', default_value_t = 0.0, allow_hyphen_values = true)]
    pub z: f64,

    /// Initial yaw angle in radians
    #[arg(short = 'Y', long = "yaw", default_value_t = 0.0, allow_hyphen_values = true)]
    pub yaw: f64,

    /// Robot description root, following the robots_description layout
    #[arg(long, default_value = "robots_description")]
    pub description_root: PathBuf,

    /// Gazebo material for the robot visual
    #[arg(long, default_value = "DarkGrey")]
    pub material: String,

    /// Flight stack backend; 'light' disables gravity on every link
    #[arg(long, default_value = "mavros")]
    pub backend: Backend,

    /// Reference frame for the initial pose; 'map' is the world origin
    #[arg(long, default_value = "map")]
    pub frame_id: String,

    /// Static frame definitions file (YAML or TOML)
    #[arg(long)]
    pub frames: Option<PathBuf>,

    /// Seconds to wait for the spawn service to become ready
    #[arg(long, default_value_t = 30)]
    pub ready_timeout: u64,

    /// Seconds allowed for one transform lookup
    #[arg(long, default_value_t = 10)]
    pub lookup_timeout: u64,

    /// Keep the working directory with intermediate files
    #[arg(long)]
    pub keep_workdir: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_conventions() {
        let args = Args::parse_from(["gzspawn", "--model", "iris"]);
        assert_eq!(args.id, 1);
        assert_eq!(args.x, 0.0);
        assert_eq!(args.frame_id, "map");
        assert_eq!(args.material, "DarkGrey");
        assert_eq!(args.backend, Backend::Mavros);
        assert_eq!(args.description_root, PathBuf::from("robots_description"));
        assert_eq!(args.ready_timeout, 30);
        assert_eq!(args.lookup_timeout, 10);
        assert!(!args.keep_workdir);
    }

    #[test]
    fn test_pose_flags_accept_negative_values() {
        let args = Args::parse_from([
            "gzspawn", "--model", "iris", "-x", "-3.5", "-y", "2.0", "-Y", "-1.57",
        ]);
        assert_eq!(args.x, -3.5);
        assert_eq!(args.y, 2.0);
        assert_eq!(args.yaw, -1.57);
    }

    #[test]
    fn test_backend_flag_rejects_unknown_value() {
        let result = Args::try_parse_from(["gzspawn", "--model", "iris", "--backend", "ue4"]);
        assert!(result.is_err());
    }
}
