//! Frame-relative to world-frame pose composition.
//!
//! The spawn pose may be given relative to a named reference frame. The
//! composition here is planar: a z-up world transform restricted to yaw
//! rotation, combined with the frame-relative offset. Frames with roll or
//! pitch are rejected outright since the spawn service only accepts yaw.

use crate::context::TransformLookup;
use crate::error::{SpawnError, SpawnResult};
use nalgebra::{Translation3, UnitQuaternion};
use std::time::Duration;
use tracing::error;

/// Name of the world frame (the simulator origin).
pub const WORLD_FRAME: &str = "map";

/// Tolerance on the quaternion x/y components of a frame rotation.
/// Anything beyond this is a genuinely tilted frame, not float noise.
const YAW_ONLY_EPSILON: f64 = 1e-6;

/// A spawn pose relative to a named reference frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramePose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
}

/// The final spawn pose in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WorldPose {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub yaw: f64,
}

/// A named frame's pose in the world frame, as reported by the transform
/// lookup collaborator.
#[derive(Debug, Clone)]
pub struct WorldTransform {
    pub translation: Translation3<f64>,
    pub rotation: UnitQuaternion<f64>,
}

impl WorldTransform {
    pub fn new(translation: Translation3<f64>, rotation: UnitQuaternion<f64>) -> Self {
        Self { translation, rotation }
    }

    /// A yaw-only transform, mostly useful for tests and static frames.
    pub fn from_yaw(x: f64, y: f64, z: f64, yaw: f64) -> Self {
        Self {
            translation: Translation3::new(x, y, z),
            rotation: UnitQuaternion::from_euler_angles(0.0, 0.0, yaw),
        }
    }

    /// Extract the yaw angle, verifying the rotation has no roll or pitch
    /// component first.
    pub fn yaw_only(&self) -> SpawnResult<f64> {
        let q = self.rotation.quaternion();
        if q.i.abs() > YAW_ONLY_EPSILON {
            return Err(SpawnError::InvalidRotation {
                component: "x",
                value: q.i,
            });
        }
        if q.j.abs() > YAW_ONLY_EPSILON {
            return Err(SpawnError::InvalidRotation {
                component: "y",
                value: q.j,
            });
        }
        Ok(2.0 * q.k.atan2(q.w))
    }
}

/// Compute the world-frame spawn pose for a frame-relative request.
///
/// For the world frame this is the identity and no lookup happens. For
/// any other frame the transform is looked up with the given timeout; a
/// lookup failure is logged and the pose is treated as already
/// world-frame so the spawn proceeds best-effort. A frame transform with
/// roll or pitch is a hard error.
pub fn world_pose(
    pose: FramePose,
    frame_id: &str,
    lookup: &dyn TransformLookup,
    timeout: Duration,
) -> SpawnResult<WorldPose> {
    let as_world = WorldPose {
        x: pose.x,
        y: pose.y,
        z: pose.z,
        yaw: pose.yaw,
    };

    if frame_id == WORLD_FRAME {
        return Ok(as_world);
    }

    let transform = match lookup.lookup(WORLD_FRAME, frame_id, timeout) {
        Ok(transform) => transform,
        Err(err) => {
            error!(
                frame = frame_id,
                %err,
                "transform lookup failed, treating pose as world-frame"
            );
            return Ok(as_world);
        }
    };

    let theta = transform.yaw_only()?;
    let (sin, cos) = theta.sin_cos();
    let t = &transform.translation;
    Ok(WorldPose {
        x: t.x + pose.x * cos - pose.y * sin,
        y: t.y + pose.x * sin + pose.y * cos,
        z: t.z + pose.z,
        yaw: theta + pose.yaw,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LookupError;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_2;

    struct FixedLookup(WorldTransform);

    impl TransformLookup for FixedLookup {
        fn lookup(
            &self,
            _target: &str,
            _source: &str,
            _timeout: Duration,
        ) -> Result<WorldTransform, LookupError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLookup;

    impl TransformLookup for FailingLookup {
        fn lookup(
            &self,
            _target: &str,
            source: &str,
            _timeout: Duration,
        ) -> Result<WorldTransform, LookupError> {
            Err(LookupError::UnknownFrame(source.to_string()))
        }
    }

    struct PanicLookup;

    impl TransformLookup for PanicLookup {
        fn lookup(
            &self,
            _target: &str,
            _source: &str,
            _timeout: Duration,
        ) -> Result<WorldTransform, LookupError> {
            panic!("world frame must not trigger a lookup");
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[test]
    fn test_world_frame_is_identity_without_lookup() {
        let pose = FramePose { x: 1.5, y: -2.0, z: 0.7, yaw: 0.3 };
        let world = world_pose(pose, WORLD_FRAME, &PanicLookup, TIMEOUT).unwrap();
        assert_eq!(world, WorldPose { x: 1.5, y: -2.0, z: 0.7, yaw: 0.3 });
    }

    #[test]
    fn test_quarter_turn_composition() {
        let lookup = FixedLookup(WorldTransform::from_yaw(1.0, 2.0, 0.0, FRAC_PI_2));
        let pose = FramePose { x: 1.0, y: 0.0, z: 0.0, yaw: 0.0 };
        let world = world_pose(pose, "takeoff_pad", &lookup, TIMEOUT).unwrap();
        assert_relative_eq!(world.x, 1.0, epsilon = 1e-9);
        assert_relative_eq!(world.y, 3.0, epsilon = 1e-9);
        assert_relative_eq!(world.z, 0.0, epsilon = 1e-9);
        assert_relative_eq!(world.yaw, FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_translation_only_frame_offsets_pose() {
        let lookup = FixedLookup(WorldTransform::from_yaw(10.0, -4.0, 2.0, 0.0));
        let pose = FramePose { x: 1.0, y: 2.0, z: 3.0, yaw: 0.5 };
        let world = world_pose(pose, "pad", &lookup, TIMEOUT).unwrap();
        assert_relative_eq!(world.x, 11.0, epsilon = 1e-9);
        assert_relative_eq!(world.y, -2.0, epsilon = 1e-9);
        assert_relative_eq!(world.z, 5.0, epsilon = 1e-9);
        assert_relative_eq!(world.yaw, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_rolled_frame_is_rejected() {
        let transform = WorldTransform::new(
            Translation3::new(0.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.2, 0.0, 0.0),
        );
        let lookup = FixedLookup(transform);
        let pose = FramePose { x: 0.0, y: 0.0, z: 0.0, yaw: 0.0 };
        let err = world_pose(pose, "tilted", &lookup, TIMEOUT).unwrap_err();
        assert!(matches!(err, SpawnError::InvalidRotation { component: "x", .. }));
    }

    #[test]
    fn test_pitched_frame_is_rejected() {
        let transform = WorldTransform::new(
            Translation3::new(0.0, 0.0, 0.0),
            UnitQuaternion::from_euler_angles(0.0, 0.2, 0.0),
        );
        let lookup = FixedLookup(transform);
        let pose = FramePose { x: 0.0, y: 0.0, z: 0.0, yaw: 0.0 };
        let err = world_pose(pose, "tilted", &lookup, TIMEOUT).unwrap_err();
        assert!(matches!(err, SpawnError::InvalidRotation { component: "y", .. }));
    }

    #[test]
    fn test_lookup_failure_falls_back_to_world_frame() {
        let pose = FramePose { x: 4.0, y: 5.0, z: 0.0, yaw: 1.0 };
        let world = world_pose(pose, "nowhere", &FailingLookup, TIMEOUT).unwrap();
        assert_eq!(world, WorldPose { x: 4.0, y: 5.0, z: 0.0, yaw: 1.0 });
    }
}
