//! Per-instance UDP port allocation.
//!
//! Every simulated robot instance gets a deterministic set of UDP ports
//! derived from its instance id, following the PX4 SITL port families.

use crate::error::{SpawnError, SpawnResult};
use std::fmt;

/// Base port for the flight stack <-> simulator link
const SIM_PORT_BASE: u16 = 14560;

/// Base port for the local offboard API link
const OFFBOARD_PORT_BASE: u16 = 14580;

/// Base port for the local ground control link
const GCS_PORT_BASE: u16 = 18570;

/// Highest supported instance id.
///
/// Keeps the three port families pairwise disjoint, so every port
/// allocated to any supported instance is distinct.
pub const MAX_INSTANCE_ID: u16 = 19;

/// Identifier of one simulated robot instance.
///
/// Drives port and model-name derivation. Validated against the
/// supported range at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstanceId(u16);

impl InstanceId {
    /// Create an instance id, rejecting ids outside the supported range.
    pub fn new(id: u16) -> SpawnResult<Self> {
        if id > MAX_INSTANCE_ID {
            return Err(SpawnError::InstanceOutOfRange {
                id,
                max: MAX_INSTANCE_ID,
            });
        }
        Ok(Self(id))
    }

    /// Raw numeric id.
    pub fn get(self) -> u16 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// UDP port set for one instance.
///
/// Recomputed on demand from the instance id, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpConfig {
    /// Flight stack <-> simulator port, injected into the description
    pub sim_port: u16,
    /// Offboard API port on localhost
    pub offboard_port: u16,
    /// Ground control port on localhost
    pub gcs_port: u16,
}

impl UdpConfig {
    /// Derive the port set for an instance. Pure and deterministic.
    pub fn for_instance(id: InstanceId) -> Self {
        Self {
            sim_port: SIM_PORT_BASE + id.get(),
            offboard_port: OFFBOARD_PORT_BASE + id.get(),
            gcs_port: GCS_PORT_BASE + id.get(),
        }
    }
}
