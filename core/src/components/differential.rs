use serde::{Deserialize, Serialize};

use crate::components::Part;
use crate::drivetrain::Drivetrain;
use crate::error::{ensure_positive, Result};
use crate::joints::GearJoint;
use crate::traits::NodeId;
use crate::units::Real;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferentialConfig {
    pub inertia: Real,
    pub final_drive_ratio: Real,
}

impl Default for DifferentialConfig {
    fn default() -> Self {
        Self {
            inertia: 0.05,
            final_drive_ratio: 3.42,
        }
    }
}

/// A differential that never lets its outputs slip against each other:
/// every driven wheel turns at the same speed through one final drive ratio.
///
/// Unlike [`crate::Transmission`] its speed comes from the integrator only.
#[derive(Debug, Clone)]
pub struct LockedDifferential {
    config: DifferentialConfig,
    gear: GearJoint,
}

impl LockedDifferential {
    pub fn new(config: DifferentialConfig) -> Result<Self> {
        ensure_positive("differential inertia", config.inertia)?;
        let gear = GearJoint::new(config.final_drive_ratio)?;
        Ok(Self { config, gear })
    }

    pub fn config(&self) -> &DifferentialConfig {
        &self.config
    }

    pub fn gear(&self) -> GearJoint {
        self.gear
    }

    pub(crate) fn downstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        let inertia = net.base_downstream_inertia(id, from);
        if from == id {
            inertia
        } else {
            self.gear.to_downstream(inertia)
        }
    }

    pub(crate) fn upstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        net.inertia(id)
            + net
                .input(id)
                .map_or(0.0, |input| self.gear.to_upstream(net.upstream_inertia(input, from)))
    }
}

impl Drivetrain {
    pub fn add_differential(&mut self, config: DifferentialConfig) -> Result<NodeId> {
        let inertia = config.inertia;
        let differential = LockedDifferential::new(config)?;
        self.add_node(inertia, Part::LockedDifferential(differential))
    }
}
