use log::trace;
use serde::{Deserialize, Serialize};

use crate::components::Part;
use crate::drivetrain::Drivetrain;
use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::joints::ClutchJoint;
use crate::traits::{ControllerInput, NodeId};
use crate::units::{rpm_to_angular_velocity, Real};
use crate::CLUTCH_HYSTERESIS_RPM;

/// Pedal travel below which the clutch is fully engaged.
const PEDAL_ENGAGED: Real = 0.4;
/// Pedal travel above which the clutch is fully open.
const PEDAL_DISENGAGED: Real = 0.6;

const DISENGAGED_THRESHOLD: Real = 0.005;
const ENGAGED_THRESHOLD: Real = 0.995;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClutchConfig {
    pub inertia: Real,
    /// Newtons pressing the plates together at full engagement.
    pub maximum_normal_force: Real,
    pub static_friction_coefficient: Real,
    pub kinetic_friction_coefficient: Real,
    /// Metres from the shaft to where the plates grip.
    pub effective_radius: Real,
}

impl Default for ClutchConfig {
    fn default() -> Self {
        Self {
            inertia: 0.1,
            maximum_normal_force: 4000.0,
            static_friction_coefficient: 0.5,
            kinetic_friction_coefficient: 0.35,
            effective_radius: 0.15,
        }
    }
}

/// Fraction of engagement for a pedal position: 1 below 0.4, 0 above 0.6,
/// linear in between.
pub fn engagement_for_pedal(pedal: Real) -> Real {
    if pedal <= PEDAL_ENGAGED {
        1.0
    } else if pedal >= PEDAL_DISENGAGED {
        0.0
    } else {
        (PEDAL_DISENGAGED - pedal) / (PEDAL_DISENGAGED - PEDAL_ENGAGED)
    }
}

#[derive(Debug, Clone)]
pub struct Clutch {
    config: ClutchConfig,
    joint: ClutchJoint,
    engagement: Real,
}

impl Clutch {
    /// Starts fully engaged.
    pub fn new(config: ClutchConfig) -> Result<Self> {
        ensure_positive("clutch inertia", config.inertia)?;
        ensure_non_negative("clutch normal force", config.maximum_normal_force)?;
        ensure_non_negative("clutch effective radius", config.effective_radius)?;
        let joint = ClutchJoint::new(
            config.static_friction_coefficient,
            config.kinetic_friction_coefficient,
        )?;
        let mut clutch = Self {
            config,
            joint,
            engagement: 0.0,
        };
        clutch.set_engagement(1.0);
        Ok(clutch)
    }

    pub fn config(&self) -> &ClutchConfig {
        &self.config
    }

    pub fn joint(&self) -> &ClutchJoint {
        &self.joint
    }

    pub fn engagement(&self) -> Real {
        self.engagement
    }

    pub fn set_engagement(&mut self, engagement: Real) {
        self.engagement = engagement.clamp(0.0, 1.0);
        self.joint
            .set_normal_force(self.engagement * self.config.maximum_normal_force);
    }

    pub fn is_disengaged(&self) -> bool {
        self.engagement < DISENGAGED_THRESHOLD
    }

    pub fn is_engaged(&self) -> bool {
        self.engagement > ENGAGED_THRESHOLD
    }

    pub fn maximum_frictional_torque(&self) -> Real {
        self.joint.maximum_torque(self.config.effective_radius)
    }

    /// Open: nothing. Locked: the full subtree. In between the maximum
    /// frictional torque stands in for the partially coupled inertia.
    pub(crate) fn downstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        if from == id || self.is_engaged() {
            net.base_downstream_inertia(id, from)
        } else if self.is_disengaged() {
            0.0
        } else {
            self.maximum_frictional_torque()
        }
    }

    pub(crate) fn upstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        if self.is_engaged() {
            net.base_upstream_inertia(id, from)
        } else {
            net.inertia(id)
        }
    }

    /// Only a locked clutch passes changes across rigidly.
    pub(crate) fn downstream_coupling(&self) -> Option<Real> {
        self.is_engaged().then_some(1.0)
    }

    pub(crate) fn upstream_coupling(&self) -> Option<Real> {
        self.is_engaged().then_some(1.0)
    }
}

impl Drivetrain {
    pub fn add_clutch(&mut self, config: ClutchConfig) -> Result<NodeId> {
        let inertia = config.inertia;
        let clutch = Clutch::new(config)?;
        self.add_node(inertia, Part::Clutch(clutch))
    }

    pub(crate) fn read_clutch_pedal(&mut self, id: NodeId, controller: &dyn ControllerInput) {
        let engagement = engagement_for_pedal(controller.clutch_position());
        if let Some(clutch) = self.clutch_mut(id) {
            clutch.set_engagement(engagement);
        }
    }

    pub(crate) fn update_clutch(&mut self, id: NodeId) -> Result<()> {
        let input = self.expected_input(id)?;
        let Some(clutch) = self.clutch(id) else {
            return Ok(());
        };
        if clutch.is_disengaged() {
            return Ok(());
        }
        let effective_radius = clutch.config.effective_radius;
        let joint = clutch.joint;

        // No slip torque inside the hysteresis band, so speeds never match exactly.
        let difference = self.angular_velocity(input) - self.angular_velocity(id);
        if difference.abs() <= rpm_to_angular_velocity(CLUTCH_HYSTERESIS_RPM) {
            return Ok(());
        }
        let torque = joint.frictional_torque(difference, effective_radius);
        trace!("clutch {id} slipping by {difference:.2} rad/s, transferring {torque:.2} N·m");
        self.apply_upstream_torque(input, -torque, id);
        self.apply_downstream_torque(id, torque, id);
        Ok(())
    }
}
