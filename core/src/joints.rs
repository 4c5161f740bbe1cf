use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, DrivetrainError, Result};
use crate::units::Real;
use crate::{CLUTCH_STATIC_THRESHOLD, MIN_GEAR_RATIO};

/// Fixed ratio between an input shaft and an output shaft.
///
/// Going downstream, inertia, acceleration and velocity are divided by the
/// ratio; going upstream they are multiplied.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(try_from = "Real", into = "Real")]
pub struct GearJoint {
    gear_ratio: Real,
}

impl GearJoint {
    pub fn new(gear_ratio: Real) -> Result<Self> {
        if gear_ratio.is_nan() || gear_ratio.abs() < MIN_GEAR_RATIO {
            return Err(DrivetrainError::InvalidGearRatio(gear_ratio));
        }
        Ok(Self { gear_ratio })
    }

    pub fn gear_ratio(&self) -> Real {
        self.gear_ratio
    }

    pub fn to_downstream(&self, value: Real) -> Real {
        value / self.gear_ratio
    }

    pub fn to_upstream(&self, value: Real) -> Real {
        value * self.gear_ratio
    }

    /// Output shaft speed for a given input shaft speed.
    pub fn output_velocity(&self, input_angular_velocity: Real) -> Real {
        input_angular_velocity / self.gear_ratio
    }
}

impl TryFrom<Real> for GearJoint {
    type Error = DrivetrainError;

    fn try_from(gear_ratio: Real) -> Result<Self> {
        Self::new(gear_ratio)
    }
}

impl From<GearJoint> for Real {
    fn from(joint: GearJoint) -> Self {
        joint.gear_ratio
    }
}

/// Friction plates pressed together by a normal force.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClutchJoint {
    static_friction_coefficient: Real,
    kinetic_friction_coefficient: Real,
    normal_force: Real,
}

impl ClutchJoint {
    pub fn new(static_friction_coefficient: Real, kinetic_friction_coefficient: Real) -> Result<Self> {
        ensure_non_negative("static friction coefficient", static_friction_coefficient)?;
        ensure_non_negative("kinetic friction coefficient", kinetic_friction_coefficient)?;
        Ok(Self {
            static_friction_coefficient,
            kinetic_friction_coefficient,
            normal_force: 0.0,
        })
    }

    pub fn normal_force(&self) -> Real {
        self.normal_force
    }

    /// Newtons; updated every step from the pedal.
    pub fn set_normal_force(&mut self, normal_force: Real) {
        self.normal_force = normal_force.max(0.0);
    }

    pub fn static_friction_coefficient(&self) -> Real {
        self.static_friction_coefficient
    }

    pub fn kinetic_friction_coefficient(&self) -> Real {
        self.kinetic_friction_coefficient
    }

    pub fn friction_coefficient(&self, velocity_difference: Real) -> Real {
        if velocity_difference.abs() < CLUTCH_STATIC_THRESHOLD {
            self.static_friction_coefficient
        } else {
            self.kinetic_friction_coefficient
        }
    }

    /// Upper bound of torque the plates can carry, using static friction.
    pub fn maximum_torque(&self, effective_radius: Real) -> Real {
        self.normal_force * self.static_friction_coefficient * effective_radius
    }

    /// Torque the plates transfer from input to output.
    ///
    /// `velocity_difference` is `input - output`; the result has its sign, so
    /// subtracting it from the input and adding it to the output pulls the two
    /// speeds together.
    pub fn frictional_torque(&self, velocity_difference: Real, effective_radius: Real) -> Real {
        if velocity_difference == 0.0 {
            return 0.0;
        }
        let magnitude =
            self.normal_force * self.friction_coefficient(velocity_difference) * effective_radius;
        magnitude.copysign(velocity_difference)
    }
}
