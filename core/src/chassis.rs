use serde::{Deserialize, Serialize};

use crate::drivetrain::Drivetrain;
use crate::error::{ensure_non_negative, DrivetrainError, Result};
use crate::traits::{ChassisId, NodeId};
use crate::units::Real;
use crate::MASS_EPSILON;

pub const WHEEL_SLOTS: usize = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RacecarBodyConfig {
    /// Kilograms, excluding wheels.
    pub mass: Real,
}

impl Default for RacecarBodyConfig {
    fn default() -> Self {
        Self { mass: 1000.0 }
    }
}

/// Linear-motion aggregate the wheels push against.
///
/// Impulses are applied through [`crate::Drivetrain::apply_linear_impulse`]
/// since the total mass and the velocity broadcast involve the attached wheels.
#[derive(Debug, Clone)]
pub struct RacecarBody {
    mass: Real,
    linear_velocity: Real,
    wheels: [Option<NodeId>; WHEEL_SLOTS],
}

impl RacecarBody {
    pub fn new(config: RacecarBodyConfig) -> Result<Self> {
        ensure_non_negative("chassis mass", config.mass)?;
        Ok(Self {
            mass: config.mass,
            linear_velocity: 0.0,
            wheels: [None; WHEEL_SLOTS],
        })
    }

    /// Own mass, without wheels.
    pub fn mass(&self) -> Real {
        self.mass
    }

    pub fn linear_velocity(&self) -> Real {
        self.linear_velocity
    }

    pub fn set_linear_velocity(&mut self, linear_velocity: Real) {
        self.linear_velocity = linear_velocity;
    }

    pub fn wheels(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.wheels.iter().flatten().copied()
    }

    pub fn wheel_at(&self, slot: usize) -> Option<NodeId> {
        self.wheels.get(slot).copied().flatten()
    }

    pub(crate) fn set_wheel(&mut self, slot: usize, wheel: NodeId) {
        self.wheels[slot] = Some(wheel);
    }

    /// Additive velocity change, no broadcast to the wheels.
    pub fn on_linear_velocity_change(&mut self, change: Real) {
        self.linear_velocity += change;
    }

    pub fn config(&self) -> RacecarBodyConfig {
        RacecarBodyConfig { mass: self.mass }
    }
}

impl Drivetrain {
    pub fn add_chassis(&mut self, config: RacecarBodyConfig) -> Result<ChassisId> {
        let chassis = RacecarBody::new(config)?;
        let id = ChassisId(self.chassis.len() as u32);
        self.chassis.push(chassis);
        Ok(id)
    }

    pub fn chassis(&self, id: ChassisId) -> Option<&RacecarBody> {
        self.chassis.get(id.index())
    }

    pub fn chassis_mut(&mut self, id: ChassisId) -> Option<&mut RacecarBody> {
        self.chassis.get_mut(id.index())
    }

    /// Puts `wheel` in one of the chassis' four slots. A wheel belongs to
    /// at most one slot of one chassis.
    pub fn attach_wheel(&mut self, chassis: ChassisId, slot: usize, wheel: NodeId) -> Result<()> {
        let body = self
            .chassis
            .get(chassis.index())
            .ok_or(DrivetrainError::UnknownChassis(chassis))?;
        if slot >= WHEEL_SLOTS {
            return Err(DrivetrainError::InvalidWheelSlot(slot));
        }
        if body.wheel_at(slot).is_some() {
            return Err(DrivetrainError::WheelSlotOccupied { chassis, slot });
        }
        let attached = self.wheel_mut(wheel).ok_or(DrivetrainError::NotAWheel(wheel))?;
        if attached.chassis().is_some() {
            return Err(DrivetrainError::WheelAlreadyAttached(wheel));
        }
        attached.set_chassis(chassis);
        self.chassis[chassis.index()].set_wheel(slot, wheel);
        Ok(())
    }

    /// Chassis mass plus the mass of every attached wheel.
    pub fn chassis_total_mass(&self, chassis: ChassisId) -> Real {
        let body = &self.chassis[chassis.index()];
        body.mass()
            + body
                .wheels()
                .filter_map(|wheel| self.wheel(wheel))
                .map(|wheel| wheel.mass())
                .sum::<Real>()
    }

    /// Changes the chassis speed by `impulse / total mass` and hands the
    /// resulting speed to every attached wheel.
    pub fn apply_linear_impulse(&mut self, chassis: ChassisId, impulse: Real) {
        let total_mass = self.chassis_total_mass(chassis);
        assert!(
            total_mass > MASS_EPSILON,
            "{chassis} is too light ({total_mass} kg) to take an impulse"
        );
        let body = &mut self.chassis[chassis.index()];
        body.linear_velocity += impulse / total_mass;
        let linear_velocity = body.linear_velocity;
        let wheels: Vec<NodeId> = body.wheels().collect();
        for wheel in wheels {
            if let Some(wheel) = self.wheel_mut(wheel) {
                wheel.set_linear_velocity(linear_velocity);
            }
        }
    }
}
