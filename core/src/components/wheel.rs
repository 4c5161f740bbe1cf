//! Wheels couple the rotational network to the linear motion of the car.
//!
//! While on the ground a wheel reflects the chassis mass into its inertia
//! (`mass * radius²`) and mirrors every change of its angular velocity into
//! the linear domain (`Δv = Δω * radius`). Ground friction then trades
//! impulse between the wheel and the chassis to pull the contact patch speed
//! towards the chassis speed.

use log::trace;
use serde::{Deserialize, Serialize};

use crate::components::Part;
use crate::drivetrain::Drivetrain;
use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::traits::{ChassisId, ControllerInput, NodeId};
use crate::units::Real;
use crate::MASS_EPSILON;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub enum GroundFriction {
    /// Contact patch and chassis speeds are matched in a single step.
    Infinite,
    /// Impulse per step limited to `μ * g * mass * dt`.
    Coefficient(Real),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub mass: Real,
    pub radius: Real,
    pub maximum_braking_torque: Real,
    pub friction: GroundFriction,
    pub on_ground: bool,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            mass: 20.0,
            radius: 0.3,
            maximum_braking_torque: 1500.0,
            friction: GroundFriction::Infinite,
            on_ground: true,
        }
    }
}

impl WheelConfig {
    /// Rotational inertia of the wheel, treated as a thin ring.
    pub fn inertia(&self) -> Real {
        self.mass * self.radius * self.radius
    }
}

#[derive(Debug, Clone)]
pub struct Wheel {
    config: WheelConfig,
    on_ground: bool,
    linear_velocity: Real,
    chassis: Option<ChassisId>,
}

impl Wheel {
    pub fn new(config: WheelConfig) -> Result<Self> {
        ensure_positive("wheel mass", config.mass)?;
        ensure_positive("wheel radius", config.radius)?;
        ensure_non_negative("wheel braking torque", config.maximum_braking_torque)?;
        if let GroundFriction::Coefficient(mu) = config.friction {
            ensure_non_negative("wheel friction coefficient", mu)?;
        }
        Ok(Self {
            on_ground: config.on_ground,
            config,
            linear_velocity: 0.0,
            chassis: None,
        })
    }

    pub fn config(&self) -> WheelConfig {
        WheelConfig {
            on_ground: self.on_ground,
            ..self.config.clone()
        }
    }

    pub fn mass(&self) -> Real {
        self.config.mass
    }

    pub fn radius(&self) -> Real {
        self.config.radius
    }

    pub fn friction(&self) -> GroundFriction {
        self.config.friction
    }

    pub fn set_friction(&mut self, friction: GroundFriction) {
        self.config.friction = friction;
    }

    pub fn is_on_ground(&self) -> bool {
        self.on_ground
    }

    pub fn set_on_ground(&mut self, on_ground: bool) {
        self.on_ground = on_ground;
    }

    /// Linear speed of the wheel hub (m/s).
    pub fn linear_velocity(&self) -> Real {
        self.linear_velocity
    }

    pub fn set_linear_velocity(&mut self, linear_velocity: Real) {
        self.linear_velocity = linear_velocity;
    }

    pub fn chassis(&self) -> Option<ChassisId> {
        self.chassis
    }

    pub(crate) fn set_chassis(&mut self, chassis: ChassisId) {
        self.chassis = Some(chassis);
    }

    fn reflected_chassis_inertia(&self, net: &Drivetrain) -> Real {
        match (self.on_ground, self.chassis) {
            (true, Some(chassis)) => {
                net.chassis[chassis.index()].mass() * self.config.radius * self.config.radius
            }
            _ => 0.0,
        }
    }

    pub(crate) fn downstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        net.base_downstream_inertia(id, from) + self.reflected_chassis_inertia(net)
    }

    pub(crate) fn upstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        net.base_upstream_inertia(id, from) + self.reflected_chassis_inertia(net)
    }
}

impl Drivetrain {
    pub fn add_wheel(&mut self, config: WheelConfig) -> Result<NodeId> {
        let inertia = config.inertia();
        let wheel = Wheel::new(config)?;
        self.add_node(inertia, Part::Wheel(wheel))
    }

    /// Forwards an angular velocity change of a grounded wheel to the linear domain.
    pub(crate) fn mirror_to_linear(&mut self, id: NodeId, change: Real) {
        let Some(wheel) = self.node(id).part.as_wheel() else {
            return;
        };
        if !wheel.on_ground || change == 0.0 {
            return;
        }
        let linear_change = change * wheel.config.radius;
        let own_velocity = wheel.linear_velocity;
        let linear_velocity = match wheel.chassis() {
            Some(chassis) => {
                let chassis = &mut self.chassis[chassis.index()];
                chassis.on_linear_velocity_change(linear_change);
                chassis.linear_velocity()
            }
            None => own_velocity + linear_change,
        };
        if let Some(wheel) = self.wheel_mut(id) {
            wheel.linear_velocity = linear_velocity;
        }
    }

    pub(crate) fn update_wheel(&mut self, id: NodeId, controller: &dyn ControllerInput) -> Result<()> {
        let Some(wheel) = self.wheel(id) else {
            return Ok(());
        };
        let brake_impulse = wheel.config.maximum_braking_torque
            * controller.brake_position()
            * self.config.fixed_time_step;
        self.resist_upstream_rotation(id, brake_impulse);
        self.apply_ground_friction(id);
        Ok(())
    }

    fn apply_ground_friction(&mut self, id: NodeId) {
        let Some(wheel) = self.wheel(id) else {
            return;
        };
        if !wheel.on_ground {
            return;
        }
        let radius = wheel.config.radius;
        let friction = wheel.config.friction;
        let chassis = wheel.chassis;
        let (linear_velocity, total_mass) = match chassis {
            Some(chassis) => (
                self.chassis[chassis.index()].linear_velocity(),
                self.chassis_total_mass(chassis),
            ),
            None => (wheel.linear_velocity, wheel.config.mass),
        };
        assert!(
            total_mass > MASS_EPSILON,
            "wheel {id} has no mass to push against ({total_mass})"
        );

        // Solved as if airborne so the chassis is not counted twice: it is
        // already part of `total_mass`.
        self.set_wheel_on_ground(id, false);
        let inertia = self.upstream_inertia(id, id);
        let slip = self.angular_velocity(id) * radius - linear_velocity;
        let mut impulse = slip / (radius * radius / inertia + 1.0 / total_mass);
        if let GroundFriction::Coefficient(mu) = friction {
            let limit = mu * self.config.gravitational_constant * total_mass * self.config.fixed_time_step;
            impulse = impulse.clamp(-limit, limit);
        }
        if impulse != 0.0 {
            trace!("wheel {id} slipping by {slip:.3} m/s, friction impulse {impulse:.3} N·s");
            self.apply_upstream_angular_impulse(id, -impulse * radius, id);
            match chassis {
                Some(chassis) => self.apply_linear_impulse(chassis, impulse),
                None => {
                    if let Some(wheel) = self.wheel_mut(id) {
                        wheel.linear_velocity += impulse / total_mass;
                    }
                }
            }
        }
        self.set_wheel_on_ground(id, true);
    }

    fn set_wheel_on_ground(&mut self, id: NodeId, on_ground: bool) {
        if let Some(wheel) = self.wheel_mut(id) {
            wheel.on_ground = on_ground;
        }
    }
}
