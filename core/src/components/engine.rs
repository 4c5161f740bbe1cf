use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::drivetrain::Drivetrain;
use crate::error::{ensure_non_negative, ensure_positive, Result};
use crate::torque_curve::TorqueCurve;
use crate::traits::{ControllerInput, NodeId};
use crate::units::{angular_velocity_to_rpm, rpm_to_angular_velocity, Real};

/// Throttle above which the constant-torque engine produces torque.
const CONSTANT_THROTTLE_ON: Real = 0.5;
/// Throttle below which the constant-torque engine resists rotation.
const CONSTANT_THROTTLE_OFF: Real = 0.1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum EngineTorque {
    /// Throttle scales the curve's torque at the current rpm.
    Curve(TorqueCurve),
    /// Fixed torque above half throttle, fixed resistance when off throttle.
    Constant { torque: Real, resistance_torque: Real },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub inertia: Real,
    pub torque: EngineTorque,
    /// Resistance per rad/s of engine speed (N·m·s/rad).
    pub friction_coefficient: Real,
    /// Idle floor; the engine is pushed back up when it drops below.
    pub minimum_engine_speed_rpm: Option<Real>,
    /// Redline; throttle torque is cut above it.
    pub maximum_engine_speed_rpm: Option<Real>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inertia: 0.25,
            torque: EngineTorque::Constant {
                torque: 150.0,
                resistance_torque: 30.0,
            },
            friction_coefficient: 0.0,
            minimum_engine_speed_rpm: None,
            maximum_engine_speed_rpm: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Engine {
    config: EngineConfig,
}

/// Torques the engine wants to apply this step.
#[derive(Debug, Clone, Copy, PartialEq)]
struct EngineOutput {
    drive_torque: Real,
    resistance_torque: Real,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        ensure_positive("engine inertia", config.inertia)?;
        ensure_non_negative("engine friction coefficient", config.friction_coefficient)?;
        if let EngineTorque::Constant {
            torque,
            resistance_torque,
        } = config.torque
        {
            ensure_non_negative("engine torque", torque)?;
            ensure_non_negative("engine resistance torque", resistance_torque)?;
        }
        if let Some(rpm) = config.minimum_engine_speed_rpm {
            ensure_non_negative("minimum engine speed", rpm)?;
        }
        if let Some(rpm) = config.maximum_engine_speed_rpm {
            ensure_positive("maximum engine speed", rpm)?;
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn torque_curve(&self) -> Option<&TorqueCurve> {
        match &self.config.torque {
            EngineTorque::Curve(curve) => Some(curve),
            EngineTorque::Constant { .. } => None,
        }
    }

    fn is_over_redline(&self, rpm: Real) -> bool {
        self.config
            .maximum_engine_speed_rpm
            .is_some_and(|redline| rpm >= redline)
    }

    fn output(&self, rpm: Real, throttle: Real) -> EngineOutput {
        let (drive_torque, resistance_torque) = match &self.config.torque {
            EngineTorque::Curve(curve) => (curve.torque_at(rpm) * throttle, 0.0),
            EngineTorque::Constant {
                torque,
                resistance_torque,
            } => {
                let drive = if throttle > CONSTANT_THROTTLE_ON { *torque } else { 0.0 };
                let resistance = if throttle < CONSTANT_THROTTLE_OFF {
                    *resistance_torque
                } else {
                    0.0
                };
                (drive, resistance)
            }
        };
        if drive_torque > 0.0 && self.is_over_redline(rpm) {
            trace!("engine at {rpm:.0} rpm is over redline, cutting throttle torque");
            return EngineOutput {
                drive_torque: 0.0,
                resistance_torque,
            };
        }
        EngineOutput {
            drive_torque,
            resistance_torque,
        }
    }
}

impl Drivetrain {
    pub fn add_engine(&mut self, config: EngineConfig) -> Result<NodeId> {
        let inertia = config.inertia;
        let engine = Engine::new(config)?;
        self.add_node(inertia, crate::components::Part::Engine(engine))
    }

    pub(crate) fn update_engine(&mut self, id: NodeId, controller: &dyn ControllerInput) -> Result<()> {
        let Some(engine) = self.engine(id) else {
            return Ok(());
        };
        let fixed_time = self.config.fixed_time_step;
        let angular_velocity = self.angular_velocity(id);
        let output = engine.output(
            angular_velocity_to_rpm(angular_velocity),
            controller.throttle_position(),
        );
        let friction_torque = engine.config.friction_coefficient * angular_velocity.abs();
        let idle_floor = engine.config.minimum_engine_speed_rpm.map(rpm_to_angular_velocity);

        self.apply_downstream_angular_impulse(id, output.drive_torque * fixed_time, id);
        self.resist_downstream_rotation(id, (output.resistance_torque + friction_torque) * fixed_time);

        if let Some(floor) = idle_floor {
            let angular_velocity = self.angular_velocity(id);
            if angular_velocity < floor {
                debug!(
                    "engine {id} below idle ({:.0} rpm), stabilizing",
                    angular_velocity_to_rpm(angular_velocity)
                );
                let inertia = self.downstream_inertia(id, id);
                self.apply_downstream_angular_impulse(id, (floor - angular_velocity) * inertia, id);
            }
        }
        Ok(())
    }
}
