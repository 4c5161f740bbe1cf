use crate::error::{DrivetrainError, Result};
use crate::traits::NodeId;
use crate::units::Real;

/// A spinning mass with one upstream link and any number of downstream links.
///
/// The body only stores state and links; the propagation algorithms live on
/// [`crate::Drivetrain`] because they walk neighbouring nodes in the arena.
#[derive(Debug, Clone)]
pub struct RotatingBody {
    inertia: Real,
    angular_velocity: Real,
    angular_acceleration: Real,
    input: Option<NodeId>,
    outputs: Vec<NodeId>,
}

impl RotatingBody {
    pub fn new(inertia: Real) -> Self {
        Self {
            inertia,
            angular_velocity: 0.0,
            angular_acceleration: 0.0,
            input: None,
            outputs: Vec::new(),
        }
    }

    pub fn inertia(&self) -> Real {
        self.inertia
    }

    pub fn angular_velocity(&self) -> Real {
        self.angular_velocity
    }

    pub fn set_angular_velocity(&mut self, angular_velocity: Real) {
        self.angular_velocity = angular_velocity;
    }

    pub fn angular_acceleration(&self) -> Real {
        self.angular_acceleration
    }

    pub(crate) fn add_angular_acceleration(&mut self, delta: Real) {
        self.angular_acceleration += delta;
    }

    pub(crate) fn add_angular_velocity(&mut self, delta: Real) {
        self.angular_velocity += delta;
    }

    pub fn input(&self) -> Option<NodeId> {
        self.input
    }

    pub fn outputs(&self) -> &[NodeId] {
        &self.outputs
    }

    /// The input can be set exactly once.
    pub(crate) fn set_input(&mut self, own: NodeId, input: NodeId) -> Result<()> {
        if input == own {
            return Err(DrivetrainError::SelfConnection(own));
        }
        if self.input.is_some() {
            return Err(DrivetrainError::InputAlreadySet(own));
        }
        self.input = Some(input);
        Ok(())
    }

    pub(crate) fn add_output(&mut self, own: NodeId, output: NodeId) -> Result<()> {
        if output == own {
            return Err(DrivetrainError::SelfConnection(own));
        }
        if self.outputs.contains(&output) {
            return Err(DrivetrainError::DuplicateOutput { node: own, output });
        }
        self.outputs.push(output);
        Ok(())
    }

    /// Integrates the accumulated acceleration and clears the accumulator.
    /// Returns the change in angular velocity.
    pub fn simulate(&mut self, fixed_time: Real) -> Real {
        let delta = self.angular_acceleration * fixed_time;
        self.angular_velocity += delta;
        self.angular_acceleration = 0.0;
        delta
    }
}
