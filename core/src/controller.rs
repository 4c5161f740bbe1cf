use serde::{Deserialize, Serialize};

use crate::traits::ControllerInput;
use crate::units::Real;

/// Plain snapshot of driver controls. Setters clamp to the valid ranges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerState {
    throttle: Real,
    brake: Real,
    clutch: Real,
    steering: Real,
    upshift: bool,
    downshift: bool,
}

impl ControllerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_throttle(&mut self, position: Real) {
        self.throttle = position.clamp(0.0, 1.0);
    }

    pub fn set_brake(&mut self, position: Real) {
        self.brake = position.clamp(0.0, 1.0);
    }

    pub fn set_clutch(&mut self, position: Real) {
        self.clutch = position.clamp(0.0, 1.0);
    }

    pub fn set_steering(&mut self, position: Real) {
        self.steering = position.clamp(-1.0, 1.0);
    }

    pub fn set_upshift(&mut self, held: bool) {
        self.upshift = held;
    }

    pub fn set_downshift(&mut self, held: bool) {
        self.downshift = held;
    }

    pub fn with_throttle(mut self, position: Real) -> Self {
        self.set_throttle(position);
        self
    }

    pub fn with_brake(mut self, position: Real) -> Self {
        self.set_brake(position);
        self
    }

    pub fn with_clutch(mut self, position: Real) -> Self {
        self.set_clutch(position);
        self
    }
}

impl ControllerInput for ControllerState {
    fn throttle_position(&self) -> Real {
        self.throttle
    }
    fn brake_position(&self) -> Real {
        self.brake
    }
    fn clutch_position(&self) -> Real {
        self.clutch
    }
    fn steering_position(&self) -> Real {
        self.steering
    }
    fn is_upshift(&self) -> bool {
        self.upshift
    }
    fn is_downshift(&self) -> bool {
        self.downshift
    }
}
