use serde::{Deserialize, Serialize};

use crate::error::{ensure_positive, Result};
use crate::units::Real;

/// Process-wide physical constants, handed to the [`crate::Drivetrain`] that uses them.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Seconds advanced by every step.
    pub fixed_time_step: Real,
    /// m/s², used to bound ground friction.
    pub gravitational_constant: Real,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            fixed_time_step: 0.01,
            gravitational_constant: 9.81,
        }
    }
}

impl PhysicsConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("fixed time step", self.fixed_time_step)?;
        ensure_positive("gravitational constant", self.gravitational_constant)
    }
}
