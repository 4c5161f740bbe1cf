use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::Real;

/// Handle to a rotating node owned by a [`crate::Drivetrain`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a [`crate::RacecarBody`] owned by a [`crate::Drivetrain`].
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChassisId(pub(crate) u32);

impl ChassisId {
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChassisId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chassis#{}", self.0)
    }
}

/// Read-only view of the driver's controls for the current step.
///
/// Pedal positions are in `[0, 1]`, steering in `[-1, 1]`. Implementations are
/// refreshed by the caller once per step before the drivetrain reads them.
pub trait ControllerInput {
    fn throttle_position(&self) -> Real;
    fn brake_position(&self) -> Real;
    fn clutch_position(&self) -> Real;
    fn steering_position(&self) -> Real;
    fn is_upshift(&self) -> bool;
    fn is_downshift(&self) -> bool;

    /// Neither shift request is held.
    fn is_shift_cleared(&self) -> bool {
        !self.is_upshift() && !self.is_downshift()
    }
}
