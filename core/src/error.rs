//! Errors raised while configuring or wiring a drivetrain.

use thiserror::Error;

use crate::traits::{ChassisId, NodeId};
use crate::units::Real;

pub type Result<T> = std::result::Result<T, DrivetrainError>;

#[derive(Debug, Error)]
pub enum DrivetrainError {
    /// Gear ratio magnitude below [`crate::MIN_GEAR_RATIO`].
    #[error("gear ratio {0} is too close to zero")]
    InvalidGearRatio(Real),

    #[error("a transmission has at most five forward gears, got {0}")]
    TooManyGears(usize),

    #[error("{what} must not be negative, got {value}")]
    NegativeValue { what: &'static str, value: Real },

    #[error("{what} must be positive, got {value}")]
    NonPositiveValue { what: &'static str, value: Real },

    #[error("torque curve already has a plot point within tolerance of {rpm} rpm")]
    DuplicatePlotPoint { rpm: Real },

    #[error("plot point at {rpm} rpm follows a point at {previous} rpm")]
    OutOfOrderPlotPoint { rpm: Real, previous: Real },

    #[error("cannot normalize a torque curve without plot points")]
    EmptyTorqueCurve,

    #[error("node {0} already has an input")]
    InputAlreadySet(NodeId),

    #[error("node {node} already outputs to node {output}")]
    DuplicateOutput { node: NodeId, output: NodeId },

    #[error("node {0} cannot be connected to itself")]
    SelfConnection(NodeId),

    /// A node that needs an upstream source was stepped without one.
    #[error("node {0} has no input connected")]
    MissingInput(NodeId),

    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    #[error("chassis {0} does not exist")]
    UnknownChassis(ChassisId),

    #[error("node {0} is not a wheel")]
    NotAWheel(NodeId),

    #[error("wheel slot {0} is out of range")]
    InvalidWheelSlot(usize),

    #[error("wheel slot {slot} on chassis {chassis} is already occupied")]
    WheelSlotOccupied { chassis: ChassisId, slot: usize },

    #[error("wheel {0} is already attached to a chassis")]
    WheelAlreadyAttached(NodeId),

    #[error("unknown part kind `{0}`")]
    UnknownPartKind(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("cannot create telemetry histogram: {0}")]
    Telemetry(#[from] hdrhistogram::CreationError),
}

pub(crate) fn ensure_non_negative(what: &'static str, value: Real) -> Result<()> {
    if value < 0.0 {
        return Err(DrivetrainError::NegativeValue { what, value });
    }
    Ok(())
}

pub(crate) fn ensure_positive(what: &'static str, value: Real) -> Result<()> {
    if value <= 0.0 {
        return Err(DrivetrainError::NonPositiveValue { what, value });
    }
    Ok(())
}
