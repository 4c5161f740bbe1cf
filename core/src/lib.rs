pub mod body;
pub mod chassis;
pub mod components;
pub mod config;
pub mod controller;
pub mod drivetrain;
pub mod error;
pub mod joints;
pub mod telemetry;
pub mod torque_curve;
pub mod traits;
pub mod units;

pub use body::RotatingBody;
pub use chassis::{RacecarBody, RacecarBodyConfig, WHEEL_SLOTS};
pub use components::clutch::{engagement_for_pedal, Clutch, ClutchConfig};
pub use components::differential::{DifferentialConfig, LockedDifferential};
pub use components::engine::{Engine, EngineConfig, EngineTorque};
pub use components::transmission::{Gear, Transmission, TransmissionConfig};
pub use components::wheel::{GroundFriction, Wheel, WheelConfig};
pub use components::{part_kinds, BodyConfig, Part, PartKind};
pub use config::PhysicsConfig;
pub use controller::ControllerState;
pub use drivetrain::{Drivetrain, Node};
pub use error::{DrivetrainError, Result};
pub use joints::{ClutchJoint, GearJoint};
pub use telemetry::{TelemetryCollector, TelemetryPoint};
pub use torque_curve::{PlotPoint, TorqueCurve, TorqueCurveBuilder};
pub use traits::{ChassisId, ControllerInput, NodeId};
pub use units::{angular_velocity_to_rpm, rpm_to_angular_velocity, Real};

/// Smallest gear ratio magnitude a joint accepts.
pub const MIN_GEAR_RATIO: Real = 0.01;
/// Ratio used for gear slots that were never configured.
pub const DEFAULT_GEAR_RATIO: Real = 100.0;

/// Below this speed difference (rad/s) the clutch uses static friction.
pub const CLUTCH_STATIC_THRESHOLD: Real = 0.1;
/// Speed difference (rpm) under which the clutch stops applying slip torque.
pub const CLUTCH_HYSTERESIS_RPM: Real = 250.0;

/// Two plot points closer than this (rpm) are considered duplicates.
pub const PLOT_POINT_TOLERANCE_RPM: Real = 0.1;

pub const INERTIA_EPSILON: Real = 1e-9;
pub const MASS_EPSILON: Real = 1e-6;
