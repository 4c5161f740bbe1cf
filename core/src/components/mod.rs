use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::body::RotatingBody;
use crate::drivetrain::Drivetrain;
use crate::error::{DrivetrainError, Result};
use crate::traits::NodeId;
use crate::units::Real;

pub mod clutch;
pub mod differential;
pub mod engine;
pub mod transmission;
pub mod wheel;

use clutch::{Clutch, ClutchConfig};
use differential::{DifferentialConfig, LockedDifferential};
use engine::{Engine, EngineConfig};
use transmission::{Transmission, TransmissionConfig};
use wheel::{Wheel, WheelConfig};

/// Behaviour layered on top of a node's [`RotatingBody`].
#[derive(Debug, Clone)]
pub enum Part {
    Body,
    Engine(Engine),
    Clutch(Clutch),
    Transmission(Transmission),
    LockedDifferential(LockedDifferential),
    Wheel(Wheel),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Body,
    Engine,
    Clutch,
    Transmission,
    LockedDifferential,
    Wheel,
}

impl PartKind {
    pub fn name(self) -> &'static str {
        match self {
            PartKind::Body => "Body",
            PartKind::Engine => "Engine",
            PartKind::Clutch => "Clutch",
            PartKind::Transmission => "Transmission",
            PartKind::LockedDifferential => "LockedDifferential",
            PartKind::Wheel => "Wheel",
        }
    }
}

/// Config of a bare [`Part::Body`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyConfig {
    pub inertia: Real,
}

impl Default for BodyConfig {
    fn default() -> Self {
        Self { inertia: 1.0 }
    }
}

impl Part {
    pub fn kind(&self) -> PartKind {
        match self {
            Part::Body => PartKind::Body,
            Part::Engine(_) => PartKind::Engine,
            Part::Clutch(_) => PartKind::Clutch,
            Part::Transmission(_) => PartKind::Transmission,
            Part::LockedDifferential(_) => PartKind::LockedDifferential,
            Part::Wheel(_) => PartKind::Wheel,
        }
    }

    pub fn as_engine(&self) -> Option<&Engine> {
        match self {
            Part::Engine(engine) => Some(engine),
            _ => None,
        }
    }

    pub fn as_clutch(&self) -> Option<&Clutch> {
        match self {
            Part::Clutch(clutch) => Some(clutch),
            _ => None,
        }
    }

    pub fn as_clutch_mut(&mut self) -> Option<&mut Clutch> {
        match self {
            Part::Clutch(clutch) => Some(clutch),
            _ => None,
        }
    }

    pub fn as_transmission(&self) -> Option<&Transmission> {
        match self {
            Part::Transmission(transmission) => Some(transmission),
            _ => None,
        }
    }

    pub fn as_transmission_mut(&mut self) -> Option<&mut Transmission> {
        match self {
            Part::Transmission(transmission) => Some(transmission),
            _ => None,
        }
    }

    pub fn as_differential(&self) -> Option<&LockedDifferential> {
        match self {
            Part::LockedDifferential(differential) => Some(differential),
            _ => None,
        }
    }

    pub fn as_wheel(&self) -> Option<&Wheel> {
        match self {
            Part::Wheel(wheel) => Some(wheel),
            _ => None,
        }
    }

    pub fn as_wheel_mut(&mut self) -> Option<&mut Wheel> {
        match self {
            Part::Wheel(wheel) => Some(wheel),
            _ => None,
        }
    }

    fn encode_config(&self, body: &RotatingBody) -> serde_json::Result<Value> {
        match self {
            Part::Body => serde_json::to_value(BodyConfig {
                inertia: body.inertia(),
            }),
            Part::Engine(engine) => serde_json::to_value(engine.config()),
            Part::Clutch(clutch) => serde_json::to_value(clutch.config()),
            Part::Transmission(transmission) => serde_json::to_value(transmission.config()),
            Part::LockedDifferential(differential) => serde_json::to_value(differential.config()),
            Part::Wheel(wheel) => serde_json::to_value(wheel.config()),
        }
    }
}

impl Drivetrain {
    pub fn add_body_from(&mut self, config: BodyConfig) -> Result<NodeId> {
        self.add_body(config.inertia)
    }

    pub fn engine(&self, id: NodeId) -> Option<&Engine> {
        self.get(id)?.part.as_engine()
    }

    pub fn clutch(&self, id: NodeId) -> Option<&Clutch> {
        self.get(id)?.part.as_clutch()
    }

    pub fn clutch_mut(&mut self, id: NodeId) -> Option<&mut Clutch> {
        self.nodes.get_mut(id.index())?.part.as_clutch_mut()
    }

    pub fn transmission(&self, id: NodeId) -> Option<&Transmission> {
        self.get(id)?.part.as_transmission()
    }

    pub fn transmission_mut(&mut self, id: NodeId) -> Option<&mut Transmission> {
        self.nodes.get_mut(id.index())?.part.as_transmission_mut()
    }

    pub fn differential(&self, id: NodeId) -> Option<&LockedDifferential> {
        self.get(id)?.part.as_differential()
    }

    pub fn wheel(&self, id: NodeId) -> Option<&Wheel> {
        self.get(id)?.part.as_wheel()
    }

    pub fn wheel_mut(&mut self, id: NodeId) -> Option<&mut Wheel> {
        self.nodes.get_mut(id.index())?.part.as_wheel_mut()
    }

    /// Serializes a node's configuration in the shape [`Drivetrain::add_from_json`] accepts.
    pub fn encode_config(&self, id: NodeId) -> Result<Value> {
        let node = self.get(id).ok_or(DrivetrainError::UnknownNode(id))?;
        Ok(node.part.encode_config(&node.body)?)
    }
}

macro_rules! register_parts {
    ($($kind:literal => $config:ty, $add:ident);* $(;)?) => {
        impl Drivetrain {
            /// Creates a node of the named kind. A `null` config uses the defaults.
            pub fn add_from_json(&mut self, kind: &str, data: Value) -> Result<NodeId> {
                match kind {
                    $(
                        $kind => {
                            let config: $config = if data.is_null() {
                                Default::default()
                            } else {
                                serde_json::from_value(data)?
                            };
                            self.$add(config)
                        }
                    )*
                    _ => Err(DrivetrainError::UnknownPartKind(kind.to_string())),
                }
            }
        }

        pub fn part_kinds() -> Vec<&'static str> {
            vec![$($kind),*]
        }
    };
}

register_parts!(
    "Body" => BodyConfig, add_body_from;
    "Engine" => EngineConfig, add_engine;
    "Clutch" => ClutchConfig, add_clutch;
    "Transmission" => TransmissionConfig, add_transmission;
    "LockedDifferential" => DifferentialConfig, add_differential;
    "Wheel" => WheelConfig, add_wheel;
);
