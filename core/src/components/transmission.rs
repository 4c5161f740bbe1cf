use log::debug;
use serde::{Deserialize, Serialize};

use crate::components::Part;
use crate::drivetrain::Drivetrain;
use crate::error::{ensure_positive, DrivetrainError, Result};
use crate::joints::GearJoint;
use crate::traits::{ControllerInput, NodeId};
use crate::units::Real;
use crate::DEFAULT_GEAR_RATIO;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Gear {
    Reverse,
    Neutral,
    First,
    Second,
    Third,
    Fourth,
    Fifth,
}

impl Gear {
    pub const ALL: [Gear; 7] = [
        Gear::Reverse,
        Gear::Neutral,
        Gear::First,
        Gear::Second,
        Gear::Third,
        Gear::Fourth,
        Gear::Fifth,
    ];

    pub const FORWARD_GEARS: usize = 5;

    fn index(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Gear> {
        Gear::ALL.get(self.index() + 1).copied()
    }

    pub fn previous(self) -> Option<Gear> {
        self.index().checked_sub(1).map(|index| Gear::ALL[index])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransmissionConfig {
    pub inertia: Real,
    pub reverse_ratio: Option<Real>,
    /// First gear upwards; missing gears get [`DEFAULT_GEAR_RATIO`].
    pub forward_ratios: Vec<Real>,
}

impl Default for TransmissionConfig {
    fn default() -> Self {
        Self {
            inertia: 0.05,
            reverse_ratio: Some(-3.2),
            forward_ratios: vec![3.4, 2.1, 1.5, 1.15, 0.92],
        }
    }
}

/// Gearbox with a shift state machine. Starts in neutral.
#[derive(Debug, Clone)]
pub struct Transmission {
    config: TransmissionConfig,
    ratios: [GearJoint; 7],
    gear: Gear,
    shift_locked: bool,
}

impl Transmission {
    pub fn new(config: TransmissionConfig) -> Result<Self> {
        ensure_positive("transmission inertia", config.inertia)?;
        if config.forward_ratios.len() > Gear::FORWARD_GEARS {
            return Err(DrivetrainError::TooManyGears(config.forward_ratios.len()));
        }
        let fallback = GearJoint::new(DEFAULT_GEAR_RATIO)?;
        let mut ratios = [fallback; 7];
        if let Some(reverse) = config.reverse_ratio {
            ratios[Gear::Reverse.index()] = GearJoint::new(reverse)?;
        }
        for (offset, &ratio) in config.forward_ratios.iter().enumerate() {
            ratios[Gear::First.index() + offset] = GearJoint::new(ratio)?;
        }
        Ok(Self {
            config,
            ratios,
            gear: Gear::Neutral,
            shift_locked: false,
        })
    }

    pub fn config(&self) -> &TransmissionConfig {
        &self.config
    }

    pub fn gear(&self) -> Gear {
        self.gear
    }

    pub fn set_gear(&mut self, gear: Gear) {
        self.gear = gear;
    }

    pub fn is_neutral(&self) -> bool {
        self.gear == Gear::Neutral
    }

    pub fn ratio(&self, gear: Gear) -> Option<GearJoint> {
        (gear != Gear::Neutral).then(|| self.ratios[gear.index()])
    }

    /// Joint of the engaged gear, `None` in neutral.
    pub fn selected_ratio(&self) -> Option<GearJoint> {
        self.ratio(self.gear)
    }

    /// One gear per press; further requests wait until both shift
    /// requests are released. Returns the new gear when it changed.
    pub fn handle_shift_request(&mut self, controller: &dyn ControllerInput) -> Option<Gear> {
        if self.shift_locked {
            if controller.is_shift_cleared() {
                self.shift_locked = false;
            }
            return None;
        }
        let target = if controller.is_upshift() {
            self.gear.next()
        } else if controller.is_downshift() {
            self.gear.previous()
        } else {
            return None;
        };
        self.shift_locked = true;
        let target = target?;
        self.gear = target;
        Some(target)
    }

    pub(crate) fn downstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        if from == id {
            return net.base_downstream_inertia(id, from);
        }
        match self.selected_ratio() {
            Some(gear) => gear.to_downstream(net.base_downstream_inertia(id, from)),
            None => 0.0,
        }
    }

    /// Zero in neutral: the gearbox is not part of any upstream chain then.
    pub(crate) fn upstream_inertia(&self, net: &Drivetrain, id: NodeId, from: NodeId) -> Real {
        let Some(gear) = self.selected_ratio() else {
            return 0.0;
        };
        let upstream = net
            .input(id)
            .map_or(0.0, |input| gear.to_upstream(net.upstream_inertia(input, from)));
        net.inertia(id) + upstream
    }
}

impl Drivetrain {
    pub fn add_transmission(&mut self, config: TransmissionConfig) -> Result<NodeId> {
        let inertia = config.inertia;
        let transmission = Transmission::new(config)?;
        self.add_node(inertia, Part::Transmission(transmission))
    }

    pub(crate) fn read_shift_request(&mut self, id: NodeId, controller: &dyn ControllerInput) {
        let Some(transmission) = self.transmission_mut(id) else {
            return;
        };
        if let Some(gear) = transmission.handle_shift_request(controller) {
            debug!("transmission {id} shifted into {gear:?}");
        }
    }

    pub(crate) fn update_transmission(&mut self, id: NodeId) -> Result<()> {
        let Some(gear) = self.transmission(id).and_then(Transmission::selected_ratio) else {
            return Ok(());
        };
        // Output speed follows the input shaft directly instead of integrating.
        let input = self.expected_input(id)?;
        let input_velocity = self.angular_velocity(input);
        self.set_angular_velocity(id, gear.output_velocity(input_velocity));
        Ok(())
    }
}
