use crate::body::RotatingBody;
use crate::chassis::RacecarBody;
use crate::components::{Part, PartKind};
use crate::config::PhysicsConfig;
use crate::error::{ensure_positive, DrivetrainError, Result};
use crate::traits::{ControllerInput, NodeId};
use crate::units::Real;
use crate::INERTIA_EPSILON;

/// One entry of the drivetrain arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) body: RotatingBody,
    pub(crate) part: Part,
}

impl Node {
    pub fn body(&self) -> &RotatingBody {
        &self.body
    }

    pub fn part(&self) -> &Part {
        &self.part
    }
}

/// What a propagated delta is added to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Channel {
    Acceleration,
    Velocity,
}

/// Owns every node and chassis of one vehicle and runs the propagation
/// algorithms over them.
///
/// Links form a single-parent tree. The drivetrain never decides the step
/// order: callers pass it to [`Drivetrain::step`] or drive
/// [`Drivetrain::update`] / [`Drivetrain::simulate`] themselves.
///
/// A `NodeId` is only valid for the drivetrain that issued it. Wiring and
/// stepping (`connect`, `set_input`, `add_output`, `read_controls`,
/// `update`, `step`) check handles and return
/// [`DrivetrainError::UnknownNode`]. State and inertia accessors, the
/// torque and impulse functions and `simulate` index the arena directly and
/// panic on a foreign handle, like slice indexing; [`Drivetrain::get`] is
/// the checked lookup.
#[derive(Debug, Clone, Default)]
pub struct Drivetrain {
    pub config: PhysicsConfig,
    /// Simulated seconds advanced by [`Drivetrain::step`].
    pub time: Real,
    pub(crate) nodes: Vec<Node>,
    pub(crate) chassis: Vec<RacecarBody>,
}

impl Drivetrain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PhysicsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub(crate) fn add_node(&mut self, inertia: Real, part: Part) -> Result<NodeId> {
        ensure_positive("inertia", inertia)?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            body: RotatingBody::new(inertia),
            part,
        });
        Ok(id)
    }

    /// A plain spinning mass with no behaviour of its own.
    pub fn add_body(&mut self, inertia: Real) -> Result<NodeId> {
        self.add_node(inertia, Part::Body)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn ensure_node(&self, id: NodeId) -> Result<()> {
        if id.index() >= self.nodes.len() {
            return Err(DrivetrainError::UnknownNode(id));
        }
        Ok(())
    }

    // --- wiring ---

    pub fn set_input(&mut self, id: NodeId, input: NodeId) -> Result<()> {
        self.ensure_node(id)?;
        self.ensure_node(input)?;
        self.node_mut(id).body.set_input(id, input)
    }

    pub fn add_output(&mut self, id: NodeId, output: NodeId) -> Result<()> {
        self.ensure_node(id)?;
        self.ensure_node(output)?;
        self.node_mut(id).body.add_output(id, output)
    }

    /// Links both directions: `upstream` drives `downstream`.
    pub fn connect(&mut self, upstream: NodeId, downstream: NodeId) -> Result<()> {
        self.ensure_node(upstream)?;
        self.ensure_node(downstream)?;
        if upstream == downstream {
            return Err(DrivetrainError::SelfConnection(upstream));
        }
        if self.node(downstream).body.input().is_some() {
            return Err(DrivetrainError::InputAlreadySet(downstream));
        }
        self.add_output(upstream, downstream)?;
        self.set_input(downstream, upstream)
    }

    pub fn input(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).body.input()
    }

    /// The input a node cannot work without.
    pub fn expected_input(&self, id: NodeId) -> Result<NodeId> {
        self.input(id).ok_or(DrivetrainError::MissingInput(id))
    }

    pub fn outputs(&self, id: NodeId) -> &[NodeId] {
        self.node(id).body.outputs()
    }

    // --- state ---

    pub fn inertia(&self, id: NodeId) -> Real {
        self.node(id).body.inertia()
    }

    pub fn angular_velocity(&self, id: NodeId) -> Real {
        self.node(id).body.angular_velocity()
    }

    pub fn set_angular_velocity(&mut self, id: NodeId, angular_velocity: Real) {
        self.node_mut(id).body.set_angular_velocity(angular_velocity);
    }

    pub fn angular_acceleration(&self, id: NodeId) -> Real {
        self.node(id).body.angular_acceleration()
    }

    // --- inertia ---

    /// Inertia of the subtree below `id` as seen by `from`.
    pub fn downstream_inertia(&self, id: NodeId, from: NodeId) -> Real {
        match &self.node(id).part {
            Part::Clutch(clutch) => clutch.downstream_inertia(self, id, from),
            Part::Transmission(transmission) => transmission.downstream_inertia(self, id, from),
            Part::LockedDifferential(differential) => differential.downstream_inertia(self, id, from),
            Part::Wheel(wheel) => wheel.downstream_inertia(self, id, from),
            Part::Body | Part::Engine(_) => self.base_downstream_inertia(id, from),
        }
    }

    /// Inertia of the ancestor chain of `id`, siblings excluded.
    pub fn upstream_inertia(&self, id: NodeId, from: NodeId) -> Real {
        match &self.node(id).part {
            Part::Clutch(clutch) => clutch.upstream_inertia(self, id, from),
            Part::Transmission(transmission) => transmission.upstream_inertia(self, id, from),
            Part::LockedDifferential(differential) => differential.upstream_inertia(self, id, from),
            Part::Wheel(wheel) => wheel.upstream_inertia(self, id, from),
            Part::Body | Part::Engine(_) => self.base_upstream_inertia(id, from),
        }
    }

    pub(crate) fn base_downstream_inertia(&self, id: NodeId, from: NodeId) -> Real {
        let body = &self.node(id).body;
        body.inertia()
            + body
                .outputs()
                .iter()
                .map(|&output| self.downstream_inertia(output, from))
                .sum::<Real>()
    }

    pub(crate) fn base_upstream_inertia(&self, id: NodeId, from: NodeId) -> Real {
        let body = &self.node(id).body;
        body.inertia()
            + body
                .input()
                .map_or(0.0, |input| self.upstream_inertia(input, from))
    }

    // --- torque and impulse ---

    pub fn apply_downstream_torque(&mut self, id: NodeId, torque: Real, from: NodeId) {
        if torque == 0.0 {
            return;
        }
        let inertia = self.downstream_inertia(id, from);
        assert_inertia(id, inertia);
        self.propagate_downstream(id, torque / inertia, from, Channel::Acceleration);
    }

    pub fn apply_upstream_torque(&mut self, id: NodeId, torque: Real, from: NodeId) {
        if torque == 0.0 {
            return;
        }
        let inertia = self.upstream_inertia(id, from);
        assert_inertia(id, inertia);
        self.propagate_upstream(id, torque / inertia, from, Channel::Acceleration);
    }

    pub fn apply_downstream_angular_impulse(&mut self, id: NodeId, impulse: Real, from: NodeId) {
        if impulse == 0.0 {
            return;
        }
        let inertia = self.downstream_inertia(id, from);
        assert_inertia(id, inertia);
        self.propagate_downstream(id, impulse / inertia, from, Channel::Velocity);
    }

    pub fn apply_upstream_angular_impulse(&mut self, id: NodeId, impulse: Real, from: NodeId) {
        if impulse == 0.0 {
            return;
        }
        let inertia = self.upstream_inertia(id, from);
        assert_inertia(id, inertia);
        self.propagate_upstream(id, impulse / inertia, from, Channel::Velocity);
    }

    pub fn on_downstream_acceleration(&mut self, id: NodeId, change: Real, from: NodeId) {
        self.propagate_downstream(id, change, from, Channel::Acceleration);
    }

    pub fn on_upstream_acceleration(&mut self, id: NodeId, change: Real, from: NodeId) {
        self.propagate_upstream(id, change, from, Channel::Acceleration);
    }

    pub fn on_downstream_velocity_change(&mut self, id: NodeId, change: Real, from: NodeId) {
        self.propagate_downstream(id, change, from, Channel::Velocity);
    }

    pub fn on_upstream_velocity_change(&mut self, id: NodeId, change: Real, from: NodeId) {
        self.propagate_upstream(id, change, from, Channel::Velocity);
    }

    /// Slows the subtree below `id` by at most `impulse`, never past a standstill.
    pub fn resist_downstream_rotation(&mut self, id: NodeId, impulse: Real) {
        if let Some(change) = self.resisting_change(id, impulse, self.downstream_inertia(id, id)) {
            self.propagate_downstream(id, change, id, Channel::Velocity);
        }
    }

    /// Slows `id` and its ancestors by at most `impulse`, never past a standstill.
    pub fn resist_upstream_rotation(&mut self, id: NodeId, impulse: Real) {
        if let Some(change) = self.resisting_change(id, impulse, self.upstream_inertia(id, id)) {
            self.propagate_upstream(id, change, id, Channel::Velocity);
        }
    }

    fn resisting_change(&self, id: NodeId, impulse: Real, inertia: Real) -> Option<Real> {
        let angular_velocity = self.angular_velocity(id);
        if impulse <= 0.0 || angular_velocity == 0.0 {
            return None;
        }
        assert_inertia(id, inertia);
        let stopping_impulse = inertia * angular_velocity.abs();
        if impulse >= stopping_impulse {
            Some(-angular_velocity)
        } else {
            Some(-(impulse / inertia).copysign(angular_velocity))
        }
    }

    fn propagate_downstream(&mut self, id: NodeId, change: Real, from: NodeId, channel: Channel) {
        let Some(scale) = self.downstream_coupling(id, from) else {
            return;
        };
        let change = change * scale;
        self.receive(id, change, channel);
        for index in 0..self.node(id).body.outputs().len() {
            let output = self.node(id).body.outputs()[index];
            self.propagate_downstream(output, change, from, channel);
        }
    }

    fn propagate_upstream(&mut self, id: NodeId, change: Real, from: NodeId, channel: Channel) {
        if self.is_open_gearbox(id) {
            return;
        }
        self.receive(id, change, channel);
        let Some(input) = self.node(id).body.input() else {
            return;
        };
        if let Some(scale) = self.upstream_coupling(id) {
            self.propagate_upstream(input, change * scale, from, channel);
        }
    }

    fn is_open_gearbox(&self, id: NodeId) -> bool {
        matches!(&self.node(id).part, Part::Transmission(transmission) if transmission.is_neutral())
    }

    /// Factor for a change entering `id` from its input; `None` when the link is open.
    fn downstream_coupling(&self, id: NodeId, from: NodeId) -> Option<Real> {
        if id == from {
            return Some(1.0);
        }
        match &self.node(id).part {
            Part::Clutch(clutch) => clutch.downstream_coupling(),
            Part::Transmission(transmission) => transmission.selected_ratio().map(|gear| gear.to_downstream(1.0)),
            Part::LockedDifferential(differential) => Some(differential.gear().to_downstream(1.0)),
            Part::Body | Part::Engine(_) | Part::Wheel(_) => Some(1.0),
        }
    }

    /// Factor for a change leaving `id` towards its input; `None` when the link is open.
    fn upstream_coupling(&self, id: NodeId) -> Option<Real> {
        match &self.node(id).part {
            Part::Clutch(clutch) => clutch.upstream_coupling(),
            Part::Transmission(transmission) => transmission.selected_ratio().map(|gear| gear.to_upstream(1.0)),
            Part::LockedDifferential(differential) => Some(differential.gear().to_upstream(1.0)),
            Part::Body | Part::Engine(_) | Part::Wheel(_) => Some(1.0),
        }
    }

    fn receive(&mut self, id: NodeId, change: Real, channel: Channel) {
        match channel {
            Channel::Acceleration => self.node_mut(id).body.add_angular_acceleration(change),
            Channel::Velocity => {
                self.node_mut(id).body.add_angular_velocity(change);
                self.mirror_to_linear(id, change);
            }
        }
    }

    // --- stepping ---

    /// Latches the controls a node holds state for: clutch engagement and
    /// shift requests. Runs for every node before any force is applied.
    pub fn read_controls(&mut self, id: NodeId, controller: &dyn ControllerInput) -> Result<()> {
        self.ensure_node(id)?;
        match self.node(id).part.kind() {
            PartKind::Clutch => self.read_clutch_pedal(id, controller),
            PartKind::Transmission => self.read_shift_request(id, controller),
            _ => {}
        }
        Ok(())
    }

    /// Node-specific force application for this step.
    pub fn update(&mut self, id: NodeId, controller: &dyn ControllerInput) -> Result<()> {
        self.ensure_node(id)?;
        match self.node(id).part.kind() {
            PartKind::Engine => self.update_engine(id, controller),
            PartKind::Clutch => self.update_clutch(id),
            PartKind::Transmission => self.update_transmission(id),
            PartKind::Wheel => self.update_wheel(id, controller),
            PartKind::Body | PartKind::LockedDifferential => Ok(()),
        }
    }

    /// Integrates the accumulated acceleration of one node. Call exactly once
    /// per node per step, after every torque for the step was applied.
    pub fn simulate(&mut self, id: NodeId) {
        let fixed_time = self.config.fixed_time_step;
        let change = self.node_mut(id).body.simulate(fixed_time);
        self.mirror_to_linear(id, change);
    }

    /// Runs [`Self::read_controls`], [`Self::update`] and [`Self::simulate`]
    /// over `order`, each as a full pass, then advances [`Self::time`].
    pub fn step(&mut self, order: &[NodeId], controller: &dyn ControllerInput) -> Result<()> {
        for &id in order {
            self.read_controls(id, controller)?;
        }
        for &id in order {
            self.update(id, controller)?;
        }
        for &id in order {
            self.simulate(id);
        }
        self.time += self.config.fixed_time_step;
        Ok(())
    }
}

fn assert_inertia(id: NodeId, inertia: Real) {
    assert!(
        inertia > INERTIA_EPSILON,
        "node {id} has no effective inertia ({inertia}) to take torque"
    );
}
