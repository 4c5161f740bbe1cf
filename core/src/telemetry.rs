use hdrhistogram::Histogram;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::drivetrain::Drivetrain;
use crate::error::Result;
use crate::traits::{ChassisId, NodeId};
use crate::units::{angular_velocity_to_rpm, Real};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct TelemetryPoint {
    pub time: Real,
    pub rpm: Real,
    pub smoothed_rpm: Real,
    /// m/s; the chassis speed when one is watched, otherwise zero.
    pub linear_speed: Real,
}

/// Samples one node (usually the engine) at a fixed simulated interval.
pub struct TelemetryCollector {
    pub history: VecDeque<TelemetryPoint>,
    pub max_points: usize,
    pub sample_interval: Real,
    node: NodeId,
    chassis: Option<ChassisId>,
    last_sample_time: Real,
    smoothed_rpm: Real,
    rpm_histogram: Histogram<u64>,
}

impl TelemetryCollector {
    pub fn new(node: NodeId, max_points: usize, sample_interval: Real) -> Result<Self> {
        Ok(Self {
            history: VecDeque::with_capacity(max_points),
            max_points,
            sample_interval,
            node,
            chassis: None,
            last_sample_time: 0.0,
            smoothed_rpm: 0.0,
            rpm_histogram: Histogram::new(3)?,
        })
    }

    pub fn with_chassis(mut self, chassis: ChassisId) -> Self {
        self.chassis = Some(chassis);
        self
    }

    pub fn update(&mut self, drivetrain: &Drivetrain) {
        if drivetrain.time < self.last_sample_time + self.sample_interval {
            return;
        }

        let rpm = angular_velocity_to_rpm(drivetrain.angular_velocity(self.node));
        let linear_speed = self
            .chassis
            .and_then(|chassis| drivetrain.chassis(chassis))
            .map_or(0.0, |chassis| chassis.linear_velocity());

        let alpha = 0.1;
        self.smoothed_rpm = self.smoothed_rpm * (1.0 - alpha) + rpm * alpha;
        self.rpm_histogram.saturating_record(rpm.abs().round() as u64);

        self.history.push_back(TelemetryPoint {
            time: drivetrain.time,
            rpm,
            smoothed_rpm: self.smoothed_rpm,
            linear_speed,
        });

        if self.history.len() > self.max_points {
            self.history.pop_front();
        }

        self.last_sample_time = drivetrain.time;
    }

    /// Engine speed (rpm, magnitude) at percentile `p` of every sample so far.
    pub fn rpm_percentile(&self, p: f64) -> Option<Real> {
        if self.rpm_histogram.len() == 0 {
            return None;
        }
        Some(self.rpm_histogram.value_at_percentile(p) as Real)
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.last_sample_time = 0.0;
        self.smoothed_rpm = 0.0;
        self.rpm_histogram.reset();
    }
}
