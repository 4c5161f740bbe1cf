//! Engine torque as a function of engine speed.
//!
//! Plot points are collected with a [`TorqueCurveBuilder`] and then
//! normalized into an immutable [`TorqueCurve`], which answers lookups as a
//! fraction of the curve's peak torque.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_non_negative, DrivetrainError, Result};
use crate::units::Real;
use crate::PLOT_POINT_TOLERANCE_RPM;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct PlotPoint {
    pub rpm: Real,
    /// Newton-metres.
    pub torque: Real,
}

#[derive(Clone, Debug, Default)]
pub struct TorqueCurveBuilder {
    points: Vec<PlotPoint>,
}

impl TorqueCurveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points must arrive in strictly ascending rpm order.
    pub fn add_plot_point(&mut self, rpm: Real, torque: Real) -> Result<&mut Self> {
        ensure_non_negative("plot point rpm", rpm)?;
        ensure_non_negative("plot point torque", torque)?;
        if let Some(last) = self.points.last() {
            if (last.rpm - rpm).abs() < PLOT_POINT_TOLERANCE_RPM {
                return Err(DrivetrainError::DuplicatePlotPoint { rpm });
            }
            if rpm < last.rpm {
                return Err(DrivetrainError::OutOfOrderPlotPoint {
                    rpm,
                    previous: last.rpm,
                });
            }
        }
        self.points.push(PlotPoint { rpm, torque });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Finalizes the curve. Fails when no point was added.
    pub fn normalize(self) -> Result<TorqueCurve> {
        if self.points.is_empty() {
            return Err(DrivetrainError::EmptyTorqueCurve);
        }
        let maximum_torque = self.points.iter().map(|p| p.torque).fold(0.0, Real::max);
        let normalized = self
            .points
            .iter()
            .map(|p| {
                if maximum_torque > 0.0 {
                    p.torque / maximum_torque
                } else {
                    0.0
                }
            })
            .collect();
        Ok(TorqueCurve {
            points: self.points,
            normalized,
            maximum_torque,
        })
    }
}

/// A normalized, read-only torque curve.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(try_from = "Vec<PlotPoint>", into = "Vec<PlotPoint>")]
pub struct TorqueCurve {
    points: Vec<PlotPoint>,
    normalized: Vec<Real>,
    maximum_torque: Real,
}

impl TorqueCurve {
    pub fn from_plot_points<I>(points: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Real, Real)>,
    {
        let mut builder = TorqueCurveBuilder::new();
        for (rpm, torque) in points {
            builder.add_plot_point(rpm, torque)?;
        }
        builder.normalize()
    }

    pub fn maximum_torque(&self) -> Real {
        self.maximum_torque
    }

    pub fn plot_points(&self) -> &[PlotPoint] {
        &self.points
    }

    /// Fraction of [`Self::maximum_torque`] available at `rpm`, in `[0, 1]`.
    ///
    /// Linear between bracketing points; outside the table the nearest end
    /// point is returned.
    pub fn normalized_torque(&self, rpm: Real) -> Real {
        let last = self.points.len() - 1;
        if rpm <= self.points[0].rpm {
            return self.normalized[0];
        }
        if rpm >= self.points[last].rpm {
            return self.normalized[last];
        }
        let upper = self.points.partition_point(|p| p.rpm <= rpm);
        let lower = upper - 1;
        let (lo, hi) = (self.points[lower].rpm, self.points[upper].rpm);
        let t = (rpm - lo) / (hi - lo);
        self.normalized[lower] + (self.normalized[upper] - self.normalized[lower]) * t
    }

    /// Newton-metres available at `rpm`.
    pub fn torque_at(&self, rpm: Real) -> Real {
        self.normalized_torque(rpm) * self.maximum_torque
    }
}

impl TryFrom<Vec<PlotPoint>> for TorqueCurve {
    type Error = DrivetrainError;

    fn try_from(points: Vec<PlotPoint>) -> Result<Self> {
        Self::from_plot_points(points.into_iter().map(|p| (p.rpm, p.torque)))
    }
}

impl From<TorqueCurve> for Vec<PlotPoint> {
    fn from(curve: TorqueCurve) -> Self {
        curve.points
    }
}
