mod braking;
mod gearing;
mod joints;
mod parts;
mod torque_curve;
