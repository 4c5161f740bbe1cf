use std::f64::consts::PI;

pub type Real = f64;

pub fn rpm_to_angular_velocity(rpm: Real) -> Real {
    rpm * (2.0 * PI) / 60.0
}

pub fn angular_velocity_to_rpm(angular_velocity: Real) -> Real {
    angular_velocity * 60.0 / (2.0 * PI)
}
