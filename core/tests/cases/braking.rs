use crate::common::{assert_close, TestHarness};
use drivetrain_core::WheelConfig;

fn wheel_config(maximum_braking_torque: f64, on_ground: bool) -> WheelConfig {
    WheelConfig {
        mass: 8.0,
        radius: 0.25,
        maximum_braking_torque,
        on_ground,
        ..WheelConfig::default()
    }
}

#[test]
fn test_brake_stops_a_spinning_wheel_exactly() {
    let mut h = TestHarness::new();
    let wheel = h.add_wheel(wheel_config(100.0, false));
    h.net.set_angular_velocity(wheel, 50.0);
    h.controller.set_brake(1.0);

    for _ in 0..40 {
        h.step();
        assert!(h.omega(wheel) >= 0.0, "brake reversed the wheel: {}", h.omega(wheel));
    }

    assert_eq!(h.omega(wheel), 0.0);
}

#[test]
fn test_brake_never_reverses_a_backwards_wheel() {
    let mut h = TestHarness::new();
    let wheel = h.add_wheel(wheel_config(100.0, false));
    h.net.set_angular_velocity(wheel, -7.0);
    h.controller.set_brake(0.5);

    for _ in 0..20 {
        h.step();
        assert!(h.omega(wheel) <= 0.0, "brake reversed the wheel: {}", h.omega(wheel));
    }

    assert_eq!(h.omega(wheel), 0.0);
}

#[test]
fn test_partial_brake_scales_torque() {
    let mut h = TestHarness::new();
    let wheel = h.add_wheel(wheel_config(100.0, false));
    h.net.set_angular_velocity(wheel, 50.0);
    h.controller.set_brake(0.25);

    h.run_steps(10);

    // 25 N·m on 0.5 kg·m² for 0.1 s
    assert_close(h.omega(wheel), 45.0, 1e-9);
}

#[test]
fn test_braking_a_grounded_wheel_slows_the_car() {
    let mut h = TestHarness::new();
    let chassis = h.add_chassis(100.0);
    let wheel = h.add_wheel(wheel_config(200.0, true));
    h.net.attach_wheel(chassis, 0, wheel).unwrap();

    // Given: rolling at 10 m/s without slip
    h.net.set_angular_velocity(wheel, 40.0);
    h.net.chassis_mut(chassis).unwrap().set_linear_velocity(10.0);
    h.net.wheel_mut(wheel).unwrap().set_linear_velocity(10.0);
    h.controller.set_brake(1.0);

    let mut previous = h.chassis_speed(chassis);
    for _ in 0..300 {
        h.step();
        let speed = h.chassis_speed(chassis);
        assert!(speed <= previous + 1e-9, "car sped up while braking");
        assert!(h.omega(wheel) >= -1e-9);
        previous = speed;
    }

    assert!(h.omega(wheel).abs() < 1e-9);
    assert!(h.chassis_speed(chassis).abs() < 1e-9);
}
