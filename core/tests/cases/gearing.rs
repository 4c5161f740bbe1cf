use crate::common::{assert_close, TestHarness};
use drivetrain_core::{
    ClutchConfig, DifferentialConfig, EngineConfig, EngineTorque, Gear, NodeId, TransmissionConfig, WheelConfig,
};

struct Powertrain {
    engine: NodeId,
    clutch: NodeId,
    transmission: NodeId,
    output: NodeId,
}

fn powertrain(h: &mut TestHarness) -> Powertrain {
    let engine = h.add_engine(EngineConfig {
        inertia: 0.5,
        torque: EngineTorque::Constant {
            torque: 100.0,
            resistance_torque: 0.0,
        },
        ..EngineConfig::default()
    });
    let clutch = h.add_clutch(ClutchConfig::default());
    let transmission = h.add_transmission(TransmissionConfig::default());
    let output = h.add_body(1.0);
    h.chain(&[engine, clutch, transmission, output]);
    Powertrain {
        engine,
        clutch,
        transmission,
        output,
    }
}

#[test]
fn test_neutral_decouples_the_output() {
    let mut h = TestHarness::new();
    let p = powertrain(&mut h);
    assert_eq!(h.net.transmission(p.transmission).unwrap().gear(), Gear::Neutral);
    assert_close(h.net.downstream_inertia(p.engine, p.engine), 0.6, 1e-12);

    h.controller.set_throttle(1.0);
    h.run_steps(100);

    assert!(h.omega(p.engine) > 0.0);
    assert_eq!(h.omega(p.transmission), 0.0);
    assert_eq!(h.omega(p.output), 0.0);
}

#[test]
fn test_first_gear_reduces_output_speed() {
    let mut h = TestHarness::new();
    let p = powertrain(&mut h);
    h.upshift();
    assert_eq!(h.net.transmission(p.transmission).unwrap().gear(), Gear::First);

    h.controller.set_throttle(1.0);
    h.run_steps(100);

    let input = h.omega(p.clutch);
    assert!(input > 0.0);
    assert_close(h.omega(p.transmission), input / 3.4, 1e-9);
    assert_close(h.omega(p.output), input / 3.4, 1e-9);
}

#[test]
fn test_inertia_is_scaled_across_the_gear() {
    let mut h = TestHarness::new();
    let p = powertrain(&mut h);
    h.net.transmission_mut(p.transmission).unwrap().set_gear(Gear::First);

    // Downstream of the gear: divided by the ratio
    assert_close(
        h.net.downstream_inertia(p.engine, p.engine),
        0.6 + (0.05 + 1.0) / 3.4,
        1e-12,
    );
    // Upstream of the gear: multiplied by the ratio
    assert_close(
        h.net.upstream_inertia(p.output, p.output),
        1.0 + 0.05 + 3.4 * 0.6,
        1e-12,
    );
}

#[test]
fn test_held_shift_lever_moves_one_gear() {
    let mut h = TestHarness::new();
    let p = powertrain(&mut h);

    h.controller.set_upshift(true);
    h.run_steps(10);
    assert_eq!(h.net.transmission(p.transmission).unwrap().gear(), Gear::First);

    h.controller.set_upshift(false);
    h.step();
    h.controller.set_upshift(true);
    h.step();
    assert_eq!(h.net.transmission(p.transmission).unwrap().gear(), Gear::Second);

    h.controller.set_upshift(false);
    h.step();
    h.controller.set_downshift(true);
    h.run_steps(3);
    assert_eq!(h.net.transmission(p.transmission).unwrap().gear(), Gear::First);
}

#[test]
fn test_locked_differential_drives_both_wheels_equally() {
    let mut h = TestHarness::new();
    let shaft = h.add_body(1.0);
    let differential = h.add_differential(DifferentialConfig {
        inertia: 0.05,
        final_drive_ratio: 4.0,
    });
    let airborne = WheelConfig {
        mass: 8.0,
        radius: 0.25,
        on_ground: false,
        ..WheelConfig::default()
    };
    let left = h.add_wheel(airborne.clone());
    let right = h.add_wheel(airborne);
    h.chain(&[shaft, differential, left]);
    h.connect(differential, right);

    assert_close(h.net.downstream_inertia(shaft, shaft), 1.0 + 1.05 / 4.0, 1e-12);

    h.run_with(10, |net| net.apply_downstream_torque(shaft, 10.0, shaft));

    let shaft_speed = h.omega(shaft);
    assert!(shaft_speed > 0.0);
    assert_close(h.omega(differential), shaft_speed / 4.0, 1e-9);
    assert_close(h.omega(left), shaft_speed / 4.0, 1e-9);
    assert_eq!(h.omega(left), h.omega(right));
}

#[test]
fn test_neutral_blocks_reaction_torque_from_the_output() {
    let mut h = TestHarness::new();
    let p = powertrain(&mut h);
    assert_close(h.net.upstream_inertia(p.transmission, p.transmission), 0.0, 0.0);
    assert_close(h.net.upstream_inertia(p.output, p.output), 1.0, 1e-12);

    // When: torque comes back up from the output
    h.net.apply_upstream_torque(p.output, 10.0, p.output);
    h.net.apply_upstream_angular_impulse(p.output, 2.0, p.output);

    // Then: only the output moves, the open gearbox and engine side stay still
    assert_close(h.net.angular_acceleration(p.output), 10.0, 1e-12);
    assert_close(h.omega(p.output), 2.0, 1e-12);
    for id in [p.transmission, p.clutch, p.engine] {
        assert_eq!(h.net.angular_acceleration(id), 0.0);
        assert_eq!(h.omega(id), 0.0);
    }
}

#[test]
fn test_brakes_in_neutral_leave_the_gearbox_alone() {
    let mut h = TestHarness::new();
    let p = powertrain(&mut h);
    let wheel = h.add_wheel(WheelConfig {
        mass: 8.0,
        radius: 0.25,
        maximum_braking_torque: 100.0,
        on_ground: false,
        ..WheelConfig::default()
    });
    h.connect(p.output, wheel);
    h.net.set_angular_velocity(p.output, 20.0);
    h.net.set_angular_velocity(wheel, 20.0);
    h.controller.set_brake(1.0);

    h.run_steps(5);

    assert!(h.omega(wheel) < 20.0);
    assert_eq!(h.omega(p.transmission), 0.0);
    assert_eq!(h.omega(p.engine), 0.0);
}
