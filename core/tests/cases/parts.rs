use crate::common::{assert_close, TestHarness};
use drivetrain_core::{
    engagement_for_pedal, Clutch, ClutchConfig, ControllerState, DrivetrainError, Engine, EngineConfig, EngineTorque,
    Gear, GroundFriction, Transmission, TransmissionConfig, Wheel, WheelConfig, DEFAULT_GEAR_RATIO,
};

fn pressing(up: bool, down: bool) -> ControllerState {
    let mut controller = ControllerState::new();
    controller.set_upshift(up);
    controller.set_downshift(down);
    controller
}

#[test]
fn test_pedal_maps_through_deadbands() {
    assert_eq!(engagement_for_pedal(0.0), 1.0);
    assert_eq!(engagement_for_pedal(0.4), 1.0);
    assert!((engagement_for_pedal(0.5) - 0.5).abs() < 1e-12);
    assert_eq!(engagement_for_pedal(0.6), 0.0);
    assert_eq!(engagement_for_pedal(1.0), 0.0);
}

#[test]
fn test_normal_force_follows_engagement() {
    let mut clutch = Clutch::new(ClutchConfig::default()).unwrap();
    assert!(clutch.is_engaged());
    clutch.set_engagement(0.25);
    assert!((clutch.joint().normal_force() - 1000.0).abs() < 1e-9);
    assert!(!clutch.is_engaged() && !clutch.is_disengaged());
    clutch.set_engagement(0.001);
    assert!(clutch.is_disengaged());
}

#[test]
fn test_constant_engine_uses_throttle_thresholds() {
    // 150 N·m drive, 30 N·m resistance, 0.25 kg·m²
    let cases = [(0.6, 16.0), (0.3, 10.0), (0.05, 8.8)];
    for (throttle, expected) in cases {
        let mut h = TestHarness::new();
        let engine = h.add_engine(EngineConfig::default());
        h.net.set_angular_velocity(engine, 10.0);
        h.controller.set_throttle(throttle);
        h.step();
        assert_close(h.omega(engine), expected, 1e-9);
    }
}

#[test]
fn test_negative_engine_constants_are_rejected() {
    let config = EngineConfig {
        torque: EngineTorque::Constant {
            torque: 10.0,
            resistance_torque: -1.0,
        },
        ..EngineConfig::default()
    };
    assert!(Engine::new(config).is_err());
}

#[test]
fn test_wheel_inertia_is_a_thin_ring() {
    let config = WheelConfig {
        mass: 8.0,
        radius: 0.25,
        ..WheelConfig::default()
    };
    assert_eq!(config.inertia(), 0.5);
}

#[test]
fn test_invalid_wheels_are_rejected() {
    assert!(Wheel::new(WheelConfig {
        radius: 0.0,
        ..WheelConfig::default()
    })
    .is_err());
    assert!(Wheel::new(WheelConfig {
        friction: GroundFriction::Coefficient(-0.5),
        ..WheelConfig::default()
    })
    .is_err());
}

#[test]
fn test_unset_gears_fall_back_to_default_ratio() {
    let transmission = Transmission::new(TransmissionConfig {
        reverse_ratio: None,
        forward_ratios: vec![3.0, 2.0],
        ..TransmissionConfig::default()
    })
    .unwrap();
    assert_eq!(transmission.ratio(Gear::Reverse).unwrap().gear_ratio(), DEFAULT_GEAR_RATIO);
    assert_eq!(transmission.ratio(Gear::Second).unwrap().gear_ratio(), 2.0);
    assert_eq!(transmission.ratio(Gear::Fifth).unwrap().gear_ratio(), DEFAULT_GEAR_RATIO);
    assert!(transmission.ratio(Gear::Neutral).is_none());
}

#[test]
fn test_held_upshift_request_moves_a_single_gear() {
    let mut transmission = Transmission::new(TransmissionConfig::default()).unwrap();
    let held = pressing(true, false);
    assert_eq!(transmission.handle_shift_request(&held), Some(Gear::First));
    for _ in 0..10 {
        assert_eq!(transmission.handle_shift_request(&held), None);
    }
    assert_eq!(transmission.gear(), Gear::First);

    transmission.handle_shift_request(&pressing(false, false));
    assert_eq!(transmission.handle_shift_request(&held), Some(Gear::Second));
}

#[test]
fn test_downshift_stops_at_reverse() {
    let mut transmission = Transmission::new(TransmissionConfig::default()).unwrap();
    let released = pressing(false, false);
    let down = pressing(false, true);
    assert_eq!(transmission.handle_shift_request(&down), Some(Gear::Reverse));
    transmission.handle_shift_request(&released);
    assert_eq!(transmission.handle_shift_request(&down), None);
    assert_eq!(transmission.gear(), Gear::Reverse);
}

#[test]
fn test_too_many_gears_is_a_configuration_error() {
    let config = TransmissionConfig {
        forward_ratios: vec![4.0, 3.0, 2.0, 1.5, 1.0, 0.8],
        ..TransmissionConfig::default()
    };
    assert!(matches!(
        Transmission::new(config),
        Err(DrivetrainError::TooManyGears(6))
    ));
}
