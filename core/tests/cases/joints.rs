use drivetrain_core::{ClutchJoint, DrivetrainError, GearJoint};

#[test]
fn test_tiny_gear_ratio_is_rejected() {
    assert!(matches!(
        GearJoint::new(0.005),
        Err(DrivetrainError::InvalidGearRatio(_))
    ));
    assert!(GearJoint::new(-0.005).is_err());
    assert!(GearJoint::new(-3.2).is_ok());
}

#[test]
fn test_gear_scales_in_both_directions() {
    let gear = GearJoint::new(4.0).unwrap();
    assert_eq!(gear.to_downstream(8.0), 2.0);
    assert_eq!(gear.to_upstream(2.0), 8.0);
    assert_eq!(gear.output_velocity(100.0), 25.0);
}

#[test]
fn test_gear_deserializes_through_validation() {
    let gear: GearJoint = serde_json::from_str("3.5").unwrap();
    assert_eq!(gear.gear_ratio(), 3.5);
    assert!(serde_json::from_str::<GearJoint>("0.0").is_err());
}

#[test]
fn test_clutch_switches_to_kinetic_friction_when_slipping() {
    let mut joint = ClutchJoint::new(0.6, 0.4).unwrap();
    joint.set_normal_force(1000.0);

    let slipping = joint.frictional_torque(50.0, 0.2);
    assert!((slipping - 80.0).abs() < 1e-9);

    // Below 0.1 rad/s the plates grip with static friction
    let gripping = joint.frictional_torque(-0.05, 0.2);
    assert!((gripping + 120.0).abs() < 1e-9);
    assert!((joint.maximum_torque(0.2) - 120.0).abs() < 1e-9);
}

#[test]
fn test_clutch_rejects_negative_coefficients() {
    assert!(ClutchJoint::new(-0.1, 0.4).is_err());
}
