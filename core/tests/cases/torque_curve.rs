use drivetrain_core::{DrivetrainError, TorqueCurve, TorqueCurveBuilder};

fn sample_curve() -> TorqueCurve {
    TorqueCurve::from_plot_points([(1000.0, 200.0), (4000.0, 400.0), (7000.0, 300.0)]).unwrap()
}

#[test]
fn test_lookup_interpolates_between_points() {
    let curve = sample_curve();
    assert_eq!(curve.maximum_torque(), 400.0);
    assert!((curve.normalized_torque(2500.0) - 0.75).abs() < 1e-12);
    assert!((curve.torque_at(5500.0) - 350.0).abs() < 1e-9);
    assert_eq!(curve.normalized_torque(4000.0), 1.0);
}

#[test]
fn test_lookup_clamps_outside_the_table() {
    let curve = sample_curve();
    assert_eq!(curve.normalized_torque(0.0), 0.5);
    assert_eq!(curve.normalized_torque(9000.0), 0.75);
}

#[test]
fn test_out_of_order_point_is_rejected() {
    let mut builder = TorqueCurveBuilder::new();
    builder.add_plot_point(4000.0, 300.0).unwrap();

    // When: a lower rpm follows a higher one
    let result = builder.add_plot_point(1000.0, 200.0);

    // Then: setup fails and the builder keeps only the valid point
    assert!(matches!(
        result,
        Err(DrivetrainError::OutOfOrderPlotPoint { rpm, previous }) if rpm == 1000.0 && previous == 4000.0
    ));
    assert_eq!(builder.len(), 1);
    assert!(TorqueCurve::from_plot_points([(7000.0, 300.0), (1000.0, 200.0)]).is_err());
}

#[test]
fn test_near_duplicate_points_are_rejected() {
    let mut builder = TorqueCurveBuilder::new();
    builder.add_plot_point(3000.0, 250.0).unwrap();
    assert!(matches!(
        builder.add_plot_point(3000.05, 260.0),
        Err(DrivetrainError::DuplicatePlotPoint { .. })
    ));
    assert!(matches!(
        builder.add_plot_point(2999.95, 260.0),
        Err(DrivetrainError::DuplicatePlotPoint { .. })
    ));
    assert!(builder.add_plot_point(3000.2, 260.0).is_ok());
}

#[test]
fn test_negative_values_are_rejected() {
    let mut builder = TorqueCurveBuilder::new();
    assert!(builder.add_plot_point(-1.0, 10.0).is_err());
    assert!(builder.add_plot_point(1000.0, -10.0).is_err());
    assert!(builder.is_empty());
}

#[test]
fn test_empty_curve_cannot_be_normalized() {
    assert!(matches!(
        TorqueCurveBuilder::new().normalize(),
        Err(DrivetrainError::EmptyTorqueCurve)
    ));
}

#[test]
fn test_curve_survives_json() {
    let curve = sample_curve();
    let json = serde_json::to_string(&curve).unwrap();
    let back: TorqueCurve = serde_json::from_str(&json).unwrap();
    assert_eq!(back, curve);
}
