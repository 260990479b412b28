extern crate nalgebra as na;
extern crate physics;
extern crate state;

use approx::assert_relative_eq;
use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use physics::*;
use state::*;

const TICK: f32 = 1.0 / 60.0;

fn start_pose(height: f32) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::new(0.0, height, 0.0), UnitQuaternion::identity())
}

fn new_vehicle(height: f32) -> VehicleBody {
    VehicleBody::new(VehicleConfig::default(), start_pose(height)).unwrap()
}

fn bumpy() -> HeightField {
    HeightField::from_fn((-200.0, -200.0), 2.0, 201, 201, |x, z| {
        0.3 * (x * 0.15).sin() + 0.2 * (z * 0.1).cos()
    })
    .unwrap()
}

fn settle(vehicle: &mut VehicleBody, terrain: &FlatTerrain, ticks: usize) {
    for _ in 0..ticks {
        vehicle.step(TICK, &ControlSignal::idle(), terrain);
    }
}

#[test]
fn test_identical_inputs_give_identical_states() {
    let terrain = bumpy();
    let mut a = new_vehicle(1.5);
    let mut b = new_vehicle(1.5);

    for i in 0..400 {
        let controls = ControlSignal {
            steering: ((i as f32) * 0.05).sin(),
            throttle: if i % 90 < 60 { 1.0 } else { 0.0 },
            brake: if i % 90 >= 75 { 0.5 } else { 0.0 },
            handbrake: i % 200 > 180,
        };
        let outcome_a = a.step(TICK, &controls, &terrain);
        let outcome_b = b.step(TICK, &controls, &terrain);
        assert_eq!(outcome_a, outcome_b);
    }

    assert_eq!(a.body(), b.body());
    assert_eq!(a.wheels(), b.wheels());
    assert_eq!(a.render_transform(), b.render_transform());
}

#[test]
fn test_airborne_only_gravity_and_drag() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(50.0);
    vehicle.set_motion(Vector3::new(0.0, 0.0, 10.0), Vector3::zeros());

    let controls = ControlSignal {
        steering: 1.0,
        throttle: 1.0,
        brake: 0.0,
        handbrake: false,
    };
    let outcome = vehicle.step(TICK, &controls, &terrain);
    assert_eq!(outcome, StepOutcome::Advanced(BodyMode::Airborne));

    let config = VehicleConfig::default();
    let drag = config.drag_coefficient * 10.0 * 10.0 / config.mass;
    let velocity = vehicle.body().velocity;
    assert_eq!(velocity.x, 0.0);
    assert_relative_eq!(velocity.y, -GRAVITY * TICK, epsilon = 1e-5);
    assert_relative_eq!(velocity.z, 10.0 - drag * TICK, epsilon = 1e-5);
    assert_eq!(vehicle.body().angular_velocity, Vector3::zeros());

    for wheel in vehicle.wheels().iter() {
        assert!(!wheel.in_contact);
        assert_eq!(wheel.traction, Vector3::zeros());
        assert_eq!(wheel.compression, 0.0);
    }
}

#[test]
fn test_invalid_time_step_is_skipped() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(1.0);
    settle(&mut vehicle, &terrain, 30);
    let before = *vehicle.body();

    for &dt in [0.0, -0.1, std::f32::NAN, std::f32::INFINITY].iter() {
        let outcome = vehicle.step(dt, &ControlSignal::idle(), &terrain);
        assert!(outcome.is_skipped());
        assert_eq!(vehicle.body(), &before);
    }
}

#[test]
fn test_invalid_controls_are_skipped() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(1.0);
    let before = *vehicle.body();

    let bad = [
        ControlSignal { steering: 1.5, ..ControlSignal::idle() },
        ControlSignal { throttle: std::f32::NAN, ..ControlSignal::idle() },
        ControlSignal { brake: -0.2, ..ControlSignal::idle() },
    ];
    for controls in bad.iter() {
        match vehicle.step(TICK, controls, &terrain) {
            StepOutcome::Skipped(SkipReason::InvalidControls(_)) => {}
            other => panic!("expected skip, got {:?}", other),
        }
        assert_eq!(vehicle.body(), &before);
    }
}

#[test]
fn test_settles_on_flat_ground() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(1.0);
    settle(&mut vehicle, &terrain, 300);

    assert_eq!(vehicle.mode(), BodyMode::Grounded);
    assert!(vehicle.wheels().iter().all(|w| w.in_contact));
    let body = vehicle.body();
    assert!(body.velocity.norm() < 0.05, "still moving: {:?}", body.velocity);
    assert!(body.position.y < 1.0 && body.position.y > 0.7, "height {}", body.position.y);
    assert!(body.orientation.angle() < 0.01);

    let expected = VehicleConfig::default().mass * GRAVITY / WHEEL_COUNT as f32
        / VehicleConfig::default().wheels[0].spring_constant;
    for compression in vehicle.wheel_compression().iter() {
        assert_relative_eq!(*compression, expected, epsilon = 0.01);
    }
}

#[test]
fn test_throttle_accelerates_forward() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(1.0);
    settle(&mut vehicle, &terrain, 120);
    let start_z = vehicle.body().position.z;

    let controls = ControlSignal {
        throttle: 1.0,
        ..ControlSignal::idle()
    };
    for _ in 0..120 {
        vehicle.step(TICK, &controls, &terrain);
    }

    let body = vehicle.body();
    assert!(body.local_velocity().z > 5.0, "too slow: {:?}", body.local_velocity());
    assert!(body.position.z > start_z + 3.0);
    assert!(body.up().y > 0.95);
    assert_eq!(vehicle.mode(), BodyMode::Grounded);
    assert!(vehicle.readout().speed > 5.0);
}

#[test]
fn test_brake_slows_down() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(1.0);
    settle(&mut vehicle, &terrain, 120);
    vehicle.set_motion(Vector3::new(0.0, 0.0, 20.0), Vector3::zeros());

    let controls = ControlSignal {
        brake: 1.0,
        ..ControlSignal::idle()
    };
    for _ in 0..60 {
        vehicle.step(TICK, &controls, &terrain);
    }
    let speed = vehicle.body().velocity.norm();
    assert!(speed < 15.0, "speed {}", speed);
    // braking never pushes the car backwards
    assert!(vehicle.body().local_velocity().z >= -0.1);
}

#[test]
fn test_steering_right_turns_right() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(1.0);
    settle(&mut vehicle, &terrain, 120);
    vehicle.set_motion(Vector3::new(0.0, 0.0, 15.0), Vector3::zeros());

    let controls = ControlSignal {
        steering: 1.0,
        throttle: 0.3,
        ..ControlSignal::idle()
    };
    for _ in 0..60 {
        vehicle.step(TICK, &controls, &terrain);
    }

    let forward = vehicle.body().forward();
    let right = local_right();
    assert!(forward.dot(&right) > 0.0, "heading {:?}", forward);
    assert!(vehicle.body().up().y > 0.9);
}

#[test]
fn test_speed_is_clamped() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(100.0);
    vehicle.set_motion(Vector3::new(0.0, 0.0, 1000.0), Vector3::new(50.0, 0.0, 0.0));
    vehicle.step(TICK, &ControlSignal::idle(), &terrain);

    let config = VehicleConfig::default();
    assert!(vehicle.body().velocity.norm() <= config.max_speed * (1.0 + 1e-5));
    assert!(vehicle.body().angular_velocity.norm() <= config.max_angular_speed * (1.0 + 1e-5));
}

#[test]
fn test_orientation_stays_normalized() {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = new_vehicle(100.0);
    vehicle.set_motion(Vector3::zeros(), Vector3::new(1.3, 2.1, -0.7));
    for _ in 0..1000 {
        vehicle.step(TICK, &ControlSignal::idle(), &terrain);
    }
    assert_relative_eq!(vehicle.body().orientation.quaternion().norm(), 1.0, epsilon = 1e-5);
}

#[test]
fn test_driving_off_the_map_is_airborne() {
    let terrain = FlatTerrain {
        height: 0.0,
        half_extent: Some(5.0),
    };
    let mut vehicle = new_vehicle(1.0);
    vehicle.reset(Isometry3::from_parts(
        Translation3::new(0.0, 1.0, 50.0),
        UnitQuaternion::identity(),
    ));
    let outcome = vehicle.step(TICK, &ControlSignal::idle(), &terrain);
    assert_eq!(outcome, StepOutcome::Advanced(BodyMode::Airborne));
    assert!(vehicle.wheels().iter().all(|w| w.normal_force == 0.0));
}

#[test]
fn test_degenerate_configuration_is_rejected() {
    let mut config = VehicleConfig::default();
    config.mass = -1.0;
    assert!(VehicleBody::new(config, start_pose(1.0)).is_err());

    let mut config = VehicleConfig::default();
    config.wheels[1].spring_constant = 0.0;
    assert!(VehicleBody::new(config, start_pose(1.0)).is_err());
}
