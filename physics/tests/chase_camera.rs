extern crate nalgebra as na;
extern crate physics;
extern crate state;

use na::{UnitQuaternion, Vector3};
use physics::ChaseCamera;
use state::{CameraConfig, RigidBodyState, VehicleConfig};

const TICK: f32 = 1.0 / 60.0;

fn parked_car() -> RigidBodyState {
    let config = VehicleConfig::default();
    RigidBodyState::at_rest(Vector3::new(3.0, 1.0, -4.0), config.mass, config.inertia)
}

#[test]
fn test_snap_puts_eye_at_desired_position() {
    let mut camera = ChaseCamera::new(CameraConfig::default()).unwrap();
    let car = parked_car();
    camera.snap_to(&car);

    assert_eq!(camera.eye(), camera.desired_eye(&car));
    // behind and above the car
    assert!(camera.eye().z < car.position.z);
    assert!(camera.eye().y > car.position.y);
    assert!(camera.target().y > car.position.y);
}

#[test]
fn test_sharp_turn_closes_in_without_overshoot() {
    let mut camera = ChaseCamera::new(CameraConfig::default()).unwrap();
    let mut car = parked_car();
    camera.snap_to(&car);

    car.orientation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2);
    let desired = camera.desired_eye(&car);
    let initial = camera.eye() - desired;
    let mut last_distance = initial.norm();
    assert!(last_distance > 1.0);

    for _ in 0..120 {
        camera.step(TICK, &car);
        let offset = camera.eye() - desired;
        let distance = offset.norm();
        assert!(distance < last_distance, "{} !< {}", distance, last_distance);
        assert!(distance > 0.0);
        // still on the side it started from
        assert!(offset.dot(&initial) > 0.0);
        last_distance = distance;
    }
}

#[test]
fn test_converges_on_a_parked_car() {
    let mut camera = ChaseCamera::new(CameraConfig::default()).unwrap();
    let mut car = parked_car();
    camera.snap_to(&car);
    car.orientation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 2.5);

    for _ in 0..600 {
        camera.step(TICK, &car);
    }
    assert!((camera.eye() - camera.desired_eye(&car)).norm() < 1e-3);
}

#[test]
fn test_lags_behind_a_moving_car() {
    let mut camera = ChaseCamera::new(CameraConfig::default()).unwrap();
    let mut car = parked_car();
    camera.snap_to(&car);
    car.velocity = Vector3::new(0.0, 0.0, 20.0);

    for _ in 0..60 {
        car.position += car.velocity * TICK;
        camera.step(TICK, &car);
    }
    let desired = camera.desired_eye(&car);
    assert!(camera.eye().z < desired.z);
    // the camera looks ahead of where the car is going
    assert!(camera.target().z > car.position.z);
}

#[test]
fn test_invalid_time_step_leaves_camera_alone() {
    let mut camera = ChaseCamera::new(CameraConfig::default()).unwrap();
    let mut car = parked_car();
    camera.snap_to(&car);
    let before = *camera.state();

    car.position.x += 10.0;
    camera.step(0.0, &car);
    camera.step(std::f32::NAN, &car);
    camera.step(-1.0, &car);
    assert_eq!(camera.state(), &before);
}

#[test]
fn test_rejects_non_positive_lag() {
    let config = CameraConfig {
        lag: 0.0,
        ..CameraConfig::default()
    };
    assert!(ChaseCamera::new(config).is_err());
}
