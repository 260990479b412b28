extern crate nalgebra as na;
extern crate record;

use approx::assert_relative_eq;
use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use record::{Replay, ReplayError};

fn pose(x: f32, yaw: f32) -> Isometry3<f32> {
    Isometry3::from_parts(
        Translation3::new(x, 1.0, 2.0 * x),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw),
    )
}

fn two_samples() -> Replay {
    let mut replay = Replay::new(0.0);
    assert!(replay.record(0.0, &pose(0.0, 0.0)));
    assert!(replay.record(1.0, &pose(10.0, 1.0)));
    replay
}

#[test]
fn test_midpoint_is_interpolated() {
    let replay = two_samples();
    let middle = replay.transform_at(0.5).unwrap();
    assert_relative_eq!(middle.translation.vector, Vector3::new(5.0, 1.0, 10.0), epsilon = 1e-5);
    assert_relative_eq!(middle.rotation.angle(), 0.5, epsilon = 1e-5);

    let quarter = replay.transform_at(0.25).unwrap();
    assert_relative_eq!(quarter.translation.vector.x, 2.5, epsilon = 1e-5);
}

#[test]
fn test_ends_are_held() {
    let replay = two_samples();
    assert_eq!(replay.transform_at(-3.0), Some(pose(0.0, 0.0)));
    let end = replay.transform_at(50.0).unwrap();
    assert_relative_eq!(end.translation.vector.x, 10.0);
    assert_eq!(replay.duration(), 1.0);
}

#[test]
fn test_finish_ignores_the_interval() {
    let mut replay = Replay::new(0.5);
    assert!(replay.record(0.0, &pose(0.0, 0.0)));
    assert!(!replay.record(0.1, &pose(1.0, 0.0)));
    assert!(replay.finish(0.1, &pose(1.0, 0.0)));
    assert_eq!(replay.duration(), 0.1);
    assert!(!replay.finish(0.05, &pose(2.0, 0.0)));
    assert_eq!(replay.len(), 2);
}

#[test]
fn test_empty_replay_has_no_ghost() {
    assert_eq!(Replay::default().transform_at(0.0), None);
}

#[test]
fn test_samples_are_thinned() {
    let mut replay = Replay::new(0.1);
    let mut kept = 0;
    for i in 0..60 {
        if replay.record(i as f32 / 60.0, &pose(i as f32, 0.0)) {
            kept += 1;
        }
    }
    assert_eq!(kept, replay.len());
    assert!(kept >= 9 && kept <= 11, "kept {}", kept);
}

#[test]
fn test_time_never_runs_backwards() {
    let mut replay = two_samples();
    assert!(!replay.record(0.5, &pose(3.0, 0.0)));
    assert!(!replay.record(1.0, &pose(3.0, 0.0)));
    assert!(!replay.record(std::f32::NAN, &pose(3.0, 0.0)));
    assert_eq!(replay.len(), 2);
}

#[test]
fn test_csv_keeps_the_lap() {
    let replay = two_samples();
    let mut buffer = vec![];
    replay.write_csv(&mut buffer).unwrap();
    let text = String::from_utf8(buffer.clone()).unwrap();
    assert_eq!(text.lines().count(), 2);

    let loaded = Replay::read_csv(&buffer[..], 0.0).unwrap();
    assert_eq!(loaded.len(), 2);
    let middle = loaded.transform_at(0.5).unwrap();
    assert_relative_eq!(middle.translation.vector.x, 5.0, epsilon = 1e-5);
}

#[test]
fn test_bad_rows_are_reported() {
    let short = "0.0,1.0,2.0\n";
    match Replay::read_csv(short.as_bytes(), 0.0) {
        Err(ReplayError::BadRow { row: 0, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    let garbage = "0,0,0,0,0,0,0,1\n1,0,0,x,0,0,0,1\n";
    match Replay::read_csv(garbage.as_bytes(), 0.0) {
        Err(ReplayError::BadRow { row: 1, .. }) => {}
        other => panic!("unexpected {:?}", other),
    }

    let backwards = "1,0,0,0,0,0,0,1\n0.5,0,0,0,0,0,0,1\n";
    assert!(Replay::read_csv(backwards.as_bytes(), 0.0).is_err());
}
