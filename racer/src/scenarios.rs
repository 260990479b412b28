//! Named headless runs, picked from the command line by (part of) their name.

use anyhow::{ensure, Result};
use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use physics::{BodyMode, ChaseCamera, FlatTerrain, SpringDamper1D, VehicleBody};
use state::*;
use tracing::info;
use track::HighscoreTable;

use crate::race::{run_race, RaceOptions};
use crate::settings::MemorySettings;

pub struct Scenario {
    pub name: &'static str,
    pub description: &'static str,
    pub run: fn() -> Result<()>,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "spring_oscillation",
        description: "step the default spring away from rest and print the motion",
        run: spring_oscillation,
    },
    Scenario {
        name: "car_settles_on_flat_ground",
        description: "drop the car onto flat ground and wait for it to come to rest",
        run: car_settles_on_flat_ground,
    },
    Scenario {
        name: "car_accelerates",
        description: "full throttle for three seconds on flat ground",
        run: car_accelerates,
    },
    Scenario {
        name: "camera_sharp_turn",
        description: "turn the car 90 degrees under the camera and watch it catch up",
        run: camera_sharp_turn,
    },
    Scenario {
        name: "highscore_ranks",
        description: "print where a few lap times would land in the default table",
        run: highscore_ranks,
    },
    Scenario {
        name: "autopilot_lap",
        description: "let the autopilot drive one lap of the oval as fast as possible",
        run: autopilot_lap,
    },
];

/// first scenario whose name contains `query`
pub fn find(query: &str) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|scenario| scenario.name.contains(query))
}

const TICK: f32 = 1.0 / 60.0;

fn parked(height: f32) -> Result<VehicleBody> {
    let pose = Isometry3::from_parts(Translation3::new(0.0, height, 0.0), UnitQuaternion::identity());
    Ok(VehicleBody::new(VehicleConfig::default(), pose)?)
}

fn spring_oscillation() -> Result<()> {
    let mut spring = SpringDamper1D::default();
    spring.change_position(1.0);
    for step in 1..=30 {
        spring.step(0.1);
        info!(step, position = spring.position, velocity = spring.velocity, "spring");
    }
    ensure!(spring.position.abs() < 1.0, "spring didn't lose energy");
    Ok(())
}

fn car_settles_on_flat_ground() -> Result<()> {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = parked(VehicleConfig::default().ride_height() + 0.5)?;
    for frame in 0..300 {
        vehicle.step(TICK, &ControlSignal::idle(), &terrain);
        if frame % 30 == 0 {
            info!(frame, height = vehicle.body().position.y, mode = ?vehicle.mode(), "settling");
        }
    }
    ensure!(vehicle.mode() == BodyMode::Grounded, "car never touched down");
    ensure!(vehicle.body().velocity.norm() < 0.05, "car still moving");
    Ok(())
}

fn car_accelerates() -> Result<()> {
    let terrain = FlatTerrain::new(0.0);
    let mut vehicle = parked(VehicleConfig::default().ride_height())?;
    let controls = ControlSignal {
        throttle: 1.0,
        ..ControlSignal::idle()
    };
    let mut gear = 1;
    for frame in 0..180 {
        vehicle.step(TICK, &controls, &terrain);
        let readout = vehicle.readout();
        if readout.gear != gear {
            gear = readout.gear;
            info!(frame, gear, mph = readout.speed_mph, "gear change");
        }
    }
    let readout = vehicle.readout();
    info!(speed = readout.speed, mph = readout.speed_mph, gear = readout.gear, "after 3 seconds");
    ensure!(vehicle.body().local_velocity().z > 5.0, "car didn't get going");
    Ok(())
}

fn camera_sharp_turn() -> Result<()> {
    let config = VehicleConfig::default();
    let mut body = RigidBodyState::at_rest(Vector3::new(0.0, 1.0, 0.0), config.mass, config.inertia);
    let mut camera = ChaseCamera::new(CameraConfig::default())?;
    camera.snap_to(&body);

    body.orientation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::FRAC_PI_2);
    let desired = camera.desired_eye(&body);
    let mut last = (camera.eye() - desired).norm();
    for frame in 0..90 {
        camera.step(TICK, &body);
        let distance = (camera.eye() - desired).norm();
        if frame % 10 == 0 {
            info!(frame, distance, "camera catching up");
        }
        ensure!(distance < last && distance > 0.0, "camera overshot at frame {}", frame);
        last = distance;
    }
    Ok(())
}

fn highscore_ranks() -> Result<()> {
    let table = HighscoreTable::default();
    for &time_ms in [500, 44_000, 52_000, 89_999, 120_000].iter() {
        info!(time_ms, rank = table.rank_for(time_ms), "rank");
    }
    ensure!(table.rank_for(52_000) == 2, "unexpected rank");
    Ok(())
}

fn autopilot_lap() -> Result<()> {
    let options = RaceOptions {
        laps: 1,
        realtime: false,
        time_limit: Some(180.0),
        ..RaceOptions::default()
    };
    let summary = run_race(&options, &mut MemorySettings::default())?;
    ensure!(summary.laps >= 1, "autopilot didn't finish a lap");
    Ok(())
}
