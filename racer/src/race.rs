use anyhow::Result;
use record::Replay;
use spin_sleep::LoopHelper;
use state::*;
use std::path::PathBuf;
use tracing::{debug, info, trace, warn};

use crate::autopilot::Autopilot;
use crate::course::Course;
use crate::simulation::{Services, Simulation, SimulationConfig};

/// the host never hands the simulation more than this in one frame
pub const MAX_FRAME_TIME: f32 = 1.0 / 15.0;
const FIXED_FRAME_TIME: f32 = 1.0 / 60.0;

/// the cars to choose from
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CarType {
    Standard,
    /// faster, lighter and much stronger than the standard car
    Speedy,
}

impl CarType {
    pub const NAMES: &'static [&'static str] = &["standard", "speedy"];

    pub fn parse(name: &str) -> Option<CarType> {
        match name {
            "standard" => Some(CarType::Standard),
            "speedy" => Some(CarType::Speedy),
            _ => None,
        }
    }

    pub fn vehicle_config(self) -> VehicleConfig {
        match self {
            CarType::Standard => VehicleConfig::default(),
            CarType::Speedy => VehicleConfig::with_car_type(2.22, 0.67, 3.5),
        }
    }
}

#[derive(Clone, Debug)]
pub struct RaceOptions {
    pub laps: u32,
    pub car: CarType,
    /// deadzone and smoothing, normally from the player's settings
    pub input: InputConfig,
    /// pace frames to wall clock time instead of running as fast as possible
    pub realtime: bool,
    pub fps: f64,
    /// seconds
    pub time_limit: Option<f32>,
    /// drive with a gamepad instead of the autopilot
    pub gamepad: bool,
    pub ghost: Option<PathBuf>,
}

impl Default for RaceOptions {
    fn default() -> RaceOptions {
        RaceOptions {
            laps: 3,
            car: CarType::Standard,
            input: InputConfig::default(),
            realtime: false,
            fps: 60.0,
            time_limit: Some(600.0),
            gamepad: false,
            ghost: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct RaceSummary {
    pub laps: u32,
    pub lap_times: Vec<u32>,
    pub total_ms: u32,
    pub frames: u64,
    /// a lap from this race that beat the ghost, the one to save
    pub best_lap: Option<Replay>,
}

impl RaceSummary {
    pub fn best_lap_ms(&self) -> Option<u32> {
        self.lap_times.iter().cloned().min()
    }
}

struct LogAudio;

impl AudioSink for LogAudio {
    fn cue(&mut self, cue: AudioCue) {
        debug!(?cue, "audio");
    }
}

/// stands in for a renderer, logs the dashboard once a second
#[derive(Default)]
struct HeadlessRenderer {
    frames: u64,
}

impl RenderSink for HeadlessRenderer {
    fn submit(&mut self, frame: &RenderFrame) {
        self.frames += 1;
        if self.frames % 60 == 0 {
            let position = frame.body.translation.vector;
            trace!(
                x = position.x,
                z = position.z,
                mph = frame.readout.speed_mph,
                gear = frame.readout.gear,
                motor = frame.readout.motor_meter,
                ghost = frame.ghost.is_some(),
                "frame"
            );
        }
    }
}

enum Driver {
    Autopilot(Autopilot),
    #[cfg(feature = "gamepad")]
    Gamepad(controls::Gilrs, controls::Gamepad),
}

impl Driver {
    fn new(options: &RaceOptions) -> Result<Driver> {
        if options.gamepad {
            #[cfg(feature = "gamepad")]
            {
                let gilrs = controls::Gilrs::new()
                    .map_err(|e| anyhow::anyhow!("couldn't open gamepads: {}", e))?;
                return Ok(Driver::Gamepad(gilrs, controls::Gamepad::default()));
            }
            #[cfg(not(feature = "gamepad"))]
            warn!("built without the gamepad feature, the autopilot drives instead");
        }
        Ok(Driver::Autopilot(Autopilot::default()))
    }

    fn input(&mut self, simulation: &Simulation) -> RawInput {
        match self {
            Driver::Autopilot(autopilot) => autopilot.drive(
                simulation.vehicle().body(),
                simulation.track().spline(),
                simulation.track().next_checkpoint(),
            ),
            #[cfg(feature = "gamepad")]
            Driver::Gamepad(gilrs, gamepad) => {
                controls::update_gamepad(gilrs, gamepad);
                controls::raw_from_gamepad(gamepad)
            }
        }
    }
}

pub fn simulation_config(options: &RaceOptions) -> SimulationConfig {
    SimulationConfig {
        vehicle: options.car.vehicle_config(),
        input: options.input,
        race: RaceConfig {
            lap_limit: Some(options.laps),
            time_limit: options.time_limit,
        },
        ..SimulationConfig::default()
    }
}

/// Race on the oval until the lap or time limit ends it.
pub fn run_race<S: SettingsStore>(options: &RaceOptions, settings: &mut S) -> Result<RaceSummary> {
    let course = Course::oval()?;
    let config = simulation_config(options);
    let start = course.start_pose(config.vehicle.ride_height());
    let mut simulation = Simulation::new(config, course.track.clone(), start, settings.best_time())?;

    if let Some(path) = &options.ghost {
        match Replay::load(path) {
            Ok(ghost) => {
                info!(path = %path.display(), seconds = ghost.duration(), "ghost loaded");
                simulation.set_ghost(ghost);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "couldn't load ghost"),
        }
    }

    let mut driver = Driver::new(options)?;
    let mut audio = LogAudio;
    let mut renderer = HeadlessRenderer::default();
    let mut loop_helper = LoopHelper::builder().build_with_target_rate(options.fps);
    info!(laps = options.laps, car = ?options.car, realtime = options.realtime, "race started");

    while !simulation.is_finished() {
        let dt = if options.realtime {
            loop_helper.loop_start().as_secs_f32().min(MAX_FRAME_TIME)
        } else {
            FIXED_FRAME_TIME
        };

        let raw = driver.input(&simulation);
        let mut services = Services {
            audio: &mut audio,
            settings: &mut *settings,
        };
        let frame = simulation.step(dt, &raw, &course.terrain, &mut services);
        renderer.submit(&frame);

        if options.realtime {
            loop_helper.loop_sleep();
        }
    }

    let progress = simulation.track().progress();
    let summary = RaceSummary {
        laps: progress.lap,
        lap_times: simulation.lap_times().to_vec(),
        total_ms: progress.elapsed_ms(),
        frames: renderer.frames,
        best_lap: simulation.best_lap().cloned(),
    };
    info!(
        laps = summary.laps,
        best_lap_ms = ?summary.best_lap_ms(),
        total_ms = summary.total_ms,
        frames = summary.frames,
        "race finished"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::Course;

    #[test]
    fn stored_input_settings_reach_the_mapper() {
        let options = RaceOptions {
            input: InputConfig {
                deadzone: 0.3,
                smoothing: 0.5,
            },
            ..RaceOptions::default()
        };
        let course = Course::oval().unwrap();
        let config = simulation_config(&options);
        let start = course.start_pose(config.vehicle.ride_height());
        let simulation = Simulation::new(config, course.track.clone(), start, None).unwrap();
        assert_eq!(simulation.input().config().deadzone, 0.3);
        assert_eq!(simulation.input().config().smoothing, 0.5);
    }

    #[test]
    fn car_types_by_name() {
        for name in CarType::NAMES {
            let car = CarType::parse(name).unwrap();
            assert!(car.vehicle_config().validate().is_ok());
        }
        assert_eq!(CarType::parse("tractor"), None);

        let standard = CarType::Standard.vehicle_config();
        let speedy = CarType::Speedy.vehicle_config();
        assert!(speedy.max_speed > standard.max_speed);
        assert!(speedy.mass < standard.mass);
    }
}
