use controls::InputMapper;
use na::Isometry3;
use physics::{ChaseCamera, StepOutcome, VehicleBody};
use record::Replay;
use state::*;
use tracing::{debug, info, warn};
use track::{TrackEvent, TrackProgress, TrackSpline};

/// Everything tunable about a race.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct SimulationConfig {
    pub vehicle: VehicleConfig,
    pub camera: CameraConfig,
    pub input: InputConfig,
    pub race: RaceConfig,
}

/// the outside world, as far as a frame is concerned
pub struct Services<'a> {
    pub audio: &'a mut dyn AudioSink,
    pub settings: &'a mut dyn SettingsStore,
}

/// the lap the car races against
#[derive(Clone, Debug)]
struct Ghost {
    replay: Replay,
    time_ms: u32,
    /// driven during this race, as opposed to loaded from an earlier one
    driven: bool,
}

/// One race: owns the input mapper, car, lap timer, camera and the lap recordings. A frame
/// always runs input, car, track, camera in that order.
pub struct Simulation {
    input: InputMapper,
    vehicle: VehicleBody,
    track: TrackProgress,
    camera: ChaseCamera,
    recording: Replay,
    ghost: Option<Ghost>,
    lap_times: Vec<u32>,
    gear: u8,
}

impl Simulation {
    pub fn new(
        config: SimulationConfig,
        spline: TrackSpline,
        start: Isometry3<f32>,
        best_time_ms: Option<u32>,
    ) -> Result<Simulation, ConfigError> {
        let vehicle = VehicleBody::new(config.vehicle, start)?;
        let mut track = TrackProgress::new(spline, config.race)?;
        track.set_best_lap(best_time_ms);
        let mut camera = ChaseCamera::new(config.camera)?;
        camera.snap_to(vehicle.body());

        Ok(Simulation {
            input: InputMapper::new(config.input)?,
            vehicle,
            track,
            camera,
            recording: Replay::default(),
            ghost: None,
            lap_times: vec![],
            gear: 1,
        })
    }

    pub fn input(&self) -> &InputMapper {
        &self.input
    }

    pub fn vehicle(&self) -> &VehicleBody {
        &self.vehicle
    }

    pub fn track(&self) -> &TrackProgress {
        &self.track
    }

    /// recording of a lap driven in this race that beat the ghost, if any did
    pub fn best_lap(&self) -> Option<&Replay> {
        self.ghost.as_ref().filter(|ghost| ghost.driven).map(|ghost| &ghost.replay)
    }

    /// lap time of the ghost currently raced against
    pub fn ghost_time_ms(&self) -> Option<u32> {
        self.ghost.as_ref().map(|ghost| ghost.time_ms)
    }

    /// lap times driven in this race, in milliseconds
    pub fn lap_times(&self) -> &[u32] {
        &self.lap_times
    }

    /// a ghost to race against, e.g. loaded from disk. its lap time is the recording's length
    pub fn set_ghost(&mut self, replay: Replay) {
        if replay.is_empty() {
            warn!("ignoring empty ghost");
            return;
        }
        let time_ms = seconds_to_ms(replay.duration() as f64);
        self.ghost = Some(Ghost {
            replay,
            time_ms,
            driven: false,
        });
    }

    pub fn is_finished(&self) -> bool {
        self.track.is_game_over()
    }

    pub fn step<T: TerrainQuery + ?Sized>(
        &mut self,
        dt: f32,
        raw: &RawInput,
        terrain: &T,
        services: &mut Services,
    ) -> RenderFrame {
        let controls = self.input.map(raw);

        if let StepOutcome::Advanced(_) = self.vehicle.step(dt, &controls, terrain) {
            let position = self.vehicle.body().position;
            for event in self.track.update(&position, dt) {
                self.dispatch(event, services);
            }

            let gear = self.vehicle.readout().gear;
            if gear != self.gear {
                self.gear = gear;
                services.audio.cue(AudioCue::GearChanged(gear));
            }

            self.camera.step(dt, self.vehicle.body());
            if self.track.progress().started {
                let lap_time = self.lap_time();
                self.recording.record(lap_time, &self.vehicle.transform());
            }
        }

        self.frame()
    }

    fn lap_time(&self) -> f32 {
        let progress = self.track.progress();
        (progress.elapsed - progress.lap_start) as f32
    }

    fn dispatch(&mut self, event: TrackEvent, services: &mut Services) {
        match event {
            TrackEvent::LapStarted => {
                self.recording.clear();
            }
            TrackEvent::CheckpointCrossed(gate) => {
                services.audio.cue(AudioCue::CheckpointCrossed(gate));
            }
            TrackEvent::LapCompleted { lap, time_ms, best } => {
                services.audio.cue(AudioCue::LapCompleted);
                self.lap_times.push(time_ms);
                debug!(lap, time_ms, best, "lap time");
                self.recording.finish(time_ms as f32 / 1000.0, &self.vehicle.transform());
                if self.ghost.as_ref().map_or(true, |ghost| time_ms < ghost.time_ms) {
                    self.ghost = Some(Ghost {
                        replay: self.recording.clone(),
                        time_ms,
                        driven: true,
                    });
                }
                if services.settings.best_time().map_or(true, |stored| time_ms < stored) {
                    info!(lap, time_ms, player = %services.settings.player_name(), "new best time");
                    services.settings.set_best_time(time_ms);
                }
                self.recording.clear();
            }
            TrackEvent::OffTrackChanged(off_track) => {
                debug!(off_track, "off track changed");
                if off_track {
                    services.audio.cue(AudioCue::OffTrack);
                }
            }
            TrackEvent::GameOver { total_ms } => {
                info!(total_ms, "game over");
                services.audio.cue(AudioCue::GameOver);
            }
        }
    }

    /// what to draw right now
    pub fn frame(&self) -> RenderFrame {
        let camera = self.camera.state();
        let ghost = self
            .ghost
            .as_ref()
            .and_then(|ghost| ghost.replay.transform_at(self.lap_time()));

        RenderFrame {
            body: self.vehicle.transform(),
            car_render: self.vehicle.render_transform(),
            view: self.camera.view_matrix(),
            eye: camera.eye,
            target: camera.target,
            wheel_compression: self.vehicle.wheel_compression(),
            ghost,
            readout: self.vehicle.readout(),
        }
    }
}
