use na::Vector3;
use state::{seconds_to_ms, ConfigError, LapProgress, RaceConfig};
use tracing::{debug, info, warn};

use crate::spline::TrackSpline;

/// Things that happened during one `TrackProgress::update`. The caller turns them into sound
/// cues and settings writes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TrackEvent {
    /// first crossing of the start/finish line, the lap timer starts here
    LapStarted,
    CheckpointCrossed(usize),
    /// `lap` counts completed laps, starting at 1
    LapCompleted { lap: u32, time_ms: u32, best: bool },
    OffTrackChanged(bool),
    GameOver { total_ms: u32 },
}

/// Lap timer and checkpoint cursor for one car on one track.
///
/// The last checkpoint is the start/finish line. The lap timer starts when the car first crosses
/// it, then checkpoints must be passed in order and crossing the line again completes the lap,
/// so every lap covers the whole circuit. Once the race is over nothing changes anymore.
#[derive(Clone, Debug)]
pub struct TrackProgress {
    spline: TrackSpline,
    race: RaceConfig,
    progress: LapProgress,
    last_position: Option<Vector3<f32>>,
}

impl TrackProgress {
    pub fn new(spline: TrackSpline, race: RaceConfig) -> Result<TrackProgress, ConfigError> {
        race.validate()?;
        Ok(TrackProgress {
            spline,
            race,
            progress: LapProgress::default(),
            last_position: None,
        })
    }

    pub fn spline(&self) -> &TrackSpline {
        &self.spline
    }

    pub fn progress(&self) -> &LapProgress {
        &self.progress
    }

    pub fn is_game_over(&self) -> bool {
        self.progress.game_over
    }

    /// index of the start/finish line
    pub fn finish_line(&self) -> usize {
        self.spline.len() - 1
    }

    /// the gate the car has to pass next, the start/finish line until the timer runs
    pub fn next_checkpoint(&self) -> usize {
        if self.progress.started {
            self.progress.next_checkpoint()
        } else {
            self.finish_line()
        }
    }

    /// position of the gate the car has to pass next
    pub fn next_gate(&self) -> Vector3<f32> {
        self.spline.point(self.next_checkpoint())
    }

    /// start over, keeping the best lap time
    pub fn reset(&mut self) {
        let best_lap_ms = self.progress.best_lap_ms;
        self.progress = LapProgress {
            best_lap_ms,
            ..LapProgress::default()
        };
        self.last_position = None;
    }

    /// best lap time known from earlier sessions, e.g. from the settings store
    pub fn set_best_lap(&mut self, best_lap_ms: Option<u32>) {
        self.progress.best_lap_ms = best_lap_ms;
    }

    pub fn update(&mut self, position: &Vector3<f32>, dt: f32) -> Vec<TrackEvent> {
        let mut events = vec![];
        if self.progress.game_over {
            return events;
        }
        if !dt.is_finite() || dt < 0.0 || position.iter().any(|c| !c.is_finite()) {
            warn!(dt, ?position, "ignoring track update with invalid input");
            return events;
        }

        self.progress.elapsed += dt as f64;
        if !self.progress.started {
            self.progress.lap_start = self.progress.elapsed;
        }

        if let Some(last_position) = self.last_position {
            let gate = self.next_checkpoint();
            if self.spline.crosses_gate(gate, &last_position, position) {
                if !self.progress.started {
                    debug!(elapsed = self.progress.elapsed, "lap timer started");
                    self.progress.started = true;
                    events.push(TrackEvent::LapStarted);
                } else {
                    debug!(gate, "checkpoint crossed");
                    events.push(TrackEvent::CheckpointCrossed(gate));
                    if gate == self.finish_line() {
                        events.push(self.complete_lap());
                    } else {
                        self.progress.last_checkpoint = Some(gate);
                    }
                }
            }
        }
        self.last_position = Some(*position);

        let off_track = !self.spline.is_on_track(position);
        if off_track != self.progress.off_track {
            self.progress.off_track = off_track;
            events.push(TrackEvent::OffTrackChanged(off_track));
        }

        let laps_done = self.race.lap_limit.map_or(false, |limit| self.progress.lap >= limit);
        let out_of_time = self
            .race
            .time_limit
            .map_or(false, |limit| self.progress.elapsed >= limit as f64);
        if laps_done || out_of_time {
            self.progress.game_over = true;
            let total_ms = self.progress.elapsed_ms();
            info!(total_ms, laps = self.progress.lap, "race over");
            events.push(TrackEvent::GameOver { total_ms });
        }

        events
    }

    fn complete_lap(&mut self) -> TrackEvent {
        let progress = &mut self.progress;
        let time_ms = seconds_to_ms(progress.elapsed - progress.lap_start);
        let best = progress.best_lap_ms.map_or(true, |best| time_ms < best);
        if best {
            progress.best_lap_ms = Some(time_ms);
        }
        progress.last_lap_ms = Some(time_ms);
        progress.lap += 1;
        progress.lap_start = progress.elapsed;
        progress.last_checkpoint = None;
        info!(lap = progress.lap, time_ms, best, "lap completed");

        TrackEvent::LapCompleted {
            lap: progress.lap,
            time_ms,
            best,
        }
    }
}
