//! Recording of a driven lap, played back as a ghost car.

extern crate nalgebra as na;

use na::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// 30 samples a second is plenty for a ghost
pub const DEFAULT_MIN_INTERVAL: f32 = 1.0 / 30.0;

const COLUMNS: usize = 8;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("couldn't access replay file")]
    Io(#[from] io::Error),
    #[error("malformed replay csv")]
    Csv(#[from] csv::Error),
    #[error("replay row {row}: {reason}")]
    BadRow { row: usize, reason: String },
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ReplaySample {
    /// seconds since the recording started
    pub time: f32,
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Replay {
    samples: Vec<ReplaySample>,
    min_interval: f32,
}

impl Default for Replay {
    fn default() -> Replay {
        Replay::new(DEFAULT_MIN_INTERVAL)
    }
}

impl Replay {
    pub fn new(min_interval: f32) -> Replay {
        Replay {
            samples: vec![],
            min_interval: min_interval.max(0.0),
        }
    }

    pub fn samples(&self) -> &[ReplaySample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// time of the last sample
    pub fn duration(&self) -> f32 {
        self.samples.last().map_or(0.0, |s| s.time)
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Add a sample unless it comes too soon after the previous one. Returns whether it was
    /// kept. Time must not run backwards.
    pub fn record(&mut self, time: f32, transform: &Isometry3<f32>) -> bool {
        if !time.is_finite() {
            return false;
        }
        if let Some(last) = self.samples.last() {
            if time < last.time + self.min_interval || time <= last.time {
                return false;
            }
        }
        self.samples.push(ReplaySample {
            time,
            position: transform.translation.vector,
            orientation: transform.rotation,
        });
        true
    }

    /// Close the recording with a last sample at `time`, however soon after the previous one,
    /// so `duration` matches the driven time. Returns false if time ran backwards.
    pub fn finish(&mut self, time: f32, transform: &Isometry3<f32>) -> bool {
        if !time.is_finite() || self.samples.last().map_or(false, |last| time <= last.time) {
            return false;
        }
        self.samples.push(ReplaySample {
            time,
            position: transform.translation.vector,
            orientation: transform.rotation,
        });
        true
    }

    /// Interpolated pose at `time`, holding the first and last pose outside the recording.
    pub fn transform_at(&self, time: f32) -> Option<Isometry3<f32>> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        if !(time > first.time) {
            return Some(pose(first.position, first.orientation));
        }
        if time >= last.time {
            return Some(pose(last.position, last.orientation));
        }

        // first sample strictly after `time`, never 0 or len() after the checks above
        let after = self.samples.iter().position(|s| s.time > time)?;
        let a = &self.samples[after - 1];
        let b = &self.samples[after];
        let t = (time - a.time) / (b.time - a.time);

        let position = a.position.lerp(&b.position, t);
        let orientation = a
            .orientation
            .try_slerp(&b.orientation, t, 1e-6)
            .unwrap_or(if t < 0.5 { a.orientation } else { b.orientation });
        Some(pose(position, orientation))
    }

    /// rows of time, position xyz, orientation quaternion ijkw
    pub fn write_csv<W: io::Write>(&self, writer: W) -> Result<(), ReplayError> {
        let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);
        for sample in &self.samples {
            let p = sample.position;
            let q = sample.orientation.quaternion();
            #[rustfmt::skip]
            let row = [
                sample.time,
                p.x, p.y, p.z,
                q.i, q.j, q.k, q.w,
            ].iter().map(|x| x.to_string()).collect::<Vec<_>>();
            wtr.write_record(&row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn read_csv<R: io::Read>(reader: R, min_interval: f32) -> Result<Replay, ReplayError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(false).from_reader(reader);
        let mut replay = Replay::new(min_interval);
        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() != COLUMNS {
                return Err(ReplayError::BadRow {
                    row,
                    reason: format!("expected {} columns, found {}", COLUMNS, record.len()),
                });
            }
            let mut values = [0.0f32; COLUMNS];
            for (i, value) in values.iter_mut().enumerate() {
                let field = record.get(i).unwrap_or("");
                *value = field.trim().parse().map_err(|_| ReplayError::BadRow {
                    row,
                    reason: format!("can't parse '{}' as a number", field),
                })?;
                if !value.is_finite() {
                    return Err(ReplayError::BadRow {
                        row,
                        reason: "non finite value".to_owned(),
                    });
                }
            }

            let time = values[0];
            if replay.samples.last().map_or(false, |last| time <= last.time) {
                return Err(ReplayError::BadRow {
                    row,
                    reason: format!("time {} does not increase", time),
                });
            }
            let q = Quaternion::new(values[7], values[4], values[5], values[6]);
            let orientation = UnitQuaternion::try_new(q, 1e-6).ok_or_else(|| ReplayError::BadRow {
                row,
                reason: "zero orientation quaternion".to_owned(),
            })?;
            // stored samples were already thinned when recorded, keep them all
            replay.samples.push(ReplaySample {
                time,
                position: Vector3::new(values[1], values[2], values[3]),
                orientation,
            });
        }
        debug!(samples = replay.len(), "loaded replay");
        Ok(replay)
    }

    pub fn save(&self, path: &Path) -> Result<(), ReplayError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        self.write_csv(fs::File::create(path)?)
    }

    pub fn load(path: &Path) -> Result<Replay, ReplayError> {
        Replay::read_csv(fs::File::open(path)?, DEFAULT_MIN_INTERVAL)
    }
}

fn pose(position: Vector3<f32>, orientation: UnitQuaternion<f32>) -> Isometry3<f32> {
    Isometry3::from_parts(Translation3::from(position), orientation)
}
