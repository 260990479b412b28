//! Interfaces to the services the simulation core talks to but does not implement.

use crate::{AudioCue, RenderFrame, TerrainSample};

/// Height and surface normal under a world space (x, z) position. None means there is no
/// terrain there, which wheels treat as being in the air.
pub trait TerrainQuery {
    fn sample(&self, x: f32, z: f32) -> Option<TerrainSample>;
}

impl<F> TerrainQuery for F
where
    F: Fn(f32, f32) -> Option<TerrainSample>,
{
    fn sample(&self, x: f32, z: f32) -> Option<TerrainSample> {
        self(x, z)
    }
}

/// Persisted player settings. The storage format belongs to the implementor.
pub trait SettingsStore {
    fn best_time(&self) -> Option<u32>;
    fn set_best_time(&mut self, time_ms: u32);
    fn player_name(&self) -> String;
}

/// Fire and forget sound triggers, must never block.
pub trait AudioSink {
    fn cue(&mut self, cue: AudioCue);
}

impl AudioSink for Vec<AudioCue> {
    fn cue(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

pub trait RenderSink {
    fn submit(&mut self, frame: &RenderFrame);
}
