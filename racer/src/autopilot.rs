use na::Vector3;
use state::{RawInput, RigidBodyState};
use track::TrackSpline;

/// Drives the car through the gates in order: steers at the next gate, blending toward the
/// one after it when close, and lifts off when too fast for the corner ahead.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Autopilot {
    pub cruise_speed: f32,
    pub corner_speed: f32,
    pub steer_gain: f32,
    /// distance to the next gate at which the aim starts moving on to the gate after
    pub blend_distance: f32,
}

impl Default for Autopilot {
    fn default() -> Autopilot {
        Autopilot {
            cruise_speed: 24.0,
            corner_speed: 14.0,
            steer_gain: 2.5,
            blend_distance: 20.0,
        }
    }
}

/// angle from the car's nose to `target` in the ground plane, positive to the right
pub fn heading_error(body: &RigidBodyState, target: &Vector3<f32>) -> f32 {
    let offset = target - body.position;
    offset.dot(&body.right()).atan2(offset.dot(&body.forward()))
}

impl Autopilot {
    pub fn drive(&self, body: &RigidBodyState, track: &TrackSpline, next_gate: usize) -> RawInput {
        let gate = track.point(next_gate);
        let after = track.point(next_gate + 1);
        let distance = (gate - body.position).xz().norm();
        let blend = (1.0 - distance / self.blend_distance).max(0.0).min(1.0) * 0.5;
        let target = gate.lerp(&after, blend);

        let error = heading_error(body, &target);
        let steer = (self.steer_gain * error).max(-1.0).min(1.0);

        let speed = body.local_velocity().z;
        let limit = self.corner_speed + (self.cruise_speed - self.corner_speed) * (1.0 - steer.abs());
        let (throttle, brake) = if speed > limit + 3.0 {
            (0.0, 0.5)
        } else if speed > limit {
            (0.0, 0.0)
        } else {
            (1.0, 0.0)
        };

        RawInput {
            steer,
            throttle,
            brake,
            handbrake: false,
        }
    }
}
