use na::{UnitQuaternion, Vector3};
use state::{ConfigError, SwayConfig};

use crate::spring::SpringDamper1D;

/// Purely visual pitch and roll of the car body. Speed changes kick the springs, which then
/// swing back to level. Never feeds back into the physics.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BodySway {
    config: SwayConfig,
    pub pitch: SpringDamper1D,
    pub roll: SpringDamper1D,
    last_local_velocity: Option<Vector3<f32>>,
}

impl BodySway {
    pub fn new(config: SwayConfig) -> Result<BodySway, ConfigError> {
        Ok(BodySway {
            config,
            pitch: SpringDamper1D::from_config(&config.spring)?,
            roll: SpringDamper1D::from_config(&config.spring)?,
            last_local_velocity: None,
        })
    }

    pub fn reset(&mut self) {
        self.pitch.reset();
        self.roll.reset();
        self.last_local_velocity = None;
    }

    /// `local_velocity` is the body frame velocity after this frame's physics step
    pub fn update(&mut self, dt: f32, local_velocity: &Vector3<f32>) {
        if let Some(last) = self.last_local_velocity {
            let delta = local_velocity - last;
            // speeding up lifts the nose, sliding leans the body out of the turn
            self.pitch.change_position(delta.z * self.config.pitch_gain);
            self.roll.change_position(delta.x * self.config.roll_gain);
        }
        self.last_local_velocity = Some(*local_velocity);

        self.pitch.step(dt);
        self.roll.step(dt);

        let max = self.config.max_angle;
        self.pitch.position = self.pitch.position.max(-max).min(max);
        self.roll.position = self.roll.position.max(-max).min(max);
    }

    /// body space rotation to apply on top of the physics orientation when rendering.
    /// positive pitch is nose up
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::from_axis_angle(&Vector3::x_axis(), -self.pitch.position)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.roll.position)
    }
}
