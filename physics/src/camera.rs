use na::{Matrix4, Point3, Vector3};
use state::{CameraConfig, CameraState, ConfigError, RigidBodyState};

use crate::spring::SpringDamper1D;

/// Third person camera trailing the car.
///
/// The eye chases a point fixed in the car's frame using an exact critically damped step, so
/// it lags behind sharp turns, never overshoots when starting from rest, and never lands
/// exactly on the desired point after a sudden change.
#[derive(Clone, Debug)]
pub struct ChaseCamera {
    config: CameraConfig,
    state: CameraState,
    pitch_sway: SpringDamper1D,
    last_speed: Option<f32>,
}

impl ChaseCamera {
    pub fn new(config: CameraConfig) -> Result<ChaseCamera, ConfigError> {
        config.validate()?;
        Ok(ChaseCamera {
            config,
            state: CameraState::default(),
            pitch_sway: SpringDamper1D::from_config(&config.pitch_sway)?,
            last_speed: None,
        })
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn eye(&self) -> Point3<f32> {
        self.state.eye
    }

    pub fn target(&self) -> Point3<f32> {
        self.state.target
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        self.state.view_matrix()
    }

    /// where the eye wants to be: the configured offset in the car's frame
    pub fn desired_eye(&self, body: &RigidBodyState) -> Point3<f32> {
        body.transform() * Point3::from(self.config.offset)
    }

    fn look_target(&self, body: &RigidBodyState) -> Point3<f32> {
        let lead = body.velocity * self.config.look_ahead_time;
        let height = self.config.target_height + self.pitch_sway.position;
        Point3::from(body.position + lead + Vector3::y() * height)
    }

    /// jump straight to the desired position, e.g. at the start of a race
    pub fn snap_to(&mut self, body: &RigidBodyState) {
        self.pitch_sway.reset();
        self.last_speed = None;
        self.state = CameraState {
            eye: self.desired_eye(body),
            target: self.look_target(body),
            up: Vector3::y(),
            offset_velocity: Vector3::zeros(),
        };
    }

    pub fn step(&mut self, dt: f32, body: &RigidBodyState) {
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }

        let speed = body.velocity.norm();
        if let Some(last_speed) = self.last_speed {
            self.pitch_sway
                .change_position((speed - last_speed) * self.config.pitch_sway_gain);
        }
        self.last_speed = Some(speed);
        self.pitch_sway.step(dt);

        let desired = self.desired_eye(body);
        let omega = 2.0 / self.config.lag;
        let decay = (-omega * dt).exp();

        let x = self.state.eye - desired;
        let v = self.state.offset_velocity;
        let temp = (v + x * omega) * dt;
        self.state.offset_velocity = (v - temp * omega) * decay;
        self.state.eye = desired + (x + temp) * decay;

        self.state.target = self.look_target(body);
        self.state.up = Vector3::y();
    }
}
