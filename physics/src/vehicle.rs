use na::{Isometry3, Matrix3, Quaternion, UnitQuaternion, Vector3};
use state::*;
use tracing::{trace, warn};

use crate::sway::BodySway;
use crate::wheel::{update_wheel, WheelDrive};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BodyMode {
    /// at least one wheel touches the terrain
    Grounded,
    /// only gravity, drag and angular damping act
    Airborne,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SkipReason {
    InvalidTimeStep(f32),
    InvalidControls(ControlSignal),
    /// integration produced NaN/inf, most likely from terrain data
    NonFiniteResult,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum StepOutcome {
    Advanced(BodyMode),
    Skipped(SkipReason),
}

impl StepOutcome {
    pub fn is_skipped(&self) -> bool {
        match *self {
            StepOutcome::Skipped(_) => true,
            StepOutcome::Advanced(_) => false,
        }
    }
}

/// The car: a rigid body on four suspended wheels. Owns its state exclusively; everything
/// else only reads it.
#[derive(Clone, Debug)]
pub struct VehicleBody {
    config: VehicleConfig,
    body: RigidBodyState,
    wheels: [WheelState; WHEEL_COUNT],
    mode: BodyMode,
    sway: BodySway,
    readout: DriveReadout,
}

impl VehicleBody {
    pub fn new(config: VehicleConfig, start: Isometry3<f32>) -> Result<VehicleBody, ConfigError> {
        config.validate()?;
        let sway = BodySway::new(config.sway)?;
        let mut vehicle = VehicleBody {
            config,
            body: RigidBodyState::at_rest(Vector3::zeros(), config.mass, config.inertia),
            wheels: [
                WheelState::new(config.wheels[0]),
                WheelState::new(config.wheels[1]),
                WheelState::new(config.wheels[2]),
                WheelState::new(config.wheels[3]),
            ],
            mode: BodyMode::Airborne,
            sway,
            readout: DriveReadout::default(),
        };
        vehicle.reset(start);
        Ok(vehicle)
    }

    /// put the car at `pose`, standing still with the suspension fully extended
    pub fn reset(&mut self, pose: Isometry3<f32>) {
        self.body = RigidBodyState::at_rest(pose.translation.vector, self.config.mass, self.config.inertia);
        self.body.orientation = pose.rotation;
        for wheel in self.wheels.iter_mut() {
            wheel.lift_off();
        }
        self.mode = BodyMode::Airborne;
        self.sway.reset();
        self.readout = DriveReadout::default();
    }

    /// overwrite the body's velocities, keeping its pose
    pub fn set_motion(&mut self, velocity: Vector3<f32>, angular_velocity: Vector3<f32>) {
        self.body.velocity = velocity;
        self.body.angular_velocity = angular_velocity;
    }

    pub fn config(&self) -> &VehicleConfig {
        &self.config
    }

    pub fn body(&self) -> &RigidBodyState {
        &self.body
    }

    pub fn wheels(&self) -> &[WheelState; WHEEL_COUNT] {
        &self.wheels
    }

    pub fn mode(&self) -> BodyMode {
        self.mode
    }

    pub fn readout(&self) -> DriveReadout {
        self.readout
    }

    pub fn transform(&self) -> Isometry3<f32> {
        self.body.transform()
    }

    /// transform for drawing the car, including the visual sway
    pub fn render_transform(&self) -> Isometry3<f32> {
        let mut transform = self.body.transform();
        transform.rotation = transform.rotation * self.sway.rotation();
        transform
    }

    pub fn wheel_compression(&self) -> [f32; WHEEL_COUNT] {
        let mut compression = [0.0; WHEEL_COUNT];
        for (c, wheel) in compression.iter_mut().zip(self.wheels.iter()) {
            *c = wheel.compression;
        }
        compression
    }

    /// Advance the car by `dt` seconds. Invalid input leaves the car untouched and is reported
    /// through the outcome rather than an error, so the frame loop just keeps going.
    pub fn step<T: TerrainQuery + ?Sized>(
        &mut self,
        dt: f32,
        controls: &ControlSignal,
        terrain: &T,
    ) -> StepOutcome {
        if !dt.is_finite() || dt <= 0.0 {
            warn!(dt, "skipping vehicle step, invalid time step");
            return StepOutcome::Skipped(SkipReason::InvalidTimeStep(dt));
        }
        if !controls.is_valid() {
            warn!(?controls, "skipping vehicle step, invalid controls");
            return StepOutcome::Skipped(SkipReason::InvalidControls(*controls));
        }

        let start = self.body;
        let mut body = self.body;
        let mut wheels = self.wheels;
        let drive = self.wheel_drive(controls);

        let mut force = Vector3::zeros();
        let mut torque = Vector3::zeros();
        let mut contacts = 0;
        for wheel in wheels.iter_mut() {
            let contribution = update_wheel(wheel, &start, &drive, terrain, dt);
            force += contribution.force;
            torque += contribution.torque();
            if wheel.in_contact {
                contacts += 1;
            }
        }
        let mode = if contacts > 0 {
            BodyMode::Grounded
        } else {
            BodyMode::Airborne
        };

        let speed = start.velocity.norm();
        force += self.config.gravity * self.config.mass;
        force -= self.config.drag_coefficient * speed * start.velocity;

        // semi-implicit euler: velocity first, then position with the new velocity
        let acceleration = force / self.config.mass;
        body.velocity += dt * acceleration;
        body.position += dt * body.velocity;

        let rotation = start.orientation.to_rotation_matrix().into_inner();
        let inverse_inertia = Matrix3::from_diagonal(&self.config.inertia.map(|i| 1.0 / i));
        let inverse_inertia_world = rotation * inverse_inertia * rotation.transpose();
        body.angular_velocity += dt * (inverse_inertia_world * torque);
        body.angular_velocity *= (1.0 - self.config.angular_damping * dt).max(0.0);

        // q' = q + dt/2 * w * q, renormalized so the rotation doesn't drift
        let q = body.orientation.into_inner();
        let spin = Quaternion::from_imag(body.angular_velocity) * q * (0.5 * dt);
        body.orientation = UnitQuaternion::new_normalize(q + spin);

        let speed = body.velocity.norm();
        if speed > self.config.max_speed {
            body.velocity *= self.config.max_speed / speed;
        }
        let angular_speed = body.angular_velocity.norm();
        if angular_speed > self.config.max_angular_speed {
            body.angular_velocity *= self.config.max_angular_speed / angular_speed;
        }

        if !body.is_finite() {
            warn!(?body, "skipping vehicle step, integration diverged");
            return StepOutcome::Skipped(SkipReason::NonFiniteResult);
        }

        let forward_acceleration = (body.velocity - start.velocity).dot(&start.forward()) / dt;
        self.body = body;
        self.wheels = wheels;
        self.mode = mode;
        self.sway.update(dt, &body.local_velocity());
        self.readout = drive_readout(&self.config, body.velocity.norm(), forward_acceleration);

        trace!(?mode, speed = self.readout.speed, "vehicle step");
        StepOutcome::Advanced(mode)
    }

    fn wheel_drive(&self, controls: &ControlSignal) -> WheelDrive {
        let config = &self.config;
        let speed_fraction = (self.body.velocity.norm() / config.max_speed).min(1.0);
        // less steering lock at speed, otherwise the car spins out on every twitch
        let steer_scale = 1.0 - (1.0 - config.high_speed_steer_factor) * speed_fraction;
        let driven = config.wheels.iter().filter(|w| w.driven).count().max(1);

        WheelDrive {
            steer_angle: controls.steering * config.max_steer_angle * steer_scale,
            throttle: controls.throttle,
            brake: controls.brake,
            handbrake: controls.handbrake,
            drive_force: config.drive_force / driven as f32,
            drive_slip_speed: config.drive_slip_speed,
            handbrake_grip: config.handbrake_grip,
        }
    }
}

/// dashboard values: gear goes up every fifth of the top speed, the motor meter mixes speed
/// and how hard the car is accelerating
pub fn drive_readout(config: &VehicleConfig, speed: f32, forward_acceleration: f32) -> DriveReadout {
    let speed_fraction = (speed / config.max_speed).max(0.0).min(1.0);
    let gear = (1 + (GEAR_COUNT as f32 * speed_fraction) as u8).min(GEAR_COUNT);
    let max_acceleration = (config.drive_force / config.mass).max(1e-3);
    let acceleration_fraction = (forward_acceleration / max_acceleration).max(0.0).min(1.0);

    DriveReadout {
        speed,
        speed_mph: speed * METERS_PER_SEC_TO_MPH,
        gear,
        motor_meter: (0.5 * speed_fraction + 0.5 * acceleration_fraction).min(1.0),
    }
}
