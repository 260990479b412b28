extern crate nalgebra as na;
#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod error;
pub mod services;

pub use config::*;
pub use error::ConfigError;
pub use services::*;

use na::{Isometry3, Matrix4, Point3, Translation3, UnitQuaternion, Vector3};

pub const GRAVITY: f32 = 9.81; // m/s2
pub const METERS_PER_SEC_TO_MPH: f32 = 2.237;
pub const WHEEL_COUNT: usize = 4;
pub const GEAR_COUNT: u8 = 5;

/// body frame: +z forward, +y up. right hand side of the car is -x
pub fn local_forward() -> Vector3<f32> {
    Vector3::z()
}

pub fn local_up() -> Vector3<f32> {
    Vector3::y()
}

pub fn local_right() -> Vector3<f32> {
    -Vector3::x()
}

/// Normalized driver controls for a single frame. Steering +1.0 is full right.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ControlSignal {
    pub steering: f32,
    pub throttle: f32,
    pub brake: f32,
    pub handbrake: bool,
}

impl ControlSignal {
    pub fn idle() -> ControlSignal {
        ControlSignal::default()
    }

    pub fn is_valid(&self) -> bool {
        self.steering.is_finite()
            && self.throttle.is_finite()
            && self.brake.is_finite()
            && self.steering.abs() <= 1.0
            && (0.0..=1.0).contains(&self.throttle)
            && (0.0..=1.0).contains(&self.brake)
    }
}

/// Device state as read, before deadzones or smoothing. Values may be anything, including NaN.
#[derive(Copy, Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct RawInput {
    /// -1.0 full left, +1.0 full right
    pub steer: f32,
    pub throttle: f32,
    pub brake: f32,
    pub handbrake: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RigidBodyState {
    pub position: Vector3<f32>,
    pub orientation: UnitQuaternion<f32>,
    pub velocity: Vector3<f32>,
    pub angular_velocity: Vector3<f32>,
    pub mass: f32,
    /// diagonal inertia tensor in body space
    pub inertia: Vector3<f32>,
}

impl RigidBodyState {
    pub fn at_rest(position: Vector3<f32>, mass: f32, inertia: Vector3<f32>) -> RigidBodyState {
        RigidBodyState {
            position,
            orientation: UnitQuaternion::identity(),
            velocity: Vector3::zeros(),
            angular_velocity: Vector3::zeros(),
            mass,
            inertia,
        }
    }

    pub fn forward(&self) -> Vector3<f32> {
        self.orientation * local_forward()
    }

    pub fn up(&self) -> Vector3<f32> {
        self.orientation * local_up()
    }

    pub fn right(&self) -> Vector3<f32> {
        self.orientation * local_right()
    }

    /// velocity in the body frame
    pub fn local_velocity(&self) -> Vector3<f32> {
        self.orientation.inverse() * self.velocity
    }

    /// velocity of a point rigidly attached to the body, `offset` being its world space offset
    /// from the center of mass
    pub fn point_velocity(&self, offset: &Vector3<f32>) -> Vector3<f32> {
        self.velocity + self.angular_velocity.cross(offset)
    }

    pub fn transform(&self) -> Isometry3<f32> {
        Isometry3::from_parts(Translation3::from(self.position), self.orientation)
    }

    pub fn is_finite(&self) -> bool {
        let q = self.orientation.quaternion();
        self.position.iter().all(|c| c.is_finite())
            && self.velocity.iter().all(|c| c.is_finite())
            && self.angular_velocity.iter().all(|c| c.is_finite())
            && q.coords.iter().all(|c| c.is_finite())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelState {
    pub config: WheelConfig,
    /// 0.0 is fully extended, config.max_travel is bottomed out
    pub compression: f32,
    pub slip_ratio: f32,
    pub contact_normal: Vector3<f32>,
    pub normal_force: f32,
    pub in_contact: bool,
    /// world space traction force applied to the body during the last step
    pub traction: Vector3<f32>,
}

impl WheelState {
    pub fn new(config: WheelConfig) -> WheelState {
        WheelState {
            config,
            compression: 0.0,
            slip_ratio: 0.0,
            contact_normal: Vector3::y(),
            normal_force: 0.0,
            in_contact: false,
            traction: Vector3::zeros(),
        }
    }

    pub fn lift_off(&mut self) {
        self.compression = 0.0;
        self.slip_ratio = 0.0;
        self.contact_normal = Vector3::y();
        self.normal_force = 0.0;
        self.in_contact = false;
        self.traction = Vector3::zeros();
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    /// velocity of the eye's offset from where it wants to be
    pub offset_velocity: Vector3<f32>,
}

impl CameraState {
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.eye, &self.target, &self.up)
    }
}

impl Default for CameraState {
    fn default() -> CameraState {
        CameraState {
            eye: Point3::new(0.0, 2.0, -6.0),
            target: Point3::origin(),
            up: Vector3::y(),
            offset_velocity: Vector3::zeros(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct LapProgress {
    /// number of completed laps, also the 0-based index of the lap being driven
    pub lap: u32,
    /// false until the car first crosses the start/finish line, the lap timer is stopped
    pub started: bool,
    /// last validly crossed checkpoint, None when checkpoint 0 is expected next
    pub last_checkpoint: Option<usize>,
    /// seconds since the race started
    pub elapsed: f64,
    pub lap_start: f64,
    pub last_lap_ms: Option<u32>,
    pub best_lap_ms: Option<u32>,
    pub off_track: bool,
    pub game_over: bool,
}

impl LapProgress {
    pub fn elapsed_ms(&self) -> u32 {
        seconds_to_ms(self.elapsed)
    }

    pub fn current_lap_ms(&self) -> u32 {
        seconds_to_ms(self.elapsed - self.lap_start)
    }

    /// next checkpoint once the lap timer runs. before that the car has to reach the
    /// start/finish line, see `track::TrackProgress::next_checkpoint`
    pub fn next_checkpoint(&self) -> usize {
        self.last_checkpoint.map_or(0, |i| i + 1)
    }
}

pub fn seconds_to_ms(seconds: f64) -> u32 {
    (seconds.max(0.0) * 1000.0).round() as u32
}

/// what the dashboard shows: speed, gear and motor meter
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DriveReadout {
    pub speed: f32,
    pub speed_mph: f32,
    pub gear: u8,
    pub motor_meter: f32,
}

impl Default for DriveReadout {
    fn default() -> DriveReadout {
        DriveReadout {
            speed: 0.0,
            speed_mph: 0.0,
            gear: 1,
            motor_meter: 0.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TerrainSample {
    pub height: f32,
    pub normal: Vector3<f32>,
}

impl TerrainSample {
    pub fn flat(height: f32) -> TerrainSample {
        TerrainSample {
            height,
            normal: Vector3::y(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AudioCue {
    CheckpointCrossed(usize),
    LapCompleted,
    GearChanged(u8),
    OffTrack,
    GameOver,
}

/// everything a renderer needs for one frame. physics never renders anything itself.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderFrame {
    pub body: Isometry3<f32>,
    /// body transform with the visual pitch/roll sway applied
    pub car_render: Isometry3<f32>,
    pub view: Matrix4<f32>,
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub wheel_compression: [f32; WHEEL_COUNT],
    pub ghost: Option<Isometry3<f32>>,
    pub readout: DriveReadout,
}
