//! Tuning data for the simulation. The defaults describe a light rear wheel drive arcade car;
//! they are a starting point for handling feel, not measurements of any real vehicle.

use na::Vector3;

use crate::error::ConfigError;
use crate::WHEEL_COUNT;

fn positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name });
    }
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { name, value });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name });
    }
    if value < 0.0 {
        return Err(ConfigError::OutOfRange { name, value, range: "[0, inf)" });
    }
    Ok(())
}

fn unit_interval(name: &'static str, value: f32, allow_zero: bool) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NotFinite { name });
    }
    let ok = if allow_zero { value >= 0.0 } else { value > 0.0 };
    if !ok || value > 1.0 {
        let range = if allow_zero { "[0, 1]" } else { "(0, 1]" };
        return Err(ConfigError::OutOfRange { name, value, range });
    }
    Ok(())
}

fn finite_vector(name: &'static str, v: &Vector3<f32>) -> Result<(), ConfigError> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { name })
    }
}

/// parameters of a 1D spring, see physics::spring
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub mass: f32,
    pub friction: f32,
    pub spring_constant: f32,
}

impl Default for SpringConfig {
    fn default() -> SpringConfig {
        SpringConfig {
            mass: 0.5,
            friction: 0.9,
            spring_constant: 1.0,
        }
    }
}

impl SpringConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("spring mass", self.mass)?;
        non_negative("spring friction", self.friction)?;
        positive("spring constant", self.spring_constant)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WheelConfig {
    /// suspension mount point in body space
    pub attachment: Vector3<f32>,
    pub rest_length: f32,
    pub max_travel: f32,
    pub radius: f32,
    /// N/m
    pub spring_constant: f32,
    /// N*s/m
    pub damping_constant: f32,
    pub grip_coefficient: f32,
    /// longitudinal slip ratio at which traction peaks
    pub peak_slip: f32,
    /// lateral slip (lateral speed over ground speed) at which cornering force peaks
    pub peak_lateral_slip: f32,
    pub driven: bool,
    pub steered: bool,
}

impl WheelConfig {
    pub fn front(attachment: Vector3<f32>) -> WheelConfig {
        WheelConfig {
            attachment,
            steered: true,
            driven: false,
            ..WheelConfig::default()
        }
    }

    pub fn rear(attachment: Vector3<f32>) -> WheelConfig {
        WheelConfig {
            attachment,
            steered: false,
            driven: true,
            ..WheelConfig::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        finite_vector("wheel attachment", &self.attachment)?;
        positive("suspension rest length", self.rest_length)?;
        positive("suspension max travel", self.max_travel)?;
        positive("wheel radius", self.radius)?;
        positive("suspension spring constant", self.spring_constant)?;
        non_negative("suspension damping constant", self.damping_constant)?;
        positive("grip coefficient", self.grip_coefficient)?;
        positive("peak slip", self.peak_slip)?;
        positive("peak lateral slip", self.peak_lateral_slip)
    }
}

impl Default for WheelConfig {
    fn default() -> WheelConfig {
        WheelConfig {
            attachment: Vector3::zeros(),
            rest_length: 0.35,
            max_travel: 0.3,
            radius: 0.35,
            spring_constant: 32_000.0,
            damping_constant: 4_000.0,
            grip_coefficient: 1.2,
            peak_slip: 0.15,
            peak_lateral_slip: 0.2,
            driven: false,
            steered: false,
        }
    }
}

/// visual pitch/roll swing of the car body, driven by acceleration
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwayConfig {
    pub spring: SpringConfig,
    /// radians of pitch per m/s of forward speed change
    pub pitch_gain: f32,
    /// radians of roll per m/s of lateral speed change
    pub roll_gain: f32,
    /// sway never exceeds this many radians in either direction
    pub max_angle: f32,
}

impl Default for SwayConfig {
    fn default() -> SwayConfig {
        SwayConfig {
            spring: SpringConfig {
                mass: 0.5,
                friction: 4.0,
                spring_constant: 12.0,
            },
            pitch_gain: 0.004,
            roll_gain: 0.006,
            max_angle: 0.12,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    /// kg
    pub mass: f32,
    /// diagonal body space inertia: x is the pitch axis, y yaw, z roll
    pub inertia: Vector3<f32>,
    pub gravity: Vector3<f32>,
    /// m/s
    pub max_speed: f32,
    /// rad/s
    pub max_angular_speed: f32,
    /// aerodynamic drag, force = drag_coefficient * speed^2
    pub drag_coefficient: f32,
    /// fraction of angular velocity lost per second
    pub angular_damping: f32,
    /// total engine force split across driven wheels, N
    pub drive_force: f32,
    /// how far ahead of the ground speed driven wheels spin at full throttle, m/s
    pub drive_slip_speed: f32,
    /// radians at full steering lock
    pub max_steer_angle: f32,
    /// steering lock is scaled down toward this fraction at top speed
    pub high_speed_steer_factor: f32,
    /// grip multiplier for the non steered wheels while the handbrake is pulled
    pub handbrake_grip: f32,
    pub wheels: [WheelConfig; WHEEL_COUNT],
    pub sway: SwayConfig,
}

pub const DEFAULT_MAX_SPEED: f32 = 62.5; // ~140 mph
pub const DEFAULT_CAR_MASS: f32 = 1000.0;
pub const DEFAULT_DRIVE_FORCE: f32 = 9_000.0;

impl Default for VehicleConfig {
    fn default() -> VehicleConfig {
        VehicleConfig {
            mass: DEFAULT_CAR_MASS,
            inertia: Vector3::new(1_633.0, 1_740.0, 433.0),
            gravity: Vector3::new(0.0, -crate::GRAVITY, 0.0),
            max_speed: DEFAULT_MAX_SPEED,
            max_angular_speed: 6.0,
            drag_coefficient: 0.4,
            angular_damping: 0.5,
            drive_force: DEFAULT_DRIVE_FORCE,
            drive_slip_speed: 6.0,
            max_steer_angle: 0.5,
            high_speed_steer_factor: 0.35,
            handbrake_grip: 0.45,
            wheels: [
                WheelConfig::front(Vector3::new(0.8, -0.3, 1.3)),
                WheelConfig::front(Vector3::new(-0.8, -0.3, 1.3)),
                WheelConfig::rear(Vector3::new(0.8, -0.3, -1.3)),
                WheelConfig::rear(Vector3::new(-0.8, -0.3, -1.3)),
            ],
            sway: SwayConfig::default(),
        }
    }
}

impl VehicleConfig {
    /// scales the default car like the car selection did: top speed, mass and engine force
    /// relative to the defaults
    pub fn with_car_type(speed_factor: f32, mass_factor: f32, drive_factor: f32) -> VehicleConfig {
        let base = VehicleConfig::default();
        VehicleConfig {
            max_speed: base.max_speed * speed_factor,
            mass: base.mass * mass_factor,
            inertia: base.inertia * mass_factor,
            drive_force: base.drive_force * drive_factor,
            ..base
        }
    }

    /// distance from the body origin down to the ground when the suspension is fully extended
    pub fn ride_height(&self) -> f32 {
        self.wheels
            .iter()
            .map(|w| -w.attachment.y + w.rest_length + w.radius)
            .fold(0.0, f32::max)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("vehicle mass", self.mass)?;
        if !self.inertia.iter().all(|c| c.is_finite() && *c > 0.0) {
            return Err(ConfigError::NonPositive {
                name: "vehicle inertia",
                value: self.inertia.min(),
            });
        }
        finite_vector("gravity", &self.gravity)?;
        positive("max speed", self.max_speed)?;
        positive("max angular speed", self.max_angular_speed)?;
        non_negative("drag coefficient", self.drag_coefficient)?;
        non_negative("angular damping", self.angular_damping)?;
        non_negative("drive force", self.drive_force)?;
        non_negative("drive slip speed", self.drive_slip_speed)?;
        non_negative("max steer angle", self.max_steer_angle)?;
        unit_interval("high speed steer factor", self.high_speed_steer_factor, false)?;
        unit_interval("handbrake grip", self.handbrake_grip, true)?;
        for wheel in &self.wheels {
            wheel.validate()?;
        }
        self.sway.spring.validate()?;
        non_negative("sway max angle", self.sway.max_angle)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CameraConfig {
    /// desired eye position in body space, behind and above the car
    pub offset: Vector3<f32>,
    /// time constant of the critically damped follow, seconds
    pub lag: f32,
    /// target leads the car by this many seconds of its velocity
    pub look_ahead_time: f32,
    /// look at a point this far above the body origin
    pub target_height: f32,
    pub pitch_sway: SpringConfig,
    /// vertical target shift per m/s of speed change
    pub pitch_sway_gain: f32,
}

impl Default for CameraConfig {
    fn default() -> CameraConfig {
        CameraConfig {
            offset: Vector3::new(0.0, 2.5, -7.0),
            lag: 0.25,
            look_ahead_time: 0.15,
            target_height: 1.0,
            pitch_sway: SpringConfig::default(),
            pitch_sway_gain: 0.02,
        }
    }
}

impl CameraConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        finite_vector("camera offset", &self.offset)?;
        positive("camera lag", self.lag)?;
        non_negative("camera look ahead time", self.look_ahead_time)?;
        if !self.target_height.is_finite() || !self.pitch_sway_gain.is_finite() {
            return Err(ConfigError::NotFinite { name: "camera target" });
        }
        self.pitch_sway.validate()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// analog values with a magnitude below this snap to zero
    pub deadzone: f32,
    /// exponential moving average factor, 1.0 disables smoothing
    pub smoothing: f32,
}

impl Default for InputConfig {
    fn default() -> InputConfig {
        InputConfig {
            deadzone: 0.1,
            smoothing: 0.35,
        }
    }
}

impl InputConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.deadzone.is_finite() || self.deadzone < 0.0 || self.deadzone >= 1.0 {
            return Err(ConfigError::OutOfRange {
                name: "input deadzone",
                value: self.deadzone,
                range: "[0, 1)",
            });
        }
        unit_interval("input smoothing", self.smoothing, false)
    }
}

/// when a race ends
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RaceConfig {
    pub lap_limit: Option<u32>,
    /// seconds
    pub time_limit: Option<f32>,
}

impl Default for RaceConfig {
    fn default() -> RaceConfig {
        RaceConfig {
            lap_limit: Some(3),
            time_limit: None,
        }
    }
}

impl RaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(0) = self.lap_limit {
            return Err(ConfigError::NonPositive { name: "lap limit", value: 0.0 });
        }
        if let Some(limit) = self.time_limit {
            positive("time limit", limit)?;
        }
        Ok(())
    }
}
