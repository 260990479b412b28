use na::{UnitQuaternion, Vector3};
use state::{RigidBodyState, TerrainQuery, WheelState, WHEEL_COUNT};

/// below this ground speed (m/s) slip is measured against this speed instead, otherwise slip
/// blows up when standing still
pub const SLIP_EPSILON: f32 = 1.0;

/// Per-wheel view of the driver controls, already resolved by the vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelDrive {
    /// radians, positive turns right. ignored for wheels that don't steer
    pub steer_angle: f32,
    pub throttle: f32,
    pub brake: f32,
    pub handbrake: bool,
    /// engine force available to this wheel at full throttle
    pub drive_force: f32,
    pub drive_slip_speed: f32,
    /// grip multiplier applied to non steered wheels while the handbrake is pulled
    pub handbrake_grip: f32,
}

impl Default for WheelDrive {
    fn default() -> WheelDrive {
        WheelDrive {
            steer_angle: 0.0,
            throttle: 0.0,
            brake: 0.0,
            handbrake: false,
            drive_force: 0.0,
            drive_slip_speed: 0.0,
            handbrake_grip: 1.0,
        }
    }
}

/// world space force a wheel applies to the body, and where relative to the center of mass
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WheelContribution {
    pub force: Vector3<f32>,
    pub offset: Vector3<f32>,
}

impl WheelContribution {
    pub fn torque(&self) -> Vector3<f32> {
        self.offset.cross(&self.force)
    }
}

/// Suspension plus tire model for one wheel. Updates the wheel's state and returns the force
/// it puts on the body. A wheel with no terrain beneath it, or hanging above the terrain, is
/// fully extended and contributes nothing.
pub fn update_wheel<T: TerrainQuery + ?Sized>(
    wheel: &mut WheelState,
    body: &RigidBodyState,
    drive: &WheelDrive,
    terrain: &T,
    dt: f32,
) -> WheelContribution {
    let config = wheel.config;
    let offset = body.orientation * config.attachment;
    let mount = body.position + offset;
    let no_force = WheelContribution {
        force: Vector3::zeros(),
        offset,
    };

    let sample = match terrain.sample(mount.x, mount.z) {
        Some(sample) if sample.height.is_finite() => sample,
        _ => {
            wheel.lift_off();
            return no_force;
        }
    };

    let wheel_bottom = mount.y - config.rest_length - config.radius;
    let penetration = sample.height - wheel_bottom;
    if penetration <= 0.0 {
        wheel.lift_off();
        return no_force;
    }

    let normal = sample
        .normal
        .try_normalize(1e-6)
        .unwrap_or_else(Vector3::y);
    let compression = penetration.min(config.max_travel);
    let point_velocity = body.point_velocity(&offset);

    // suspension: spring on compression, damper on how fast the ground approaches
    let compression_rate = -point_velocity.dot(&normal);
    let normal_force = (config.spring_constant * compression
        + config.damping_constant * compression_rate)
        .max(0.0);

    wheel.in_contact = true;
    wheel.compression = compression;
    wheel.contact_normal = normal;
    wheel.normal_force = normal_force;

    let traction = traction_force(wheel, body, drive, &normal, &point_velocity, dt);
    wheel.traction = traction;

    WheelContribution {
        force: normal * normal_force + traction,
        offset,
    }
}

/// Coulomb style tire: force grows with slip up to grip * normal force, then saturates. The
/// result never leaves the friction circle.
fn traction_force(
    wheel: &mut WheelState,
    body: &RigidBodyState,
    drive: &WheelDrive,
    normal: &Vector3<f32>,
    point_velocity: &Vector3<f32>,
    dt: f32,
) -> Vector3<f32> {
    let config = wheel.config;

    let steer = if config.steered { drive.steer_angle } else { 0.0 };
    // positive yaw about +y turns +z toward +x, which is left
    let steer_rotation = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), -steer);
    let heading = body.orientation * (steer_rotation * state::local_forward());

    // tire axes live in the ground plane
    let forward = match (heading - normal * heading.dot(normal)).try_normalize(1e-6) {
        Some(forward) => forward,
        None => {
            // car is standing on its nose, no meaningful rolling direction
            wheel.slip_ratio = 0.0;
            return Vector3::zeros();
        }
    };
    let side = normal.cross(&forward);

    let v_long = point_velocity.dot(&forward);
    let v_lat = point_velocity.dot(&side);
    let ground_speed = (v_long * v_long + v_lat * v_lat).sqrt();

    let locked = drive.handbrake && !config.steered;
    let surface_speed = if locked {
        0.0
    } else if drive.brake > 0.0 {
        v_long * (1.0 - drive.brake)
    } else if config.driven {
        v_long + drive.throttle * drive.drive_slip_speed
    } else {
        v_long
    };

    let slip_ratio = (surface_speed - v_long) / v_long.abs().max(SLIP_EPSILON);
    wheel.slip_ratio = slip_ratio;

    let grip = if locked {
        config.grip_coefficient * drive.handbrake_grip
    } else {
        config.grip_coefficient
    };
    let limit = grip * wheel.normal_force;
    if limit <= 0.0 {
        return Vector3::zeros();
    }

    // this wheel's share of the car's mass, used to never push the contact point past zero
    // relative velocity within a single step
    let mass_share = body.mass / WHEEL_COUNT as f32;
    let dt = dt.max(1e-6);

    let mut f_long = limit * (slip_ratio / config.peak_slip).max(-1.0).min(1.0);
    if config.driven && drive.throttle > 0.0 && f_long > 0.0 {
        f_long = f_long.min(drive.drive_force * drive.throttle);
    }
    if f_long * v_long < 0.0 {
        f_long = f_long.signum() * f_long.abs().min(mass_share * v_long.abs() / dt);
    }

    let lateral_slip = v_lat / (ground_speed.max(SLIP_EPSILON) * config.peak_lateral_slip);
    let mut f_lat = -limit * lateral_slip.max(-1.0).min(1.0);
    f_lat = f_lat.signum() * f_lat.abs().min(mass_share * v_lat.abs() / dt);

    let traction = forward * f_long + side * f_lat;
    let magnitude = traction.norm();
    if magnitude > limit {
        traction * (limit / magnitude)
    } else {
        traction
    }
}
