use na::{Isometry3, Translation3, UnitQuaternion, Vector3};
use physics::HeightField;
use state::{ConfigError, TerrainQuery};
use track::TrackSpline;

const GRID_HALF_SIZE: f32 = 240.0;
const GRID_CELL: f32 = 2.0;

/// Terrain plus the track laid on top of it.
#[derive(Clone, Debug)]
pub struct Course {
    pub terrain: HeightField,
    pub track: TrackSpline,
}

fn rolling_hills(x: f32, z: f32) -> f32 {
    1.5 * (x / 40.0).sin() * (z / 35.0).cos() + 0.4 * (z / 13.0).sin()
}

impl Course {
    /// gently rolling oval, about 640 m around
    pub fn oval() -> Result<Course, ConfigError> {
        let cells = (2.0 * GRID_HALF_SIZE / GRID_CELL) as usize + 1;
        let terrain = HeightField::from_fn(
            (-GRID_HALF_SIZE, -GRID_HALF_SIZE),
            GRID_CELL,
            cells,
            cells,
            rolling_hills,
        )
        .ok_or(ConfigError::NonPositive {
            name: "terrain size",
            value: 0.0,
        })?;

        let flat = TrackSpline::oval(Vector3::zeros(), 120.0, 80.0, 16, 12.0)?;
        let points = flat
            .points()
            .iter()
            .map(|p| Vector3::new(p.x, terrain.height(p.x, p.z).unwrap_or(0.0), p.z))
            .collect();
        let track = TrackSpline::new(points, flat.half_width())?;

        Ok(Course { terrain, track })
    }

    /// a few meters behind the start/finish line, facing down the track, standing on the terrain
    pub fn start_pose(&self, ride_height: f32) -> Isometry3<f32> {
        start_pose(&self.track, &self.terrain, ride_height)
    }
}

pub fn start_pose<T: TerrainQuery + ?Sized>(
    track: &TrackSpline,
    terrain: &T,
    ride_height: f32,
) -> Isometry3<f32> {
    let line = track.len() - 1;
    let gate = track.point(line);
    let direction = track.direction(line);
    let x = gate.x - direction.x * 8.0;
    let z = gate.z - direction.y * 8.0;
    let ground = terrain.sample(x, z).map_or(gate.y, |s| s.height);

    // yaw that turns the car's +z onto the track direction
    let yaw = direction.x.atan2(direction.y);
    Isometry3::from_parts(
        Translation3::new(x, ground + ride_height, z),
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), yaw),
    )
}
