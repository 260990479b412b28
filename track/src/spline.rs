use na::{Vector2, Vector3};
use state::ConfigError;

pub const MIN_CHECKPOINTS: usize = 3;
const MIN_GATE_SPACING: f32 = 1e-3;

/// Closed loop of checkpoint positions, with a constant track half width. Only the ground
/// plane (x, z) matters for distances, height is carried along for drawing and spawning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackSpline {
    points: Vec<Vector3<f32>>,
    half_width: f32,
}

fn flat(v: &Vector3<f32>) -> Vector2<f32> {
    Vector2::new(v.x, v.z)
}

impl TrackSpline {
    pub fn new(points: Vec<Vector3<f32>>, half_width: f32) -> Result<TrackSpline, ConfigError> {
        if points.len() < MIN_CHECKPOINTS {
            return Err(ConfigError::TooFewCheckpoints {
                count: points.len(),
                required: MIN_CHECKPOINTS,
            });
        }
        if !(half_width > 0.0) || !half_width.is_finite() {
            return Err(ConfigError::NonPositive {
                name: "track half width",
                value: half_width,
            });
        }
        if points.iter().any(|p| p.iter().any(|c| !c.is_finite())) {
            return Err(ConfigError::NotFinite { name: "checkpoint position" });
        }
        for i in 0..points.len() {
            let j = (i + 1) % points.len();
            if (flat(&points[j]) - flat(&points[i])).norm() < MIN_GATE_SPACING {
                return Err(ConfigError::DuplicateCheckpoint(i, j));
            }
        }

        Ok(TrackSpline { points, half_width })
    }

    /// evenly spaced checkpoints on an ellipse around `center`, driven counter clockwise when
    /// seen from above (+x toward +z)
    pub fn oval(
        center: Vector3<f32>,
        radius_x: f32,
        radius_z: f32,
        checkpoints: usize,
        half_width: f32,
    ) -> Result<TrackSpline, ConfigError> {
        let points = (0..checkpoints)
            .map(|i| {
                let angle = std::f32::consts::PI * 2.0 * i as f32 / checkpoints as f32;
                center + Vector3::new(radius_x * angle.cos(), 0.0, radius_z * angle.sin())
            })
            .collect();
        TrackSpline::new(points, half_width)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn half_width(&self) -> f32 {
        self.half_width
    }

    pub fn points(&self) -> &[Vector3<f32>] {
        &self.points
    }

    pub fn point(&self, index: usize) -> Vector3<f32> {
        self.points[index % self.points.len()]
    }

    /// ground plane direction of travel through checkpoint `index`, the gate's normal
    pub fn direction(&self, index: usize) -> Vector2<f32> {
        let n = self.points.len();
        let before = flat(&self.points[(index + n - 1) % n]);
        let after = flat(&self.points[(index + 1) % n]);
        (after - before)
            .try_normalize(1e-6)
            .or_else(|| (after - flat(&self.point(index))).try_normalize(1e-6))
            .unwrap_or_else(Vector2::x)
    }

    /// signed distance of `position` in front of gate `index`
    pub fn gate_distance(&self, index: usize, position: &Vector3<f32>) -> f32 {
        (flat(position) - flat(&self.point(index))).dot(&self.direction(index))
    }

    /// did moving from `from` to `to` pass gate `index` in the direction of travel, within the
    /// track width?
    pub fn crosses_gate(&self, index: usize, from: &Vector3<f32>, to: &Vector3<f32>) -> bool {
        let before = self.gate_distance(index, from);
        let after = self.gate_distance(index, to);
        if !(before < 0.0 && after >= 0.0) {
            return false;
        }
        let t = before / (before - after);
        let crossing = flat(from) + (flat(to) - flat(from)) * t;
        (crossing - flat(&self.point(index))).norm() <= self.half_width
    }

    /// index of the segment from checkpoint i to i + 1 closest to `position`, and the ground
    /// plane distance to it
    pub fn nearest_segment(&self, position: &Vector3<f32>) -> (usize, f32) {
        let p = flat(position);
        let n = self.points.len();
        let mut best = (0, std::f32::INFINITY);
        for i in 0..n {
            let a = flat(&self.points[i]);
            let b = flat(&self.points[(i + 1) % n]);
            let distance = distance_to_segment(&p, &a, &b);
            if distance < best.1 {
                best = (i, distance);
            }
        }
        best
    }

    pub fn is_on_track(&self, position: &Vector3<f32>) -> bool {
        self.nearest_segment(position).1 <= self.half_width
    }

    pub fn length(&self) -> f32 {
        let n = self.points.len();
        (0..n)
            .map(|i| (flat(&self.points[(i + 1) % n]) - flat(&self.points[i])).norm())
            .sum()
    }
}

fn distance_to_segment(p: &Vector2<f32>, a: &Vector2<f32>, b: &Vector2<f32>) -> f32 {
    let ab = b - a;
    let length_squared = ab.norm_squared();
    let t = if length_squared > 0.0 {
        ((p - a).dot(&ab) / length_squared).max(0.0).min(1.0)
    } else {
        0.0
    };
    (p - (a + ab * t)).norm()
}
