use na::Vector3;
use state::{TerrainQuery, TerrainSample};

/// Infinite (or square bounded) flat ground.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlatTerrain {
    pub height: f32,
    /// half size of the square around the origin that has ground. None is unbounded
    pub half_extent: Option<f32>,
}

impl FlatTerrain {
    pub fn new(height: f32) -> FlatTerrain {
        FlatTerrain {
            height,
            half_extent: None,
        }
    }
}

impl TerrainQuery for FlatTerrain {
    fn sample(&self, x: f32, z: f32) -> Option<TerrainSample> {
        if let Some(half) = self.half_extent {
            if x.abs() > half || z.abs() > half {
                return None;
            }
        }
        Some(TerrainSample::flat(self.height))
    }
}

/// Regular grid of heights. Column index runs along x, row index along z, starting at `origin`.
/// Positions outside the grid have no terrain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HeightField {
    pub origin: (f32, f32),
    pub cell_size: f32,
    pub columns: usize,
    pub rows: usize,
    pub heights: Vec<f32>,
}

impl HeightField {
    /// None if the dimensions don't match the heights or the grid is smaller than 2x2
    pub fn new(
        origin: (f32, f32),
        cell_size: f32,
        columns: usize,
        rows: usize,
        heights: Vec<f32>,
    ) -> Option<HeightField> {
        if columns < 2 || rows < 2 || columns * rows != heights.len() || !(cell_size > 0.0) {
            return None;
        }
        Some(HeightField {
            origin,
            cell_size,
            columns,
            rows,
            heights,
        })
    }

    /// build a grid by evaluating `f` at each grid point's world (x, z)
    pub fn from_fn<F: Fn(f32, f32) -> f32>(
        origin: (f32, f32),
        cell_size: f32,
        columns: usize,
        rows: usize,
        f: F,
    ) -> Option<HeightField> {
        let mut heights = Vec::with_capacity(columns * rows);
        for row in 0..rows {
            for column in 0..columns {
                let x = origin.0 + column as f32 * cell_size;
                let z = origin.1 + row as f32 * cell_size;
                heights.push(f(x, z));
            }
        }
        HeightField::new(origin, cell_size, columns, rows, heights)
    }

    fn height_at(&self, column: usize, row: usize) -> f32 {
        self.heights[column + row * self.columns]
    }

    /// bilinear height, None outside the grid
    pub fn height(&self, x: f32, z: f32) -> Option<f32> {
        let fx = (x - self.origin.0) / self.cell_size;
        let fz = (z - self.origin.1) / self.cell_size;
        let max_x = (self.columns - 1) as f32;
        let max_z = (self.rows - 1) as f32;
        if !(fx >= 0.0 && fz >= 0.0 && fx <= max_x && fz <= max_z) {
            return None;
        }

        let x0 = (fx.floor() as usize).min(self.columns - 2);
        let z0 = (fz.floor() as usize).min(self.rows - 2);
        let tx = fx - x0 as f32;
        let tz = fz - z0 as f32;

        let h00 = self.height_at(x0, z0);
        let h10 = self.height_at(x0 + 1, z0);
        let h01 = self.height_at(x0, z0 + 1);
        let h11 = self.height_at(x0 + 1, z0 + 1);
        let a = h00 * (1.0 - tx) + h10 * tx;
        let b = h01 * (1.0 - tx) + h11 * tx;
        Some(a * (1.0 - tz) + b * tz)
    }

    /// central difference normal, falling back to one sided differences at the edges
    pub fn normal(&self, x: f32, z: f32) -> Option<Vector3<f32>> {
        let center = self.height(x, z)?;
        let d = self.cell_size;
        let hx0 = self.height(x - d, z).unwrap_or(center);
        let hx1 = self.height(x + d, z).unwrap_or(center);
        let hz0 = self.height(x, z - d).unwrap_or(center);
        let hz1 = self.height(x, z + d).unwrap_or(center);

        let ddx = (hx1 - hx0) / (2.0 * d);
        let ddz = (hz1 - hz0) / (2.0 * d);
        Vector3::new(-ddx, 1.0, -ddz).try_normalize(1e-6)
    }
}

impl TerrainQuery for HeightField {
    fn sample(&self, x: f32, z: f32) -> Option<TerrainSample> {
        let height = self.height(x, z)?;
        let normal = self.normal(x, z)?;
        Some(TerrainSample { height, normal })
    }
}
