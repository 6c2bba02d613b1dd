//! HeightGrid: regular heightmap with bilinear elevation queries.

use wreck_core::types::DVec3;

use crate::surface::Surface;

/// Height grid header metadata.
#[derive(Debug, Clone)]
pub struct TerrainHeader {
    /// West edge x coordinate (meters).
    pub origin_x: f64,
    /// South edge y coordinate (meters).
    pub origin_y: f64,
    /// Cell edge length (meters).
    pub cell_size: f64,
    /// Number of columns (west to east).
    pub width: u32,
    /// Number of rows (north to south).
    pub height: u32,
}

impl TerrainHeader {
    /// North edge y coordinate (meters).
    pub fn north_y(&self) -> f64 {
        self.origin_y + (self.height.saturating_sub(1)) as f64 * self.cell_size
    }

    /// East edge x coordinate (meters).
    pub fn east_x(&self) -> f64 {
        self.origin_x + (self.width.saturating_sub(1)) as f64 * self.cell_size
    }
}

/// Heightmap sampled at cell corners.
///
/// Outside the grid the surface continues at `outside_elevation`.
#[derive(Debug, Clone)]
pub struct HeightGrid {
    pub header: TerrainHeader,
    /// Elevation values in meters, row-major (north-to-south, west-to-east).
    pub elevations: Vec<f32>,
    pub outside_elevation: f64,
}

impl HeightGrid {
    pub fn new(header: TerrainHeader, elevations: Vec<f32>) -> Self {
        Self {
            header,
            elevations,
            outside_elevation: 0.0,
        }
    }

    pub fn with_outside_elevation(mut self, elevation: f64) -> Self {
        self.outside_elevation = elevation;
        self
    }

    /// Convert a sim-space position to grid row/col (fractional).
    /// Returns None if outside grid bounds.
    fn to_grid(&self, x: f64, y: f64) -> Option<(f64, f64)> {
        let h = &self.header;
        if h.width == 0 || h.height == 0 || h.cell_size <= 0.0 {
            return None;
        }

        // Column: west-to-east
        let col = (x - h.origin_x) / h.cell_size;
        // Row: north-to-south (row 0 = north edge)
        let row = (h.north_y() - y) / h.cell_size;

        let max_row = (h.height - 1) as f64;
        let max_col = (h.width - 1) as f64;
        if col < 0.0 || row < 0.0 || col > max_col || row > max_row {
            return None;
        }

        Some((row, col))
    }

    /// Get raw elevation at integer grid coordinates.
    fn raw_elevation(&self, row: usize, col: usize) -> f64 {
        let h = &self.header;
        if row >= h.height as usize || col >= h.width as usize {
            return self.outside_elevation;
        }
        self.elevations
            .get(row * h.width as usize + col)
            .map_or(self.outside_elevation, |&e| e as f64)
    }

    /// Elevation at a sim-space position with bilinear interpolation.
    /// Returns None if the position is outside the grid.
    pub fn elevation_at(&self, x: f64, y: f64) -> Option<f64> {
        let (row, col) = self.to_grid(x, y)?;
        Some(self.bilinear(row, col))
    }

    /// Bilinear interpolation at fractional row/col.
    fn bilinear(&self, row: f64, col: f64) -> f64 {
        let r0 = row.floor() as usize;
        let c0 = col.floor() as usize;
        let r1 = (r0 + 1).min(self.header.height as usize - 1);
        let c1 = (c0 + 1).min(self.header.width as usize - 1);

        let fr = row - r0 as f64;
        let fc = col - c0 as f64;

        let e00 = self.raw_elevation(r0, c0);
        let e01 = self.raw_elevation(r0, c1);
        let e10 = self.raw_elevation(r1, c0);
        let e11 = self.raw_elevation(r1, c1);

        let top = e00 * (1.0 - fc) + e01 * fc;
        let bot = e10 * (1.0 - fc) + e11 * fc;
        top * (1.0 - fr) + bot * fr
    }

    fn elevation_or_outside(&self, x: f64, y: f64) -> f64 {
        self.elevation_at(x, y).unwrap_or(self.outside_elevation)
    }
}

impl Surface for HeightGrid {
    fn elevation_normal(&self, point: DVec3) -> (f64, DVec3) {
        let e = self.elevation_or_outside(point.x, point.y);
        // Central differences over half a cell.
        let d = 0.5 * self.header.cell_size.max(f64::EPSILON);
        let dzdx = (self.elevation_or_outside(point.x + d, point.y)
            - self.elevation_or_outside(point.x - d, point.y))
            / (2.0 * d);
        let dzdy = (self.elevation_or_outside(point.x, point.y + d)
            - self.elevation_or_outside(point.x, point.y - d))
            / (2.0 * d);
        let normal = DVec3::new(-dzdx, -dzdy, 1.0).normalize();
        (e, normal)
    }

    fn elevation(&self, point: DVec3) -> f64 {
        self.elevation_or_outside(point.x, point.y)
    }
}
