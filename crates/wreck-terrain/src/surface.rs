//! Surface query contract.

use wreck_core::types::DVec3;

/// Terrain elevation service.
///
/// `offset` raises (positive) or lowers the effective surface, used for
/// fragments that should settle slightly above or below the real terrain.
pub trait Surface: Send + Sync {
    /// Terrain elevation and unit surface normal below a point.
    fn elevation_normal(&self, point: DVec3) -> (f64, DVec3);

    /// Terrain elevation below a point.
    fn elevation(&self, point: DVec3) -> f64 {
        self.elevation_normal(point).0
    }

    /// Height of `point` above the offset surface (negative when underground).
    fn altitude(&self, point: DVec3, offset: f64) -> f64 {
        point.z - self.elevation(point) - offset
    }

    fn below_surface(&self, point: DVec3, offset: f64) -> bool {
        self.altitude(point, offset) < 0.0
    }

    /// Point where the segment `a → b` meets the offset surface.
    ///
    /// The crossing is found by linear interpolation of the altitude at both
    /// ends, then placed exactly on the surface at that horizontal location.
    fn intersect_surface(&self, a: DVec3, b: DVec3, offset: f64) -> DVec3 {
        let alt_a = self.altitude(a, offset);
        let alt_b = self.altitude(b, offset);
        let span = alt_a - alt_b;
        let f = if span.abs() > f64::EPSILON {
            (alt_a / span).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let mut p = a + (b - a) * f;
        p.z = self.elevation(p) + offset;
        p
    }
}

/// Level ground at a fixed elevation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FlatSurface {
    pub elevation: f64,
}

impl FlatSurface {
    pub fn new(elevation: f64) -> Self {
        Self { elevation }
    }
}

impl Surface for FlatSurface {
    fn elevation_normal(&self, _point: DVec3) -> (f64, DVec3) {
        (self.elevation, DVec3::Z)
    }
}
