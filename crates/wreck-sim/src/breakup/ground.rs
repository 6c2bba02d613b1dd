//! Ground fragment motion: ballistic flight, terrain bounce with separate
//! normal/tangential restitution, and tumble about a fixed axis.

use wreck_core::types::{unit_or_zero, DQuat, DVec3, Pose};
use wreck_terrain::Surface;

#[derive(Debug, Clone, PartialEq)]
pub struct GroundMotion {
    pub velocity: DVec3,
    /// World-space unit axis.
    pub tumble_axis: DVec3,
    /// rad/s.
    pub tumble_speed: f64,
    pub normal_restitution: f64,
    pub tangent_restitution: f64,
    pub tumble_restitution: f64,
    /// Surface offset used for every terrain query.
    pub fix_elevation: f64,
    pub at_rest: bool,
}

/// What one ground step did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GroundStep {
    pub touched: bool,
    /// Speed just before and just after the bounce, when touched.
    pub impact_speed: f64,
    pub rebound_speed: f64,
    /// The fragment came to rest during this step.
    pub came_to_rest: bool,
}

impl GroundMotion {
    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    pub fn step(
        &mut self,
        pose: &mut Pose,
        dt: f64,
        gravity: DVec3,
        surface: &dyn Surface,
        rest_speed: f64,
    ) -> GroundStep {
        let mut result = GroundStep::default();
        if self.at_rest || dt <= 0.0 {
            return result;
        }

        let pos = pose.position;
        let mut pos1 = pos + self.velocity * dt + gravity * (0.5 * dt * dt);
        let mut vel1 = self.velocity + gravity * dt;

        if surface.below_surface(pos1, self.fix_elevation) {
            result.touched = true;
            result.impact_speed = vel1.length();

            let gpos = surface.intersect_surface(pos, pos1, self.fix_elevation);
            let (_, normal) = surface.elevation_normal(gpos);
            pos1 -= normal * ((pos1 - gpos).dot(normal) * 2.0);

            // Mirror the end-of-step velocity off the surface, then damp each
            // component. The velocity is not rewound to the crossing point.
            let reflected = vel1 - normal * (vel1.dot(normal) * 2.0);
            let vn = normal * reflected.dot(normal);
            let vt = reflected - vn;
            vel1 = vn * self.normal_restitution + vt * self.tangent_restitution;
            result.rebound_speed = vel1.length();

            if vel1.length() < rest_speed {
                pos1 = gpos;
                vel1 = DVec3::ZERO;
                self.at_rest = true;
                result.came_to_rest = true;
                result.rebound_speed = 0.0;
            }
            self.tumble_speed *= self.tumble_restitution;
        }
        pose.position = pos1;
        self.velocity = vel1;

        let axis = if self.tumble_axis == DVec3::ZERO {
            DVec3::Z
        } else {
            unit_or_zero(self.tumble_axis)
        };
        let dquat = DQuat::from_axis_angle(axis, self.tumble_speed * dt);
        pose.orientation = (dquat * pose.orientation).normalize();

        result
    }
}
