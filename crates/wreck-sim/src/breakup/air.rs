//! Air fragment motion: gravity plus quadratic drag toward a terminal
//! speed, and a decaying roll around the flight axis.

use wreck_core::constants::MIN_PITCH_AXIS;
use wreck_core::types::{unit_or_zero, DQuat, DVec3, Pose};

#[derive(Debug, Clone, PartialEq)]
pub struct AirMotion {
    /// Flight velocity.
    pub fvel: DVec3,
    /// Tangential roll velocity, perpendicular to the flight direction.
    pub tvel: DVec3,
    pub terminal_speed: f64,
    /// rad/s, at spawn.
    pub roll_speed: f64,
    pub roll_radius: f64,
}

impl AirMotion {
    pub fn new(
        velocity: DVec3,
        orientation: DQuat,
        terminal_speed: f64,
        roll_speed: f64,
        roll_radius: f64,
    ) -> Self {
        let fdir = unit_or_zero(velocity);
        let tdir = unit_or_zero((orientation * DVec3::X).cross(fdir));
        Self {
            fvel: velocity,
            tvel: tdir * (roll_speed * roll_radius),
            terminal_speed,
            roll_speed,
            roll_radius,
        }
    }

    pub fn speed(&self) -> f64 {
        self.fvel.length()
    }

    /// Advance by `dt`. `rd` is the elapsed fraction of the lifetime and
    /// drives the roll decay. A non-positive `dt` leaves everything as is.
    pub fn step(&mut self, pose: &mut Pose, dt: f64, rd: f64, gravity: DVec3) {
        if dt <= 0.0 {
            return;
        }
        let fvel = self.fvel;
        let fspeed = fvel.length();
        let fdir = unit_or_zero(fvel);

        let mut absdracc = if self.terminal_speed > 0.0 {
            gravity.length() * (fspeed * fspeed) / (self.terminal_speed * self.terminal_speed)
        } else {
            f64::INFINITY
        };
        // Drag may slow the fragment but never reverse it within one step.
        if fspeed - absdracc * dt < 0.0 {
            absdracc = fspeed / dt * 0.5;
        }
        let facc = gravity - fdir * absdracc;
        let dfpos = fvel * dt + facc * (0.5 * dt * dt);
        let fvel1 = fvel + facc * dt;
        let fdir1 = unit_or_zero(fvel1);

        let (dtpos, dtquat, tvel1) =
            if self.roll_speed != 0.0 && self.roll_radius != 0.0 && fdir != DVec3::ZERO {
                let decay = (1.0 - rd).powi(2);
                let roll_speed1 = self.roll_speed * decay;
                let roll_radius1 = self.roll_radius * decay;
                let sign = (self.roll_speed * self.roll_radius).signum();
                let tdir = unit_or_zero(self.tvel) * sign;
                let dtquat = DQuat::from_axis_angle(fdir, roll_speed1 * dt);
                let tdir1p = dtquat * tdir;
                let tdir1 = unit_or_zero(fdir1.cross(tdir1p).cross(fdir1));
                (self.tvel * dt, dtquat, tdir1 * (roll_speed1 * roll_radius1))
            } else {
                (DVec3::ZERO, DQuat::IDENTITY, DVec3::ZERO)
            };

        pose.position += dfpos + dtpos;

        let cross = fdir.cross(fdir1);
        let dfquat = if cross.length() > MIN_PITCH_AXIS {
            DQuat::from_axis_angle(cross.normalize(), fdir.angle_between(fdir1))
        } else {
            DQuat::IDENTITY
        };
        pose.orientation = (dtquat * dfquat * pose.orientation).normalize();

        self.fvel = fvel1;
        self.tvel = tvel1;
    }
}
