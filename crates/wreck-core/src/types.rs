//! Fundamental geometric, identity and simulation-time types.
//!
//! Simulation space is Cartesian meters: x = East, y = North, z = Up.
//! Body-local frames use x = right, y = forward, z = up.

use serde::{Deserialize, Serialize};

pub use glam::{DQuat, DVec3};

/// Stable identifier of a damageable body, assigned at spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

/// Identifier of a live breakup fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FragmentId(pub u32);

/// Handle of a spawned cosmetic effect (explosion, fire, trail).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectHandle(pub u32);

/// Handle of an ambient sound owned by a body (engine, rotor).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SoundHandle(pub u32);

/// Simulation time tracking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SimTime {
    /// Current tick number (increments by 1 each tick).
    pub tick: u64,
    /// Elapsed simulation time in seconds.
    pub elapsed_secs: f64,
}

impl SimTime {
    /// Advance by one tick of `dt` seconds.
    pub fn advance(&mut self, dt: f64) {
        self.tick += 1;
        self.elapsed_secs += dt;
    }
}

/// Unit vector in the direction of `v`, or zero for a degenerate vector.
pub fn unit_or_zero(v: DVec3) -> DVec3 {
    v.try_normalize().unwrap_or(DVec3::ZERO)
}

/// Unit direction from heading and pitch in radians, in the local frame
/// (heading 0 = forward, positive heading turns left, pitch positive up).
pub fn direction_from_heading_pitch(heading: f64, pitch: f64) -> DVec3 {
    let (sh, ch) = heading.sin_cos();
    let (sp, cp) = pitch.sin_cos();
    DVec3::new(-sh * cp, ch * cp, sp)
}

/// Position and orientation of a body or fragment in world space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: DVec3,
    pub orientation: DQuat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            orientation: DQuat::IDENTITY,
        }
    }
}

impl Pose {
    pub fn new(position: DVec3, orientation: DQuat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    pub fn at(position: DVec3) -> Self {
        Self::new(position, DQuat::IDENTITY)
    }

    /// World-space point of a body-local offset.
    pub fn point(&self, local: DVec3) -> DVec3 {
        self.position + self.orientation * local
    }

    /// World-space direction of a body-local vector.
    pub fn vector(&self, local: DVec3) -> DVec3 {
        self.orientation * local
    }

    /// Body-local offset of a world-space point.
    pub fn to_local(&self, world: DVec3) -> DVec3 {
        self.orientation.inverse() * (world - self.position)
    }

    /// Body forward axis in world space.
    pub fn forward(&self) -> DVec3 {
        self.orientation * DVec3::Y
    }
}
