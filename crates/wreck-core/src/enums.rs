//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Simulation run state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    #[default]
    Active,
    Paused,
}

/// Broad class of a body, deciding which breakup motion model applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyFamily {
    Plane,
    Heli,
    Vehicle,
    #[default]
    Building,
    Ship,
}

impl BodyFamily {
    /// Whether bodies of this family are normally airborne.
    pub fn is_airborne(self) -> bool {
        matches!(self, BodyFamily::Plane | BodyFamily::Heli)
    }
}

/// Cosmetic effect profile requested from the effects collaborator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectProfile {
    /// Large explosion with fire and smoke.
    Explosion,
    /// Small explosion.
    #[default]
    MinorExplosion,
    /// Lingering fire and smoke column on a damaged body.
    FireAndSmoke,
    /// Smoke trail following a fragment.
    SmokeTrail,
    /// Fire trail following a fragment.
    FireTrail,
}

/// Motion model of a breakup fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FragmentKind {
    Air,
    Ground,
}

/// Why a fragment stopped being simulated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FragmentEnd {
    /// Elapsed time exceeded the sampled duration.
    Expired,
    /// The body it was tied to ("until parent dies") is gone.
    ParentGone,
    /// Removed explicitly (world teardown).
    Removed,
}
