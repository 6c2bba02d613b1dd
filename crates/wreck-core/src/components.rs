//! ECS components for hecs entities.
//!
//! Components are plain data structs with no methods.
//! Game logic lives in systems, not components.

use serde::{Deserialize, Serialize};

use crate::enums::BodyFamily;
use crate::types::{BodyId, DVec3, EffectHandle, SoundHandle};

/// Identity of a damageable body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyInfo {
    pub id: BodyId,
    pub name: String,
    /// Damage archetype name (e.g. "bomber").
    pub archetype: String,
    pub family: BodyFamily,
}

/// Linear velocity in world space (m/s).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Velocity(pub DVec3);

/// Ambient engine/rotor sound bound to a body, stopped on full failure.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AmbientSound(pub SoundHandle);

/// Cosmetic effects owned by a body (exhaust, damage fire), released on full failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OwnedEffects {
    pub handles: Vec<EffectHandle>,
}
