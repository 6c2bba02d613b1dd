//! Entity spawn factories for setting up the simulation world.
//!
//! Creates body entities with their damage, motion and ownership
//! components, and places breakup parts into the world.

use std::sync::Arc;

use hecs::{Entity, World};

use wreck_core::components::{AmbientSound, BodyInfo, OwnedEffects, Velocity};
use wreck_core::error::ConfigError;
use wreck_core::types::BodyId;
use wreck_damage::{DamageProfile, DamageState};

use crate::body::{BodySpec, Damage};
use crate::breakup::BreakupPart;

/// Spawn a damageable body. The profile is validated first, so a
/// malformed table fails here and nothing is spawned.
pub fn spawn_body(
    world: &mut World,
    id: BodyId,
    profile: Arc<dyn DamageProfile>,
    spec: &BodySpec,
) -> Result<Entity, ConfigError> {
    let table = profile.table();
    table.validate()?;
    let hitboxes = table.build_hitboxes()?;

    let info = BodyInfo {
        id,
        name: spec.name.clone(),
        archetype: table.name.clone(),
        family: spec.family,
    };
    let damage = Damage {
        profile: Arc::clone(&profile),
        hitboxes,
        state: DamageState::default(),
    };

    let entity = world.spawn((
        info,
        spec.pose,
        Velocity(spec.velocity),
        damage,
        OwnedEffects::default(),
    ));
    if let Some(sound) = spec.ambient_sound {
        let _ = world.insert_one(entity, AmbientSound(sound));
    }
    Ok(entity)
}

/// Place parts created during a tick into the world.
pub fn spawn_parts(world: &mut World, parts: &mut Vec<BreakupPart>) {
    for part in parts.drain(..) {
        world.spawn((part,));
    }
}
