//! Cleanup system: body and fragment teardown.
//!
//! Every step here tolerates things already being gone.

use hecs::{Entity, World};

use wreck_core::components::{AmbientSound, BodyInfo, OwnedEffects};
use wreck_core::enums::FragmentEnd;
use wreck_core::events::SimEvent;

use crate::body::Damage;
use crate::breakup::BreakupPart;
use crate::effects::EffectLedger;
use crate::scene::Scene;

/// Remove a body: unregister its hitboxes, drop its model, release what it
/// still owns and despawn the entity.
pub fn despawn_body(
    world: &mut World,
    entity: Entity,
    scene: &mut dyn Scene,
    effects: &mut EffectLedger,
    events: &mut Vec<SimEvent>,
) {
    let body = match world.query_one_mut::<(&BodyInfo, &mut Damage)>(entity) {
        Ok((info, damage)) => {
            damage.hitboxes.destroy_all();
            info.id
        }
        Err(_) => return,
    };
    if let Ok(AmbientSound(sound)) = world.remove_one::<AmbientSound>(entity) {
        events.push(SimEvent::AmbientSoundStopped { body, sound });
    }
    if let Ok(owned) = world.remove_one::<OwnedEffects>(entity) {
        for handle in owned.handles {
            effects.release(handle, events);
        }
    }
    scene.remove_model(body);
    let _ = world.despawn(entity);
    log::info!("body {:?} removed", body);
}

/// Remove every fragment at once (world teardown).
pub fn remove_fragments(
    world: &mut World,
    scene: &mut dyn Scene,
    effects: &mut EffectLedger,
    events: &mut Vec<SimEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    let mut parts: Vec<(Entity, &BreakupPart)> = world.query_mut::<&BreakupPart>().into_iter().collect();
    parts.sort_by_key(|(_, part)| part.id);
    for (entity, part) in parts {
        for handle in part.live_trails() {
            effects.release(handle, events);
        }
        scene.release_fragment(part.id);
        events.push(SimEvent::FragmentExpired {
            fragment: part.id,
            reason: FragmentEnd::Removed,
        });
        despawn_buffer.push(entity);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
