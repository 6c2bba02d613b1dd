//! Fragment integration system: ages, moves and expires breakup parts.

use std::collections::HashSet;

use hecs::{Entity, World};

use wreck_core::events::SimEvent;
use wreck_core::types::BodyId;

use crate::breakup::{BreakupPart, PartStep, StepEnv};
use crate::effects::EffectLedger;
use crate::scene::Scene;

/// Advance every live fragment by one tick.
///
/// `live_bodies` decides the "until the parent is gone" lifetimes.
pub fn run(
    world: &mut World,
    env: &StepEnv,
    live_bodies: &HashSet<BodyId>,
    scene: &mut dyn Scene,
    effects: &mut EffectLedger,
    events: &mut Vec<SimEvent>,
    despawn_buffer: &mut Vec<Entity>,
) {
    despawn_buffer.clear();

    for (entity, part) in world.query_mut::<&mut BreakupPart>() {
        match part.advance(env, live_bodies.contains(&part.source)) {
            PartStep::Done(reason) => {
                for handle in part.live_trails() {
                    effects.release(handle, events);
                }
                scene.release_fragment(part.id);
                log::debug!("fragment {:?} ended: {:?}", part.id, reason);
                events.push(SimEvent::FragmentExpired {
                    fragment: part.id,
                    reason,
                });
                despawn_buffer.push(entity);
            }
            PartStep::Moved {
                came_to_rest,
                released_trails,
            } => {
                for handle in released_trails {
                    effects.release(handle, events);
                }
                scene.set_fragment_transform(part.id, part.pose);
                for (handle, pose) in part.follower_poses() {
                    scene.set_node_transform(part.source, handle, pose);
                }
                if came_to_rest {
                    events.push(SimEvent::FragmentAtRest {
                        fragment: part.id,
                        position: part.pose.position,
                    });
                }
            }
        }
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}
