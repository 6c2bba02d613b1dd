//! Snapshot system: queries the ECS world and builds a complete WorldSnapshot.
//!
//! This system is read-only; it never modifies the world.

use hecs::World;

use wreck_core::components::BodyInfo;
use wreck_core::enums::SimPhase;
use wreck_core::events::SimEvent;
use wreck_core::state::*;
use wreck_core::types::{Pose, SimTime};
use wreck_damage::Hitbox;

use crate::body::{Damage, Destroyed};
use crate::breakup::BreakupPart;

/// Build a complete WorldSnapshot from the current world state.
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: SimPhase,
    events: Vec<SimEvent>,
) -> WorldSnapshot {
    WorldSnapshot {
        time: *time,
        phase,
        bodies: build_bodies(world),
        fragments: build_fragments(world),
        events,
    }
}

fn hitbox_view(h: &Hitbox) -> HitboxView {
    HitboxView {
        name: h.name().to_string(),
        longdes: h.longdes().to_string(),
        shortdes: h.shortdes().to_string(),
        hitpoints: h.hitpoints(),
        out: h.out(),
        active: h.active(),
        critical: h.critical(),
        selectable: h.selectable(),
        center: h.center(),
        volume: h.volume(),
    }
}

/// Build BodyView list from all entities with damage state.
fn build_bodies(world: &World) -> Vec<BodyView> {
    let mut bodies: Vec<BodyView> = world
        .query::<(&BodyInfo, &Pose, &Damage, Option<&Destroyed>)>()
        .iter()
        .map(|(_, (info, pose, damage, destroyed))| BodyView {
            id: info.id,
            name: info.name.clone(),
            archetype: info.archetype.clone(),
            family: info.family,
            position: pose.position,
            destroyed: destroyed.is_some(),
            control_out: damage.state.control_out,
            inert: damage.state.inert_collide,
            center: damage.hitboxes.center(),
            hitboxes: damage.hitboxes.iter().map(hitbox_view).collect(),
        })
        .collect();

    bodies.sort_by_key(|b| b.id);
    bodies
}

/// Build FragmentView list from all live breakup parts.
fn build_fragments(world: &World) -> Vec<FragmentView> {
    let mut fragments: Vec<FragmentView> = world
        .query::<&BreakupPart>()
        .iter()
        .map(|(_, part)| FragmentView {
            id: part.id,
            kind: part.kind(),
            source: part.source,
            handles: part.handles.clone(),
            position: part.pose.position,
            orientation: part.pose.orientation,
            speed: part.speed(),
            elapsed_secs: part.elapsed,
            at_rest: part.at_rest(),
            trail_fades: part.trail_fades(),
        })
        .collect();

    fragments.sort_by_key(|f| f.id);
    fragments
}
