//! Hit resolution system: runs the damage cascade for one hit and turns
//! its outcome into effects, scene edits and, on full failure, the
//! destruction sequence.

use std::sync::Arc;

use hecs::{Entity, World};

use wreck_core::breakup::BreakupData;
use wreck_core::commands::Hit;
use wreck_core::components::{AmbientSound, BodyInfo, OwnedEffects, Velocity};
use wreck_core::constants::HIT_POINT_TOLERANCE;
use wreck_core::events::SimEvent;
use wreck_core::types::{BodyId, DVec3, Pose};
use wreck_damage::{resolve_hit, CascadeOutcome, DamageTable};

use crate::body::{Damage, ShotdownTimer};
use crate::breakup::{air_breakup, ground_breakup, BreakupContext, BreakupPart, BreakupSource};

/// Name of the nearest active hitbox to a world-space point, if any is
/// within tolerance.
pub fn hitbox_at(world: &World, entity: Entity, point: DVec3) -> Option<String> {
    let mut query = world.query_one::<(&Pose, &Damage)>(entity).ok()?;
    let (pose, damage) = query.get()?;
    damage
        .hitboxes
        .resolve_point(pose.to_local(point), HIT_POINT_TOLERANCE)
        .map(|h| h.name().to_string())
}

/// Apply one hit to a body. Returns whether the hit was inert.
///
/// Fragments spawned by a resulting destruction go to `pending`; they
/// join the world at the end of the tick.
pub fn apply_hit(
    world: &mut World,
    entity: Entity,
    hit: &Hit,
    now_secs: f64,
    ctx: &mut BreakupContext,
    pending: &mut Vec<BreakupPart>,
) -> bool {
    let Ok((info, pose, velocity, damage)) =
        world.query_one_mut::<(&BodyInfo, &Pose, &Velocity, &mut Damage)>(entity)
    else {
        return true;
    };
    let body = info.id;
    let pose = *pose;
    let velocity = velocity.0;
    let profile = Arc::clone(&damage.profile);

    let outcome = resolve_hit(
        &mut damage.hitboxes,
        profile.as_ref(),
        &mut damage.state,
        hit,
        now_secs,
        &mut *ctx.rng,
    );
    log::debug!(
        "t={:.3} {} ({:?}): hitbox '{}' force {:.1} inert={}",
        now_secs,
        info.name,
        body,
        hit.hitbox,
        hit.force,
        outcome.inert
    );
    ctx.events.push(SimEvent::Hit {
        body,
        hitbox: hit.hitbox.clone(),
        force: hit.force,
        inert: outcome.inert,
    });

    apply_outcome(body, pose, &outcome, ctx);
    if outcome.full_failure {
        let source = BreakupSource {
            body,
            pose,
            velocity,
        };
        begin_destruction(world, entity, &source, profile.table(), &outcome, ctx, pending);
    }
    outcome.inert
}

fn apply_outcome(
    body: BodyId,
    pose: Pose,
    outcome: &CascadeOutcome,
    ctx: &mut BreakupContext,
) {
    for name in &outcome.newly_out {
        ctx.events.push(SimEvent::HitboxOut {
            body,
            hitbox: name.clone(),
        });
    }
    for effect in &outcome.effects {
        ctx.effects
            .spawn(effect.profile, pose.point(effect.offset), ctx.events);
    }
    if !outcome.removed.is_empty() {
        let removed = ctx.scene.remove_named(body, &outcome.removed);
        if !removed.is_empty() {
            ctx.events.push(SimEvent::SubgeometryRemoved {
                body,
                handles: removed,
            });
        }
    }
    for texture in &outcome.textures {
        swap_texture(body, texture, ctx);
    }
}

fn swap_texture(body: BodyId, texture: &str, ctx: &mut BreakupContext) {
    if ctx.scene.swap_texture(body, texture) {
        ctx.events.push(SimEvent::TextureSwapped {
            body,
            texture: texture.to_string(),
        });
    }
}

fn begin_destruction(
    world: &mut World,
    entity: Entity,
    source: &BreakupSource,
    table: &DamageTable,
    outcome: &CascadeOutcome,
    ctx: &mut BreakupContext,
    pending: &mut Vec<BreakupPart>,
) {
    let body = source.body;
    let delay = table.shotdown_delay;
    let _ = world.insert_one(
        entity,
        ShotdownTimer {
            remaining_secs: delay,
        },
    );
    ctx.events.push(SimEvent::FullFailure {
        body,
        shotdown_in_secs: delay,
    });

    ctx.scene.swap_to_shotdown_variant(body);
    if let Some(texture) = &table.shotdown_texture {
        swap_texture(body, texture, ctx);
    }

    let mut air = Vec::new();
    let mut ground = Vec::new();
    for part in &outcome.breakup.parts {
        match part {
            BreakupData::Air(d) => air.push(d.clone()),
            BreakupData::Ground(d) => ground.push(d.clone()),
        }
    }
    let before = pending.len();
    pending.extend(air_breakup(source, &air, ctx));
    pending.extend(ground_breakup(source, &ground, ctx));

    if let Ok(AmbientSound(sound)) = world.remove_one::<AmbientSound>(entity) {
        ctx.events.push(SimEvent::AmbientSoundStopped { body, sound });
    }
    if let Ok(owned) = world.remove_one::<OwnedEffects>(entity) {
        for handle in owned.handles {
            ctx.effects.release(handle, ctx.events);
        }
    }

    log::info!(
        "{} ({:?}): full failure, shotdown in {:.1}s, {} fragment(s)",
        table.name,
        body,
        delay,
        pending.len() - before
    );
}
