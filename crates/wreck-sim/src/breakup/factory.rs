//! Batch factories turning breakup descriptors into live fragments.
//!
//! Every ranged field is sampled once here and the resolved scalar stored
//! on the part. Descriptors whose sub-geometry cannot be found on the body
//! are skipped.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use wreck_core::breakup::{AirBreakupData, GroundBreakupData, TrailData};
use wreck_core::enums::EffectProfile;
use wreck_core::events::SimEvent;
use wreck_core::types::{unit_or_zero, BodyId, DVec3, FragmentId, Pose};

use super::air::AirMotion;
use super::ground::GroundMotion;
use super::part::{BreakupPart, Follower, Lifetime, Motion, Trail};
use crate::effects::EffectLedger;
use crate::scene::Scene;

/// The destroyed body, as it was when the batch was requested.
#[derive(Debug, Clone, Copy)]
pub struct BreakupSource {
    pub body: BodyId,
    pub pose: Pose,
    pub velocity: DVec3,
}

/// Collaborators a batch needs.
pub struct BreakupContext<'a> {
    pub scene: &'a mut dyn Scene,
    pub rng: &'a mut ChaCha8Rng,
    pub effects: &'a mut EffectLedger,
    pub events: &'a mut Vec<SimEvent>,
    pub next_fragment: &'a mut u32,
}

/// Where the fragment starts and what it carries.
struct Attached {
    id: FragmentId,
    pose: Pose,
    offset: DVec3,
    handles: Vec<String>,
    followers: Vec<Follower>,
}

fn attach(
    src: &BreakupSource,
    handles: &[String],
    keep_together: bool,
    texture: Option<&str>,
    ctx: &mut BreakupContext,
) -> Option<Attached> {
    let Some(offset) = handles
        .iter()
        .find_map(|h| ctx.scene.find_named(src.body, h))
    else {
        log::trace!(
            "body {:?}: no sub-geometry for '{}', fragment skipped",
            src.body,
            handles.join("+")
        );
        return None;
    };

    let id = FragmentId(*ctx.next_fragment);
    *ctx.next_fragment += 1;
    let pose = Pose::new(src.pose.point(offset), src.pose.orientation);

    let mut found = Vec::new();
    let mut followers = Vec::new();
    if keep_together {
        ctx.scene.create_fragment_node(id, pose, None);
        for handle in handles {
            if let Some(node_offset) = ctx.scene.find_named(src.body, handle) {
                followers.push(Follower {
                    handle: handle.clone(),
                    offset: node_offset - offset,
                });
                found.push(handle.clone());
            }
        }
    } else {
        ctx.scene.create_fragment_node(id, pose, texture);
        for handle in handles {
            if ctx.scene.detach(src.body, handle, id) {
                found.push(handle.clone());
            }
        }
    }

    Some(Attached {
        id,
        pose,
        offset,
        handles: found,
        followers,
    })
}

/// Launch velocity: body velocity plus the body-local direction (or the
/// direction away from the body origin) scaled by the launch speed.
fn launch_velocity(src: &BreakupSource, direction: Option<DVec3>, offset: DVec3, speed: f64) -> DVec3 {
    let local = direction.unwrap_or_else(|| unit_or_zero(offset));
    src.velocity + src.pose.vector(local) * speed
}

fn start_trails(trail: Option<&TrailData>, position: DVec3, ctx: &mut BreakupContext) -> Vec<Trail> {
    let Some(data) = trail else {
        return Vec::new();
    };
    let duration_factor = data.duration_factor.sample(ctx.rng);
    let lifespan = data.lifespan.sample(ctx.rng);
    let thickness = data.thickness.sample(ctx.rng);
    if duration_factor <= 0.0 || lifespan <= 0.0 || thickness <= 0.0 {
        return Vec::new();
    }

    let mut profiles = vec![EffectProfile::SmokeTrail];
    if data.fire {
        profiles.push(EffectProfile::FireTrail);
    }
    profiles
        .into_iter()
        .map(|profile| Trail {
            handle: ctx.effects.spawn(profile, position, ctx.events),
            duration_factor,
            fade: 1.0,
            live: true,
        })
        .collect()
}

fn announce(part: &BreakupPart, ctx: &mut BreakupContext) {
    log::debug!(
        "fragment {:?} from body {:?}: {:?} {:?}",
        part.id,
        part.source,
        part.kind(),
        part.handles
    );
    ctx.events.push(SimEvent::FragmentSpawned {
        fragment: part.id,
        body: part.source,
        kind: part.kind(),
        handles: part.handles.clone(),
    });
}

/// Instantiate an air batch. Every descriptor whose geometry exists
/// produces exactly one part.
pub fn air_breakup(
    src: &BreakupSource,
    descriptors: &[AirBreakupData],
    ctx: &mut BreakupContext,
) -> Vec<BreakupPart> {
    let mut parts = Vec::new();
    for d in descriptors {
        let duration = d.duration.sample(ctx.rng);
        let terminal_speed = d.terminal_speed.sample(ctx.rng);
        let direction = d.off_direction.map(|dir| dir.sample(ctx.rng));
        let off_speed = d.off_speed.sample(ctx.rng);
        let roll_speed = d.roll_speed_deg.sample(ctx.rng).to_radians();
        let roll_radius = d.roll_radius.sample(ctx.rng);

        let Some(at) = attach(src, &d.handles, false, d.texture.as_deref(), ctx) else {
            continue;
        };
        let velocity = launch_velocity(src, direction, at.offset, off_speed);
        let trails = start_trails(d.trail.as_ref(), at.pose.position, ctx);

        let part = BreakupPart {
            id: at.id,
            source: src.body,
            handles: at.handles,
            pose: at.pose,
            lifetime: Lifetime::Fixed(duration),
            elapsed: 0.0,
            motion: Motion::Air(AirMotion::new(
                velocity,
                at.pose.orientation,
                terminal_speed,
                roll_speed,
                roll_radius,
            )),
            trails,
            followers: at.followers,
        };
        announce(&part, ctx);
        parts.push(part);
    }
    parts
}

/// Pick which ground descriptors break off.
///
/// Each descriptor gets a fresh roll. Alternatives for the same handles
/// accumulate their probabilities so that at most one of them is chosen:
/// with probabilities 0.7 and 0.3 exactly one of the two always breaks.
pub fn select_ground_parts<'a>(
    descriptors: &'a [GroundBreakupData],
    rng: &mut ChaCha8Rng,
) -> Vec<&'a GroundBreakupData> {
    let mut selected = Vec::new();
    let mut taken: HashSet<String> = HashSet::new();
    let mut accumulated: HashMap<String, f64> = HashMap::new();
    for d in descriptors {
        let key = d.handles.join("+");
        if taken.contains(&key) {
            continue;
        }
        let roll: f64 = rng.gen();
        let acc = accumulated.entry(key.clone()).or_insert(0.0);
        if roll - *acc < d.break_probability {
            taken.insert(key);
            selected.push(d);
        } else {
            *acc += d.break_probability;
        }
    }
    selected
}

/// Instantiate a ground batch, applying each descriptor's break probability.
pub fn ground_breakup(
    src: &BreakupSource,
    descriptors: &[GroundBreakupData],
    ctx: &mut BreakupContext,
) -> Vec<BreakupPart> {
    let chosen = select_ground_parts(descriptors, ctx.rng);
    let body_texture = ctx.scene.texture(src.body);

    let mut parts = Vec::new();
    for d in chosen {
        let lifetime = match &d.duration {
            Some(duration) => Lifetime::Fixed(duration.sample(ctx.rng)),
            None => Lifetime::WhileParentAlive,
        };
        let direction = d.off_direction.map(|dir| dir.sample(ctx.rng));
        let off_speed = d.off_speed.sample(ctx.rng);
        let tumble_axis = d.tumble_direction.sample(ctx.rng);
        let tumble_speed = d.tumble_speed_deg.sample(ctx.rng).to_radians();
        let normal_restitution = d.normal_restitution.sample(ctx.rng);
        let tangent_restitution = d.tangent_restitution.sample(ctx.rng);
        let tumble_restitution = d.tumble_restitution.sample(ctx.rng);
        let fix_elevation = d.fix_elevation.sample(ctx.rng);

        // Loose clutter hanging off a thrown node goes with the wreck, not the part.
        let misc: Vec<String> = d.handles.iter().map(|h| format!("{h}_misc")).collect();
        ctx.scene.remove_named(src.body, &misc);

        let texture = d.texture.clone().or_else(|| body_texture.clone());
        let Some(at) = attach(src, &d.handles, d.keep_together, texture.as_deref(), ctx) else {
            continue;
        };
        let velocity = launch_velocity(src, direction, at.offset, off_speed);
        let trails = start_trails(d.trail.as_ref(), at.pose.position, ctx);

        let part = BreakupPart {
            id: at.id,
            source: src.body,
            handles: at.handles,
            pose: at.pose,
            lifetime,
            elapsed: 0.0,
            motion: Motion::Ground(GroundMotion {
                velocity,
                tumble_axis: src.pose.vector(tumble_axis),
                tumble_speed,
                normal_restitution,
                tangent_restitution,
                tumble_restitution,
                fix_elevation,
                at_rest: false,
            }),
            trails,
            followers: at.followers,
        };
        announce(&part, ctx);
        parts.push(part);
    }
    parts
}

