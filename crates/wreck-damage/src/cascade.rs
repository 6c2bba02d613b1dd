//! Generic hit resolution against a damage profile.
//!
//! Pure functions over plain data: the caller owns the hitbox set and the
//! per-body `DamageState`, and turns the returned outcome into effects,
//! scene edits and breakup batches.

use rand::RngCore;

use wreck_core::commands::Hit;
use wreck_core::enums::EffectProfile;
use wreck_core::types::{BodyId, DVec3};

use crate::hitbox::HitboxSet;
use crate::profile::{BreakupPlan, DamageProfile};

/// Damage flags of one body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DamageState {
    /// Further hits are absorbed without effect.
    pub inert_collide: bool,
    /// Input authority withdrawn.
    pub control_out: bool,
    /// Full failure has fired. Never cleared.
    pub failed: bool,
    /// Last attacker of a non-inert hit, for kill credit.
    pub last_attacker: Option<BodyId>,
    /// Non-inert hits inside the breakup window, oldest first.
    pub recent_hits: Vec<RecordedHit>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedHit {
    pub force: f64,
    pub at_secs: f64,
}

impl DamageState {
    /// Remember a hit and forget those more than `window` seconds older.
    pub fn record_hit(&mut self, force: f64, at_secs: f64, window: f64) {
        self.recent_hits.retain(|h| h.at_secs + window >= at_secs);
        self.recent_hits.push(RecordedHit { force, at_secs });
    }

    /// Strongest remembered hit force, or zero.
    pub fn reference_force(&self) -> f64 {
        self.recent_hits.iter().map(|h| h.force).fold(0.0, f64::max)
    }
}

/// A cosmetic effect the cascade wants spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectRequest {
    pub profile: EffectProfile,
    /// Body-local position.
    pub offset: DVec3,
}

/// Everything one resolution pass changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeOutcome {
    /// The hit changed nothing (body inert, critical hitbox, inactive or unknown hitbox).
    pub inert: bool,
    /// Hitboxes that went out during this pass, in the order they went out.
    pub newly_out: Vec<String>,
    pub effects: Vec<EffectRequest>,
    /// Sub-geometry to remove from the body model.
    pub removed: Vec<String>,
    /// Texture swaps, in order; the last one wins.
    pub textures: Vec<String>,
    /// Full failure fired during this pass.
    pub full_failure: bool,
    /// Breakup descriptors to instantiate when `full_failure` is set.
    pub breakup: BreakupPlan,
}

impl CascadeOutcome {
    fn inert() -> Self {
        Self {
            inert: true,
            ..Self::default()
        }
    }
}

/// Resolve one hit landing at `now_secs` against a body. `rng` drives the
/// breakup selection if the hit fails the body.
pub fn resolve_hit(
    hitboxes: &mut HitboxSet,
    profile: &dyn DamageProfile,
    state: &mut DamageState,
    hit: &Hit,
    now_secs: f64,
    rng: &mut dyn RngCore,
) -> CascadeOutcome {
    let Some(target) = hitboxes.get(&hit.hitbox) else {
        log::trace!("{}: hit on unknown hitbox '{}'", profile.table().name, hit.hitbox);
        return CascadeOutcome::inert();
    };

    let inert = state.inert_collide
        || !target.active()
        || (target.critical() && !hit.hits_critical);
    if inert {
        return CascadeOutcome::inert();
    }

    if hit.attacker.is_some() {
        state.last_attacker = hit.attacker;
    }
    state.record_hit(hit.force, now_secs, profile.table().hit_window);
    if let Some(target) = hitboxes.get_mut(&hit.hitbox) {
        target.take_hit(hit.force);
    }

    settle(hitboxes, profile, state, rng)
}

/// Run the out transitions and cascade rules to a fixed point, then check
/// the full-failure predicate. Safe to call repeatedly: a settled body
/// produces an empty outcome.
pub fn settle(
    hitboxes: &mut HitboxSet,
    profile: &dyn DamageProfile,
    state: &mut DamageState,
    rng: &mut dyn RngCore,
) -> CascadeOutcome {
    let table = profile.table();
    let mut outcome = CascadeOutcome::default();
    let mut fail_now = false;

    loop {
        let pending: Vec<String> = hitboxes
            .iter()
            .filter(|h| h.pending_out())
            .map(|h| h.name().to_string())
            .collect();
        if pending.is_empty() {
            break;
        }

        for name in pending {
            let Some(hitbox) = hitboxes.get_mut(&name) else {
                continue;
            };
            hitbox.mark_out();
            let center = hitbox.center();
            log::info!("{}: hitbox '{}' out", table.name, name);

            for reaction in table.reactions_for(&name) {
                outcome.effects.push(EffectRequest {
                    profile: reaction.effect,
                    offset: center,
                });
                if reaction.smoke {
                    outcome.effects.push(EffectRequest {
                        profile: EffectProfile::FireAndSmoke,
                        offset: center,
                    });
                }
                outcome.removed.extend(reaction.remove.iter().cloned());
                if let Some(texture) = &reaction.burned_texture {
                    outcome.textures.push(texture.clone());
                }
                for other in &reaction.zero {
                    if let Some(h) = hitboxes.get_mut(other) {
                        h.zero();
                    }
                }
                fail_now |= reaction.full_failure;
            }
            outcome.newly_out.push(name);
        }
    }

    if !state.failed {
        let is_out = |name: &str| hitboxes.is_out(name);
        if fail_now || table.failure.evaluate(&is_out) {
            state.failed = true;
            state.inert_collide = true;
            state.control_out = true;
            outcome.full_failure = true;
            if table.burns {
                outcome.effects.push(EffectRequest {
                    profile: EffectProfile::FireAndSmoke,
                    offset: hitboxes.center(),
                });
            }
            outcome.breakup = profile.select_breakup(hitboxes, state.reference_force(), rng);
            log::info!(
                "{}: full failure, {} breakup part(s)",
                table.name,
                outcome.breakup.parts.len()
            );
        }
    }

    outcome
}
