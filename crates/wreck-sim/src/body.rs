//! Body components that depend on the damage crate.

use std::sync::Arc;

use wreck_core::enums::{BodyFamily, EffectProfile};
use wreck_core::types::{DVec3, Pose, SoundHandle};
use wreck_damage::{DamageProfile, DamageState, HitboxSet};

use crate::scene::ModelSpec;

/// Hitboxes, damage flags and the profile that drives them.
pub struct Damage {
    pub profile: Arc<dyn DamageProfile>,
    pub hitboxes: HitboxSet,
    pub state: DamageState,
}

/// Counts down from full failure to shotdown.
#[derive(Debug, Clone, Copy)]
pub struct ShotdownTimer {
    pub remaining_secs: f64,
}

/// Shotdown completed. The body stays in the world until despawned.
#[derive(Debug, Clone, Copy)]
pub struct Destroyed;

/// Everything needed to spawn a body besides its damage profile.
#[derive(Debug, Clone)]
pub struct BodySpec {
    pub name: String,
    pub family: BodyFamily,
    pub pose: Pose,
    pub velocity: DVec3,
    pub model: ModelSpec,
    pub ambient_sound: Option<SoundHandle>,
    /// Effects attached at spawn (exhaust, beacons), released on full failure.
    pub effects: Vec<(EffectProfile, DVec3)>,
}

impl BodySpec {
    pub fn new(name: &str, family: BodyFamily) -> Self {
        Self {
            name: name.to_string(),
            family,
            pose: Pose::default(),
            velocity: DVec3::ZERO,
            model: ModelSpec::default(),
            ambient_sound: None,
            effects: Vec::new(),
        }
    }

    pub fn at(mut self, pose: Pose) -> Self {
        self.pose = pose;
        self
    }

    pub fn moving(mut self, velocity: DVec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_model(mut self, model: ModelSpec) -> Self {
        self.model = model;
        self
    }

    pub fn with_ambient_sound(mut self, sound: SoundHandle) -> Self {
        self.ambient_sound = Some(sound);
        self
    }

    pub fn with_effect(mut self, profile: EffectProfile, offset: DVec3) -> Self {
        self.effects.push((profile, offset));
        self
    }
}
