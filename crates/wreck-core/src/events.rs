//! Events emitted by the simulation for effects, audio, scoring and UI.
//!
//! Effect and audio collaborators consume these fire-and-forget; the
//! simulation never waits on them or checks their outcome.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::types::{BodyId, DVec3, EffectHandle, FragmentId, SoundHandle};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimEvent {
    /// A hit was resolved against a body.
    Hit {
        body: BodyId,
        hitbox: String,
        force: f64,
        inert: bool,
    },
    /// A hitbox's health reached zero and its effects fired.
    HitboxOut { body: BodyId, hitbox: String },
    /// A cosmetic effect was spawned.
    EffectSpawned {
        handle: EffectHandle,
        profile: EffectProfile,
        position: DVec3,
    },
    /// A cosmetic effect was released.
    EffectReleased { handle: EffectHandle },
    /// Named sub-geometry was removed from a body's model.
    SubgeometryRemoved { body: BodyId, handles: Vec<String> },
    /// A body's model texture was swapped (burned skin).
    TextureSwapped { body: BodyId, texture: String },
    /// The body's full-failure condition fired; destruction sequence started.
    FullFailure { body: BodyId, shotdown_in_secs: f64 },
    /// Delayed shotdown completed.
    Shotdown { body: BodyId },
    /// Kill attributed to the last attacker.
    KillCredited { body: BodyId, attacker: BodyId },
    /// Ambient engine/rotor sound stopped.
    AmbientSoundStopped { body: BodyId, sound: SoundHandle },
    FragmentSpawned {
        fragment: FragmentId,
        body: BodyId,
        kind: FragmentKind,
        handles: Vec<String>,
    },
    FragmentExpired { fragment: FragmentId, reason: FragmentEnd },
    FragmentAtRest { fragment: FragmentId, position: DVec3 },
}
