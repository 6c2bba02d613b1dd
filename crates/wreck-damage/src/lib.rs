//! Hitbox damage model for wreck.
//!
//! Per-component health pools, body-type damage tables, the generic
//! cascade that resolves a hit against them, and the built-in archetypes.
//! No ECS dependency; everything here operates on plain data.

pub mod archetypes;
pub mod cascade;
pub mod failure;
pub mod hitbox;
pub mod presets;
pub mod profile;

pub use wreck_core as core;

pub use archetypes::{get_profile, Archetype};
pub use cascade::{resolve_hit, settle, CascadeOutcome, DamageState, EffectRequest, RecordedHit};
pub use failure::FailureRule;
pub use hitbox::{Hitbox, HitboxData, HitboxSet, Primitive};
pub use profile::{breaks_off, BreakupGate, BreakupPlan, DamageProfile, DamageTable, OutReaction};
