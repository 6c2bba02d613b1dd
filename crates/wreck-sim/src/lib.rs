//! Damage and breakup simulation.
//!
//! Owns the hecs ECS world, resolves hits through the damage cascade,
//! turns destroyed bodies into air and ground fragments, and produces
//! `WorldSnapshot`s at a fixed tick rate.

pub mod body;
pub mod breakup;
pub mod effects;
pub mod engine;
pub mod scene;
pub mod systems;
pub mod world_setup;

pub use body::BodySpec;
pub use engine::{SimConfig, SimulationEngine};
pub use scene::{ModelSpec, Scene, SceneGraph};
pub use wreck_core as core;

#[cfg(test)]
mod tests;
