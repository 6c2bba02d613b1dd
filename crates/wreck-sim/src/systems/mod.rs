//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are pure functions that take `&mut World` (or `&World` for read-only).
//! They do not own state; all state lives in components.

pub mod cleanup;
pub mod fragments;
pub mod hits;
pub mod movement;
pub mod shotdown;
pub mod snapshot;
