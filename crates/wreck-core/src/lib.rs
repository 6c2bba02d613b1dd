//! Core types and definitions for the wreck damage simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! math and id types, sampled descriptor values, breakup descriptors,
//! commands, events, snapshots, constants and configuration errors.
//! It has no dependency on the ECS or on any render/audio backend.

pub mod breakup;
pub mod commands;
pub mod components;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod sampled;
pub mod state;
pub mod types;

pub use error::ConfigError;

#[cfg(test)]
mod tests;
