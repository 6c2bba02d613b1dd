//! Breakup fragments: descriptors in, simulated parts out.

pub mod air;
pub mod factory;
pub mod ground;
pub mod part;

pub use factory::{air_breakup, ground_breakup, select_ground_parts, BreakupContext, BreakupSource};
pub use part::{BreakupPart, Lifetime, Motion, PartStep, StepEnv};
