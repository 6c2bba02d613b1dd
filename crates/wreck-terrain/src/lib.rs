//! Terrain queries for wreck fragments.
//!
//! The `Surface` trait is the contract the breakup physics uses to find
//! ground contacts; `FlatSurface` and the bilinear `HeightGrid` implement it.

pub use wreck_core as core;

pub mod grid;
pub mod surface;


// Re-export key types for convenience.
pub use grid::{HeightGrid, TerrainHeader};
pub use surface::{FlatSurface, Surface};
