//! World snapshot: the complete visible damage/breakup state after each tick.
//!
//! Consumed by targeting, flight-control, scoring and UI layers.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::SimEvent;
use crate::types::{BodyId, DQuat, DVec3, FragmentId, SimTime};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub time: SimTime,
    pub phase: SimPhase,
    pub bodies: Vec<BodyView>,
    pub fragments: Vec<FragmentView>,
    pub events: Vec<SimEvent>,
}

impl WorldSnapshot {
    pub fn body(&self, id: BodyId) -> Option<&BodyView> {
        self.bodies.iter().find(|b| b.id == id)
    }
}

/// A damageable body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyView {
    pub id: BodyId,
    pub name: String,
    pub archetype: String,
    pub family: BodyFamily,
    pub position: DVec3,
    /// Shotdown completed.
    pub destroyed: bool,
    /// Input authority withdrawn (full failure fired).
    pub control_out: bool,
    /// Further hits are absorbed without effect.
    pub inert: bool,
    /// Volume-weighted centroid of all hitboxes (body frame).
    pub center: DVec3,
    pub hitboxes: Vec<HitboxView>,
}

impl BodyView {
    pub fn hitbox(&self, name: &str) -> Option<&HitboxView> {
        self.hitboxes.iter().find(|h| h.name == name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitboxView {
    pub name: String,
    pub longdes: String,
    pub shortdes: String,
    pub hitpoints: f64,
    pub out: bool,
    pub active: bool,
    pub critical: bool,
    pub selectable: bool,
    pub center: DVec3,
    pub volume: f64,
}

/// A live breakup fragment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FragmentView {
    pub id: FragmentId,
    pub kind: FragmentKind,
    pub source: BodyId,
    pub handles: Vec<String>,
    pub position: DVec3,
    pub orientation: DQuat,
    pub speed: f64,
    pub elapsed_secs: f64,
    pub at_rest: bool,
    /// Fade coefficient of each live trail (1 = fresh, 0 = gone).
    pub trail_fades: Vec<f64>,
}
