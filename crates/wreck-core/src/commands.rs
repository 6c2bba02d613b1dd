//! Commands sent into the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::types::{BodyId, DVec3};

/// Description of one resolved attack against a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit {
    /// Hitbox struck (name within the target body).
    pub hitbox: String,
    /// Hit force of the attacking body.
    pub force: f64,
    /// Whether the attacker can damage critical hitboxes.
    #[serde(default)]
    pub hits_critical: bool,
    /// Attacking body, for kill attribution.
    #[serde(default)]
    pub attacker: Option<BodyId>,
}

impl Hit {
    pub fn new(hitbox: &str, force: f64) -> Self {
        Self {
            hitbox: hitbox.to_string(),
            force,
            hits_critical: false,
            attacker: None,
        }
    }

    pub fn critical(mut self) -> Self {
        self.hits_critical = true;
        self
    }

    pub fn from_attacker(mut self, attacker: BodyId) -> Self {
        self.attacker = Some(attacker);
        self
    }
}

/// All commands accepted by the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SimCommand {
    // --- Damage ---
    /// Apply a hit to a named hitbox of a body.
    Hit { body: BodyId, hit: Hit },
    /// Apply a hit at a world-space point; the nearest active hitbox is struck.
    HitAt {
        body: BodyId,
        point: DVec3,
        force: f64,
        #[serde(default)]
        hits_critical: bool,
        #[serde(default)]
        attacker: Option<BodyId>,
    },
    /// Toggle collision detection of a hitbox (e.g. a lost wheel).
    SetHitboxActive {
        body: BodyId,
        hitbox: String,
        active: bool,
    },
    /// Remove a body from the world.
    DespawnBody { body: BodyId },

    // --- Simulation control ---
    /// Set time scale (1.0 = normal, 0.0 = frozen).
    SetTimeScale { scale: f64 },
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}
