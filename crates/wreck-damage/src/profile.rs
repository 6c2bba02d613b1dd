//! Damage profiles: per-archetype thresholds, cascade rules, failure
//! predicate and breakup selection, held as data.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use wreck_core::breakup::BreakupData;
use wreck_core::constants::BREAKUP_HIT_WINDOW;
use wreck_core::enums::EffectProfile;
use wreck_core::error::ConfigError;

use crate::failure::FailureRule;
use crate::hitbox::{HitboxData, HitboxSet};

/// What happens, once, when a hitbox goes out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutReaction {
    pub hitbox: String,
    /// Explosion spawned at the hitbox center.
    #[serde(default)]
    pub effect: EffectProfile,
    /// Also attach a fire-and-smoke column at the hitbox center.
    #[serde(default)]
    pub smoke: bool,
    /// Named sub-geometry removed from the model.
    #[serde(default)]
    pub remove: Vec<String>,
    /// Other hitboxes whose health is zeroed.
    #[serde(default)]
    pub zero: Vec<String>,
    /// Losing this hitbox fails the whole body.
    #[serde(default)]
    pub full_failure: bool,
    #[serde(default)]
    pub burned_texture: Option<String>,
}

impl OutReaction {
    pub fn new(hitbox: &str, effect: EffectProfile) -> Self {
        Self {
            hitbox: hitbox.to_string(),
            effect,
            smoke: false,
            remove: Vec::new(),
            zero: Vec::new(),
            full_failure: false,
            burned_texture: None,
        }
    }

    pub fn smoking(mut self) -> Self {
        self.smoke = true;
        self
    }

    pub fn removes(mut self, handles: &[&str]) -> Self {
        self.remove.extend(handles.iter().map(|h| h.to_string()));
        self
    }

    pub fn zeroes(mut self, hitboxes: &[&str]) -> Self {
        self.zero.extend(hitboxes.iter().map(|h| h.to_string()));
        self
    }

    pub fn fails_body(mut self) -> Self {
        self.full_failure = true;
        self
    }

    pub fn burns_to(mut self, texture: &str) -> Self {
        self.burned_texture = Some(texture.to_string());
        self
    }
}

/// Breakup descriptors released on full failure, optionally only when a
/// given hitbox is out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakupGate {
    #[serde(default)]
    pub when_out: Option<String>,
    pub parts: Vec<BreakupData>,
}

impl BreakupGate {
    pub fn always(parts: Vec<BreakupData>) -> Self {
        Self {
            when_out: None,
            parts,
        }
    }

    pub fn when_out(hitbox: &str, parts: Vec<BreakupData>) -> Self {
        Self {
            when_out: Some(hitbox.to_string()),
            parts,
        }
    }

    fn open(&self, hitboxes: &HitboxSet) -> bool {
        self.when_out
            .as_deref()
            .map_or(true, |name| hitboxes.is_out(name))
    }
}

/// The descriptors chosen for one destruction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BreakupPlan {
    pub parts: Vec<BreakupData>,
}

impl BreakupPlan {
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Complete damage description of one body type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageTable {
    pub name: String,
    pub hitboxes: Vec<HitboxData>,
    #[serde(default)]
    pub reactions: Vec<OutReaction>,
    #[serde(default)]
    pub failure: FailureRule,
    /// Seconds from full failure to shotdown.
    pub shotdown_delay: f64,
    #[serde(default)]
    pub breakup: Vec<BreakupGate>,
    #[serde(default)]
    pub shotdown_texture: Option<String>,
    /// Leave a fire-and-smoke column at the body center on full failure.
    #[serde(default)]
    pub burns: bool,
    /// Seconds of hit history whose strongest force is weighed against
    /// each air descriptor's `limdamage`.
    #[serde(default = "default_hit_window")]
    pub hit_window: f64,
}

fn default_hit_window() -> f64 {
    BREAKUP_HIT_WINDOW
}

impl DamageTable {
    pub fn new(name: &str, shotdown_delay: f64) -> Self {
        Self {
            name: name.to_string(),
            hitboxes: Vec::new(),
            reactions: Vec::new(),
            failure: FailureRule::Never,
            shotdown_delay,
            breakup: Vec::new(),
            shotdown_texture: None,
            burns: false,
            hit_window: BREAKUP_HIT_WINDOW,
        }
    }

    pub fn hitbox(mut self, data: HitboxData) -> Self {
        self.hitboxes.push(data);
        self
    }

    pub fn reaction(mut self, reaction: OutReaction) -> Self {
        self.reactions.push(reaction);
        self
    }

    pub fn fails_when(mut self, rule: FailureRule) -> Self {
        self.failure = rule;
        self
    }

    pub fn breakup(mut self, gate: BreakupGate) -> Self {
        self.breakup.push(gate);
        self
    }

    pub fn burning(mut self) -> Self {
        self.burns = true;
        self
    }

    pub fn shotdown_texture(mut self, texture: &str) -> Self {
        self.shotdown_texture = Some(texture.to_string());
        self
    }

    pub fn hit_window(mut self, secs: f64) -> Self {
        self.hit_window = secs;
        self
    }

    /// Reactions registered for a hitbox, in table order.
    pub fn reactions_for<'a>(&'a self, hitbox: &'a str) -> impl Iterator<Item = &'a OutReaction> {
        self.reactions.iter().filter(move |r| r.hitbox == hitbox)
    }

    /// Check the table is internally consistent.
    pub fn validate(&self) -> Result<(), ConfigError> {
        // Geometry, thresholds and unique names.
        let set = HitboxSet::new(&self.hitboxes)?;

        let known = |name: &str| -> Result<(), ConfigError> {
            if set.contains(name) {
                Ok(())
            } else {
                Err(ConfigError::UnknownHitbox {
                    name: name.to_string(),
                })
            }
        };

        for r in &self.reactions {
            known(&r.hitbox)?;
            for z in &r.zero {
                known(z)?;
            }
        }
        for name in self.failure.names() {
            known(name)?;
        }
        for gate in &self.breakup {
            if let Some(name) = &gate.when_out {
                known(name)?;
            }
            for part in &gate.parts {
                part.validate()?;
            }
        }
        if !self.shotdown_delay.is_finite() || self.shotdown_delay < 0.0 {
            return Err(ConfigError::InvertedRange {
                field: format!("{}.shotdown_delay", self.name),
                min: 0.0,
                max: self.shotdown_delay,
            });
        }
        if !self.hit_window.is_finite() || self.hit_window < 0.0 {
            return Err(ConfigError::InvertedRange {
                field: format!("{}.hit_window", self.name),
                min: 0.0,
                max: self.hit_window,
            });
        }
        Ok(())
    }

    /// Parse and validate a table from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let table: DamageTable = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    /// Build the hitbox set for a new body of this type.
    pub fn build_hitboxes(&self) -> Result<HitboxSet, ConfigError> {
        HitboxSet::new(&self.hitboxes)
    }
}

/// Damage behaviour of one body archetype.
///
/// Most archetypes are a bare `DamageTable`; implement the trait directly
/// only to override breakup selection.
pub trait DamageProfile: Send + Sync {
    fn table(&self) -> &DamageTable;

    /// Descriptors released on full failure. By default every gate that is
    /// unconditional or whose hitbox is out, in table order, keeping only
    /// the air descriptors that pass [`breaks_off`].
    ///
    /// `hit_force` is the strongest hit inside the table's hit window.
    fn select_breakup(
        &self,
        hitboxes: &HitboxSet,
        hit_force: f64,
        rng: &mut dyn RngCore,
    ) -> BreakupPlan {
        let mut parts = Vec::new();
        for gate in self.table().breakup.iter().filter(|g| g.open(hitboxes)) {
            for part in &gate.parts {
                if breaks_off(part, hit_force, rng) {
                    parts.push(part.clone());
                }
            }
        }
        BreakupPlan { parts }
    }
}

/// Hit-force roll for one descriptor. An air descriptor breaks off when a
/// uniform draw in [0, 1) times its `limdamage` falls below `hit_force`.
/// Ground descriptors roll their own break probability later.
pub fn breaks_off(part: &BreakupData, hit_force: f64, rng: &mut dyn RngCore) -> bool {
    match part {
        BreakupData::Air(air) => rng.gen::<f64>() * air.limdamage < hit_force,
        BreakupData::Ground(_) => true,
    }
}

impl DamageProfile for DamageTable {
    fn table(&self) -> &DamageTable {
        self
    }
}
