//! Declarative breakup fragment descriptors.
//!
//! A descriptor names the sub-geometry that detaches from a destroyed body and
//! the ranges its launch, spin, lifetime and bounce parameters are drawn from.
//! Descriptors are per-body-type constant data (or loaded from JSON) and are
//! never mutated at runtime.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::ConfigError;
use crate::sampled::{Direction, Sampled};

/// Optional trailing smoke (and fire) carried by a fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailData {
    /// Trail lifetime as a fraction of the fragment duration.
    pub duration_factor: Sampled,
    /// Lifespan of trail segments (seconds).
    pub lifespan: Sampled,
    pub thickness: Sampled,
    /// Also spawn a fire trail.
    #[serde(default)]
    pub fire: bool,
}

impl TrailData {
    fn validate(&self, field: &str) -> Result<(), ConfigError> {
        self.duration_factor
            .validate(&format!("{field}.duration_factor"))?;
        self.lifespan.validate(&format!("{field}.lifespan"))?;
        self.thickness.validate(&format!("{field}.thickness"))
    }
}

/// Fragment of an airborne body: ballistic flight with drag toward a
/// terminal speed, plus a decaying roll around the flight axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirBreakupData {
    /// Named sub-geometry moved together as one fragment.
    pub handles: Vec<String>,
    /// Hit force at which this fragment is always released. Weaker killing
    /// hits release it with probability `force / limdamage`.
    #[serde(default)]
    pub limdamage: f64,
    /// Lifetime (seconds).
    pub duration: Sampled,
    /// Terminal speed (m/s).
    pub terminal_speed: Sampled,
    /// Launch direction relative to the body; `None` points away from the body origin.
    #[serde(default)]
    pub off_direction: Option<Direction>,
    /// Launch speed added to the body velocity (m/s).
    #[serde(default)]
    pub off_speed: Sampled,
    /// Roll speed (deg/s).
    #[serde(default)]
    pub roll_speed_deg: Sampled,
    /// Roll radius (m).
    #[serde(default)]
    pub roll_radius: Sampled,
    #[serde(default)]
    pub trail: Option<TrailData>,
    #[serde(default)]
    pub texture: Option<String>,
}

impl AirBreakupData {
    pub fn new(handle: &str, duration: impl Into<Sampled>, terminal_speed: impl Into<Sampled>) -> Self {
        Self {
            handles: vec![handle.to_string()],
            limdamage: 0.0,
            duration: duration.into(),
            terminal_speed: terminal_speed.into(),
            off_direction: None,
            off_speed: Sampled::Fixed(0.0),
            roll_speed_deg: Sampled::Fixed(0.0),
            roll_radius: Sampled::Fixed(0.0),
            trail: None,
            texture: None,
        }
    }

    pub fn launch(mut self, direction: Direction, speed: impl Into<Sampled>) -> Self {
        self.off_direction = Some(direction);
        self.off_speed = speed.into();
        self
    }

    pub fn roll(mut self, speed_deg: impl Into<Sampled>, radius: impl Into<Sampled>) -> Self {
        self.roll_speed_deg = speed_deg.into();
        self.roll_radius = radius.into();
        self
    }

    pub fn with_trail(mut self, trail: TrailData) -> Self {
        self.trail = Some(trail);
        self
    }

    pub fn with_limdamage(mut self, limdamage: f64) -> Self {
        self.limdamage = limdamage;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.handles.join("+");
        self.duration.validate(&format!("{name}.duration"))?;
        self.terminal_speed
            .validate(&format!("{name}.terminal_speed"))?;
        if self.terminal_speed.min() <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: format!("{name}.terminal_speed"),
                value: self.terminal_speed.min(),
            });
        }
        if !self.limdamage.is_finite() || self.limdamage < 0.0 {
            return Err(ConfigError::InvertedRange {
                field: format!("{name}.limdamage"),
                min: 0.0,
                max: self.limdamage,
            });
        }
        if let Some(dir) = &self.off_direction {
            dir.validate(&format!("{name}.off_direction"))?;
        }
        self.off_speed.validate(&format!("{name}.off_speed"))?;
        self.roll_speed_deg
            .validate(&format!("{name}.roll_speed_deg"))?;
        self.roll_radius.validate(&format!("{name}.roll_radius"))?;
        if let Some(trail) = &self.trail {
            trail.validate(&format!("{name}.trail"))?;
        }
        Ok(())
    }
}

/// Fragment of a ground body: ballistic flight with terrain bounce and tumble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundBreakupData {
    pub handles: Vec<String>,
    /// Independent probability that this fragment is created at all.
    pub break_probability: f64,
    /// Lifetime (seconds); `None` lives until the parent body is gone.
    #[serde(default)]
    pub duration: Option<Sampled>,
    #[serde(default)]
    pub off_direction: Option<Direction>,
    #[serde(default)]
    pub off_speed: Sampled,
    /// Tumble axis (body frame).
    pub tumble_direction: Direction,
    /// Tumble speed (deg/s).
    #[serde(default)]
    pub tumble_speed_deg: Sampled,
    #[serde(default = "default_normal_restitution")]
    pub normal_restitution: Sampled,
    #[serde(default = "default_tangent_restitution")]
    pub tangent_restitution: Sampled,
    #[serde(default = "default_tumble_restitution")]
    pub tumble_restitution: Sampled,
    /// Fixed elevation adjustment of the terrain surface for this fragment.
    #[serde(default)]
    pub fix_elevation: Sampled,
    /// Nodes stay attached and follow the simulated pivot kinematically.
    #[serde(default)]
    pub keep_together: bool,
    #[serde(default)]
    pub trail: Option<TrailData>,
    #[serde(default)]
    pub texture: Option<String>,
}

fn default_normal_restitution() -> Sampled {
    Sampled::Fixed(DEFAULT_NORMAL_RESTITUTION)
}

fn default_tangent_restitution() -> Sampled {
    Sampled::Fixed(DEFAULT_TANGENT_RESTITUTION)
}

fn default_tumble_restitution() -> Sampled {
    Sampled::Fixed(DEFAULT_TUMBLE_RESTITUTION)
}

impl GroundBreakupData {
    pub fn new(handle: &str, break_probability: f64, duration: Option<Sampled>) -> Self {
        Self {
            handles: vec![handle.to_string()],
            break_probability,
            duration,
            off_direction: None,
            off_speed: Sampled::Fixed(0.0),
            tumble_direction: Direction::ANY,
            tumble_speed_deg: Sampled::Fixed(0.0),
            normal_restitution: default_normal_restitution(),
            tangent_restitution: default_tangent_restitution(),
            tumble_restitution: default_tumble_restitution(),
            fix_elevation: Sampled::Fixed(0.0),
            keep_together: false,
            trail: None,
            texture: None,
        }
    }

    pub fn launch(mut self, direction: Direction, speed: impl Into<Sampled>) -> Self {
        self.off_direction = Some(direction);
        self.off_speed = speed.into();
        self
    }

    pub fn tumble(mut self, axis: Direction, speed_deg: impl Into<Sampled>) -> Self {
        self.tumble_direction = axis;
        self.tumble_speed_deg = speed_deg.into();
        self
    }

    pub fn restitution(
        mut self,
        normal: impl Into<Sampled>,
        tangent: impl Into<Sampled>,
        tumble: impl Into<Sampled>,
    ) -> Self {
        self.normal_restitution = normal.into();
        self.tangent_restitution = tangent.into();
        self.tumble_restitution = tumble.into();
        self
    }

    pub fn kept_together(mut self) -> Self {
        self.keep_together = true;
        self
    }

    pub fn with_fix_elevation(mut self, elevation: impl Into<Sampled>) -> Self {
        self.fix_elevation = elevation.into();
        self
    }

    pub fn with_trail(mut self, trail: TrailData) -> Self {
        self.trail = Some(trail);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let name = self.handles.join("+");
        if !(0.0..=1.0).contains(&self.break_probability) {
            return Err(ConfigError::ProbabilityOutOfRange {
                field: format!("{name}.break_probability"),
                value: self.break_probability,
            });
        }
        if let Some(duration) = &self.duration {
            duration.validate(&format!("{name}.duration"))?;
        }
        if let Some(dir) = &self.off_direction {
            dir.validate(&format!("{name}.off_direction"))?;
        }
        self.off_speed.validate(&format!("{name}.off_speed"))?;
        self.tumble_direction
            .validate(&format!("{name}.tumble_direction"))?;
        self.tumble_speed_deg
            .validate(&format!("{name}.tumble_speed_deg"))?;
        self.normal_restitution
            .validate_restitution(&format!("{name}.normal_restitution"))?;
        self.tangent_restitution
            .validate_restitution(&format!("{name}.tangent_restitution"))?;
        self.tumble_restitution
            .validate_restitution(&format!("{name}.tumble_restitution"))?;
        self.fix_elevation
            .validate(&format!("{name}.fix_elevation"))?;
        if let Some(trail) = &self.trail {
            trail.validate(&format!("{name}.trail"))?;
        }
        Ok(())
    }
}

/// Either kind of fragment descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum BreakupData {
    Air(AirBreakupData),
    Ground(GroundBreakupData),
}

impl BreakupData {
    pub fn handles(&self) -> &[String] {
        match self {
            BreakupData::Air(d) => &d.handles,
            BreakupData::Ground(d) => &d.handles,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match self {
            BreakupData::Air(d) => d.validate(),
            BreakupData::Ground(d) => d.validate(),
        }
    }
}

impl From<AirBreakupData> for BreakupData {
    fn from(data: AirBreakupData) -> Self {
        BreakupData::Air(data)
    }
}

impl From<GroundBreakupData> for BreakupData {
    fn from(data: GroundBreakupData) -> Self {
        BreakupData::Ground(data)
    }
}
