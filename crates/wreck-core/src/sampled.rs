//! Randomized descriptor values.
//!
//! Descriptor fields are either a fixed value or a `(min, max)` range that is
//! sampled once, when a breakup batch is instantiated. The sampled scalar is
//! stored on the fragment and never re-sampled.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{direction_from_heading_pitch, unit_or_zero, DVec3};

/// A value that is either fixed or drawn uniformly from a closed range.
///
/// In JSON a fixed value is a bare number and a range is `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sampled<T = f64> {
    Fixed(T),
    Range(T, T),
}

impl<T: Default> Default for Sampled<T> {
    fn default() -> Self {
        Sampled::Fixed(T::default())
    }
}

impl From<f64> for Sampled<f64> {
    fn from(value: f64) -> Self {
        Sampled::Fixed(value)
    }
}

impl From<(f64, f64)> for Sampled<f64> {
    fn from((min, max): (f64, f64)) -> Self {
        Sampled::Range(min, max)
    }
}

impl Sampled<f64> {
    /// Draw a value: fixed values pass through, ranges are sampled uniformly.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Sampled::Fixed(v) => v,
            Sampled::Range(min, max) => min + (max - min) * rng.gen::<f64>(),
        }
    }

    /// Smallest value this field can produce.
    pub fn min(&self) -> f64 {
        match *self {
            Sampled::Fixed(v) => v,
            Sampled::Range(min, max) => min.min(max),
        }
    }

    /// Largest value this field can produce.
    pub fn max(&self) -> f64 {
        match *self {
            Sampled::Fixed(v) => v,
            Sampled::Range(min, max) => min.max(max),
        }
    }

    /// Reject ranges whose minimum exceeds their maximum.
    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match *self {
            Sampled::Range(min, max) if min > max => Err(ConfigError::InvertedRange {
                field: field.to_string(),
                min,
                max,
            }),
            _ => Ok(()),
        }
    }

    /// Validate as a restitution coefficient: every reachable value in `[0, 1]`.
    pub fn validate_restitution(&self, field: &str) -> Result<(), ConfigError> {
        self.validate(field)?;
        for value in [self.min(), self.max()] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RestitutionOutOfRange {
                    field: field.to_string(),
                    value,
                });
            }
        }
        Ok(())
    }
}

/// Launch direction of a fragment in the body-local frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Direction {
    /// A fixed direction (normalised when sampled).
    Fixed(DVec3),
    /// A spherical band: heading and pitch ranges in degrees.
    Cone {
        heading: (f64, f64),
        pitch: (f64, f64),
    },
}

impl Direction {
    /// Full sphere.
    pub const ANY: Direction = Direction::Cone {
        heading: (-180.0, 180.0),
        pitch: (-90.0, 90.0),
    };

    /// Heading/pitch band in degrees.
    pub fn cone(min_heading: f64, max_heading: f64, min_pitch: f64, max_pitch: f64) -> Self {
        Direction::Cone {
            heading: (min_heading, max_heading),
            pitch: (min_pitch, max_pitch),
        }
    }

    /// Draw a unit direction. Heading is uniform; the sine of pitch is uniform,
    /// which spreads samples evenly over the spherical band.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec3 {
        match *self {
            Direction::Fixed(v) => unit_or_zero(v),
            Direction::Cone { heading, pitch } => {
                let h = Sampled::Range(heading.0, heading.1).sample(rng).to_radians();
                let min_z = pitch.0.to_radians().sin();
                let max_z = pitch.1.to_radians().sin();
                let z = Sampled::Range(min_z, max_z).sample(rng).clamp(-1.0, 1.0);
                direction_from_heading_pitch(h, z.asin())
            }
        }
    }

    pub fn validate(&self, field: &str) -> Result<(), ConfigError> {
        match *self {
            Direction::Fixed(_) => Ok(()),
            Direction::Cone { heading, pitch } => {
                Sampled::Range(heading.0, heading.1).validate(&format!("{field}.heading"))?;
                Sampled::Range(pitch.0, pitch.1).validate(&format!("{field}.pitch"))
            }
        }
    }
}
