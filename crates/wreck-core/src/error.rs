//! Configuration errors raised while building hitboxes and descriptor tables.
//!
//! These are data-authoring bugs: a body type whose tables fail to validate
//! does not spawn. Nothing in the per-tick path returns an error.

/// Error type for malformed damage and breakup data.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("hitbox '{hitbox}' has no collision solids")]
    EmptyGeometry { hitbox: String },
    #[error("hitbox '{hitbox}': unknown collision solid encoding: {detail}")]
    UnknownPrimitive { hitbox: String, detail: String },
    #[error("hitbox '{hitbox}': invalid collision solid: {detail}")]
    InvalidPrimitive { hitbox: String, detail: String },
    #[error("duplicate hitbox name '{name}'")]
    DuplicateHitbox { name: String },
    #[error("rule refers to unknown hitbox '{name}'")]
    UnknownHitbox { name: String },
    #[error("{field}: range minimum {min} exceeds maximum {max}")]
    InvertedRange { field: String, min: f64, max: f64 },
    #[error("{field}: restitution coefficient {value} outside [0, 1]")]
    RestitutionOutOfRange { field: String, value: f64 },
    #[error("{field}: {value} must be greater than zero")]
    NonPositive { field: String, value: f64 },
    #[error("{field}: probability {value} outside [0, 1]")]
    ProbabilityOutOfRange { field: String, value: f64 },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
