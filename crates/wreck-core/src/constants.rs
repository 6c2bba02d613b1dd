//! Simulation constants and tuning parameters.

/// Default simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

/// Seconds per tick at the default tick rate.
pub const DT: f64 = 1.0 / TICK_RATE as f64;

/// Standard gravity magnitude (m/s²).
pub const GRAVITY: f64 = 9.81;

// --- Hitboxes ---

/// Collision mask set on hitboxes that can be hit / can register as hit source.
pub const HITBOX_COLLIDE_MASK: u32 = 0x0001;

/// Name given to the implicit hitbox of single-hitbox bodies.
pub const MAIN_HITBOX: &str = "main";

/// Default distance tolerance when resolving a hit point to a hitbox (meters).
pub const HIT_POINT_TOLERANCE: f64 = 0.5;

// --- Destruction sequence ---

/// Delay from full failure to shotdown for aircraft (seconds).
pub const PLANE_SHOTDOWN_DELAY: f64 = 3.0;

/// Delay from full failure to shotdown for buildings and vehicles (seconds).
pub const GROUND_SHOTDOWN_DELAY: f64 = 5.0;

/// Delay from full failure to shotdown for large structures (seconds).
pub const STRUCTURE_SHOTDOWN_DELAY: f64 = 10.0;

/// Hits this many seconds before full failure still count toward the
/// force that decides which air fragments break off.
pub const BREAKUP_HIT_WINDOW: f64 = 0.2;

// --- Ground fragments ---

/// Speed below which a bouncing ground fragment is put to rest (m/s).
pub const REST_SPEED: f64 = 0.5;

/// Default normal restitution coefficient.
pub const DEFAULT_NORMAL_RESTITUTION: f64 = 0.2;

/// Default tangential restitution coefficient.
pub const DEFAULT_TANGENT_RESTITUTION: f64 = 0.7;

/// Default tumble decay coefficient applied on each ground touch.
pub const DEFAULT_TUMBLE_RESTITUTION: f64 = 0.2;

// --- Air fragments ---

/// Below this flight-direction change the orientation update keeps the pitch axis.
pub const MIN_PITCH_AXIS: f64 = 1e-5;
