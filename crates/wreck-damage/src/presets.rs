//! Stock breakup descriptors shared by the archetype tables.
//!
//! Directions are heading/pitch bands in degrees in the body frame: heading
//! 0 is forward, +90 is left, -90 is right.

use wreck_core::breakup::{AirBreakupData, GroundBreakupData, TrailData};
use wreck_core::sampled::{Direction, Sampled};

fn smoke_trail(duration_factor: (f64, f64), lifespan: (f64, f64), thickness: (f64, f64)) -> TrailData {
    TrailData {
        duration_factor: duration_factor.into(),
        lifespan: lifespan.into(),
        thickness: thickness.into(),
        fire: false,
    }
}

fn medium(handle: &str, direction: Direction) -> AirBreakupData {
    AirBreakupData::new(handle, (15.0, 20.0), (100.0, 200.0))
        .with_limdamage(160.0)
        .launch(direction, (5.0, 10.0))
        .roll((-720.0, 720.0), (-1.0, 1.0))
        .with_trail(smoke_trail((0.2, 0.4), (1.0, 1.5), (0.7, 1.2)))
}

fn engine(handle: &str, direction: Direction) -> AirBreakupData {
    medium(handle, direction).with_limdamage(100.0)
}

// --- Aircraft ---

pub fn air_large_up(handle: &str) -> AirBreakupData {
    AirBreakupData::new(handle, (25.0, 30.0), (150.0, 250.0))
        .with_limdamage(220.0)
        .launch(Direction::cone(-180.0, 180.0, 60.0, 90.0), (3.0, 6.0))
        .roll((-720.0, 720.0), (-1.0, 1.0))
}

pub fn air_medium_left(handle: &str) -> AirBreakupData {
    medium(handle, Direction::cone(60.0, 120.0, -30.0, 30.0))
}

pub fn air_medium_right(handle: &str) -> AirBreakupData {
    medium(handle, Direction::cone(-120.0, -60.0, -30.0, 30.0))
}

pub fn air_engine_left(handle: &str) -> AirBreakupData {
    engine(handle, Direction::cone(60.0, 120.0, -30.0, 30.0))
}

pub fn air_engine_right(handle: &str) -> AirBreakupData {
    engine(handle, Direction::cone(-120.0, -60.0, -30.0, 30.0))
}

pub fn air_engine_down(handle: &str) -> AirBreakupData {
    engine(handle, Direction::cone(-180.0, 180.0, -90.0, -45.0))
}

// --- Ground vehicles and structures ---

/// Light part thrown clear, bouncing to rest within a few seconds.
pub fn ground_small(handle: &str, probability: f64) -> GroundBreakupData {
    GroundBreakupData::new(handle, probability, Some(Sampled::Range(8.0, 10.0)))
        .launch(Direction::cone(-180.0, 180.0, 20.0, 70.0), (8.0, 16.0))
        .tumble(Direction::ANY, (-500.0, 500.0))
        .restitution(0.2, 0.7, 0.2)
}

/// Heavy assembly that stays together, burns, and lasts until the wreck is removed.
pub fn ground_large(handle: &str, probability: f64) -> GroundBreakupData {
    GroundBreakupData::new(handle, probability, None)
        .launch(Direction::cone(-180.0, 180.0, 5.0, 15.0), (7.0, 12.0))
        .tumble(Direction::cone(-180.0, 180.0, 0.0, 40.0), (-250.0, 250.0))
        .restitution(0.1, 0.3, 0.1)
        .kept_together()
        .with_trail(TrailData {
            duration_factor: Sampled::Fixed(1e6),
            lifespan: Sampled::Fixed(0.45),
            thickness: Sampled::Fixed(4.0),
            fire: true,
        })
}

/// Heavy assembly lifted slightly and dropped back in place.
pub fn ground_large_low(handle: &str, probability: f64, elevation: f64) -> GroundBreakupData {
    GroundBreakupData::new(handle, probability, None)
        .launch(Direction::cone(-180.0, 180.0, 50.0, 70.0), 1.5)
        .tumble(Direction::cone(-180.0, 180.0, 70.0, 85.0), (-150.0, 150.0))
        .restitution(0.0, 0.0, 0.0)
        .with_fix_elevation(elevation)
        .kept_together()
}
