//! Built-in body archetypes.
//!
//! Each archetype is constant data: hitbox geometry and thresholds, out
//! reactions, the full-failure predicate and breakup gates.

use std::sync::Arc;

use rand::RngCore;
use serde::{Deserialize, Serialize};

use wreck_core::breakup::BreakupData;
use wreck_core::constants::*;
use wreck_core::enums::{BodyFamily, EffectProfile};
use wreck_core::types::DVec3;

use crate::failure::FailureRule;
use crate::hitbox::{HitboxData, HitboxSet};
use crate::presets::*;
use crate::profile::{BreakupGate, BreakupPlan, DamageProfile, DamageTable, OutReaction};

/// Built-in damage archetypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Archetype {
    Building,
    Truck,
    Bomber,
    OilPlatform,
    /// Oil platform carrying two SAM sites.
    OilPlatformDefended,
    DrillingRig,
}

impl Archetype {
    /// Body family, which decides the breakup motion model.
    pub fn family(self) -> BodyFamily {
        match self {
            Archetype::Building => BodyFamily::Building,
            Archetype::Truck => BodyFamily::Vehicle,
            Archetype::Bomber => BodyFamily::Plane,
            Archetype::OilPlatform | Archetype::OilPlatformDefended | Archetype::DrillingRig => {
                BodyFamily::Ship
            }
        }
    }
}

/// Get the damage profile for a given archetype.
pub fn get_profile(archetype: Archetype) -> Arc<dyn DamageProfile> {
    match archetype {
        Archetype::Building => Arc::new(building(300.0, 20.0, 200.0)),
        Archetype::Truck => Arc::new(truck()),
        Archetype::Bomber => Arc::new(bomber()),
        Archetype::OilPlatform => Arc::new(oil_platform(false)),
        Archetype::OilPlatformDefended => Arc::new(oil_platform(true)),
        Archetype::DrillingRig => Arc::new(DrillingRig::new()),
    }
}

fn v(x: f64, y: f64, z: f64) -> DVec3 {
    DVec3::new(x, y, z)
}

/// Single-hitbox building with aggregate strength thresholds.
pub fn building(strength: f64, minhitdmg: f64, maxhitdmg: f64) -> DamageTable {
    DamageTable::new("building", GROUND_SHOTDOWN_DELAY)
        .hitbox(
            HitboxData::new(MAIN_HITBOX, strength, minhitdmg, maxhitdmg)
                .labels("building", "BLDG")
                .cuboid(v(0.0, 0.0, 6.0), v(8.0, 8.0, 6.0)),
        )
        .reaction(OutReaction::new(MAIN_HITBOX, EffectProfile::Explosion).fails_body())
        .burning()
        .breakup(BreakupGate::always(vec![
            ground_small("roof_1", 0.6).into(),
            ground_small("roof_2", 0.6).into(),
            ground_small("antenna", 0.8).into(),
        ]))
}

/// Single-hitbox cargo truck.
pub fn truck() -> DamageTable {
    DamageTable::new("truck", GROUND_SHOTDOWN_DELAY)
        .hitbox(
            HitboxData::new(MAIN_HITBOX, 16.0, 0.0, 10.0)
                .labels("cargo truck", "TRUCK")
                .cuboid(v(0.0, 0.3, 1.5), v(1.4, 4.3, 1.5)),
        )
        .reaction(
            OutReaction::new(MAIN_HITBOX, EffectProfile::MinorExplosion)
                .removes(&["misc"])
                .fails_body(),
        )
        .burning()
        .shotdown_texture("truck_burned")
        .breakup(BreakupGate::always(vec![
            // Cab either settles in place or is thrown clear, never both.
            ground_large_low("cab", 0.7, 1.2).into(),
            ground_large("cab", 0.3).into(),
            ground_small("tarp", 0.6).into(),
            ground_small("wheel_front_left", 0.5).into(),
            ground_small("wheel_front_right", 0.5).into(),
            ground_small("wheel_rear_left", 0.5).into(),
            ground_small("wheel_rear_right", 0.5).into(),
        ]))
}

/// Hitbox names of the bomber.
pub mod bomber_hitboxes {
    pub const HULL: &str = "hull";
    pub const WING_LEFT: &str = "wing_left";
    pub const WING_RIGHT: &str = "wing_right";
    pub const ENGINE_LEFT_1: &str = "engine_left_1";
    pub const ENGINE_LEFT_2: &str = "engine_left_2";
    pub const ENGINE_RIGHT_1: &str = "engine_right_1";
    pub const ENGINE_RIGHT_2: &str = "engine_right_2";
    pub const TAIL: &str = "tail";
}

/// Four-engined swing-wing bomber.
///
/// Losing a wing takes its two engines with it; losing the hull takes all
/// four. Any wing or engine out is a full failure.
pub fn bomber() -> DamageTable {
    use bomber_hitboxes::*;

    let wing = |name: &str, x: f64| {
        HitboxData::new(name, 60.0, 0.0, 20.0).cuboid(v(x, -2.0, 0.0), v(8.0, 4.0, 0.5))
    };
    let engine = |name: &str, x: f64| {
        HitboxData::new(name, 20.0, 0.0, 15.0)
            .capsule(v(x, -8.0, -1.5), v(x, -2.0, -1.5), 1.0)
            .unselectable()
    };
    let engine_out = |name: &str| OutReaction::new(name, EffectProfile::MinorExplosion).smoking();

    DamageTable::new("bomber", PLANE_SHOTDOWN_DELAY)
        .hitbox(
            HitboxData::new(HULL, 120.0, 0.0, 70.0)
                .labels("hull", "HULL")
                .capsule(v(0.0, -20.0, 0.0), v(0.0, 20.0, 0.0), 3.0),
        )
        .hitbox(wing(WING_LEFT, -10.0).labels("left wing", "LWNG"))
        .hitbox(wing(WING_RIGHT, 10.0).labels("right wing", "RWNG"))
        .hitbox(engine(ENGINE_LEFT_1, -5.0))
        .hitbox(engine(ENGINE_LEFT_2, -9.0))
        .hitbox(engine(ENGINE_RIGHT_1, 5.0))
        .hitbox(engine(ENGINE_RIGHT_2, 9.0))
        .hitbox(
            HitboxData::new(TAIL, 80.0, 0.0, 30.0)
                .labels("tail", "TAIL")
                .cuboid(v(0.0, -22.0, 4.0), v(1.0, 3.0, 4.0)),
        )
        .reaction(
            OutReaction::new(HULL, EffectProfile::MinorExplosion)
                .removes(&["fixed_external_misc_1"])
                .zeroes(&[ENGINE_LEFT_1, ENGINE_LEFT_2, ENGINE_RIGHT_1, ENGINE_RIGHT_2]),
        )
        .reaction(
            OutReaction::new(WING_RIGHT, EffectProfile::MinorExplosion)
                .smoking()
                .removes(&["wing_right_misc"])
                .zeroes(&[ENGINE_RIGHT_1, ENGINE_RIGHT_2]),
        )
        .reaction(
            OutReaction::new(WING_LEFT, EffectProfile::MinorExplosion)
                .smoking()
                .removes(&["wing_left_misc"])
                .zeroes(&[ENGINE_LEFT_1, ENGINE_LEFT_2]),
        )
        .reaction(engine_out(ENGINE_LEFT_1))
        .reaction(engine_out(ENGINE_LEFT_2))
        .reaction(engine_out(ENGINE_RIGHT_1))
        .reaction(engine_out(ENGINE_RIGHT_2))
        .reaction(
            OutReaction::new(TAIL, EffectProfile::MinorExplosion)
                .removes(&["turret_doors", "tail_misc"]),
        )
        .fails_when(FailureRule::any_out(&[
            WING_LEFT,
            WING_RIGHT,
            ENGINE_LEFT_1,
            ENGINE_LEFT_2,
            ENGINE_RIGHT_1,
            ENGINE_RIGHT_2,
        ]))
        .shotdown_texture("bomber_shotdown")
        .breakup(BreakupGate::when_out(WING_RIGHT, vec![air_medium_right("wing_right").into()]))
        .breakup(BreakupGate::when_out(WING_LEFT, vec![air_medium_left("wing_left").into()]))
        .breakup(BreakupGate::when_out(
            ENGINE_RIGHT_1,
            vec![air_engine_right("engine_right_1").into()],
        ))
        .breakup(BreakupGate::when_out(
            ENGINE_RIGHT_2,
            vec![air_engine_down("engine_right_2").into()],
        ))
        .breakup(BreakupGate::when_out(
            ENGINE_LEFT_1,
            vec![air_engine_left("engine_left_1").into()],
        ))
        .breakup(BreakupGate::when_out(
            ENGINE_LEFT_2,
            vec![air_engine_down("engine_left_2").into()],
        ))
        .breakup(BreakupGate::when_out(TAIL, vec![air_large_up("tail_fin").into()]))
}

const SAM1_HANDLES: [&str; 3] = ["def1_plat", "def1_crank", "def1_tubes"];
const SAM2_HANDLES: [&str; 3] = ["def2_plat", "def2_crank", "def2_tubes"];

/// Offshore oil platform, optionally defended by two SAM sites.
///
/// Fails when the platform itself goes, or when the crane and every major
/// installation except the pumping deck (ins4) are out.
pub fn oil_platform(defended: bool) -> DamageTable {
    let name = if defended {
        "oil_platform_defended"
    } else {
        "oil_platform"
    };

    let mut ins2 = OutReaction::new("ins2", EffectProfile::MinorExplosion).smoking();
    let mut ins5 = OutReaction::new("ins5", EffectProfile::Explosion).smoking();
    if defended {
        ins2 = ins2.zeroes(&["def2"]);
        ins5 = ins5.zeroes(&["def1"]);
    }

    let mut table = DamageTable::new(name, STRUCTURE_SHOTDOWN_DELAY)
        .hitbox(
            HitboxData::new("plat", 5000.0, 500.0, 2500.0)
                .labels("platform", "PLAT")
                .cuboid(v(-7.42, 2.05, 42.01), v(42.84, 42.84, 10.31))
                .cuboid(v(-7.42, 2.05, 16.15), v(34.44, 34.44, 16.15))
                .cuboid(v(58.76, 2.05, 17.10), v(5.51, 5.51, 17.01)),
        )
        .hitbox(
            HitboxData::new("hpad", 210.0, 1.0, 140.0)
                .labels("helipad", "HPAD")
                .cuboid(v(-39.07, -32.79, 55.17), v(15.17, 15.02, 2.86))
                .unselectable(),
        )
        .hitbox(
            HitboxData::new("cns1", 160.0, 0.0, 80.0)
                .labels("construction1", "CNS1")
                .cuboid(v(59.54, 2.06, 45.58), v(1.56, 1.56, 11.43))
                .cuboid(v(59.54, -13.02, 54.85), v(1.69, 36.79, 1.59)),
        )
        .hitbox(
            HitboxData::new("ins1", 200.0, 0.0, 140.0)
                .labels("installation1", "INS1")
                .cuboid(v(-8.81, -11.09, 59.29), v(14.67, 14.12, 6.97)),
        )
        .hitbox(
            HitboxData::new("ins2", 200.0, 0.0, 140.0)
                .labels("installation2", "INS2")
                .cuboid(v(20.08, -25.32, 55.29), v(12.22, 9.49, 2.97)),
        )
        .hitbox(
            HitboxData::new("ins3", 200.0, 0.0, 140.0)
                .labels("installation3", "INS3")
                .cuboid(v(19.88, 1.01, 57.46), v(6.99, 13.57, 6.95)),
        )
        .hitbox(
            HitboxData::new("ins4", 240.0, 5.0, 160.0)
                .labels("installation4", "INS4")
                .cuboid(v(17.78, 29.35, 53.32), v(8.70, 10.68, 1.00))
                .unselectable(),
        )
        .hitbox(
            HitboxData::new("ins5", 260.0, 5.0, 180.0)
                .labels("installation5", "INS5")
                .cuboid(v(-12.40, 20.30, 60.73), v(21.71, 16.78, 7.32))
                .cuboid(v(-21.14, 11.22, 69.02), v(12.40, 7.12, 2.24)),
        )
        .reaction(OutReaction::new("plat", EffectProfile::Explosion))
        .reaction(OutReaction::new("hpad", EffectProfile::MinorExplosion))
        .reaction(OutReaction::new("cns1", EffectProfile::MinorExplosion))
        .reaction(OutReaction::new("ins1", EffectProfile::Explosion).smoking())
        .reaction(ins2)
        .reaction(OutReaction::new("ins3", EffectProfile::MinorExplosion).smoking())
        .reaction(OutReaction::new("ins4", EffectProfile::MinorExplosion))
        .reaction(ins5)
        .fails_when(
            FailureRule::all_out(&["cns1", "ins1", "ins2", "ins3", "ins5"])
                .or(FailureRule::out("plat")),
        )
        .shotdown_texture("oil_platform_charred");

    if defended {
        table = table
            .hitbox(
                HitboxData::new("def1", 80.0, 0.0, 30.0)
                    .labels("sam1", "SAM1")
                    .sphere(v(-19.5, 11.0, 75.5), 4.2),
            )
            .hitbox(
                HitboxData::new("def2", 80.0, 0.0, 30.0)
                    .labels("sam2", "SAM2")
                    .sphere(v(22.0, -24.5, 61.5), 4.2),
            )
            .reaction(OutReaction::new("def1", EffectProfile::Explosion).removes(&SAM1_HANDLES))
            .reaction(OutReaction::new("def2", EffectProfile::Explosion).removes(&SAM2_HANDLES));
    }
    table
}

/// Hitbox names of the drilling rig legs.
pub const RIG_LEGS: [&str; 4] = ["leg1", "leg2", "leg3", "leg4"];

/// Four-legged drilling rig. Any two legs out topples it, and only a
/// toppling rig throws its derrick.
pub struct DrillingRig {
    table: DamageTable,
    topple: Vec<BreakupData>,
}

impl DrillingRig {
    pub fn new() -> Self {
        let leg = |name: &str, x: f64, y: f64| {
            HitboxData::new(name, 450.0, 1.0, 210.0)
                .cuboid(v(x, y, 23.31), v(3.79, 3.79, 23.31))
                .unselectable()
        };

        let mut table = DamageTable::new("drilling_rig", STRUCTURE_SHOTDOWN_DELAY)
            .hitbox(
                HitboxData::new("plat", 3800.0, 500.0, 2000.0)
                    .labels("platform", "PLAT")
                    .cuboid(v(-3.63, 1.24, 36.57), v(45.05, 27.77, 5.41))
                    .cuboid(v(-30.25, 1.32, 49.12), v(7.26, 26.90, 7.15)),
            )
            .hitbox(leg(RIG_LEGS[0], -40.78, 20.79))
            .hitbox(leg(RIG_LEGS[1], 33.47, 20.36))
            .hitbox(leg(RIG_LEGS[2], -40.60, -18.00))
            .hitbox(leg(RIG_LEGS[3], 33.47, -17.91))
            .hitbox(
                HitboxData::new("hpad", 180.0, 1.0, 90.0)
                    .labels("helipad", "HPAD")
                    .cuboid(v(-57.73, -25.09, 52.22), v(17.0, 17.0, 3.93))
                    .unselectable(),
            )
            .hitbox(
                HitboxData::new("cns1", 160.0, 0.0, 80.0)
                    .labels("construction1", "CNS1")
                    .cuboid(v(34.74, -7.37, 62.93), v(2.0, 2.0, 20.96))
                    .cuboid(v(34.85, -28.34, 81.59), v(2.2, 51.2, 2.2)),
            )
            .hitbox(
                HitboxData::new("cns2", 160.0, 0.0, 80.0)
                    .labels("construction2", "CNS2")
                    .cuboid(v(-31.69, 22.43, 85.65), v(2.4, 2.4, 29.39))
                    .cuboid(v(-10.50, 22.40, 112.01), v(51.12, 2.4, 1.4)),
            )
            .hitbox(
                HitboxData::new("ins1", 400.0, 0.0, 200.0)
                    .labels("installation1", "INS1")
                    .cuboid(v(-1.19, 1.53, 49.79), v(16.43, 23.07, 7.82))
                    .cuboid(v(-17.17, 10.04, 54.76), v(8.98, 14.05, 12.79)),
            )
            .hitbox(
                HitboxData::new("ins2", 400.0, 0.0, 200.0)
                    .labels("installation2", "INS2")
                    .cuboid(v(22.89, 1.32, 49.12), v(7.26, 26.90, 7.15)),
            )
            .hitbox(
                HitboxData::new("ins3", 200.0, 0.0, 140.0)
                    .labels("installation3", "INS3")
                    .cuboid(v(2.84, 5.70, 65.48), v(7.5, 15.0, 7.88)),
            )
            .reaction(OutReaction::new("plat", EffectProfile::Explosion))
            .reaction(OutReaction::new("hpad", EffectProfile::MinorExplosion))
            .reaction(OutReaction::new("cns1", EffectProfile::MinorExplosion))
            .reaction(OutReaction::new("cns2", EffectProfile::MinorExplosion))
            .reaction(
                OutReaction::new("ins1", EffectProfile::Explosion)
                    .smoking()
                    .zeroes(&["ins3"]),
            )
            .reaction(OutReaction::new("ins2", EffectProfile::Explosion).smoking())
            .reaction(OutReaction::new("ins3", EffectProfile::MinorExplosion).smoking())
            .fails_when(
                FailureRule::all_out(&["ins1", "ins2", "ins3"])
                    .or(FailureRule::out("plat"))
                    .or(FailureRule::at_least_out(2, &RIG_LEGS)),
            )
            .shotdown_texture("drilling_rig_charred");
        for name in RIG_LEGS {
            table = table.reaction(OutReaction::new(name, EffectProfile::MinorExplosion));
        }

        Self {
            table,
            topple: vec![
                ground_large("derrick", 1.0).into(),
                ground_small("crane_arm", 1.0).into(),
            ],
        }
    }

    fn legs_out(hitboxes: &HitboxSet) -> usize {
        RIG_LEGS.iter().filter(|l| hitboxes.is_out(l)).count()
    }
}

impl Default for DrillingRig {
    fn default() -> Self {
        Self::new()
    }
}

impl DamageProfile for DrillingRig {
    fn table(&self) -> &DamageTable {
        &self.table
    }

    fn select_breakup(
        &self,
        hitboxes: &HitboxSet,
        _hit_force: f64,
        _rng: &mut dyn RngCore,
    ) -> BreakupPlan {
        if Self::legs_out(hitboxes) >= 2 {
            BreakupPlan {
                parts: self.topple.clone(),
            }
        } else {
            BreakupPlan::default()
        }
    }
}
