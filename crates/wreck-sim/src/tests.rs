//! Tests for the simulation engine, breakup physics and the destruction pipeline.

use std::sync::Arc;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use wreck_core::breakup::GroundBreakupData;
use wreck_core::commands::{Hit, SimCommand};
use wreck_core::constants::DT;
use wreck_core::enums::*;
use wreck_core::events::SimEvent;
use wreck_core::sampled::Direction;
use wreck_core::state::WorldSnapshot;
use wreck_core::types::{BodyId, DQuat, DVec3, EffectHandle, FragmentId, Pose, SoundHandle};
use wreck_damage::presets::{ground_large, ground_small};
use wreck_damage::{Archetype, DamageTable, HitboxData, OutReaction};
use wreck_terrain::FlatSurface;

use crate::body::BodySpec;
use crate::breakup::air::AirMotion;
use crate::breakup::ground::GroundMotion;
use crate::breakup::{ground_breakup, select_ground_parts, BreakupContext, BreakupSource, Motion};
use crate::effects::EffectLedger;
use crate::engine::{SimConfig, SimulationEngine};
use crate::scene::{ModelSpec, Scene, SceneGraph};

// ---- Helpers ----

fn v(x: f64, y: f64, z: f64) -> DVec3 {
    DVec3::new(x, y, z)
}

fn bomber_model() -> ModelSpec {
    ModelSpec::new()
        .node("wing_right", v(10.0, -2.0, 0.0))
        .node("wing_left", v(-10.0, -2.0, 0.0))
        .node("engine_right_1", v(5.0, -5.0, -1.5))
        .node("engine_right_2", v(9.0, -5.0, -1.5))
        .node("engine_left_1", v(-5.0, -5.0, -1.5))
        .node("engine_left_2", v(-9.0, -5.0, -1.5))
        .node("tail_fin", v(0.0, -22.0, 6.0))
        .node("wing_right_misc", v(10.0, -2.0, 0.5))
        .textured("bomber")
}

fn truck_model() -> ModelSpec {
    ModelSpec::new()
        .node("cab", v(0.0, 3.0, 2.0))
        .node("tarp", v(0.0, -1.5, 3.0))
        .node("wheel_front_left", v(-1.2, 3.0, 0.5))
        .node("wheel_front_right", v(1.2, 3.0, 0.5))
        .node("wheel_rear_left", v(-1.2, -3.0, 0.5))
        .node("wheel_rear_right", v(1.2, -3.0, 0.5))
        .node("misc", v(0.0, 0.0, 3.5))
        .textured("truck")
}

fn spawn_bomber(engine: &mut SimulationEngine, model: ModelSpec) -> BodyId {
    let spec = BodySpec::new("Bomber 1", BodyFamily::Plane)
        .at(Pose::at(v(0.0, 0.0, 1000.0)))
        .moving(v(0.0, 150.0, 0.0))
        .with_model(model);
    engine.spawn_archetype(Archetype::Bomber, spec).unwrap()
}

fn spawn_truck(engine: &mut SimulationEngine) -> BodyId {
    let spec = BodySpec::new("Truck 1", BodyFamily::Vehicle).with_model(truck_model());
    engine.spawn_archetype(Archetype::Truck, spec).unwrap()
}

fn hit(body: BodyId, hitbox: &str, force: f64) -> SimCommand {
    SimCommand::Hit {
        body,
        hit: Hit::new(hitbox, force),
    }
}

fn spawned_fragments(snap: &WorldSnapshot) -> Vec<(FragmentId, Vec<String>)> {
    snap.events
        .iter()
        .filter_map(|e| match e {
            SimEvent::FragmentSpawned {
                fragment, handles, ..
            } => Some((*fragment, handles.clone())),
            _ => None,
        })
        .collect()
}

fn fragment_by_handle(snap: &WorldSnapshot, handle: &str) -> FragmentId {
    spawned_fragments(snap)
        .into_iter()
        .find(|(_, handles)| handles.iter().any(|h| h == handle))
        .map(|(id, _)| id)
        .unwrap()
}

fn count_events(snaps: &[WorldSnapshot], pred: impl Fn(&SimEvent) -> bool) -> usize {
    snaps.iter().flat_map(|s| &s.events).filter(|e| pred(e)).count()
}

// ---- Determinism ----

fn scripted_run(seed: u64, ticks: usize) -> Vec<String> {
    let mut engine = SimulationEngine::new(SimConfig {
        seed,
        ..Default::default()
    });
    let bomber = spawn_bomber(&mut engine, bomber_model());
    let truck = spawn_truck(&mut engine);
    engine.queue_commands([hit(bomber, "wing_right", 1000.0), hit(truck, "main", 20.0)]);

    (0..ticks)
        .map(|_| serde_json::to_string(&engine.tick()).unwrap())
        .collect()
}

#[test]
fn test_determinism_same_seed() {
    let a = scripted_run(12345, 300);
    let b = scripted_run(12345, 300);
    for (i, (ja, jb)) in a.iter().zip(&b).enumerate() {
        assert_eq!(ja, jb, "Snapshots diverged at tick {i} with same seed");
    }
}

#[test]
fn test_determinism_different_seeds() {
    let a = scripted_run(111, 60);
    let b = scripted_run(222, 60);
    assert!(
        a.iter().zip(&b).any(|(ja, jb)| ja != jb),
        "Different seeds should sample different fragment launches"
    );
}

// ---- Air fragment physics ----

#[test]
fn test_air_speed_converges_to_terminal_speed() {
    let gravity = v(0.0, 0.0, -9.81);
    let mut pose = Pose::at(v(0.0, 0.0, 3000.0));
    let mut motion = AirMotion::new(v(0.0, 250.0, 0.0), DQuat::IDENTITY, 100.0, 0.0, 0.0);

    for _ in 0..(120 * 60) {
        motion.step(&mut pose, DT, 0.0, gravity);
    }
    assert!(
        (motion.speed() - 100.0).abs() < 1.0,
        "speed {} should settle at terminal speed",
        motion.speed()
    );
    // Terminal flight is straight down.
    assert!(motion.fvel.normalize().dot(-DVec3::Z) > 0.99);
}

#[test]
fn test_air_drag_never_reverses_flight() {
    let gravity = v(0.0, 0.0, -9.81);
    let mut pose = Pose::default();
    // Tiny terminal speed makes the raw drag overshoot.
    let mut motion = AirMotion::new(v(0.0, 300.0, 0.0), DQuat::IDENTITY, 1.0, 0.0, 0.0);
    motion.step(&mut pose, DT, 0.0, gravity);
    assert!(motion.fvel.y > 0.0, "drag reversed the flight: {}", motion.fvel);
    assert!(pose.position.y > 0.0);
}

#[test]
fn test_air_forward_axis_tracks_velocity() {
    let gravity = v(0.0, 0.0, -9.81);
    let mut pose = Pose::default();
    let mut motion = AirMotion::new(v(0.0, 120.0, 0.0), DQuat::IDENTITY, 150.0, 0.0, 0.0);

    for _ in 0..(5 * 60) {
        motion.step(&mut pose, DT, 0.0, gravity);
        let along = pose.forward().dot(motion.fvel.normalize());
        assert!(along > 0.999, "forward axis drifted from flight path: {along}");
    }
    // The path has bent noticeably downward.
    assert!(pose.forward().z < -0.1);
}

#[test]
fn test_air_roll_decays_to_nothing() {
    let gravity = v(0.0, 0.0, -9.81);
    let mut pose = Pose::default();
    let mut motion = AirMotion::new(
        v(0.0, 100.0, 0.0),
        DQuat::IDENTITY,
        150.0,
        360f64.to_radians(),
        1.0,
    );
    assert!(motion.tvel.length() > 6.0);

    motion.step(&mut pose, DT, 0.5, gravity);
    // Speed and radius both scale by (1 - rd)^2.
    let expected = std::f64::consts::TAU * 0.25 * 0.25;
    assert!((motion.tvel.length() - expected).abs() < 1e-9);
    // Tangential velocity stays perpendicular to the flight direction.
    assert!(motion.tvel.normalize().dot(motion.fvel.normalize()).abs() < 1e-9);

    motion.step(&mut pose, DT, 1.0, gravity);
    assert!(motion.tvel.length() < 1e-12);
}

#[test]
fn test_air_step_with_zero_dt_stays_put() {
    let gravity = v(0.0, 0.0, -9.81);
    let start = Pose::at(v(0.0, 0.0, 500.0));
    // Zero terminal speed makes the drag term unbounded.
    for terminal_speed in [0.0, 150.0] {
        let mut pose = start;
        let mut motion = AirMotion::new(v(0.0, 50.0, 0.0), DQuat::IDENTITY, terminal_speed, 0.0, 0.0);
        motion.step(&mut pose, 0.0, 0.0, gravity);
        assert_eq!(pose, start);
        assert_eq!(motion.fvel, v(0.0, 50.0, 0.0));
    }
}

// ---- Ground fragment physics ----

fn loose_part(velocity: DVec3) -> GroundMotion {
    GroundMotion {
        velocity,
        tumble_axis: DVec3::X,
        tumble_speed: 5.0,
        normal_restitution: 0.5,
        tangent_restitution: 0.7,
        tumble_restitution: 0.2,
        fix_elevation: 0.0,
        at_rest: false,
    }
}

#[test]
fn test_ground_bounce_never_gains_speed_and_comes_to_rest() {
    let ground = FlatSurface::new(0.0);
    let gravity = v(0.0, 0.0, -9.81);
    let mut pose = Pose::at(v(0.0, 0.0, 10.0));
    let mut motion = loose_part(v(3.0, 0.0, 2.0));

    let mut touches = 0;
    let mut rested = false;
    for _ in 0..(60 * 60) {
        let step = motion.step(&mut pose, DT, gravity, &ground, 0.5);
        if step.touched {
            touches += 1;
            assert!(
                step.rebound_speed <= step.impact_speed + 1e-9,
                "bounce gained speed: {} -> {}",
                step.impact_speed,
                step.rebound_speed
            );
        }
        assert!(pose.position.z >= -1e-9, "fell through the ground: {}", pose.position);
        if step.came_to_rest {
            rested = true;
            break;
        }
    }

    assert!(touches >= 2, "expected several bounces, got {touches}");
    assert!(rested);
    assert!(motion.at_rest);
    assert_eq!(motion.velocity, DVec3::ZERO);
    assert!(pose.position.z.abs() < 1e-9, "rest position {} not on surface", pose.position);

    // A resting part stays put.
    let before = pose;
    let step = motion.step(&mut pose, DT, gravity, &ground, 0.5);
    assert!(!step.touched);
    assert_eq!(pose, before);
}

#[test]
fn test_ground_tumble_decays_on_touch() {
    let ground = FlatSurface::new(0.0);
    let gravity = v(0.0, 0.0, -9.81);
    let mut pose = Pose::at(v(0.0, 0.0, 0.05));
    let mut motion = loose_part(v(0.0, 0.0, -10.0));

    let step = motion.step(&mut pose, DT, gravity, &ground, 0.5);
    assert!(step.touched);
    assert!((motion.tumble_speed - 1.0).abs() < 1e-12);
}

#[test]
fn test_ground_fix_elevation_raises_contact() {
    let ground = FlatSurface::new(0.0);
    let gravity = v(0.0, 0.0, -9.81);
    let mut pose = Pose::at(v(0.0, 0.0, 3.0));
    let mut motion = GroundMotion {
        normal_restitution: 0.0,
        tangent_restitution: 0.0,
        fix_elevation: 1.2,
        ..loose_part(DVec3::ZERO)
    };

    for _ in 0..(10 * 60) {
        if motion.step(&mut pose, DT, gravity, &ground, 0.5).came_to_rest {
            break;
        }
    }
    assert!(motion.at_rest);
    assert!((pose.position.z - 1.2).abs() < 1e-9);
}

#[test]
fn test_tumble_axis_follows_body_orientation() {
    let body = BodyId(3);
    // Yawed 90° left: the body's x axis points along world y.
    let pose = Pose::new(v(0.0, 0.0, 5.0), DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2));
    let mut scene = SceneGraph::new();
    scene.insert_model(body, ModelSpec::new().node("turret", v(0.0, 0.0, 1.0)), pose);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut effects = EffectLedger::default();
    let mut events = Vec::new();
    let mut next_fragment = 0;
    let mut ctx = BreakupContext {
        scene: &mut scene,
        rng: &mut rng,
        effects: &mut effects,
        events: &mut events,
        next_fragment: &mut next_fragment,
    };
    let src = BreakupSource {
        body,
        pose,
        velocity: DVec3::ZERO,
    };
    let turret = GroundBreakupData::new("turret", 1.0, None).tumble(Direction::Fixed(DVec3::X), 90.0);

    let parts = ground_breakup(&src, &[turret], &mut ctx);
    assert_eq!(parts.len(), 1);
    match &parts[0].motion {
        Motion::Ground(m) => assert!((m.tumble_axis - DVec3::Y).length() < 1e-12, "axis {}", m.tumble_axis),
        Motion::Air(_) => panic!("expected a ground part"),
    }
}

// ---- Ground part selection ----

#[test]
fn test_break_probability_zero_and_one() {
    let parts = vec![ground_small("never", 0.0), ground_small("always", 1.0)];
    let mut rng = ChaCha8Rng::seed_from_u64(7);

    for _ in 0..10_000 {
        let chosen = select_ground_parts(&parts, &mut rng);
        assert_eq!(chosen.len(), 1);
        assert_eq!(chosen[0].handles, vec!["always".to_string()]);
    }
}

#[test]
fn test_alternatives_for_same_handles_pick_exactly_one() {
    let parts = vec![ground_small("cab", 0.7), ground_large("cab", 0.3)];
    let mut rng = ChaCha8Rng::seed_from_u64(99);

    let mut first = 0;
    let trials = 10_000;
    for _ in 0..trials {
        let chosen = select_ground_parts(&parts, &mut rng);
        assert_eq!(chosen.len(), 1, "alternatives must yield exactly one part");
        if !chosen[0].keep_together {
            first += 1;
        }
    }
    let share = first as f64 / trials as f64;
    assert!((0.67..0.73).contains(&share), "first alternative share {share}");
}

#[test]
fn test_independent_parts_roll_separately() {
    let parts = vec![ground_small("a", 0.5), ground_small("b", 0.5)];
    let mut rng = ChaCha8Rng::seed_from_u64(3);

    let mut both = 0;
    for _ in 0..4_000 {
        if select_ground_parts(&parts, &mut rng).len() == 2 {
            both += 1;
        }
    }
    let share = both as f64 / 4_000.0;
    assert!((0.2..0.3).contains(&share), "both selected {share}");
}

// ---- Destruction pipeline ----

#[test]
fn test_bomber_wing_loss_breaks_up_in_the_air() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(hit(bomber, "wing_right", 1000.0));
    let snap = engine.tick();

    let out: Vec<&str> = snap
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::HitboxOut { hitbox, .. } => Some(hitbox.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(out, vec!["wing_right", "engine_right_1", "engine_right_2"]);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::FullFailure { body, .. } if *body == bomber)));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::SubgeometryRemoved { handles, .. } if handles == &vec!["wing_right_misc".to_string()]
    )));
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::TextureSwapped { texture, .. } if texture == "bomber_shotdown"
    )));

    let spawned = spawned_fragments(&snap);
    assert_eq!(spawned.len(), 3);
    assert!(snap.fragments.iter().all(|f| f.kind == FragmentKind::Air));

    let view = snap.body(bomber).unwrap();
    assert!(view.control_out);
    assert!(view.inert);
    assert!(!view.destroyed);
    assert!(engine.scene().find_named(bomber, "wing_right").is_none());
}

#[test]
fn test_weak_kill_releases_fewer_air_fragments() {
    let released = |force: f64| -> usize {
        (0..8u64)
            .map(|seed| {
                let mut engine = SimulationEngine::new(SimConfig {
                    seed,
                    ..Default::default()
                });
                let bomber = spawn_bomber(&mut engine, bomber_model());
                engine.queue_command(hit(bomber, "wing_right", force));
                let snap = engine.tick();
                assert!(snap.body(bomber).unwrap().control_out);
                spawned_fragments(&snap).len()
            })
            .sum()
    };
    let strong = released(1000.0);
    let weak = released(25.0);
    assert_eq!(strong, 8 * 3);
    assert!(weak < strong, "weak kills released {weak} of {strong} fragments");
}

#[test]
fn test_fragments_inherit_body_velocity() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(hit(bomber, "wing_right", 1000.0));
    let snap = engine.tick();

    for f in &snap.fragments {
        assert!(
            (140.0..=160.0).contains(&f.speed),
            "fragment {:?} speed {}",
            f.id,
            f.speed
        );
    }
}

#[test]
fn test_fragments_start_integrating_next_tick() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(hit(bomber, "wing_right", 1000.0));

    let first = engine.tick();
    let wing = fragment_by_handle(&first, "wing_right");
    let at_spawn = first.fragments.iter().find(|f| f.id == wing).unwrap();
    assert_eq!(at_spawn.elapsed_secs, 0.0);
    // Placed where the node sat on the body before the body moved this tick.
    assert!((at_spawn.position - v(10.0, -2.0, 1000.0)).length() < 1e-9);

    let second = engine.tick();
    let moved = second.fragments.iter().find(|f| f.id == wing).unwrap();
    assert!((moved.elapsed_secs - DT).abs() < 1e-12);
    assert!(moved.position != at_spawn.position);
}

#[test]
fn test_missing_subgeometry_is_skipped() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let model = ModelSpec::new()
        .node("wing_right", v(10.0, -2.0, 0.0))
        .node("engine_right_1", v(5.0, -5.0, -1.5));
    let bomber = spawn_bomber(&mut engine, model);
    engine.queue_command(hit(bomber, "wing_right", 1000.0));
    let snap = engine.tick();

    let spawned = spawned_fragments(&snap);
    assert_eq!(spawned.len(), 2);
    assert!(spawned
        .iter()
        .all(|(_, handles)| handles != &vec!["engine_right_2".to_string()]));
    // The body still failed normally.
    assert!(snap.body(bomber).unwrap().control_out);
}

#[test]
fn test_no_duplicate_effects_after_failure() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let truck = spawn_truck(&mut engine);
    engine.queue_command(hit(truck, "main", 20.0));
    let first = engine.tick();
    assert!(first
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::FullFailure { .. })));

    engine.queue_commands([hit(truck, "main", 50.0), hit(truck, "main", 50.0)]);
    let second = engine.tick();
    let hits: Vec<bool> = second
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::Hit { inert, .. } => Some(*inert),
            _ => None,
        })
        .collect();
    assert_eq!(hits, vec![true, true]);
    assert!(!second.events.iter().any(|e| matches!(
        e,
        SimEvent::EffectSpawned { .. } | SimEvent::FullFailure { .. } | SimEvent::FragmentSpawned { .. }
    )));
}

#[test]
fn test_truck_cab_breaks_exactly_once() {
    for seed in 0..20 {
        let mut engine = SimulationEngine::new(SimConfig {
            seed,
            ..Default::default()
        });
        let truck = spawn_truck(&mut engine);
        engine.queue_command(hit(truck, "main", 20.0));
        let snap = engine.tick();

        let cabs = spawned_fragments(&snap)
            .into_iter()
            .filter(|(_, handles)| handles == &vec!["cab".to_string()])
            .count();
        assert_eq!(cabs, 1, "seed {seed}: cab alternatives produced {cabs} parts");
        assert!(snap
            .fragments
            .iter()
            .all(|f| f.kind == FragmentKind::Ground));
        assert!(snap.events.iter().any(|e| matches!(
            e,
            SimEvent::TextureSwapped { texture, .. } if texture == "truck_burned"
        )));
    }
}

#[test]
fn test_kept_together_nodes_follow_pivot() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let truck = spawn_truck(&mut engine);
    engine.queue_command(hit(truck, "main", 20.0));
    let first = engine.tick();
    let cab = fragment_by_handle(&first, "cab");

    for _ in 0..30 {
        let snap = engine.tick();
        let part = snap.fragments.iter().find(|f| f.id == cab).unwrap();
        // The cab node never leaves the body model.
        assert!(engine.scene().find_named(truck, "cab").is_some());
        let node = engine.scene().node_pose(truck, "cab").unwrap();
        assert!((node.position - part.position).length() < 1e-9);
        assert!(node.orientation.abs_diff_eq(part.orientation, 1e-12));
    }
}

#[test]
fn test_thrown_parts_leave_the_body_model() {
    let mut engine =
        SimulationEngine::new(SimConfig::default()).with_scene(SceneGraph::new());
    let truck = spawn_truck(&mut engine);
    engine.queue_command(hit(truck, "main", 20.0));
    let snap = engine.tick();

    assert!(engine.scene().find_named(truck, "misc").is_none());
    for (id, handles) in spawned_fragments(&snap) {
        assert!(engine.scene().fragment_pose(id).is_some());
        if handles == vec!["cab".to_string()] {
            continue;
        }
        assert!(engine.scene().find_named(truck, &handles[0]).is_none());
    }
}

#[test]
fn test_parent_gone_ends_tied_fragments() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let truck = spawn_truck(&mut engine);
    engine.queue_command(hit(truck, "main", 20.0));
    let first = engine.tick();
    let cab = fragment_by_handle(&first, "cab");

    for _ in 0..10 {
        engine.tick();
    }
    engine.queue_command(SimCommand::DespawnBody { body: truck });
    let snap = engine.tick();

    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::FragmentExpired { fragment, reason: FragmentEnd::ParentGone } if *fragment == cab
    )));
    assert!(snap.fragments.iter().all(|f| f.id != cab));
    assert!(engine.scene().fragment_pose(cab).is_none());
    assert!(snap.body(truck).is_none());
}

#[test]
fn test_fixed_lifetime_expires() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(hit(bomber, "wing_right", 1000.0));
    let first = engine.tick();
    assert_eq!(first.fragments.len(), 3);

    let snaps: Vec<WorldSnapshot> = (0..(21 * 60)).map(|_| engine.tick()).collect();
    let expired = count_events(&snaps, |e| {
        matches!(
            e,
            SimEvent::FragmentExpired {
                reason: FragmentEnd::Expired,
                ..
            }
        )
    });
    assert_eq!(expired, 3);
    assert!(snaps.last().unwrap().fragments.is_empty());
}

#[test]
fn test_trail_fades_and_is_released_once() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(hit(bomber, "wing_right", 1000.0));
    let first = engine.tick();

    let trails: Vec<EffectHandle> = first
        .events
        .iter()
        .filter_map(|e| match e {
            SimEvent::EffectSpawned {
                handle,
                profile: EffectProfile::SmokeTrail,
                ..
            } => Some(*handle),
            _ => None,
        })
        .collect();
    assert_eq!(trails.len(), 3);

    let wing = fragment_by_handle(&first, "wing_right");
    let mut last_fade = 1.0;
    let mut snaps = Vec::new();
    for _ in 0..(25 * 60) {
        let snap = engine.tick();
        if let Some(f) = snap.fragments.iter().find(|f| f.id == wing) {
            if let Some(&fade) = f.trail_fades.first() {
                assert!(fade <= last_fade + 1e-12, "trail brightened: {fade}");
                assert!((0.0..=1.0).contains(&fade));
                last_fade = fade;
            } else if f.elapsed_secs < 9.0 {
                // Trail lifetime is at most 0.4 of a 20 s fragment.
                assert!(f.elapsed_secs >= 3.0, "trail gone too early at {}", f.elapsed_secs);
            }
            if f.elapsed_secs > 8.1 {
                assert!(f.trail_fades.is_empty());
            }
        }
        snaps.push(snap);
    }

    for handle in trails {
        let released = count_events(&snaps, |e| {
            matches!(e, SimEvent::EffectReleased { handle: h } if *h == handle)
        });
        assert_eq!(released, 1, "trail {handle:?} released {released} times");
    }
}

#[test]
fn test_kill_credited_once_after_shotdown() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    let attacker = BodyId(77);
    engine.queue_command(SimCommand::Hit {
        body: bomber,
        hit: Hit::new("engine_left_1", 50.0).from_attacker(attacker),
    });

    let snaps: Vec<WorldSnapshot> = (0..(5 * 60)).map(|_| engine.tick()).collect();
    let credited = count_events(&snaps, |e| {
        matches!(e, SimEvent::KillCredited { body, attacker: a } if *body == bomber && *a == attacker)
    });
    assert_eq!(credited, 1);
    assert_eq!(
        count_events(&snaps, |e| matches!(e, SimEvent::Shotdown { .. })),
        1
    );

    let shotdown_tick = snaps
        .iter()
        .position(|s| s.events.iter().any(|e| matches!(e, SimEvent::Shotdown { .. })))
        .unwrap();
    let at = snaps[shotdown_tick].time.elapsed_secs;
    assert!((at - 3.0).abs() < 2.0 * DT, "shotdown at {at}s");
    assert!(snaps.last().unwrap().body(bomber).unwrap().destroyed);
}

#[test]
fn test_failure_stops_sound_and_releases_owned_effects() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let spec = BodySpec::new("Bomber 2", BodyFamily::Plane)
        .at(Pose::at(v(0.0, 0.0, 800.0)))
        .with_model(bomber_model())
        .with_ambient_sound(SoundHandle(4))
        .with_effect(EffectProfile::FireAndSmoke, v(0.0, -20.0, 0.0));
    let bomber = engine.spawn_archetype(Archetype::Bomber, spec).unwrap();
    let spawn_snap = engine.tick();
    let owned = spawn_snap
        .events
        .iter()
        .find_map(|e| match e {
            SimEvent::EffectSpawned { handle, .. } => Some(*handle),
            _ => None,
        })
        .unwrap();

    engine.queue_command(hit(bomber, "wing_left", 100.0));
    let snap = engine.tick();
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::AmbientSoundStopped { sound: SoundHandle(4), .. }
    )));
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, SimEvent::EffectReleased { handle } if *handle == owned)));

    // Removing the wreck later releases nothing twice.
    engine.queue_command(SimCommand::DespawnBody { body: bomber });
    let gone = engine.tick();
    assert!(!gone.events.iter().any(|e| matches!(
        e,
        SimEvent::AmbientSoundStopped { .. } | SimEvent::EffectReleased { .. }
    )));
}

// ---- Commands ----

#[test]
fn test_hit_at_resolves_nearest_hitbox() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(SimCommand::HitAt {
        body: bomber,
        point: v(12.0, -2.0, 1000.8),
        force: 100.0,
        hits_critical: false,
        attacker: None,
    });
    let snap = engine.tick();
    assert!(snap.events.iter().any(|e| matches!(
        e,
        SimEvent::Hit { hitbox, inert: false, .. } if hitbox == "wing_right"
    )));
}

#[test]
fn test_hit_at_far_from_body_does_nothing() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(SimCommand::HitAt {
        body: bomber,
        point: v(500.0, 500.0, 0.0),
        force: 100.0,
        hits_critical: false,
        attacker: None,
    });
    let snap = engine.tick();
    assert!(snap.events.is_empty());
}

#[test]
fn test_inactive_hitbox_absorbs_hits() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_commands([
        SimCommand::SetHitboxActive {
            body: bomber,
            hitbox: "wing_right".into(),
            active: false,
        },
        hit(bomber, "wing_right", 1000.0),
    ]);
    let snap = engine.tick();
    let view = snap.body(bomber).unwrap();
    assert!(!view.hitbox("wing_right").unwrap().active);
    assert_eq!(view.hitbox("wing_right").unwrap().hitpoints, 60.0);
    assert!(!view.control_out);
}

#[test]
fn test_despawn_is_idempotent() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let spec = BodySpec::new("Truck 2", BodyFamily::Vehicle)
        .with_model(truck_model())
        .with_ambient_sound(SoundHandle(1));
    let truck = engine.spawn_archetype(Archetype::Truck, spec).unwrap();
    engine.tick();

    engine.queue_commands([
        SimCommand::DespawnBody { body: truck },
        SimCommand::DespawnBody { body: truck },
    ]);
    let snap = engine.tick();
    assert_eq!(
        count_events(std::slice::from_ref(&snap), |e| matches!(
            e,
            SimEvent::AmbientSoundStopped { .. }
        )),
        1
    );
    assert!(!engine.contains_body(truck));
    assert!(engine.scene().find_named(truck, "cab").is_none());

    // Hits on a removed body are ignored.
    engine.queue_command(hit(truck, "main", 20.0));
    assert!(engine.tick().events.is_empty());
}

#[test]
fn test_pause_freezes_fragments() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(hit(bomber, "wing_right", 1000.0));
    engine.tick();
    let before = engine.tick();

    engine.queue_command(SimCommand::Pause);
    let paused = engine.tick();
    assert_eq!(paused.phase, SimPhase::Paused);
    assert_eq!(paused.time, before.time);
    for (a, b) in before.fragments.iter().zip(&paused.fragments) {
        assert_eq!(a.position, b.position);
    }

    engine.queue_command(SimCommand::Resume);
    let resumed = engine.tick();
    assert_eq!(resumed.phase, SimPhase::Active);
    assert_eq!(resumed.time.tick, before.time.tick + 1);
}

#[test]
fn test_time_scale_is_clamped() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(SimCommand::SetTimeScale { scale: 10.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 4.0);
    engine.queue_command(SimCommand::SetTimeScale { scale: -1.0 });
    engine.tick();
    assert_eq!(engine.time_scale(), 0.0);
}

#[test]
fn test_zero_time_scale_freezes_fragments_without_nan() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    let truck = spawn_truck(&mut engine);
    engine.queue_commands([hit(bomber, "wing_right", 1000.0), hit(truck, "main", 20.0)]);
    engine.tick();
    let before = engine.tick();
    assert!(!before.fragments.is_empty());

    engine.queue_command(SimCommand::SetTimeScale { scale: 0.0 });
    let snaps: Vec<WorldSnapshot> = (0..10).map(|_| engine.tick()).collect();
    let last = snaps.last().unwrap();
    assert_eq!(last.time.elapsed_secs, before.time.elapsed_secs);
    assert_eq!(last.fragments.len(), before.fragments.len());
    for (a, b) in before.fragments.iter().zip(&last.fragments) {
        assert!(b.position.is_finite() && b.speed.is_finite(), "fragment {:?} went NaN", b.id);
        assert_eq!(a.position, b.position);
    }
}

#[test]
fn test_clear_fragments_releases_everything() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    engine.queue_command(hit(bomber, "wing_right", 1000.0));
    let first = engine.tick();
    let ids: Vec<FragmentId> = spawned_fragments(&first).into_iter().map(|(id, _)| id).collect();

    engine.clear_fragments();
    let snap = engine.tick();
    assert!(snap.fragments.is_empty());
    for id in ids {
        assert!(snap.events.iter().any(|e| matches!(
            e,
            SimEvent::FragmentExpired { fragment, reason: FragmentEnd::Removed } if *fragment == id
        )));
        assert!(engine.scene().fragment_pose(id).is_none());
    }
    assert_eq!(
        count_events(std::slice::from_ref(&snap), |e| matches!(
            e,
            SimEvent::EffectReleased { .. }
        )),
        3
    );
}

// ---- Body setup ----

#[test]
fn test_invalid_table_spawns_nothing() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let table = DamageTable::new("broken", 1.0)
        .hitbox(HitboxData::new("main", 10.0, 0.0, 5.0).sphere(DVec3::ZERO, 1.0))
        .reaction(OutReaction::new("nope", EffectProfile::Explosion));
    let result = engine.spawn_body(
        Arc::new(table),
        BodySpec::new("Broken", BodyFamily::Building),
    );
    assert!(result.is_err());
    let snap = engine.tick();
    assert!(snap.bodies.is_empty());
    assert!(snap.events.is_empty());
}

#[test]
fn test_bodies_move_with_velocity() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let bomber = spawn_bomber(&mut engine, bomber_model());
    let mut snap = engine.tick();
    for _ in 1..60 {
        snap = engine.tick();
    }
    let y = snap.body(bomber).unwrap().position.y;
    assert!((y - 150.0).abs() < 1e-6, "after 1 s bomber at y={y}");
    let model_node = engine.scene().node_pose(bomber, "wing_right").unwrap();
    assert!((model_node.position - v(10.0, 148.0, 1000.0)).length() < 1e-6);
}

// ---- Scene graph ----

#[test]
fn test_scene_operations_on_missing_things_are_noops() {
    let mut scene = SceneGraph::new();
    let body = BodyId(3);
    assert!(scene.remove_named(body, &["x".to_string()]).is_empty());
    assert!(!scene.swap_texture(body, "burned"));
    assert!(!scene.detach(body, "x", FragmentId(0)));
    scene.set_fragment_transform(FragmentId(9), Pose::default());
    scene.release_fragment(FragmentId(9));
    scene.remove_model(body);

    scene.insert_model(body, ModelSpec::new().node("gun", v(0.0, 1.0, 0.0)), Pose::default());
    // Detaching onto a fragment node that does not exist leaves the node.
    assert!(!scene.detach(body, "gun", FragmentId(0)));
    assert!(scene.find_named(body, "gun").is_some());
}

#[test]
fn test_scene_detach_moves_node() {
    let mut scene = SceneGraph::new();
    let body = BodyId(1);
    scene.insert_model(body, truck_model(), Pose::default());
    scene.create_fragment_node(FragmentId(2), Pose::default(), Some("truck"));

    assert!(scene.detach(body, "tarp", FragmentId(2)));
    assert!(!scene.detach(body, "tarp", FragmentId(2)));
    assert!(scene.find_named(body, "tarp").is_none());
    let node = scene.fragment(FragmentId(2)).unwrap();
    assert_eq!(node.handles, vec!["tarp".to_string()]);
    assert_eq!(node.texture.as_deref(), Some("truck"));
    assert_eq!(scene.fragment_count(), 1);
}

#[test]
fn test_scene_shotdown_variant_swaps_once() {
    let mut scene = SceneGraph::new();
    let body = BodyId(0);
    let model = ModelSpec::new()
        .node("rotor", v(0.0, 0.0, 3.0))
        .shotdown_variant(&[("wreck_hull", v(0.0, 0.0, 1.0))]);
    scene.insert_model(body, model, Pose::default());

    assert!(scene.swap_to_shotdown_variant(body));
    assert!(scene.find_named(body, "rotor").is_none());
    assert!(scene.find_named(body, "wreck_hull").is_some());
    assert!(!scene.swap_to_shotdown_variant(body));
    assert!(scene.has_model(body));
}
