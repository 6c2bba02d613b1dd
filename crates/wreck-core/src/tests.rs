#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::breakup::*;
    use crate::commands::{Hit, SimCommand};
    use crate::enums::*;
    use crate::error::ConfigError;
    use crate::events::SimEvent;
    use crate::sampled::{Direction, Sampled};
    use crate::state::WorldSnapshot;
    use crate::types::*;

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(7)
    }

    // ---- Sampled values ----

    #[test]
    fn test_fixed_sample_passes_through() {
        let mut rng = rng();
        let s = Sampled::Fixed(12.5);
        for _ in 0..10 {
            assert_eq!(s.sample(&mut rng), 12.5);
        }
    }

    #[test]
    fn test_range_sample_stays_in_bounds() {
        let mut rng = rng();
        let s = Sampled::Range(8.0, 16.0);
        let mut lo = f64::MAX;
        let mut hi = f64::MIN;
        for _ in 0..2000 {
            let v = s.sample(&mut rng);
            assert!((8.0..=16.0).contains(&v), "sample {v} outside [8, 16]");
            lo = lo.min(v);
            hi = hi.max(v);
        }
        // Uniform over the range, so both ends get visited.
        assert!(lo < 9.0, "min sample {lo}");
        assert!(hi > 15.0, "max sample {hi}");
    }

    #[test]
    fn test_degenerate_range_is_constant() {
        let mut rng = rng();
        let s = Sampled::Range(3.0, 3.0);
        assert_eq!(s.sample(&mut rng), 3.0);
        assert!(s.validate("x").is_ok());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = Sampled::Range(10.0, 2.0).validate("wing.duration").unwrap_err();
        match err {
            ConfigError::InvertedRange { field, min, max } => {
                assert_eq!(field, "wing.duration");
                assert_eq!(min, 10.0);
                assert_eq!(max, 2.0);
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_restitution_bounds() {
        assert!(Sampled::Range(0.0, 1.0).validate_restitution("n").is_ok());
        assert!(Sampled::Fixed(0.2).validate_restitution("n").is_ok());
        assert!(matches!(
            Sampled::Fixed(1.2).validate_restitution("n"),
            Err(ConfigError::RestitutionOutOfRange { .. })
        ));
        assert!(matches!(
            Sampled::Range(-0.1, 0.5).validate_restitution("n"),
            Err(ConfigError::RestitutionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_sampled_json_forms() {
        let fixed: Sampled = serde_json::from_str("4.5").unwrap();
        assert_eq!(fixed, Sampled::Fixed(4.5));
        let range: Sampled = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(range, Sampled::Range(1.0, 2.0));
    }

    // ---- Directions ----

    #[test]
    fn test_cone_direction_within_band() {
        let mut rng = rng();
        let dir = Direction::cone(-180.0, 180.0, 20.0, 70.0);
        let min_z = 20f64.to_radians().sin();
        let max_z = 70f64.to_radians().sin();
        for _ in 0..1000 {
            let v = dir.sample(&mut rng);
            assert!((v.length() - 1.0).abs() < 1e-9);
            assert!(v.z >= min_z - 1e-9 && v.z <= max_z + 1e-9, "z = {}", v.z);
        }
    }

    #[test]
    fn test_cone_heading_zero_is_forward() {
        let mut rng = rng();
        let v = Direction::cone(0.0, 0.0, 0.0, 0.0).sample(&mut rng);
        assert!((v - DVec3::Y).length() < 1e-9, "got {v}");
        let left = Direction::cone(90.0, 90.0, 0.0, 0.0).sample(&mut rng);
        assert!((left - DVec3::NEG_X).length() < 1e-9, "got {left}");
    }

    #[test]
    fn test_fixed_direction_normalised() {
        let mut rng = rng();
        let v = Direction::Fixed(DVec3::new(0.0, 0.0, 5.0)).sample(&mut rng);
        assert_eq!(v, DVec3::Z);
        let zero = Direction::Fixed(DVec3::ZERO).sample(&mut rng);
        assert_eq!(zero, DVec3::ZERO);
    }

    #[test]
    fn test_inverted_cone_rejected() {
        let dir = Direction::cone(30.0, -30.0, 0.0, 10.0);
        assert!(dir.validate("d").is_err());
    }

    // ---- Breakup descriptors ----

    #[test]
    fn test_ground_descriptor_defaults() {
        let d = GroundBreakupData::new("turret", 0.5, Some(Sampled::Range(8.0, 10.0)));
        assert_eq!(d.normal_restitution, Sampled::Fixed(0.2));
        assert_eq!(d.tangent_restitution, Sampled::Fixed(0.7));
        assert_eq!(d.tumble_restitution, Sampled::Fixed(0.2));
        assert!(!d.keep_together);
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_ground_descriptor_probability_checked() {
        let d = GroundBreakupData::new("turret", 1.5, None);
        assert!(matches!(
            d.validate(),
            Err(ConfigError::ProbabilityOutOfRange { .. })
        ));
    }

    #[test]
    fn test_ground_descriptor_restitution_checked() {
        let d = GroundBreakupData::new("turret", 0.5, None).restitution(0.2, 1.4, 0.2);
        assert!(matches!(
            d.validate(),
            Err(ConfigError::RestitutionOutOfRange { .. })
        ));
    }

    #[test]
    fn test_air_descriptor_from_json() {
        let json = r#"{
            "kind": "Air",
            "handles": ["wing_right"],
            "duration": [15.0, 20.0],
            "terminal_speed": [100.0, 200.0],
            "off_direction": { "heading": [-120.0, -60.0], "pitch": [-30.0, 30.0] },
            "off_speed": [5.0, 10.0],
            "roll_speed_deg": [-720.0, 720.0],
            "roll_radius": [-1.0, 1.0]
        }"#;
        let data: BreakupData = serde_json::from_str(json).unwrap();
        assert_eq!(data.handles(), ["wing_right".to_string()]);
        assert!(data.validate().is_ok());
        match data {
            BreakupData::Air(air) => {
                assert_eq!(air.duration, Sampled::Range(15.0, 20.0));
                assert_eq!(air.limdamage, 0.0);
                assert!(air.trail.is_none());
                assert_eq!(
                    air.off_direction,
                    Some(Direction::cone(-120.0, -60.0, -30.0, 30.0))
                );
            }
            BreakupData::Ground(_) => panic!("expected an air descriptor"),
        }
    }

    #[test]
    fn test_air_descriptor_terminal_speed_must_be_positive() {
        for speed in [Sampled::Fixed(-10.0), Sampled::Fixed(0.0), Sampled::Range(0.0, 50.0)] {
            let d = AirBreakupData::new("wing", 5.0, speed);
            assert!(matches!(
                d.validate(),
                Err(ConfigError::NonPositive { ref field, .. }) if field == "wing.terminal_speed"
            ));
        }
        assert!(AirBreakupData::new("wing", 5.0, (0.5, 50.0)).validate().is_ok());
        assert!(AirBreakupData::new("wing", 5.0, 100.0)
            .with_limdamage(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn test_ground_descriptor_from_json_until_parent_gone() {
        let json = r#"{
            "kind": "Ground",
            "handles": ["cab", "cab_glass"],
            "break_probability": 1.0,
            "tumble_direction": [0.0, 0.0, 1.0],
            "keep_together": true
        }"#;
        let data: BreakupData = serde_json::from_str(json).unwrap();
        match data {
            BreakupData::Ground(g) => {
                assert!(g.duration.is_none());
                assert!(g.keep_together);
                assert_eq!(g.tumble_direction, Direction::Fixed(DVec3::Z));
                assert_eq!(g.handles.len(), 2);
            }
            BreakupData::Air(_) => panic!("expected a ground descriptor"),
        }
    }

    // ---- Commands, events, snapshots ----

    #[test]
    fn test_hit_builder() {
        let hit = Hit::new("wing_right", 80.0).critical().from_attacker(BodyId(9));
        assert!(hit.hits_critical);
        assert_eq!(hit.attacker, Some(BodyId(9)));
    }

    #[test]
    fn test_command_serde_tagged() {
        let cmd = SimCommand::Hit {
            body: BodyId(1),
            hit: Hit::new("main", 60.0),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"Hit\""));
        let back: SimCommand = serde_json::from_str(&json).unwrap();
        assert_eq!(json, serde_json::to_string(&back).unwrap());
    }

    #[test]
    fn test_event_serde() {
        let event = SimEvent::FragmentExpired {
            fragment: FragmentId(3),
            reason: FragmentEnd::ParentGone,
        };
        let json = serde_json::to_string(&event).unwrap();
        let back: SimEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_snapshot_serde() {
        let snapshot = WorldSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.time.tick, back.time.tick);
        assert_eq!(back.phase, SimPhase::Active);
    }

    // ---- Geometry helpers ----

    #[test]
    fn test_pose_local_round_trip() {
        let pose = Pose::new(
            DVec3::new(100.0, -20.0, 5.0),
            DQuat::from_rotation_z(std::f64::consts::FRAC_PI_2),
        );
        let local = DVec3::new(1.0, 2.0, 3.0);
        let world = pose.point(local);
        assert!((pose.to_local(world) - local).length() < 1e-9);
        // Yawed 90° left: forward now points West.
        assert!((pose.forward() - DVec3::NEG_X).length() < 1e-9);
    }

    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        for _ in 0..60 {
            time.advance(1.0 / 60.0);
        }
        assert_eq!(time.tick, 60);
        assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_family_airborne() {
        assert!(BodyFamily::Plane.is_airborne());
        assert!(BodyFamily::Heli.is_airborne());
        assert!(!BodyFamily::Vehicle.is_airborne());
        assert!(!BodyFamily::Building.is_airborne());
    }
}
