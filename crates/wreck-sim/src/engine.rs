//! Simulation engine: the core of the damage and breakup simulation.
//!
//! `SimulationEngine` owns the hecs ECS world, processes commands, runs all
//! systems, and produces `WorldSnapshot`s. Completely headless, enabling
//! deterministic testing.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use hecs::{Entity, World};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use wreck_core::commands::{Hit, SimCommand};
use wreck_core::components::OwnedEffects;
use wreck_core::constants::{GRAVITY, REST_SPEED, TICK_RATE};
use wreck_core::enums::SimPhase;
use wreck_core::error::ConfigError;
use wreck_core::events::SimEvent;
use wreck_core::state::WorldSnapshot;
use wreck_core::types::{BodyId, DVec3, SimTime};
use wreck_damage::{get_profile, Archetype, DamageProfile};
use wreck_terrain::{FlatSurface, Surface};

use crate::body::{BodySpec, Damage};
use crate::breakup::{BreakupContext, BreakupPart, StepEnv};
use crate::effects::EffectLedger;
use crate::scene::{Scene, SceneGraph};
use crate::systems;
use crate::world_setup;

/// Configuration for starting a new simulation.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// RNG seed for determinism. Same seed = same simulation.
    pub seed: u64,
    /// Gravity acceleration vector (m/s²).
    pub gravity: DVec3,
    /// Ticks per simulated second.
    pub tick_rate: u32,
    /// Speed below which a bouncing ground fragment comes to rest (m/s).
    pub rest_speed: f64,
    /// Initial time scale (1.0 = normal).
    pub time_scale: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            gravity: DVec3::new(0.0, 0.0, -GRAVITY),
            tick_rate: TICK_RATE,
            rest_speed: REST_SPEED,
            time_scale: 1.0,
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: SimPhase,
    time_scale: f64,
    dt: f64,
    gravity: DVec3,
    rest_speed: f64,
    rng: ChaCha8Rng,
    surface: Box<dyn Surface>,
    scene: Box<dyn Scene>,
    effects: EffectLedger,
    bodies: BTreeMap<BodyId, Entity>,
    next_body_id: u32,
    next_fragment_id: u32,
    command_queue: VecDeque<SimCommand>,
    /// Parts created this tick; they join the world after integration.
    pending_parts: Vec<BreakupPart>,
    despawn_buffer: Vec<Entity>,
    events: Vec<SimEvent>,
}

impl SimulationEngine {
    /// Create a new simulation engine over flat ground at elevation 0.
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: SimPhase::default(),
            time_scale: config.time_scale,
            dt: 1.0 / f64::from(config.tick_rate.max(1)),
            gravity: config.gravity,
            rest_speed: config.rest_speed,
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            surface: Box::new(FlatSurface::new(0.0)),
            scene: Box::new(SceneGraph::new()),
            effects: EffectLedger::default(),
            bodies: BTreeMap::new(),
            next_body_id: 0,
            next_fragment_id: 0,
            command_queue: VecDeque::new(),
            pending_parts: Vec::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Replace the terrain.
    pub fn with_surface(mut self, surface: impl Surface + 'static) -> Self {
        self.surface = Box::new(surface);
        self
    }

    /// Replace the render collaborator.
    pub fn with_scene(mut self, scene: impl Scene + 'static) -> Self {
        self.scene = Box::new(scene);
        self
    }

    /// Spawn a body driven by the given damage profile.
    pub fn spawn_body(
        &mut self,
        profile: Arc<dyn DamageProfile>,
        spec: BodySpec,
    ) -> Result<BodyId, ConfigError> {
        let id = BodyId(self.next_body_id);
        let entity = world_setup::spawn_body(&mut self.world, id, profile, &spec)?;

        let handles: Vec<_> = spec
            .effects
            .iter()
            .map(|(profile, offset)| {
                self.effects
                    .spawn(*profile, spec.pose.point(*offset), &mut self.events)
            })
            .collect();
        if let Ok(mut owned) = self.world.get::<&mut OwnedEffects>(entity) {
            owned.handles = handles;
        }

        self.scene.insert_model(id, spec.model, spec.pose);
        self.bodies.insert(id, entity);
        self.next_body_id += 1;
        log::info!("spawned {} as {:?}", spec.name, id);
        Ok(id)
    }

    /// Spawn one of the built-in archetypes. The family comes from the archetype.
    pub fn spawn_archetype(
        &mut self,
        archetype: Archetype,
        mut spec: BodySpec,
    ) -> Result<BodyId, ConfigError> {
        spec.family = archetype.family();
        self.spawn_body(get_profile(archetype), spec)
    }

    /// Queue a command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: SimCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = SimCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance the simulation by one tick and return the resulting snapshot.
    pub fn tick(&mut self) -> WorldSnapshot {
        self.process_commands();

        if self.phase == SimPhase::Active {
            let dt = self.dt * self.time_scale;
            self.run_systems(dt);
            self.time.advance(dt);
        }
        world_setup::spawn_parts(&mut self.world, &mut self.pending_parts);

        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(&self.world, &self.time, self.phase, events)
    }

    /// Remove every live fragment, releasing its trails and scene node.
    pub fn clear_fragments(&mut self) {
        world_setup::spawn_parts(&mut self.world, &mut self.pending_parts);
        systems::cleanup::remove_fragments(
            &mut self.world,
            self.scene.as_mut(),
            &mut self.effects,
            &mut self.events,
            &mut self.despawn_buffer,
        );
    }

    /// Get the current simulation phase.
    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get the current time scale.
    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Seconds per tick at time scale 1.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get a read-only reference to the render collaborator.
    pub fn scene(&self) -> &dyn Scene {
        self.scene.as_ref()
    }

    /// Whether a body is still in the world.
    pub fn contains_body(&self, body: BodyId) -> bool {
        self.bodies.contains_key(&body)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single command.
    fn handle_command(&mut self, command: SimCommand) {
        match command {
            SimCommand::Hit { body, hit } => self.apply_hit(body, &hit),
            SimCommand::HitAt {
                body,
                point,
                force,
                hits_critical,
                attacker,
            } => {
                let Some(&entity) = self.bodies.get(&body) else {
                    log::trace!("hit on unknown body {:?}", body);
                    return;
                };
                match systems::hits::hitbox_at(&self.world, entity, point) {
                    Some(hitbox) => {
                        let hit = Hit {
                            hitbox,
                            force,
                            hits_critical,
                            attacker,
                        };
                        self.apply_hit(body, &hit);
                    }
                    None => log::trace!("{:?}: no hitbox near {}", body, point),
                }
            }
            SimCommand::SetHitboxActive {
                body,
                hitbox,
                active,
            } => {
                let Some(&entity) = self.bodies.get(&body) else {
                    return;
                };
                if let Ok(mut damage) = self.world.get::<&mut Damage>(entity) {
                    if !damage.hitboxes.set_active(&hitbox, active) {
                        log::trace!("{:?}: no hitbox '{}'", body, hitbox);
                    }
                }
            }
            SimCommand::DespawnBody { body } => {
                if let Some(entity) = self.bodies.remove(&body) {
                    systems::cleanup::despawn_body(
                        &mut self.world,
                        entity,
                        self.scene.as_mut(),
                        &mut self.effects,
                        &mut self.events,
                    );
                }
            }
            SimCommand::SetTimeScale { scale } => {
                self.time_scale = scale.clamp(0.0, 4.0);
            }
            SimCommand::Pause => {
                if self.phase == SimPhase::Active {
                    self.phase = SimPhase::Paused;
                }
            }
            SimCommand::Resume => {
                if self.phase == SimPhase::Paused {
                    self.phase = SimPhase::Active;
                }
            }
        }
    }

    fn apply_hit(&mut self, body: BodyId, hit: &Hit) {
        let Some(&entity) = self.bodies.get(&body) else {
            log::trace!("hit on unknown body {:?}", body);
            return;
        };
        let mut ctx = BreakupContext {
            scene: self.scene.as_mut(),
            rng: &mut self.rng,
            effects: &mut self.effects,
            events: &mut self.events,
            next_fragment: &mut self.next_fragment_id,
        };
        systems::hits::apply_hit(
            &mut self.world,
            entity,
            hit,
            self.time.elapsed_secs,
            &mut ctx,
            &mut self.pending_parts,
        );
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        // 1. Shotdown timers and kill credit
        systems::shotdown::run(&mut self.world, dt, &mut self.events);
        // 2. Fragment integration (parts spawned this tick wait for the next)
        let live: HashSet<BodyId> = self.bodies.keys().copied().collect();
        let env = StepEnv {
            dt,
            gravity: self.gravity,
            surface: self.surface.as_ref(),
            rest_speed: self.rest_speed,
        };
        systems::fragments::run(
            &mut self.world,
            &env,
            &live,
            self.scene.as_mut(),
            &mut self.effects,
            &mut self.events,
            &mut self.despawn_buffer,
        );
        // 3. Body movement
        systems::movement::run(&mut self.world, dt, self.scene.as_mut());
    }
}
