//! Kinematic integration system for bodies.
//!
//! Updates each body's pose from its velocity: position += velocity * dt,
//! and keeps the scene model in step.

use hecs::World;

use wreck_core::components::{BodyInfo, Velocity};
use wreck_core::types::Pose;

use crate::scene::Scene;

/// Run kinematic integration for all bodies with a Pose + Velocity.
pub fn run(world: &mut World, dt: f64, scene: &mut dyn Scene) {
    for (_entity, (info, pose, vel)) in world.query_mut::<(&BodyInfo, &mut Pose, &Velocity)>() {
        pose.position += vel.0 * dt;
        scene.set_model_transform(info.id, *pose);
    }
}
