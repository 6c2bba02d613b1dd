//! A live breakup fragment: lifetime, bound trails, kept-together
//! followers and the motion model that moves it.

use wreck_core::enums::{FragmentEnd, FragmentKind};
use wreck_core::types::{BodyId, DVec3, EffectHandle, FragmentId, Pose};
use wreck_terrain::Surface;

use super::air::AirMotion;
use super::ground::GroundMotion;

/// How long a fragment lives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lifetime {
    /// Sampled duration in seconds.
    Fixed(f64),
    /// Until the body it came from is removed from the world.
    WhileParentAlive,
}

/// A trail effect bound to a fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct Trail {
    pub handle: EffectHandle,
    /// Trail lifetime as a fraction of the fragment lifetime.
    pub duration_factor: f64,
    /// 1 when fresh, 0 when gone.
    pub fade: f64,
    pub live: bool,
}

/// A node that stays on the body model but moves rigidly with the pivot.
#[derive(Debug, Clone, PartialEq)]
pub struct Follower {
    pub handle: String,
    /// Offset in the pivot frame.
    pub offset: DVec3,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Motion {
    Air(AirMotion),
    Ground(GroundMotion),
}

/// Per-tick inputs shared by all fragments.
pub struct StepEnv<'a> {
    pub dt: f64,
    pub gravity: DVec3,
    pub surface: &'a dyn Surface,
    pub rest_speed: f64,
}

/// Result of advancing a fragment one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum PartStep {
    Moved {
        came_to_rest: bool,
        released_trails: Vec<EffectHandle>,
    },
    Done(FragmentEnd),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BreakupPart {
    pub id: FragmentId,
    pub source: BodyId,
    pub handles: Vec<String>,
    pub pose: Pose,
    pub lifetime: Lifetime,
    pub elapsed: f64,
    pub motion: Motion,
    pub trails: Vec<Trail>,
    pub followers: Vec<Follower>,
}

impl BreakupPart {
    pub fn kind(&self) -> FragmentKind {
        match self.motion {
            Motion::Air(_) => FragmentKind::Air,
            Motion::Ground(_) => FragmentKind::Ground,
        }
    }

    pub fn speed(&self) -> f64 {
        match &self.motion {
            Motion::Air(m) => m.speed(),
            Motion::Ground(m) => m.speed(),
        }
    }

    pub fn at_rest(&self) -> bool {
        matches!(&self.motion, Motion::Ground(m) if m.at_rest)
    }

    pub fn trail_fades(&self) -> Vec<f64> {
        self.trails.iter().filter(|t| t.live).map(|t| t.fade).collect()
    }

    pub fn live_trails(&self) -> impl Iterator<Item = EffectHandle> + '_ {
        self.trails.iter().filter(|t| t.live).map(|t| t.handle)
    }

    /// World poses of the kept-together nodes.
    pub fn follower_poses(&self) -> impl Iterator<Item = (&str, Pose)> + '_ {
        self.followers.iter().map(move |f| {
            (
                f.handle.as_str(),
                Pose::new(self.pose.point(f.offset), self.pose.orientation),
            )
        })
    }

    /// Advance one tick. A part whose lifetime is over does not move.
    pub fn advance(&mut self, env: &StepEnv, parent_alive: bool) -> PartStep {
        self.elapsed += env.dt;

        let done = match self.lifetime {
            Lifetime::Fixed(duration) => self.elapsed > duration,
            Lifetime::WhileParentAlive => !parent_alive,
        };
        if done {
            let reason = match self.lifetime {
                Lifetime::Fixed(_) => FragmentEnd::Expired,
                Lifetime::WhileParentAlive => FragmentEnd::ParentGone,
            };
            return PartStep::Done(reason);
        }

        let rd = match self.lifetime {
            Lifetime::Fixed(duration) if duration > 0.0 => self.elapsed / duration,
            _ => 1.0,
        };

        let mut came_to_rest = false;
        match &mut self.motion {
            Motion::Air(m) => m.step(&mut self.pose, env.dt, rd, env.gravity),
            Motion::Ground(m) => {
                let step = m.step(
                    &mut self.pose,
                    env.dt,
                    env.gravity,
                    env.surface,
                    env.rest_speed,
                );
                came_to_rest = step.came_to_rest;
            }
        }

        let mut released_trails = Vec::new();
        if let Lifetime::Fixed(duration) = self.lifetime {
            for trail in self.trails.iter_mut().filter(|t| t.live) {
                let r = self.elapsed / (duration * trail.duration_factor);
                if r < 1.0 {
                    trail.fade = (1.0 - r).powi(2);
                } else {
                    trail.fade = 0.0;
                    trail.live = false;
                    released_trails.push(trail.handle);
                }
            }
        }

        PartStep::Moved {
            came_to_rest,
            released_trails,
        }
    }
}
