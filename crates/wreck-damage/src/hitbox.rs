//! Hitboxes: named collision regions with their own health pools.
//!
//! Geometry is fixed at construction. Health (`hitpoints`, `out`) has no
//! public mutator; only the cascade in this crate changes it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use wreck_core::constants::HITBOX_COLLIDE_MASK;
use wreck_core::error::ConfigError;
use wreck_core::types::{DQuat, DVec3};

/// One collision solid, in the owning body's local frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum Primitive {
    Sphere {
        center: DVec3,
        radius: f64,
    },
    /// Bare segment when `radius` is 0, capsule otherwise.
    Segment {
        a: DVec3,
        b: DVec3,
        #[serde(default)]
        radius: f64,
    },
    Box {
        center: DVec3,
        half_extents: DVec3,
        #[serde(default)]
        orientation: DQuat,
    },
    /// Any shape tag this version does not know. Rejected at construction.
    #[serde(other)]
    Unknown,
}

impl Primitive {
    pub fn sphere(center: DVec3, radius: f64) -> Self {
        Primitive::Sphere { center, radius }
    }

    pub fn segment(a: DVec3, b: DVec3, radius: f64) -> Self {
        Primitive::Segment { a, b, radius }
    }

    pub fn cuboid(center: DVec3, half_extents: DVec3) -> Self {
        Primitive::Box {
            center,
            half_extents,
            orientation: DQuat::IDENTITY,
        }
    }

    /// Volume used for weighting. A bare segment weighs its length.
    pub fn volume(&self) -> f64 {
        use std::f64::consts::PI;
        match self {
            Primitive::Sphere { radius, .. } => 4.0 / 3.0 * PI * radius.powi(3),
            Primitive::Segment { a, b, radius } => {
                let length = a.distance(*b);
                if *radius > 0.0 {
                    PI * radius * radius * length + 4.0 / 3.0 * PI * radius.powi(3)
                } else {
                    length
                }
            }
            Primitive::Box { half_extents, .. } => {
                8.0 * half_extents.x * half_extents.y * half_extents.z
            }
            Primitive::Unknown => 0.0,
        }
    }

    pub fn center(&self) -> DVec3 {
        match self {
            Primitive::Sphere { center, .. } | Primitive::Box { center, .. } => *center,
            Primitive::Segment { a, b, .. } => (*a + *b) * 0.5,
            Primitive::Unknown => DVec3::ZERO,
        }
    }

    /// Signed distance from `point` to the solid surface (≤ 0 inside).
    pub fn distance(&self, point: DVec3) -> f64 {
        match self {
            Primitive::Sphere { center, radius } => point.distance(*center) - radius,
            Primitive::Segment { a, b, radius } => {
                let ab = *b - *a;
                let len2 = ab.length_squared();
                let t = if len2 > 0.0 {
                    ((point - *a).dot(ab) / len2).clamp(0.0, 1.0)
                } else {
                    0.0
                };
                point.distance(*a + ab * t) - radius
            }
            Primitive::Box {
                center,
                half_extents,
                orientation,
            } => {
                let local = orientation.inverse() * (point - *center);
                let q = local.abs() - *half_extents;
                q.max(DVec3::ZERO).length() + q.max_element().min(0.0)
            }
            Primitive::Unknown => f64::INFINITY,
        }
    }

    fn validate(&self, hitbox: &str) -> Result<(), ConfigError> {
        let invalid = |detail: &str| ConfigError::InvalidPrimitive {
            hitbox: hitbox.to_string(),
            detail: detail.to_string(),
        };
        match self {
            Primitive::Sphere { center, radius } => {
                if !center.is_finite() || !radius.is_finite() {
                    return Err(invalid("non-finite sphere"));
                }
                if *radius <= 0.0 {
                    return Err(invalid("sphere radius must be positive"));
                }
            }
            Primitive::Segment { a, b, radius } => {
                if !a.is_finite() || !b.is_finite() || !radius.is_finite() {
                    return Err(invalid("non-finite segment"));
                }
                if *radius < 0.0 {
                    return Err(invalid("negative capsule radius"));
                }
                if *radius == 0.0 && a == b {
                    return Err(invalid("degenerate segment"));
                }
            }
            Primitive::Box {
                center,
                half_extents,
                orientation,
            } => {
                if !center.is_finite() || !half_extents.is_finite() || !orientation.is_finite() {
                    return Err(invalid("non-finite box"));
                }
                if half_extents.min_element() <= 0.0 {
                    return Err(invalid("box half extents must be positive"));
                }
            }
            Primitive::Unknown => {
                return Err(ConfigError::UnknownPrimitive {
                    hitbox: hitbox.to_string(),
                    detail: "unrecognized shape tag".to_string(),
                });
            }
        }
        Ok(())
    }
}

fn yes() -> bool {
    true
}

/// Authoring data for one hitbox.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitboxData {
    pub name: String,
    #[serde(default)]
    pub longdes: String,
    #[serde(default)]
    pub shortdes: String,
    /// Can be targeted individually.
    #[serde(default = "yes")]
    pub selectable: bool,
    /// Only attackers with the hits-critical capability damage it.
    #[serde(default)]
    pub critical: bool,
    /// Collision enabled at construction.
    #[serde(default = "yes")]
    pub active: bool,
    pub hitpoints: f64,
    #[serde(default)]
    pub minhitdmg: f64,
    pub maxhitdmg: f64,
    pub solids: Vec<Primitive>,
}

impl HitboxData {
    pub fn new(name: &str, hitpoints: f64, minhitdmg: f64, maxhitdmg: f64) -> Self {
        Self {
            name: name.to_string(),
            longdes: name.to_string(),
            shortdes: name.to_uppercase(),
            selectable: true,
            critical: false,
            active: true,
            hitpoints,
            minhitdmg,
            maxhitdmg,
            solids: Vec::new(),
        }
    }

    pub fn labels(mut self, longdes: &str, shortdes: &str) -> Self {
        self.longdes = longdes.to_string();
        self.shortdes = shortdes.to_string();
        self
    }

    pub fn sphere(mut self, center: DVec3, radius: f64) -> Self {
        self.solids.push(Primitive::sphere(center, radius));
        self
    }

    pub fn capsule(mut self, a: DVec3, b: DVec3, radius: f64) -> Self {
        self.solids.push(Primitive::segment(a, b, radius));
        self
    }

    pub fn cuboid(mut self, center: DVec3, half_extents: DVec3) -> Self {
        self.solids.push(Primitive::cuboid(center, half_extents));
        self
    }

    pub fn unselectable(mut self) -> Self {
        self.selectable = false;
        self
    }

    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }
}

/// A constructed hitbox.
#[derive(Debug, Clone)]
pub struct Hitbox {
    data: HitboxData,
    center: DVec3,
    volume: f64,
    hitpoints: f64,
    out: bool,
    into_mask: u32,
    from_mask: u32,
    base_mask: u32,
    registered: bool,
}

impl Hitbox {
    /// Build a hitbox from its authoring data.
    ///
    /// Fails on an empty solid list or any malformed or unknown solid.
    pub fn new(data: HitboxData) -> Result<Self, ConfigError> {
        if data.solids.is_empty() {
            return Err(ConfigError::EmptyGeometry {
                hitbox: data.name.clone(),
            });
        }
        for solid in &data.solids {
            solid.validate(&data.name)?;
        }
        if data.minhitdmg > data.maxhitdmg {
            return Err(ConfigError::InvertedRange {
                field: format!("{}.minhitdmg", data.name),
                min: data.minhitdmg,
                max: data.maxhitdmg,
            });
        }

        let volume: f64 = data.solids.iter().map(Primitive::volume).sum();
        let center = if volume > 0.0 {
            data.solids
                .iter()
                .map(|s| s.center() * s.volume())
                .sum::<DVec3>()
                / volume
        } else {
            data.solids.iter().map(Primitive::center).sum::<DVec3>() / data.solids.len() as f64
        };

        let mask = if data.active { HITBOX_COLLIDE_MASK } else { 0 };
        Ok(Self {
            hitpoints: data.hitpoints,
            center,
            volume,
            out: false,
            into_mask: mask,
            from_mask: mask,
            base_mask: HITBOX_COLLIDE_MASK,
            registered: true,
            data,
        })
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn longdes(&self) -> &str {
        &self.data.longdes
    }

    pub fn shortdes(&self) -> &str {
        &self.data.shortdes
    }

    pub fn selectable(&self) -> bool {
        self.data.selectable
    }

    pub fn critical(&self) -> bool {
        self.data.critical
    }

    pub fn minhitdmg(&self) -> f64 {
        self.data.minhitdmg
    }

    pub fn maxhitdmg(&self) -> f64 {
        self.data.maxhitdmg
    }

    pub fn hitpoints(&self) -> f64 {
        self.hitpoints
    }

    pub fn out(&self) -> bool {
        self.out
    }

    /// Volume-weighted centroid (body frame).
    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn solids(&self) -> &[Primitive] {
        &self.data.solids
    }

    /// Can be hit.
    pub fn active(&self) -> bool {
        self.into_mask != 0
    }

    pub fn into_mask(&self) -> u32 {
        self.into_mask
    }

    pub fn from_mask(&self) -> u32 {
        self.from_mask
    }

    /// Still registered with collision detection.
    pub fn registered(&self) -> bool {
        self.registered
    }

    /// Distance from a body-local point to the nearest solid.
    pub fn distance(&self, point: DVec3) -> f64 {
        self.data
            .solids
            .iter()
            .map(|s| s.distance(point))
            .fold(f64::INFINITY, f64::min)
    }

    /// Toggle both collision masks. Health is untouched.
    pub fn set_active(&mut self, active: bool) {
        if !self.registered {
            return;
        }
        let mask = if active { self.base_mask } else { 0 };
        self.into_mask = mask;
        self.from_mask = mask;
    }

    /// Unregister from collision detection. Repeated calls do nothing.
    pub fn destroy(&mut self) {
        if !self.registered {
            return;
        }
        self.into_mask = 0;
        self.from_mask = 0;
        self.registered = false;
    }

    /// Apply a non-inert hit: threshold subtraction, then overkill.
    ///
    /// Overkill looks at the health before this hit, so a single hit above
    /// `maxhitdmg` always leaves exactly zero.
    pub(crate) fn take_hit(&mut self, force: f64) {
        let before = self.hitpoints;
        if force > self.data.minhitdmg {
            self.hitpoints -= force;
        }
        if force > self.data.maxhitdmg && before > 0.0 {
            self.hitpoints = 0.0;
        }
    }

    /// Cascade zeroing. Never raises hitpoints already below zero.
    pub(crate) fn zero(&mut self) {
        if self.hitpoints > 0.0 {
            self.hitpoints = 0.0;
        }
    }

    /// Health exhausted but not yet marked out.
    pub(crate) fn pending_out(&self) -> bool {
        self.hitpoints <= 0.0 && !self.out
    }

    pub(crate) fn mark_out(&mut self) {
        self.out = true;
    }
}

/// A body's hitboxes, addressed by name and kept in authoring order.
#[derive(Debug, Clone, Default)]
pub struct HitboxSet {
    hitboxes: Vec<Hitbox>,
    index: HashMap<String, usize>,
}

impl HitboxSet {
    pub fn new(data: &[HitboxData]) -> Result<Self, ConfigError> {
        let mut set = Self::default();
        for hd in data {
            if set.index.contains_key(&hd.name) {
                return Err(ConfigError::DuplicateHitbox {
                    name: hd.name.clone(),
                });
            }
            let hitbox = Hitbox::new(hd.clone())?;
            set.index.insert(hd.name.clone(), set.hitboxes.len());
            set.hitboxes.push(hitbox);
        }
        Ok(set)
    }

    pub fn get(&self, name: &str) -> Option<&Hitbox> {
        self.index.get(name).map(|&i| &self.hitboxes[i])
    }

    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Hitbox> {
        match self.index.get(name) {
            Some(&i) => self.hitboxes.get_mut(i),
            None => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hitbox> {
        self.hitboxes.iter()
    }

    pub fn len(&self) -> usize {
        self.hitboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hitboxes.is_empty()
    }

    /// Whether the named hitbox is out. Unknown names are not out.
    pub fn is_out(&self, name: &str) -> bool {
        self.get(name).is_some_and(Hitbox::out)
    }

    pub fn volume(&self) -> f64 {
        self.hitboxes.iter().map(Hitbox::volume).sum()
    }

    /// Volume-weighted centroid over all hitboxes (body frame).
    pub fn center(&self) -> DVec3 {
        let volume = self.volume();
        if volume > 0.0 {
            self.hitboxes
                .iter()
                .map(|h| h.center() * h.volume())
                .sum::<DVec3>()
                / volume
        } else if self.hitboxes.is_empty() {
            DVec3::ZERO
        } else {
            self.hitboxes.iter().map(Hitbox::center).sum::<DVec3>() / self.hitboxes.len() as f64
        }
    }

    /// Nearest active hitbox within `tolerance` of a body-local point.
    pub fn resolve_point(&self, point: DVec3, tolerance: f64) -> Option<&Hitbox> {
        self.hitboxes
            .iter()
            .filter(|h| h.active())
            .map(|h| (h, h.distance(point)))
            .filter(|(_, d)| *d <= tolerance)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(h, _)| h)
    }

    /// Toggle collision on a named hitbox. Returns false if it does not exist.
    pub fn set_active(&mut self, name: &str, active: bool) -> bool {
        match self.get_mut(name) {
            Some(h) => {
                h.set_active(active);
                true
            }
            None => false,
        }
    }

    /// Unregister every hitbox (body teardown).
    pub fn destroy_all(&mut self) {
        for h in &mut self.hitboxes {
            h.destroy();
        }
    }
}
