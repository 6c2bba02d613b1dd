//! Render collaborator: named sub-geometry of body models and the nodes
//! carried by breakup fragments.
//!
//! Every operation on a missing body, node or fragment is a no-op.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use wreck_core::types::{BodyId, DVec3, FragmentId, Pose};

/// Authoring description of a body's visual model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSpec {
    /// Named sub-geometry and its body-local offset.
    pub nodes: Vec<(String, DVec3)>,
    #[serde(default)]
    pub texture: Option<String>,
    /// Pre-authored wreck model swapped in on full failure.
    #[serde(default)]
    pub shotdown_variant: Option<Vec<(String, DVec3)>>,
}

impl ModelSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, handle: &str, offset: DVec3) -> Self {
        self.nodes.push((handle.to_string(), offset));
        self
    }

    pub fn textured(mut self, texture: &str) -> Self {
        self.texture = Some(texture.to_string());
        self
    }

    pub fn shotdown_variant(mut self, nodes: &[(&str, DVec3)]) -> Self {
        self.shotdown_variant = Some(nodes.iter().map(|(h, o)| (h.to_string(), *o)).collect());
        self
    }
}

/// Operations the simulation needs from the render side.
pub trait Scene: Send + Sync {
    fn insert_model(&mut self, body: BodyId, model: ModelSpec, pose: Pose);
    fn remove_model(&mut self, body: BodyId);
    fn set_model_transform(&mut self, body: BodyId, pose: Pose);

    /// Body-local offset of a named node still attached to the body.
    fn find_named(&self, body: BodyId, handle: &str) -> Option<DVec3>;
    /// Remove named nodes; returns the handles that were actually present.
    fn remove_named(&mut self, body: BodyId, handles: &[String]) -> Vec<String>;
    fn swap_texture(&mut self, body: BodyId, texture: &str) -> bool;
    fn texture(&self, body: BodyId) -> Option<String>;
    /// Replace the model nodes with the shotdown variant, if one exists.
    fn swap_to_shotdown_variant(&mut self, body: BodyId) -> bool;
    /// Drive a node that stays attached to its body (kept-together assemblies).
    fn set_node_transform(&mut self, body: BodyId, handle: &str, pose: Pose);
    /// World pose of a node still attached to a body.
    fn node_pose(&self, body: BodyId, handle: &str) -> Option<Pose>;

    fn create_fragment_node(&mut self, fragment: FragmentId, pose: Pose, texture: Option<&str>);
    /// Move a named node from a body to a fragment node.
    fn detach(&mut self, body: BodyId, handle: &str, fragment: FragmentId) -> bool;
    fn set_fragment_transform(&mut self, fragment: FragmentId, pose: Pose);
    fn fragment_pose(&self, fragment: FragmentId) -> Option<Pose>;
    fn release_fragment(&mut self, fragment: FragmentId);
}

#[derive(Debug, Clone)]
struct SceneNode {
    offset: DVec3,
    /// Set once something drives the node directly.
    driven: Option<Pose>,
}

#[derive(Debug, Clone)]
struct Model {
    pose: Pose,
    nodes: BTreeMap<String, SceneNode>,
    texture: Option<String>,
    shotdown_variant: Option<Vec<(String, DVec3)>>,
}

/// A fragment node with the sub-geometry reparented onto it.
#[derive(Debug, Clone)]
pub struct FragmentNode {
    pub pose: Pose,
    pub texture: Option<String>,
    pub handles: Vec<String>,
}

fn nodes_from(list: Vec<(String, DVec3)>) -> BTreeMap<String, SceneNode> {
    list.into_iter()
        .map(|(handle, offset)| {
            (
                handle,
                SceneNode {
                    offset,
                    driven: None,
                },
            )
        })
        .collect()
}

/// In-memory scene graph, enough to drive the simulation headless.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    models: HashMap<BodyId, Model>,
    fragments: HashMap<FragmentId, FragmentNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_model(&self, body: BodyId) -> bool {
        self.models.contains_key(&body)
    }

    pub fn fragment(&self, fragment: FragmentId) -> Option<&FragmentNode> {
        self.fragments.get(&fragment)
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }
}

impl Scene for SceneGraph {
    fn insert_model(&mut self, body: BodyId, model: ModelSpec, pose: Pose) {
        self.models.insert(
            body,
            Model {
                pose,
                nodes: nodes_from(model.nodes),
                texture: model.texture,
                shotdown_variant: model.shotdown_variant,
            },
        );
    }

    fn remove_model(&mut self, body: BodyId) {
        if self.models.remove(&body).is_none() {
            log::trace!("remove_model: body {:?} has no model", body);
        }
    }

    fn set_model_transform(&mut self, body: BodyId, pose: Pose) {
        if let Some(model) = self.models.get_mut(&body) {
            model.pose = pose;
        }
    }

    fn find_named(&self, body: BodyId, handle: &str) -> Option<DVec3> {
        self.models
            .get(&body)
            .and_then(|m| m.nodes.get(handle))
            .map(|n| n.offset)
    }

    fn remove_named(&mut self, body: BodyId, handles: &[String]) -> Vec<String> {
        let Some(model) = self.models.get_mut(&body) else {
            return Vec::new();
        };
        handles
            .iter()
            .filter(|h| model.nodes.remove(h.as_str()).is_some())
            .cloned()
            .collect()
    }

    fn swap_texture(&mut self, body: BodyId, texture: &str) -> bool {
        match self.models.get_mut(&body) {
            Some(model) => {
                model.texture = Some(texture.to_string());
                true
            }
            None => false,
        }
    }

    fn texture(&self, body: BodyId) -> Option<String> {
        self.models.get(&body).and_then(|m| m.texture.clone())
    }

    fn swap_to_shotdown_variant(&mut self, body: BodyId) -> bool {
        let Some(model) = self.models.get_mut(&body) else {
            return false;
        };
        match model.shotdown_variant.take() {
            Some(variant) => {
                model.nodes = nodes_from(variant);
                true
            }
            None => false,
        }
    }

    fn set_node_transform(&mut self, body: BodyId, handle: &str, pose: Pose) {
        if let Some(node) = self
            .models
            .get_mut(&body)
            .and_then(|m| m.nodes.get_mut(handle))
        {
            node.driven = Some(pose);
        }
    }

    fn node_pose(&self, body: BodyId, handle: &str) -> Option<Pose> {
        let model = self.models.get(&body)?;
        let node = model.nodes.get(handle)?;
        Some(
            node.driven
                .unwrap_or_else(|| Pose::new(model.pose.point(node.offset), model.pose.orientation)),
        )
    }

    fn create_fragment_node(&mut self, fragment: FragmentId, pose: Pose, texture: Option<&str>) {
        self.fragments.insert(
            fragment,
            FragmentNode {
                pose,
                texture: texture.map(str::to_string),
                handles: Vec::new(),
            },
        );
    }

    fn detach(&mut self, body: BodyId, handle: &str, fragment: FragmentId) -> bool {
        let Some(target) = self.fragments.get_mut(&fragment) else {
            return false;
        };
        let Some(model) = self.models.get_mut(&body) else {
            return false;
        };
        if model.nodes.remove(handle).is_none() {
            return false;
        }
        target.handles.push(handle.to_string());
        true
    }

    fn set_fragment_transform(&mut self, fragment: FragmentId, pose: Pose) {
        if let Some(node) = self.fragments.get_mut(&fragment) {
            node.pose = pose;
        }
    }

    fn fragment_pose(&self, fragment: FragmentId) -> Option<Pose> {
        self.fragments.get(&fragment).map(|f| f.pose)
    }

    fn release_fragment(&mut self, fragment: FragmentId) {
        self.fragments.remove(&fragment);
    }
}
