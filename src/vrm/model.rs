use std::path::Path;

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use serde_json::Value;
use slotmap::{SlotMap, new_key_type};
use uuid::Uuid;

use crate::errors::{HitogataError, Result};
use crate::vrm::humanoid;

new_key_type! {
    /// Stable handle to an avatar scene node.
    pub struct NodeKey;
}

/// One joint/node of the avatar scene graph: name, live TRS, and the rest
/// pose it can be reset to.
#[derive(Debug, Clone)]
pub struct AvatarNode {
    pub name: String,
    pub parent: Option<NodeKey>,

    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,

    rest_position: Vec3,
    rest_rotation: Quat,
    rest_scale: Vec3,
}

impl AvatarNode {
    fn new(name: String, parent: Option<NodeKey>, position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            name,
            parent,
            position,
            rotation,
            scale,
            rest_position: position,
            rest_rotation: rotation,
            rest_scale: scale,
        }
    }

    /// Restores this node's rest TRS.
    pub fn reset(&mut self) {
        self.position = self.rest_position;
        self.rotation = self.rest_rotation;
        self.scale = self.rest_scale;
    }
}

/// A loaded VRM humanoid avatar.
///
/// Holds the named node table, the humanoid bone table (canonical bone
/// name → node), the blendshape expression catalog exposed by the model,
/// and the live expression weights plus root placement written each frame.
///
/// All components receive the avatar by explicit reference; there is no
/// ambient/global model instance.
pub struct Avatar {
    pub id: Uuid,
    pub name: String,

    nodes: SlotMap<NodeKey, AvatarNode>,
    by_name: FxHashMap<String, NodeKey>,
    humanoid: FxHashMap<String, NodeKey>,

    /// Blendshape expression names the model exposes.
    pub expression_catalog: Vec<String>,
    /// Live expression weights, written by the expression controller.
    pub expression_weights: FxHashMap<String, f32>,

    /// World-space root placement, written by the motion controller.
    pub position: Vec3,
    /// Yaw heading in radians (`atan2(dx, dz)` convention, +Z forward).
    pub heading: f32,
}

impl Avatar {
    /// An avatar with no nodes. Building block for loaders and tests.
    #[must_use]
    pub fn empty(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            nodes: SlotMap::with_key(),
            by_name: FxHashMap::default(),
            humanoid: FxHashMap::default(),
            expression_catalog: Vec::new(),
            expression_weights: FxHashMap::default(),
            position: Vec3::ZERO,
            heading: 0.0,
        }
    }

    /// Loads a VRM avatar (glTF/GLB container) from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|_| HitogataError::AssetNotFound(path.display().to_string()))?;
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("avatar");
        Self::from_slice(&bytes, name)
    }

    /// Loads a VRM avatar from an in-memory glTF/GLB container.
    pub fn from_slice(bytes: &[u8], name: &str) -> Result<Self> {
        let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;
        let json = container_json(bytes)?;

        let mut avatar = Avatar::empty(name);

        // Scene nodes: record names and rest TRS, then wire up parents.
        let mut index_to_key: Vec<NodeKey> = Vec::new();
        for node in gltf.document.nodes() {
            let (t, r, s) = node.transform().decomposed();
            let node_name = node
                .name()
                .map_or_else(|| format!("Node_{}", node.index()), ToString::to_string);
            let key = avatar.add_node_trs(
                &node_name,
                None,
                Vec3::from_array(t),
                Quat::from_array(r),
                Vec3::from_array(s),
            );
            index_to_key.push(key);
        }
        for node in gltf.document.nodes() {
            for child in node.children() {
                if let Some(child_node) = avatar.nodes.get_mut(index_to_key[child.index()]) {
                    child_node.parent = Some(index_to_key[node.index()]);
                }
            }
        }

        read_humanoid_table(&json, &index_to_key, &mut avatar)?;
        avatar.expression_catalog = read_expression_catalog(&json);

        Ok(avatar)
    }

    /// Adds a node with an identity rest pose. Returns its key.
    pub fn add_node(&mut self, name: &str, parent: Option<NodeKey>) -> NodeKey {
        self.add_node_trs(name, parent, Vec3::ZERO, Quat::IDENTITY, Vec3::ONE)
    }

    pub fn add_node_trs(
        &mut self,
        name: &str,
        parent: Option<NodeKey>,
        position: Vec3,
        rotation: Quat,
        scale: Vec3,
    ) -> NodeKey {
        let key = self.nodes.insert(AvatarNode::new(
            name.to_string(),
            parent,
            position,
            rotation,
            scale,
        ));
        self.by_name.insert(name.to_string(), key);
        key
    }

    /// Registers `key` as the node backing humanoid bone `bone`.
    pub fn assign_humanoid(&mut self, bone: &str, key: NodeKey) {
        self.humanoid.insert(bone.to_string(), key);
    }

    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&AvatarNode> {
        self.nodes.get(key)
    }

    pub fn node_mut(&mut self, key: NodeKey) -> Option<&mut AvatarNode> {
        self.nodes.get_mut(key)
    }

    /// Looks a node up by its scene name.
    #[must_use]
    pub fn node_by_name(&self, name: &str) -> Option<NodeKey> {
        self.by_name.get(name).copied()
    }

    /// Looks a node up by canonical humanoid bone name.
    #[must_use]
    pub fn humanoid_node(&self, bone: &str) -> Option<NodeKey> {
        self.humanoid.get(bone).copied()
    }

    /// The humanoid bones this model actually exposes.
    pub fn humanoid_bones(&self) -> impl Iterator<Item = (&str, NodeKey)> {
        self.humanoid.iter().map(|(name, key)| (name.as_str(), *key))
    }

    #[must_use]
    pub fn has_joint(&self, name: &str) -> bool {
        self.by_name.contains_key(name) || self.humanoid.contains_key(name)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Restores every node to its rest TRS and clears expression weights.
    pub fn reset_pose(&mut self) {
        for (_, node) in &mut self.nodes {
            node.reset();
        }
        self.expression_weights.clear();
    }
}

/// Extracts the JSON chunk from a GLB container, or treats the whole slice
/// as glTF JSON.
fn container_json(bytes: &[u8]) -> Result<Value> {
    if bytes.starts_with(b"glTF") {
        let glb = gltf::binary::Glb::from_slice(bytes)
            .map_err(|e| HitogataError::Gltf(e.to_string()))?;
        Ok(serde_json::from_slice(&glb.json)?)
    } else {
        Ok(serde_json::from_slice(bytes)?)
    }
}

/// Reads the humanoid bone table from either the VRM 0.x `VRM` extension or
/// the VRM 1.0 `VRMC_vrm` extension.
fn read_humanoid_table(json: &Value, index_to_key: &[NodeKey], avatar: &mut Avatar) -> Result<()> {
    let extensions = json.get("extensions");

    // VRM 0.x: humanoid.humanBones is an array of { bone, node }.
    if let Some(bones) = extensions
        .and_then(|e| e.get("VRM"))
        .and_then(|v| v.get("humanoid"))
        .and_then(|h| h.get("humanBones"))
        .and_then(Value::as_array)
    {
        for entry in bones {
            let (Some(bone), Some(node)) = (
                entry.get("bone").and_then(Value::as_str),
                entry.get("node").and_then(Value::as_u64),
            ) else {
                continue;
            };
            if let Some(&key) = index_to_key.get(node as usize) {
                avatar.assign_humanoid(bone, key);
            }
        }
        return Ok(());
    }

    // VRM 1.0: humanoid.humanBones is an object { boneName: { node } }.
    if let Some(bones) = extensions
        .and_then(|e| e.get("VRMC_vrm"))
        .and_then(|v| v.get("humanoid"))
        .and_then(|h| h.get("humanBones"))
        .and_then(Value::as_object)
    {
        for (bone, entry) in bones {
            let Some(node) = entry.get("node").and_then(Value::as_u64) else {
                continue;
            };
            if let Some(&key) = index_to_key.get(node as usize) {
                avatar.assign_humanoid(humanoid::normalize_bone_name(bone), key);
            }
        }
        return Ok(());
    }

    Err(HitogataError::NoHumanoid(avatar.name.clone()))
}

/// Collects the model's blendshape expression names (both VRM versions).
fn read_expression_catalog(json: &Value) -> Vec<String> {
    let extensions = json.get("extensions");
    let mut names = Vec::new();

    if let Some(groups) = extensions
        .and_then(|e| e.get("VRM"))
        .and_then(|v| v.get("blendShapeMaster"))
        .and_then(|m| m.get("blendShapeGroups"))
        .and_then(Value::as_array)
    {
        for group in groups {
            if let Some(name) = group.get("name").and_then(Value::as_str) {
                names.push(name.to_string());
            }
        }
    }

    if let Some(expressions) = extensions
        .and_then(|e| e.get("VRMC_vrm"))
        .and_then(|v| v.get("expressions"))
    {
        for table in ["preset", "custom"] {
            if let Some(map) = expressions.get(table).and_then(Value::as_object) {
                names.extend(map.keys().cloned());
            }
        }
    }

    names
}
