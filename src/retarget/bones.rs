use rustc_hash::FxHashMap;
use uuid::Uuid;

use crate::vrm::Avatar;

/// The Mixamo hip root joint; its rotation tracks get the forward-axis
/// correction during retargeting.
pub const MIXAMO_HIPS: &str = "mixamorig:Hips";

/// Fixed Mixamo → VRM humanoid joint name table: core skeleton plus 15
/// finger joints per side.
pub const MIXAMO_TO_VRM: [(&str, &str); 52] = [
    ("mixamorig:Hips", "hips"),
    ("mixamorig:Spine", "spine"),
    ("mixamorig:Spine1", "chest"),
    ("mixamorig:Spine2", "upperChest"),
    ("mixamorig:Neck", "neck"),
    ("mixamorig:Head", "head"),
    ("mixamorig:LeftShoulder", "leftShoulder"),
    ("mixamorig:LeftArm", "leftUpperArm"),
    ("mixamorig:LeftForeArm", "leftLowerArm"),
    ("mixamorig:LeftHand", "leftHand"),
    ("mixamorig:RightShoulder", "rightShoulder"),
    ("mixamorig:RightArm", "rightUpperArm"),
    ("mixamorig:RightForeArm", "rightLowerArm"),
    ("mixamorig:RightHand", "rightHand"),
    ("mixamorig:LeftUpLeg", "leftUpperLeg"),
    ("mixamorig:LeftLeg", "leftLowerLeg"),
    ("mixamorig:LeftFoot", "leftFoot"),
    ("mixamorig:LeftToeBase", "leftToes"),
    ("mixamorig:RightUpLeg", "rightUpperLeg"),
    ("mixamorig:RightLeg", "rightLowerLeg"),
    ("mixamorig:RightFoot", "rightFoot"),
    ("mixamorig:RightToeBase", "rightToes"),
    ("mixamorig:LeftHandThumb1", "leftThumbProximal"),
    ("mixamorig:LeftHandThumb2", "leftThumbIntermediate"),
    ("mixamorig:LeftHandThumb3", "leftThumbDistal"),
    ("mixamorig:LeftHandIndex1", "leftIndexProximal"),
    ("mixamorig:LeftHandIndex2", "leftIndexIntermediate"),
    ("mixamorig:LeftHandIndex3", "leftIndexDistal"),
    ("mixamorig:LeftHandMiddle1", "leftMiddleProximal"),
    ("mixamorig:LeftHandMiddle2", "leftMiddleIntermediate"),
    ("mixamorig:LeftHandMiddle3", "leftMiddleDistal"),
    ("mixamorig:LeftHandRing1", "leftRingProximal"),
    ("mixamorig:LeftHandRing2", "leftRingIntermediate"),
    ("mixamorig:LeftHandRing3", "leftRingDistal"),
    ("mixamorig:LeftHandPinky1", "leftLittleProximal"),
    ("mixamorig:LeftHandPinky2", "leftLittleIntermediate"),
    ("mixamorig:LeftHandPinky3", "leftLittleDistal"),
    ("mixamorig:RightHandThumb1", "rightThumbProximal"),
    ("mixamorig:RightHandThumb2", "rightThumbIntermediate"),
    ("mixamorig:RightHandThumb3", "rightThumbDistal"),
    ("mixamorig:RightHandIndex1", "rightIndexProximal"),
    ("mixamorig:RightHandIndex2", "rightIndexIntermediate"),
    ("mixamorig:RightHandIndex3", "rightIndexDistal"),
    ("mixamorig:RightHandMiddle1", "rightMiddleProximal"),
    ("mixamorig:RightHandMiddle2", "rightMiddleIntermediate"),
    ("mixamorig:RightHandMiddle3", "rightMiddleDistal"),
    ("mixamorig:RightHandRing1", "rightRingProximal"),
    ("mixamorig:RightHandRing2", "rightRingIntermediate"),
    ("mixamorig:RightHandRing3", "rightRingDistal"),
    ("mixamorig:RightHandPinky1", "rightLittleProximal"),
    ("mixamorig:RightHandPinky2", "rightLittleIntermediate"),
    ("mixamorig:RightHandPinky3", "rightLittleDistal"),
];

/// Mixamo joint name → actual scene node name, resolved against one
/// avatar's humanoid bone table.
///
/// Built once per avatar; a Mixamo joint whose humanoid bone the model
/// does not expose is simply absent ("untranslatable", not an error).
/// Immutable after construction.
#[derive(Debug, Clone)]
pub struct BoneMap {
    avatar_id: Uuid,
    map: FxHashMap<&'static str, String>,
}

impl BoneMap {
    /// Resolves the canonical table through the avatar's humanoid bones.
    #[must_use]
    pub fn for_avatar(avatar: &Avatar) -> Self {
        let mut map = FxHashMap::default();
        for (mixamo, vrm_bone) in MIXAMO_TO_VRM {
            let Some(key) = avatar.humanoid_node(vrm_bone) else {
                continue;
            };
            if let Some(node) = avatar.node(key) {
                map.insert(mixamo, node.name.clone());
            }
        }
        Self {
            avatar_id: avatar.id,
            map,
        }
    }

    /// Scene node name for a Mixamo joint, if this model has it.
    #[must_use]
    pub fn resolve(&self, mixamo_joint: &str) -> Option<&str> {
        self.map.get(mixamo_joint).map(String::as_str)
    }

    /// Whether `name` is one of this map's destination node names.
    #[must_use]
    pub fn is_destination(&self, name: &str) -> bool {
        self.map.values().any(|v| v == name)
    }

    /// Destination node names (used by tests and diagnostics).
    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.map.values().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether this map was built from the given avatar instance.
    #[must_use]
    pub fn built_for(&self, avatar: &Avatar) -> bool {
        self.avatar_id == avatar.id
    }
}

/// Per-model cache: the map is recomputed only when a different avatar
/// instance is supplied.
#[derive(Debug, Default)]
pub struct BoneMapCache {
    cached: Option<BoneMap>,
}

impl BoneMapCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn map_for(&mut self, avatar: &Avatar) -> &BoneMap {
        if self.cached.as_ref().is_none_or(|m| !m.built_for(avatar)) {
            self.cached = None;
        }
        self.cached
            .get_or_insert_with(|| BoneMap::for_avatar(avatar))
    }
}
