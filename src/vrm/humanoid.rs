//! Canonical VRM humanoid bone names.
//!
//! Names follow the VRM 0.x humanoid convention (which VRM 1.0 shares apart
//! from the thumb chain; the model loader normalizes VRM 1.0 thumb names on
//! load, see [`normalize_bone_name`]).

/// All recognized humanoid bone names: core skeleton plus 15 finger joints
/// per side.
pub const HUMANOID_BONES: [&str; 55] = [
    "hips",
    "spine",
    "chest",
    "upperChest",
    "neck",
    "head",
    "leftEye",
    "rightEye",
    "jaw",
    "leftShoulder",
    "leftUpperArm",
    "leftLowerArm",
    "leftHand",
    "rightShoulder",
    "rightUpperArm",
    "rightLowerArm",
    "rightHand",
    "leftUpperLeg",
    "leftLowerLeg",
    "leftFoot",
    "leftToes",
    "rightUpperLeg",
    "rightLowerLeg",
    "rightFoot",
    "rightToes",
    "leftThumbProximal",
    "leftThumbIntermediate",
    "leftThumbDistal",
    "leftIndexProximal",
    "leftIndexIntermediate",
    "leftIndexDistal",
    "leftMiddleProximal",
    "leftMiddleIntermediate",
    "leftMiddleDistal",
    "leftRingProximal",
    "leftRingIntermediate",
    "leftRingDistal",
    "leftLittleProximal",
    "leftLittleIntermediate",
    "leftLittleDistal",
    "rightThumbProximal",
    "rightThumbIntermediate",
    "rightThumbDistal",
    "rightIndexProximal",
    "rightIndexIntermediate",
    "rightIndexDistal",
    "rightMiddleProximal",
    "rightMiddleIntermediate",
    "rightMiddleDistal",
    "rightRingProximal",
    "rightRingIntermediate",
    "rightRingDistal",
    "rightLittleProximal",
    "rightLittleIntermediate",
    "rightLittleDistal",
];

/// The humanoid root bone.
pub const HIPS: &str = "hips";

/// Maps VRM 1.0 thumb bone names onto the 0.x naming used internally.
/// Every other bone name is identical between the two specs.
#[must_use]
pub fn normalize_bone_name(name: &str) -> &str {
    match name {
        "leftThumbMetacarpal" => "leftThumbProximal",
        "leftThumbProximal" => "leftThumbIntermediate",
        "rightThumbMetacarpal" => "rightThumbProximal",
        "rightThumbProximal" => "rightThumbIntermediate",
        other => other,
    }
}

/// Whether `name` is a recognized humanoid bone name.
#[must_use]
pub fn is_humanoid_bone(name: &str) -> bool {
    HUMANOID_BONES.contains(&name)
}
