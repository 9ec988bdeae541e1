//! Animation clip extraction from glTF / GLB / VRMA containers.
//!
//! VRMA files are glTF containers whose `VRMC_vrm_animation` extension maps
//! humanoid bone names to node indices; tracks from such files are emitted
//! under the humanoid bone names directly, so they bind onto any VRM avatar
//! without retargeting.

use glam::{Quat, Vec3};
use rustc_hash::FxHashMap;
use serde_json::Value;

use crate::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::loader::LoadedClip;
use crate::errors::{HitogataError, Result};

/// Parses the first animation of the container into a clip named `name`.
pub fn clip_from_slice(bytes: &[u8], name: &str) -> Result<LoadedClip> {
    // Unvalidated parse: VRMA containers list an extension the gltf crate
    // does not know in `extensionsRequired`, which strict validation
    // rejects.
    let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;
    let blob = gltf.blob.clone();
    let buffers = gltf::import_buffers(&gltf.document, None, blob)
        .map_err(|e| HitogataError::Gltf(e.to_string()))?;

    let humanoid_names = vrma_node_names(bytes)?;

    let Some(anim) = gltf.document.animations().next() else {
        return Ok(LoadedClip::Empty);
    };

    let mut tracks = Vec::new();
    for channel in anim.channels() {
        let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));
        let target = channel.target();
        let node_index = target.node().index();

        // Prefer the humanoid bone mapping; fall back to the node's own name.
        let node_name = humanoid_names.get(&node_index).cloned().unwrap_or_else(|| {
            target
                .node()
                .name()
                .map_or_else(|| format!("Node_{node_index}"), ToString::to_string)
        });

        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f32> = inputs.collect();

        let interpolation = match channel.sampler().interpolation() {
            gltf::animation::Interpolation::Linear => InterpolationMode::Linear,
            gltf::animation::Interpolation::Step => InterpolationMode::Step,
            gltf::animation::Interpolation::CubicSpline => InterpolationMode::CubicSpline,
        };

        let Some(outputs) = reader.read_outputs() else {
            continue;
        };

        let track = match (target.property(), outputs) {
            (
                gltf::animation::Property::Translation,
                gltf::animation::util::ReadOutputs::Translations(iter),
            ) => Track {
                target: TrackTarget {
                    node_name,
                    path: TargetPath::Translation,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            },
            (
                gltf::animation::Property::Rotation,
                gltf::animation::util::ReadOutputs::Rotations(iter),
            ) => Track {
                target: TrackTarget {
                    node_name,
                    path: TargetPath::Rotation,
                },
                data: TrackData::Quaternion(KeyframeTrack::new(
                    times,
                    iter.into_f32().map(Quat::from_array).collect(),
                    interpolation,
                )),
            },
            (
                gltf::animation::Property::Scale,
                gltf::animation::util::ReadOutputs::Scales(iter),
            ) => Track {
                target: TrackTarget {
                    node_name,
                    path: TargetPath::Scale,
                },
                data: TrackData::Vector3(KeyframeTrack::new(
                    times,
                    iter.map(Vec3::from_array).collect(),
                    interpolation,
                )),
            },
            // Morph weight channels are not humanoid motion; skipped.
            _ => continue,
        };

        tracks.push(track);
    }

    if tracks.is_empty() {
        return Ok(LoadedClip::Empty);
    }

    Ok(LoadedClip::Clip(AnimationClip::new(name.to_string(), tracks)))
}

/// Reads the `VRMC_vrm_animation` humanoid table: node index → humanoid
/// bone name. Empty for plain glTF files.
fn vrma_node_names(bytes: &[u8]) -> Result<FxHashMap<usize, String>> {
    let json: Value = if bytes.starts_with(b"glTF") {
        let glb = gltf::binary::Glb::from_slice(bytes)
            .map_err(|e| HitogataError::Gltf(e.to_string()))?;
        serde_json::from_slice(&glb.json)?
    } else {
        serde_json::from_slice(bytes)?
    };

    let mut names = FxHashMap::default();
    if let Some(bones) = json
        .get("extensions")
        .and_then(|e| e.get("VRMC_vrm_animation"))
        .and_then(|v| v.get("humanoid"))
        .and_then(|h| h.get("humanBones"))
        .and_then(Value::as_object)
    {
        for (bone, entry) in bones {
            if let Some(node) = entry.get("node").and_then(Value::as_u64) {
                names.insert(node as usize, bone.clone());
            }
        }
    }
    Ok(names)
}
