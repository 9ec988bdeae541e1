//! Animation clip extraction from binary FBX files (Mixamo exports).
//!
//! Only what a Mixamo walk cycle needs survives the trip: per-joint
//! `Lcl Translation` / `Lcl Rotation` curve nodes from the first animation
//! stack. Component curves (`d|X`/`d|Y`/`d|Z`) are joined through the
//! `Connections` table, resampled on the union of their key timelines, and
//! Euler XYZ rotations (including each model's `PreRotation`) are folded
//! into quaternions. Joint names keep their `mixamorig:` prefix; the
//! retargeter owns the renaming.

use std::io::{Cursor, Read, Seek};

use fbxcel::low::v7400::AttributeValue;
use fbxcel::tree::any::AnyTree;
use fbxcel::tree::v7400::{NodeHandle, Tree};
use glam::{EulerRot, Quat, Vec3};
use rustc_hash::FxHashMap;

use crate::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::loader::LoadedClip;
use crate::errors::{HitogataError, Result};

/// FBX KTime ticks per second.
const KTIME_PER_SEC: f64 = 46_186_158_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Axis {
    X,
    Y,
    Z,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ChannelKind {
    Translation,
    Rotation,
}

#[derive(Debug, Default)]
struct ModelInfo {
    name: String,
    /// `PreRotation` property, Euler XYZ degrees.
    pre_rotation: Option<Vec3>,
}

#[derive(Debug, Default)]
struct RawCurve {
    times: Vec<i64>,
    values: Vec<f32>,
}

pub fn clip_from_slice(bytes: &[u8], name: &str) -> Result<LoadedClip> {
    clip_from_reader(Cursor::new(bytes), name)
}

pub fn clip_from_reader<R: Read + Seek>(reader: R, name: &str) -> Result<LoadedClip> {
    let tree = match AnyTree::from_seekable_reader(reader)
        .map_err(|e| HitogataError::Fbx(e.to_string()))?
    {
        AnyTree::V7400(_, tree, _) => tree,
        _ => return Ok(LoadedClip::Malformed("unsupported FBX version".to_string())),
    };

    Ok(extract_clip(&tree, name))
}

fn extract_clip(tree: &Tree, name: &str) -> LoadedClip {
    let root = tree.root();
    let Some(objects) = child_by_name(&root, "Objects") else {
        return LoadedClip::Malformed("FBX file has no Objects section".to_string());
    };

    let mut models: FxHashMap<i64, ModelInfo> = FxHashMap::default();
    let mut curve_nodes: FxHashMap<i64, ()> = FxHashMap::default();
    let mut curves: FxHashMap<i64, RawCurve> = FxHashMap::default();

    for object in objects.children() {
        let id = object.attributes().first().and_then(attr_i64);
        let Some(id) = id else {
            continue;
        };
        match object.name() {
            "Model" => {
                let raw_name = object
                    .attributes()
                    .get(1)
                    .and_then(attr_str)
                    .unwrap_or_default();
                models.insert(
                    id,
                    ModelInfo {
                        name: strip_class(raw_name).to_string(),
                        pre_rotation: read_vector_property(&object, "PreRotation"),
                    },
                );
            }
            "AnimationCurveNode" => {
                curve_nodes.insert(id, ());
            }
            "AnimationCurve" => {
                curves.insert(id, read_curve(&object));
            }
            _ => {}
        }
    }

    // Connections: component curve -> curve node (with axis), and curve
    // node -> model (with the local property it animates).
    let mut node_channel: FxHashMap<i64, (i64, ChannelKind)> = FxHashMap::default();
    let mut curve_axis: FxHashMap<i64, (i64, Axis)> = FxHashMap::default();

    if let Some(connections) = child_by_name(&root, "Connections") {
        for conn in connections.children_by_name("C") {
            let attrs = conn.attributes();
            let (Some(kind), Some(src), Some(dst)) = (
                attrs.first().and_then(attr_str),
                attrs.get(1).and_then(attr_i64),
                attrs.get(2).and_then(attr_i64),
            ) else {
                continue;
            };
            if kind != "OP" {
                continue;
            }
            let prop = attrs.get(3).and_then(attr_str).unwrap_or_default();

            if curves.contains_key(&src) && curve_nodes.contains_key(&dst) {
                let axis = match prop {
                    "d|X" => Axis::X,
                    "d|Y" => Axis::Y,
                    "d|Z" => Axis::Z,
                    _ => continue,
                };
                curve_axis.insert(src, (dst, axis));
            } else if curve_nodes.contains_key(&src) && models.contains_key(&dst) {
                let channel = match prop {
                    "Lcl Translation" => ChannelKind::Translation,
                    "Lcl Rotation" => ChannelKind::Rotation,
                    _ => continue,
                };
                node_channel.insert(src, (dst, channel));
            }
        }
    }

    // Group the per-axis curves under (model, channel).
    let mut grouped: FxHashMap<(i64, ChannelKind), FxHashMap<Axis, &RawCurve>> =
        FxHashMap::default();
    for (curve_id, (node_id, axis)) in &curve_axis {
        let Some((model_id, channel)) = node_channel.get(node_id) else {
            continue;
        };
        let Some(curve) = curves.get(curve_id) else {
            continue;
        };
        if curve.times.is_empty() || curve.times.len() != curve.values.len() {
            continue;
        }
        grouped
            .entry((*model_id, *channel))
            .or_default()
            .insert(*axis, curve);
    }

    if grouped.is_empty() {
        return LoadedClip::Empty;
    }

    // Key times are absolute KTime; rebase the clip to start at zero.
    let t0 = grouped
        .values()
        .flat_map(|axes| axes.values())
        .filter_map(|c| c.times.first().copied())
        .min()
        .unwrap_or(0);

    let unit_scale = read_unit_scale(&root);
    let position_scale = (unit_scale / 100.0) as f32; // centimeters to meters

    let mut tracks = Vec::new();
    for ((model_id, channel), axes) in &grouped {
        let Some(model) = models.get(model_id) else {
            continue;
        };

        let times = union_times(axes, t0);
        if times.is_empty() {
            continue;
        }

        let x = axis_track(axes.get(&Axis::X), t0);
        let y = axis_track(axes.get(&Axis::Y), t0);
        let z = axis_track(axes.get(&Axis::Z), t0);

        let data = match channel {
            ChannelKind::Translation => {
                let values = times
                    .iter()
                    .map(|&t| Vec3::new(x.sample(t), y.sample(t), z.sample(t)) * position_scale)
                    .collect();
                TrackData::Vector3(KeyframeTrack::new(
                    times.clone(),
                    values,
                    InterpolationMode::Linear,
                ))
            }
            ChannelKind::Rotation => {
                let pre = model
                    .pre_rotation
                    .map_or(Quat::IDENTITY, euler_xyz_degrees);
                let values = times
                    .iter()
                    .map(|&t| {
                        pre * euler_xyz_degrees(Vec3::new(x.sample(t), y.sample(t), z.sample(t)))
                    })
                    .collect();
                TrackData::Quaternion(KeyframeTrack::new(
                    times.clone(),
                    values,
                    InterpolationMode::Linear,
                ))
            }
        };

        tracks.push(Track {
            target: TrackTarget {
                node_name: model.name.clone(),
                path: match channel {
                    ChannelKind::Translation => TargetPath::Translation,
                    ChannelKind::Rotation => TargetPath::Rotation,
                },
            },
            data,
        });
    }

    if tracks.is_empty() {
        LoadedClip::Empty
    } else {
        LoadedClip::Clip(AnimationClip::new(name.to_string(), tracks))
    }
}

/// FBX `RotationOrder` XYZ (the Mixamo default): rotate about X, then Y,
/// then Z, i.e. `qz * qy * qx`.
fn euler_xyz_degrees(deg: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::ZYX,
        deg.z.to_radians(),
        deg.y.to_radians(),
        deg.x.to_radians(),
    )
}

/// Sorted, deduplicated union of the axis key times, in seconds from `t0`.
fn union_times(axes: &FxHashMap<Axis, &RawCurve>, t0: i64) -> Vec<f32> {
    let mut ktimes: Vec<i64> = axes.values().flat_map(|c| c.times.iter().copied()).collect();
    ktimes.sort_unstable();
    ktimes.dedup();
    ktimes.into_iter().map(|t| ktime_to_secs(t, t0)).collect()
}

/// A single-axis scalar track in seconds, or an empty (constant zero) one.
fn axis_track(curve: Option<&&RawCurve>, t0: i64) -> KeyframeTrack<f32> {
    match curve {
        Some(c) => KeyframeTrack::new(
            c.times.iter().map(|&t| ktime_to_secs(t, t0)).collect(),
            c.values.clone(),
            InterpolationMode::Linear,
        ),
        None => KeyframeTrack::new(Vec::new(), Vec::new(), InterpolationMode::Linear),
    }
}

fn ktime_to_secs(t: i64, t0: i64) -> f32 {
    ((t - t0) as f64 / KTIME_PER_SEC) as f32
}

fn read_curve(object: &NodeHandle<'_>) -> RawCurve {
    let mut curve = RawCurve::default();
    for child in object.children() {
        match (child.name(), child.attributes().first()) {
            ("KeyTime", Some(AttributeValue::ArrI64(times))) => {
                curve.times = times.clone();
            }
            ("KeyValueFloat", Some(AttributeValue::ArrF32(values))) => {
                curve.values = values.clone();
            }
            _ => {}
        }
    }
    curve
}

/// Reads a `Vector3D`-typed entry from an object's `Properties70` block.
fn read_vector_property(object: &NodeHandle<'_>, property: &str) -> Option<Vec3> {
    let props = child_by_name(object, "Properties70")?;
    for p in props.children_by_name("P") {
        let attrs = p.attributes();
        if attrs.first().and_then(attr_str) != Some(property) {
            continue;
        }
        let (Some(x), Some(y), Some(z)) = (
            attrs.get(4).and_then(attr_f64),
            attrs.get(5).and_then(attr_f64),
            attrs.get(6).and_then(attr_f64),
        ) else {
            continue;
        };
        return Some(Vec3::new(x as f32, y as f32, z as f32));
    }
    None
}

/// `GlobalSettings.UnitScaleFactor`; 1.0 means centimeters.
fn read_unit_scale(root: &NodeHandle<'_>) -> f64 {
    child_by_name(root, "GlobalSettings")
        .and_then(|gs| {
            let props = child_by_name(&gs, "Properties70")?;
            for p in props.children_by_name("P") {
                let attrs = p.attributes();
                if attrs.first().and_then(attr_str) == Some("UnitScaleFactor") {
                    return attrs.get(4).and_then(attr_f64);
                }
            }
            None
        })
        .unwrap_or(1.0)
}

fn child_by_name<'a>(node: &NodeHandle<'a>, name: &str) -> Option<NodeHandle<'a>> {
    node.children_by_name(name).next()
}

/// FBX object names carry their class after a NUL separator
/// (`"mixamorig:Hips\0\x01Model"`); keep only the leading name.
fn strip_class(raw: &str) -> &str {
    raw.split('\u{0}').next().unwrap_or(raw)
}

fn attr_i64(attr: &AttributeValue) -> Option<i64> {
    match attr {
        AttributeValue::I64(v) => Some(*v),
        AttributeValue::I32(v) => Some(i64::from(*v)),
        _ => None,
    }
}

fn attr_f64(attr: &AttributeValue) -> Option<f64> {
    match attr {
        AttributeValue::F64(v) => Some(*v),
        AttributeValue::F32(v) => Some(f64::from(*v)),
        _ => None,
    }
}

fn attr_str(attr: &AttributeValue) -> Option<&str> {
    match attr {
        AttributeValue::String(s) => Some(s.as_str()),
        _ => None,
    }
}
