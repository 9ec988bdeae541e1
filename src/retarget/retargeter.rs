use std::f32::consts::PI;

use glam::Quat;

use crate::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
use crate::animation::tracks::KeyframeTrack;
use crate::retarget::bones::{BoneMap, MIXAMO_HIPS};

/// Appended to a retargeted clip's name.
pub const RETARGET_SUFFIX: &str = ".vrm";

/// The fixed forward-axis correction: Mixamo rigs face -Z where VRM models
/// face +Z, so hip-root rotations are flipped 180° about the vertical axis.
///
/// Applied as a pre-multiplication (`correction * q`), i.e. in the parent
/// space of the hips. The correction is its own inverse, so applying it
/// twice restores the original keyframes.
#[must_use]
pub fn hips_yaw_correction() -> Quat {
    Quat::from_rotation_y(PI)
}

/// Rewrites a clip authored for the Mixamo skeleton onto the avatar's
/// actual node names.
///
/// Per track: a Mixamo joint found in the bone map is renamed to its
/// destination node; the hip-root rotation channel additionally gets every
/// quaternion keyframe pre-multiplied by [`hips_yaw_correction`]. A track
/// already naming a destination node passes through untouched, which makes
/// the operation stable under re-application. Anything else is dropped and
/// counted.
///
/// The output is a *new* clip: same duration, name tagged with
/// [`RETARGET_SUFFIX`], track count never larger than the input's. A clip
/// mapping zero tracks is degenerate but valid.
#[must_use]
pub fn retarget(clip: &AnimationClip, bones: &BoneMap) -> AnimationClip {
    let mut tracks = Vec::with_capacity(clip.tracks.len());
    let mut skipped = 0usize;

    for track in &clip.tracks {
        let source = track.target.node_name.as_str();

        if let Some(dest) = bones.resolve(source) {
            let data = if source == MIXAMO_HIPS && track.target.path == TargetPath::Rotation {
                correct_rotation_track(&track.data)
            } else {
                track.data.clone()
            };
            tracks.push(Track {
                target: TrackTarget {
                    node_name: dest.to_string(),
                    path: track.target.path,
                },
                data,
            });
        } else if bones.is_destination(source) {
            // Already in target naming (e.g. a second pass over retargeted
            // output): keep as-is, no re-correction.
            tracks.push(track.clone());
        } else {
            skipped += 1;
        }
    }

    if skipped > 0 {
        log::debug!(
            "retarget '{}': {skipped}/{} tracks had no destination joint",
            clip.name,
            clip.tracks.len()
        );
    }

    let name = if clip.name.ends_with(RETARGET_SUFFIX) {
        clip.name.clone()
    } else {
        format!("{}{RETARGET_SUFFIX}", clip.name)
    };

    AnimationClip::with_duration(name, clip.duration, tracks)
}

fn correct_rotation_track(data: &TrackData) -> TrackData {
    match data {
        TrackData::Quaternion(track) => {
            let correction = hips_yaw_correction();
            let values = track.values.iter().map(|q| correction * *q).collect();
            TrackData::Quaternion(KeyframeTrack::new(
                track.times.clone(),
                values,
                track.interpolation,
            ))
        }
        other => other.clone(),
    }
}
