use glam::{Quat, Vec3};

use crate::animation::tracks::KeyframeTrack;

/// Which node property a track animates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetPath {
    Translation,
    Rotation,
    Scale,
}

/// Where a track applies: a node name (either an actual scene node name or
/// a VRM humanoid bone name, resolved at bind time) plus the property.
#[derive(Debug, Clone)]
pub struct TrackTarget {
    pub node_name: String,
    pub path: TargetPath,
}

#[derive(Debug, Clone)]
pub enum TrackData {
    Vector3(KeyframeTrack<Vec3>),
    Quaternion(KeyframeTrack<Quat>),
}

impl TrackData {
    #[must_use]
    pub fn last_time(&self) -> f32 {
        match self {
            TrackData::Vector3(t) => t.last_time(),
            TrackData::Quaternion(t) => t.last_time(),
        }
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        match self {
            TrackData::Vector3(t) => t.key_count(),
            TrackData::Quaternion(t) => t.key_count(),
        }
    }
}

/// A complete track: target plus keyframe data.
#[derive(Debug, Clone)]
pub struct Track {
    pub target: TrackTarget,
    pub data: TrackData,
}

/// An immutable animation clip. Loaded once, optionally retargeted into a
/// *new* clip, then shared by reference (`Arc`) across plays.
#[derive(Debug, Clone)]
pub struct AnimationClip {
    pub name: String,
    pub duration: f32,
    pub tracks: Vec<Track>,
}

impl AnimationClip {
    /// Builds a clip whose duration is the latest key time of any track.
    #[must_use]
    pub fn new(name: String, tracks: Vec<Track>) -> Self {
        let duration = tracks
            .iter()
            .map(|t| t.data.last_time())
            .fold(0.0_f32, f32::max);
        Self {
            name,
            duration,
            tracks,
        }
    }

    /// Builds a clip with an explicit duration. Used where duration must be
    /// preserved independently of the surviving tracks (retargeting,
    /// placeholder clips).
    #[must_use]
    pub fn with_duration(name: String, duration: f32, tracks: Vec<Track>) -> Self {
        Self {
            name,
            duration,
            tracks,
        }
    }
}
