use std::path::Path;
use std::sync::Arc;

use glam::Quat;

use crate::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
use crate::animation::tracks::{InterpolationMode, KeyframeTrack};
use crate::assets::manifest::{ClipFormat, ManifestEntry};
use crate::assets::{fbx_clip, gltf_clip};
use crate::errors::{HitogataError, Result};
use crate::vrm::humanoid;

/// Outcome of parsing one animation file, decided once at the loader
/// boundary. Consumers never probe result shapes themselves.
#[derive(Debug, Clone)]
pub enum LoadedClip {
    /// A usable clip with at least one track.
    Clip(AnimationClip),
    /// The file parsed but contained no usable animation.
    Empty,
    /// The file is not what its format tag claims.
    Malformed(String),
}

/// The classified result of loading an animation manifest: one walk cycle
/// slot plus a list of idle clips.
#[derive(Debug, Default)]
pub struct AnimationSet {
    pub walk: Option<Arc<AnimationClip>>,
    pub idle: Vec<Arc<AnimationClip>>,
}

impl AnimationSet {
    /// Files the loaded result under the walk slot (FBX entries; last one
    /// wins) or the idle list (everything else). An idle entry that failed
    /// to yield a clip is replaced by a placeholder so downstream code
    /// never sees a missing animation; a failed walk entry leaves the slot
    /// as it was.
    pub fn classify(&mut self, format: ClipFormat, name: &str, loaded: LoadedClip) {
        match format {
            ClipFormat::Fbx => match loaded {
                LoadedClip::Clip(clip) => {
                    if self.walk.is_some() {
                        log::warn!("walk clip '{name}' replaces a previously loaded one");
                    }
                    self.walk = Some(Arc::new(clip));
                }
                LoadedClip::Empty => {
                    log::warn!("walk entry '{name}' contained no animation; skipped");
                }
                LoadedClip::Malformed(reason) => {
                    log::warn!("walk entry '{name}' is malformed ({reason}); skipped");
                }
            },
            ClipFormat::Vrma | ClipFormat::Gltf | ClipFormat::Glb => match loaded {
                LoadedClip::Clip(clip) => self.idle.push(Arc::new(clip)),
                LoadedClip::Empty => {
                    log::warn!("idle entry '{name}' contained no animation; using placeholder");
                    self.idle.push(Arc::new(placeholder_clip(name)));
                }
                LoadedClip::Malformed(reason) => {
                    log::warn!("idle entry '{name}' is malformed ({reason}); using placeholder");
                    self.idle.push(Arc::new(placeholder_clip(name)));
                }
            },
        }
    }
}

/// Loads and parses a single manifest entry. `base` anchors relative paths.
pub fn load_clip(entry: &ManifestEntry, base: &Path) -> Result<LoadedClip> {
    let path = base.join(&entry.path);
    let bytes = std::fs::read(&path)
        .map_err(|_| HitogataError::AssetNotFound(path.display().to_string()))?;

    match entry.format {
        ClipFormat::Fbx => fbx_clip::clip_from_slice(&bytes, &entry.name),
        ClipFormat::Vrma | ClipFormat::Gltf | ClipFormat::Glb => {
            gltf_clip::clip_from_slice(&bytes, &entry.name)
        }
    }
}

/// Loads every manifest entry and classifies the results. One bad entry is
/// logged and skipped; the batch itself never fails.
#[must_use]
pub fn load_set(entries: &[ManifestEntry], base: &Path) -> AnimationSet {
    let mut set = AnimationSet::default();

    for entry in entries {
        match load_clip(entry, base) {
            Ok(loaded) => set.classify(entry.format, &entry.name, loaded),
            Err(err) => {
                // Route the failure through classification so idle entries
                // still get their placeholder.
                set.classify(entry.format, &entry.name, LoadedClip::Malformed(err.to_string()));
            }
        }
    }

    log::info!(
        "animation set: walk={}, idle clips={}",
        set.walk.as_ref().map_or("none", |c| c.name.as_str()),
        set.idle.len()
    );

    set
}

/// A minimal stand-in clip: one identity rotation key on the hips, one
/// second long. Keeps the playback manager fed when an idle entry fails.
#[must_use]
pub fn placeholder_clip(name: &str) -> AnimationClip {
    let track = Track {
        target: TrackTarget {
            node_name: humanoid::HIPS.to_string(),
            path: TargetPath::Rotation,
        },
        data: TrackData::Quaternion(KeyframeTrack::new(
            vec![0.0],
            vec![Quat::IDENTITY],
            InterpolationMode::Step,
        )),
    };
    AnimationClip::with_duration(format!("{name}.placeholder"), 1.0, vec![track])
}
