//! Asset loading: the animation manifest and the per-format clip parsers.

pub mod fbx_clip;
pub mod gltf_clip;
pub mod loader;
pub mod manifest;

pub use loader::{AnimationSet, LoadedClip, load_clip, load_set, placeholder_clip};
pub use manifest::{ClipFormat, ManifestEntry, load_manifest, parse_manifest};
