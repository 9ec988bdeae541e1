use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{HitogataError, Result};

/// Animation file formats the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClipFormat {
    /// Skinned-mesh exchange format; Mixamo walk cycles.
    Fbx,
    /// VRM animation (glTF container with `VRMC_vrm_animation`).
    Vrma,
    Gltf,
    Glb,
}

impl ClipFormat {
    /// Infers the format from a file extension.
    #[must_use]
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        let ext = path.as_ref().extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "fbx" => Some(Self::Fbx),
            "vrma" => Some(Self::Vrma),
            "gltf" => Some(Self::Gltf),
            "glb" => Some(Self::Glb),
            _ => None,
        }
    }
}

/// One manifest line: which parser, which file, and the clip name the
/// result is registered under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(rename = "type")]
    pub format: ClipFormat,
    pub path: String,
    pub name: String,
}

/// Parses a manifest from raw JSON: an ordered array of entries.
pub fn parse_manifest(bytes: &[u8]) -> Result<Vec<ManifestEntry>> {
    let entries: Vec<ManifestEntry> = serde_json::from_slice(bytes)?;
    if entries.is_empty() {
        log::warn!("animation manifest is empty");
    }
    Ok(entries)
}

/// Loads a manifest file from disk.
pub fn load_manifest(path: impl AsRef<Path>) -> Result<Vec<ManifestEntry>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .map_err(|_| HitogataError::AssetNotFound(path.display().to_string()))?;
    parse_manifest(&bytes)
}
