//! Runtime configuration.
//!
//! A flat JSON structure read once at startup. Every field has a default,
//! so a partial (or absent) file still yields a runnable setup. The
//! display/background/lighting blocks are carried for the embedding
//! application; the library itself consumes camera, model, character,
//! animations, and debug.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{HitogataError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vec3Config {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3Config {
    #[must_use]
    pub fn to_vec3(self) -> glam::Vec3 {
        glam::Vec3::new(self.x, self.y, self.z)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CameraConfig {
    pub position: Vec3Config,
    pub look_at: Vec3Config,
    /// Vertical field of view, degrees.
    pub fov_y: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3Config { x: 0.0, y: 1.2, z: 3.5 },
            look_at: Vec3Config { x: 0.0, y: 1.0, z: 0.0 },
            fov_y: 30.0,
        }
    }
}

impl CameraConfig {
    /// Distance from the camera to the point it looks at, along its view
    /// axis. Drives the wander boundary computation.
    #[must_use]
    pub fn distance(&self) -> f32 {
        (self.position.to_vec3() - self.look_at.to_vec3()).length()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackgroundConfig {
    pub image_path: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AmbientLightConfig {
    pub color: String,
    pub intensity: f32,
}

impl Default for AmbientLightConfig {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            intensity: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DirectionalLightConfig {
    pub color: String,
    pub intensity: f32,
    pub position: Vec3Config,
}

impl Default for DirectionalLightConfig {
    fn default() -> Self {
        Self {
            color: "#ffffff".to_string(),
            intensity: 1.0,
            position: Vec3Config { x: 1.0, y: 2.0, z: 1.0 },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LightingConfig {
    pub ambient: AmbientLightConfig,
    pub directional: DirectionalLightConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModelConfig {
    pub path: String,
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "assets/avatar.vrm".to_string(),
            scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CharacterConfig {
    /// World units per second.
    pub move_speed: f32,
    /// Radians per second toward the travel heading.
    pub rotation_speed: f32,
    /// Minimum dwell in the walking state, seconds.
    pub move_interval: f64,
    /// Minimum dwell in the idle state, seconds.
    pub idle_interval: f64,
}

impl Default for CharacterConfig {
    fn default() -> Self {
        Self {
            move_speed: 0.5,
            rotation_speed: 3.0,
            move_interval: 4.0,
            idle_interval: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationEntryConfig {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnimationsConfig {
    pub walk: Option<AnimationEntryConfig>,
    pub idle: Vec<AnimationEntryConfig>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DebugConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub display: DisplayConfig,
    pub camera: CameraConfig,
    pub background: BackgroundConfig,
    pub lighting: LightingConfig,
    pub model: ModelConfig,
    pub character: CharacterConfig,
    pub animations: AnimationsConfig,
    pub debug: DebugConfig,
}

impl Config {
    /// Loads configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|_| HitogataError::AssetNotFound(path.display().to_string()))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
