//! Error Types
//!
//! The main error type [`HitogataError`] covers all failure modes of the
//! crate: asset loading and decoding, manifest handling, and model
//! inspection. All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, HitogataError>`.
//!
//! Per-track failures (an animation channel that cannot be mapped onto the
//! avatar) are deliberately *not* errors: they are aggregated into a
//! compatibility ratio by the validator and logged, never surfaced.

use thiserror::Error;

/// The main error type for hitogata.
#[derive(Error, Debug)]
pub enum HitogataError {
    // ========================================================================
    // I/O & Serialization Errors
    // ========================================================================
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error (config, manifest, VRM extension blocks).
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // Asset Loading Errors
    // ========================================================================
    /// The requested asset was not found.
    #[error("Asset not found: {0}")]
    AssetNotFound(String),

    /// glTF / GLB / VRMA parsing or decoding error.
    #[error("glTF error: {0}")]
    Gltf(String),

    /// FBX parsing error.
    #[error("FBX error: {0}")]
    Fbx(String),

    /// Animation manifest error (bad entry, unknown format tag).
    #[error("Manifest error: {0}")]
    Manifest(String),

    // ========================================================================
    // Model Errors
    // ========================================================================
    /// The model file is not a recognizable humanoid avatar container.
    #[error("Unsupported model format: {0}")]
    ModelFormat(String),

    /// The model carries no humanoid bone table (neither VRM 0.x nor VRM 1.0).
    #[error("Model has no humanoid bone table: {0}")]
    NoHumanoid(String),
}

impl From<gltf::Error> for HitogataError {
    fn from(err: gltf::Error) -> Self {
        HitogataError::Gltf(err.to_string())
    }
}

/// Alias for `Result<T, HitogataError>`.
pub type Result<T> = std::result::Result<T, HitogataError>;
