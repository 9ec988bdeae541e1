#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod assets;
pub mod behavior;
pub mod character;
pub mod config;
pub mod errors;
pub mod retarget;
pub mod utils;
pub mod vrm;

pub use animation::{AnimationAction, AnimationClip, KeyframeTrack, LoopMode, Playback};
pub use assets::{AnimationSet, ClipFormat, LoadedClip, ManifestEntry};
pub use behavior::{CharacterState, CharacterStateMachine, MotionController, WanderBounds};
pub use character::{Character, DebugStats};
pub use config::Config;
pub use errors::{HitogataError, Result};
pub use retarget::{retarget, BoneMap};
pub use vrm::{Avatar, ExpressionController};
