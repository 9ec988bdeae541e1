pub mod values;
pub mod tracks;
pub mod clip;
pub mod action;
pub mod binder;
pub mod playback;

pub use clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
pub use action::{AnimationAction, LoopMode};
pub use binder::PropertyBinding;
pub use playback::Playback;
pub use tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
pub use values::Interpolatable;
