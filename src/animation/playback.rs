use std::sync::Arc;

use crate::animation::action::{AnimationAction, TrackValue};
use crate::animation::binder::{self, PropertyBinding};
use crate::animation::clip::{AnimationClip, TargetPath};
use crate::vrm::model::Avatar;

/// Playback manager: owns the actions animating one avatar and exposes the
/// hard-cut and cross-fade entry points.
///
/// Steady state is a single looping action at weight 1.0 / timescale 1.0.
/// During a cross-fade the superseded action lingers in `fading_out` until
/// its weight reaches zero, then it is dropped.
///
/// Playback is retargeting-agnostic: clips handed to it must already be in
/// target-skeleton naming (retargeting happens once, at load time).
pub struct Playback {
    active: Option<AnimationAction>,
    fading_out: Vec<AnimationAction>,
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}

impl Playback {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: None,
            fading_out: Vec::new(),
        }
    }

    /// Name of the clip currently driving the avatar, if any.
    #[must_use]
    pub fn active_clip(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.clip().name.as_str())
    }

    /// Hard cut: stop whatever is playing and start `clip` from time zero
    /// at full weight.
    pub fn play(&mut self, clip: Arc<AnimationClip>, avatar: &mut Avatar) {
        self.fading_out.clear();
        self.active = Some(self.start_action(clip, avatar, 1.0));
    }

    /// Soft cut: fade the current action out and the new clip in over the
    /// given durations. Both entry points converge to the same steady state.
    pub fn crossfade(
        &mut self,
        clip: Arc<AnimationClip>,
        avatar: &mut Avatar,
        fade_out: f32,
        fade_in: f32,
    ) {
        self.fade_out_active(fade_out);
        self.fade_in(clip, avatar, fade_in);
    }

    /// First half of a split cross-fade: begin fading out the active action
    /// without starting anything new yet.
    pub fn fade_out_active(&mut self, duration: f32) {
        if let Some(mut old) = self.active.take() {
            old.fade_out(duration);
            self.fading_out.push(old);
        }
    }

    /// Second half of a split cross-fade: start `clip` at weight zero and
    /// ramp it to full over `duration`.
    pub fn fade_in(&mut self, clip: Arc<AnimationClip>, avatar: &mut Avatar, duration: f32) {
        let mut action = self.start_action(clip, avatar, 0.0);
        action.fade_in(duration);
        self.active = Some(action);
    }

    fn start_action(
        &mut self,
        clip: Arc<AnimationClip>,
        avatar: &mut Avatar,
        weight: f32,
    ) -> AnimationAction {
        let mut action = AnimationAction::new(clip);
        action.weight = weight;
        action.bindings = binder::bind(avatar, action.clip());

        if action.bindings.is_empty() && !action.clip().tracks.is_empty() {
            // The clip names tracks but none resolve on this avatar. Keep
            // the render loop alive: neutral pose instead of a broken one.
            log::warn!(
                "clip '{}' resolved no bindings on avatar '{}'; resetting to rest pose",
                action.clip().name,
                avatar.name
            );
            avatar.reset_pose();
        }

        action
    }

    /// Advances all actions and writes their sampled values into the avatar
    /// node transforms, blending by action weight during fades.
    pub fn update(&mut self, dt: f32, avatar: &mut Avatar) {
        for action in &mut self.fading_out {
            action.update(dt);
            Self::apply(action, avatar);
        }
        self.fading_out.retain(|a| !a.faded_out());

        if let Some(action) = &mut self.active {
            action.update(dt);
            Self::apply(action, avatar);
        }
    }

    fn apply(action: &mut AnimationAction, avatar: &mut Avatar) {
        if action.paused || !action.enabled || action.weight <= 0.0 {
            return;
        }

        let weight = action.weight.min(1.0);
        let bindings: Vec<PropertyBinding> = action.bindings.clone();
        for binding in &bindings {
            let Some(value) = action.sample_track(binding.track_index) else {
                continue;
            };
            let Some(node) = avatar.node_mut(binding.node) else {
                continue;
            };
            match (value, binding.path) {
                (TrackValue::Vector3(v), TargetPath::Translation) => {
                    node.position = node.position.lerp(v, weight);
                }
                (TrackValue::Vector3(v), TargetPath::Scale) => {
                    node.scale = node.scale.lerp(v, weight);
                }
                (TrackValue::Quaternion(q), TargetPath::Rotation) => {
                    node.rotation = node.rotation.slerp(q, weight);
                }
                _ => {}
            }
        }
    }
}
