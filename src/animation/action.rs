use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::animation::binder::PropertyBinding;
use crate::animation::clip::{AnimationClip, TrackData};
use crate::animation::tracks::KeyframeCursor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    Once,
    Loop,
    PingPong,
}

/// A linear weight ramp, relative to the action's own elapsed clock.
#[derive(Debug, Clone, Copy)]
struct Fade {
    from: f32,
    to: f32,
    start: f32,
    duration: f32,
}

/// A playing instance of a clip: local time, weight, loop mode, and the
/// property bindings resolving its tracks onto avatar nodes.
#[derive(Debug, Clone)]
pub struct AnimationAction {
    clip: Arc<AnimationClip>,

    pub time: f32,
    pub time_scale: f32,
    pub weight: f32,
    pub loop_mode: LoopMode,
    pub paused: bool,
    pub enabled: bool,

    pub bindings: Vec<PropertyBinding>,

    /// Wall-clock seconds this action has been updated, independent of
    /// looping. Fades are expressed against this clock.
    elapsed: f32,
    fade: Option<Fade>,
    pub(crate) track_cursors: Vec<KeyframeCursor>,
}

pub enum TrackValue {
    Vector3(Vec3),
    Quaternion(Quat),
}

impl AnimationAction {
    #[must_use]
    pub fn new(clip: Arc<AnimationClip>) -> Self {
        let track_count = clip.tracks.len();
        Self {
            clip,
            time: 0.0,
            time_scale: 1.0,
            weight: 1.0,
            loop_mode: LoopMode::Loop,
            paused: false,
            enabled: true,
            bindings: Vec::new(),
            elapsed: 0.0,
            fade: None,
            track_cursors: vec![KeyframeCursor::default(); track_count],
        }
    }

    #[must_use]
    pub fn clip(&self) -> &Arc<AnimationClip> {
        &self.clip
    }

    /// Ramp weight from its current value to 1.0 over `duration` seconds.
    pub fn fade_in(&mut self, duration: f32) {
        self.fade = Some(Fade {
            from: self.weight,
            to: 1.0,
            start: self.elapsed,
            duration: duration.max(0.0),
        });
    }

    /// Ramp weight from its current value to 0.0 over `duration` seconds.
    pub fn fade_out(&mut self, duration: f32) {
        self.fade = Some(Fade {
            from: self.weight,
            to: 0.0,
            start: self.elapsed,
            duration: duration.max(0.0),
        });
    }

    /// True once a fade-out has completed: the action contributes nothing
    /// and can be dropped by the playback manager.
    #[must_use]
    pub fn faded_out(&self) -> bool {
        self.fade.is_none() && self.weight <= f32::EPSILON && self.elapsed > 0.0
    }

    /// Advances local time, the loop cycle, and any active fade.
    pub fn update(&mut self, dt: f32) {
        if self.paused || !self.enabled {
            return;
        }

        self.elapsed += dt;
        self.advance_fade();

        let duration = self.clip.duration;
        if duration <= 0.0 {
            return;
        }

        self.time += dt * self.time_scale;

        match self.loop_mode {
            LoopMode::Once => {
                if self.time >= duration {
                    self.time = duration;
                    self.paused = true;
                } else if self.time < 0.0 {
                    self.time = 0.0;
                    self.paused = true;
                }
            }
            LoopMode::Loop => {
                if self.time >= duration {
                    self.time %= duration;
                } else if self.time < 0.0 {
                    self.time = duration + (self.time % duration);
                }
            }
            LoopMode::PingPong => {
                let cycle = duration * 2.0;
                let mut t = self.time % cycle;
                if t < 0.0 {
                    t += cycle;
                }
                if t > duration {
                    t = cycle - t;
                }
                self.time = t;
            }
        }
    }

    fn advance_fade(&mut self) {
        let Some(fade) = self.fade else {
            return;
        };
        let progress = if fade.duration <= f32::EPSILON {
            1.0
        } else {
            ((self.elapsed - fade.start) / fade.duration).clamp(0.0, 1.0)
        };
        self.weight = fade.from + (fade.to - fade.from) * progress;
        if progress >= 1.0 {
            self.fade = None;
        }
    }

    /// Samples the given track at the action's current time.
    pub fn sample_track(&mut self, track_index: usize) -> Option<TrackValue> {
        let track = self.clip.tracks.get(track_index)?;
        let cursor = self.track_cursors.get_mut(track_index)?;

        Some(match &track.data {
            TrackData::Vector3(t) => TrackValue::Vector3(t.sample_with_cursor(self.time, cursor)),
            TrackData::Quaternion(t) => {
                TrackValue::Quaternion(t.sample_with_cursor(self.time, cursor))
            }
        })
    }
}
