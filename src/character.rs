use std::sync::Arc;

use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::animation::clip::AnimationClip;
use crate::animation::playback::Playback;
use crate::assets::loader::AnimationSet;
use crate::behavior::motion::{MotionController, WanderBounds};
use crate::behavior::scheduler::{Deadline, EpochClock};
use crate::behavior::state::{CharacterState, CharacterStateMachine, IdlePicker, StateTimings};
use crate::config::Config;
use crate::retarget::bones::BoneMapCache;
use crate::retarget::retargeter;
use crate::retarget::validator::{self, AuxBoneClassifier};
use crate::utils::fps_counter::FpsCounter;
use crate::utils::time::Timer;
use crate::vrm::expression::ExpressionController;
use crate::vrm::model::Avatar;

/// Cross-fade timings for state transitions. The fade-in is delayed past
/// the fade-out midpoint so the pose never dips toward the rest pose.
const FADE_OUT_SECS: f32 = 0.2;
const FADE_IN_SECS: f32 = 0.2;
const FADE_IN_DELAY_SECS: f64 = 0.3;

/// Keep-out margin between the wander rectangle and the camera frustum
/// edge, world units.
const WANDER_MARGIN: f32 = 0.5;

/// Snapshot of runtime telemetry, for the debug overlay or log line.
#[derive(Debug, Clone)]
pub struct DebugStats {
    pub fps: f32,
    pub state: CharacterState,
    pub position: Vec2,
    pub heading: f32,
    pub active_clip: Option<String>,
    pub active_expressions: usize,
    pub blinking: bool,
}

/// The animated character: one avatar plus everything that drives it.
///
/// `update()` advances the whole stack in a fixed order each frame: any
/// pending delayed fade-in, then the state machine, then motion (while
/// walking), then facial expressions (while idle), then the playback
/// mixer that writes the final pose. Keeping the order fixed makes frames
/// reproducible given the same dt sequence and RNG seed.
pub struct Character {
    avatar: Avatar,
    playback: Playback,
    expressions: ExpressionController,
    machine: CharacterStateMachine,
    picker: IdlePicker,
    motion: MotionController,
    clips: AnimationSet,
    timer: Timer,
    fps: FpsCounter,
    last_fps: f32,
    rng: StdRng,
    fades: EpochClock,
    pending_fade_in: Option<(Deadline, Arc<AnimationClip>)>,
    clock: f64,
}

impl Character {
    /// Assembles a character from a loaded avatar and clip set.
    ///
    /// Retargeting happens here, once: the walk clip is validated against
    /// the avatar and rewritten onto its skeleton. Clips in the set keep
    /// humanoid naming and bind directly. Playback and the per-frame loop
    /// never see source-skeleton names.
    pub fn new(avatar: Avatar, mut clips: AnimationSet, config: &Config) -> Self {
        let mut bone_cache = BoneMapCache::new();
        let classifier = AuxBoneClassifier::default();

        if let Some(walk) = clips.walk.take() {
            let bones = bone_cache.map_for(&avatar);
            // Validate the retargeted output: the raw clip still carries
            // source-skeleton names, which the avatar can never resolve.
            let retargeted = retargeter::retarget(&walk, bones);
            validator::validate_clip(&retargeted, &avatar, &classifier);
            clips.walk = Some(Arc::new(retargeted));
        }

        let aspect = config.display.width as f32 / config.display.height.max(1) as f32;
        let bounds = WanderBounds::from_camera(
            config.camera.fov_y.to_radians(),
            aspect,
            config.camera.distance(),
            WANDER_MARGIN,
        );

        let timings = StateTimings {
            idle_dwell: config.character.idle_interval,
            walk_dwell: config.character.move_interval,
        };

        let mut character = Self {
            avatar,
            playback: Playback::new(),
            expressions: ExpressionController::new(),
            machine: CharacterStateMachine::new(timings, 0.0),
            picker: IdlePicker::default(),
            motion: MotionController::new(
                bounds,
                config.character.move_speed,
                config.character.rotation_speed,
            ),
            clips,
            timer: Timer::new(),
            fps: FpsCounter::new(),
            last_fps: 0.0,
            rng: StdRng::from_rng(&mut rand::rng()),
            fades: EpochClock::new(),
            pending_fade_in: None,
            clock: 0.0,
        };

        // Start in an idle pose right away instead of the rest pose.
        if let Some(index) = character
            .picker
            .pick(&mut character.rng, character.clips.idle.len())
        {
            if let Some(clip) = character.clips.idle.get(index).cloned() {
                character.playback.play(clip, &mut character.avatar);
            }
        }

        character
    }

    #[must_use]
    pub fn avatar(&self) -> &Avatar {
        &self.avatar
    }

    #[must_use]
    pub fn state(&self) -> CharacterState {
        self.machine.state()
    }

    /// Asks the state machine for a transition; the dwell guard applies.
    pub fn request_state(&mut self, target: CharacterState) -> bool {
        if self.machine.request(target, self.clock) {
            self.enter_state(target);
            return true;
        }
        false
    }

    /// Forces a transition, bypassing the dwell guard. A same-state force
    /// re-enters the state and restarts its animation.
    pub fn force_state(&mut self, target: CharacterState) {
        if self.machine.force(target, self.clock) {
            self.enter_state(target);
        }
    }

    /// Ticks the wall-clock timer and advances one frame.
    pub fn update(&mut self) {
        self.timer.tick();
        if let Some(fps) = self.fps.update() {
            self.last_fps = fps;
        }
        let dt = self.timer.dt_seconds();
        self.step(dt);
    }

    /// Advances one frame of `dt` seconds. Separated from [`Self::update`]
    /// so tests can drive the character with a synthetic clock.
    pub fn step(&mut self, dt: f32) {
        self.clock += f64::from(dt);

        // Delayed fade-in scheduled by an earlier cross-fade.
        if let Some((deadline, clip)) = self.pending_fade_in.take() {
            if self.fades.fires(deadline, self.clock) {
                self.playback
                    .fade_in(clip, &mut self.avatar, FADE_IN_SECS);
            } else if !self.fades.is_stale(deadline) {
                self.pending_fade_in = Some((deadline, clip));
            }
        }

        if let Some(next) = self.machine.auto_update(self.clock) {
            self.enter_state(next);
        }

        match self.machine.state() {
            CharacterState::Walking => {
                let mut position = Vec2::new(self.avatar.position.x, self.avatar.position.z);
                let mut heading = self.avatar.heading;
                let arrived = self.motion.update(dt, &mut position, &mut heading);
                self.avatar.position.x = position.x;
                self.avatar.position.z = position.y;
                self.avatar.heading = heading;

                if arrived && !self.request_state(CharacterState::Idle) {
                    // Dwell not yet elapsed: pick a fresh destination and
                    // keep walking.
                    self.motion.start_moving(position, &mut self.rng);
                }
            }
            CharacterState::Idle => {
                self.expressions.update(self.clock, &mut self.rng);
                self.avatar.expression_weights.clear();
                for (name, weight) in self.expressions.weights() {
                    self.avatar
                        .expression_weights
                        .insert(name.to_string(), weight);
                }
            }
        }

        self.playback.update(dt, &mut self.avatar);
    }

    /// Entry actions for a freshly entered state.
    fn enter_state(&mut self, state: CharacterState) {
        match state {
            CharacterState::Walking => {
                self.expressions.clear();
                self.avatar.expression_weights.clear();
                if let Some(walk) = self.clips.walk.clone() {
                    self.schedule_crossfade(walk);
                }
                let from = Vec2::new(self.avatar.position.x, self.avatar.position.z);
                self.motion.start_moving(from, &mut self.rng);
            }
            CharacterState::Idle => {
                self.motion.stop();
                if let Some(index) = self.picker.pick(&mut self.rng, self.clips.idle.len()) {
                    if let Some(clip) = self.clips.idle.get(index).cloned() {
                        self.schedule_crossfade(clip);
                    }
                }
            }
        }
    }

    /// Fades the current clip out now and schedules the next one to fade
    /// in slightly later. Superseded by any newer transition: the epoch
    /// bump invalidates a deadline that has not fired yet.
    fn schedule_crossfade(&mut self, clip: Arc<AnimationClip>) {
        self.fades.bump();
        self.playback.fade_out_active(FADE_OUT_SECS);
        let deadline = self.fades.schedule(self.clock + FADE_IN_DELAY_SECS);
        self.pending_fade_in = Some((deadline, clip));
    }

    #[must_use]
    pub fn debug_stats(&self) -> DebugStats {
        DebugStats {
            fps: self.last_fps,
            state: self.machine.state(),
            position: Vec2::new(self.avatar.position.x, self.avatar.position.z),
            heading: self.avatar.heading,
            active_clip: self.playback.active_clip().map(str::to_string),
            active_expressions: self.expressions.active_count(),
            blinking: self.expressions.is_blinking(),
        }
    }
}
