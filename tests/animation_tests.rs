//! Animation System Tests
//!
//! Tests for:
//! - KeyframeTrack linear/step/cubic interpolation
//! - KeyframeCursor O(1) optimization and binary search fallback
//! - AnimationClip duration auto-computation
//! - AnimationAction loop modes and fades
//! - Playback cross-fade lifecycle

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec3};

use hitogata::animation::action::{AnimationAction, LoopMode};
use hitogata::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
use hitogata::animation::playback::Playback;
use hitogata::animation::tracks::{InterpolationMode, KeyframeCursor, KeyframeTrack};
use hitogata::vrm::model::Avatar;

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn rotation_track(node: &str, times: Vec<f32>, values: Vec<Quat>) -> Track {
    Track {
        target: TrackTarget {
            node_name: node.to_string(),
            path: TargetPath::Rotation,
        },
        data: TrackData::Quaternion(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

// ============================================================================
// KeyframeTrack: Linear Interpolation
// ============================================================================

#[test]
fn track_linear_f32_midpoint() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![0.0_f32, 10.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    let val = track.sample_with_cursor(0.5, &mut cursor);
    assert!(approx(val, 5.0), "Expected 5.0, got {val}");
}

#[test]
fn track_linear_clamps_outside_range() {
    let track = KeyframeTrack::new(
        vec![1.0, 2.0],
        vec![10.0_f32, 20.0],
        InterpolationMode::Linear,
    );

    assert!(approx(track.sample(0.0), 10.0));
    assert!(approx(track.sample(5.0), 20.0));
}

#[test]
fn track_linear_vec3() {
    let track = KeyframeTrack::new(
        vec![0.0, 2.0],
        vec![Vec3::ZERO, Vec3::new(2.0, 4.0, 6.0)],
        InterpolationMode::Linear,
    );

    let val = track.sample(1.0);
    assert!(approx(val.x, 1.0));
    assert!(approx(val.y, 2.0));
    assert!(approx(val.z, 3.0));
}

#[test]
fn track_quat_slerp_midpoint() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
        InterpolationMode::Linear,
    );

    let val = track.sample(0.5);
    let expected = Quat::from_rotation_y(FRAC_PI_2 / 2.0);
    assert!(val.dot(expected).abs() > 1.0 - EPSILON);
}

#[test]
fn track_step_holds_previous_key() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0],
        vec![1.0_f32, 9.0],
        InterpolationMode::Step,
    );

    assert!(approx(track.sample(0.99), 1.0));
    assert!(approx(track.sample(1.0), 9.0));
}

#[test]
fn track_empty_returns_default() {
    let track: KeyframeTrack<f32> =
        KeyframeTrack::new(Vec::new(), Vec::new(), InterpolationMode::Linear);
    assert!(track.is_empty());
    assert!(approx(track.sample(0.5), 0.0));
}

// ============================================================================
// KeyframeCursor: forward scan and fallback
// ============================================================================

#[test]
fn cursor_sequential_samples_match_cold_samples() {
    let times: Vec<f32> = (0..100).map(|i| i as f32 * 0.1).collect();
    let values: Vec<f32> = (0..100).map(|i| i as f32).collect();
    let track = KeyframeTrack::new(times, values, InterpolationMode::Linear);

    let mut cursor = KeyframeCursor::default();
    for i in 0..200 {
        let t = i as f32 * 0.05;
        let warm = track.sample_with_cursor(t, &mut cursor);
        let cold = track.sample(t);
        assert!(approx(warm, cold), "divergence at t={t}: {warm} vs {cold}");
    }
}

#[test]
fn cursor_handles_backwards_seek() {
    let track = KeyframeTrack::new(
        vec![0.0, 1.0, 2.0, 3.0],
        vec![0.0_f32, 10.0, 20.0, 30.0],
        InterpolationMode::Linear,
    );

    let mut cursor = KeyframeCursor::default();
    assert!(approx(track.sample_with_cursor(2.5, &mut cursor), 25.0));
    // Loop wrap: time jumps backwards, cursor must re-seek.
    assert!(approx(track.sample_with_cursor(0.5, &mut cursor), 5.0));
}

// ============================================================================
// AnimationClip: duration
// ============================================================================

#[test]
fn clip_duration_is_latest_key_time() {
    let clip = AnimationClip::new(
        "test".to_string(),
        vec![
            rotation_track("hips", vec![0.0, 1.0], vec![Quat::IDENTITY; 2]),
            rotation_track("spine", vec![0.0, 2.5], vec![Quat::IDENTITY; 2]),
        ],
    );
    assert!(approx(clip.duration, 2.5));
}

#[test]
fn clip_with_duration_overrides_track_extent() {
    let clip = AnimationClip::with_duration(
        "test".to_string(),
        4.0,
        vec![rotation_track("hips", vec![0.0, 1.0], vec![Quat::IDENTITY; 2])],
    );
    assert!(approx(clip.duration, 4.0));
}

// ============================================================================
// AnimationAction: loop modes
// ============================================================================

fn one_second_action(loop_mode: LoopMode) -> AnimationAction {
    let clip = AnimationClip::new(
        "loop".to_string(),
        vec![rotation_track("hips", vec![0.0, 1.0], vec![Quat::IDENTITY; 2])],
    );
    let mut action = AnimationAction::new(Arc::new(clip));
    action.loop_mode = loop_mode;
    action
}

#[test]
fn action_once_clamps_and_pauses() {
    let mut action = one_second_action(LoopMode::Once);
    action.update(1.5);
    assert!(approx(action.time, 1.0));
    assert!(action.paused);
}

#[test]
fn action_loop_wraps() {
    let mut action = one_second_action(LoopMode::Loop);
    action.update(1.25);
    assert!(approx(action.time, 0.25));
    assert!(!action.paused);
}

#[test]
fn action_ping_pong_reverses() {
    let mut action = one_second_action(LoopMode::PingPong);
    action.update(1.25);
    // Past the end: 1.25 into a 2.0 cycle mirrors to 0.75.
    assert!(approx(action.time, 0.75));
}

// ============================================================================
// AnimationAction: fades
// ============================================================================

#[test]
fn fade_in_ramps_weight_to_one() {
    let mut action = one_second_action(LoopMode::Loop);
    action.weight = 0.0;
    action.fade_in(0.5);

    action.update(0.25);
    assert!(approx(action.weight, 0.5), "got {}", action.weight);
    action.update(0.5);
    assert!(approx(action.weight, 1.0));
}

#[test]
fn fade_out_completes_and_reports() {
    let mut action = one_second_action(LoopMode::Loop);
    action.fade_out(0.2);
    assert!(!action.faded_out());

    action.update(0.3);
    assert!(approx(action.weight, 0.0));
    assert!(action.faded_out());
}

#[test]
fn zero_duration_fade_applies_immediately() {
    let mut action = one_second_action(LoopMode::Loop);
    action.weight = 0.0;
    action.fade_in(0.0);
    action.update(0.016);
    assert!(approx(action.weight, 1.0));
}

// ============================================================================
// Playback: cross-fade lifecycle
// ============================================================================

fn hips_avatar() -> Avatar {
    let mut avatar = Avatar::empty("test");
    let key = avatar.add_node("hips", None);
    avatar.assign_humanoid("hips", key);
    avatar
}

fn named_clip(name: &str) -> Arc<AnimationClip> {
    Arc::new(AnimationClip::new(
        name.to_string(),
        vec![rotation_track(
            "hips",
            vec![0.0, 1.0],
            vec![Quat::IDENTITY, Quat::from_rotation_y(FRAC_PI_2)],
        )],
    ))
}

#[test]
fn play_is_a_hard_cut() {
    let mut avatar = hips_avatar();
    let mut playback = Playback::new();

    playback.play(named_clip("a"), &mut avatar);
    assert_eq!(playback.active_clip(), Some("a"));

    playback.play(named_clip("b"), &mut avatar);
    assert_eq!(playback.active_clip(), Some("b"));
}

#[test]
fn crossfade_switches_active_clip_immediately() {
    let mut avatar = hips_avatar();
    let mut playback = Playback::new();

    playback.play(named_clip("a"), &mut avatar);
    playback.crossfade(named_clip("b"), &mut avatar, 0.2, 0.2);
    assert_eq!(playback.active_clip(), Some("b"));
}

#[test]
fn crossfade_converges_to_steady_state() {
    let mut avatar = hips_avatar();
    let mut playback = Playback::new();

    playback.play(named_clip("a"), &mut avatar);
    playback.crossfade(named_clip("b"), &mut avatar, 0.2, 0.2);

    // Well past both fade windows the old action must be gone and the new
    // one at full weight; the pose it writes is the new clip's alone.
    for _ in 0..60 {
        playback.update(0.016, &mut avatar);
    }
    assert_eq!(playback.active_clip(), Some("b"));
}

#[test]
fn split_crossfade_allows_a_gap() {
    let mut avatar = hips_avatar();
    let mut playback = Playback::new();

    playback.play(named_clip("a"), &mut avatar);
    playback.fade_out_active(0.2);
    assert_eq!(playback.active_clip(), None);

    playback.update(0.1, &mut avatar);
    playback.fade_in(named_clip("b"), &mut avatar, 0.2);
    assert_eq!(playback.active_clip(), Some("b"));
}
