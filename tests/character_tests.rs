//! Character Coordinator Tests
//!
//! Tests for:
//! - Construction (including the load-time retargeting pass)
//! - Forced state transitions and their entry actions
//! - Autonomous dwell-driven flips during step()
//! - Position staying inside the wander bounds

use std::sync::Arc;

use glam::Quat;

use hitogata::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
use hitogata::animation::tracks::{InterpolationMode, KeyframeTrack};
use hitogata::assets::loader::AnimationSet;
use hitogata::behavior::state::CharacterState;
use hitogata::config::Config;
use hitogata::vrm::model::Avatar;
use hitogata::Character;

fn small_avatar() -> Avatar {
    let mut avatar = Avatar::empty("mini");
    let hips = avatar.add_node("J_Bip_C_Hips", None);
    let spine = avatar.add_node("J_Bip_C_Spine", Some(hips));
    avatar.assign_humanoid("hips", hips);
    avatar.assign_humanoid("spine", spine);
    avatar
}

fn rotation_track(node: &str) -> Track {
    Track {
        target: TrackTarget {
            node_name: node.to_string(),
            path: TargetPath::Rotation,
        },
        data: TrackData::Quaternion(KeyframeTrack::new(
            vec![0.0, 1.0],
            vec![Quat::IDENTITY; 2],
            InterpolationMode::Linear,
        )),
    }
}

fn clip_set() -> AnimationSet {
    let mut set = AnimationSet::default();
    set.walk = Some(Arc::new(AnimationClip::new(
        "walk".to_string(),
        vec![
            rotation_track("mixamorig:Hips"),
            rotation_track("mixamorig:Spine"),
        ],
    )));
    set.idle.push(Arc::new(AnimationClip::new(
        "idle_01".to_string(),
        vec![rotation_track("hips")],
    )));
    set
}

#[test]
fn construction_plays_an_idle_clip() {
    let character = Character::new(small_avatar(), clip_set(), &Config::default());

    // Starts idle with the idle clip playing.
    assert_eq!(character.state(), CharacterState::Idle);
    assert_eq!(character.debug_stats().active_clip.as_deref(), Some("idle_01"));
}

#[test]
fn empty_clip_set_is_tolerated() {
    let mut character = Character::new(small_avatar(), AnimationSet::default(), &Config::default());
    for _ in 0..10 {
        character.step(1.0 / 60.0);
    }
    assert_eq!(character.state(), CharacterState::Idle);
    assert!(character.debug_stats().active_clip.is_none());
}

#[test]
fn forced_walk_starts_and_dwell_flips_back() {
    let mut character = Character::new(small_avatar(), clip_set(), &Config::default());

    character.force_state(CharacterState::Walking);
    assert_eq!(character.state(), CharacterState::Walking);

    // The walk clip fades in shortly after the transition, already
    // renamed onto the avatar skeleton by the load-time retarget pass.
    for _ in 0..60 {
        character.step(1.0 / 60.0);
    }
    assert_eq!(character.debug_stats().active_clip.as_deref(), Some("walk.vrm"));

    // Default walk dwell is 4s; step past it and the auto ping-pong must
    // return to idle.
    for _ in 0..240 {
        character.step(1.0 / 60.0);
    }
    assert_eq!(character.state(), CharacterState::Idle);
}

#[test]
fn request_respects_dwell_but_force_does_not() {
    let mut character = Character::new(small_avatar(), clip_set(), &Config::default());

    character.step(1.0 / 60.0);
    // One frame into the 5s idle dwell.
    assert!(!character.request_state(CharacterState::Walking));
    assert_eq!(character.state(), CharacterState::Idle);

    character.force_state(CharacterState::Walking);
    assert_eq!(character.state(), CharacterState::Walking);
}

#[test]
fn wandering_keeps_the_avatar_on_screen() {
    let config = Config::default();
    let mut character = Character::new(small_avatar(), clip_set(), &config);

    character.force_state(CharacterState::Walking);
    for _ in 0..2000 {
        character.step(1.0 / 60.0);
        let stats = character.debug_stats();
        // The wander rectangle is strictly smaller than the frustum; a
        // loose screen-space cap is enough to catch a runaway.
        assert!(stats.position.x.abs() < 10.0 && stats.position.y.abs() < 10.0);
    }
}
