//! Retargeting Tests
//!
//! Tests for:
//! - BoneMap resolution against the avatar's humanoid table
//! - Track renaming and the track-count invariant
//! - Hip yaw correction and its involution
//! - Idempotence of re-retargeting
//! - Degenerate clips and the compatibility report

use glam::Quat;

use hitogata::animation::clip::{AnimationClip, TargetPath, Track, TrackData, TrackTarget};
use hitogata::animation::tracks::{InterpolationMode, KeyframeTrack};
use hitogata::retarget::bones::{BoneMap, BoneMapCache, MIXAMO_HIPS};
use hitogata::retarget::retargeter::{hips_yaw_correction, retarget, RETARGET_SUFFIX};
use hitogata::retarget::validator::{validate_clip, AuxBoneClassifier};
use hitogata::vrm::model::Avatar;

const EPSILON: f32 = 1e-5;

fn quat_approx(a: Quat, b: Quat) -> bool {
    a.dot(b).abs() > 1.0 - EPSILON
}

/// A minimal avatar whose humanoid table exposes hips, spine and head,
/// with scene node names distinct from the bone names.
fn small_avatar() -> Avatar {
    let mut avatar = Avatar::empty("mini");
    let hips = avatar.add_node("J_Bip_C_Hips", None);
    let spine = avatar.add_node("J_Bip_C_Spine", Some(hips));
    let head = avatar.add_node("J_Bip_C_Head", Some(spine));
    avatar.assign_humanoid("hips", hips);
    avatar.assign_humanoid("spine", spine);
    avatar.assign_humanoid("head", head);
    avatar
}

fn rotation_track(node: &str, values: Vec<Quat>) -> Track {
    let times = (0..values.len()).map(|i| i as f32).collect();
    Track {
        target: TrackTarget {
            node_name: node.to_string(),
            path: TargetPath::Rotation,
        },
        data: TrackData::Quaternion(KeyframeTrack::new(times, values, InterpolationMode::Linear)),
    }
}

fn quat_values(track: &Track) -> Vec<Quat> {
    match &track.data {
        TrackData::Quaternion(t) => t.values.clone(),
        TrackData::Vector3(_) => panic!("expected a quaternion track"),
    }
}

// ============================================================================
// BoneMap
// ============================================================================

#[test]
fn bone_map_targets_only_real_nodes() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);

    assert_eq!(bones.len(), 3);
    for name in bones.node_names() {
        assert!(avatar.node_by_name(name).is_some(), "unknown node {name}");
    }
}

#[test]
fn bone_map_resolves_canonical_joints() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);

    assert_eq!(bones.resolve("mixamorig:Hips"), Some("J_Bip_C_Hips"));
    assert_eq!(bones.resolve("mixamorig:Spine"), Some("J_Bip_C_Spine"));
    assert_eq!(bones.resolve("mixamorig:Head"), Some("J_Bip_C_Head"));
    // The model has no arms; those joints are untranslatable, not errors.
    assert_eq!(bones.resolve("mixamorig:LeftArm"), None);
}

#[test]
fn bone_map_cache_rebuilds_per_avatar() {
    let a = small_avatar();
    let b = small_avatar();
    let mut cache = BoneMapCache::new();

    assert!(cache.map_for(&a).built_for(&a));
    assert!(cache.map_for(&b).built_for(&b));
    assert!(!cache.map_for(&b).built_for(&a));
}

// ============================================================================
// Retargeting
// ============================================================================

#[test]
fn retarget_renames_and_never_grows() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);

    let clip = AnimationClip::new(
        "walk".to_string(),
        vec![
            rotation_track(MIXAMO_HIPS, vec![Quat::IDENTITY; 2]),
            rotation_track("mixamorig:Spine", vec![Quat::IDENTITY; 2]),
            rotation_track("mixamorig:LeftHandThumb4", vec![Quat::IDENTITY; 2]),
        ],
    );

    let out = retarget(&clip, &bones);
    assert!(out.tracks.len() <= clip.tracks.len());
    assert_eq!(out.tracks.len(), 2);
    assert_eq!(out.tracks[0].target.node_name, "J_Bip_C_Hips");
    assert_eq!(out.tracks[1].target.node_name, "J_Bip_C_Spine");
    assert_eq!(out.name, format!("walk{RETARGET_SUFFIX}"));
}

#[test]
fn retarget_preserves_duration_of_degenerate_clip() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);

    let clip = AnimationClip::new(
        "aux_only".to_string(),
        vec![rotation_track("mixamorig:LeftHandThumb4", vec![Quat::IDENTITY; 3])],
    );

    let out = retarget(&clip, &bones);
    assert!(out.tracks.is_empty());
    assert!((out.duration - clip.duration).abs() < EPSILON);
}

#[test]
fn hips_rotation_gets_yaw_flip() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);

    let q = Quat::from_rotation_x(0.3);
    let clip = AnimationClip::new(
        "walk".to_string(),
        vec![rotation_track(MIXAMO_HIPS, vec![q, q])],
    );

    let out = retarget(&clip, &bones);
    let expected = hips_yaw_correction() * q;
    for v in quat_values(&out.tracks[0]) {
        assert!(quat_approx(v, expected));
    }
}

#[test]
fn non_hips_rotations_pass_unchanged() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);

    let q = Quat::from_rotation_z(0.7);
    let clip = AnimationClip::new(
        "walk".to_string(),
        vec![rotation_track("mixamorig:Spine", vec![q])],
    );

    let out = retarget(&clip, &bones);
    assert!(quat_approx(quat_values(&out.tracks[0])[0], q));
}

#[test]
fn yaw_correction_is_its_own_inverse() {
    let c = hips_yaw_correction();
    let q = Quat::from_rotation_x(0.4) * Quat::from_rotation_y(0.2);
    assert!(quat_approx(c * (c * q), q));
}

#[test]
fn retarget_is_idempotent() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);

    let q = Quat::from_rotation_x(0.3);
    let clip = AnimationClip::new(
        "walk".to_string(),
        vec![
            rotation_track(MIXAMO_HIPS, vec![q]),
            rotation_track("mixamorig:Spine", vec![q]),
        ],
    );

    let once = retarget(&clip, &bones);
    let twice = retarget(&once, &bones);

    assert_eq!(twice.name, once.name);
    assert_eq!(twice.tracks.len(), once.tracks.len());
    for (a, b) in once.tracks.iter().zip(&twice.tracks) {
        assert_eq!(a.target.node_name, b.target.node_name);
        let (va, vb) = (quat_values(a), quat_values(b));
        assert_eq!(va.len(), vb.len());
        for (qa, qb) in va.iter().zip(&vb) {
            assert!(quat_approx(*qa, *qb), "double retarget altered keys");
        }
    }
}

// ============================================================================
// Compatibility report
// ============================================================================

#[test]
fn report_classifies_valid_aux_and_invalid() {
    let avatar = small_avatar();
    let classifier = AuxBoneClassifier::default();

    let clip = AnimationClip::new(
        "mixed".to_string(),
        vec![
            rotation_track("J_Bip_C_Hips", vec![Quat::IDENTITY]),
            rotation_track("hips", vec![Quat::IDENTITY]),
            rotation_track("J_Sec_Hair1", vec![Quat::IDENTITY]),
            rotation_track("Skirt_L_01", vec![Quat::IDENTITY]),
            rotation_track("totally_unknown", vec![Quat::IDENTITY]),
        ],
    );

    let report = validate_clip(&clip, &avatar, &classifier);
    assert_eq!(report.valid, 2);
    assert_eq!(report.ignored, 2);
    assert_eq!(report.invalid, 1);
    assert!((report.ratio() - 2.0 / 3.0).abs() < EPSILON);
}

#[test]
fn fully_mapped_clip_scores_clean_only_after_retarget() {
    let avatar = small_avatar();
    let bones = BoneMap::for_avatar(&avatar);
    let classifier = AuxBoneClassifier::default();

    let clip = AnimationClip::new(
        "walk".to_string(),
        vec![
            rotation_track("mixamorig:Hips", vec![Quat::IDENTITY]),
            rotation_track("mixamorig:Spine", vec![Quat::IDENTITY]),
        ],
    );

    // Source-skeleton names never resolve on the avatar; validation is
    // only meaningful against the retargeted output.
    let raw = validate_clip(&clip, &avatar, &classifier);
    assert_eq!(raw.valid, 0);
    assert_eq!(raw.invalid, 2);

    let report = validate_clip(&retarget(&clip, &bones), &avatar, &classifier);
    assert_eq!(report.valid, 2);
    assert_eq!(report.invalid, 0);
    assert!((report.ratio() - 1.0).abs() < EPSILON);
}

#[test]
fn report_ratio_of_empty_clip_is_zero() {
    let avatar = small_avatar();
    let classifier = AuxBoneClassifier::default();
    let clip = AnimationClip::new("empty".to_string(), Vec::new());

    let report = validate_clip(&clip, &avatar, &classifier);
    let ratio = report.ratio();
    assert!(ratio.is_finite());
    assert!(ratio.abs() < EPSILON);
}
