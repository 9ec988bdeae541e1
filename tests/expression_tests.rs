//! Expression Controller Tests
//!
//! Tests for:
//! - Manual play and the hold window
//! - Stepped fade-out to zero and removal
//! - Blink cycle timing
//! - clear() cancelling everything in flight

use rand::rngs::StdRng;
use rand::SeedableRng;

use hitogata::vrm::expression::{ExpressionController, EXPRESSION_CATALOG};

const EPSILON: f32 = 1e-5;

fn weight_of(ctrl: &ExpressionController, name: &str) -> Option<f32> {
    ctrl.weights().find(|(n, _)| *n == name).map(|(_, w)| w)
}

// ============================================================================
// Catalog
// ============================================================================

#[test]
fn catalog_weights_and_durations_are_sane() {
    assert_eq!(EXPRESSION_CATALOG.len(), 5);
    for preset in EXPRESSION_CATALOG {
        assert!(preset.weight > 0.0 && preset.weight <= 1.0);
        assert!(preset.duration > 0.0);
    }
}

#[test]
fn play_random_picks_from_catalog() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(3);

    ctrl.play_random(&mut rng, 0.0);
    assert_eq!(ctrl.active_count(), 1);
    let (name, _) = ctrl.weights().next().unwrap();
    assert!(EXPRESSION_CATALOG.iter().any(|p| p.name == name));
}

// ============================================================================
// Hold and stepped fade
// ============================================================================

#[test]
fn weight_holds_until_duration_expires() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(1);

    ctrl.play("happy", 0.8, 2.0, 0.0);
    ctrl.update(1.9, &mut rng);
    assert!((weight_of(&ctrl, "happy").unwrap() - 0.8).abs() < EPSILON);
}

#[test]
fn fade_steps_down_then_removes() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(1);

    ctrl.play("happy", 1.0, 1.0, 0.0);

    // One step past the hold window: 1.0 - 1/5.
    ctrl.update(1.0, &mut rng);
    let w = weight_of(&ctrl, "happy").unwrap();
    assert!((w - 0.8).abs() < EPSILON, "expected 0.8, got {w}");

    // All five steps done: expression fully faded and dropped.
    ctrl.update(1.0 + 5.0 * 0.06, &mut rng);
    assert_eq!(ctrl.active_count(), 0);
    assert!(weight_of(&ctrl, "happy").is_none());
}

#[test]
fn replay_restarts_hold_window() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(1);

    ctrl.play("sad", 0.7, 1.0, 0.0);
    ctrl.play("sad", 0.7, 1.0, 0.9);
    assert_eq!(ctrl.active_count(), 1);

    // Past the first hold window but inside the restarted one.
    ctrl.update(1.5, &mut rng);
    assert!((weight_of(&ctrl, "sad").unwrap() - 0.7).abs() < EPSILON);
}

#[test]
fn overweight_input_is_clamped() {
    let mut ctrl = ExpressionController::new();
    ctrl.play("happy", 2.5, 1.0, 0.0);
    assert!((weight_of(&ctrl, "happy").unwrap() - 1.0).abs() < EPSILON);
}

// ============================================================================
// Blink cycle
// ============================================================================

#[test]
fn no_blink_at_startup() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(9);
    ctrl.update(0.0, &mut rng);
    assert!(!ctrl.is_blinking());
}

#[test]
fn blink_happens_within_interval_and_reopens() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(9);

    // Drive with a fine-grained clock; the first blink must land in the
    // scheduled 2..5s window and last about 150ms.
    let mut blink_started = None;
    let mut t = 0.0;
    while t < 6.0 {
        ctrl.update(t, &mut rng);
        if ctrl.is_blinking() && blink_started.is_none() {
            blink_started = Some(t);
        }
        t += 0.01;
    }

    let started = blink_started.expect("never blinked in six seconds");
    assert!(started >= 2.0 && started <= 5.1, "blink at {started}");

    // Eyes open again well after the closed window.
    ctrl.update(started + 0.5, &mut rng);
    assert!(!ctrl.is_blinking());
}

#[test]
fn blink_weight_appears_while_closed() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(9);

    let mut t = 0.0;
    while t < 6.0 && !ctrl.is_blinking() {
        ctrl.update(t, &mut rng);
        t += 0.01;
    }
    assert!(ctrl.is_blinking());
    assert!((weight_of(&ctrl, "blink").unwrap() - 1.0).abs() < EPSILON);
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn clear_drops_active_expressions_immediately() {
    let mut ctrl = ExpressionController::new();
    ctrl.play("happy", 0.9, 5.0, 0.0);
    ctrl.play("sad", 0.7, 5.0, 0.0);
    assert_eq!(ctrl.active_count(), 2);

    ctrl.clear();
    assert_eq!(ctrl.active_count(), 0);
    assert_eq!(ctrl.weights().count(), 0);
}

#[test]
fn clear_cancels_midfade() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(1);

    ctrl.play("happy", 1.0, 1.0, 0.0);
    ctrl.update(1.05, &mut rng); // partway through the stepped fade
    assert!(ctrl.active_count() > 0);

    ctrl.clear();
    // A later update must not resurrect the fade.
    ctrl.update(1.2, &mut rng);
    assert!(weight_of(&ctrl, "happy").is_none());
}

#[test]
fn clear_stops_a_blink_in_progress() {
    let mut ctrl = ExpressionController::new();
    let mut rng = StdRng::seed_from_u64(9);

    let mut t = 0.0;
    while t < 6.0 && !ctrl.is_blinking() {
        ctrl.update(t, &mut rng);
        t += 0.01;
    }
    assert!(ctrl.is_blinking());

    ctrl.clear();
    assert!(!ctrl.is_blinking());
}
