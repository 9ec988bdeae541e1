use std::f32::consts::PI;

use glam::Vec2;
use rand::RngExt;

/// A destination is considered reached within this distance, world units.
pub const ARRIVAL_EPSILON: f32 = 0.1;

/// The floor-level rectangle (x across, z toward/away from camera) the
/// character may wander in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WanderBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl WanderBounds {
    /// Derives the rectangle from the camera frustum at the avatar's
    /// distance, shrunk by a safety margin so the avatar never leaves the
    /// visible frame: full frustum width across, and half the frustum
    /// height of depth centered on the avatar's rest spot.
    #[must_use]
    pub fn from_camera(fov_y: f32, aspect: f32, camera_distance: f32, margin: f32) -> Self {
        let half_h = (fov_y * 0.5).tan() * camera_distance;
        let half_w = half_h * aspect;

        let x = (half_w - margin).max(0.1);
        let z = ((half_h - margin) * 0.5).max(0.1);

        Self {
            min: Vec2::new(-x, -z),
            max: Vec2::new(x, z),
        }
    }

    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    #[must_use]
    pub fn clamp(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min, self.max)
    }

    /// Uniform random point inside the rectangle.
    pub fn sample(&self, rng: &mut impl RngExt) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
        )
    }
}

/// The current travel goal: destination, unit direction, and the yaw the
/// avatar should face while traveling.
#[derive(Debug, Clone, Copy)]
pub struct MotionTarget {
    pub destination: Vec2,
    pub direction: Vec2,
    pub facing: f32,
}

/// Moves the avatar toward randomly chosen destinations at constant speed,
/// rotating to face the travel direction.
#[derive(Debug)]
pub struct MotionController {
    bounds: WanderBounds,
    move_speed: f32,
    rotation_speed: f32,
    target: Option<MotionTarget>,
}

impl MotionController {
    #[must_use]
    pub fn new(bounds: WanderBounds, move_speed: f32, rotation_speed: f32) -> Self {
        Self {
            bounds,
            move_speed,
            rotation_speed,
            target: None,
        }
    }

    #[must_use]
    pub fn bounds(&self) -> WanderBounds {
        self.bounds
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.target.is_some()
    }

    #[must_use]
    pub fn target(&self) -> Option<&MotionTarget> {
        self.target.as_ref()
    }

    /// Picks a fresh random destination and starts traveling from `from`.
    /// Facing is `atan2(dx, dz)`: +Z is the avatar's forward.
    pub fn start_moving(&mut self, from: Vec2, rng: &mut impl RngExt) {
        let destination = self.bounds.sample(rng);
        let delta = destination - from;
        let direction = delta.normalize_or_zero();
        let facing = direction.x.atan2(direction.y);

        log::debug!(
            "wander: ({:.2}, {:.2}) -> ({:.2}, {:.2})",
            from.x,
            from.y,
            destination.x,
            destination.y
        );

        self.target = Some(MotionTarget {
            destination,
            direction,
            facing,
        });
    }

    pub fn stop(&mut self) {
        self.target = None;
    }

    /// Advances `position`/`heading` by one frame. Movement is scaled by
    /// `dt` (frame-rate independent) and clamped back inside the bounds as
    /// an overshoot safety net; heading turns along the shortest angular
    /// path. Returns true on arrival, at which point the target is cleared
    /// and control passes back to the state machine.
    pub fn update(&mut self, dt: f32, position: &mut Vec2, heading: &mut f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        *position += target.direction * self.move_speed * dt;
        *position = self.bounds.clamp(*position);

        let diff = shortest_angle(*heading, target.facing);
        let max_step = self.rotation_speed * dt;
        *heading += diff.clamp(-max_step, max_step);

        if position.distance(target.destination) < ARRIVAL_EPSILON {
            self.target = None;
            return true;
        }
        false
    }
}

/// Signed smallest rotation from `from` to `to`, in `[-PI, PI]`.
#[must_use]
pub fn shortest_angle(from: f32, to: f32) -> f32 {
    let mut diff = (to - from) % (2.0 * PI);
    if diff > PI {
        diff -= 2.0 * PI;
    } else if diff < -PI {
        diff += 2.0 * PI;
    }
    diff
}
