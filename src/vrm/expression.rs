use rand::RngExt;

/// A catalog entry: expression name with its default weight and hold time.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionPreset {
    pub name: &'static str,
    pub weight: f32,
    pub duration: f32,
}

/// The fixed facial expression catalog.
pub const EXPRESSION_CATALOG: [ExpressionPreset; 5] = [
    ExpressionPreset { name: "happy", weight: 0.9, duration: 2.5 },
    ExpressionPreset { name: "angry", weight: 0.7, duration: 2.0 },
    ExpressionPreset { name: "sad", weight: 0.7, duration: 2.5 },
    ExpressionPreset { name: "relaxed", weight: 0.8, duration: 3.0 },
    ExpressionPreset { name: "surprised", weight: 0.9, duration: 1.5 },
];

/// Blendshape driven by the blink cycle.
pub const BLINK_EXPRESSION: &str = "blink";

/// How long the eyes stay closed per blink.
const BLINK_CLOSED_SECS: f64 = 0.15;
/// Randomized pause between blinks.
const BLINK_INTERVAL_SECS: std::ops::Range<f64> = 2.0..5.0;
/// Randomized pause between spontaneous expressions.
const EXPRESSION_INTERVAL_SECS: std::ops::Range<f64> = 4.0..9.0;
/// An expired expression fades to zero over this many discrete steps.
const FADE_STEPS: u32 = 5;
const FADE_STEP_SECS: f64 = 0.06;

#[derive(Debug, Clone)]
struct ActiveExpression {
    name: String,
    weight: f32,
    /// Weight removed per fade step once the hold time expires.
    step_size: f32,
    hold_until: f64,
    next_step_at: f64,
    steps_left: u32,
    epoch: u64,
}

/// Drives blendshape weights: a small catalog of ad-hoc expressions with
/// stepped fade-out, plus an independent periodic blink cycle.
///
/// All timing is polled: [`ExpressionController::update`] is called once
/// per frame (only while the character idles) with the current clock.
/// Every pending fade carries the epoch current when it was scheduled;
/// [`ExpressionController::clear`] bumps the epoch, so a stale fade
/// observed later is a deterministic no-op. The blink flag is cleared
/// directly, there is nothing scheduled to cancel.
pub struct ExpressionController {
    active: Vec<ActiveExpression>,
    epoch: u64,

    blinking: bool,
    blink_open_at: f64,
    next_blink_at: f64,

    next_expression_at: f64,
}

impl Default for ExpressionController {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpressionController {
    #[must_use]
    pub fn new() -> Self {
        Self {
            active: Vec::new(),
            epoch: 0,
            blinking: false,
            blink_open_at: 0.0,
            next_blink_at: 0.0,
            next_expression_at: 0.0,
        }
    }

    /// Applies `weight` to expression `name` for `duration` seconds, after
    /// which it fades to zero in discrete steps. Replaying an already
    /// active expression restarts its hold window.
    pub fn play(&mut self, name: &str, weight: f32, duration: f32, now: f64) {
        self.active.retain(|e| e.name != name);
        self.active.push(ActiveExpression {
            name: name.to_string(),
            weight: weight.clamp(0.0, 1.0),
            step_size: weight.clamp(0.0, 1.0) / FADE_STEPS as f32,
            hold_until: now + f64::from(duration),
            next_step_at: now + f64::from(duration),
            steps_left: FADE_STEPS,
            epoch: self.epoch,
        });
    }

    /// Picks uniformly from the catalog and plays it.
    pub fn play_random(&mut self, rng: &mut impl RngExt, now: f64) {
        let preset = EXPRESSION_CATALOG[rng.random_range(0..EXPRESSION_CATALOG.len())];
        log::debug!("expression: {}", preset.name);
        self.play(preset.name, preset.weight, preset.duration, now);
    }

    /// Drops all active expressions and invalidates every outstanding
    /// fade/blink deadline. Idempotent.
    pub fn clear(&mut self) {
        self.epoch += 1;
        self.active.clear();
        self.blinking = false;
    }

    /// Advances fades, the blink cycle, and the spontaneous expression
    /// timer. Called once per frame while idle.
    pub fn update(&mut self, now: f64, rng: &mut impl RngExt) {
        self.update_fades(now);
        self.update_blink(now, rng);

        if now >= self.next_expression_at {
            if self.next_expression_at > 0.0 {
                self.play_random(rng, now);
            }
            self.next_expression_at = now + rng.random_range(EXPRESSION_INTERVAL_SECS);
        }
    }

    fn update_fades(&mut self, now: f64) {
        let epoch = self.epoch;
        for entry in &mut self.active {
            if entry.epoch != epoch {
                // Superseded by clear(); fully fade so retain drops it.
                entry.weight = 0.0;
                entry.steps_left = 0;
                continue;
            }
            if now < entry.hold_until {
                continue;
            }
            while entry.steps_left > 0 && now >= entry.next_step_at {
                entry.weight = (entry.weight - entry.step_size).max(0.0);
                entry.steps_left -= 1;
                entry.next_step_at += FADE_STEP_SECS;
            }
            if entry.steps_left == 0 {
                // The stepped subtraction can leave an f32 residue; the
                // last step means fully faded.
                entry.weight = 0.0;
            }
        }
        self.active.retain(|e| e.steps_left > 0 || e.weight > 0.0);
    }

    fn update_blink(&mut self, now: f64, rng: &mut impl RngExt) {
        if self.blinking {
            if now >= self.blink_open_at {
                self.blinking = false;
                self.next_blink_at = now + rng.random_range(BLINK_INTERVAL_SECS);
            }
        } else if now >= self.next_blink_at {
            if self.next_blink_at > 0.0 {
                self.blinking = true;
                self.blink_open_at = now + BLINK_CLOSED_SECS;
            } else {
                // First update: schedule, don't blink at t=0.
                self.next_blink_at = now + rng.random_range(BLINK_INTERVAL_SECS);
            }
        }
    }

    #[must_use]
    pub fn is_blinking(&self) -> bool {
        self.blinking
    }

    /// Current (name, weight) pairs, including the blink channel while the
    /// eyes are closed.
    pub fn weights(&self) -> impl Iterator<Item = (&str, f32)> {
        self.active
            .iter()
            .map(|e| (e.name.as_str(), e.weight))
            .chain(self.blinking.then_some((BLINK_EXPRESSION, 1.0)))
    }

    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
