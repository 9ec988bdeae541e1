use rand::RngExt;
use smallvec::SmallVec;

/// The two behavioral states of the character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharacterState {
    Idle,
    Walking,
}

impl CharacterState {
    #[must_use]
    pub fn flipped(self) -> Self {
        match self {
            CharacterState::Idle => CharacterState::Walking,
            CharacterState::Walking => CharacterState::Idle,
        }
    }
}

/// Minimum dwell per state, seconds.
#[derive(Debug, Clone, Copy)]
pub struct StateTimings {
    pub idle_dwell: f64,
    pub walk_dwell: f64,
}

impl Default for StateTimings {
    fn default() -> Self {
        Self {
            idle_dwell: 5.0,
            walk_dwell: 4.0,
        }
    }
}

/// Idle ↔ walking coordinator.
///
/// A transition request is rejected while the current state's minimum
/// dwell has not elapsed, and a same-state request is always a no-op; the
/// forced variant bypasses the dwell guard only. Absent external requests,
/// [`CharacterStateMachine::auto_update`] ping-pongs between the two
/// states once dwell elapses, deliberately through the same non-forced
/// guard, so automatic and external transitions obey identical rules.
///
/// The machine only decides; entry actions (clip cross-fades, motion
/// start/stop) are driven by [`crate::Character`] from the returned
/// transitions.
#[derive(Debug)]
pub struct CharacterStateMachine {
    state: CharacterState,
    entered_at: f64,
    timings: StateTimings,
}

impl CharacterStateMachine {
    #[must_use]
    pub fn new(timings: StateTimings, now: f64) -> Self {
        Self {
            state: CharacterState::Idle,
            entered_at: now,
            timings,
        }
    }

    #[must_use]
    pub fn state(&self) -> CharacterState {
        self.state
    }

    #[must_use]
    pub fn time_in_state(&self, now: f64) -> f64 {
        now - self.entered_at
    }

    #[must_use]
    pub fn dwell_elapsed(&self, now: f64) -> bool {
        self.time_in_state(now) >= self.dwell(self.state)
    }

    fn dwell(&self, state: CharacterState) -> f64 {
        match state {
            CharacterState::Idle => self.timings.idle_dwell,
            CharacterState::Walking => self.timings.walk_dwell,
        }
    }

    /// Requests a transition. Returns whether it was accepted; a rejected
    /// request leaves state and timestamp untouched.
    pub fn request(&mut self, target: CharacterState, now: f64) -> bool {
        if target == self.state {
            return false;
        }
        if !self.dwell_elapsed(now) {
            log::debug!(
                "state change to {target:?} rejected: {:.2}s into {:?} (dwell {:.2}s)",
                self.time_in_state(now),
                self.state,
                self.dwell(self.state)
            );
            return false;
        }
        self.enter(target, now);
        true
    }

    /// Like [`Self::request`] but ignores the dwell guard. A same-state
    /// force re-enters the state (restarting its timestamp and entry
    /// action).
    pub fn force(&mut self, target: CharacterState, now: f64) -> bool {
        self.enter(target, now);
        true
    }

    /// The autonomous driver: once dwell has elapsed, flips to the other
    /// state. Returns the newly entered state when a flip happened.
    pub fn auto_update(&mut self, now: f64) -> Option<CharacterState> {
        let target = self.state.flipped();
        self.request(target, now).then_some(target)
    }

    fn enter(&mut self, target: CharacterState, now: f64) {
        log::debug!("state: {:?} -> {target:?}", self.state);
        self.state = target;
        self.entered_at = now;
    }
}

/// Picks idle clip indices, avoiding the last couple of picks so the same
/// animation does not repeat back-to-back.
#[derive(Debug, Default)]
pub struct IdlePicker {
    recent: SmallVec<[usize; 2]>,
}

impl IdlePicker {
    /// Exclusion window: how many previous picks are off-limits.
    const WINDOW: usize = 2;

    /// Uniform pick from `0..count` excluding recent picks where the pool
    /// allows it. Returns `None` for an empty pool.
    pub fn pick(&mut self, rng: &mut impl RngExt, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }

        // The window never excludes the whole pool.
        let window = Self::WINDOW.min(count - 1);
        while self.recent.len() > window {
            self.recent.remove(0);
        }

        let choice = loop {
            let candidate = rng.random_range(0..count);
            if !self.recent.contains(&candidate) {
                break candidate;
            }
        };

        if window > 0 {
            if self.recent.len() == window {
                self.recent.remove(0);
            }
            self.recent.push(choice);
        }
        Some(choice)
    }
}
