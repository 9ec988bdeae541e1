//! Polled one-shot deadlines with generation counters.
//!
//! There is no callback registry: controllers poll their own deadlines
//! once per frame. Each [`Deadline`] captures the epoch current when it
//! was scheduled; bumping the epoch makes every outstanding deadline a
//! deterministic no-op, which is the cancellation story for superseded
//! transitions and expression fades.

/// A fire-once point on the character clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Deadline {
    pub at: f64,
    pub epoch: u64,
}

/// Issues deadlines and decides whether they still apply.
#[derive(Debug, Default, Clone, Copy)]
pub struct EpochClock {
    epoch: u64,
}

impl EpochClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a deadline under the current epoch.
    #[must_use]
    pub fn schedule(&self, at: f64) -> Deadline {
        Deadline {
            at,
            epoch: self.epoch,
        }
    }

    /// Invalidates every outstanding deadline.
    pub fn bump(&mut self) {
        self.epoch += 1;
    }

    /// True when the deadline is due *and* was not superseded.
    #[must_use]
    pub fn fires(&self, deadline: Deadline, now: f64) -> bool {
        deadline.epoch == self.epoch && now >= deadline.at
    }

    /// True when the deadline was scheduled before the last [`Self::bump`].
    #[must_use]
    pub fn is_stale(&self, deadline: Deadline) -> bool {
        deadline.epoch != self.epoch
    }
}
