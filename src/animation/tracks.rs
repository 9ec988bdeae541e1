use crate::animation::values::Interpolatable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    Step,
    CubicSpline,
}

/// How far a cursor-accelerated lookup scans linearly before falling back
/// to binary search.
const MAX_SCAN_OFFSET: usize = 3;

/// Remembers the keyframe segment a previous sample landed in, so steady
/// forward playback resolves the next sample in O(1).
#[derive(Debug, Clone, Default)]
pub struct KeyframeCursor {
    pub last_index: usize,
}

/// One animated channel: sorted key times plus values.
///
/// For [`InterpolationMode::CubicSpline`] the values array holds
/// `in_tangent, value, out_tangent` triplets, so its length is
/// `times.len() * 3`.
#[derive(Debug, Clone)]
pub struct KeyframeTrack<T: Interpolatable> {
    pub times: Vec<f32>,
    pub values: Vec<T>,
    pub interpolation: InterpolationMode,
}

impl<T: Interpolatable> KeyframeTrack<T> {
    #[must_use]
    pub fn new(times: Vec<f32>, values: Vec<T>, interpolation: InterpolationMode) -> Self {
        Self {
            times,
            values,
            interpolation,
        }
    }

    #[must_use]
    pub fn key_count(&self) -> usize {
        self.times.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    /// Time of the last keyframe, 0.0 for an empty track.
    #[must_use]
    pub fn last_time(&self) -> f32 {
        self.times.last().copied().unwrap_or(0.0)
    }

    /// Samples by binary search. Out-of-range times clamp to the first or
    /// last key; an empty track yields `T::default()`.
    #[must_use]
    pub fn sample(&self, time: f32) -> T {
        if self.times.is_empty() {
            return T::default();
        }
        let next_idx = self.times.partition_point(|&t| t <= time);
        let index = next_idx.saturating_sub(1);
        self.eval_segment(index, time)
    }

    /// Samples with a cursor: tries a short linear scan around the segment
    /// the cursor last landed in, falling back to binary search on a large
    /// jump (scrubbing, loop reset).
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> T {
        let len = self.times.len();
        if len == 0 {
            return T::default();
        }
        if len == 1 {
            return self.value_at(0);
        }

        // A cursor from another clip may be out of bounds.
        let start = cursor.last_index.min(len - 1);
        let index = match self.scan_from(start, time) {
            Some(idx) => idx,
            None => {
                let next_idx = self.times.partition_point(|&t| t <= time);
                next_idx.saturating_sub(1)
            }
        };

        cursor.last_index = index;
        self.eval_segment(index, time)
    }

    /// Linear scan up to [`MAX_SCAN_OFFSET`] segments in the playback
    /// direction. Returns the segment index whose interval contains `time`.
    fn scan_from(&self, start: usize, time: f32) -> Option<usize> {
        let len = self.times.len();
        if time >= self.times[start] {
            for offset in 0..=MAX_SCAN_OFFSET {
                let idx = start + offset;
                if idx >= len - 1 {
                    return (time >= self.times[len - 1]).then_some(len - 1);
                }
                if time < self.times[idx + 1] {
                    return Some(idx);
                }
            }
        } else {
            for offset in 1..=MAX_SCAN_OFFSET {
                if start < offset {
                    return (time <= self.times[0]).then_some(0);
                }
                let idx = start - offset;
                if time >= self.times[idx] {
                    return Some(idx);
                }
            }
        }
        None
    }

    /// Value of key `index`, accounting for cubic-spline triplet layout.
    fn value_at(&self, index: usize) -> T {
        match self.interpolation {
            InterpolationMode::CubicSpline => self.values[index * 3 + 1],
            _ => self.values[index],
        }
    }

    fn eval_segment(&self, index: usize, time: f32) -> T {
        let len = self.times.len();
        if index >= len - 1 {
            return self.value_at(len - 1);
        }

        let next_idx = index + 1;
        let t0 = self.times[index];
        let t1 = self.times[next_idx];
        let dt = t1 - t0;
        let t = if dt > 1e-6 { (time - t0) / dt } else { 0.0 };
        let t = t.clamp(0.0, 1.0);

        match self.interpolation {
            InterpolationMode::Step => self.value_at(index),
            InterpolationMode::Linear => {
                T::interpolate_linear(self.value_at(index), self.value_at(next_idx), t)
            }
            InterpolationMode::CubicSpline => {
                let i0 = index * 3;
                let i1 = next_idx * 3;
                T::interpolate_cubic(
                    self.values[i0 + 1],
                    self.values[i0 + 2],
                    self.values[i1],
                    self.values[i1 + 1],
                    t,
                    dt,
                )
            }
        }
    }
}
