//! Round-robin peak tracker.
//!
//! A single decaying peak detector trades accuracy against latency: a fast
//! release pumps, a slow one lags. The round-robin tracker avoids the trade by
//! keeping four peak-hold slots whose resets are staggered across a cycle of two
//! lookahead lengths:
//!
//! ```text
//! cycle = 2L
//! slot:    0      1       2       3
//! reset:   0    cycle/4 cycle/2 3cycle/4
//! ```
//!
//! Each update zeroes the slot(s) whose reset point is due, raises every slot to
//! the new magnitude and reports the maximum. At most two resets fall inside any
//! window of `L` samples, so a peak stays visible for at least `L` samples and is
//! forgotten within `2L`. Because the other slots still hold their peaks, a reset
//! never drops the reported level to zero.
//!
//! Several trackers share one [`ResetSchedule`] so their windows stay time aligned.

/// Reset points of a 4-slot tracker, derived from the lookahead length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetSchedule {
    cycle: u64,
    points: [u64; 4],
}

impl ResetSchedule {
    /// Build the schedule for a lookahead of `buffer_len` samples.
    pub fn new(buffer_len: usize) -> Self {
        let cycle = 2 * buffer_len.max(1) as u64;
        Self {
            cycle,
            points: [0, cycle / 4, cycle * 2 / 4, cycle * 3 / 4],
        }
    }

    /// Cycle length in samples (`2L`).
    #[inline]
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Reset offset of each slot within the cycle.
    #[inline]
    pub fn points(&self) -> [u64; 4] {
        self.points
    }

    /// Position of `cursor` within the cycle.
    #[inline]
    pub fn phase(&self, cursor: u64) -> u64 {
        cursor % self.cycle
    }

    /// Which slots reach their reset point at a cursor in `(since, now]`.
    ///
    /// With one update per sample (`since == now - 1`) this is exactly the slot
    /// whose offset equals `phase(now)`. Coarser update cadences still reset
    /// every slot whose point was passed in between; a gap of a whole cycle or
    /// more resets all four.
    #[inline]
    pub fn due(&self, since: u64, now: u64) -> [bool; 4] {
        if now <= since {
            return [false; 4];
        }
        if now - since >= self.cycle {
            return [true; 4];
        }
        let phase = self.phase(now);
        let mut due = [false; 4];
        for (flag, &point) in due.iter_mut().zip(self.points.iter()) {
            // distance back from `now` to the most recent occurrence of `point`
            let back = (phase + self.cycle - point) % self.cycle;
            *flag = back <= now && now - back > since;
        }
        due
    }
}

/// Four staggered peak-hold slots.
///
/// # Example
///
/// ```rust
/// use vocalis_core::{ResetSchedule, RoundRobinPeak};
///
/// let schedule = ResetSchedule::new(4);
/// let mut rr = RoundRobinPeak::default();
/// let mut cursor = 4;
/// assert_eq!(rr.process(schedule.due(cursor - 1, cursor), -0.8), 0.8);
/// for _ in 0..3 {
///     cursor += 1;
///     // the peak survives the next resets
///     assert_eq!(rr.process(schedule.due(cursor - 1, cursor), 0.1), 0.8);
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoundRobinPeak {
    slots: [f32; 4],
}

impl RoundRobinPeak {
    /// Apply due resets, fold in `|x|` and return the level estimate.
    #[inline]
    pub fn process(&mut self, due: [bool; 4], x: f32) -> f32 {
        let mag = x.abs();
        let mut level = 0.0f32;
        for (slot, reset) in self.slots.iter_mut().zip(due) {
            if reset {
                *slot = 0.0;
            }
            if mag > *slot {
                *slot = mag;
            }
            level = level.max(*slot);
        }
        level
    }

    /// Current level estimate without updating.
    #[inline]
    pub fn level(&self) -> f32 {
        self.slots.iter().fold(0.0f32, |acc, &s| acc.max(s))
    }

    /// Raw slot contents.
    pub fn slots(&self) -> [f32; 4] {
        self.slots
    }

    /// Clear every slot.
    pub fn reset(&mut self) {
        self.slots = [0.0; 4];
    }
}
