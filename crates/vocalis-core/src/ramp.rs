//! Fixed-rate linear ramp.
//!
//! Unlike a time-based smoother, which spreads each new target over a transition
//! time, [`LinearRamp`] moves by at most a constant `step` per update and stops
//! exactly on the target. The AGC sets `step = ratio / L`, so a full gain swing
//! completes in one lookahead period, and the ducker uses the same type with
//! separate attack and release steps.

/// Value that approaches a target by at most `step` per update.
///
/// # Example
///
/// ```rust
/// use vocalis_core::LinearRamp;
///
/// let mut gain = LinearRamp::new(0.0, 0.25);
/// assert_eq!(gain.approach(1.0), 0.25);
/// assert_eq!(gain.approach(1.0), 0.5);
/// assert_eq!(gain.approach(0.6), 0.6); // clamped, no overshoot
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRamp {
    current: f32,
    step: f32,
}

impl LinearRamp {
    /// Create a ramp starting at `initial` with the given step size.
    pub fn new(initial: f32, step: f32) -> Self {
        Self {
            current: initial,
            step: step.abs(),
        }
    }

    /// Current value.
    #[inline]
    pub fn get(&self) -> f32 {
        self.current
    }

    /// Maximum change per update.
    #[inline]
    pub fn step(&self) -> f32 {
        self.step
    }

    /// Change the step size.
    pub fn set_step(&mut self, step: f32) {
        self.step = step.abs();
    }

    /// Jump to a value immediately.
    pub fn set_immediate(&mut self, value: f32) {
        self.current = value;
    }

    /// Move toward `target` by at most one step and return the new value.
    #[inline]
    pub fn approach(&mut self, target: f32) -> f32 {
        self.approach_with(target, self.step, self.step)
    }

    /// Move toward `target` with separate upward and downward steps.
    #[inline]
    pub fn approach_with(&mut self, target: f32, up: f32, down: f32) -> f32 {
        if self.current < target {
            self.current = (self.current + up).min(target);
        } else if self.current > target {
            self.current = (self.current - down).max(target);
        }
        self.current
    }
}

impl Default for LinearRamp {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}
