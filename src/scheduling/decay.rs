//! Floored multiplicative decay schedule.
//!
//! Drives both per-episode annealings: the exploration rate and the learning
//! rate. The value after `n` advances is `initial * rate^n`, clamped to a
//! floor. Advancing happens at episode start, so the first episode already
//! runs at `initial * rate`.

/// Multiplicative decay with a lower bound.
#[derive(Debug, Clone)]
pub struct ExponentialDecay {
    initial: f64,
    rate: f64,
    floor: f64,
    step: usize,
}

impl ExponentialDecay {
    /// Create a schedule starting at `initial`, multiplying by `rate` per
    /// advance, never returning less than `floor`.
    pub fn new(initial: f64, rate: f64, floor: f64) -> Self {
        debug_assert!(
            initial.is_finite() && initial >= 0.0,
            "initial value must be finite and non-negative, got {}",
            initial
        );
        debug_assert!(
            (0.0..=1.0).contains(&rate),
            "decay rate must be in [0, 1], got {}",
            rate
        );
        debug_assert!(
            floor >= 0.0 && floor <= initial,
            "floor must be in [0, initial], got {}",
            floor
        );

        // Sanitize in release builds rather than propagating garbage
        let initial = if initial.is_finite() && initial >= 0.0 {
            initial
        } else {
            0.0
        };
        let rate = rate.clamp(0.0, 1.0);
        let floor = floor.clamp(0.0, initial);

        Self {
            initial,
            rate,
            floor,
            step: 0,
        }
    }

    /// Value after `step` advances, without mutating the schedule.
    pub fn value_at(&self, step: usize) -> f64 {
        let value = self.initial * self.rate.powf(step as f64);
        if value.is_finite() {
            value.max(self.floor)
        } else {
            self.floor
        }
    }

    /// Advance one step and return the new value.
    pub fn advance(&mut self) -> f64 {
        self.step += 1;
        self.value_at(self.step)
    }

    /// Current value at the present step count.
    pub fn current(&self) -> f64 {
        self.value_at(self.step)
    }

    /// Number of advances so far.
    pub fn step(&self) -> usize {
        self.step
    }

    /// Rewind to the initial state.
    pub fn reset(&mut self) {
        self.step = 0;
    }

    /// The configured starting value.
    pub fn initial(&self) -> f64 {
        self.initial
    }

    /// The configured multiplicative rate.
    pub fn rate(&self) -> f64 {
        self.rate
    }

    /// The configured lower bound.
    pub fn floor(&self) -> f64 {
        self.floor
    }
}
