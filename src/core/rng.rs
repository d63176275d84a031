//! Seedable PRNG for exploration noise.
//!
//! XorShift64 generator with a Box-Muller transform for Gaussian samples.
//! Deterministic under a fixed seed and nowhere near cryptographic.

/// XorShift64 pseudo-random number generator.
#[derive(Clone, Debug)]
pub struct XorShiftRng {
    state: u64,
}

impl XorShiftRng {
    /// Create with a specific seed.
    #[inline]
    pub fn new(seed: u64) -> Self {
        // XorShift state must be non-zero
        let state = if seed == 0 { 0xDEADBEEF } else { seed };
        Self { state }
    }

    /// Generate the next random u64.
    #[inline(always)]
    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Generate a uniform f32 in [0, 1).
    #[inline(always)]
    pub fn next_f32(&mut self) -> f32 {
        // Use the top 24 bits for the mantissa
        let bits = (self.next_u64() >> 40) as u32;
        bits as f32 * (1.0 / (1u32 << 24) as f32)
    }

    /// Generate a uniform f32 in [lo, hi).
    #[inline]
    pub fn next_f32_range(&mut self, lo: f32, hi: f32) -> f32 {
        lo + (hi - lo) * self.next_f32()
    }

    /// Generate a pair of independent N(0, 1) samples via Box-Muller.
    #[inline]
    pub fn next_gaussian_pair(&mut self) -> (f32, f32) {
        let u1 = self.next_f32().max(1e-10); // avoid log(0)
        let u2 = self.next_f32();

        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * std::f32::consts::PI * u2;

        (r * theta.cos(), r * theta.sin())
    }

    /// Generate a single N(0, 1) sample.
    #[inline]
    pub fn next_gaussian(&mut self) -> f32 {
        self.next_gaussian_pair().0
    }
}
