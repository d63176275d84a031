//! Epsilon-annealed exploration for the driving action space.
//!
//! Two layers of randomness, both shrinking with epsilon:
//! - with probability epsilon the policy action is replaced by a uniform
//!   random action whose throttle component gets an extra positive kick,
//! - every action, random or not, receives additive Gaussian noise with a
//!   positive throttle bias.
//!
//! The throttle bias keeps early exploration moving forward instead of
//! parking on the brake.

use crate::algorithms::ddpg::actor::ACTION_DIM;
use crate::core::rng::XorShiftRng;

/// Gaussian noise scale for steering, multiplied by epsilon.
const STEERING_NOISE_STD: f32 = 0.2;
/// Gaussian noise scale for brake, multiplied by epsilon.
const BRAKE_NOISE_STD: f32 = 0.2;
/// Constant throttle noise offset.
const THROTTLE_NOISE_MEAN: f32 = 0.4;
/// Gaussian noise scale for throttle, multiplied by epsilon.
const THROTTLE_NOISE_STD: f32 = 0.1;

/// Seeded exploration noise source.
pub struct ExplorationNoise {
    rng: XorShiftRng,
}

impl ExplorationNoise {
    /// Create a noise source with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: XorShiftRng::new(seed),
        }
    }

    /// Roll the epsilon branch: `true` means take a random action.
    pub fn should_explore(&mut self, epsilon: f32) -> bool {
        self.rng.next_f32() <= epsilon
    }

    /// Draw a uniform random action with a forward throttle kick.
    ///
    /// Each component is uniform in [-1, 1); throttle gets an extra uniform
    /// [0, 1) added, landing it in [-1, 2).
    pub fn random_action(&mut self) -> Vec<f32> {
        let mut action = vec![
            self.rng.next_f32_range(-1.0, 1.0),
            self.rng.next_f32_range(-1.0, 1.0),
            self.rng.next_f32_range(-1.0, 1.0),
        ];
        action[1] += self.rng.next_f32();
        action
    }

    /// Add epsilon-scaled Gaussian noise in place.
    ///
    /// Steering and brake get zero-mean noise with std `0.2 * epsilon`;
    /// throttle gets mean 0.4 and std `0.1 * epsilon`. At epsilon 0 only the
    /// constant throttle offset remains.
    pub fn apply(&mut self, action: &mut [f32], epsilon: f32) {
        debug_assert_eq!(action.len(), ACTION_DIM, "expected a 3-dim action");
        let (g0, g1) = self.rng.next_gaussian_pair();
        let g2 = self.rng.next_gaussian();
        action[0] += g0 * STEERING_NOISE_STD * epsilon;
        action[1] += THROTTLE_NOISE_MEAN + g1 * THROTTLE_NOISE_STD * epsilon;
        action[2] += g2 * BRAKE_NOISE_STD * epsilon;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_under_seed() {
        let mut a = ExplorationNoise::new(99);
        let mut b = ExplorationNoise::new(99);
        for _ in 0..50 {
            assert_eq!(a.random_action(), b.random_action());
        }
    }

    #[test]
    fn test_random_action_bounds() {
        let mut noise = ExplorationNoise::new(3);
        for _ in 0..1000 {
            let action = noise.random_action();
            assert_eq!(action.len(), ACTION_DIM);
            assert!((-1.0..1.0).contains(&action[0]));
            assert!((-1.0..2.0).contains(&action[1]), "throttle {}", action[1]);
            assert!((-1.0..1.0).contains(&action[2]));
        }
    }

    #[test]
    fn test_random_throttle_biased_forward() {
        let mut noise = ExplorationNoise::new(17);
        let mean: f32 = (0..10000)
            .map(|_| noise.random_action()[1])
            .sum::<f32>()
            / 10000.0;
        // uniform[-1,1) + uniform[0,1) has mean 0.5
        assert!((mean - 0.5).abs() < 0.05, "throttle mean {}", mean);
    }

    #[test]
    fn test_apply_statistics() {
        let mut noise = ExplorationNoise::new(41);
        let n = 10000;
        let mut sums = [0.0f32; 3];
        let mut squares = [0.0f32; 3];
        for _ in 0..n {
            let mut action = [0.0f32; 3];
            noise.apply(&mut action, 1.0);
            for d in 0..3 {
                sums[d] += action[d];
                squares[d] += action[d] * action[d];
            }
        }
        let means: Vec<f32> = sums.iter().map(|s| s / n as f32).collect();
        let stds: Vec<f32> = (0..3)
            .map(|d| (squares[d] / n as f32 - means[d] * means[d]).sqrt())
            .collect();

        assert!(means[0].abs() < 0.02, "steering mean {}", means[0]);
        assert!((means[1] - 0.4).abs() < 0.02, "throttle mean {}", means[1]);
        assert!(means[2].abs() < 0.02, "brake mean {}", means[2]);
        assert!((stds[0] - 0.2).abs() < 0.02, "steering std {}", stds[0]);
        assert!((stds[1] - 0.1).abs() < 0.02, "throttle std {}", stds[1]);
        assert!((stds[2] - 0.2).abs() < 0.02, "brake std {}", stds[2]);
    }

    #[test]
    fn test_noise_collapses_at_zero_epsilon() {
        let mut noise = ExplorationNoise::new(5);
        let mut action = [0.1f32, 0.2, 0.3];
        noise.apply(&mut action, 0.0);
        assert_eq!(action[0], 0.1);
        assert_eq!(action[1], 0.2 + THROTTLE_NOISE_MEAN);
        assert_eq!(action[2], 0.3);
    }

    #[test]
    fn test_branch_probability_tracks_epsilon() {
        let mut noise = ExplorationNoise::new(23);
        let trials = 10000;
        let hits = (0..trials)
            .filter(|_| noise.should_explore(0.25))
            .count();
        let rate = hits as f32 / trials as f32;
        assert!((rate - 0.25).abs() < 0.02, "branch rate {}", rate);

        let always = (0..100).all(|_| noise.should_explore(1.0));
        assert!(always, "epsilon 1.0 must always explore");
    }
}
