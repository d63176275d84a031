//! Environment abstraction for episodic training.
//!
//! [`Env`] is the single-environment contract the training loop drives.
//! [`TrackEnv`] is a deterministic synthetic driving task that renders its
//! state into pixel observations, so the full pipeline can run end to end
//! without an external simulator.

/// Result from stepping the environment.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    /// Observation after the step, flattened height * width * channels.
    pub observation: Vec<f32>,
    /// Reward received.
    pub reward: f32,
    /// Whether the episode ended at this step.
    pub terminal: bool,
}

/// Trait for episodic environments with image observations and
/// continuous actions.
pub trait Env {
    /// Observation shape as [height, width, channels].
    fn obs_shape(&self) -> [usize; 3];

    /// Length of the action vector.
    fn action_dim(&self) -> usize;

    /// Reset to the start of a new episode, returning the first observation.
    fn reset(&mut self) -> Vec<f32>;

    /// Advance one step with the given action.
    fn step(&mut self, action: &[f32]) -> StepOutcome;

    /// Display the current state. No-op by default.
    fn render(&mut self) {}

    /// Flattened observation length.
    fn obs_len(&self) -> usize {
        let [height, width, channels] = self.obs_shape();
        height * width * channels
    }
}

// ============================================================================
// Synthetic track environment
// ============================================================================

const DRAG: f32 = 0.02;
const THROTTLE_GAIN: f32 = 0.1;
const BRAKE_GAIN: f32 = 0.2;
const STEER_GAIN: f32 = 0.15;
const CURVATURE_GAIN: f32 = 0.08;
const PROGRESS_RATE: f32 = 0.1;
const OFF_TRACK_LIMIT: f32 = 1.0;
const OFF_TRACK_PENALTY: f32 = 1.0;
const CENTER_PENALTY: f32 = 0.5;

/// Deterministic driving task on an endless winding road.
///
/// State is the car's speed, lateral offset from the road center, and
/// distance travelled. The road curves sinusoidally with progress; steering
/// must counter the curvature or the car drifts off track. Reward favors
/// speed and punishes distance from the center line. The episode ends when
/// the offset leaves the track.
///
/// Actions are `[steering, throttle, brake]` with steering in [-1, 1] and
/// pedals in [0, 1]; out-of-range inputs are clamped.
pub struct TrackEnv {
    obs_shape: [usize; 3],
    speed: f32,
    offset: f32,
    progress: f32,
}

impl TrackEnv {
    /// Create an environment with the given observation shape.
    pub fn new(obs_shape: [usize; 3]) -> Self {
        debug_assert!(obs_shape.iter().all(|&d| d > 0));
        Self {
            obs_shape,
            speed: 0.0,
            offset: 0.0,
            progress: 0.0,
        }
    }

    /// Distance travelled since the last reset.
    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Current speed in [0, 1].
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Render the state into a flat pixel buffer.
    ///
    /// Channel 0 carries the road: a bright band on dark ground whose
    /// center shifts with the car's offset and the upcoming curvature
    /// (rows toward the top of the image look further ahead). Channel 1
    /// is a depth gradient, channel 2 a speed bar along the top row.
    /// All values lie in [0, 1].
    fn observation(&self) -> Vec<f32> {
        let [height, width, channels] = self.obs_shape;
        let mut pixels = vec![0.0f32; height * width * channels];
        let half_road = width as f32 * 0.2;

        for row in 0..height {
            // depth 1.0 at the top row (far ahead), 0 at the bottom (at the car)
            let depth = 1.0 - row as f32 / height as f32;
            let lookahead = (0.7 * (self.progress + depth)).sin();
            let center = width as f32 * 0.5
                - (self.offset + CURVATURE_GAIN * lookahead * depth) * width as f32 * 0.25;

            for col in 0..width {
                let on_road = (col as f32 - center).abs() <= half_road;
                let idx = (row * width + col) * channels;
                pixels[idx] = if on_road { 1.0 } else { 0.2 };
                if channels > 1 {
                    pixels[idx + 1] = depth;
                }
                if channels > 2 {
                    let speed_bar = row == 0 && (col as f32) < self.speed * width as f32;
                    pixels[idx + 2] = if speed_bar { 1.0 } else { 0.0 };
                }
            }
        }

        pixels
    }
}

impl Default for TrackEnv {
    fn default() -> Self {
        Self::new([96, 96, 3])
    }
}

impl Env for TrackEnv {
    fn obs_shape(&self) -> [usize; 3] {
        self.obs_shape
    }

    fn action_dim(&self) -> usize {
        3
    }

    fn reset(&mut self) -> Vec<f32> {
        self.speed = 0.0;
        self.offset = 0.0;
        self.progress = 0.0;
        self.observation()
    }

    fn step(&mut self, action: &[f32]) -> StepOutcome {
        debug_assert_eq!(action.len(), 3);
        let steer = action[0].clamp(-1.0, 1.0);
        let throttle = action.get(1).copied().unwrap_or(0.0).clamp(0.0, 1.0);
        let brake = action.get(2).copied().unwrap_or(0.0).clamp(0.0, 1.0);

        self.speed =
            (self.speed + THROTTLE_GAIN * throttle - BRAKE_GAIN * brake - DRAG).clamp(0.0, 1.0);
        let curvature = CURVATURE_GAIN * (0.7 * self.progress).sin();
        self.offset += (STEER_GAIN * steer + curvature) * self.speed;
        self.progress += self.speed * PROGRESS_RATE;

        let terminal = self.offset.abs() > OFF_TRACK_LIMIT;
        let mut reward = self.speed - CENTER_PENALTY * self.offset.abs();
        if terminal {
            reward -= OFF_TRACK_PENALTY;
        }

        StepOutcome {
            observation: self.observation(),
            reward,
            terminal,
        }
    }

    fn render(&mut self) {
        println!(
            "progress {:8.2} | speed {:4.2} | offset {:+5.2}",
            self.progress, self.speed, self.offset
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_observation_shape_and_range() {
        let mut env = TrackEnv::default();
        let obs = env.reset();
        assert_eq!(obs.len(), 96 * 96 * 3);
        assert_eq!(obs.len(), env.obs_len());
        assert!(obs.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_small_shapes_supported() {
        let mut env = TrackEnv::new([4, 6, 1]);
        let obs = env.reset();
        assert_eq!(obs.len(), 24);
        let outcome = env.step(&[0.0, 1.0, 0.0]);
        assert_eq!(outcome.observation.len(), 24);
    }

    #[test]
    fn test_standing_still_earns_nothing() {
        let mut env = TrackEnv::default();
        env.reset();
        for _ in 0..10 {
            let outcome = env.step(&[0.0, 0.0, 0.0]);
            assert!(!outcome.terminal);
            assert!((outcome.reward - 0.0).abs() < 1e-6);
        }
        assert!((env.speed() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_throttle_builds_speed() {
        let mut env = TrackEnv::default();
        env.reset();
        for _ in 0..20 {
            env.step(&[0.0, 1.0, 0.0]);
        }
        assert!(env.speed() > 0.9);
        assert!(env.progress() > 0.0);
    }

    #[test]
    fn test_hard_steering_leaves_track() {
        let mut env = TrackEnv::default();
        env.reset();
        let mut terminated = false;
        let mut final_reward = 0.0;
        for _ in 0..200 {
            let outcome = env.step(&[1.0, 1.0, 0.0]);
            if outcome.terminal {
                terminated = true;
                final_reward = outcome.reward;
                break;
            }
        }
        assert!(terminated);
        assert!(final_reward < 0.0);
    }

    #[test]
    fn test_deterministic_given_same_actions() {
        let actions = [
            [0.2, 0.8, 0.0],
            [-0.1, 0.6, 0.0],
            [0.0, 0.5, 0.2],
            [0.3, 1.0, 0.0],
        ];

        let mut a = TrackEnv::new([8, 8, 3]);
        let mut b = TrackEnv::new([8, 8, 3]);
        a.reset();
        b.reset();

        for action in &actions {
            let out_a = a.step(action);
            let out_b = b.step(action);
            assert_eq!(out_a.observation, out_b.observation);
            assert!((out_a.reward - out_b.reward).abs() < 1e-6);
            assert_eq!(out_a.terminal, out_b.terminal);
        }
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut env = TrackEnv::new([8, 8, 3]);
        let fresh = env.reset();
        for _ in 0..5 {
            env.step(&[0.5, 1.0, 0.0]);
        }
        let after_reset = env.reset();
        assert_eq!(fresh, after_reset);
        assert!((env.progress() - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_clamps_out_of_range_actions() {
        let mut a = TrackEnv::new([4, 4, 1]);
        let mut b = TrackEnv::new([4, 4, 1]);
        a.reset();
        b.reset();
        let out_a = a.step(&[5.0, 9.0, -3.0]);
        let out_b = b.step(&[1.0, 1.0, 0.0]);
        assert!((out_a.reward - out_b.reward).abs() < 1e-6);
    }
}
