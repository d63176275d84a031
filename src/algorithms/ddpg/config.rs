//! DDPG hyperparameter configuration.
//!
//! Defaults reproduce the reference pixel-driving setup: 96x96x3
//! observations, a 10k-transition buffer, batches of 64, and multiplicative
//! per-episode annealing of both the exploration rate and the learning rate.

use std::path::PathBuf;

/// Configuration for DDPG training.
#[derive(Debug, Clone)]
pub struct DDPGConfig {
    // ========================================================================
    // Observation interface
    // ========================================================================
    /// Observation dimensions as [height, width, channels].
    pub obs_shape: [usize; 3],

    // ========================================================================
    // Replay buffer
    // ========================================================================
    /// Maximum number of stored transitions.
    pub buffer_capacity: usize,
    /// Transitions per gradient update. Updates run only while buffer
    /// occupancy is strictly greater than this.
    pub batch_size: usize,

    // ========================================================================
    // Discounting and target blending
    // ========================================================================
    /// Discount factor for bootstrapped targets.
    pub gamma: f32,
    /// Polyak blend rate for target network updates.
    pub tau: f32,

    // ========================================================================
    // Learning-rate schedule
    // ========================================================================
    /// Learning rate before the first episode's decay.
    pub initial_lr: f64,
    /// Multiplicative decay applied once per episode.
    pub lr_decay: f64,
    /// Floor the learning rate never drops below.
    pub min_lr: f64,

    // ========================================================================
    // Exploration schedule
    // ========================================================================
    /// Exploration rate before the first episode's decay.
    pub initial_epsilon: f64,
    /// Multiplicative decay applied once per episode.
    pub epsilon_decay: f64,

    // ========================================================================
    // Episode control
    // ========================================================================
    /// Hard cap on steps per episode.
    pub max_episode_steps: usize,
    /// Stop after this many episodes; `None` runs indefinitely.
    pub max_episodes: Option<usize>,
    /// Render the environment every step.
    pub render: bool,

    // ========================================================================
    // Checkpointing
    // ========================================================================
    /// Directory for checkpoint files.
    pub checkpoint_dir: PathBuf,
    /// Save a checkpoint set every N episodes.
    pub checkpoint_interval: usize,
    /// Number of recent checkpoint sets to retain.
    pub keep_last_n: usize,

    // ========================================================================
    // Optimization
    // ========================================================================
    /// Gradient norm clipping for both optimizers; `None` disables.
    pub max_grad_norm: Option<f32>,

    // ========================================================================
    // Network sizes
    // ========================================================================
    /// Hidden units in the policy network.
    pub actor_hidden: usize,
    /// Convolution filters in the critic's feature extractor.
    pub critic_conv_filters: usize,
    /// Square kernel size of the critic convolution.
    pub critic_conv_kernel: usize,
    /// Units in the critic's post-convolution trunk.
    pub critic_trunk: usize,
    /// Units in the critic's state/action merge layer.
    pub critic_merge: usize,

    // ========================================================================
    // Reproducibility
    // ========================================================================
    /// Seed for exploration noise and buffer sampling.
    pub seed: u64,
}

impl Default for DDPGConfig {
    fn default() -> Self {
        Self {
            obs_shape: [96, 96, 3],
            buffer_capacity: 10_000,
            batch_size: 64,
            gamma: 0.9,
            tau: 0.01,
            initial_lr: 1e-4,
            lr_decay: 0.99,
            min_lr: 1e-6,
            initial_epsilon: 0.99,
            epsilon_decay: 0.99,
            max_episode_steps: 500,
            max_episodes: None,
            render: false,
            checkpoint_dir: PathBuf::from("checkpoints"),
            checkpoint_interval: 200,
            keep_last_n: 5,
            max_grad_norm: None,
            actor_hidden: 50,
            critic_conv_filters: 8,
            critic_conv_kernel: 8,
            critic_trunk: 100,
            critic_merge: 50,
            seed: 1234,
        }
    }
}

impl DDPGConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Flattened observation length (H * W * C).
    pub fn obs_len(&self) -> usize {
        self.obs_shape[0] * self.obs_shape[1] * self.obs_shape[2]
    }

    /// Builder: set observation dimensions.
    pub fn with_obs_shape(mut self, obs_shape: [usize; 3]) -> Self {
        self.obs_shape = obs_shape;
        self
    }

    /// Builder: set buffer capacity.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Builder: set batch size.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Builder: set discount factor.
    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    /// Builder: set target blend rate.
    pub fn with_tau(mut self, tau: f32) -> Self {
        self.tau = tau;
        self
    }

    /// Builder: set initial learning rate.
    pub fn with_initial_lr(mut self, lr: f64) -> Self {
        self.initial_lr = lr;
        self
    }

    /// Builder: set per-episode learning-rate decay.
    pub fn with_lr_decay(mut self, decay: f64) -> Self {
        self.lr_decay = decay;
        self
    }

    /// Builder: set learning-rate floor.
    pub fn with_min_lr(mut self, min_lr: f64) -> Self {
        self.min_lr = min_lr;
        self
    }

    /// Builder: set initial exploration rate.
    pub fn with_initial_epsilon(mut self, epsilon: f64) -> Self {
        self.initial_epsilon = epsilon;
        self
    }

    /// Builder: set per-episode exploration decay.
    pub fn with_epsilon_decay(mut self, decay: f64) -> Self {
        self.epsilon_decay = decay;
        self
    }

    /// Builder: set the per-episode step cap.
    pub fn with_max_episode_steps(mut self, steps: usize) -> Self {
        self.max_episode_steps = steps;
        self
    }

    /// Builder: stop after a fixed number of episodes.
    pub fn with_max_episodes(mut self, episodes: usize) -> Self {
        self.max_episodes = Some(episodes);
        self
    }

    /// Builder: enable per-step rendering.
    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    /// Builder: set the checkpoint directory.
    pub fn with_checkpoint_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.checkpoint_dir = dir.into();
        self
    }

    /// Builder: set the checkpoint interval in episodes.
    pub fn with_checkpoint_interval(mut self, interval: usize) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    /// Builder: set the number of retained checkpoint sets.
    pub fn with_keep_last_n(mut self, n: usize) -> Self {
        self.keep_last_n = n;
        self
    }

    /// Builder: enable gradient norm clipping.
    pub fn with_max_grad_norm(mut self, max_norm: f32) -> Self {
        self.max_grad_norm = Some(max_norm);
        self
    }

    /// Builder: set policy hidden units.
    pub fn with_actor_hidden(mut self, units: usize) -> Self {
        self.actor_hidden = units;
        self
    }

    /// Builder: set critic convolution filters.
    pub fn with_critic_conv_filters(mut self, filters: usize) -> Self {
        self.critic_conv_filters = filters;
        self
    }

    /// Builder: set critic convolution kernel size.
    pub fn with_critic_conv_kernel(mut self, kernel: usize) -> Self {
        self.critic_conv_kernel = kernel;
        self
    }

    /// Builder: set critic trunk units.
    pub fn with_critic_trunk(mut self, units: usize) -> Self {
        self.critic_trunk = units;
        self
    }

    /// Builder: set critic merge units.
    pub fn with_critic_merge(mut self, units: usize) -> Self {
        self.critic_merge = units;
        self
    }

    /// Builder: set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
