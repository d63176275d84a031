//! # DDPG from Pixels
//!
//! Deep Deterministic Policy Gradient agent for continuous-control driving
//! tasks with image observations.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Trainer loop                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  per episode: advance epsilon / learning-rate schedules      │
//! │                                                              │
//! │  ┌───────────┐  action + noise   ┌──────────────┐           │
//! │  │ PolicyNet │ ────────────────> │     Env      │           │
//! │  └───────────┘                   └──────┬───────┘           │
//! │        ▲                                │ transition         │
//! │        │ action-gradient                ▼                    │
//! │  ┌─────┴─────┐    batch of 64    ┌──────────────┐           │
//! │  │   QNet    │ <──────────────── │ ReplayBuffer │           │
//! │  └─────┬─────┘                   └──────────────┘           │
//! │        │ soft update (tau)                                   │
//! │        ▼                                                     │
//! │  target PolicyNet / target QNet  ──>  TD targets             │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The replay buffer stores flattened pixel observations together with the
//! learning rate in effect when each transition was collected; updates use
//! the stored rate of the batch they sample. Checkpoint sets of all four
//! networks are written on an episode interval and restored automatically
//! on startup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::{Autodiff, NdArray};
//! use ddpg_rl::{ConsoleLogger, DDPGConfig, TrackEnv, Trainer};
//!
//! type B = Autodiff<NdArray<f32>>;
//!
//! let config = DDPGConfig::new().with_max_episodes(1000);
//! let env = TrackEnv::new(config.obs_shape);
//! let trainer = Trainer::<B, _>::new(config, env, Default::default())?;
//!
//! let (mut policy_opt, mut critic_opt) = trainer.create_optimizers();
//! let mut logger = ConsoleLogger::new(1);
//! let (policy, critic) = trainer.run(&mut policy_opt, &mut critic_opt, &mut logger)?;
//! ```

pub mod core;
pub mod algorithms;
pub mod environment;
pub mod trainer;
pub mod metrics;
pub mod scheduling;
pub mod checkpoint;

// Re-export commonly used types
pub use core::transition::Transition;
pub use core::replay_buffer::ReplayBuffer;
pub use core::rng::XorShiftRng;
pub use core::target_network::{param_l2_norm, soft_update};

// DDPG algorithm pieces
pub use algorithms::ddpg::{
    critic_loss, policy_surrogate, td_targets,
    DDPGConfig, ExplorationNoise,
    PolicyNet, PolicyNetConfig, QNet, QNetConfig,
    ACTION_DIM,
};

// Training loop
pub use trainer::Trainer;

// Environment abstraction
pub use environment::{Env, StepOutcome, TrackEnv};

pub use metrics::logger::{TrainingSnapshot, MetricsLogger, ConsoleLogger, CSVLogger, MultiLogger};

// Schedules
pub use scheduling::ExponentialDecay;

// Model checkpointing
pub use checkpoint::{Checkpointer, CheckpointerConfig, CheckpointError};
