//! DDPG (Deep Deterministic Policy Gradient) implementation.
//!
//! - `actor`: deterministic policy network with bounded control heads
//! - `critic`: action-value network with late action merge
//! - `ddpg`: TD targets, critic loss, and the actor surrogate
//! - `exploration`: epsilon-annealed action noise
//! - `config`: hyperparameters

pub mod actor;
pub mod config;
pub mod critic;
pub mod ddpg;
pub mod exploration;

pub use actor::{PolicyNet, PolicyNetConfig, ACTION_DIM};
pub use config::DDPGConfig;
pub use critic::{QNet, QNetConfig};
pub use ddpg::{critic_loss, policy_surrogate, td_targets};
pub use exploration::ExplorationNoise;
