//! Algorithm implementations.
//!
//! - `ddpg`: Deep Deterministic Policy Gradient for continuous control

pub mod ddpg;

pub use ddpg::{
    critic_loss, policy_surrogate, td_targets, DDPGConfig, ExplorationNoise, PolicyNet,
    PolicyNetConfig, QNet, QNetConfig, ACTION_DIM,
};
