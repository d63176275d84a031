//! Core data structures shared across the crate.

pub mod replay_buffer;
pub mod rng;
pub mod target_network;
pub mod transition;

pub use replay_buffer::ReplayBuffer;
pub use rng::XorShiftRng;
pub use target_network::{param_l2_norm, soft_update};
pub use transition::Transition;
