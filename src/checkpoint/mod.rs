//! Model checkpointing module.
//!
//! Persists the four training networks as episode-keyed sets so a run can
//! resume where it left off.
//!
//! ## Features
//!
//! - Automatic saving at a configurable episode interval
//! - Cold-start detection when no checkpoints exist yet
//! - Automatic cleanup of old checkpoint sets
//!
//! ## Example
//!
//! ```rust,ignore
//! use ddpg_rl::checkpoint::{Checkpointer, CheckpointerConfig};
//!
//! let config = CheckpointerConfig::new("./checkpoints")
//!     .with_save_interval(200)
//!     .with_keep_last_n(5);
//!
//! let checkpointer = Checkpointer::new(config)?;
//!
//! // In training loop:
//! if checkpointer.should_save(episode) {
//!     checkpointer.save(&policy, &policy_target, &critic, &critic_target, episode)?;
//! }
//!
//! // Resume training:
//! let (policy, policy_target, critic, critic_target, episode) =
//!     checkpointer.load_latest(policy, policy_target, critic, critic_target, &device)?;
//! ```

pub mod checkpointer;

pub use checkpointer::{
    Checkpointer,
    CheckpointerConfig,
    CheckpointError,
};
