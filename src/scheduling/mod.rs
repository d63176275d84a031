//! Per-episode annealing schedules.
//!
//! One schedule type covers both annealed quantities in DDPG training:
//!
//! - exploration epsilon: multiplicative decay toward zero
//! - learning rate: multiplicative decay clamped to a floor
//!
//! ## Example
//!
//! ```rust,ignore
//! use ddpg_rl::scheduling::ExponentialDecay;
//!
//! let mut lr = ExponentialDecay::new(1e-4, 0.99, 1e-6);
//!
//! // At each episode start:
//! let rate = lr.advance();
//! ```

pub mod decay;

pub use decay::ExponentialDecay;
