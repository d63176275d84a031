//! Deterministic policy network.
//!
//! Maps a flattened pixel observation to a 3-dimensional control vector
//! through a shared hidden layer and three independent heads:
//!
//! ```text
//! obs [B, H*W*C] -> Linear(hidden) -> ReLU -+-> Linear(1) -> tanh    (steering)
//!                                           +-> Linear(1) -> sigmoid (throttle)
//!                                           +-> Linear(1) -> sigmoid (brake)
//! ```
//!
//! Heads are initialized uniformly in a small band around zero so the initial
//! policy sits near the middle of each control range.

use burn::module::Module;
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::tensor::activation::{relu, sigmoid, tanh};
use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Number of control dimensions: steering, throttle, brake.
pub const ACTION_DIM: usize = 3;

/// Uniform initialization bound for the output heads.
const HEAD_INIT_BOUND: f64 = 3e-3;

/// Configuration for [`PolicyNet`].
#[derive(Debug, Clone)]
pub struct PolicyNetConfig {
    obs_len: usize,
    hidden_size: usize,
}

impl PolicyNetConfig {
    /// Create a config for observations of the given [height, width, channels].
    pub fn new(obs_shape: [usize; 3]) -> Self {
        Self {
            obs_len: obs_shape[0] * obs_shape[1] * obs_shape[2],
            hidden_size: 50,
        }
    }

    /// Builder: set hidden layer width.
    pub fn with_hidden_size(mut self, hidden_size: usize) -> Self {
        self.hidden_size = hidden_size;
        self
    }

    /// Initialize the network on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> PolicyNet<B> {
        let head_init = Initializer::Uniform {
            min: -HEAD_INIT_BOUND,
            max: HEAD_INIT_BOUND,
        };
        PolicyNet {
            hidden: LinearConfig::new(self.obs_len, self.hidden_size).init(device),
            steering: LinearConfig::new(self.hidden_size, 1)
                .with_initializer(head_init.clone())
                .init(device),
            throttle: LinearConfig::new(self.hidden_size, 1)
                .with_initializer(head_init.clone())
                .init(device),
            brake: LinearConfig::new(self.hidden_size, 1)
                .with_initializer(head_init)
                .init(device),
        }
    }
}

/// Deterministic policy: observation in, bounded control vector out.
#[derive(Module, Debug)]
pub struct PolicyNet<B: Backend> {
    hidden: Linear<B>,
    steering: Linear<B>,
    throttle: Linear<B>,
    brake: Linear<B>,
}

impl<B: Backend> PolicyNet<B> {
    /// Compute actions for a batch of flattened observations.
    ///
    /// # Arguments
    /// * `obs` - Observations `[batch, H*W*C]`
    ///
    /// # Returns
    /// Actions `[batch, 3]`: steering in [-1, 1], throttle and brake in [0, 1].
    pub fn forward(&self, obs: Tensor<B, 2>) -> Tensor<B, 2> {
        let x = relu(self.hidden.forward(obs));
        let steering = tanh(self.steering.forward(x.clone()));
        let throttle = sigmoid(self.throttle.forward(x.clone()));
        let brake = sigmoid(self.brake.forward(x));
        Tensor::cat(vec![steering, throttle, brake], 1)
    }
}
