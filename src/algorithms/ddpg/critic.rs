//! Action-value network.
//!
//! Estimates Q(s, a) from a pixel observation and a control vector. The
//! observation runs through a small convolutional extractor, the action joins
//! late through a separate projection:
//!
//! ```text
//! obs [B, H*W*C] -> NCHW -> Conv2d(filters, k) -> ReLU -> flatten
//!                -> Linear(trunk) -> ReLU -> Linear(merge, no bias) --+
//! action [B, 3] ----------------------------> Linear(merge) ---------+-> sum
//!                                                -> ReLU -> Linear(1)
//! ```
//!
//! The state projection carries no bias of its own; the action projection's
//! bias serves the merged sum. The scalar head is initialized uniformly in a
//! small band around zero.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::{Initializer, Linear, LinearConfig};
use burn::tensor::activation::relu;
use burn::tensor::backend::{AutodiffBackend, Backend};
use burn::tensor::Tensor;

use super::actor::ACTION_DIM;

/// Uniform initialization bound for the scalar output head.
const HEAD_INIT_BOUND: f64 = 3e-3;

/// Configuration for [`QNet`].
#[derive(Debug, Clone)]
pub struct QNetConfig {
    obs_shape: [usize; 3],
    conv_filters: usize,
    conv_kernel: usize,
    trunk_size: usize,
    merge_size: usize,
}

impl QNetConfig {
    /// Create a config for observations of the given [height, width, channels].
    pub fn new(obs_shape: [usize; 3]) -> Self {
        Self {
            obs_shape,
            conv_filters: 8,
            conv_kernel: 8,
            trunk_size: 100,
            merge_size: 50,
        }
    }

    /// Builder: set convolution filter count.
    pub fn with_conv_filters(mut self, filters: usize) -> Self {
        self.conv_filters = filters;
        self
    }

    /// Builder: set square convolution kernel size.
    pub fn with_conv_kernel(mut self, kernel: usize) -> Self {
        self.conv_kernel = kernel;
        self
    }

    /// Builder: set trunk width.
    pub fn with_trunk_size(mut self, trunk_size: usize) -> Self {
        self.trunk_size = trunk_size;
        self
    }

    /// Builder: set merge width.
    pub fn with_merge_size(mut self, merge_size: usize) -> Self {
        self.merge_size = merge_size;
        self
    }

    /// Initialize the network on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> QNet<B> {
        let [height, width, channels] = self.obs_shape;
        debug_assert!(
            height >= self.conv_kernel && width >= self.conv_kernel,
            "observation {}x{} smaller than kernel {}",
            height,
            width,
            self.conv_kernel
        );

        // Valid convolution, stride 1
        let conv_h = height - self.conv_kernel + 1;
        let conv_w = width - self.conv_kernel + 1;
        let conv_flat = self.conv_filters * conv_h * conv_w;

        QNet {
            conv: Conv2dConfig::new(
                [channels, self.conv_filters],
                [self.conv_kernel, self.conv_kernel],
            )
            .init(device),
            trunk: LinearConfig::new(conv_flat, self.trunk_size).init(device),
            state_proj: LinearConfig::new(self.trunk_size, self.merge_size)
                .with_bias(false)
                .init(device),
            action_proj: LinearConfig::new(ACTION_DIM, self.merge_size).init(device),
            output: LinearConfig::new(self.merge_size, 1)
                .with_initializer(Initializer::Uniform {
                    min: -HEAD_INIT_BOUND,
                    max: HEAD_INIT_BOUND,
                })
                .init(device),
            height,
            width,
            channels,
        }
    }
}

/// Action-value estimator with a late action merge.
#[derive(Module, Debug)]
pub struct QNet<B: Backend> {
    conv: Conv2d<B>,
    trunk: Linear<B>,
    state_proj: Linear<B>,
    action_proj: Linear<B>,
    output: Linear<B>,
    height: usize,
    width: usize,
    channels: usize,
}

impl<B: Backend> QNet<B> {
    /// Compute Q values for a batch.
    ///
    /// # Arguments
    /// * `obs` - Observations `[batch, H*W*C]`, flattened HWC row-major
    /// * `action` - Actions `[batch, 3]`
    ///
    /// # Returns
    /// Q estimates `[batch, 1]`.
    pub fn forward(&self, obs: Tensor<B, 2>, action: Tensor<B, 2>) -> Tensor<B, 2> {
        let [batch, _] = obs.dims();
        let x = obs.reshape([batch, self.height, self.width, self.channels]);
        // NHWC -> NCHW
        let x = x.swap_dims(1, 3).swap_dims(2, 3);
        let x = relu(self.conv.forward(x));
        let x = x.flatten::<2>(1, 3);
        let x = relu(self.trunk.forward(x));
        let merged = self.state_proj.forward(x) + self.action_proj.forward(action);
        self.output.forward(relu(merged))
    }
}

impl<B: AutodiffBackend> QNet<B> {
    /// Gradient of the summed Q output with respect to the action input.
    ///
    /// Drives the policy update: the actor follows dQ/da uphill. The result
    /// carries no autodiff history of its own.
    pub fn action_gradients(&self, obs: Tensor<B, 2>, action: Tensor<B, 2>) -> Tensor<B, 2> {
        let action = action.detach().require_grad();
        let q = self.forward(obs, action.clone());
        let grads = q.sum().backward();
        let grad = action
            .grad(&grads)
            .expect("action input participates in the Q graph");
        Tensor::from_inner(grad)
    }
}
